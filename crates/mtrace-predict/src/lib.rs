pub mod predictor;

pub use predictor::{Cancelled, ClassNameProvider, Predictor};
