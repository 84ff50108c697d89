pub mod cancel;
pub mod command;
pub mod suggest;
pub mod token;
pub mod tree;

pub use cancel::CancelToken;
pub use command::{Command, MethodRef, TraceFlags, TraceOption, TraceTarget};
pub use suggest::Suggestion;
pub use token::{Keyword, Symbol, Token};
pub use tree::{CallStats, CallTree, TracepointId, TracepointStats};
