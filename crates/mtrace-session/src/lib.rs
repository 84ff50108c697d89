pub mod collaborators;
pub mod controller;
pub mod resolve;

pub use collaborators::{
    ClassQuery, Collaborators, DeltaSource, InstrumentationEngine, NoopInstrumentation,
    RetransformOutcome, RetransformStatus, StatsSink, TraceConfigStore,
};
pub use controller::{SessionConfig, SessionController};
pub use resolve::{resolve_target, MethodSelector, ResolvedTarget};
