use mtrace_types::{CallTree, CancelToken, MethodRef, TraceFlags, TracepointStats};
use std::sync::Arc;
use std::time::Duration;

/// Producer side of the call-tree pipeline. `collect_and_reset` is invoked
/// once per refresh tick and must be safe to call from the session worker
/// while instrumented code keeps recording deltas from arbitrary threads.
pub trait DeltaSource: Send + Sync {
    fn collect_and_reset(&self) -> Vec<CallTree>;
}

/// Per-method trace-configuration store. Implementations are shared with
/// the instrumented code paths and must tolerate concurrent calls.
pub trait TraceConfigStore: Send + Sync {
    fn trace_method(&self, method: &MethodRef, flags: TraceFlags);
    fn untrace_method(&self, method: &MethodRef);
    /// Pattern form: `method_pattern` is a name prefix, empty meaning every
    /// method of the class.
    fn trace_methods(&self, class_name: &str, method_pattern: &str, flags: TraceFlags);
    fn untrace_methods(&self, class_name: &str, method_pattern: &str);
}

/// How a trace target selects classes. Resolution happens inside the
/// instrumentation collaborator; the core never validates existence itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ClassQuery {
    /// Every known class (`*`).
    All,
    /// Classes whose name starts with the prefix (`C*`).
    Prefix(String),
    /// One exact class name.
    Exact(String),
    /// The tracer's own internals (`tracer`).
    TracerInternals,
    /// A fixed named extension-point target (`psi-finders`).
    ExtensionPoint(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RetransformStatus {
    Transformed,
    /// The class cannot be retransformed. A warning, not a failure.
    Unmodifiable,
    Failed(String),
    /// Processing stopped before this class because cancellation was
    /// requested.
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RetransformOutcome {
    pub class_name: String,
    pub status: RetransformStatus,
}

/// The retransformation capability. Long batches must check the
/// cancellation token at per-class granularity.
pub trait InstrumentationEngine: Send + Sync {
    fn matching_classes(&self, query: &ClassQuery) -> Vec<String>;
    fn retransform(&self, classes: &[String], cancel: &CancelToken) -> Vec<RetransformOutcome>;
}

/// Stand-in for hosts with no instrumentation capability. Every query
/// resolves to zero classes, so trace commands degrade to logged no-ops.
#[derive(Debug, Default)]
pub struct NoopInstrumentation;

impl InstrumentationEngine for NoopInstrumentation {
    fn matching_classes(&self, _query: &ClassQuery) -> Vec<String> {
        Vec::new()
    }

    fn retransform(&self, _classes: &[String], _cancel: &CancelToken) -> Vec<RetransformOutcome> {
        Vec::new()
    }
}

/// UI delivery sink. `set_stats` blocks the worker until the UI has
/// accepted the update; a slow UI throttles the refresh cadence instead of
/// queueing stale snapshots.
pub trait StatsSink: Send + Sync {
    fn set_stats(&self, stats: Vec<TracepointStats>);
    fn set_refresh_time(&self, elapsed: Duration);
}

/// The collaborator set a session controller runs against.
#[derive(Clone)]
pub struct Collaborators {
    pub delta_source: Arc<dyn DeltaSource>,
    pub config_store: Arc<dyn TraceConfigStore>,
    pub engine: Arc<dyn InstrumentationEngine>,
    pub sink: Arc<dyn StatsSink>,
}
