use mtrace_session::{
    ClassQuery, DeltaSource, InstrumentationEngine, RetransformOutcome, RetransformStatus,
    StatsSink, TraceConfigStore,
};
use mtrace_types::{CallTree, CancelToken, MethodRef, TraceFlags, TracepointStats};
use std::sync::Mutex;
use std::time::Duration;

/// UI sink double. Records every delivered snapshot and refresh time; an
/// optional accept delay simulates a slow UI for backpressure scenarios.
#[derive(Default)]
pub struct RecordingSink {
    accept_delay: Duration,
    snapshots: Mutex<Vec<Vec<TracepointStats>>>,
    refresh_times: Mutex<Vec<Duration>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_accept_delay(accept_delay: Duration) -> Self {
        Self {
            accept_delay,
            ..Self::default()
        }
    }

    pub fn snapshots(&self) -> Vec<Vec<TracepointStats>> {
        self.snapshots.lock().unwrap().clone()
    }

    pub fn last_snapshot(&self) -> Option<Vec<TracepointStats>> {
        self.snapshots.lock().unwrap().last().cloned()
    }

    pub fn refresh_times(&self) -> Vec<Duration> {
        self.refresh_times.lock().unwrap().clone()
    }
}

impl StatsSink for RecordingSink {
    fn set_stats(&self, stats: Vec<TracepointStats>) {
        if !self.accept_delay.is_zero() {
            std::thread::sleep(self.accept_delay);
        }
        self.snapshots.lock().unwrap().push(stats);
    }

    fn set_refresh_time(&self, elapsed: Duration) {
        self.refresh_times.lock().unwrap().push(elapsed);
    }
}

/// Delta source double fed from the test body. `collect_and_reset` drains
/// whatever has been pushed since the previous tick.
#[derive(Default)]
pub struct ScriptedDeltaSource {
    pending: Mutex<Vec<CallTree>>,
}

impl ScriptedDeltaSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push_delta(&self, delta: CallTree) {
        self.pending.lock().unwrap().push(delta);
    }
}

impl DeltaSource for ScriptedDeltaSource {
    fn collect_and_reset(&self) -> Vec<CallTree> {
        std::mem::take(&mut *self.pending.lock().unwrap())
    }
}

/// Human-readable record of one config-store mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigCall {
    TraceMethod { method: MethodRef, flags: u8 },
    UntraceMethod { method: MethodRef },
    TraceMethods { class_name: String, pattern: String, flags: u8 },
    UntraceMethods { class_name: String, pattern: String },
}

#[derive(Default)]
pub struct RecordingConfigStore {
    calls: Mutex<Vec<ConfigCall>>,
}

impl RecordingConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<ConfigCall> {
        self.calls.lock().unwrap().clone()
    }
}

impl TraceConfigStore for RecordingConfigStore {
    fn trace_method(&self, method: &MethodRef, flags: TraceFlags) {
        self.calls.lock().unwrap().push(ConfigCall::TraceMethod {
            method: method.clone(),
            flags: flags.0,
        });
    }

    fn untrace_method(&self, method: &MethodRef) {
        self.calls.lock().unwrap().push(ConfigCall::UntraceMethod {
            method: method.clone(),
        });
    }

    fn trace_methods(&self, class_name: &str, method_pattern: &str, flags: TraceFlags) {
        self.calls.lock().unwrap().push(ConfigCall::TraceMethods {
            class_name: class_name.to_string(),
            pattern: method_pattern.to_string(),
            flags: flags.0,
        });
    }

    fn untrace_methods(&self, class_name: &str, method_pattern: &str) {
        self.calls.lock().unwrap().push(ConfigCall::UntraceMethods {
            class_name: class_name.to_string(),
            pattern: method_pattern.to_string(),
        });
    }
}

/// Instrumentation engine double over a fixed universe of class names.
/// Queries resolve against that universe; retransformation succeeds class
/// by class, checking the cancellation token before each one. An optional
/// per-class delay stretches the batch so a cancellation can land inside
/// it.
pub struct StaticEngine {
    known_classes: Vec<String>,
    tracer_classes: Vec<String>,
    class_delay: Duration,
    retransformed: Mutex<Vec<Vec<String>>>,
    outcomes: Mutex<Vec<RetransformOutcome>>,
}

impl StaticEngine {
    pub fn new(known_classes: &[&str]) -> Self {
        Self {
            known_classes: known_classes.iter().map(|s| s.to_string()).collect(),
            tracer_classes: vec!["mtrace.session.Worker".to_string()],
            class_delay: Duration::ZERO,
            retransformed: Mutex::new(Vec::new()),
            outcomes: Mutex::new(Vec::new()),
        }
    }

    pub fn with_class_delay(known_classes: &[&str], class_delay: Duration) -> Self {
        Self {
            class_delay,
            ..Self::new(known_classes)
        }
    }

    pub fn retransformed(&self) -> Vec<Vec<String>> {
        self.retransformed.lock().unwrap().clone()
    }

    /// Every per-class outcome produced so far, across all batches.
    pub fn outcomes(&self) -> Vec<RetransformOutcome> {
        self.outcomes.lock().unwrap().clone()
    }
}

impl InstrumentationEngine for StaticEngine {
    fn matching_classes(&self, query: &ClassQuery) -> Vec<String> {
        match query {
            ClassQuery::All => self.known_classes.clone(),
            ClassQuery::Prefix(prefix) => self
                .known_classes
                .iter()
                .filter(|name| name.starts_with(prefix.as_str()))
                .cloned()
                .collect(),
            ClassQuery::Exact(name) => self
                .known_classes
                .iter()
                .filter(|known| *known == name)
                .cloned()
                .collect(),
            ClassQuery::TracerInternals => self.tracer_classes.clone(),
            ClassQuery::ExtensionPoint(_) => Vec::new(),
        }
    }

    fn retransform(&self, classes: &[String], cancel: &CancelToken) -> Vec<RetransformOutcome> {
        self.retransformed.lock().unwrap().push(classes.to_vec());

        let mut batch = Vec::with_capacity(classes.len());
        for class_name in classes {
            let status = if cancel.is_cancelled() {
                RetransformStatus::Cancelled
            } else {
                if !self.class_delay.is_zero() {
                    std::thread::sleep(self.class_delay);
                }
                RetransformStatus::Transformed
            };
            let outcome = RetransformOutcome {
                class_name: class_name.clone(),
                status,
            };
            self.outcomes.lock().unwrap().push(outcome.clone());
            batch.push(outcome);
        }
        batch
    }
}
