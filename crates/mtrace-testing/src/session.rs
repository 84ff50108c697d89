use crate::doubles::{RecordingConfigStore, RecordingSink, ScriptedDeltaSource, StaticEngine};
use mtrace_session::{Collaborators, SessionConfig, SessionController};
use mtrace_types::{CallStats, CallTree, TracepointId};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// A session controller wired to in-memory doubles, with the doubles kept
/// reachable for assertions.
pub struct TestSession {
    pub controller: SessionController,
    pub sink: Arc<RecordingSink>,
    pub source: Arc<ScriptedDeltaSource>,
    pub store: Arc<RecordingConfigStore>,
    pub engine: Arc<StaticEngine>,
}

impl TestSession {
    pub fn builder() -> TestSessionBuilder {
        TestSessionBuilder::default()
    }

    /// Poll until `predicate` holds or the deadline passes. Keeps the
    /// timing-sensitive tests robust on slow machines.
    pub fn wait_until(&self, timeout: Duration, predicate: impl Fn(&TestSession) -> bool) -> bool {
        let deadline = Instant::now() + timeout;
        loop {
            if predicate(self) {
                return true;
            }
            if Instant::now() >= deadline {
                return false;
            }
            std::thread::sleep(Duration::from_millis(5));
        }
    }
}

pub struct TestSessionBuilder {
    refresh_delay: Duration,
    sink_delay: Duration,
    retransform_delay: Duration,
    known_classes: Vec<String>,
}

impl Default for TestSessionBuilder {
    fn default() -> Self {
        Self {
            refresh_delay: Duration::from_millis(20),
            sink_delay: Duration::ZERO,
            retransform_delay: Duration::ZERO,
            known_classes: Vec::new(),
        }
    }
}

impl TestSessionBuilder {
    pub fn refresh_delay(mut self, delay: Duration) -> Self {
        self.refresh_delay = delay;
        self
    }

    pub fn sink_delay(mut self, delay: Duration) -> Self {
        self.sink_delay = delay;
        self
    }

    /// Make the engine spend this long on every class it retransforms, so
    /// cancellation tests can interrupt a batch in flight.
    pub fn retransform_delay(mut self, delay: Duration) -> Self {
        self.retransform_delay = delay;
        self
    }

    pub fn known_classes(mut self, classes: &[&str]) -> Self {
        self.known_classes = classes.iter().map(|s| s.to_string()).collect();
        self
    }

    /// Build the session and start its refresh loop.
    pub fn start(self) -> TestSession {
        let sink = Arc::new(RecordingSink::with_accept_delay(self.sink_delay));
        let source = Arc::new(ScriptedDeltaSource::new());
        let store = Arc::new(RecordingConfigStore::new());
        let classes: Vec<&str> = self.known_classes.iter().map(String::as_str).collect();
        let engine = Arc::new(StaticEngine::with_class_delay(
            &classes,
            self.retransform_delay,
        ));

        let collaborators = Collaborators {
            delta_source: source.clone(),
            config_store: store.clone(),
            engine: engine.clone(),
            sink: sink.clone(),
        };
        let mut controller = SessionController::new(
            collaborators,
            SessionConfig {
                refresh_delay: self.refresh_delay,
            },
        );
        controller
            .start_refresh_loop()
            .expect("failed to start refresh loop");

        TestSession {
            controller,
            sink,
            source,
            store,
            engine,
        }
    }
}

/// One-tracepoint delta batch, the shape producers emit between drains.
pub fn single_call_delta(class: &str, method: &str, count: u64, wall_time: Duration) -> CallTree {
    let mut delta = CallTree::new();
    delta.record(
        &[TracepointId::new(class, method)],
        CallStats::new(count, wall_time),
    );
    delta
}
