use crate::collaborators::{Collaborators, RetransformStatus};
use crate::resolve::{resolve_target, MethodSelector};
use anyhow::Result;
use mtrace_types::{CallTree, CancelToken, Command, MethodRef, TraceOption, TraceTarget};
use std::sync::mpsc::{channel, RecvTimeoutError, Sender};
use std::thread::JoinHandle;
use std::time::{Duration, Instant};
use tracing::{debug, warn};

#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Fixed delay between the end of one refresh tick and the start of the
    /// next. Not a fixed rate: an overrunning tick delays the next one.
    pub refresh_delay: Duration,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            refresh_delay: Duration::from_millis(500),
        }
    }
}

enum WorkerTask {
    Dispatch(Command),
    Shutdown,
}

/// Owns one tracing session: the aggregate call tree, the single worker
/// that serializes every mutation, and the fixed-delay refresh loop that
/// publishes flattened statistics to the UI sink.
pub struct SessionController {
    collaborators: Collaborators,
    config: SessionConfig,
    cancel: CancelToken,
    tx: Option<Sender<WorkerTask>>,
    handle: Option<JoinHandle<()>>,
    /// Set on the first successful start and never cleared, not even by
    /// `shutdown`. A controller runs its loop at most once; restarting a
    /// stopped controller would look alive while its token is already
    /// cancelled.
    started: bool,
}

impl SessionController {
    pub fn new(collaborators: Collaborators, config: SessionConfig) -> Self {
        Self {
            collaborators,
            config,
            cancel: CancelToken::new(),
            tx: None,
            handle: None,
            started: false,
        }
    }

    /// Spawn the session worker and begin the refresh loop.
    ///
    /// # Panics
    ///
    /// Panics if called more than once, including after `shutdown`. A
    /// repeat start is a caller bug, not a runtime condition, and must
    /// fail loudly.
    pub fn start_refresh_loop(&mut self) -> Result<()> {
        assert!(!self.started, "session refresh loop already started");

        let (tx, rx) = channel();
        let worker = Worker {
            tree: CallTree::new(),
            collaborators: self.collaborators.clone(),
            cancel: self.cancel.clone(),
        };
        let refresh_delay = self.config.refresh_delay;

        let handle = std::thread::Builder::new()
            .name("trace-session-worker".to_string())
            .spawn(move || worker.run(rx, refresh_delay))?;

        self.tx = Some(tx);
        self.handle = Some(handle);
        self.started = true;
        Ok(())
    }

    /// Parse and enqueue one line of user input. Unrecognized commands are
    /// logged and otherwise ignored; malformed input never fails a session.
    pub fn dispatch(&self, text: &str) {
        let Some(command) = mtrace_lang::parse_line(text) else {
            warn!(input = text, "unrecognized command, ignoring");
            return;
        };

        match &self.tx {
            Some(tx) => {
                if tx.send(WorkerTask::Dispatch(command)).is_err() {
                    warn!(input = text, "session worker is gone, command dropped");
                }
            }
            None => {
                warn!(input = text, "refresh loop not running, command dropped");
            }
        }
    }

    /// Stop accepting work, cancel in-flight operations and release the
    /// worker. Idempotent; also invoked from `Drop`.
    pub fn shutdown(&mut self) {
        self.cancel.cancel();
        if let Some(tx) = self.tx.take() {
            let _ = tx.send(WorkerTask::Shutdown);
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for SessionController {
    fn drop(&mut self) {
        self.shutdown();
    }
}

/// Everything the worker thread owns. The aggregate tree is only ever
/// touched here, so refresh ticks and command handlers can never race.
struct Worker {
    tree: CallTree,
    collaborators: Collaborators,
    cancel: CancelToken,
}

impl Worker {
    fn run(mut self, rx: std::sync::mpsc::Receiver<WorkerTask>, refresh_delay: Duration) {
        let mut next_tick = Instant::now() + refresh_delay;

        loop {
            if self.cancel.is_cancelled() {
                break;
            }

            let timeout = next_tick.saturating_duration_since(Instant::now());
            match rx.recv_timeout(timeout) {
                Ok(WorkerTask::Dispatch(command)) => self.handle_command(command),
                Ok(WorkerTask::Shutdown) => break,
                Err(RecvTimeoutError::Timeout) => {
                    self.refresh_tick();
                    // Fixed delay: the next tick is scheduled only after
                    // this one (including the blocking UI delivery) is done.
                    next_tick = Instant::now() + refresh_delay;
                }
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
    }

    /// One refresh tick: drain pending deltas, merge them, publish the
    /// flattened snapshot. `set_stats` blocks until the UI accepts, which is
    /// the backpressure contract. The elapsed wall time is reported whether
    /// or not any deltas arrived.
    fn refresh_tick(&mut self) {
        let started = Instant::now();

        let deltas = self.collaborators.delta_source.collect_and_reset();
        for delta in &deltas {
            self.tree.accumulate(delta);
        }

        self.publish();
        self.collaborators.sink.set_refresh_time(started.elapsed());
    }

    fn publish(&self) {
        self.collaborators.sink.set_stats(self.tree.flatten());
    }

    fn handle_command(&mut self, command: Command) {
        match command {
            Command::Clear => {
                self.tree.clear();
                self.publish();
            }
            Command::Reset => {
                self.tree = CallTree::new();
                self.publish();
            }
            Command::Trace {
                enable,
                option,
                target,
            } => self.apply_trace(enable, option, &target),
        }
    }

    fn apply_trace(&mut self, enable: bool, option: Option<TraceOption>, target: &TraceTarget) {
        let flags = option.unwrap_or(TraceOption::All).flags();
        let resolved = resolve_target(target);

        let classes = self.collaborators.engine.matching_classes(&resolved.query);
        if classes.is_empty() {
            // "Nothing to trace" is success, not an error.
            debug!(?target, "target resolved to no classes, nothing to do");
            return;
        }

        let store = &self.collaborators.config_store;
        for class_name in &classes {
            match &resolved.selector {
                MethodSelector::AllMethods => {
                    if enable {
                        store.trace_methods(class_name, "", flags);
                    } else {
                        store.untrace_methods(class_name, "");
                    }
                }
                MethodSelector::Pattern(prefix) => {
                    if enable {
                        store.trace_methods(class_name, prefix, flags);
                    } else {
                        store.untrace_methods(class_name, prefix);
                    }
                }
                MethodSelector::Exact {
                    method_name,
                    param_indexes,
                } => {
                    let method = MethodRef {
                        class_name: class_name.clone(),
                        method_name: method_name.clone(),
                        param_indexes: param_indexes.clone(),
                    };
                    if enable {
                        store.trace_method(&method, flags);
                    } else {
                        store.untrace_method(&method);
                    }
                }
            }
        }

        let outcomes = self
            .collaborators
            .engine
            .retransform(&classes, &self.cancel);
        for outcome in outcomes {
            match outcome.status {
                RetransformStatus::Transformed => {}
                RetransformStatus::Unmodifiable => {
                    warn!(class = %outcome.class_name, "class is unmodifiable, skipped");
                }
                RetransformStatus::Failed(message) => {
                    // Isolated per class; the rest of the batch proceeds.
                    warn!(
                        class = %outcome.class_name,
                        error = %message,
                        "retransformation failed"
                    );
                }
                RetransformStatus::Cancelled => {
                    debug!(
                        class = %outcome.class_name,
                        "retransformation cancelled before this class"
                    );
                }
            }
        }
    }
}
