//! Testing infrastructure for mtrace integration tests.
//!
//! This crate provides in-memory doubles for every collaborator interface
//! the session controller consumes:
//! - `doubles`: recording sink, scripted delta source, recording config
//!   store, static instrumentation engine
//! - `session`: `TestSession`, a wired-up controller plus handles to its
//!   doubles for declarative scenario setup

pub mod doubles;
pub mod session;

pub use doubles::{RecordingConfigStore, RecordingSink, ScriptedDeltaSource, StaticEngine};
pub use session::{single_call_delta, TestSession};
