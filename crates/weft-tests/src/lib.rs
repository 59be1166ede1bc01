//! Shared scaffolding for weft integration tests

pub mod harness;

pub use harness::{EventLog, ScriptedLoader, failing_loader, init_test_logging};
