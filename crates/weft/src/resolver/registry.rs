//! Module registry bookkeeping
//!
//! One record per module name, created lazily on first define or first
//! use and never destroyed. A record carries everything the engine
//! needs to drive propagation: the filtered dependency list, the
//! pending-dependency count, inverse graph edges (this module's
//! dependents), and the FIFO queue of callbacks waiting on readiness.

use std::collections::HashMap;

use crate::primitives::{InitFn, ModuleState, UseCallback};

/// Per-module metadata and propagation state.
#[derive(Default)]
pub struct ModuleRecord {
    /// Load state; only ever advances `Unknown → Pending → Loaded`.
    pub(crate) state: ModuleState,
    /// A define has been recorded for this name.
    pub(crate) defined: bool,
    /// The dependency list has been consumed by a load cascade.
    pub(crate) dispatched: bool,
    /// Dependencies not yet loaded at define time. Already-satisfied
    /// dependencies are excluded once, at that instant, and never
    /// revisited.
    pub(crate) dependencies: Vec<String>,
    /// Count of `dependencies` still not loaded; only decreases.
    pub(crate) pending: usize,
    /// Runs exactly once, on successful finalization. Retained on
    /// failure so a later load can retry.
    pub(crate) initializer: Option<InitFn>,
    /// Inverse graph edges: modules whose pending count drops when this
    /// one loads. Insertion order fixes propagation order.
    pub(crate) dependents: Vec<String>,
    /// Callbacks awaiting readiness, drained FIFO on finalization.
    pub(crate) waiters: Vec<UseCallback>,
    /// A load has been issued for this name. Lets a later define resume
    /// a cascade that dead-ended here, even when no callback was
    /// queued.
    pub(crate) demanded: bool,
}

impl ModuleRecord {
    pub(crate) fn is_loaded(&self) -> bool {
        self.state.is_loaded()
    }
}

/// Name-keyed store of module records.
#[derive(Default)]
pub struct Registry {
    records: HashMap<String, ModuleRecord>,
}

impl Registry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Fetch the record for `name`, creating it lazily.
    pub(crate) fn entry(&mut self, name: &str) -> &mut ModuleRecord {
        self.records.entry(name.to_string()).or_default()
    }

    pub(crate) fn get(&self, name: &str) -> Option<&ModuleRecord> {
        self.records.get(name)
    }

    /// Load state for `name`; `Unknown` when no record exists.
    pub fn state(&self, name: &str) -> ModuleState {
        self.records
            .get(name)
            .map(|record| record.state)
            .unwrap_or_default()
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.state(name).is_loaded()
    }

    /// Whether a record exists for `name` (defined or merely demanded).
    pub fn contains(&self, name: &str) -> bool {
        self.records.contains_key(name)
    }

    /// Number of known module names.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Iterate over all known module names.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.records.keys().map(String::as_str)
    }

    pub(crate) fn records(&self) -> impl Iterator<Item = (&str, &ModuleRecord)> {
        self.records
            .iter()
            .map(|(name, record)| (name.as_str(), record))
    }
}

#[cfg(test)]
mod tests {
    include!("registry.test.rs");
}
