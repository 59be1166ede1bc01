//! weft primitives - core types and callback contracts
//!
//! Central collection of the shared types the resolver is built on:
//! module load states, the tagged use-target, and the boxed callback
//! shapes exchanged with the host.

/// Boxed error produced by host-supplied initializers and loader hooks.
pub type ModuleError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Module initializer, run exactly once on successful finalization.
///
/// `FnMut` rather than `FnOnce`: a failed initializer stays armed so a
/// later load can retry it. It is dropped after its single successful
/// run.
pub type InitFn = Box<dyn FnMut() -> Result<(), ModuleError> + 'static>;

/// Callback waiting on module readiness; delivered exactly once.
pub type UseCallback = Box<dyn FnOnce() + 'static>;

/// Load state of a named module.
///
/// Transitions are monotonic: `Unknown → Pending → Loaded`, never
/// backward. A name that has only ever been requested (never defined)
/// stays `Unknown`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ModuleState {
    /// No definition recorded for this name.
    #[default]
    Unknown,
    /// Defined, but not every dependency has loaded yet.
    Pending,
    /// Finalized: initializer has run, waiters have been notified.
    Loaded,
}

impl ModuleState {
    /// Whether this state is terminal.
    pub fn is_loaded(self) -> bool {
        matches!(self, ModuleState::Loaded)
    }
}

/// Target of a use request: one module name or a set of them.
///
/// The callback attached to a `Many` target fires once after every
/// listed name has loaded, regardless of completion order; an empty
/// list is already satisfied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UseTarget {
    Single(String),
    Many(Vec<String>),
}

impl UseTarget {
    /// Flatten to the list of names to resolve.
    pub fn into_names(self) -> Vec<String> {
        match self {
            UseTarget::Single(name) => vec![name],
            UseTarget::Many(names) => names,
        }
    }

    /// Number of names in the target.
    pub fn len(&self) -> usize {
        match self {
            UseTarget::Single(_) => 1,
            UseTarget::Many(names) => names.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl From<&str> for UseTarget {
    fn from(name: &str) -> Self {
        UseTarget::Single(name.to_string())
    }
}

impl From<String> for UseTarget {
    fn from(name: String) -> Self {
        UseTarget::Single(name)
    }
}

impl From<Vec<String>> for UseTarget {
    fn from(names: Vec<String>) -> Self {
        UseTarget::Many(names)
    }
}

impl From<&[&str]> for UseTarget {
    fn from(names: &[&str]) -> Self {
        UseTarget::Many(names.iter().map(|n| n.to_string()).collect())
    }
}

impl<const N: usize> From<[&str; N]> for UseTarget {
    fn from(names: [&str; N]) -> Self {
        UseTarget::Many(names.iter().map(|n| n.to_string()).collect())
    }
}

#[cfg(test)]
mod tests {
    include!("mod.test.rs");
}
