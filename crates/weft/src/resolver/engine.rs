//! Resolution engine
//!
//! Orchestrates `define`, `require`/`request`, the load cascade, and
//! finalization over the registry. Execution is single-threaded and
//! cooperative: every public operation runs to completion
//! synchronously. An asynchronous host resumes a stalled cascade by
//! calling [`Resolver::define`] from its loader hook on a later turn;
//! there is no polling or timer inside the engine.
//!
//! Cycles are not detected here. A cycle of modules with no
//! externally-definable zero-dependency entry point stays `Pending`
//! forever; that deadlock is an accepted property, observable only as
//! callbacks that never fire. See [`crate::resolver::cycle`] for the
//! opt-in diagnostic.

use std::cell::{Cell, RefCell};
use std::collections::VecDeque;
use std::rc::Rc;

use thiserror::Error;
use tracing::{debug, trace};

use crate::primitives::{InitFn, ModuleError, ModuleState, UseCallback, UseTarget};
use crate::resolver::registry::Registry;

/// Errors surfaced by resolver operations.
///
/// A dependency that never loads is *not* an error: it is observable
/// only as a callback that never fires, and callers needing bounded
/// failure must add their own timeout.
#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("module '{name}' is already defined")]
    Redefinition { name: String },

    #[error("initializer for module '{name}' failed: {source}")]
    Init {
        name: String,
        #[source]
        source: ModuleError,
    },

    #[error("loader hook failed while fetching module '{name}': {source}")]
    Loader {
        name: String,
        #[source]
        source: ModuleError,
    },
}

impl ResolveError {
    /// Wrap a host-side fetch failure, for use inside loader hooks.
    pub fn loader(name: impl Into<String>, source: impl Into<ModuleError>) -> Self {
        ResolveError::Loader {
            name: name.into(),
            source: source.into(),
        }
    }
}

/// Host-supplied hook consulted when an unknown name is requested.
///
/// Receives the engine so it can synchronously define the requested
/// module (or several). It is expected, but not required, to
/// eventually do so; a hook that never defines the name leaves every
/// dependent chain `Pending` forever, mirroring cycle semantics.
pub type LoaderHook = Box<dyn FnMut(&mut Resolver, &str) -> Result<(), ResolveError> + 'static>;

/// Shared countdown behind a multi-target require: armed at
/// `len + 1`, ticked once eagerly and once per settled name, firing
/// the callback exactly once at zero. The extra arm plus the eager
/// tick makes the empty target list fire synchronously without a
/// special branch.
struct Countdown {
    remaining: Cell<usize>,
    callback: RefCell<Option<UseCallback>>,
}

impl Countdown {
    fn new(remaining: usize, callback: UseCallback) -> Rc<Self> {
        Rc::new(Self {
            remaining: Cell::new(remaining),
            callback: RefCell::new(Some(callback)),
        })
    }

    fn tick(&self) {
        let left = self.remaining.get() - 1;
        self.remaining.set(left);
        if left == 0 {
            let callback = self.callback.borrow_mut().take();
            if let Some(callback) = callback {
                callback();
            }
        }
    }
}

/// The resolution engine.
///
/// One instance owns all registry, graph, and queue state for a host
/// context; there is no ambient singleton. Construct one per context
/// and keep all module traffic on it.
#[derive(Default)]
pub struct Resolver {
    registry: Registry,
    loader: Option<LoaderHook>,
    /// The hook is currently running further up the call stack.
    fetching: bool,
    /// Unknown names discovered while the hook was running, delivered
    /// to it in discovery order once the current invocation returns.
    fetch_queue: VecDeque<String>,
}

impl Resolver {
    /// Create an engine with an empty registry and no loader hook.
    pub fn new() -> Self {
        Self::default()
    }

    /// Install the loader hook consulted for unknown names.
    pub fn set_loader<F>(&mut self, hook: F)
    where
        F: FnMut(&mut Resolver, &str) -> Result<(), ResolveError> + 'static,
    {
        self.loader = Some(Box::new(hook));
    }

    /// Remove the loader hook. Unknown names then simply never load,
    /// which is legal.
    pub fn clear_loader(&mut self) {
        self.loader = None;
    }

    /// Register a module with no initializer.
    ///
    /// See [`Resolver::define_with`].
    pub fn define(&mut self, name: &str, dependencies: &[&str]) -> Result<(), ResolveError> {
        self.define_inner(name, dependencies, None)
    }

    /// Register a module: its dependency list and its initializer.
    ///
    /// Dependencies already loaded at this instant are excluded from
    /// the recorded list and never revisited. Finalization is lazy: a
    /// module whose filtered list is empty is not finalized here but on
    /// its first load (triggered by a use, a prior demand, or a
    /// dependent's cascade).
    ///
    /// Defining a name twice is rejected with
    /// [`ResolveError::Redefinition`].
    pub fn define_with<F>(
        &mut self,
        name: &str,
        dependencies: &[&str],
        initializer: F,
    ) -> Result<(), ResolveError>
    where
        F: FnMut() -> Result<(), ModuleError> + 'static,
    {
        self.define_inner(name, dependencies, Some(Box::new(initializer)))
    }

    fn define_inner(
        &mut self,
        name: &str,
        dependencies: &[&str],
        initializer: Option<InitFn>,
    ) -> Result<(), ResolveError> {
        if self.registry.get(name).is_some_and(|record| record.defined) {
            return Err(ResolveError::Redefinition {
                name: name.to_string(),
            });
        }

        // Keep only dependencies not yet loaded; edges and the pending
        // count are computed once, here.
        let current: Vec<String> = dependencies
            .iter()
            .filter(|dep| !self.registry.is_loaded(dep))
            .map(|dep| dep.to_string())
            .collect();
        trace!(module = name, pending = current.len(), "define");

        for dep in &current {
            self.registry.entry(dep).dependents.push(name.to_string());
        }

        let record = self.registry.entry(name);
        record.defined = true;
        record.state = ModuleState::Pending;
        record.pending = current.len();
        record.dependencies = current;
        record.initializer = initializer;

        // Someone already asked for this name: kick off resolution of
        // its dependencies now.
        let wanted = record.demanded || !record.waiters.is_empty();
        if wanted {
            self.load(name)?;
        }
        Ok(())
    }

    /// Request one or more modules and run `callback` once all of them
    /// have loaded.
    ///
    /// If every target is already loaded the callback runs
    /// synchronously, inside this call; an empty target list fires
    /// immediately. Otherwise the callback is queued and fires exactly
    /// once, whenever the last target finalizes. Completion order among
    /// the targets is irrelevant.
    pub fn require<T, F>(&mut self, target: T, callback: F) -> Result<(), ResolveError>
    where
        T: Into<UseTarget>,
        F: FnOnce() + 'static,
    {
        let names = target.into().into_names();
        let countdown = Countdown::new(names.len() + 1, Box::new(callback));
        countdown.tick();

        for name in names {
            if self.registry.is_loaded(&name) {
                countdown.tick();
            } else {
                let ticket = Rc::clone(&countdown);
                let record = self.registry.entry(&name);
                record.waiters.push(Box::new(move || ticket.tick()));
                record.demanded = true;
                self.load(&name)?;
            }
        }
        Ok(())
    }

    /// Request one or more modules without a completion callback.
    ///
    /// Marks demand and starts the load cascade for every target not
    /// yet loaded.
    pub fn request<T>(&mut self, target: T) -> Result<(), ResolveError>
    where
        T: Into<UseTarget>,
    {
        for name in target.into().into_names() {
            if !self.registry.is_loaded(&name) {
                self.registry.entry(&name).demanded = true;
                self.load(&name)?;
            }
        }
        Ok(())
    }

    /// Drive the load cascade for `name`.
    ///
    /// Iterative work-list so stack depth does not scale with graph
    /// depth. A defined module's dependency list is consumed exactly
    /// once; unknown names are handed to the loader hook and the
    /// cascade makes no further attempt on its own.
    fn load(&mut self, name: &str) -> Result<(), ResolveError> {
        let mut work = vec![name.to_string()];
        while let Some(current) = work.pop() {
            let record = self.registry.entry(&current);
            if record.is_loaded() {
                continue;
            }
            if !record.defined {
                record.demanded = true;
                trace!(module = %current, "unknown module, consulting loader hook");
                self.invoke_loader(&current)?;
                continue;
            }
            if !record.dispatched {
                record.dispatched = true;
                if record.pending == 0 {
                    self.setup(&current)?;
                } else {
                    let dependencies = record.dependencies.clone();
                    debug!(
                        module = %current,
                        pending = dependencies.len(),
                        "cascading load"
                    );
                    // Reverse push keeps the cascade depth-first in
                    // declaration order.
                    for dep in dependencies.into_iter().rev() {
                        if !self.registry.is_loaded(&dep) {
                            work.push(dep);
                        }
                    }
                }
            } else if record.pending == 0 {
                // Dependencies satisfied but finalization did not stick
                // (failed initializer): try again.
                self.setup(&current)?;
            }
        }
        Ok(())
    }

    /// Finalize `name` and propagate through its dependents.
    ///
    /// Idempotent. Runs the initializer (exactly once, on success),
    /// marks the module loaded, drains its waiters FIFO, then walks the
    /// inverse graph edges decrementing pending counts; every dependent
    /// reaching zero finalizes in turn. Propagation is an iterative
    /// work-list, depth-first, sibling order following edge-insertion
    /// order.
    ///
    /// An initializer failure leaves the module `Pending` with its
    /// waiters still queued, re-arms the initializer for a later
    /// retry, and aborts propagation with [`ResolveError::Init`].
    fn setup(&mut self, name: &str) -> Result<(), ResolveError> {
        let mut work = vec![name.to_string()];
        while let Some(current) = work.pop() {
            let record = self.registry.entry(&current);
            if record.is_loaded() {
                continue;
            }

            if let Some(mut initializer) = record.initializer.take() {
                if let Err(source) = initializer() {
                    self.registry.entry(&current).initializer = Some(initializer);
                    return Err(ResolveError::Init {
                        name: current,
                        source,
                    });
                }
            }

            let record = self.registry.entry(&current);
            record.state = ModuleState::Loaded;
            let waiters = std::mem::take(&mut record.waiters);
            let dependents = std::mem::take(&mut record.dependents);
            debug!(
                module = %current,
                waiters = waiters.len(),
                dependents = dependents.len(),
                "module loaded"
            );

            // Waiters queued while these run land in a fresh list and
            // are not guaranteed to fire in this pass.
            for waiter in waiters {
                waiter();
            }

            let mut ready = Vec::new();
            for dependent in dependents {
                let dep_record = self.registry.entry(&dependent);
                if dep_record.pending > 0 {
                    dep_record.pending -= 1;
                    if dep_record.pending == 0 {
                        ready.push(dependent);
                    }
                }
            }
            // Reverse push: depth-first, edge-insertion sibling order.
            for dependent in ready.into_iter().rev() {
                work.push(dependent);
            }
        }
        Ok(())
    }

    /// Hand `name` to the loader hook, if one is installed.
    ///
    /// The hook is taken out while it runs so it is never re-entered:
    /// unknown names its definitions cascade into are queued and
    /// handed to it, in discovery order, after the current invocation
    /// returns. The hook is restored afterwards unless it installed a
    /// replacement. Hook failures propagate uncaught to whatever call
    /// triggered the cascade; names still queued at that point are
    /// dropped (they stay demanded, so a later define resumes them).
    fn invoke_loader(&mut self, name: &str) -> Result<(), ResolveError> {
        if self.fetching {
            self.fetch_queue.push_back(name.to_string());
            return Ok(());
        }
        let Some(mut hook) = self.loader.take() else {
            return Ok(());
        };

        self.fetching = true;
        debug!(module = name, "invoking loader hook");
        let mut result = hook(self, name);
        while result.is_ok() {
            let Some(next) = self.fetch_queue.pop_front() else {
                break;
            };
            // Skip names the hook already defined along the way.
            if self.registry.get(&next).is_some_and(|record| record.defined) {
                continue;
            }
            debug!(module = %next, "invoking loader hook");
            result = hook(self, &next);
        }
        self.fetching = false;
        self.fetch_queue.clear();

        if self.loader.is_none() {
            self.loader = Some(hook);
        }
        result
    }

    /// Load state for `name`; `Unknown` for names never defined.
    pub fn state(&self, name: &str) -> ModuleState {
        self.registry.state(name)
    }

    pub fn is_loaded(&self, name: &str) -> bool {
        self.registry.is_loaded(name)
    }

    /// Whether a record exists for `name` (defined or merely demanded).
    pub fn contains(&self, name: &str) -> bool {
        self.registry.contains(name)
    }

    /// Count of `name`'s dependencies not yet loaded. `None` until the
    /// module has been defined.
    pub fn pending_count(&self, name: &str) -> Option<usize> {
        self.registry
            .get(name)
            .filter(|record| record.defined)
            .map(|record| record.pending)
    }

    /// The dependency list recorded at define time (already-satisfied
    /// dependencies excluded). `None` until the module has been
    /// defined.
    pub fn dependencies(&self, name: &str) -> Option<&[String]> {
        self.registry
            .get(name)
            .filter(|record| record.defined)
            .map(|record| record.dependencies.as_slice())
    }

    /// Number of known module names.
    pub fn module_count(&self) -> usize {
        self.registry.len()
    }

    /// Iterate over all known module names.
    pub fn module_names(&self) -> impl Iterator<Item = &str> {
        self.registry.names()
    }

    pub(crate) fn registry(&self) -> &Registry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    include!("engine.test.rs");
}
