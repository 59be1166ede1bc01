//! Test harness for resolution scenarios
//!
//! Provides an ordered event log for asserting initializer and
//! callback sequencing, and a scripted loader hook that plays the role
//! of a remote module catalog without any real transport.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;
use std::sync::Once;

use tracing_subscriber::EnvFilter;
use weft::{ModuleError, ResolveError, Resolver};

static INIT_LOGGING: Once = Once::new();

/// Install a tracing subscriber for test debugging, honoring
/// `RUST_LOG`. Safe to call from every test; only the first call wins.
pub fn init_test_logging() {
    INIT_LOGGING.call_once(|| {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_test_writer()
            .try_init();
    });
}

/// Shared, ordered record of initializer runs and callback firings.
#[derive(Clone, Default)]
pub struct EventLog {
    events: Rc<RefCell<Vec<String>>>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Initializer that records `label` and succeeds.
    pub fn init(&self, label: &str) -> impl FnMut() -> Result<(), ModuleError> + 'static {
        let events = Rc::clone(&self.events);
        let label = label.to_string();
        move || {
            events.borrow_mut().push(label.clone());
            Ok(())
        }
    }

    /// Use-callback that records `label`.
    pub fn mark(&self, label: &str) -> impl FnOnce() + 'static {
        let events = Rc::clone(&self.events);
        let label = label.to_string();
        move || events.borrow_mut().push(label)
    }

    pub fn events(&self) -> Vec<String> {
        self.events.borrow().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }
}

/// Scripted stand-in for a remote module catalog.
///
/// Each provided entry maps an unknown name to the dependency list it
/// should be defined with when the engine asks for it. Names outside
/// the catalog are only recorded, leaving their dependents pending —
/// the shape of a fetch that never completes.
#[derive(Default)]
pub struct ScriptedLoader {
    catalog: HashMap<String, Vec<String>>,
    requests: Rc<RefCell<Vec<String>>>,
}

impl ScriptedLoader {
    pub fn new() -> Self {
        Self::default()
    }

    /// Script a definition: when `name` is requested, define it with
    /// `dependencies`.
    pub fn provide(mut self, name: &str, dependencies: &[&str]) -> Self {
        self.catalog.insert(
            name.to_string(),
            dependencies.iter().map(|d| d.to_string()).collect(),
        );
        self
    }

    /// Handle to the list of names the engine has asked for, in order.
    pub fn requests(&self) -> Rc<RefCell<Vec<String>>> {
        Rc::clone(&self.requests)
    }

    /// Install this catalog as the resolver's loader hook.
    pub fn install(self, resolver: &mut Resolver) {
        let mut catalog = self.catalog;
        let requests = self.requests;
        resolver.set_loader(move |engine, name| {
            requests.borrow_mut().push(name.to_string());
            if let Some(dependencies) = catalog.remove(name) {
                let deps: Vec<&str> = dependencies.iter().map(String::as_str).collect();
                engine.define(name, &deps)?;
            }
            Ok(())
        });
    }
}

/// Loader hook that always fails, for exercising fetch-error paths.
pub fn failing_loader(message: &'static str) -> impl FnMut(&mut Resolver, &str) -> Result<(), ResolveError> + 'static
{
    move |_, name| Err(ResolveError::loader(name, message))
}
