// Tests for the resolution engine

use super::*;

// ============================================================================
// Test Utilities
// ============================================================================

fn counter() -> Rc<Cell<usize>> {
    Rc::new(Cell::new(0))
}

/// Initializer that bumps a shared counter and succeeds.
fn bump_init(count: &Rc<Cell<usize>>) -> impl FnMut() -> Result<(), ModuleError> + 'static {
    let count = Rc::clone(count);
    move || {
        count.set(count.get() + 1);
        Ok(())
    }
}

/// Use-callback that bumps a shared counter.
fn bump_use(count: &Rc<Cell<usize>>) -> impl FnOnce() + 'static {
    let count = Rc::clone(count);
    move || count.set(count.get() + 1)
}

fn event_log() -> Rc<RefCell<Vec<&'static str>>> {
    Rc::new(RefCell::new(Vec::new()))
}

/// Initializer that appends a label to a shared event log.
fn log_init(
    log: &Rc<RefCell<Vec<&'static str>>>,
    label: &'static str,
) -> impl FnMut() -> Result<(), ModuleError> + 'static {
    let log = Rc::clone(log);
    move || {
        log.borrow_mut().push(label);
        Ok(())
    }
}

/// Use-callback that appends a label to a shared event log.
fn log_use(
    log: &Rc<RefCell<Vec<&'static str>>>,
    label: &'static str,
) -> impl FnOnce() + 'static {
    let log = Rc::clone(log);
    move || log.borrow_mut().push(label)
}

// ============================================================================
// Define / Use Basics
// ============================================================================

#[test]
fn test_no_dependencies() {
    let mut resolver = Resolver::new();
    let count = counter();

    resolver.define_with("hello", &[], bump_init(&count)).unwrap();
    // Lazy finalization: defining alone runs nothing.
    assert_eq!(count.get(), 0);

    resolver.require("hello", bump_use(&count)).unwrap();
    assert_eq!(count.get(), 2);

    // "hello" is loaded, so "world" has no pending dependencies left.
    resolver
        .define_with("world", &["hello"], bump_init(&count))
        .unwrap();
    assert_eq!(count.get(), 2);

    resolver.require("world", bump_use(&count)).unwrap();
    assert_eq!(count.get(), 4);
}

#[test]
fn test_initializer_runs_before_use_callback() {
    let mut resolver = Resolver::new();
    let log = event_log();

    resolver
        .define_with("hello", &[], log_init(&log, "init"))
        .unwrap();
    resolver.require("hello", log_use(&log, "use")).unwrap();

    assert_eq!(*log.borrow(), vec!["init", "use"]);
    assert!(resolver.is_loaded("hello"));
}

#[test]
fn test_reverse_definition_order() {
    let mut resolver = Resolver::new();
    let count = counter();

    resolver.define("world", &["hello"]).unwrap();
    resolver.require("world", bump_use(&count)).unwrap();
    assert_eq!(count.get(), 0);
    assert_eq!(resolver.state("world"), ModuleState::Pending);

    resolver.define("hello", &[]).unwrap();
    resolver.require("hello", bump_use(&count)).unwrap();
    assert_eq!(count.get(), 2);
    assert!(resolver.is_loaded("world"));
}

#[test]
fn test_use_before_define() {
    let mut resolver = Resolver::new();
    let count = counter();

    resolver.require("hello", bump_use(&count)).unwrap();
    assert_eq!(count.get(), 0);

    resolver
        .define_with("hello", &["world"], bump_init(&count))
        .unwrap();
    assert_eq!(count.get(), 0);

    resolver.define("world", &[]).unwrap();
    assert_eq!(count.get(), 2);
}

#[test]
fn test_callback_fires_exactly_once() {
    let mut resolver = Resolver::new();
    let count = counter();

    resolver.require("hello", bump_use(&count)).unwrap();
    resolver.define("hello", &[]).unwrap();
    assert_eq!(count.get(), 1);

    // Nothing left queued: repeated loads change nothing.
    resolver.request("hello").unwrap();
    assert_eq!(count.get(), 1);
}

// ============================================================================
// Dependency Chains and Propagation Order
// ============================================================================

#[test]
fn test_chain_fires_in_dependency_order() {
    let mut resolver = Resolver::new();
    let log = event_log();

    resolver.define_with("c", &["b"], log_init(&log, "c")).unwrap();
    resolver.define_with("b", &["a"], log_init(&log, "b")).unwrap();
    resolver.define_with("a", &[], log_init(&log, "a")).unwrap();
    assert!(log.borrow().is_empty());

    resolver.require("c", log_use(&log, "use-c")).unwrap();
    assert_eq!(*log.borrow(), vec!["a", "b", "c", "use-c"]);
}

#[test]
fn test_chain_defined_in_any_order() {
    let orders: [[&str; 3]; 3] = [["a", "b", "c"], ["b", "c", "a"], ["c", "a", "b"]];
    for order in orders {
        let mut resolver = Resolver::new();
        let log = event_log();

        for name in order {
            match name {
                "a" => resolver.define_with("a", &[], log_init(&log, "a")).unwrap(),
                "b" => resolver
                    .define_with("b", &["a"], log_init(&log, "b"))
                    .unwrap(),
                _ => resolver
                    .define_with("c", &["b"], log_init(&log, "c"))
                    .unwrap(),
            }
        }

        resolver.request("c").unwrap();
        assert_eq!(*log.borrow(), vec!["a", "b", "c"], "define order {order:?}");
    }
}

#[test]
fn test_sibling_propagation_follows_edge_insertion_order() {
    let mut resolver = Resolver::new();
    let log = event_log();

    resolver.define_with("first", &["base"], log_init(&log, "first")).unwrap();
    resolver
        .define_with("second", &["base"], log_init(&log, "second"))
        .unwrap();
    resolver.define_with("base", &[], log_init(&log, "base")).unwrap();

    resolver.request("base").unwrap();
    assert_eq!(*log.borrow(), vec!["base", "first", "second"]);
}

#[test]
fn test_diamond_initializes_each_module_once() {
    let mut resolver = Resolver::new();
    let log = event_log();

    resolver
        .define_with("app", &["left", "right"], log_init(&log, "app"))
        .unwrap();
    resolver
        .define_with("left", &["base"], log_init(&log, "left"))
        .unwrap();
    resolver
        .define_with("right", &["base"], log_init(&log, "right"))
        .unwrap();
    resolver.define_with("base", &[], log_init(&log, "base")).unwrap();

    resolver.require("app", log_use(&log, "use-app")).unwrap();
    assert_eq!(*log.borrow(), vec!["base", "left", "right", "app", "use-app"]);
}

#[test]
fn test_already_satisfied_dependencies_are_excluded() {
    let mut resolver = Resolver::new();
    resolver.define("base", &[]).unwrap();
    resolver.request("base").unwrap();

    resolver.define("app", &["base", "extra"]).unwrap();
    assert_eq!(resolver.dependencies("app").unwrap(), ["extra".to_string()]);
    assert_eq!(resolver.pending_count("app"), Some(1));
}

// ============================================================================
// Cycles
// ============================================================================

#[test]
fn test_cycle_deadlocks_silently() {
    let mut resolver = Resolver::new();
    let count = counter();

    resolver.define_with("a", &["b"], bump_init(&count)).unwrap();
    resolver.define_with("b", &["c"], bump_init(&count)).unwrap();
    resolver.define_with("c", &["a"], bump_init(&count)).unwrap();
    assert_eq!(count.get(), 0);

    resolver.request("a").unwrap();
    assert_eq!(count.get(), 0);

    // A use registered after the deadlock never fires either.
    resolver.require("a", bump_use(&count)).unwrap();
    assert_eq!(count.get(), 0);
    assert_eq!(resolver.state("a"), ModuleState::Pending);
    assert_eq!(resolver.state("b"), ModuleState::Pending);
    assert_eq!(resolver.state("c"), ModuleState::Pending);
}

#[test]
fn test_self_dependency_deadlocks_silently() {
    let mut resolver = Resolver::new();
    let count = counter();

    resolver.define_with("narcissus", &["narcissus"], bump_init(&count)).unwrap();
    resolver.require("narcissus", bump_use(&count)).unwrap();
    assert_eq!(count.get(), 0);
    assert_eq!(resolver.state("narcissus"), ModuleState::Pending);
}

// ============================================================================
// Multi-Target Use
// ============================================================================

#[test]
fn test_many_targets_already_loaded_fire_synchronously() {
    let mut resolver = Resolver::new();
    let count = counter();
    let hook_calls = counter();

    resolver.define("x", &[]).unwrap();
    resolver.define("y", &[]).unwrap();
    resolver.request(["x", "y"]).unwrap();
    assert!(resolver.is_loaded("x") && resolver.is_loaded("y"));

    let calls = Rc::clone(&hook_calls);
    resolver.set_loader(move |_, _| {
        calls.set(calls.get() + 1);
        Ok(())
    });

    resolver.require(["x", "y"], bump_use(&count)).unwrap();
    assert_eq!(count.get(), 1);
    assert_eq!(hook_calls.get(), 0);
}

#[test]
fn test_empty_target_list_fires_immediately() {
    let mut resolver = Resolver::new();
    let count = counter();

    resolver.require(Vec::<String>::new(), bump_use(&count)).unwrap();
    assert_eq!(count.get(), 1);
}

#[test]
fn test_many_targets_wait_for_the_last_one() {
    let mut resolver = Resolver::new();
    let count = counter();

    resolver.define("x", &[]).unwrap();
    resolver.require(["x", "y"], bump_use(&count)).unwrap();
    assert_eq!(count.get(), 0);

    resolver.define("y", &[]).unwrap();
    assert_eq!(count.get(), 1);
}

#[test]
fn test_duplicate_targets_are_each_counted() {
    let mut resolver = Resolver::new();
    let count = counter();

    resolver.require(["x", "x"], bump_use(&count)).unwrap();
    assert_eq!(count.get(), 0);

    resolver.define("x", &[]).unwrap();
    assert_eq!(count.get(), 1);
}

// ============================================================================
// Loader Hook
// ============================================================================

#[test]
fn test_hook_receives_unknown_names() {
    let mut resolver = Resolver::new();
    let requested: Rc<RefCell<Vec<String>>> = Rc::new(RefCell::new(Vec::new()));
    let seen = Rc::clone(&requested);
    resolver.set_loader(move |_, name| {
        seen.borrow_mut().push(name.to_string());
        Ok(())
    });

    let count = counter();
    resolver.define_with("world", &["hello"], bump_init(&count)).unwrap();
    assert!(requested.borrow().is_empty());

    resolver.request("world").unwrap();
    assert_eq!(*requested.borrow(), vec!["hello".to_string()]);
    assert_eq!(count.get(), 0);
}

#[test]
fn test_hook_defines_synchronously() {
    let mut resolver = Resolver::new();
    resolver.set_loader(|engine, name| engine.define(name, &[]));

    let count = counter();
    resolver.define_with("world", &["hello"], bump_init(&count)).unwrap();
    assert_eq!(count.get(), 0);

    resolver.require("world", bump_use(&count)).unwrap();
    // The original use callback fired before the hook returned.
    assert_eq!(count.get(), 2);
}

#[test]
fn test_hook_defines_several_names_at_once() {
    let mut resolver = Resolver::new();
    resolver.set_loader(|engine, name| {
        if name == "b" {
            engine.define(name, &[])?;
            engine.define("b2", &[])?;
        }
        Ok(())
    });

    let count = counter();
    resolver.define_with("a", &["b", "b2"], bump_init(&count)).unwrap();
    resolver.require("a", bump_use(&count)).unwrap();
    assert_eq!(count.get(), 2);
}

#[test]
fn test_hook_that_never_defines_leaves_chain_pending() {
    let mut resolver = Resolver::new();
    resolver.set_loader(|_, _| Ok(()));

    let count = counter();
    resolver.define("app", &["phantom"]).unwrap();
    resolver.require("app", bump_use(&count)).unwrap();

    assert_eq!(count.get(), 0);
    assert_eq!(resolver.state("app"), ModuleState::Pending);
    assert_eq!(resolver.state("phantom"), ModuleState::Unknown);
}

#[test]
fn test_no_hook_is_legal() {
    let mut resolver = Resolver::new();
    let count = counter();
    resolver.require("missing", bump_use(&count)).unwrap();
    assert_eq!(count.get(), 0);
    assert!(resolver.contains("missing"));
}

#[test]
fn test_hook_failure_propagates_to_the_invoker() {
    let mut resolver = Resolver::new();
    resolver.set_loader(|_, name| Err(ResolveError::loader(name, "registry unreachable")));

    let result = resolver.request("missing");
    assert!(matches!(result, Err(ResolveError::Loader { name, .. }) if name == "missing"));

    // The hook was restored after the failure.
    let result = resolver.request("missing");
    assert!(matches!(result, Err(ResolveError::Loader { .. })));
}

#[test]
fn test_define_after_callbackless_demand_resumes() {
    let mut resolver = Resolver::new();
    resolver.request("world").unwrap();
    assert!(resolver.contains("world"));
    assert_eq!(resolver.state("world"), ModuleState::Unknown);

    resolver.define("world", &[]).unwrap();
    assert!(resolver.is_loaded("world"));
}

// ============================================================================
// Idempotence and Error Policies
// ============================================================================

#[test]
fn test_finalize_is_idempotent() {
    let mut resolver = Resolver::new();
    let count = counter();

    resolver.define_with("hello", &[], bump_init(&count)).unwrap();
    resolver.request("hello").unwrap();
    assert_eq!(count.get(), 1);

    resolver.request("hello").unwrap();
    resolver.require("hello", bump_use(&count)).unwrap();
    assert_eq!(count.get(), 2);
}

#[test]
fn test_redefinition_is_rejected() {
    let mut resolver = Resolver::new();
    resolver.define("app", &[]).unwrap();

    let result = resolver.define("app", &["base"]);
    assert!(matches!(result, Err(ResolveError::Redefinition { name }) if name == "app"));

    // The original definition survives untouched.
    assert_eq!(resolver.dependencies("app").unwrap().len(), 0);
}

#[test]
fn test_failed_initializer_stays_pending_and_retries() {
    let mut resolver = Resolver::new();
    let healthy = Rc::new(Cell::new(false));
    let count = counter();

    let gate = Rc::clone(&healthy);
    let runs = Rc::clone(&count);
    resolver
        .define_with("flaky", &[], move || {
            if gate.get() {
                runs.set(runs.get() + 1);
                Ok(())
            } else {
                Err("not ready yet".into())
            }
        })
        .unwrap();

    let fired = counter();
    let result = resolver.require("flaky", bump_use(&fired));
    assert!(matches!(result, Err(ResolveError::Init { name, .. }) if name == "flaky"));
    assert_eq!(resolver.state("flaky"), ModuleState::Pending);
    // Queued callbacks held back until a successful setup.
    assert_eq!(fired.get(), 0);

    healthy.set(true);
    resolver.request("flaky").unwrap();
    assert!(resolver.is_loaded("flaky"));
    assert_eq!(count.get(), 1);
    assert_eq!(fired.get(), 1);
}

#[test]
fn test_failure_mid_propagation_halts_and_resumes() {
    let mut resolver = Resolver::new();
    let log = event_log();
    let healthy = Rc::new(Cell::new(false));

    resolver.define_with("base", &[], log_init(&log, "base")).unwrap();
    let gate = Rc::clone(&healthy);
    let mid_log = Rc::clone(&log);
    resolver
        .define_with("mid", &["base"], move || {
            if gate.get() {
                mid_log.borrow_mut().push("mid");
                Ok(())
            } else {
                Err("mid is broken".into())
            }
        })
        .unwrap();
    resolver.define_with("top", &["mid"], log_init(&log, "top")).unwrap();

    let fired = counter();
    let result = resolver.require("top", bump_use(&fired));
    assert!(matches!(result, Err(ResolveError::Init { name, .. }) if name == "mid"));
    assert!(resolver.is_loaded("base"));
    assert_eq!(resolver.state("mid"), ModuleState::Pending);
    assert_eq!(resolver.state("top"), ModuleState::Pending);
    assert_eq!(fired.get(), 0);

    // Retry targets the failed module; propagation resumes from there.
    healthy.set(true);
    resolver.request("mid").unwrap();
    assert_eq!(*log.borrow(), vec!["base", "mid", "top"]);
    assert!(resolver.is_loaded("top"));
    assert_eq!(fired.get(), 1);
}

// ============================================================================
// Introspection
// ============================================================================

#[test]
fn test_pending_count_tracks_progress() {
    let mut resolver = Resolver::new();
    assert_eq!(resolver.pending_count("app"), None);

    resolver.define("app", &["a", "b"]).unwrap();
    assert_eq!(resolver.pending_count("app"), Some(2));

    resolver.define("a", &[]).unwrap();
    resolver.request("app").unwrap();
    assert_eq!(resolver.pending_count("app"), Some(1));

    resolver.define("b", &[]).unwrap();
    assert_eq!(resolver.pending_count("app"), Some(0));
    assert!(resolver.is_loaded("app"));
}

#[test]
fn test_module_names_cover_demanded_and_defined() {
    let mut resolver = Resolver::new();
    resolver.define("app", &["dep"]).unwrap();
    resolver.request("ghost").unwrap();

    let mut names: Vec<&str> = resolver.module_names().collect();
    names.sort_unstable();
    assert_eq!(names, vec!["app", "dep", "ghost"]);
    assert_eq!(resolver.module_count(), 3);
}
