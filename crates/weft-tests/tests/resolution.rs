//! End-to-end resolution scenarios
//!
//! Drives the public API the way a host embedding the resolver would:
//! declaring module graphs, requesting them in various orders, and
//! asserting initializer / callback sequencing.

use anyhow::Result;
use weft::{ModuleState, Resolver};
use weft_tests::{EventLog, init_test_logging};

#[test]
fn application_graph_loads_in_dependency_order() -> Result<()> {
    init_test_logging();
    let mut resolver = Resolver::new();
    let log = EventLog::new();

    // An app over two features sharing one core module.
    resolver.define_with("app", &["routing", "storage"], log.init("app"))?;
    resolver.define_with("routing", &["core"], log.init("routing"))?;
    resolver.define_with("storage", &["core"], log.init("storage"))?;
    resolver.define_with("core", &[], log.init("core"))?;

    assert!(log.is_empty(), "nothing runs until the app is used");
    resolver.require("app", log.mark("app-ready"))?;

    assert_eq!(
        log.events(),
        vec!["core", "routing", "storage", "app", "app-ready"]
    );
    assert_eq!(resolver.pending_count("app"), Some(0));
    Ok(())
}

#[test]
fn late_definitions_release_early_consumers() -> Result<()> {
    init_test_logging();
    let mut resolver = Resolver::new();
    let log = EventLog::new();

    resolver.require("app", log.mark("first"))?;
    resolver.require("app", log.mark("second"))?;
    assert!(log.is_empty());

    resolver.define_with("app", &["config"], log.init("app"))?;
    assert!(log.is_empty());

    resolver.define_with("config", &[], log.init("config"))?;
    // FIFO drain: waiters fire in registration order.
    assert_eq!(log.events(), vec!["config", "app", "first", "second"]);
    Ok(())
}

#[test]
fn multi_target_use_fires_once_after_the_last_arrival() -> Result<()> {
    init_test_logging();
    let mut resolver = Resolver::new();
    let log = EventLog::new();

    resolver.define_with("auth", &[], log.init("auth"))?;
    resolver.require(["auth", "billing"], log.mark("both-ready"))?;
    // "auth" loaded on demand; "billing" is still unknown.
    assert_eq!(log.events(), vec!["auth"]);
    assert_eq!(resolver.state("billing"), ModuleState::Unknown);

    resolver.define_with("billing", &[], log.init("billing"))?;
    assert_eq!(log.events(), vec!["auth", "billing", "both-ready"]);
    Ok(())
}

#[test]
fn cycles_deadlock_silently_and_diagnose_on_demand() -> Result<()> {
    init_test_logging();
    let mut resolver = Resolver::new();
    let log = EventLog::new();

    resolver.define_with("chicken", &["egg"], log.init("chicken"))?;
    resolver.define_with("egg", &["chicken"], log.init("egg"))?;
    resolver.require("chicken", log.mark("hatched"))?;

    // No error, no progress: an accepted deadlock.
    assert!(log.is_empty());
    assert_eq!(resolver.state("chicken"), ModuleState::Pending);
    assert_eq!(resolver.state("egg"), ModuleState::Pending);

    let mut cycle = resolver.detect_cycle().expect("cycle should be visible");
    cycle.sort_unstable();
    assert_eq!(cycle, vec!["chicken".to_string(), "egg".to_string()]);
    Ok(())
}

#[test]
fn initializer_failure_holds_callbacks_until_retry_succeeds() -> Result<()> {
    init_test_logging();
    let mut resolver = Resolver::new();
    let log = EventLog::new();

    let attempts = std::rc::Rc::new(std::cell::Cell::new(0u32));
    let tries = std::rc::Rc::clone(&attempts);
    let events = log.clone();
    resolver.define_with("database", &[], move || {
        tries.set(tries.get() + 1);
        if tries.get() < 3 {
            return Err(format!("connection refused (attempt {})", tries.get()).into());
        }
        events.init("database")()
    })?;

    assert!(resolver.require("database", log.mark("connected")).is_err());
    assert!(resolver.request("database").is_err());
    assert!(log.is_empty());
    assert_eq!(resolver.state("database"), ModuleState::Pending);

    resolver.request("database")?;
    assert_eq!(attempts.get(), 3);
    assert_eq!(log.events(), vec!["database", "connected"]);
    Ok(())
}

#[test]
fn independent_resolver_instances_do_not_share_state() -> Result<()> {
    init_test_logging();
    let mut first = Resolver::new();
    let mut second = Resolver::new();
    let log = EventLog::new();

    first.define_with("shared-name", &[], log.init("first"))?;
    second.define_with("shared-name", &[], log.init("second"))?;

    first.request("shared-name")?;
    assert_eq!(log.events(), vec!["first"]);
    assert!(!second.is_loaded("shared-name"));
    Ok(())
}
