//! Loader-hook integration scenarios
//!
//! The hook plays the role of a remote catalog: the engine asks it for
//! unknown names and resumes resolution from whatever definitions the
//! hook supplies, synchronously or on a later logical turn.

use anyhow::Result;
use weft::{ModuleState, ResolveError, Resolver};
use weft_tests::{EventLog, ScriptedLoader, failing_loader, init_test_logging};

#[test]
fn scripted_catalog_resolves_transitive_fetches() -> Result<()> {
    init_test_logging();
    let mut resolver = Resolver::new();
    let log = EventLog::new();

    // Everything below "app" lives in the remote catalog.
    let loader = ScriptedLoader::new()
        .provide("ui", &["layout"])
        .provide("layout", &[]);
    let requests = loader.requests();
    loader.install(&mut resolver);

    resolver.define_with("app", &["ui"], log.init("app"))?;
    resolver.require("app", log.mark("ready"))?;

    assert_eq!(
        *requests.borrow(),
        vec!["ui".to_string(), "layout".to_string()]
    );
    assert_eq!(log.events(), vec!["app", "ready"]);
    assert!(resolver.is_loaded("ui"));
    assert!(resolver.is_loaded("layout"));
    Ok(())
}

#[test]
fn each_use_of_an_unknown_name_asks_the_catalog_once() -> Result<()> {
    init_test_logging();
    let mut resolver = Resolver::new();

    let loader = ScriptedLoader::new();
    let requests = loader.requests();
    loader.install(&mut resolver);

    resolver.request("missing")?;
    assert_eq!(*requests.borrow(), vec!["missing".to_string()]);
    Ok(())
}

#[test]
fn deferred_definition_resumes_the_stalled_chain() -> Result<()> {
    init_test_logging();
    let mut resolver = Resolver::new();
    let log = EventLog::new();

    // A hook that only records, modeling a fetch still in flight.
    let loader = ScriptedLoader::new();
    let requests = loader.requests();
    loader.install(&mut resolver);

    resolver.define_with("app", &["remote"], log.init("app"))?;
    resolver.require("app", log.mark("ready"))?;
    assert_eq!(*requests.borrow(), vec!["remote".to_string()]);
    assert!(log.is_empty());
    assert_eq!(resolver.state("app"), ModuleState::Pending);

    // The "fetch" completes on a later turn and calls define.
    resolver.define_with("remote", &[], log.init("remote"))?;
    assert_eq!(log.events(), vec!["remote", "app", "ready"]);
    Ok(())
}

#[test]
fn fetch_that_never_completes_leaves_consumers_pending() -> Result<()> {
    init_test_logging();
    let mut resolver = Resolver::new();
    let log = EventLog::new();

    ScriptedLoader::new().install(&mut resolver);
    resolver.define("app", &["void"])?;
    resolver.require("app", log.mark("never"))?;

    assert!(log.is_empty());
    assert_eq!(resolver.state("app"), ModuleState::Pending);
    assert_eq!(resolver.state("void"), ModuleState::Unknown);
    assert!(!resolver.has_cycles());
    Ok(())
}

#[test]
fn hook_errors_reach_the_requesting_call_site() {
    init_test_logging();
    let mut resolver = Resolver::new();
    resolver.set_loader(failing_loader("catalog unreachable"));

    let err = resolver.request("anything").unwrap_err();
    match err {
        ResolveError::Loader { name, source } => {
            assert_eq!(name, "anything");
            assert_eq!(source.to_string(), "catalog unreachable");
        }
        other => panic!("expected loader error, got {other}"),
    }
}

#[test]
fn clearing_the_hook_makes_unknown_names_inert() -> Result<()> {
    init_test_logging();
    let mut resolver = Resolver::new();
    resolver.set_loader(failing_loader("should never run"));
    resolver.clear_loader();

    resolver.request("quiet")?;
    assert_eq!(resolver.state("quiet"), ModuleState::Unknown);
    Ok(())
}
