// Tests for cycle diagnostics

use super::*;

#[test]
fn test_empty_resolver_has_no_cycles() {
    let resolver = Resolver::new();
    assert!(!resolver.has_cycles());
    assert_eq!(resolver.detect_cycle(), None);
}

#[test]
fn test_acyclic_chain_has_no_cycles() {
    let mut resolver = Resolver::new();
    resolver.define("c", &["b"]).unwrap();
    resolver.define("b", &["a"]).unwrap();
    assert!(!resolver.has_cycles());
    assert_eq!(resolver.detect_cycle(), None);
}

#[test]
fn test_three_module_cycle_is_reported() {
    let mut resolver = Resolver::new();
    resolver.define("a", &["b"]).unwrap();
    resolver.define("b", &["c"]).unwrap();
    resolver.define("c", &["a"]).unwrap();

    assert!(resolver.has_cycles());
    let mut cycle = resolver.detect_cycle().unwrap();
    cycle.sort_unstable();
    assert_eq!(cycle, vec!["a".to_string(), "b".to_string(), "c".to_string()]);
}

#[test]
fn test_self_dependency_is_a_cycle() {
    let mut resolver = Resolver::new();
    resolver.define("narcissus", &["narcissus"]).unwrap();

    assert!(resolver.has_cycles());
    assert_eq!(
        resolver.detect_cycle(),
        Some(vec!["narcissus".to_string()])
    );
}

#[test]
fn test_loaded_modules_leave_the_pending_graph() {
    let mut resolver = Resolver::new();
    resolver.define("b", &["a"]).unwrap();
    resolver.define("a", &[]).unwrap();
    resolver.request("b").unwrap();
    assert!(resolver.is_loaded("b"));

    assert!(!resolver.has_cycles());
}

#[test]
fn test_cycle_detection_never_unblocks_the_deadlock() {
    let mut resolver = Resolver::new();
    resolver.define("a", &["b"]).unwrap();
    resolver.define("b", &["a"]).unwrap();
    resolver.request("a").unwrap();

    assert!(resolver.has_cycles());
    assert_eq!(resolver.state("a"), crate::primitives::ModuleState::Pending);
    assert_eq!(resolver.state("b"), crate::primitives::ModuleState::Pending);
}

#[test]
fn test_undefined_dependency_is_not_a_cycle() {
    let mut resolver = Resolver::new();
    resolver.define("app", &["phantom"]).unwrap();
    resolver.request("app").unwrap();

    assert!(!resolver.has_cycles());
    assert_eq!(resolver.detect_cycle(), None);
}
