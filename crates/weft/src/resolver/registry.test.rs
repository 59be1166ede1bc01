// Tests for registry bookkeeping

use super::*;

#[test]
fn test_new_registry_is_empty() {
    let registry = Registry::new();
    assert!(registry.is_empty());
    assert_eq!(registry.len(), 0);
    assert!(!registry.contains("anything"));
}

#[test]
fn test_entry_creates_record_lazily() {
    let mut registry = Registry::new();
    assert_eq!(registry.state("app"), ModuleState::Unknown);
    assert!(registry.get("app").is_none());

    let record = registry.entry("app");
    assert_eq!(record.state, ModuleState::Unknown);
    assert!(!record.defined);
    assert!(!record.demanded);
    assert!(record.dependencies.is_empty());

    assert!(registry.contains("app"));
    assert_eq!(registry.len(), 1);
}

#[test]
fn test_entry_is_idempotent() {
    let mut registry = Registry::new();
    registry.entry("app").demanded = true;
    registry.entry("app");
    assert_eq!(registry.len(), 1);
    assert!(registry.get("app").unwrap().demanded);
}

#[test]
fn test_state_reflects_record() {
    let mut registry = Registry::new();
    registry.entry("app").state = ModuleState::Pending;
    assert_eq!(registry.state("app"), ModuleState::Pending);
    assert!(!registry.is_loaded("app"));

    registry.entry("app").state = ModuleState::Loaded;
    assert!(registry.is_loaded("app"));
    assert!(registry.get("app").unwrap().is_loaded());
}

#[test]
fn test_names_lists_every_record() {
    let mut registry = Registry::new();
    registry.entry("a");
    registry.entry("b");
    let mut names: Vec<&str> = registry.names().collect();
    names.sort_unstable();
    assert_eq!(names, vec!["a", "b"]);
}

#[test]
fn test_waiters_preserve_insertion_order() {
    let mut registry = Registry::new();
    let record = registry.entry("app");
    record.waiters.push(Box::new(|| {}));
    record.waiters.push(Box::new(|| {}));
    assert_eq!(registry.get("app").unwrap().waiters.len(), 2);
}
