// Tests for primitive types

use super::*;

#[test]
fn test_module_state_default_is_unknown() {
    assert_eq!(ModuleState::default(), ModuleState::Unknown);
    assert!(!ModuleState::Unknown.is_loaded());
    assert!(!ModuleState::Pending.is_loaded());
    assert!(ModuleState::Loaded.is_loaded());
}

#[test]
fn test_use_target_from_str() {
    let target: UseTarget = "app".into();
    assert_eq!(target, UseTarget::Single("app".to_string()));
    assert_eq!(target.len(), 1);
    assert_eq!(target.into_names(), vec!["app".to_string()]);
}

#[test]
fn test_use_target_from_array() {
    let target: UseTarget = ["a", "b"].into();
    assert_eq!(
        target,
        UseTarget::Many(vec!["a".to_string(), "b".to_string()])
    );
    assert_eq!(
        target.into_names(),
        vec!["a".to_string(), "b".to_string()]
    );
}

#[test]
fn test_use_target_from_owned_names() {
    let names = vec!["x".to_string(), "y".to_string()];
    let target: UseTarget = names.clone().into();
    assert_eq!(target.into_names(), names);
}

#[test]
fn test_empty_use_target() {
    let target: UseTarget = Vec::<String>::new().into();
    assert!(target.is_empty());
    assert!(target.into_names().is_empty());
}
