//! Property tests for resolution, filtering and verification

mod common;

use common::{authorizer, specified_user, Number, Numbers};
use cretoai_guard::{AuthzError, Policy, PolicyRegistry, Target};
use proptest::prelude::*;

fn type_name() -> impl Strategy<Value = String> {
    "[A-Z][a-z]{2,8}"
}

fn role() -> impl Strategy<Value = Option<String>> {
    prop_oneof![
        Just(None),
        Just(specified_user()),
        "[a-z]{3,8}".prop_map(Some),
    ]
}

/// A linear hierarchy T0 <- T1 <- ... <- Tn, returned leaf first
fn chain_registry(depth: usize, policy_at: usize) -> (PolicyRegistry<()>, Vec<String>) {
    let names: Vec<String> = (0..depth).map(|i| format!("Kind{}", i)).collect();
    let mut registry = PolicyRegistry::new();

    registry.register_type(&names[0]).unwrap();
    for pair in names.windows(2) {
        registry.register_subtype(&pair[1], &pair[0]).unwrap();
    }
    registry
        .register_policy(Policy::new(format!("{}Policy", names[policy_at])))
        .unwrap();

    let leaf_first = names.into_iter().rev().collect();
    (registry, leaf_first)
}

proptest! {
    #[test]
    fn prop_instance_override_always_wins(base in type_name(), policy in type_name()) {
        let registry = PolicyRegistry::<()>::new();
        let target = Target::Instance { type_name: &base, policy: Some(&policy) };

        let resolved = registry.resolve_target(target).unwrap();
        prop_assert_eq!(resolved.as_str(), policy.as_str());
    }

    #[test]
    fn prop_declared_type_policy_beats_convention(base in type_name(), policy in type_name()) {
        let mut registry = PolicyRegistry::<()>::new();
        registry.register_policy(Policy::new(format!("{}Policy", base))).unwrap();
        registry.declare_policy(&base, policy.as_str());

        let resolved = registry.resolve_target(Target::instance(&base)).unwrap();
        prop_assert_eq!(resolved.as_str(), policy.as_str());
    }

    #[test]
    fn prop_nearest_ancestor_with_policy_wins(depth in 2usize..8, offset in 0usize..8) {
        let policy_at = offset % depth;
        let (registry, leaf_first) = chain_registry(depth, policy_at);
        let resolved = registry.resolve_target(Target::instance(&leaf_first[0])).unwrap();
        prop_assert_eq!(resolved.as_str(), format!("Kind{}Policy", policy_at));
    }

    #[test]
    fn prop_exhausted_chain_reports_base(depth in 1usize..8) {
        let names: Vec<String> = (0..depth).map(|i| format!("Node{}", i)).collect();
        let mut registry = PolicyRegistry::<()>::new();
        registry.register_type(&names[0]).unwrap();
        for pair in names.windows(2) {
            registry.register_subtype(&pair[1], &pair[0]).unwrap();
        }

        let leaf = names.last().unwrap();
        match registry.resolve_target(Target::Type(leaf)) {
            Err(AuthzError::PolicyNotFound { type_name }) => {
                prop_assert_eq!(type_name.as_deref(), Some(leaf.as_str()))
            }
            other => prop_assert!(false, "unexpected result: {:?}", other),
        }
    }

    #[test]
    fn prop_filter_never_mutates_scope(values in prop::collection::vec(-1000i64..1000, 0..50), role in role()) {
        let mut authorizer = authorizer(role, "read");
        let scope = Numbers(values.clone());

        let filtered = authorizer.policy_filter(&scope).unwrap();

        prop_assert_eq!(&scope.0, &values);
        prop_assert!(filtered.0.iter().all(|v| values.contains(v)));
        prop_assert!(filtered.0.len() <= values.len());
    }

    #[test]
    fn prop_authorize_and_is_authorized_agree(value in -1000i64..1000, role in role()) {
        let number = Number(value);

        let mut strict = authorizer(role.clone(), "read");
        let authorized = strict.authorize(&number);

        let mut lenient = authorizer(role, "read");
        let allowed = lenient.is_authorized(&number).unwrap();

        match authorized {
            Ok(same) => {
                prop_assert!(allowed);
                prop_assert!(std::ptr::eq(same, &number));
            }
            Err(err) => {
                prop_assert!(!allowed);
                prop_assert!(err.is_not_authorized());
            }
        }
    }

    #[test]
    fn prop_any_dispatch_satisfies_verification(value in -1000i64..1000, filter in any::<bool>()) {
        let mut authorizer = authorizer(None, "read");
        prop_assert!(authorizer.verify_applied().is_err());

        if filter {
            authorizer.policy_filter(&Numbers(vec![value])).unwrap();
        } else {
            let _ = authorizer.is_authorized(&Number(value)).unwrap();
        }
        prop_assert!(authorizer.verify_applied().is_ok());
    }
}

#[test]
fn test_absent_target_never_resolves() {
    let registry = common::number_registry();
    let err = registry.resolve_target(Target::Absent).unwrap_err();
    assert!(matches!(err, AuthzError::PolicyNotFound { type_name: None }));
}
