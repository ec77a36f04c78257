//! Shared fixtures: a number policy and a small record hierarchy

#![allow(dead_code)]

use cretoai_guard::{
    Action, Authorizable, Authorization, Authorizer, Filter, Policy, PolicyRegistry,
    StaticContext, Target,
};
use std::sync::Arc;

pub const SPECIFIED_USER: &str = "specified user";

pub type Role = Option<String>;

pub fn specified_user() -> Role {
    Some(SPECIFIED_USER.to_string())
}

/// A single number record
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Number(pub i64);

impl Authorizable for Number {
    fn target(&self) -> Target<'_> {
        Target::instance("Number")
    }
}

/// A collection of numbers, resolved through its `Number` model
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Numbers(pub Vec<i64>);

impl Authorizable for Numbers {
    fn target(&self) -> Target<'_> {
        Target::relation("Number")
    }
}

pub struct NumberFilter {
    role: Role,
    values: Vec<i64>,
}

impl NumberFilter {
    fn read(&self) -> Numbers {
        if self.role.as_deref() == Some(SPECIFIED_USER) {
            return Numbers(self.values.clone());
        }
        Numbers(self.values.iter().copied().filter(|v| v % 2 == 0).collect())
    }

    fn odd(&self) -> Numbers {
        Numbers(self.values.iter().copied().filter(|v| v % 2 != 0).collect())
    }
}

impl Filter for NumberFilter {
    type Role = Role;
    type Scope = Numbers;

    fn new(role: Role, scope: &Numbers) -> Self {
        Self {
            role,
            values: scope.0.clone(),
        }
    }

    fn actions() -> Vec<Action<Self, Numbers>> {
        vec![Action::new("read", Self::read), Action::new("odd", Self::odd)]
    }
}

pub struct NumberAuthorization {
    role: Role,
    value: i64,
}

impl NumberAuthorization {
    fn read(&self) -> bool {
        self.value % 2 == 0 || self.role.as_deref() == Some(SPECIFIED_USER)
    }

    fn positive(&self) -> bool {
        self.value > 0
    }
}

impl Authorization for NumberAuthorization {
    type Role = Role;
    type Resource = Number;

    fn new(role: Role, number: &Number) -> Self {
        Self {
            role,
            value: number.0,
        }
    }

    fn actions() -> Vec<Action<Self, bool>> {
        vec![
            Action::new("read?", Self::read),
            Action::new("positive?", Self::positive),
        ]
    }
}

pub fn number_registry() -> PolicyRegistry<Role> {
    let mut registry = PolicyRegistry::new();
    registry
        .register_policy(
            Policy::new("NumberPolicy")
                .filter::<NumberFilter>()
                .authorization::<NumberAuthorization>(),
        )
        .expect("register NumberPolicy");
    registry
}

pub fn authorizer(role: Role, action: &str) -> Authorizer<StaticContext<Role>> {
    Authorizer::new(Arc::new(number_registry()), StaticContext::new(role, action))
}
