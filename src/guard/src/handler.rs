//! Filter and authorization handler traits
//!
//! Handlers are user-supplied business logic. The crate only constructs
//! them from a role and a target, looks an action up by name and invokes it.
//!
//! # Example
//!
//! ```rust
//! use cretoai_guard::handler::{Action, Authorization};
//!
//! struct PostAuthorization {
//!     user: Option<String>,
//!     author: String,
//! }
//!
//! struct Post {
//!     author: String,
//! }
//!
//! impl PostAuthorization {
//!     fn update(&self) -> bool {
//!         self.user.as_deref() == Some(self.author.as_str())
//!     }
//! }
//!
//! impl Authorization for PostAuthorization {
//!     type Role = Option<String>;
//!     type Resource = Post;
//!
//!     fn new(role: Self::Role, post: &Post) -> Self {
//!         Self { user: role, author: post.author.clone() }
//!     }
//!
//!     fn actions() -> Vec<Action<Self, bool>> {
//!         vec![Action::new("update?", Self::update)]
//!     }
//! }
//! ```

use std::fmt;

/// A named action method on a handler
pub struct Action<H, O> {
    name: &'static str,
    call: fn(&H) -> O,
}

impl<H, O> Action<H, O> {
    pub fn new(name: &'static str, call: fn(&H) -> O) -> Self {
        Self { name, call }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }

    pub fn invoke(&self, handler: &H) -> O {
        (self.call)(handler)
    }
}

impl<H, O> Clone for Action<H, O> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<H, O> Copy for Action<H, O> {}

impl<H, O> fmt::Debug for Action<H, O> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Action").field("name", &self.name).finish()
    }
}

/// Narrows a scope to the records a role may access
///
/// Actions only see `&self`, so the scope given to [`Filter::new`] is never
/// mutated; each action builds a new scope value.
pub trait Filter: Sized + 'static {
    type Role;
    type Scope: 'static;

    fn new(role: Self::Role, scope: &Self::Scope) -> Self;

    fn actions() -> Vec<Action<Self, Self::Scope>>;
}

/// Answers whether a role may perform an action on one resource
///
/// Action names conventionally end with `?`.
pub trait Authorization: Sized + 'static {
    type Role;
    type Resource: 'static;

    fn new(role: Self::Role, resource: &Self::Resource) -> Self;

    fn actions() -> Vec<Action<Self, bool>>;
}

/// Names of a handler's actions, in declaration order
pub(crate) fn action_names<H, O>(actions: &[Action<H, O>]) -> Vec<&'static str> {
    actions.iter().map(Action::name).collect()
}

pub(crate) fn find_action<'a, H, O>(
    actions: &'a [Action<H, O>],
    name: &str,
) -> Option<&'a Action<H, O>> {
    actions.iter().find(|action| action.name == name)
}
