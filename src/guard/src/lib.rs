//! # CretoAI Guard
//!
//! Policy resolution and dispatch for request handlers.
//!
//! ## Features
//!
//! - **Policy resolution**: per-instance override, per-type declaration, then
//!   `<Type>Policy` naming inference up the registered type hierarchy
//! - **Handler dispatch**: filter handlers narrow scopes, authorization
//!   handlers answer yes/no for one resource
//! - **Fail-safe verification**: every request tracks whether a policy was
//!   applied and can be rejected if none was
//! - **Axum integration** (feature `http`): errors map to HTTP rejections
//!
//! ## Example
//!
//! ```rust
//! use cretoai_guard::{
//!     Action, Authorizable, Authorizer, Filter, Model, Policy, PolicyRegistry, StaticContext,
//!     Target,
//! };
//! use std::sync::Arc;
//!
//! #[derive(Debug, Clone)]
//! struct Task {
//!     done: bool,
//! }
//!
//! impl Model for Task {
//!     const TYPE_NAME: &'static str = "Task";
//! }
//!
//! struct TaskFilter {
//!     tasks: Vec<Task>,
//! }
//!
//! impl TaskFilter {
//!     fn index(&self) -> Vec<Task> {
//!         self.tasks.iter().filter(|t| !t.done).cloned().collect()
//!     }
//! }
//!
//! impl Filter for TaskFilter {
//!     type Role = ();
//!     type Scope = Vec<Task>;
//!
//!     fn new(_role: (), tasks: &Vec<Task>) -> Self {
//!         Self { tasks: tasks.clone() }
//!     }
//!
//!     fn actions() -> Vec<Action<Self, Vec<Task>>> {
//!         vec![Action::new("index", Self::index)]
//!     }
//! }
//!
//! let mut registry = PolicyRegistry::new();
//! registry.register_policy(Policy::new("TaskPolicy").filter::<TaskFilter>())?;
//!
//! let mut authorizer = Authorizer::new(Arc::new(registry), StaticContext::new((), "index"));
//! let tasks = vec![Task { done: true }, Task { done: false }];
//!
//! let open = authorizer.policy_filter(&tasks)?;
//! assert_eq!(open.len(), 1);
//! authorizer.verify_applied()?;
//! # Ok::<(), cretoai_guard::AuthzError>(())
//! ```

pub mod authorizer;
pub mod config;
mod dispatch;
pub mod error;
pub mod handler;
pub mod hierarchy;
pub mod policy;
pub mod registry;
pub mod testing;
pub mod tracking;
pub mod types;

#[cfg(feature = "http")]
pub mod http;

// Re-export commonly used types
pub use authorizer::{Authorizer, DispatchOptions, RequestContext, StaticContext};
pub use config::GuardConfig;
pub use error::{AuthzError, RegistryError, Result};
pub use handler::{Action, Authorization, Filter};
pub use hierarchy::TypeHierarchy;
pub use policy::Policy;
pub use registry::PolicyRegistry;
pub use tracking::PolicyTracker;
pub use types::{Authorizable, HandlerKind, Model, PolicyRef, Target, TypeRef};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
