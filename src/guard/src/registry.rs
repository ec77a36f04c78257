//! Policy registry and resolver
//!
//! The registry is the explicit namespace of policies, keyed by name, plus the
//! [`TypeHierarchy`] naming inference walks. It is populated at startup and
//! then shared read-only (e.g. behind an `Arc`) by every request.
//!
//! # Resolution order
//!
//! 1. An absent target fails with [`AuthzError::PolicyNotFound`].
//! 2. A per-instance policy override wins.
//! 3. Otherwise a policy declared on the target's type, or on its nearest
//!    declaring ancestor, wins.
//! 4. Otherwise each type in the ancestor chain of the base type (the model
//!    of a relation, the type itself, or the instance's type) is tried as
//!    `<TypeName><suffix>`; the first registered name wins. Exhausting the
//!    chain fails with the base type's name.
//!
//! # Example
//!
//! ```rust
//! use cretoai_guard::{PolicyRegistry, Policy, Target, Authorizable};
//!
//! struct Article;
//!
//! impl Authorizable for Article {
//!     fn target(&self) -> Target<'_> {
//!         Target::instance("Article")
//!     }
//! }
//!
//! let mut registry = PolicyRegistry::<Option<String>>::new();
//! registry.register_type("Record").unwrap();
//! registry.register_subtype("Article", "Record").unwrap();
//! registry.register_policy(Policy::new("RecordPolicy")).unwrap();
//!
//! let policy = registry.resolve_policy(&Article).unwrap();
//! assert_eq!(policy.as_str(), "RecordPolicy");
//! ```

use crate::config::GuardConfig;
use crate::error::{AuthzError, RegistryError, Result};
use crate::hierarchy::TypeHierarchy;
use crate::policy::Policy;
use crate::types::{Authorizable, HandlerKind, PolicyRef, Target};
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info};

/// Registered policies and the type hierarchy they are resolved against
pub struct PolicyRegistry<R> {
    config: GuardConfig,
    hierarchy: TypeHierarchy,
    policies: HashMap<String, Policy<R>>,
}

impl<R> PolicyRegistry<R> {
    /// Create an empty registry with default conventions
    pub fn new() -> Self {
        Self::with_config(GuardConfig::default())
    }

    /// Create an empty registry with custom conventions
    pub fn with_config(config: GuardConfig) -> Self {
        Self {
            config,
            hierarchy: TypeHierarchy::new(),
            policies: HashMap::new(),
        }
    }

    pub fn config(&self) -> &GuardConfig {
        &self.config
    }

    pub fn hierarchy(&self) -> &TypeHierarchy {
        &self.hierarchy
    }

    /// Register a root type
    pub fn register_type(&mut self, name: &str) -> Result<()> {
        self.hierarchy.register(name)?;
        Ok(())
    }

    /// Register `name` as a subtype of an already registered `parent`
    pub fn register_subtype(&mut self, name: &str, parent: &str) -> Result<()> {
        self.hierarchy.register_child(name, parent)?;
        Ok(())
    }

    /// Declare the policy for a type, bypassing naming inference
    pub fn declare_policy(&mut self, type_name: &str, policy: impl Into<PolicyRef>) {
        self.hierarchy.declare_policy(type_name, policy);
    }

    /// Add a policy to the namespace
    pub fn register_policy(&mut self, policy: Policy<R>) -> Result<()> {
        let name = policy.name().as_str().to_string();
        if self.policies.contains_key(&name) {
            return Err(RegistryError::DuplicatePolicy(name).into());
        }

        info!(
            "Registering policy: {} (filter={}, authorization={})",
            name,
            policy.has_handler(HandlerKind::Filter),
            policy.has_handler(HandlerKind::Authorization)
        );
        self.policies.insert(name, policy);
        Ok(())
    }

    /// Look a policy up by reference
    pub fn policy(&self, policy: &PolicyRef) -> Option<&Policy<R>> {
        self.policies.get(policy.as_str())
    }

    /// Look a policy up by reference, failing with `PolicyNotFound`
    pub fn get_policy(&self, policy: &PolicyRef) -> Result<&Policy<R>> {
        self.policy(policy)
            .ok_or_else(|| AuthzError::policy_not_found(policy.as_str()))
    }

    pub fn contains_policy(&self, name: &str) -> bool {
        self.policies.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.policies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.policies.is_empty()
    }

    /// Action names one handler kind of a policy exposes
    pub fn action_names(&self, policy: &PolicyRef, kind: HandlerKind) -> Result<Vec<&'static str>> {
        self.get_policy(policy)?
            .action_names(kind)
            .ok_or_else(|| AuthzError::HandlerNotFound {
                policy: policy.to_string(),
                kind,
            })
    }

    /// Determine which policy governs `target`
    pub fn resolve_policy<T: Authorizable + ?Sized>(&self, target: &T) -> Result<PolicyRef> {
        self.resolve_target(target.target())
    }

    /// Resolve an already extracted [`Target`]
    pub fn resolve_target(&self, target: Target<'_>) -> Result<PolicyRef> {
        let Some(base) = target.base_type() else {
            debug!("Cannot resolve a policy for an absent target");
            return Err(AuthzError::PolicyNotFound { type_name: None });
        };

        if let Some(policy) = target.explicit_policy() {
            debug!("Using per-instance policy {} for {}", policy, base);
            return Ok(PolicyRef::new(policy));
        }

        if let Some((declaring, policy)) = self.hierarchy.declaring_ancestor(base) {
            debug!("Using policy {} declared on type {} for {}", policy, declaring, base);
            return Ok(policy.clone());
        }

        for ancestor in self.hierarchy.ancestors(base) {
            let candidate = self.config.policy_name_for(ancestor);
            if self.policies.contains_key(&candidate) {
                debug!("Inferred policy {} for {} via {}", candidate, base, ancestor);
                return Ok(PolicyRef::from(candidate));
            }
        }

        debug!("No policy found in the ancestor chain of {}", base);
        Err(AuthzError::policy_not_found(base))
    }
}

impl<R> Default for PolicyRegistry<R> {
    fn default() -> Self {
        Self::new()
    }
}

impl<R> fmt::Debug for PolicyRegistry<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<_> = self.policies.keys().collect();
        names.sort();
        f.debug_struct("PolicyRegistry")
            .field("config", &self.config)
            .field("types", &self.hierarchy.len())
            .field("policies", &names)
            .finish()
    }
}
