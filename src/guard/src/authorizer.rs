//! Per-request authorization consumer
//!
//! An [`Authorizer`] is created for each inbound request. It pulls the current
//! role and action name from the request context, resolves policies against a
//! shared [`PolicyRegistry`], dispatches to handlers and owns the request's
//! [`PolicyTracker`].
//!
//! # Example
//!
//! ```rust
//! use cretoai_guard::{
//!     Action, Authorizable, Authorization, Authorizer, Policy, PolicyRegistry, StaticContext,
//!     Target,
//! };
//! use std::sync::Arc;
//!
//! #[derive(Debug)]
//! struct Invoice {
//!     paid: bool,
//! }
//!
//! impl Authorizable for Invoice {
//!     fn target(&self) -> Target<'_> {
//!         Target::instance("Invoice")
//!     }
//! }
//!
//! struct InvoiceAuthorization {
//!     paid: bool,
//! }
//!
//! impl InvoiceAuthorization {
//!     fn refund(&self) -> bool {
//!         self.paid
//!     }
//! }
//!
//! impl Authorization for InvoiceAuthorization {
//!     type Role = Option<String>;
//!     type Resource = Invoice;
//!
//!     fn new(_role: Option<String>, invoice: &Invoice) -> Self {
//!         Self { paid: invoice.paid }
//!     }
//!
//!     fn actions() -> Vec<Action<Self, bool>> {
//!         vec![Action::new("refund?", Self::refund)]
//!     }
//! }
//!
//! let mut registry = PolicyRegistry::new();
//! registry
//!     .register_policy(Policy::new("InvoicePolicy").authorization::<InvoiceAuthorization>())
//!     .unwrap();
//! let registry = Arc::new(registry);
//!
//! let context = StaticContext::new(Some("alice".to_string()), "refund");
//! let mut authorizer = Authorizer::new(registry, context);
//!
//! let invoice = Invoice { paid: true };
//! assert!(authorizer.authorize(&invoice).is_ok());
//! assert!(authorizer.verify_applied().is_ok());
//! ```

use crate::error::{AuthzError, Result};
use crate::registry::PolicyRegistry;
use crate::tracking::PolicyTracker;
use crate::types::{Authorizable, HandlerKind, PolicyRef};
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// What the hosting request exposes to authorization
pub trait RequestContext {
    /// Who is asking; use `Option<_>` to allow anonymous actors
    type Role: Clone + fmt::Debug;

    fn current_role(&self) -> Self::Role;

    /// Name of the action being handled (e.g. `"update"`)
    fn action_name(&self) -> &str;
}

/// Request context with fixed values
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StaticContext<R> {
    role: R,
    action: String,
}

impl<R> StaticContext<R> {
    pub fn new(role: R, action: impl Into<String>) -> Self {
        Self {
            role,
            action: action.into(),
        }
    }
}

impl<R: Clone + fmt::Debug> RequestContext for StaticContext<R> {
    type Role = R;

    fn current_role(&self) -> R {
        self.role.clone()
    }

    fn action_name(&self) -> &str {
        &self.action
    }
}

/// Overrides for a single dispatch
///
/// Anything left unset falls back to the request context or to resolution.
#[derive(Debug, Clone)]
pub struct DispatchOptions<R> {
    action: Option<String>,
    role: Option<R>,
    policy: Option<PolicyRef>,
}

impl<R> Default for DispatchOptions<R> {
    fn default() -> Self {
        Self {
            action: None,
            role: None,
            policy: None,
        }
    }
}

impl<R> DispatchOptions<R> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invoke exactly this action (no marker is appended)
    pub fn action(mut self, action: impl Into<String>) -> Self {
        self.action = Some(action.into());
        self
    }

    /// Act as `role` instead of the current role
    pub fn role(mut self, role: R) -> Self {
        self.role = Some(role);
        self
    }

    /// Use `policy` instead of resolving one
    pub fn policy(mut self, policy: impl Into<PolicyRef>) -> Self {
        self.policy = Some(policy.into());
        self
    }
}

/// Authorization consumer owned by one request
pub struct Authorizer<C: RequestContext> {
    registry: Arc<PolicyRegistry<C::Role>>,
    context: C,
    tracker: PolicyTracker,
}

impl<C: RequestContext> Authorizer<C> {
    pub fn new(registry: Arc<PolicyRegistry<C::Role>>, context: C) -> Self {
        Self {
            registry,
            context,
            tracker: PolicyTracker::new(),
        }
    }

    pub fn context(&self) -> &C {
        &self.context
    }

    pub fn registry(&self) -> &PolicyRegistry<C::Role> {
        &self.registry
    }

    pub fn tracker(&self) -> &PolicyTracker {
        &self.tracker
    }

    pub fn tracker_mut(&mut self) -> &mut PolicyTracker {
        &mut self.tracker
    }

    /// Determine which policy governs `target`
    pub fn resolve_policy<T: Authorizable + ?Sized>(&self, target: &T) -> Result<PolicyRef> {
        self.registry.resolve_policy(target)
    }

    /// Narrow `scope` with the current action and role
    pub fn policy_filter<S: Authorizable + 'static>(&mut self, scope: &S) -> Result<S> {
        self.policy_filter_with(scope, DispatchOptions::default())
    }

    /// Narrow `scope`, overriding action, role or policy
    pub fn policy_filter_with<S: Authorizable + 'static>(
        &mut self,
        scope: &S,
        options: DispatchOptions<C::Role>,
    ) -> Result<S> {
        let DispatchOptions {
            action,
            role,
            policy,
        } = options;

        let policy = match policy {
            Some(policy) => policy,
            None => self.registry.resolve_policy(scope)?,
        };
        let action = action.unwrap_or_else(|| self.context.action_name().to_string());
        let role = role.unwrap_or_else(|| self.context.current_role());

        self.registry
            .apply_filter(&policy, role, scope, &action, &mut self.tracker)
    }

    /// Fail unless the current role may perform the current action on `resource`
    ///
    /// Returns `resource` itself so calls can be chained.
    pub fn authorize<'a, T>(&mut self, resource: &'a T) -> Result<&'a T>
    where
        T: Authorizable + fmt::Debug + 'static,
    {
        self.authorize_with(resource, DispatchOptions::default())
    }

    /// [`authorize`](Self::authorize), overriding action, role or policy
    pub fn authorize_with<'a, T>(
        &mut self,
        resource: &'a T,
        options: DispatchOptions<C::Role>,
    ) -> Result<&'a T>
    where
        T: Authorizable + fmt::Debug + 'static,
    {
        let DispatchOptions {
            action,
            role,
            policy,
        } = options;

        let policy = match policy {
            Some(policy) => policy,
            None => self.registry.resolve_policy(resource)?,
        };
        let action = action.unwrap_or_else(|| {
            self.registry
                .config()
                .authorization_action(self.context.action_name())
        });
        let role = role.unwrap_or_else(|| self.context.current_role());

        let allowed = self.registry.apply_authorization(
            &policy,
            role.clone(),
            resource,
            &action,
            &mut self.tracker,
        )?;

        if allowed {
            return Ok(resource);
        }

        info!(
            action = %action,
            policy = %policy,
            role = ?role,
            "Authorization denied"
        );
        Err(AuthzError::NotAuthorized {
            action,
            resource: format!("{:?}", resource),
            policy: policy.to_string(),
            role: format!("{:?}", role),
        })
    }

    /// Like [`authorize`](Self::authorize) but a denial is `Ok(false)`
    ///
    /// Resolution and setup failures are still errors.
    pub fn is_authorized<T>(&mut self, resource: &T) -> Result<bool>
    where
        T: Authorizable + fmt::Debug + 'static,
    {
        self.is_authorized_with(resource, DispatchOptions::default())
    }

    pub fn is_authorized_with<T>(
        &mut self,
        resource: &T,
        options: DispatchOptions<C::Role>,
    ) -> Result<bool>
    where
        T: Authorizable + fmt::Debug + 'static,
    {
        match self.authorize_with(resource, options) {
            Ok(_) => Ok(true),
            Err(err) if err.is_not_authorized() => Ok(false),
            Err(err) => Err(err),
        }
    }

    pub fn applied(&self) -> bool {
        self.tracker.applied()
    }

    pub fn mark_applied(&mut self, kind: HandlerKind) {
        self.tracker.mark_applied(kind);
    }

    /// Fail if no policy was applied during this request
    pub fn verify_applied(&self) -> Result<()> {
        self.tracker.verify_applied()
    }

    pub fn verify_filtered(&self) -> Result<()> {
        self.tracker.verify_filtered()
    }

    pub fn verify_authorized(&self) -> Result<()> {
        self.tracker.verify_authorized()
    }

    /// Let [`verify_applied`](Self::verify_applied) pass without a dispatch
    pub fn skip_verify(&mut self) {
        self.tracker.skip_verify();
    }
}

impl<C: RequestContext + fmt::Debug> fmt::Debug for Authorizer<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Authorizer")
            .field("context", &self.context)
            .field("tracker", &self.tracker)
            .finish()
    }
}
