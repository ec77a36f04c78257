//! Policy dispatch: construct the selected handler and invoke an action
//!
//! ```text
//! PolicyRef → Policy → handler kind → construct(role, target)
//!                                          ↓
//!                     responds_to(action)? ── no ──→ ActionNotFound
//!                                          ↓ yes
//!                               tracker.mark_applied → invoke
//! ```

use crate::error::{AuthzError, Result};
use crate::policy::BoundHandler;
use crate::registry::PolicyRegistry;
use crate::tracking::PolicyTracker;
use crate::types::{HandlerKind, PolicyRef};
use std::any::type_name;
use tracing::debug;

impl<R> PolicyRegistry<R> {
    /// Apply the filter handler of `policy` to `scope`
    ///
    /// The scope is only borrowed; the narrowed scope is a new value.
    pub fn apply_filter<S: 'static>(
        &self,
        policy: &PolicyRef,
        role: R,
        scope: &S,
        action: &str,
        tracker: &mut PolicyTracker,
    ) -> Result<S> {
        let kind = HandlerKind::Filter;
        let handler = self
            .get_policy(policy)?
            .filter_kind()
            .ok_or_else(|| handler_not_found(policy, kind))?;

        let bound = handler
            .construct(role, scope)
            .ok_or_else(|| target_mismatch(policy, kind, handler.scope_type()))?;

        let narrowed = apply_policy(policy, kind, bound.as_ref(), action, tracker)?;
        narrowed
            .downcast::<S>()
            .map(|scope| *scope)
            .map_err(|_| target_mismatch(policy, kind, type_name::<S>()))
    }

    /// Ask the authorization handler of `policy` about `resource`
    pub fn apply_authorization<T: 'static>(
        &self,
        policy: &PolicyRef,
        role: R,
        resource: &T,
        action: &str,
        tracker: &mut PolicyTracker,
    ) -> Result<bool> {
        let kind = HandlerKind::Authorization;
        let handler = self
            .get_policy(policy)?
            .authorization_kind()
            .ok_or_else(|| handler_not_found(policy, kind))?;

        let bound = handler
            .construct(role, resource)
            .ok_or_else(|| target_mismatch(policy, kind, handler.resource_type()))?;

        apply_policy(policy, kind, bound.as_ref(), action, tracker)
    }
}

/// Check the action, mark the tracker, invoke
fn apply_policy<O>(
    policy: &PolicyRef,
    kind: HandlerKind,
    handler: &dyn BoundHandler<Output = O>,
    action: &str,
    tracker: &mut PolicyTracker,
) -> Result<O> {
    if !handler.responds_to(action) {
        debug!("Policy {} has no {} action {}", policy, kind, action);
        return Err(action_not_found(policy, action));
    }

    tracker.mark_applied(kind);
    debug!("Dispatching {} action {} on {}", kind, action, policy);

    handler
        .invoke(action)
        .ok_or_else(|| action_not_found(policy, action))
}

fn action_not_found(policy: &PolicyRef, action: &str) -> AuthzError {
    AuthzError::ActionNotFound {
        policy: policy.to_string(),
        action: action.to_string(),
    }
}

fn handler_not_found(policy: &PolicyRef, kind: HandlerKind) -> AuthzError {
    AuthzError::HandlerNotFound {
        policy: policy.to_string(),
        kind,
    }
}

fn target_mismatch(policy: &PolicyRef, kind: HandlerKind, expected: &'static str) -> AuthzError {
    AuthzError::TargetMismatch {
        policy: policy.to_string(),
        kind,
        expected,
    }
}
