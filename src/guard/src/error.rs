//! Error types for policy resolution and dispatch

use crate::types::HandlerKind;
use thiserror::Error;

/// Errors raised while populating a [`PolicyRegistry`](crate::registry::PolicyRegistry)
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    /// Type name registered twice
    #[error("Duplicate type: {0}")]
    DuplicateType(String),

    /// Parent type has not been registered yet
    #[error("Unknown parent type '{parent}' for '{child}'")]
    UnknownParent { child: String, parent: String },

    /// Policy name registered twice
    #[error("Duplicate policy: {0}")]
    DuplicatePolicy(String),
}

/// Authorization errors
#[derive(Debug, Error)]
pub enum AuthzError {
    /// No policy could be determined for the target
    #[error("unable to find policy for `{}`", type_name.as_deref().unwrap_or("nil"))]
    PolicyNotFound { type_name: Option<String> },

    /// The policy's handler has no such action
    #[error("unable to find action `{action}` on `{policy}`")]
    ActionNotFound { policy: String, action: String },

    /// The authorization handler denied the action
    #[error("not allowed to `{action}` this `{resource}` by `{policy}` as `{role}`")]
    NotAuthorized {
        action: String,
        resource: String,
        policy: String,
        role: String,
    },

    /// Verification found no dispatch for this request
    #[error("policy was not applied: {0}")]
    PolicyNotApplied(String),

    /// The policy does not define the selected handler kind
    #[error("policy `{policy}` has no {kind} handler")]
    HandlerNotFound { policy: String, kind: HandlerKind },

    /// The target is not the type the handler is constructed from
    #[error("{kind} handler of `{policy}` expects a `{expected}`")]
    TargetMismatch {
        policy: String,
        kind: HandlerKind,
        expected: &'static str,
    },

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Registry population error
    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),
}

impl AuthzError {
    pub(crate) fn policy_not_found(type_name: impl Into<String>) -> Self {
        AuthzError::PolicyNotFound {
            type_name: Some(type_name.into()),
        }
    }

    /// True for a denial by an authorization handler
    pub fn is_not_authorized(&self) -> bool {
        matches!(self, AuthzError::NotAuthorized { .. })
    }

    /// True when policy resolution failed
    pub fn is_policy_not_found(&self) -> bool {
        matches!(self, AuthzError::PolicyNotFound { .. })
    }

    /// True when the handler lacks the requested action
    pub fn is_action_not_found(&self) -> bool {
        matches!(self, AuthzError::ActionNotFound { .. })
    }

    /// True when the fail-safe verification failed
    pub fn is_policy_not_applied(&self) -> bool {
        matches!(self, AuthzError::PolicyNotApplied(_))
    }
}

/// Result type for authorization operations
pub type Result<T> = std::result::Result<T, AuthzError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_policy_not_found_message() {
        let err = AuthzError::policy_not_found("Post");
        assert_eq!(err.to_string(), "unable to find policy for `Post`");

        let err = AuthzError::PolicyNotFound { type_name: None };
        assert_eq!(err.to_string(), "unable to find policy for `nil`");
    }

    #[test]
    fn test_not_authorized_message() {
        let err = AuthzError::NotAuthorized {
            action: "update?".to_string(),
            resource: "Post { id: 1 }".to_string(),
            policy: "PostPolicy".to_string(),
            role: "None".to_string(),
        };
        assert!(err.is_not_authorized());
        assert!(err.to_string().contains("update?"));
        assert!(err.to_string().contains("PostPolicy"));
    }

    #[test]
    fn test_registry_error_converts() {
        let err: AuthzError = RegistryError::DuplicateType("Post".to_string()).into();
        assert!(matches!(err, AuthzError::Registry(RegistryError::DuplicateType(_))));
    }
}
