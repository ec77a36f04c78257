//! Naming conventions used by resolution and dispatch

use crate::error::{AuthzError, Result};
use serde::{Deserialize, Serialize};

/// Default suffix appended to a type name to find its policy
pub const DEFAULT_POLICY_SUFFIX: &str = "Policy";

/// Default marker appended to the current action for authorization handlers
pub const DEFAULT_ACTION_MARKER: &str = "?";

const ENV_POLICY_SUFFIX: &str = "GUARD_POLICY_SUFFIX";
const ENV_ACTION_MARKER: &str = "GUARD_ACTION_MARKER";

/// Guard configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GuardConfig {
    /// Suffix for convention-named policies (`Post` -> `PostPolicy`)
    #[serde(default = "default_policy_suffix")]
    pub policy_suffix: String,

    /// Marker appended to the default authorization action (`update` -> `update?`)
    #[serde(default = "default_action_marker")]
    pub action_marker: String,
}

fn default_policy_suffix() -> String {
    DEFAULT_POLICY_SUFFIX.to_string()
}

fn default_action_marker() -> String {
    DEFAULT_ACTION_MARKER.to_string()
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            policy_suffix: default_policy_suffix(),
            action_marker: default_action_marker(),
        }
    }
}

impl GuardConfig {
    /// Parse a JSON document, filling missing fields with defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self =
            serde_json::from_str(json).map_err(|e| AuthzError::InvalidConfig(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Read `GUARD_POLICY_SUFFIX` and `GUARD_ACTION_MARKER`, falling back to defaults
    pub fn from_env() -> Result<Self> {
        let config = Self {
            policy_suffix: std::env::var(ENV_POLICY_SUFFIX)
                .unwrap_or_else(|_| default_policy_suffix()),
            action_marker: std::env::var(ENV_ACTION_MARKER)
                .unwrap_or_else(|_| default_action_marker()),
        };
        config.validate()?;
        Ok(config)
    }

    /// An empty suffix would make every type its own policy name
    pub fn validate(&self) -> Result<()> {
        if self.policy_suffix.is_empty() {
            return Err(AuthzError::InvalidConfig(
                "policy_suffix cannot be empty".to_string(),
            ));
        }
        Ok(())
    }

    /// Convention name of the policy for `type_name`
    pub fn policy_name_for(&self, type_name: &str) -> String {
        format!("{}{}", type_name, self.policy_suffix)
    }

    /// Authorization action for the current action name
    pub fn authorization_action(&self, action: &str) -> String {
        format!("{}{}", action, self.action_marker)
    }
}
