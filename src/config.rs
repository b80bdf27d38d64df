//! Runtime configuration.

use crate::core::MailboxPolicy;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors that can occur when loading a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration parse failed: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Settings applied to a root state and every state built beneath it.
///
/// # Example
///
/// ```rust
/// use emsm::config::MachineConfig;
/// use emsm::core::MailboxPolicy;
///
/// let config = MachineConfig::from_json(r#"{ "mailbox_policy": "replace_pending" }"#).unwrap();
/// assert_eq!(config.mailbox_policy, MailboxPolicy::ReplacePending);
/// assert!(!config.strict_transitions);
/// ```
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MachineConfig {
    /// What happens to a command injected while another is still pending
    pub mailbox_policy: MailboxPolicy,

    /// Reject transition tables that declare the same tag twice
    pub strict_transitions: bool,
}

impl MachineConfig {
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, ConfigError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn with_mailbox_policy(mut self, policy: MailboxPolicy) -> Self {
        self.mailbox_policy = policy;
        self
    }

    pub fn with_strict_transitions(mut self, strict: bool) -> Self {
        self.strict_transitions = strict;
        self
    }
}
