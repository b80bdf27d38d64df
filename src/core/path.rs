//! State-path strings: the root-to-leaf chain of active state names.
//!
//! Grammar: `path := name ("->" path)?`, where `name` is non-empty and does
//! not contain the separator.

use super::error::StateError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Separator between state names in a state path.
pub const STATE_PATH_SEPARATOR: &str = "->";

/// A parsed, validated state path.
///
/// # Example
///
/// ```rust
/// use emsm::core::StatePath;
///
/// let path = StatePath::parse("Root->Enabled->BlinkSlow").unwrap();
/// assert_eq!(path.segments(), ["Root", "Enabled", "BlinkSlow"]);
/// assert_eq!(path.to_string(), "Root->Enabled->BlinkSlow");
///
/// assert!(StatePath::parse("").is_err());
/// assert!(StatePath::parse("Root->Enabled->").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatePath {
    segments: Vec<String>,
}

impl StatePath {
    pub fn parse(path: &str) -> Result<Self, StateError> {
        if path.is_empty() {
            return Err(StateError::InvalidStatePath {
                path: path.to_string(),
                reason: "path is empty".to_string(),
            });
        }

        let segments: Vec<String> = path
            .split(STATE_PATH_SEPARATOR)
            .map(str::to_string)
            .collect();

        if let Some(position) = segments.iter().position(String::is_empty) {
            return Err(StateError::InvalidStatePath {
                path: path.to_string(),
                reason: format!("segment {position} is empty"),
            });
        }

        Ok(Self { segments })
    }

    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// First segment: the root state's name.
    pub fn root(&self) -> &str {
        &self.segments[0]
    }

    /// Active leaf name.
    pub fn leaf(&self) -> &str {
        &self.segments[self.segments.len() - 1]
    }

    /// Number of levels named by the path.
    pub fn depth(&self) -> usize {
        self.segments.len()
    }
}

impl fmt::Display for StatePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.segments.join(STATE_PATH_SEPARATOR))
    }
}

/// Notification payload for a changed state path.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StatePathChange {
    /// Path before the cycle
    pub old_path: String,
    /// Path after the cycle
    pub new_path: String,
    /// When the change was observed
    pub changed_at: DateTime<Utc>,
}

impl StatePathChange {
    pub fn new(old_path: String, new_path: String) -> Self {
        Self {
            old_path,
            new_path,
            changed_at: Utc::now(),
        }
    }
}
