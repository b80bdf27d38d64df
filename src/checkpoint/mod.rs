//! Checkpoint and resume of the active state path.
//!
//! A checkpoint records which chain of states was active, plus an optional
//! path history, so a machine rebuilt after a restart can be put back where
//! it was with [`State::set_state_path`]. Behaviors, variables and pending
//! commands are not captured.

use crate::core::{PathHistory, StatePath};
use crate::machine::State;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

pub mod error;

pub use error::CheckpointError;

/// Version identifier for checkpoint format
pub const CHECKPOINT_VERSION: u32 = 1;

/// Serializable snapshot of a machine's active state path.
///
/// # Example
///
/// ```rust
/// use emsm::checkpoint::Checkpoint;
/// use emsm::machine::{Behavior, State};
///
/// struct Idle;
/// impl Behavior for Idle {}
///
/// let root = State::new("Root", Idle).unwrap();
/// let checkpoint = Checkpoint::capture(&root);
/// let json = checkpoint.to_json().unwrap();
///
/// let mut rebuilt = State::new("Root", Idle).unwrap();
/// Checkpoint::from_json(&json).unwrap().restore(&mut rebuilt).unwrap();
/// assert_eq!(rebuilt.state_path(), "Root");
/// ```
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Checkpoint {
    /// Checkpoint format version
    pub version: u32,

    /// Unique checkpoint identifier
    pub id: String,

    /// When checkpoint was created
    pub timestamp: DateTime<Utc>,

    /// Name of the root state
    pub root: String,

    /// Active chain at capture time
    pub state_path: String,

    /// Path changes recorded up to capture time
    pub history: PathHistory,
}

impl Checkpoint {
    /// Snapshot the active path of `root`.
    pub fn capture(root: &State) -> Self {
        Self {
            version: CHECKPOINT_VERSION,
            id: uuid::Uuid::new_v4().to_string(),
            timestamp: Utc::now(),
            root: root.name().to_string(),
            state_path: root.state_path(),
            history: PathHistory::new(),
        }
    }

    pub fn with_history(mut self, history: PathHistory) -> Self {
        self.history = history;
        self
    }

    pub fn to_json(&self) -> Result<String, CheckpointError> {
        serde_json::to_string_pretty(self)
            .map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn from_json(json: &str) -> Result<Self, CheckpointError> {
        let checkpoint: Self = serde_json::from_str(json)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))?;
        checkpoint.validate()?;
        Ok(checkpoint)
    }

    pub fn to_binary(&self) -> Result<Vec<u8>, CheckpointError> {
        bincode::serialize(self).map_err(|e| CheckpointError::SerializationFailed(e.to_string()))
    }

    pub fn from_binary(bytes: &[u8]) -> Result<Self, CheckpointError> {
        let checkpoint: Self = bincode::deserialize(bytes)
            .map_err(|e| CheckpointError::DeserializationFailed(e.to_string()))?;
        checkpoint.validate()?;
        Ok(checkpoint)
    }

    /// Check version and that the recorded path is well formed and starts
    /// at the recorded root.
    pub fn validate(&self) -> Result<(), CheckpointError> {
        if self.version != CHECKPOINT_VERSION {
            return Err(CheckpointError::UnsupportedVersion {
                found: self.version,
                supported: CHECKPOINT_VERSION,
            });
        }

        let path = StatePath::parse(&self.state_path)
            .map_err(|e| CheckpointError::ValidationFailed(e.to_string()))?;
        if path.root() != self.root {
            return Err(CheckpointError::ValidationFailed(format!(
                "state path '{}' does not start at root '{}'",
                self.state_path, self.root
            )));
        }
        Ok(())
    }

    /// Put `root` back on the recorded path without firing callbacks.
    pub fn restore(&self, root: &mut State) -> Result<(), CheckpointError> {
        self.validate()?;
        if root.name() != self.root {
            return Err(CheckpointError::RootMismatch {
                found: self.root.clone(),
                expected: root.name().to_string(),
            });
        }

        root.set_state_path(&self.state_path)?;
        debug!(checkpoint = %self.id, path = %self.state_path, "checkpoint restored");
        Ok(())
    }
}
