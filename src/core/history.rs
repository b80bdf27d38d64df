//! State-path change history.
//!
//! Provides immutable tracking of how the active chain moved over time,
//! fed by the path-changed observer of a root state.

use super::path::StatePathChange;
use serde::{Deserialize, Serialize};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

/// Ordered history of state-path changes.
///
/// History is immutable - the `record` method returns a new history
/// with the change added.
///
/// # Example
///
/// ```rust
/// use emsm::core::{PathHistory, StatePathChange};
///
/// let history = PathHistory::new()
///     .record(StatePathChange::new("Root->Disabled".into(), "Root->Enabled->BlinkSlow".into()))
///     .record(StatePathChange::new("Root->Enabled->BlinkSlow".into(), "Root->Disabled".into()));
///
/// assert_eq!(
///     history.get_path(),
///     vec!["Root->Disabled", "Root->Enabled->BlinkSlow", "Root->Disabled"]
/// );
/// ```
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct PathHistory {
    changes: Vec<StatePathChange>,
}

impl PathHistory {
    pub fn new() -> Self {
        Self {
            changes: Vec::new(),
        }
    }

    /// Record a change, returning a new history.
    pub fn record(&self, change: StatePathChange) -> Self {
        let mut changes = self.changes.clone();
        changes.push(change);
        Self { changes }
    }

    /// Paths visited in order: the first old path, then every new path.
    pub fn get_path(&self) -> Vec<&str> {
        let mut path = Vec::new();
        if let Some(first) = self.changes.first() {
            path.push(first.old_path.as_str());
        }
        for change in &self.changes {
            path.push(change.new_path.as_str());
        }
        path
    }

    /// Time between the first and last recorded change.
    pub fn duration(&self) -> Option<Duration> {
        let (first, last) = (self.changes.first()?, self.changes.last()?);
        last.changed_at
            .signed_duration_since(first.changed_at)
            .to_std()
            .ok()
    }

    pub fn changes(&self) -> &[StatePathChange] {
        &self.changes
    }

    /// Observer that appends every change to a shared history.
    ///
    /// ```rust
    /// use emsm::core::PathHistory;
    /// use std::sync::{Arc, Mutex};
    ///
    /// let history = Arc::new(Mutex::new(PathHistory::new()));
    /// let mut observer = PathHistory::recorder(&history);
    /// observer(&emsm::core::StatePathChange::new("A->B".into(), "A->C".into()));
    /// assert_eq!(history.lock().unwrap().changes().len(), 1);
    /// ```
    pub fn recorder(
        history: &Arc<Mutex<PathHistory>>,
    ) -> impl FnMut(&StatePathChange) + Send + 'static {
        Self::bounded_recorder(history, usize::MAX)
    }

    /// Like [`recorder`](Self::recorder), but keeps only the newest `limit`
    /// changes.
    pub fn bounded_recorder(
        history: &Arc<Mutex<PathHistory>>,
        limit: usize,
    ) -> impl FnMut(&StatePathChange) + Send + 'static {
        let history = Arc::clone(history);
        move |change: &StatePathChange| {
            let mut guard = history.lock().unwrap_or_else(PoisonError::into_inner);
            guard.changes.push(change.clone());
            let excess = guard.changes.len().saturating_sub(limit);
            guard.changes.drain(..excess);
        }
    }
}
