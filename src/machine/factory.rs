//! Name-memoized state instances for one context.

use super::state::State;
use crate::builder::TransitionEntry;
use crate::config::MachineConfig;
use crate::core::StateError;
use std::collections::HashMap;
use tracing::debug;

/// Arena of the state instances owned by one context.
///
/// At most one instance exists per name: the first request for a name
/// builds it, later requests return the same index. Instances are never
/// removed, so indices stay valid for the lifetime of the context.
pub(crate) struct StateFactory {
    owner: String,
    states: Vec<State>,
    by_name: HashMap<String, usize>,
}

impl StateFactory {
    pub(crate) fn new(owner: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            states: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    /// Index of the instance for `entry`'s target name, building it on first request.
    pub(crate) fn create(
        &mut self,
        entry: &TransitionEntry,
        config: &MachineConfig,
    ) -> Result<usize, StateError> {
        if let Some(&index) = self.by_name.get(entry.state_name()) {
            if self.states[index].type_name() != entry.state_type() {
                debug!(
                    owner = %self.owner,
                    state = entry.state_name(),
                    existing = self.states[index].type_name(),
                    declared = entry.state_type(),
                    "state name already bound to another type, reusing existing instance"
                );
            }
            return Ok(index);
        }

        let state = State::from_entry(entry, config)?;
        let index = self.states.len();
        self.states.push(state);
        self.by_name.insert(entry.state_name().to_string(), index);
        Ok(index)
    }

    /// Index of the existing instance named `name`.
    pub(crate) fn get(&self, name: &str) -> Result<usize, StateError> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| StateError::StateNotFound {
                parent: self.owner.clone(),
                name: name.to_string(),
            })
    }

    pub(crate) fn state(&self, index: usize) -> &State {
        &self.states[index]
    }

    pub(crate) fn state_mut(&mut self, index: usize) -> &mut State {
        &mut self.states[index]
    }

    pub(crate) fn states_mut(&mut self) -> impl Iterator<Item = &mut State> {
        self.states.iter_mut()
    }

    pub(crate) fn len(&self) -> usize {
        self.states.len()
    }
}
