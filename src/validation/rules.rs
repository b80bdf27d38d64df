//! Transition-table rules checked with `Validation`.

use crate::builder::TransitionTable;
use crate::config::MachineConfig;
use crate::core::STATE_PATH_SEPARATOR;
use crate::validation::violations::ConfigViolation;
use stillwater::validation::Validation;
use stillwater::NonEmptyVec;

/// Rules every transition table must satisfy before a context is built.
/// Uses Validation to accumulate ALL violations.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TableRules {
    strict_transitions: bool,
}

impl TableRules {
    pub fn new() -> Self {
        Self::default()
    }

    /// Treat duplicate transition tags as a violation instead of letting
    /// the last entry win.
    pub fn strict_transitions(mut self, strict: bool) -> Self {
        self.strict_transitions = strict;
        self
    }

    pub fn from_config(config: &MachineConfig) -> Self {
        Self::new().strict_transitions(config.strict_transitions)
    }

    /// Check all rules, accumulating ALL violations.
    pub fn check(&self, table: &TransitionTable) -> Validation<(), NonEmptyVec<ConfigViolation>> {
        let mut checks: Vec<Validation<(), NonEmptyVec<ConfigViolation>>> = Vec::new();

        let initial_count = table
            .entries()
            .iter()
            .filter(|entry| entry.is_initial())
            .count();
        checks.push(match initial_count {
            0 => Validation::fail(ConfigViolation::MissingInitialTransition),
            1 => Validation::success(()),
            count => Validation::fail(ConfigViolation::MultipleInitialTransitions { count }),
        });

        for entry in table.entries() {
            let name = entry.state_name();
            let check = if name.is_empty() {
                Validation::fail(ConfigViolation::EmptyStateName {
                    transition: entry.transition().label(),
                })
            } else if name.contains(STATE_PATH_SEPARATOR) {
                Validation::fail(ConfigViolation::SeparatorInStateName {
                    name: name.to_string(),
                })
            } else {
                Validation::success(())
            };
            checks.push(check);
        }

        if self.strict_transitions {
            for transition in duplicate_transitions(table) {
                checks.push(Validation::fail(ConfigViolation::DuplicateTransition {
                    transition,
                }));
            }
        }

        Validation::all_vec(checks).map(|_| ())
    }
}

/// Labels of transition tags declared by more than one entry.
pub fn duplicate_transitions(table: &TransitionTable) -> Vec<String> {
    let entries = table.entries();
    entries
        .iter()
        .enumerate()
        .filter(|(index, entry)| {
            let seen_before = entries[..*index]
                .iter()
                .any(|earlier| earlier.transition().matches(entry.transition()));
            let seen_after = entries[index + 1..]
                .iter()
                .any(|later| later.transition().matches(entry.transition()));
            !seen_before && seen_after
        })
        .map(|(_, entry)| entry.transition().label())
        .collect()
}
