//! Runtime errors.

use crate::validation::ConfigViolation;
use thiserror::Error;

/// Errors surfaced by state construction, cycles, injection and path restoration.
#[derive(Debug, Error)]
pub enum StateError {
    #[error("Invalid configuration of state '{state}': {}", describe(.violations))]
    InvalidConfiguration {
        state: String,
        violations: Vec<ConfigViolation>,
    },

    #[error("Variable '{name}' not found in scope of state '{state}'")]
    VarNotFound { state: String, name: String },

    #[error("Variable '{name}' in scope of state '{state}' is not of type {expected}")]
    VarTypeMismatch {
        state: String,
        name: String,
        expected: &'static str,
    },

    #[error("Variable '{name}' already present in scope of state '{state}'")]
    DuplicateVariable { state: String, name: String },

    #[error("State '{name}' not found in context of '{parent}'")]
    StateNotFound { parent: String, name: String },

    #[error("Invalid state path '{path}': {reason}")]
    InvalidStatePath { path: String, reason: String },

    #[error("Transition {transition} requested by '{state}' is not declared by '{parent}'")]
    UnknownTransition {
        parent: String,
        state: String,
        transition: String,
    },
}

fn describe(violations: &[ConfigViolation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}
