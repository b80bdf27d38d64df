//! Configuration violations.

use thiserror::Error;

/// A single problem found while checking a state's configuration
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigViolation {
    #[error("no transition entry is marked as initial")]
    MissingInitialTransition,

    #[error("{count} transition entries are marked as initial")]
    MultipleInitialTransitions { count: usize },

    #[error("transition {transition} targets a state with an empty name")]
    EmptyStateName { transition: String },

    #[error("state name '{name}' contains the path separator")]
    SeparatorInStateName { name: String },

    #[error("root state name '{name}' is not a valid path segment")]
    InvalidRootName { name: String },

    #[error("transition {transition} is declared more than once")]
    DuplicateTransition { transition: String },

    #[error("command set {command_set} has no \"none\" member")]
    MissingNoneCommand { command_set: &'static str },
}
