//! Validation-based configuration checks.
//!
//! Transition tables are checked with Stillwater's `Validation` type so that
//! every problem of a misconfigured state is reported at once instead of
//! one per attempt.
//!
//! # Example
//!
//! ```rust
//! use emsm::builder::TransitionTable;
//! use emsm::machine::Behavior;
//! use emsm::validation::TableRules;
//!
//! #[derive(Debug, PartialEq)]
//! enum Transitions { Enable }
//!
//! #[derive(Default)]
//! struct Enabled;
//! impl Behavior for Enabled {}
//!
//! let table = TransitionTable::new().on(Transitions::Enable, "Enabled", Enabled::default);
//! assert!(TableRules::new().check(&table).is_failure());
//! ```

pub mod rules;
pub mod violations;

pub use rules::{duplicate_transitions, TableRules};
pub use violations::ConfigViolation;
