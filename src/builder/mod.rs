//! Builder API for declaring state hierarchies.
//!
//! This module provides the fluent transition-table builder each composite
//! state returns from [`Behavior::transition_table`](crate::machine::Behavior::transition_table),
//! and the [`command_set!`](crate::command_set) macro for command enumerations.

pub mod macros;
pub mod table;

pub use table::{StateConstructor, TransitionEntry, TransitionTable};
