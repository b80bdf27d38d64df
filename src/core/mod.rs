//! Core value types of the runtime.
//!
//! This module contains the leaf building blocks the state hierarchy is
//! made of:
//! - Type-erased transition tags and commands
//! - The single-slot command mailbox
//! - The shared variable scope
//! - State-path parsing and change history
//! - The runtime error taxonomy

mod command;
mod error;
mod history;
mod path;
mod scope;
mod transition;

pub use command::{Command, CommandInjector, CommandSet, MailboxPolicy};
pub(crate) use command::Mailbox;
pub use error::StateError;
pub use history::PathHistory;
pub use path::{StatePath, StatePathChange, STATE_PATH_SEPARATOR};
pub use scope::{TypeMismatch, VariableScope};
pub use transition::{Tag, Transition};
