//! EMSm: a hierarchical state machine runtime driven by periodic run cycles.
//!
//! A machine is a tree of states. Each state supplies entry, do and exit
//! callbacks through the [`Behavior`](machine::Behavior) trait; composite
//! states also declare a transition table mapping transition tags to the
//! inner states they lead to. The host calls
//! [`run_cycle`](machine::State::run_cycle) on the root periodically, which
//! runs the active chain from the root down to a leaf exactly once.
//!
//! # Core Concepts
//!
//! - **Commands**: typed signals injected into a state's single-slot mailbox
//!   and handed down the active chain within one cycle
//! - **Transitions**: tags a state returns from `do_step` to ask its parent
//!   to switch to another sibling
//! - **Variables**: named values shared downwards through a variable scope
//! - **State path**: the active chain rendered as `Root->Child->Leaf`, which
//!   can be observed, checkpointed and restored
//!
//! # Example
//!
//! ```rust
//! use emsm::builder::TransitionTable;
//! use emsm::command_set;
//! use emsm::core::{StateError, Transition};
//! use emsm::machine::{Behavior, CycleContext, State};
//!
//! command_set! {
//!     pub enum BlinkyCommands { None, Enable, Disable }
//!     none: None
//! }
//!
//! #[derive(Debug, PartialEq)]
//! enum BlinkyTransitions { Initial, Enable, Disable }
//!
//! struct Blinky;
//! impl Behavior for Blinky {
//!     fn transition_table(&self) -> TransitionTable {
//!         TransitionTable::new()
//!             .initial(BlinkyTransitions::Initial, "Disabled", || Disabled)
//!             .on(BlinkyTransitions::Enable, "Enabled", || Enabled)
//!             .on(BlinkyTransitions::Disable, "Disabled", || Disabled)
//!     }
//! }
//!
//! struct Disabled;
//! impl Behavior for Disabled {
//!     fn do_step(&mut self, cx: &CycleContext<'_>) -> Result<Option<Transition>, StateError> {
//!         Ok(match cx.get_command::<BlinkyCommands>()? {
//!             BlinkyCommands::Enable => Some(Transition::to(BlinkyTransitions::Enable)),
//!             _ => None,
//!         })
//!     }
//! }
//!
//! struct Enabled;
//! impl Behavior for Enabled {
//!     fn do_step(&mut self, cx: &CycleContext<'_>) -> Result<Option<Transition>, StateError> {
//!         Ok(match cx.get_command::<BlinkyCommands>()? {
//!             BlinkyCommands::Disable => Some(Transition::to(BlinkyTransitions::Disable)),
//!             _ => None,
//!         })
//!     }
//! }
//!
//! let mut blinky = State::new("Blinky", Blinky).unwrap();
//! blinky.run_cycle().unwrap();
//! assert_eq!(blinky.state_path(), "Blinky->Disabled");
//!
//! blinky.inject_command(BlinkyCommands::Enable);
//! blinky.run_cycle().unwrap();
//! assert_eq!(blinky.state_path(), "Blinky->Enabled");
//! ```

pub mod builder;
pub mod checkpoint;
pub mod config;
pub mod core;
pub mod machine;
pub mod validation;

// Re-export commonly used types
pub use builder::TransitionTable;
pub use checkpoint::Checkpoint;
pub use config::MachineConfig;
pub use self::core::{Command, CommandSet, StateError, Transition};
pub use machine::{Behavior, CycleContext, State};
