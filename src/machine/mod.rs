//! The running hierarchy.
//!
//! A [`State`] wraps a user [`Behavior`]. Composite states own a context
//! that builds their inner states once, by name, and switches between them
//! as transitions are requested. Driving the root state's
//! [`run_cycle`](State::run_cycle) runs the active chain top-down.

mod behavior;
mod context;
mod factory;
mod state;

pub use behavior::{AsAny, Behavior, CycleContext};
pub use state::State;
