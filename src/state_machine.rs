//! Core trip slot-filling state machine
//!
//! Implements the Elm Architecture pattern with pure state transitions.
//! Hosts feed events in and execute the returned effects.

mod effect;
pub mod event;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use effect::Effect;
pub use event::Event;
pub use state::{SessionContext, TripRequest};
pub use transition::transition;
