//! Events that can occur in a planning session

use serde::{Deserialize, Serialize};

/// Events that trigger state transitions
///
/// Arguments are assumed to already satisfy the action schema; see
/// [`crate::actions::parse_action`] for the decoding side.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Event {
    SetInterests { interests: Vec<String> },
    SetBudget { budget: f64 },
    SetTimeConstraint { time: u32 },
    SetDestination { destination: String },
    GenerateItinerary,
}

impl Event {
    /// Action name this event was dispatched under
    pub fn action_name(&self) -> &'static str {
        match self {
            Event::SetInterests { .. } => "setInterests",
            Event::SetBudget { .. } => "setBudget",
            Event::SetTimeConstraint { .. } => "setTimeConstraint",
            Event::SetDestination { .. } => "setDestination",
            Event::GenerateItinerary => "generateItinerary",
        }
    }
}
