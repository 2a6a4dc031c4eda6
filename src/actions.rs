//! Action catalog and argument decoding
//!
//! Hosts route user intent to one of these named actions and hand over the
//! JSON arguments. Decoding here is the schema boundary: once an [`Event`]
//! exists, the state machine assumes its arguments are well-formed.

use crate::state_machine::Event;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use thiserror::Error;

/// Legacy plural spelling of the time action, still accepted
const TIME_ACTION_ALIAS: &str = "setTimeConstraints";

/// Errors decoding an action invocation
#[derive(Debug, Error)]
pub enum ActionError {
    #[error("Unknown action: {0}")]
    UnknownAction(String),
    #[error("Invalid arguments for {action}: {source}")]
    InvalidArguments {
        action: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// Description of an action, as offered to whatever routes user intent
#[derive(Debug, Clone, Serialize)]
pub struct ActionDefinition {
    pub name: &'static str,
    pub description: &'static str,
    pub input_schema: Value,
    pub examples: Vec<Value>,
}

#[derive(Debug, Deserialize)]
struct SetInterestsInput {
    interests: Vec<String>,
}

#[derive(Debug, Deserialize)]
struct SetBudgetInput {
    budget: f64,
}

#[derive(Debug, Deserialize)]
struct SetTimeInput {
    time: u32,
}

#[derive(Debug, Deserialize)]
struct SetDestinationInput {
    destination: String,
}

/// All actions a session accepts
pub fn catalog() -> Vec<ActionDefinition> {
    vec![
        ActionDefinition {
            name: "setInterests",
            description: "Set the user's travel interests",
            input_schema: json!({
                "type": "object",
                "required": ["interests"],
                "properties": {
                    "interests": {
                        "type": "array",
                        "items": { "type": "string" },
                        "description": "Things the user wants to do, most important first"
                    }
                }
            }),
            examples: vec![json!({ "interests": ["beaches", "hiking", "local cuisine"] })],
        },
        ActionDefinition {
            name: "setBudget",
            description: "Set the user's travel budget",
            input_schema: json!({
                "type": "object",
                "required": ["budget"],
                "properties": {
                    "budget": { "type": "number" }
                }
            }),
            examples: vec![json!({ "budget": 1500 })],
        },
        ActionDefinition {
            name: "setTimeConstraint",
            description: "Set the user's travel time constraints in days",
            input_schema: json!({
                "type": "object",
                "required": ["time"],
                "properties": {
                    "time": { "type": "integer", "minimum": 0 }
                }
            }),
            examples: vec![json!({ "time": 7 })],
        },
        ActionDefinition {
            name: "setDestination",
            description: "Set the user's travel destination",
            input_schema: json!({
                "type": "object",
                "required": ["destination"],
                "properties": {
                    "destination": { "type": "string" }
                }
            }),
            examples: vec![json!({ "destination": "Italy" })],
        },
        ActionDefinition {
            name: "generateItinerary",
            description: "Generate a personalized travel itinerary based on collected information",
            input_schema: json!({ "type": "object", "properties": {} }),
            examples: vec![],
        },
    ]
}

fn decode<T: DeserializeOwned>(action: &'static str, args: Value) -> Result<T, ActionError> {
    serde_json::from_value(args).map_err(|source| ActionError::InvalidArguments { action, source })
}

/// Decode a named action and its JSON arguments into an event
///
/// Unknown keys in `args` are ignored. `generateItinerary` takes no
/// arguments, so anything passed with it is ignored too.
pub fn parse_action(name: &str, args: Value) -> Result<Event, ActionError> {
    match name {
        "setInterests" => {
            let input: SetInterestsInput = decode("setInterests", args)?;
            Ok(Event::SetInterests {
                interests: input.interests,
            })
        }
        "setBudget" => {
            let input: SetBudgetInput = decode("setBudget", args)?;
            Ok(Event::SetBudget {
                budget: input.budget,
            })
        }
        "setTimeConstraint" | TIME_ACTION_ALIAS => {
            let input: SetTimeInput = decode("setTimeConstraint", args)?;
            Ok(Event::SetTimeConstraint { time: input.time })
        }
        "setDestination" => {
            let input: SetDestinationInput = decode("setDestination", args)?;
            Ok(Event::SetDestination {
                destination: input.destination,
            })
        }
        "generateItinerary" => Ok(Event::GenerateItinerary),
        other => Err(ActionError::UnknownAction(other.to_string())),
    }
}
