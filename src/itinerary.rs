//! Itinerary composition
//!
//! Turns a trip request snapshot into either a prompt for the slots still
//! missing or a templated day-by-day itinerary. Everything is derived from
//! the four slots; nothing is looked up elsewhere.

use crate::state_machine::state::{format_budget, Slot, TripRequest};
use serde::Serialize;
use std::fmt;

const MISSING_PREFIX: &str = "Please provide your:  ";

/// Result of composing a trip request
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Composition {
    /// One or more slots are unfilled, in reporting order
    MissingFields { slots: Vec<Slot> },
    Itinerary(Itinerary),
}

/// Fully filled request, ready to render
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Itinerary {
    pub interests: Vec<String>,
    pub budget: f64,
    pub days: u32,
    pub destination: String,
}

impl Itinerary {
    /// Build from a request whose slots are all filled
    pub fn from_request(request: &TripRequest) -> Option<Self> {
        if !request.missing_slots().is_empty() {
            return None;
        }
        Some(Self {
            interests: request.interests.clone(),
            budget: request.budget?,
            days: request.time?,
            destination: request.destination.clone()?,
        })
    }

    /// Interest for a given 0-based position, falling back to the first one
    fn interest_or_first(&self, index: usize) -> &str {
        let first = self.interests.first().map_or("", String::as_str);
        self.interests
            .get(index)
            .map(String::as_str)
            .filter(|interest| !interest.is_empty())
            .unwrap_or(first)
    }
}

impl fmt::Display for Itinerary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let destination = &self.destination;
        let days = self.days;

        writeln!(
            f,
            "Based on your interests in {}, a budget of ${}, a travel duration of {days} days, and your destination {destination}, here's a suggested itinerary:",
            self.interests.join(", "),
            format_budget(self.budget),
        )?;
        writeln!(f)?;
        writeln!(
            f,
            "- **Day 1**: Arrival in {destination} and exploration of local sights related to {}.",
            self.interest_or_first(0)
        )?;
        writeln!(f, "- **Day 2**: Activities focused on {}.", self.interest_or_first(1))?;
        writeln!(
            f,
            "- **Day 3**: Enjoying {} with recommended restaurants.",
            self.interest_or_first(2)
        )?;
        // Emitted even for trips shorter than four days
        writeln!(
            f,
            "- **Day 4-{days}**: Free time to explore other attractions within your budget."
        )?;
        writeln!(f)?;
        write!(f, "Hope you enjoy your trip!")
    }
}

impl fmt::Display for Composition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Composition::MissingFields { slots } => {
                let names: Vec<&str> = slots.iter().map(|slot| slot.name()).collect();
                write!(f, "{MISSING_PREFIX}{}", names.join(", "))
            }
            Composition::Itinerary(itinerary) => itinerary.fmt(f),
        }
    }
}

/// Compose a trip request snapshot. Pure and deterministic.
pub fn compose(request: &TripRequest) -> Composition {
    match Itinerary::from_request(request) {
        Some(itinerary) => Composition::Itinerary(itinerary),
        None => Composition::MissingFields {
            slots: request.missing_slots(),
        },
    }
}

/// Compose and render to the text shown to the user
pub fn generate_itinerary(request: &TripRequest) -> String {
    compose(request).to_string()
}
