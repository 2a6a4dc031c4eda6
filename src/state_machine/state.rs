//! Trip request state types

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Slots
// ============================================================================

/// One of the four pieces of trip information collected from the user.
///
/// Declaration order is the order missing slots are reported in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Slot {
    Interests,
    Budget,
    Time,
    Destination,
}

impl Slot {
    pub const ALL: [Slot; 4] = [Slot::Interests, Slot::Budget, Slot::Time, Slot::Destination];

    /// Name shown to the user when the slot is missing
    pub fn name(self) -> &'static str {
        match self {
            Slot::Interests => "interests",
            Slot::Budget => "budget",
            Slot::Time => "time",
            Slot::Destination => "destination",
        }
    }
}

impl fmt::Display for Slot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Trip Request
// ============================================================================

/// Slot-filling state for a single session.
///
/// Created empty at session start and mutated only through the four setters.
/// Each setter overwrites its field; nothing here ever clears a field.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TripRequest {
    #[serde(default)]
    pub interests: Vec<String>,
    #[serde(default)]
    pub budget: Option<f64>,
    /// Travel duration in days
    #[serde(default)]
    pub time: Option<u32>,
    #[serde(default)]
    pub destination: Option<String>,
}

impl TripRequest {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_interests(&mut self, interests: Vec<String>) {
        self.interests = interests;
    }

    pub fn set_budget(&mut self, budget: f64) {
        self.budget = Some(budget);
    }

    pub fn set_time_constraint(&mut self, days: u32) {
        self.time = Some(days);
    }

    pub fn set_destination(&mut self, destination: String) {
        self.destination = Some(destination);
    }

    /// Whether a slot holds a usable value.
    ///
    /// Zero (and NaN) budgets and zero-day trips count as unfilled, the same
    /// as never having been set.
    pub fn is_filled(&self, slot: Slot) -> bool {
        match slot {
            Slot::Interests => !self.interests.is_empty(),
            Slot::Budget => self.budget.is_some_and(|b| b != 0.0 && !b.is_nan()),
            Slot::Time => self.time.is_some_and(|days| days != 0),
            Slot::Destination => self.destination.as_deref().is_some_and(|d| !d.is_empty()),
        }
    }

    /// Unfilled slots in reporting order
    pub fn missing_slots(&self) -> Vec<Slot> {
        Slot::ALL
            .into_iter()
            .filter(|slot| !self.is_filled(*slot))
            .collect()
    }
}

/// Render a budget the way it was given: `1500` stays `1500`, `99.5` stays `99.5`.
///
/// Magnitudes at or above `1e21` or below `1e-6` switch to exponent form
/// (`1e+21`, `1.5e-7`), matching how JSON numbers read back as text.
pub fn format_budget(budget: f64) -> String {
    if budget == 0.0 {
        // Avoid "-0"
        return "0".to_string();
    }
    if budget.is_infinite() {
        let text = if budget > 0.0 { "Infinity" } else { "-Infinity" };
        return text.to_string();
    }
    if budget.is_nan() || (1e-6..1e21).contains(&budget.abs()) {
        return budget.to_string();
    }

    let exponent_form = format!("{budget:e}");
    match exponent_form.split_once('e') {
        Some((mantissa, power)) if !power.starts_with('-') => format!("{mantissa}e+{power}"),
        _ => exponent_form,
    }
}

// ============================================================================
// Session Context
// ============================================================================

/// Immutable per-session configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionContext {
    pub session_id: String,
}

impl SessionContext {
    pub fn new(session_id: impl Into<String>) -> Self {
        Self {
            session_id: session_id.into(),
        }
    }
}
