//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::state::{Slot, TripRequest};
use super::*;
use crate::itinerary::{compose, Composition};
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_interests() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec("[a-z ]{0,12}", 0..5)
}

fn arb_budget() -> impl Strategy<Value = f64> {
    prop_oneof![
        Just(0.0),
        (1u32..100_000).prop_map(f64::from),
        (-1000.0f64..100_000.0),
    ]
}

fn arb_destination() -> impl Strategy<Value = String> {
    "[A-Za-z ]{0,16}"
}

fn arb_set_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        arb_interests().prop_map(|interests| Event::SetInterests { interests }),
        arb_budget().prop_map(|budget| Event::SetBudget { budget }),
        (0u32..30).prop_map(|time| Event::SetTimeConstraint { time }),
        arb_destination().prop_map(|destination| Event::SetDestination { destination }),
    ]
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        4 => arb_set_event(),
        1 => Just(Event::GenerateItinerary),
    ]
}

fn arb_request() -> impl Strategy<Value = TripRequest> {
    (
        arb_interests(),
        proptest::option::of(arb_budget()),
        proptest::option::of(0u32..30),
        proptest::option::of(arb_destination()),
    )
        .prop_map(|(interests, budget, time, destination)| TripRequest {
            interests,
            budget,
            time,
            destination,
        })
}

/// Expected request after replaying events, tracked field by field
fn last_write_wins(events: &[Event]) -> TripRequest {
    let mut expected = TripRequest::new();
    for event in events {
        match event {
            Event::SetInterests { interests } => expected.interests.clone_from(interests),
            Event::SetBudget { budget } => expected.budget = Some(*budget),
            Event::SetTimeConstraint { time } => expected.time = Some(*time),
            Event::SetDestination { destination } => {
                expected.destination = Some(destination.clone());
            }
            Event::GenerateItinerary => {}
        }
    }
    expected
}

/// Slots a request still lacks, read straight off its raw fields
fn unfilled_slots(request: &TripRequest) -> Vec<Slot> {
    let mut slots = Vec::new();
    if request.interests.is_empty() {
        slots.push(Slot::Interests);
    }
    if request.budget.is_none_or(|b| b == 0.0 || b.is_nan()) {
        slots.push(Slot::Budget);
    }
    if request.time.is_none_or(|t| t == 0) {
        slots.push(Slot::Time);
    }
    if request.destination.as_deref().is_none_or(str::is_empty) {
        slots.push(Slot::Destination);
    }
    slots
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    #![proptest_config(ProptestConfig::with_cases(500))]

    // Invariant 1: Each field holds only the last value set, whatever the interleaving
    #[test]
    fn prop_last_write_wins(events in proptest::collection::vec(arb_event(), 0..20)) {
        let mut state = TripRequest::new();
        for event in events.clone() {
            state = transition(&state, event).new_state;
        }
        prop_assert_eq!(state, last_write_wins(&events));
    }

    // Invariant 2: Every event produces exactly one Say followed by one Commit
    #[test]
    fn prop_say_then_commit(state in arb_request(), event in arb_event()) {
        let result = transition(&state, event);
        prop_assert_eq!(result.effects.len(), 2);
        let starts_with_say = matches!(result.effects[0], Effect::Say { .. });
        prop_assert!(starts_with_say);
        prop_assert_eq!(&result.effects[1], &Effect::Commit);
    }

    // Invariant 3: Generating never changes the request
    #[test]
    fn prop_generate_is_read_only(state in arb_request()) {
        let result = transition(&state, Event::GenerateItinerary);
        prop_assert_eq!(result.new_state, state);
    }

    // Invariant 4: Composition is deterministic
    #[test]
    fn prop_compose_deterministic(state in arb_request()) {
        let first = transition(&state, Event::GenerateItinerary);
        let second = transition(&state, Event::GenerateItinerary);
        prop_assert_eq!(first.reply(), second.reply());
    }

    // Invariant 5: Missing slots are reported in fixed order and only when unfilled
    #[test]
    fn prop_missing_slots_ordered(state in arb_request()) {
        let missing = state.missing_slots();
        prop_assert_eq!(&missing, &unfilled_slots(&state));

        match compose(&state) {
            Composition::MissingFields { slots } => {
                prop_assert!(!slots.is_empty());
                prop_assert_eq!(slots, missing);
            }
            Composition::Itinerary(itinerary) => {
                prop_assert!(missing.is_empty());
                prop_assert_eq!(itinerary.days, state.time.unwrap_or_default());
            }
        }
    }

    // Invariant 6: A filled request always renders the day range from its time slot
    #[test]
    fn prop_itinerary_has_day_range(
        interests in proptest::collection::vec("[a-z]{1,10}", 1..5),
        days in 1u32..30,
        destination in "[A-Za-z]{1,16}",
    ) {
        let state = TripRequest {
            interests,
            budget: Some(1500.0),
            time: Some(days),
            destination: Some(destination),
        };
        let result = transition(&state, Event::GenerateItinerary);
        let text = result.reply().unwrap_or_default();
        let day_range = format!("- **Day 4-{days}**:");
        prop_assert!(text.contains(&day_range));
        prop_assert!(!text.starts_with("Please provide your:"));
    }
}
