//! Pure state transition function

use super::state::format_budget;
use super::{Effect, Event, TripRequest};
use crate::itinerary::generate_itinerary;

/// Result of a state transition
#[derive(Debug)]
pub struct TransitionResult {
    pub new_state: TripRequest,
    pub effects: Vec<Effect>,
}

impl TransitionResult {
    pub fn new(state: TripRequest) -> Self {
        Self {
            new_state: state,
            effects: vec![],
        }
    }

    pub fn with_effect(mut self, effect: Effect) -> Self {
        self.effects.push(effect);
        self
    }

    /// Acknowledge to the user, then ask the host to persist
    fn say_and_commit(self, text: impl Into<String>) -> Self {
        self.with_effect(Effect::say(text)).with_effect(Effect::Commit)
    }

    /// Text of the first `Say` effect, if any
    #[allow(dead_code)] // Used by tests
    pub fn reply(&self) -> Option<&str> {
        self.effects.iter().find_map(|effect| match effect {
            Effect::Say { text } => Some(text.as_str()),
            Effect::Commit => None,
        })
    }
}

/// Pure transition function
///
/// Given the same request and event this always produces the same new
/// request and effects, with no I/O. Every event is valid in every state,
/// so there is no error path.
pub fn transition(state: &TripRequest, event: Event) -> TransitionResult {
    let mut next = state.clone();

    match event {
        Event::SetInterests { interests } => {
            let ack = format!("Great! I'll note your interests: {}.", interests.join(", "));
            next.set_interests(interests);
            TransitionResult::new(next).say_and_commit(ack)
        }

        Event::SetBudget { budget } => {
            next.set_budget(budget);
            TransitionResult::new(next)
                .say_and_commit(format!("Understood, your budget is ${}.", format_budget(budget)))
        }

        Event::SetTimeConstraint { time } => {
            next.set_time_constraint(time);
            TransitionResult::new(next)
                .say_and_commit(format!("Got it, your travel duration is {time} days."))
        }

        Event::SetDestination { destination } => {
            let ack = format!("Noted, your desired destination is {destination}.");
            next.set_destination(destination);
            TransitionResult::new(next).say_and_commit(ack)
        }

        // Read-only, but the host still gets a commit after every action
        Event::GenerateItinerary => {
            let text = generate_itinerary(&next);
            TransitionResult::new(next).say_and_commit(text)
        }
    }
}
