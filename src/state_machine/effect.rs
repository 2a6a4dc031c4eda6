//! Effects produced by state transitions

/// Effects to be executed by the host after a state transition
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Deliver a message to the user
    Say { text: String },

    /// Persist the new trip request
    Commit,
}

impl Effect {
    pub fn say(text: impl Into<String>) -> Self {
        Effect::Say { text: text.into() }
    }
}
