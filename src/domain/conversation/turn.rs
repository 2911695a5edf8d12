//! Turns and conversations.
//!
//! A conversation is an append-only sequence of single-speaker turns. The
//! serialized form of a turn is a single-key object keyed by speaker:
//!
//! ```json
//! [{"user": "hola amelia"}, {"amelia": "hola, ¿cómo te sientes hoy?"}]
//! ```

use serde::{Deserialize, Serialize};

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Speaker {
    /// The scripted user persona.
    User,
    /// The conversational agent (Amelia).
    Agent,
}

/// One speaker's single utterance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Turn {
    #[serde(rename = "user")]
    User(String),
    #[serde(rename = "amelia")]
    Agent(String),
}

impl Turn {
    /// Creates a user turn.
    pub fn user(text: impl Into<String>) -> Self {
        Turn::User(text.into())
    }

    /// Creates an agent turn.
    pub fn agent(text: impl Into<String>) -> Self {
        Turn::Agent(text.into())
    }

    /// Returns the speaker of this turn.
    pub fn speaker(&self) -> Speaker {
        match self {
            Turn::User(_) => Speaker::User,
            Turn::Agent(_) => Speaker::Agent,
        }
    }

    /// Returns the text of this turn.
    pub fn text(&self) -> &str {
        match self {
            Turn::User(text) | Turn::Agent(text) => text,
        }
    }

    pub fn is_user(&self) -> bool {
        matches!(self, Turn::User(_))
    }

    pub fn is_agent(&self) -> bool {
        matches!(self, Turn::Agent(_))
    }
}

/// An ordered, append-only transcript.
///
/// Built by the orchestrator one turn at a time and handed to the transcript
/// store whole. There is no API for editing or removing turns.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Conversation {
    turns: Vec<Turn>,
}

impl Conversation {
    /// Starts a conversation with the user's opening message.
    pub fn opened_by(initial_message: impl Into<String>) -> Self {
        Self {
            turns: vec![Turn::user(initial_message)],
        }
    }

    /// Appends a turn.
    pub fn push(&mut self, turn: Turn) {
        self.turns.push(turn);
    }

    pub fn turns(&self) -> &[Turn] {
        &self.turns
    }

    pub fn len(&self) -> usize {
        self.turns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.turns.is_empty()
    }

    pub fn first(&self) -> Option<&Turn> {
        self.turns.first()
    }

    pub fn last(&self) -> Option<&Turn> {
        self.turns.last()
    }

    /// Texts of the user turns, in order.
    pub fn user_texts(&self) -> impl Iterator<Item = &str> {
        self.turns.iter().filter(|t| t.is_user()).map(Turn::text)
    }

    /// Texts of the agent turns, in order.
    pub fn agent_texts(&self) -> impl Iterator<Item = &str> {
        self.turns.iter().filter(|t| t.is_agent()).map(Turn::text)
    }

    /// Number of agent turns.
    pub fn agent_turn_count(&self) -> usize {
        self.turns.iter().filter(|t| t.is_agent()).count()
    }

    pub fn into_turns(self) -> Vec<Turn> {
        self.turns
    }
}

impl From<Vec<Turn>> for Conversation {
    fn from(turns: Vec<Turn>) -> Self {
        Self { turns }
    }
}
