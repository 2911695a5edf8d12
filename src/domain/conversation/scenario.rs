//! Scenario definitions: the scripted user side of a conversation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use super::flow::FlowType;

/// A check-in persona with replies consumed strictly in order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckinScenario {
    pub initial_message: String,
    pub profile_tag: String,
    #[serde(default)]
    pub scripted_replies: Vec<String>,
}

/// A crisis-log situation with one answer per protocol step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrisisScenario {
    pub initial_message: String,
    pub scenario_tag: String,
    pub slots: CrisisSlots,
}

/// Steps of the crisis-log protocol, in the only order they are asked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CrisisStep {
    #[serde(rename = "awaiting_activator")]
    Activator,
    #[serde(rename = "awaiting_belief")]
    Belief,
    #[serde(rename = "awaiting_emotion")]
    Emotion,
    #[serde(rename = "awaiting_behavior")]
    Behavior,
    #[serde(rename = "awaiting_physical")]
    Physical,
}

impl CrisisStep {
    pub const ORDER: [CrisisStep; 5] = [
        CrisisStep::Activator,
        CrisisStep::Belief,
        CrisisStep::Emotion,
        CrisisStep::Behavior,
        CrisisStep::Physical,
    ];

    /// Returns the step at `index` in protocol order.
    pub fn at(index: usize) -> Option<CrisisStep> {
        Self::ORDER.get(index).copied()
    }

    /// Slot key as written in the scenario catalog.
    pub fn slot_name(&self) -> &'static str {
        match self {
            CrisisStep::Activator => "activator",
            CrisisStep::Belief => "belief",
            CrisisStep::Emotion => "emotion",
            CrisisStep::Behavior => "behavior",
            CrisisStep::Physical => "physical",
        }
    }

    /// State name reported to the agent while this step is pending.
    pub fn state_name(&self) -> &'static str {
        match self {
            CrisisStep::Activator => "awaiting_activator",
            CrisisStep::Belief => "awaiting_belief",
            CrisisStep::Emotion => "awaiting_emotion",
            CrisisStep::Behavior => "awaiting_behavior",
            CrisisStep::Physical => "awaiting_physical",
        }
    }
}

/// The five user answers of a crisis scenario.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CrisisSlots {
    pub activator: String,
    pub belief: String,
    pub emotion: String,
    pub behavior: String,
    pub physical: String,
}

impl CrisisSlots {
    pub fn get(&self, step: CrisisStep) -> &str {
        match step {
            CrisisStep::Activator => &self.activator,
            CrisisStep::Belief => &self.belief,
            CrisisStep::Emotion => &self.emotion,
            CrisisStep::Behavior => &self.behavior,
            CrisisStep::Physical => &self.physical,
        }
    }
}

/// Errors in scenario data, detected when a scenario is about to run.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ScenarioError {
    #[error("scenario '{tag}' has an empty initial message")]
    EmptyInitialMessage { tag: String },

    #[error("scenario '{tag}' has an empty '{slot}' slot")]
    EmptySlot { tag: String, slot: &'static str },

    #[error("scenario '{tag}' has an empty scripted reply at position {index}")]
    EmptyReply { tag: String, index: usize },
}

/// A borrowed scenario of either flow.
#[derive(Debug, Clone, Copy)]
pub enum ScenarioRef<'a> {
    Checkin(&'a CheckinScenario),
    Crisis(&'a CrisisScenario),
}

impl<'a> ScenarioRef<'a> {
    pub fn flow_type(&self) -> FlowType {
        match self {
            ScenarioRef::Checkin(_) => FlowType::Checkin,
            ScenarioRef::Crisis(_) => FlowType::Crisis,
        }
    }

    pub fn initial_message(&self) -> &'a str {
        match self {
            ScenarioRef::Checkin(s) => &s.initial_message,
            ScenarioRef::Crisis(s) => &s.initial_message,
        }
    }

    /// Profile or scenario tag, used in progress output.
    pub fn tag(&self) -> &'a str {
        match self {
            ScenarioRef::Checkin(s) => &s.profile_tag,
            ScenarioRef::Crisis(s) => &s.scenario_tag,
        }
    }

    /// Checks that every utterance the scenario can contribute is non-empty.
    pub fn validate(&self) -> Result<(), ScenarioError> {
        if self.initial_message().trim().is_empty() {
            return Err(ScenarioError::EmptyInitialMessage {
                tag: self.tag().to_string(),
            });
        }

        match self {
            ScenarioRef::Checkin(s) => {
                if let Some(index) = s.scripted_replies.iter().position(|r| r.trim().is_empty()) {
                    return Err(ScenarioError::EmptyReply {
                        tag: s.profile_tag.clone(),
                        index,
                    });
                }
            }
            ScenarioRef::Crisis(s) => {
                for step in CrisisStep::ORDER {
                    if s.slots.get(step).trim().is_empty() {
                        return Err(ScenarioError::EmptySlot {
                            tag: s.scenario_tag.clone(),
                            slot: step.slot_name(),
                        });
                    }
                }
            }
        }

        Ok(())
    }
}
