//! Flow types and their per-flow generation parameters.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Which scripted protocol governs a conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlowType {
    /// Daily emotional check-in.
    Checkin,
    /// Five-step crisis log.
    Crisis,
}

/// Sampling parameters sent with every completion request of a flow.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sampling {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl FlowType {
    /// Both flows, in processing order.
    pub const ALL: [FlowType; 2] = [FlowType::Checkin, FlowType::Crisis];

    pub fn as_str(&self) -> &'static str {
        match self {
            FlowType::Checkin => "checkin",
            FlowType::Crisis => "crisis",
        }
    }

    /// Maximum number of agent round trips per conversation.
    pub fn max_turns(&self) -> usize {
        match self {
            FlowType::Checkin => 10,
            FlowType::Crisis => 12,
        }
    }

    pub fn sampling(&self) -> Sampling {
        match self {
            FlowType::Checkin => Sampling {
                temperature: 0.7,
                max_tokens: 200,
            },
            FlowType::Crisis => Sampling {
                temperature: 0.3,
                max_tokens: 150,
            },
        }
    }

    /// Agent line used in the two-turn stand-in conversation written when a
    /// scenario cannot be generated in batch mode.
    pub fn fallback_acknowledgment(&self) -> &'static str {
        match self {
            FlowType::Checkin => "entiendo. gracias por compartir.",
            FlowType::Crisis => "gracias. el registro ha terminado.",
        }
    }
}

impl fmt::Display for FlowType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown flow type '{0}' (expected 'checkin' or 'crisis')")]
pub struct ParseFlowTypeError(String);

impl FromStr for FlowType {
    type Err = ParseFlowTypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "checkin" | "check-in" | "check_in" => Ok(FlowType::Checkin),
            "crisis" => Ok(FlowType::Crisis),
            other => Err(ParseFlowTypeError(other.to_string())),
        }
    }
}
