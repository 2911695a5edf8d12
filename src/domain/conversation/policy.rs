//! Turn policy: per-flow decisions that don't depend on transport.
//!
//! - context annotation for the next request
//! - whether an agent reply ends the conversation
//! - which user reply comes next

use rand::seq::SliceRandom;
use rand::Rng;
use std::sync::Arc;

use super::flow::FlowType;
use super::scenario::{CrisisStep, ScenarioRef};
use super::state::{FlowState, ScriptCursor};
use super::termination::{KeywordTerminationDetector, TerminationDetector};

/// Acknowledgments used once a check-in script runs out.
pub const CHECKIN_FALLBACK_REPLIES: [&str; 5] = ["gracias", "ok", "entiendo", "sí", "claro"];

/// Reply given after every crisis slot has been answered.
pub const CRISIS_EXHAUSTED_REPLY: &str = "gracias";

#[derive(Debug, Clone)]
pub struct TurnPolicy {
    detector: Arc<dyn TerminationDetector>,
}

impl Default for TurnPolicy {
    fn default() -> Self {
        Self::new(Arc::new(KeywordTerminationDetector))
    }
}

impl TurnPolicy {
    pub fn new(detector: Arc<dyn TerminationDetector>) -> Self {
        Self { detector }
    }

    /// Annotation appended to the system prompt for the next request.
    pub fn next_context(&self, state: &FlowState) -> Result<String, serde_json::Error> {
        state.annotation()
    }

    pub fn is_terminal(&self, flow: FlowType, agent_text: &str) -> bool {
        self.detector.is_terminal(flow, agent_text)
    }

    /// Picks the next user reply and returns it with the advanced cursor.
    ///
    /// Scripted replies are consumed in order. Fallback replies do not move
    /// the cursor.
    pub fn next_user_reply<R: Rng + ?Sized>(
        &self,
        scenario: ScenarioRef<'_>,
        cursor: ScriptCursor,
        rng: &mut R,
    ) -> (String, ScriptCursor) {
        match scenario {
            ScenarioRef::Checkin(s) => match s.scripted_replies.get(cursor.consumed()) {
                Some(reply) => (reply.clone(), cursor.advanced()),
                None => {
                    let reply = CHECKIN_FALLBACK_REPLIES
                        .choose(rng)
                        .copied()
                        .unwrap_or(CHECKIN_FALLBACK_REPLIES[0]);
                    (reply.to_string(), cursor)
                }
            },
            ScenarioRef::Crisis(s) => match CrisisStep::at(cursor.consumed()) {
                Some(step) => (s.slots.get(step).to_string(), cursor.advanced()),
                None => (CRISIS_EXHAUSTED_REPLY.to_string(), cursor),
            },
        }
    }
}
