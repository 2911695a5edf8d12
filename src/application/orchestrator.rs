//! Conversation Orchestrator - runs one scenario to completion or truncation.
//!
//! The loop alternates agent completions and scripted user replies:
//!
//! 1. Refresh the system instruction with the current flow-state annotation.
//! 2. Ask the provider for the agent's reply; record it trimmed and lower-cased.
//! 3. Stop if the turn policy says the reply closes the conversation.
//! 4. Otherwise record the next scripted (or fallback) user reply and pace.
//!
//! Provider failures end the conversation early and are never propagated: the
//! caller gets whatever transcript exists at that point.

use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, warn};

use crate::domain::conversation::{
    Conversation, FlowState, ScenarioError, ScenarioRef, ScriptCursor, Turn, TurnPolicy,
};
use crate::ports::{AIProvider, CompletionRequest, Message};

use super::prompt::PromptTemplate;

/// Default delay between completion calls.
pub const DEFAULT_PACING: Duration = Duration::from_secs(1);

/// Errors that prevent a scenario from being run at all.
#[derive(Debug, Error)]
pub enum OrchestratorError {
    #[error("invalid scenario: {0}")]
    InvalidScenario(#[from] ScenarioError),

    #[error("failed to build flow-state annotation: {0}")]
    Annotation(#[from] serde_json::Error),
}

/// Why a conversation stopped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// The agent closed the conversation.
    Concluded,
    /// The turn ceiling was reached without a closing reply.
    TurnCeiling,
    /// The provider failed; the transcript is partial.
    Truncated { reason: String },
}

/// A generated transcript and how it ended.
#[derive(Debug, Clone)]
pub struct GeneratedConversation {
    pub conversation: Conversation,
    pub outcome: RunOutcome,
}

impl GeneratedConversation {
    pub fn is_concluded(&self) -> bool {
        self.outcome == RunOutcome::Concluded
    }
}

pub struct ConversationOrchestrator {
    provider: Arc<dyn AIProvider>,
    prompt: Arc<PromptTemplate>,
    policy: TurnPolicy,
    pacing: Duration,
    seed: Option<u64>,
}

impl ConversationOrchestrator {
    pub fn new(provider: Arc<dyn AIProvider>, prompt: Arc<PromptTemplate>) -> Self {
        Self {
            provider,
            prompt,
            policy: TurnPolicy::default(),
            pacing: DEFAULT_PACING,
            seed: None,
        }
    }

    /// Sets the delay inserted between completion calls.
    pub fn with_pacing(mut self, pacing: Duration) -> Self {
        self.pacing = pacing;
        self
    }

    pub fn with_policy(mut self, policy: TurnPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Seeds fallback-reply selection, making runs reproducible.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Runs a scenario with its flow's turn ceiling.
    pub async fn run(
        &self,
        scenario: ScenarioRef<'_>,
    ) -> Result<GeneratedConversation, OrchestratorError> {
        self.run_with_ceiling(scenario, scenario.flow_type().max_turns())
            .await
    }

    /// Runs a scenario for at most `max_turns` agent replies.
    pub async fn run_with_ceiling(
        &self,
        scenario: ScenarioRef<'_>,
        max_turns: usize,
    ) -> Result<GeneratedConversation, OrchestratorError> {
        scenario.validate()?;

        let flow = scenario.flow_type();
        let sampling = flow.sampling();
        let initial = scenario.initial_message();

        let mut conversation = Conversation::opened_by(initial);
        let mut history = vec![Message::user(initial)];
        let mut state = FlowState::initial(flow);
        let mut cursor = ScriptCursor::default();
        let mut rng = self.reply_rng();
        let mut outcome = RunOutcome::TurnCeiling;

        for turn in 0..max_turns {
            let annotation = self.policy.next_context(&state)?;
            let request = CompletionRequest::new()
                .with_system_prompt(self.prompt.system_instruction(&annotation))
                .with_messages(history.clone())
                .with_temperature(sampling.temperature)
                .with_max_tokens(sampling.max_tokens);

            let reply = match self.provider.complete(request).await {
                Ok(response) => response.content.trim().to_lowercase(),
                Err(err) => {
                    warn!(flow = %flow, scenario = scenario.tag(), turn, error = %err, "completion failed, truncating conversation");
                    outcome = RunOutcome::Truncated {
                        reason: err.to_string(),
                    };
                    break;
                }
            };

            debug!(flow = %flow, turn, agent = %reply, "agent turn");
            conversation.push(Turn::agent(reply.clone()));
            history.push(Message::assistant(reply.clone()));

            if self.policy.is_terminal(flow, &reply) {
                outcome = RunOutcome::Concluded;
                break;
            }

            let (user_reply, next_cursor) = self.policy.next_user_reply(scenario, cursor, &mut rng);
            cursor = next_cursor;
            state.sync_with(cursor);

            debug!(flow = %flow, turn, user = %user_reply, "user turn");
            conversation.push(Turn::user(user_reply.clone()));
            history.push(Message::user(user_reply));

            if turn + 1 < max_turns && !self.pacing.is_zero() {
                sleep(self.pacing).await;
            }
        }

        Ok(GeneratedConversation {
            conversation,
            outcome,
        })
    }

    fn reply_rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        }
    }
}
