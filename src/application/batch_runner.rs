//! Batch Runner - drives the orchestrator across a scenario catalog.
//!
//! Both run modes share one loop. They differ in the sink that receives each
//! conversation and in how a scenario that cannot be run is handled:
//!
//! | Mode          | Sink             | Scenario error                          |
//! |---------------|------------------|-----------------------------------------|
//! | `Incremental` | `AppendingSink`  | abort the rest of the flow's catalog    |
//! | `Batch`       | `CollectingSink` | store a two-turn fallback and continue  |
//!
//! Aborting keeps the stored count equal to the index of the next scenario
//! to run, which is what resumption relies on.
//!
//! A persistence failure aborts the flow in either mode. It is recorded on
//! the flow's report and never stops the other flow from running.

use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use tracing::{info, warn};

use crate::domain::conversation::{Conversation, FlowType, ScenarioCatalog, Turn};
use crate::ports::{TranscriptStore, TranscriptStoreError};

use super::orchestrator::{ConversationOrchestrator, OrchestratorError, RunOutcome};
use super::sink::{AppendingSink, CollectingSink, ConversationSink};

/// Why a flow stopped before the end of its catalog.
#[derive(Debug, Error)]
pub enum BatchError {
    #[error("persistence failed: {0}")]
    Persistence(#[from] TranscriptStoreError),

    #[error("scenario failed: {0}")]
    Scenario(#[from] OrchestratorError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunMode {
    /// Append after every scenario; resumable.
    Incremental,
    /// Collect every scenario, then overwrite the collection once.
    Batch,
}

impl RunMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            RunMode::Incremental => "incremental",
            RunMode::Batch => "batch",
        }
    }
}

impl fmt::Display for RunMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Summary of one flow's run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlowReport {
    pub flow: FlowType,
    pub mode: RunMode,
    /// Catalog index the run started from.
    pub resumed_at: usize,
    /// Scenarios handed to the sink, fallbacks included.
    pub processed: usize,
    /// Conversations the agent closed itself.
    pub concluded: usize,
    /// Conversations cut short by a provider failure.
    pub truncated: usize,
    /// Fallback conversations stored in place of a failed scenario.
    pub fallbacks: usize,
    /// Set when a scenario or persistence error stopped the flow early.
    pub aborted: Option<String>,
    /// Collection size after the run.
    pub stored: usize,
}

impl FlowReport {
    fn new(flow: FlowType, mode: RunMode, resumed_at: usize) -> Self {
        Self {
            flow,
            mode,
            resumed_at,
            processed: 0,
            concluded: 0,
            truncated: 0,
            fallbacks: 0,
            aborted: None,
            stored: 0,
        }
    }

    pub fn is_aborted(&self) -> bool {
        self.aborted.is_some()
    }

    fn abort(&mut self, err: BatchError) {
        warn!(flow = %self.flow, processed = self.processed, error = %err, "aborting flow");
        self.aborted = Some(err.to_string());
    }
}

/// Stored count against catalog size for one flow.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlowStatus {
    pub flow: FlowType,
    pub stored: usize,
    pub catalog_size: usize,
}

impl FlowStatus {
    pub fn remaining(&self) -> usize {
        self.catalog_size.saturating_sub(self.stored)
    }
}

/// Conversation stored in place of a scenario that could not be run.
pub fn fallback_conversation(flow: FlowType, initial_message: &str) -> Conversation {
    let mut conversation = Conversation::opened_by(initial_message);
    conversation.push(Turn::agent(flow.fallback_acknowledgment()));
    conversation
}

pub struct BatchRunner {
    orchestrator: ConversationOrchestrator,
    catalog: Arc<ScenarioCatalog>,
    store: Arc<dyn TranscriptStore>,
}

impl BatchRunner {
    pub fn new(
        orchestrator: ConversationOrchestrator,
        catalog: Arc<ScenarioCatalog>,
        store: Arc<dyn TranscriptStore>,
    ) -> Self {
        Self {
            orchestrator,
            catalog,
            store,
        }
    }

    /// Runs check-in then crisis, one after the other. An aborted flow does
    /// not prevent the next one from running.
    pub async fn run_all(&self, mode: RunMode) -> Vec<FlowReport> {
        let mut reports = Vec::with_capacity(FlowType::ALL.len());
        for flow in FlowType::ALL {
            reports.push(self.run_flow(flow, mode).await);
        }
        reports
    }

    pub async fn run_flow(&self, flow: FlowType, mode: RunMode) -> FlowReport {
        match mode {
            RunMode::Incremental => {
                let mut sink = AppendingSink::new(self.store.clone());
                self.drive(flow, mode, &mut sink, None).await
            }
            RunMode::Batch => {
                let mut sink = CollectingSink::new(self.store.clone());
                self.drive(flow, mode, &mut sink, None).await
            }
        }
    }

    /// Empties the flow's collection, then runs and appends its first scenario.
    pub async fn run_smoke(&self, flow: FlowType) -> FlowReport {
        if let Err(err) = self.store.replace_all(flow, &[]).await {
            let mut report = FlowReport::new(flow, RunMode::Incremental, 0);
            report.abort(err.into());
            report.stored = self.store.count(flow).await;
            return report;
        }
        let mut sink = AppendingSink::new(self.store.clone());
        self.drive(flow, RunMode::Incremental, &mut sink, Some(1))
            .await
    }

    pub async fn status(&self) -> Vec<FlowStatus> {
        let mut statuses = Vec::with_capacity(FlowType::ALL.len());
        for flow in FlowType::ALL {
            statuses.push(FlowStatus {
                flow,
                stored: self.store.count(flow).await,
                catalog_size: self.catalog.len(flow),
            });
        }
        statuses
    }

    async fn drive(
        &self,
        flow: FlowType,
        mode: RunMode,
        sink: &mut dyn ConversationSink,
        limit: Option<usize>,
    ) -> FlowReport {
        let total = self.catalog.len(flow);
        let start = match sink.resume_offset(flow).await {
            Ok(start) => start,
            Err(err) => {
                let mut report = FlowReport::new(flow, mode, 0);
                report.abort(err.into());
                report.stored = self.store.count(flow).await;
                return report;
            }
        };
        let end = limit.map_or(total, |n| total.min(start.saturating_add(n)));
        let mut report = FlowReport::new(flow, mode, start);

        if start >= total {
            info!(flow = %flow, stored = start, total, "catalog already complete");
        } else {
            info!(flow = %flow, mode = %mode, start, total, "starting flow");
        }

        for index in start..end {
            let Some(scenario) = self.catalog.get(flow, index) else {
                break;
            };
            info!(flow = %flow, "[{}/{}] {}", index + 1, total, scenario.tag());

            let conversation = match self.orchestrator.run(scenario).await {
                Ok(generated) => {
                    match &generated.outcome {
                        RunOutcome::Concluded => report.concluded += 1,
                        RunOutcome::TurnCeiling => {}
                        RunOutcome::Truncated { .. } => report.truncated += 1,
                    }
                    generated.conversation
                }
                Err(err) => match mode {
                    RunMode::Incremental => {
                        report.abort(err.into());
                        break;
                    }
                    RunMode::Batch => {
                        warn!(flow = %flow, index, error = %err, "scenario failed, storing fallback conversation");
                        report.fallbacks += 1;
                        fallback_conversation(flow, scenario.initial_message())
                    }
                },
            };

            if let Err(err) = sink.accept(flow, conversation).await {
                report.abort(err.into());
                break;
            }
            report.processed += 1;
        }

        report.stored = match sink.finish(flow).await {
            Ok(stored) => stored,
            Err(err) => {
                if !report.is_aborted() {
                    report.abort(err.into());
                }
                self.store.count(flow).await
            }
        };
        info!(
            flow = %flow,
            processed = report.processed,
            concluded = report.concluded,
            truncated = report.truncated,
            fallbacks = report.fallbacks,
            stored = report.stored,
            "flow finished"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::ai::MockAIProvider;
    use crate::adapters::storage::InMemoryTranscriptStore;
    use crate::application::prompt::PromptTemplate;
    use crate::domain::conversation::{CheckinScenario, CrisisScenario, CrisisSlots};
    use async_trait::async_trait;
    use std::time::Duration;

    /// Store whose writes fail for one flow.
    struct FailingWritesStore {
        inner: InMemoryTranscriptStore,
        failing: FlowType,
    }

    impl FailingWritesStore {
        fn new(failing: FlowType) -> Self {
            Self {
                inner: InMemoryTranscriptStore::new(),
                failing,
            }
        }

        fn check(&self, flow: FlowType) -> Result<(), TranscriptStoreError> {
            if flow == self.failing {
                return Err(TranscriptStoreError::IoError("disk full".to_string()));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl TranscriptStore for FailingWritesStore {
        async fn ensure_exists(&self, flow: FlowType) -> Result<(), TranscriptStoreError> {
            self.inner.ensure_exists(flow).await
        }

        async fn append(
            &self,
            flow: FlowType,
            conversation: &Conversation,
        ) -> Result<usize, TranscriptStoreError> {
            self.check(flow)?;
            self.inner.append(flow, conversation).await
        }

        async fn count(&self, flow: FlowType) -> usize {
            self.inner.count(flow).await
        }

        async fn replace_all(
            &self,
            flow: FlowType,
            conversations: &[Conversation],
        ) -> Result<(), TranscriptStoreError> {
            self.check(flow)?;
            self.inner.replace_all(flow, conversations).await
        }

        async fn load(&self, flow: FlowType) -> Result<Vec<Conversation>, TranscriptStoreError> {
            self.inner.load(flow).await
        }
    }

    fn checkin_scenario(n: usize) -> CheckinScenario {
        CheckinScenario {
            initial_message: format!("hola amelia {}", n),
            profile_tag: format!("profile_{}", n),
            scripted_replies: vec!["8".to_string(), "ansiedad".to_string()],
        }
    }

    fn crisis_scenario(n: usize) -> CrisisScenario {
        CrisisScenario {
            initial_message: format!("quiero registrar algo {}", n),
            scenario_tag: format!("crisis_{}", n),
            slots: CrisisSlots {
                activator: "a".to_string(),
                belief: "b".to_string(),
                emotion: "e".to_string(),
                behavior: "c".to_string(),
                physical: "p".to_string(),
            },
        }
    }

    fn catalog(checkin: usize, crisis: usize) -> ScenarioCatalog {
        ScenarioCatalog::new(
            (0..checkin).map(checkin_scenario).collect(),
            (0..crisis).map(crisis_scenario).collect(),
        )
    }

    /// Provider that closes every conversation on its first reply.
    fn closing_provider() -> MockAIProvider {
        MockAIProvider::new()
            .with_default_reply("gracias, el registro ha terminado. hasta mañana")
    }

    fn runner(
        provider: &MockAIProvider,
        catalog: ScenarioCatalog,
        store: Arc<dyn TranscriptStore>,
    ) -> BatchRunner {
        let orchestrator = ConversationOrchestrator::new(
            Arc::new(provider.clone()),
            Arc::new(PromptTemplate::new("Eres Amelia.")),
        )
        .with_pacing(Duration::ZERO)
        .with_seed(7);
        BatchRunner::new(orchestrator, Arc::new(catalog), store)
    }

    #[tokio::test]
    async fn incremental_resumes_from_stored_count() {
        let store = Arc::new(InMemoryTranscriptStore::new());
        for n in 0..3 {
            store
                .append(FlowType::Checkin, &Conversation::opened_by(format!("previo {}", n)))
                .await
                .unwrap();
        }
        let provider = closing_provider();
        let runner = runner(&provider, catalog(5, 0), store.clone());

        let report = runner.run_flow(FlowType::Checkin, RunMode::Incremental).await;

        assert_eq!(report.resumed_at, 3);
        assert_eq!(report.processed, 2);
        assert_eq!(report.concluded, 2);
        assert_eq!(report.stored, 5);
        let stored = store.load(FlowType::Checkin).await.unwrap();
        assert_eq!(stored[0], Conversation::opened_by("previo 0"));
        assert_eq!(stored[3].first(), Some(&Turn::user("hola amelia 3")));
        assert_eq!(stored[4].first(), Some(&Turn::user("hola amelia 4")));
    }

    #[tokio::test]
    async fn incremental_on_complete_catalog_does_nothing() {
        let store = Arc::new(InMemoryTranscriptStore::new());
        let provider = closing_provider();
        let runner = runner(&provider, catalog(2, 0), store.clone());

        runner.run_flow(FlowType::Checkin, RunMode::Incremental).await;
        let report = runner.run_flow(FlowType::Checkin, RunMode::Incremental).await;

        assert_eq!(report.processed, 0);
        assert_eq!(report.stored, 2);
        assert_eq!(provider.call_count(), 2);
    }

    #[tokio::test]
    async fn incremental_aborts_flow_on_invalid_scenario() {
        let store = Arc::new(InMemoryTranscriptStore::new());
        let mut catalog = catalog(0, 4);
        catalog.crisis[2].slots.emotion.clear();
        let provider = closing_provider();
        let runner = runner(&provider, catalog, store.clone());

        let report = runner.run_flow(FlowType::Crisis, RunMode::Incremental).await;

        assert!(report.is_aborted());
        assert_eq!(report.processed, 2);
        assert_eq!(report.stored, 2);
        assert_eq!(store.count(FlowType::Crisis).await, 2);
    }

    #[tokio::test]
    async fn batch_substitutes_fallback_and_overwrites() {
        let store = Arc::new(InMemoryTranscriptStore::new());
        store
            .append(FlowType::Crisis, &Conversation::opened_by("viejo"))
            .await
            .unwrap();
        let mut catalog = catalog(0, 3);
        catalog.crisis[1].slots.physical.clear();
        let provider = closing_provider();
        let runner = runner(&provider, catalog, store.clone());

        let report = runner.run_flow(FlowType::Crisis, RunMode::Batch).await;

        assert_eq!(report.processed, 3);
        assert_eq!(report.fallbacks, 1);
        assert!(!report.is_aborted());
        let stored = store.load(FlowType::Crisis).await.unwrap();
        assert_eq!(stored.len(), 3);
        assert_eq!(
            stored[1].turns(),
            &[
                Turn::user("quiero registrar algo 1"),
                Turn::agent("gracias. el registro ha terminado."),
            ]
        );
    }

    #[tokio::test]
    async fn run_all_processes_both_flows_in_order() {
        let store = Arc::new(InMemoryTranscriptStore::new());
        let provider = closing_provider();
        let runner = runner(&provider, catalog(2, 3), store.clone());

        let reports = runner.run_all(RunMode::Incremental).await;

        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].flow, FlowType::Checkin);
        assert_eq!(reports[1].flow, FlowType::Crisis);
        assert_eq!(store.count(FlowType::Checkin).await, 2);
        assert_eq!(store.count(FlowType::Crisis).await, 3);

        let calls = provider.get_calls();
        assert_eq!(calls[0].temperature, Some(0.7));
        assert_eq!(calls[2].temperature, Some(0.3));
    }

    #[tokio::test]
    async fn smoke_resets_and_runs_first_scenario() {
        let store = Arc::new(InMemoryTranscriptStore::new());
        store
            .replace_all(
                FlowType::Checkin,
                &[Conversation::opened_by("x"), Conversation::opened_by("y")],
            )
            .await
            .unwrap();
        let provider = closing_provider();
        let runner = runner(&provider, catalog(3, 0), store.clone());

        let report = runner.run_smoke(FlowType::Checkin).await;

        assert_eq!(report.processed, 1);
        assert_eq!(report.stored, 1);
        let stored = store.load(FlowType::Checkin).await.unwrap();
        assert_eq!(stored[0].first(), Some(&Turn::user("hola amelia 0")));
    }

    #[tokio::test]
    async fn status_reports_remaining_per_flow() {
        let store = Arc::new(InMemoryTranscriptStore::new());
        store
            .append(FlowType::Crisis, &Conversation::opened_by("uno"))
            .await
            .unwrap();
        let provider = closing_provider();
        let runner = runner(&provider, catalog(4, 4), store);

        let status = runner.status().await;

        assert_eq!(status[0], FlowStatus { flow: FlowType::Checkin, stored: 0, catalog_size: 4 });
        assert_eq!(status[1].remaining(), 3);
    }

    #[test]
    fn fallback_conversation_has_two_turns() {
        let conversation = fallback_conversation(FlowType::Checkin, "hola");
        assert_eq!(
            conversation.turns(),
            &[Turn::user("hola"), Turn::agent("entiendo. gracias por compartir.")]
        );
    }

    #[tokio::test]
    async fn append_failure_aborts_only_that_flow() {
        let store = Arc::new(FailingWritesStore::new(FlowType::Checkin));
        let provider = closing_provider();
        let runner = runner(&provider, catalog(3, 2), store.clone());

        let reports = runner.run_all(RunMode::Incremental).await;

        assert!(reports[0].is_aborted());
        assert!(reports[0]
            .aborted
            .as_deref()
            .unwrap()
            .starts_with("persistence failed"));
        assert_eq!(reports[0].processed, 0);
        assert_eq!(reports[0].stored, 0);

        assert!(!reports[1].is_aborted());
        assert_eq!(reports[1].processed, 2);
        assert_eq!(store.count(FlowType::Crisis).await, 2);
    }

    #[tokio::test]
    async fn batch_replace_failure_is_reported() {
        let store = Arc::new(FailingWritesStore::new(FlowType::Crisis));
        let provider = closing_provider();
        let runner = runner(&provider, catalog(1, 2), store.clone());

        let reports = runner.run_all(RunMode::Batch).await;

        assert!(!reports[0].is_aborted());
        assert_eq!(reports[0].stored, 1);
        assert!(reports[1].is_aborted());
        assert_eq!(reports[1].processed, 2);
        assert_eq!(reports[1].stored, 0);
    }

    #[tokio::test]
    async fn smoke_reset_failure_is_reported() {
        let store = Arc::new(FailingWritesStore::new(FlowType::Checkin));
        let provider = closing_provider();
        let runner = runner(&provider, catalog(2, 0), store);

        let report = runner.run_smoke(FlowType::Checkin).await;

        assert!(report.is_aborted());
        assert_eq!(provider.call_count(), 0);
    }
}
