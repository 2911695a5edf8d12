//! amelia-gen CLI
//!
//! Generates the check-in and crisis-log conversation corpora.
//!
//! Usage:
//!   amelia-gen                      # incremental, resumable run of both flows
//!   amelia-gen batch                # regenerate both collections from scratch
//!   amelia-gen smoke                # reset and generate one conversation per flow
//!   amelia-gen status               # stored counts against catalog size
//!   amelia-gen ping                 # one completion round trip
//!   amelia-gen --flow crisis        # restrict any run to one flow
//!
//! Configuration comes from `AMELIA_GEN__*` variables (or `.env`); the legacy
//! `OPENROUTER_API_KEY` is accepted as well.

use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use secrecy::ExposeSecret;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use amelia_gen::adapters::ai::{OpenRouterConfig, OpenRouterProvider};
use amelia_gen::adapters::storage::JsonTranscriptStore;
use amelia_gen::application::{
    BatchRunner, ConversationOrchestrator, FlowReport, PromptTemplate, RunMode,
};
use amelia_gen::config::{AiConfig, AppConfig};
use amelia_gen::domain::conversation::{FlowType, ScenarioCatalog};
use amelia_gen::ports::{AIProvider, CompletionRequest, Message, TranscriptStore};

/// Synthetic conversation generator for the Amelia agent
#[derive(Parser, Debug)]
#[command(name = "amelia-gen", version, about)]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Only process this flow (checkin or crisis)
    #[arg(long, global = true)]
    flow: Option<FlowType>,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    log_json: bool,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Resume from the stored count and append after every scenario (default)
    Incremental,
    /// Run the whole catalog and overwrite each collection once at the end
    Batch,
    /// Empty the collections and generate the first scenario of each flow
    Smoke,
    /// Send one request to the completion provider
    Ping,
    /// Show stored conversations against catalog size
    Status,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    let args = Args::parse();
    init_tracing(args.log_json);

    let config = AppConfig::from_env().context("failed to load configuration")?;
    config
        .storage
        .validate()
        .context("invalid storage configuration")?;

    let flows: Vec<FlowType> = match args.flow {
        Some(flow) => vec![flow],
        None => FlowType::ALL.to_vec(),
    };

    let store: Arc<dyn TranscriptStore> = Arc::new(JsonTranscriptStore::new(
        config.storage.checkin_path.clone(),
        config.storage.crisis_path.clone(),
    ));
    let catalog = Arc::new(load_catalog(&config).await?);

    match args.command.unwrap_or(Command::Incremental) {
        Command::Status => {
            print_status(store.as_ref(), &catalog, &flows).await;
            Ok(())
        }
        Command::Ping => {
            let provider = build_provider(&config.ai)?;
            ping(provider.as_ref()).await
        }
        command => {
            let provider = build_provider(&config.ai)?;
            let prompt = PromptTemplate::load(&config.prompt.template_path)
                .await
                .context("agent prompt template is required")?;

            let mut orchestrator = ConversationOrchestrator::new(provider, Arc::new(prompt))
                .with_pacing(config.generation.pacing());
            if let Some(seed) = config.generation.seed {
                orchestrator = orchestrator.with_seed(seed);
            }
            let runner = BatchRunner::new(orchestrator, catalog.clone(), store.clone());

            let mut reports = Vec::with_capacity(flows.len());
            if command == Command::Smoke {
                for &flow in &flows {
                    let report = runner.run_smoke(flow).await;
                    log_report(&report);
                    reports.push(report);
                }
                return ensure_complete(&reports);
            }

            let mode = if command == Command::Batch {
                RunMode::Batch
            } else {
                RunMode::Incremental
            };

            print_status(store.as_ref(), &catalog, &flows).await;
            for &flow in &flows {
                let report = runner.run_flow(flow, mode).await;
                log_report(&report);
                reports.push(report);
            }
            print_status(store.as_ref(), &catalog, &flows).await;

            ensure_complete(&reports)
        }
    }
}

/// Fails the process when any flow stopped early.
fn ensure_complete(reports: &[FlowReport]) -> Result<()> {
    let aborted: Vec<String> = reports
        .iter()
        .filter_map(|r| r.aborted.as_ref().map(|reason| format!("{} ({})", r.flow, reason)))
        .collect();
    if !aborted.is_empty() {
        bail!("run aborted for: {}", aborted.join("; "));
    }
    Ok(())
}

fn init_tracing(json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let builder = tracing_subscriber::fmt().with_env_filter(filter);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

async fn load_catalog(config: &AppConfig) -> Result<ScenarioCatalog> {
    match &config.catalog.path {
        Some(path) => ScenarioCatalog::load(path)
            .await
            .with_context(|| format!("failed to load scenario catalog {}", path.display())),
        None => ScenarioCatalog::builtin().context("built-in scenario catalog is malformed"),
    }
}

fn build_provider(ai: &AiConfig) -> Result<Arc<dyn AIProvider>> {
    ai.validate().context("invalid completion provider configuration")?;
    let api_key = ai
        .api_key
        .as_ref()
        .map(|k| k.expose_secret().clone())
        .unwrap_or_default();

    let provider = OpenRouterProvider::new(
        OpenRouterConfig::new(api_key)
            .with_model(ai.model.clone())
            .with_base_url(ai.base_url.clone())
            .with_http_referer(ai.http_referer.clone())
            .with_app_title(ai.app_title.clone())
            .with_timeout(ai.timeout())
            .with_max_retries(ai.max_retries),
    )
    .context("failed to build OpenRouter client")?;

    Ok(Arc::new(provider))
}

async fn ping(provider: &dyn AIProvider) -> Result<()> {
    let info = provider.provider_info();
    info!(provider = %info.name, model = %info.model, "pinging completion provider");

    let response = provider
        .complete(
            CompletionRequest::new()
                .with_messages(vec![Message::user("ping")])
                .with_max_tokens(16),
        )
        .await
        .context("completion provider did not answer")?;

    println!("{} ({}): {}", info.name, response.model, response.content.trim());
    Ok(())
}

async fn print_status(store: &dyn TranscriptStore, catalog: &ScenarioCatalog, flows: &[FlowType]) {
    for &flow in flows {
        let stored = store.count(flow).await;
        let total = catalog.len(flow);
        println!("{:<8} {:>3}/{:<3} stored", flow.as_str(), stored, total);
    }
}

fn log_report(report: &FlowReport) {
    match &report.aborted {
        Some(reason) => warn!(
            flow = %report.flow,
            processed = report.processed,
            stored = report.stored,
            reason = %reason,
            "flow aborted"
        ),
        None => info!(
            flow = %report.flow,
            mode = %report.mode,
            processed = report.processed,
            concluded = report.concluded,
            truncated = report.truncated,
            fallbacks = report.fallbacks,
            stored = report.stored,
            "flow complete"
        ),
    }
}
