//! # Generate Subcommand
//!
//! Runs a full report generation: validate, submit, poll, transform.
//! Progress lines go to stderr; the finished report goes to stdout as JSON
//! so it can be piped.

use std::sync::Arc;
use std::time::Duration;

use clap::Args;
use parking_lot::Mutex;
use vhr_client::{ReportApiClient, ReportBackend};
use vhr_orchestrator::{
    GenerationOutcome, OrchestratorConfig, ReportGenerationState, ReportOrchestrator,
};

use crate::{ApiArgs, EXIT_CANCELLED};

/// Arguments for `vhr generate`.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// VIN to generate a report for.
    pub vin: String,

    #[command(flatten)]
    pub api: ApiArgs,

    /// Delay between status queries, in milliseconds.
    #[arg(long)]
    pub poll_interval_ms: Option<u64>,

    /// Maximum number of status queries.
    #[arg(long)]
    pub max_attempts: Option<u32>,

    /// Overall polling budget, in milliseconds.
    #[arg(long)]
    pub poll_timeout_ms: Option<u64>,

    /// Submission retries after the first attempt.
    #[arg(long)]
    pub retries: Option<u32>,

    /// Advance progress smoothly between status queries.
    #[arg(long)]
    pub interpolate: bool,

    /// Print the report as compact single-line JSON.
    #[arg(long)]
    pub compact: bool,

    /// Suppress progress output.
    #[arg(long, short)]
    pub quiet: bool,
}

impl GenerateArgs {
    /// Environment configuration with command-line overrides applied.
    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        let mut config = OrchestratorConfig::from_env();
        if let Some(ms) = self.poll_interval_ms {
            config.poll.interval = Duration::from_millis(ms);
        }
        if let Some(n) = self.max_attempts {
            config.poll.max_attempts = n.max(1);
        }
        if let Some(ms) = self.poll_timeout_ms {
            config.poll.timeout = Duration::from_millis(ms);
        }
        if let Some(n) = self.retries {
            config.retry.max_retries = n;
        }
        config.interpolate_progress |= self.interpolate;
        config
    }
}

/// Run the generation against the configured backend.
pub async fn run_generate(args: &GenerateArgs) -> anyhow::Result<u8> {
    let client = ReportApiClient::new(args.api.client_config()?)?;
    tracing::debug!(base_url = %client.base_url(), "using report backend");
    generate_with(client, args).await
}

/// Run the generation against `backend`. Exit codes: 0 completed,
/// 1 failed, [`EXIT_CANCELLED`] on Ctrl-C.
pub async fn generate_with<B: ReportBackend + 'static>(
    backend: B,
    args: &GenerateArgs,
) -> anyhow::Result<u8> {
    let orchestrator = ReportOrchestrator::new(backend, args.orchestrator_config());

    if !args.quiet {
        let last_line = Mutex::new(String::new());
        orchestrator.on_progress(move |state| {
            let line = progress_line(state);
            let mut last = last_line.lock();
            if *last != line {
                eprintln!("{line}");
                *last = line;
            }
        });
    }

    let failure = Arc::new(Mutex::new(None::<String>));
    let f = Arc::clone(&failure);
    orchestrator.on_error(move |message| *f.lock() = Some(message.to_string()));

    let mut handle = orchestrator.spawn_generate(args.vin.clone());
    let outcome = tokio::select! {
        joined = &mut handle => joined?,
        _ = tokio::signal::ctrl_c() => {
            tracing::warn!("interrupted; cancelling report generation");
            orchestrator.cancel();
            handle.await?
        }
    };

    match outcome {
        GenerationOutcome::Completed(report) => {
            let json = if args.compact {
                serde_json::to_string(&report)?
            } else {
                serde_json::to_string_pretty(&report)?
            };
            println!("{json}");
            Ok(0)
        }
        GenerationOutcome::Failed(err) => {
            let message = failure.lock().take().unwrap_or_else(|| err.user_message());
            eprintln!("error [{}]: {message}", err.code());
            tracing::debug!(error = %err, "generation failed");
            Ok(1)
        }
        GenerationOutcome::Cancelled => {
            eprintln!("cancelled");
            Ok(EXIT_CANCELLED)
        }
    }
}

fn progress_line(state: &ReportGenerationState) -> String {
    let step = state.current_step.as_deref().unwrap_or(state.status.as_str());
    match state.estimated_seconds_remaining {
        Some(eta) if state.is_loading() => format!("[{:>3}%] {step} (~{eta}s left)", state.progress),
        _ => format!("[{:>3}%] {step}", state.progress),
    }
}
