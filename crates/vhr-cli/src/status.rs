//! # Status Subcommand
//!
//! Issues a single status query for an existing job and prints the
//! backend's answer as JSON.

use anyhow::Context;
use clap::Args;
use vhr_client::ReportApiClient;
use vhr_core::JobId;

use crate::ApiArgs;

/// Arguments for `vhr status`.
#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Job identifier returned by a previous submission.
    pub job_id: String,

    #[command(flatten)]
    pub api: ApiArgs,
}

/// Query the job once. Exits 0 whatever the job's status is; transport and
/// HTTP failures are errors.
pub async fn run_status(args: &StatusArgs) -> anyhow::Result<u8> {
    let job_id = JobId::new(args.job_id.clone()).context("invalid job id")?;
    let client = ReportApiClient::new(args.api.client_config()?)?;

    let report = client
        .get_job_status(&job_id)
        .await
        .with_context(|| format!("querying job {job_id}"))?;

    tracing::info!(%job_id, status = %report.status, terminal = report.status.is_terminal(), "job status");
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(0)
}
