//! Task poller: drives one backend job to a terminal outcome.
//!
//! Queries are strictly sequential: the next query is issued only after
//! the previous response (or its timeout) has been observed and the poll
//! interval has elapsed. Two timeouts compose:
//!
//! - `request_timeout` wraps each status query and surfaces as
//!   [`ReportError::Timeout`];
//! - `timeout` races the whole loop and surfaces as
//!   [`ReportError::PollingTimeout`].
//!
//! Cancellation drops the loop at whichever await it is parked on, so no
//! further query is issued and no further progress is reported.

use std::sync::atomic::{AtomicU32, Ordering};
use std::time::Duration;

use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use vhr_client::{ApiError, ReportBackend};
use vhr_core::{JobId, RawReportPayload, TaskDisposition};

use crate::config::PollConfig;
use crate::error::ReportError;
use crate::progress;

/// Progress observed before each status query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollProgress {
    /// 1-based attempt number.
    pub attempt: u32,
    pub max_attempts: u32,
    pub progress: u8,
    pub step: String,
    pub estimated_seconds_remaining: u64,
}

/// Non-error result of a polling session.
#[derive(Debug, Clone, PartialEq)]
pub enum PollOutcome {
    Completed(RawReportPayload),
    Cancelled,
}

/// Poll `job_id` until it reaches a terminal status, the budget runs out,
/// or `cancel` fires.
pub async fn poll_job<B, F>(
    backend: &B,
    job_id: &JobId,
    config: &PollConfig,
    cancel: &CancellationToken,
    mut on_progress: F,
) -> Result<PollOutcome, ReportError>
where
    B: ReportBackend + ?Sized,
    F: FnMut(PollProgress) + Send,
{
    let started = Instant::now();
    let attempts = AtomicU32::new(0);
    let polling = poll_loop(backend, job_id, config, started, &attempts, &mut on_progress);

    tokio::select! {
        biased;
        _ = cancel.cancelled() => {
            tracing::debug!(%job_id, "polling cancelled");
            Ok(PollOutcome::Cancelled)
        }
        result = tokio::time::timeout(config.timeout, polling) => match result {
            Ok(outcome) => outcome.map(PollOutcome::Completed),
            Err(_) => {
                let attempts = attempts.load(Ordering::Relaxed);
                tracing::warn!(%job_id, attempts, timeout = ?config.timeout, "polling session timed out");
                Err(ReportError::PollingTimeout {
                    job_id: job_id.clone(),
                    attempts,
                    elapsed_ms: millis(started.elapsed()),
                })
            }
        },
    }
}

async fn poll_loop<B, F>(
    backend: &B,
    job_id: &JobId,
    config: &PollConfig,
    started: Instant,
    attempts: &AtomicU32,
    on_progress: &mut F,
) -> Result<RawReportPayload, ReportError>
where
    B: ReportBackend + ?Sized,
    F: FnMut(PollProgress) + Send,
{
    let max_attempts = config.max_attempts.max(1);
    let mut attempt = 0;

    loop {
        attempt += 1;
        attempts.store(attempt, Ordering::Relaxed);
        on_progress(PollProgress {
            attempt,
            max_attempts,
            progress: progress::polling_progress(attempt, max_attempts),
            step: progress::polling_step(attempt, max_attempts),
            estimated_seconds_remaining: progress::estimated_seconds_remaining(
                attempt,
                config,
                started.elapsed(),
            ),
        });

        let report = match tokio::time::timeout(
            config.request_timeout,
            backend.get_job_status(job_id),
        )
        .await
        {
            Ok(Ok(report)) => report,
            Ok(Err(e)) => return Err(ReportError::from_poll(job_id, e)),
            Err(_) => {
                return Err(ReportError::from(ApiError::Timeout {
                    endpoint: format!("GET /api/v1/reports/result/{job_id}"),
                    timeout_ms: millis(config.request_timeout),
                }))
            }
        };

        tracing::debug!(%job_id, attempt, status = %report.status, "poll attempt");

        match report.status.disposition() {
            TaskDisposition::Success => {
                return report.payload.ok_or_else(|| ReportError::NoResult {
                    job_id: job_id.clone(),
                });
            }
            TaskDisposition::Failure => {
                return Err(ReportError::TaskFailed {
                    job_id: job_id.clone(),
                    message: report.message,
                });
            }
            TaskDisposition::Unknown => {
                return Err(ReportError::UnknownStatus {
                    job_id: job_id.clone(),
                    status: report.status.as_str().to_string(),
                });
            }
            TaskDisposition::Continue if attempt >= max_attempts => {
                tracing::warn!(%job_id, attempt, "maximum polling attempts reached");
                return Err(ReportError::PollingTimeout {
                    job_id: job_id.clone(),
                    attempts: attempt,
                    elapsed_ms: millis(started.elapsed()),
                });
            }
            TaskDisposition::Continue => tokio::time::sleep(config.interval).await,
        }
    }
}

fn millis(d: Duration) -> u64 {
    u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
}
