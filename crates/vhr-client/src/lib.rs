//! # vhr-client -- Typed Rust client for the report backend
//!
//! Provides typed access to the two endpoints the report orchestration
//! depends on: job submission and task-status polling.
//!
//! ## Architecture
//!
//! [`ReportBackend`] is the seam between orchestration and transport. The
//! production implementation is [`ReportApiClient`] (reqwest); tests supply
//! in-process doubles. Every failure is an [`ApiError`], whose taxonomy the
//! poller relies on: connectivity vs HTTP status, backend error code, and
//! task-not-found detection.

pub mod config;
pub mod error;
pub mod reports;
pub mod retry;

pub use config::{ConfigError, ReportApiConfig};
pub use error::{ApiError, BoxError};
pub use reports::{ReportApiClient, ResponseBody};
pub use retry::{retry_with_backoff, RetryPolicy};

use vhr_core::{JobId, JobStatusReport, Vin};

/// The two backend operations report orchestration needs.
///
/// Implementations must be `Send + Sync` so they can be shared behind an
/// `Arc` across async tasks.
#[async_trait::async_trait]
pub trait ReportBackend: Send + Sync {
    /// Submit a report-generation job and return its identifier.
    async fn submit_job(&self, vin: &Vin) -> Result<JobId, ApiError>;

    /// Observe the current status of a job.
    async fn get_job_status(&self, job_id: &JobId) -> Result<JobStatusReport, ApiError>;
}

#[async_trait::async_trait]
impl<T: ReportBackend + ?Sized> ReportBackend for std::sync::Arc<T> {
    async fn submit_job(&self, vin: &Vin) -> Result<JobId, ApiError> {
        (**self).submit_job(vin).await
    }

    async fn get_job_status(&self, job_id: &JobId) -> Result<JobStatusReport, ApiError> {
        (**self).get_job_status(job_id).await
    }
}
