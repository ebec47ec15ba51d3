//! Report orchestration state machine.
//!
//! [`ReportOrchestrator`] is the only writer of [`ReportGenerationState`].
//! At most one attempt is in flight: starting a new one cancels the
//! previous attempt's token before anything else happens.
//!
//! Every mutation goes through [`Inner::update`], which takes the state
//! lock and checks that the calling attempt is still the current one and
//! has not been cancelled. Once `cancel()`, `reset()` or a newer
//! `generate()` has taken the lock, a superseded attempt can neither write
//! state nor fire callbacks. The lock is never held across an `.await`,
//! and callbacks run after it is released so they may read the
//! orchestrator.

use std::future::Future;
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use vhr_client::{retry_with_backoff, ApiError, ReportBackend};
use vhr_core::{validate_vin, JobId, Report, Vin};

use crate::config::OrchestratorConfig;
use crate::error::ReportError;
use crate::poller::{self, PollOutcome};
use crate::progress;
use crate::state::{GenerationStatus, ReportGenerationState};

type SuccessCallback = Arc<dyn Fn(&Report) + Send + Sync>;
type ErrorCallback = Arc<dyn Fn(&str) + Send + Sync>;
type ProgressCallback = Arc<dyn Fn(&ReportGenerationState) + Send + Sync>;

/// How a generation attempt ended.
#[derive(Debug, Clone, PartialEq)]
pub enum GenerationOutcome {
    Completed(Box<Report>),
    Failed(ReportError),
    /// Cancelled, reset, or superseded by a newer attempt.
    Cancelled,
}

struct Attempt {
    id: u64,
    token: CancellationToken,
}

#[derive(Default)]
struct Shared {
    state: ReportGenerationState,
    report: Option<Report>,
    current: Option<Attempt>,
    next_id: u64,
    on_success: Option<SuccessCallback>,
    on_error: Option<ErrorCallback>,
    on_progress: Option<ProgressCallback>,
}

impl Shared {
    /// Cancel the current attempt, if any, and return to `idle`.
    fn stop(&mut self) {
        if let Some(attempt) = self.current.take() {
            attempt.token.cancel();
            tracing::info!(attempt = attempt.id, "report generation cancelled");
        }
        self.state.transition(GenerationStatus::Idle);
        self.state = ReportGenerationState::default();
    }
}

/// Releases attempt `id` if its future is dropped while still current.
/// A no-op once the attempt has completed, failed or been superseded.
struct AttemptGuard<B> {
    inner: Arc<Inner<B>>,
    id: u64,
}

impl<B> Drop for AttemptGuard<B> {
    fn drop(&mut self) {
        let mut shared = self.inner.shared.lock();
        if shared.current.as_ref().is_some_and(|a| a.id == self.id) {
            tracing::debug!(attempt = self.id, "report generation dropped before finishing");
            shared.stop();
        }
    }
}

struct Inner<B> {
    backend: B,
    config: OrchestratorConfig,
    shared: Mutex<Shared>,
}

/// Drives VIN → job → poll → transform, publishing progress as it goes.
///
/// Cheap to clone; clones share state.
pub struct ReportOrchestrator<B> {
    inner: Arc<Inner<B>>,
}

impl<B> Clone for ReportOrchestrator<B> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<B: ReportBackend + 'static> ReportOrchestrator<B> {
    pub fn new(backend: B, config: OrchestratorConfig) -> Self {
        Self {
            inner: Arc::new(Inner {
                backend,
                config,
                shared: Mutex::new(Shared::default()),
            }),
        }
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.inner.config
    }

    /// Register the callback invoked with each completed report.
    pub fn on_success(&self, f: impl Fn(&Report) + Send + Sync + 'static) {
        self.inner.shared.lock().on_success = Some(Arc::new(f));
    }

    /// Register the callback invoked with the user-facing message of each
    /// failed attempt.
    pub fn on_error(&self, f: impl Fn(&str) + Send + Sync + 'static) {
        self.inner.shared.lock().on_error = Some(Arc::new(f));
    }

    /// Register a callback invoked with a snapshot after each state change
    /// made by an attempt.
    pub fn on_progress(&self, f: impl Fn(&ReportGenerationState) + Send + Sync + 'static) {
        self.inner.shared.lock().on_progress = Some(Arc::new(f));
    }

    // -- Read-only accessors ------------------------------------------------

    pub fn state(&self) -> ReportGenerationState {
        self.inner.shared.lock().state.clone()
    }

    /// The last completed report, kept across `cancel()` until `reset()`.
    pub fn report(&self) -> Option<Report> {
        self.inner.shared.lock().report.clone()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.shared.lock().state.is_loading()
    }

    pub fn has_error(&self) -> bool {
        self.inner.shared.lock().state.has_error()
    }

    pub fn error(&self) -> Option<String> {
        self.inner.shared.lock().state.error.clone()
    }

    // -- Operations ---------------------------------------------------------

    /// Start a generation attempt for `vin`.
    ///
    /// The previous attempt is cancelled and state moves to `validating`
    /// when this is called, not when the returned future is first polled.
    /// Dropping the future before it finishes behaves like `cancel()`.
    pub fn generate(
        &self,
        vin: impl Into<String>,
    ) -> impl Future<Output = GenerationOutcome> + Send + 'static {
        let vin = vin.into();
        let (id, token) = self.inner.begin();
        let inner = Arc::clone(&self.inner);
        let guard = AttemptGuard {
            inner: Arc::clone(&self.inner),
            id,
        };
        async move {
            let _guard = guard;
            inner.run(id, token, vin).await
        }
    }

    /// [`generate`](Self::generate) on a new tokio task.
    pub fn spawn_generate(&self, vin: impl Into<String>) -> JoinHandle<GenerationOutcome> {
        tokio::spawn(self.generate(vin))
    }

    /// Stop any in-flight attempt and return to `idle` with progress 0.
    /// No callback is invoked. The last completed report is kept.
    pub fn cancel(&self) {
        self.inner.shared.lock().stop();
    }

    /// As [`cancel`](Self::cancel), and also forget the stored report.
    pub fn reset(&self) {
        let mut shared = self.inner.shared.lock();
        shared.stop();
        shared.report = None;
    }
}

impl<B: ReportBackend + 'static> Inner<B> {
    /// Supersede the current attempt and enter `validating`.
    fn begin(&self) -> (u64, CancellationToken) {
        let mut shared = self.shared.lock();
        if let Some(previous) = shared.current.take() {
            previous.token.cancel();
            tracing::info!(attempt = previous.id, "superseding in-flight report generation");
        }
        shared.next_id += 1;
        let id = shared.next_id;
        let token = CancellationToken::new();
        shared.current = Some(Attempt {
            id,
            token: token.clone(),
        });

        let state = &mut shared.state;
        state.transition(GenerationStatus::Validating);
        state.progress = progress::VALIDATING;
        state.current_step = Some(progress::step_label(progress::VALIDATING).into());
        state.estimated_seconds_remaining = None;
        state.error = None;
        state.error_code = None;
        state.job_id = None;
        (id, token)
    }

    async fn run(self: Arc<Self>, id: u64, token: CancellationToken, raw_vin: String) -> GenerationOutcome {
        let vin = match validate_vin(&raw_vin) {
            Ok(vin) => vin,
            Err(e) => return self.fail(id, e.into()),
        };

        let updated = self.update(id, |s| {
            s.transition(GenerationStatus::Starting);
            s.progress = progress::STARTING;
            s.current_step = Some("Submitting report request".into());
        });
        if !updated {
            return GenerationOutcome::Cancelled;
        }

        let submitted_at = Instant::now();
        let job_id = tokio::select! {
            biased;
            _ = token.cancelled() => return GenerationOutcome::Cancelled,
            result = self.submit(&vin) => match result {
                Ok(job_id) => job_id,
                Err(e) => return self.fail(id, e.into()),
            },
        };
        tracing::info!(%vin, %job_id, "report job accepted");

        let updated = self.update(id, |s| {
            s.transition(GenerationStatus::Polling);
            s.progress = progress::POLLING_FLOOR;
            s.current_step = Some("Generating report (this may take a moment)".into());
            s.job_id = Some(job_id.clone());
        });
        if !updated {
            return GenerationOutcome::Cancelled;
        }

        // Stops with the attempt, whichever way it ends.
        let _ticker = self.config.interpolate_progress.then(|| {
            let ticker = token.child_token();
            tokio::spawn(Arc::clone(&self).interpolate(id, ticker.clone()));
            ticker.drop_guard()
        });

        let polled = poller::poll_job(&self.backend, &job_id, &self.config.poll, &token, |p| {
            self.update(id, |s| {
                s.progress = s.progress.max(p.progress);
                s.current_step = Some(p.step);
                s.estimated_seconds_remaining = Some(p.estimated_seconds_remaining);
            });
        })
        .await;

        match polled {
            Ok(PollOutcome::Completed(payload)) => match vhr_transform::transform(&payload, &vin) {
                Ok(mut report) => {
                    report.metadata.processing_time_ms =
                        Some(u64::try_from(submitted_at.elapsed().as_millis()).unwrap_or(u64::MAX));
                    self.complete(id, &job_id, report)
                }
                Err(e) => self.fail(id, e.into()),
            },
            Ok(PollOutcome::Cancelled) => GenerationOutcome::Cancelled,
            Err(e) => self.fail(id, e),
        }
    }

    /// Submit with backoff; each call is bounded by the request timeout.
    async fn submit(&self, vin: &Vin) -> Result<JobId, ApiError> {
        let timeout = self.config.poll.request_timeout;
        retry_with_backoff(&self.config.retry, "submit_job", || async move {
            match tokio::time::timeout(timeout, self.backend.submit_job(vin)).await {
                Ok(result) => result,
                Err(_) => Err(ApiError::Timeout {
                    endpoint: "POST /api/v1/reports/generate".into(),
                    timeout_ms: u64::try_from(timeout.as_millis()).unwrap_or(u64::MAX),
                }),
            }
        })
        .await
    }

    /// Cosmetic progress between real poll checkpoints.
    async fn interpolate(self: Arc<Self>, id: u64, token: CancellationToken) {
        let mut tick = tokio::time::interval(progress::INTERPOLATION_TICK);
        tick.tick().await;
        loop {
            tokio::select! {
                biased;
                _ = token.cancelled() => return,
                _ = tick.tick() => {}
            }
            let live = self.update(id, |s| {
                if s.status == GenerationStatus::Polling {
                    let before = progress::step_label(s.progress);
                    s.progress = s.progress.max(progress::interpolate(s.progress));
                    let after = progress::step_label(s.progress);
                    // Leave the poller's step in place until the band changes.
                    if after != before {
                        s.current_step = Some(after.into());
                    }
                }
            });
            if !live {
                return;
            }
        }
    }

    /// Apply `f` if attempt `id` is still current. Returns whether it was.
    fn update(&self, id: u64, f: impl FnOnce(&mut ReportGenerationState)) -> bool {
        let mut shared = self.shared.lock();
        if !Self::is_current(&shared, id) {
            return false;
        }
        f(&mut shared.state);
        let notify = shared.on_progress.clone().map(|cb| (cb, shared.state.clone()));
        drop(shared);

        if let Some((cb, snapshot)) = notify {
            cb(&snapshot);
        }
        true
    }

    fn complete(&self, id: u64, job_id: &JobId, report: Report) -> GenerationOutcome {
        let mut shared = self.shared.lock();
        if !Self::is_current(&shared, id) {
            return GenerationOutcome::Cancelled;
        }
        let state = &mut shared.state;
        state.transition(GenerationStatus::Completed);
        state.progress = progress::COMPLETED;
        state.current_step = Some("Report completed successfully".into());
        state.estimated_seconds_remaining = Some(0);
        state.error = None;
        state.error_code = None;
        shared.report = Some(report.clone());
        shared.current = None;
        let on_success = shared.on_success.clone();
        let on_progress = shared.on_progress.clone().map(|cb| (cb, shared.state.clone()));
        drop(shared);

        tracing::info!(
            vin = %report.vin,
            %job_id,
            processing_time_ms = ?report.metadata.processing_time_ms,
            "report generation completed"
        );
        if let Some((cb, snapshot)) = on_progress {
            cb(&snapshot);
        }
        if let Some(cb) = on_success {
            cb(&report);
        }
        GenerationOutcome::Completed(Box::new(report))
    }

    fn fail(&self, id: u64, err: ReportError) -> GenerationOutcome {
        let message = err.user_message();
        let mut shared = self.shared.lock();
        if !Self::is_current(&shared, id) {
            return GenerationOutcome::Cancelled;
        }
        let state = &mut shared.state;
        state.transition(GenerationStatus::Error);
        state.progress = 0;
        state.estimated_seconds_remaining = None;
        state.error = Some(message.clone());
        state.error_code = Some(err.code());
        shared.current = None;
        let on_error = shared.on_error.clone();
        let on_progress = shared.on_progress.clone().map(|cb| (cb, shared.state.clone()));
        drop(shared);

        tracing::error!(code = %err.code(), error = %err, "report generation failed");
        if let Some((cb, snapshot)) = on_progress {
            cb(&snapshot);
        }
        if let Some(cb) = on_error {
            cb(&message);
        }
        GenerationOutcome::Failed(err)
    }

    fn is_current(shared: &Shared, id: u64) -> bool {
        shared
            .current
            .as_ref()
            .is_some_and(|a| a.id == id && !a.token.is_cancelled())
    }
}
