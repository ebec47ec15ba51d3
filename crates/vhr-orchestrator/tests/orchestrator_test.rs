//! Orchestrator scenarios against an in-process backend double.
//!
//! Time is paused, so poll intervals and submission backoff are observed
//! on tokio's virtual clock.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time::Instant;
use vhr_client::{ApiError, ReportBackend};
use vhr_core::{JobId, JobStatusReport, OverallCondition, RawReportPayload, TaskStatus, Vin};
use vhr_orchestrator::{
    ErrorCode, GenerationOutcome, GenerationStatus, OrchestratorConfig, ReportOrchestrator,
};

const VIN: &str = "1HGBH41JXMN109186";

type Scripted<T> = Mutex<VecDeque<Result<T, ApiError>>>;

/// Backend double that replays scripted responses and records call times.
#[derive(Default)]
struct MockBackend {
    submits: Scripted<JobId>,
    statuses: Scripted<JobStatusReport>,
    submit_times: Mutex<Vec<Instant>>,
    status_queries: AtomicU32,
}

impl MockBackend {
    fn submit(self, result: Result<&str, ApiError>) -> Self {
        self.submits
            .lock()
            .unwrap()
            .push_back(result.map(|id| JobId::new(id).unwrap()));
        self
    }

    fn status(self, report: JobStatusReport) -> Self {
        self.statuses.lock().unwrap().push_back(Ok(report));
        self
    }

    fn status_error(self, err: ApiError) -> Self {
        self.statuses.lock().unwrap().push_back(Err(err));
        self
    }

    fn submit_calls(&self) -> usize {
        self.submit_times.lock().unwrap().len()
    }
}

#[async_trait::async_trait]
impl ReportBackend for MockBackend {
    async fn submit_job(&self, _vin: &Vin) -> Result<JobId, ApiError> {
        self.submit_times.lock().unwrap().push(Instant::now());
        let next = self.submits.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(JobId::new("abc123").unwrap()))
    }

    async fn get_job_status(&self, _job_id: &JobId) -> Result<JobStatusReport, ApiError> {
        self.status_queries.fetch_add(1, Ordering::SeqCst);
        let next = self.statuses.lock().unwrap().pop_front();
        next.unwrap_or_else(|| Ok(pending()))
    }
}

fn pending() -> JobStatusReport {
    JobStatusReport {
        status: TaskStatus::Pending,
        message: Some("Task is pending".into()),
        payload: None,
    }
}

fn success(condition: &str) -> JobStatusReport {
    JobStatusReport {
        status: TaskStatus::Success,
        message: Some("Task completed successfully".into()),
        payload: Some(RawReportPayload {
            vin: Some(VIN.into()),
            report_data: serde_json::json!({
                "vehicle_identification": { "make": "Honda", "model": "Accord", "year": 2021 },
                "overall_assessment": { "condition": condition, "confidence": 0.9 }
            }),
            generated_at: Some("2026-03-01T10:15:00Z".into()),
            providers_used: vec!["Carfax".into()],
            confidence_score: Some(9.0),
        }),
    }
}

fn connection_refused() -> ApiError {
    ApiError::Network {
        endpoint: "POST /api/v1/reports/generate".into(),
        source: Box::new(std::io::Error::from(std::io::ErrorKind::ConnectionRefused)),
    }
}

/// Callback invocation counters.
#[derive(Default)]
struct Calls {
    success: AtomicU32,
    error: AtomicU32,
    last_error: Mutex<Option<String>>,
}

fn orchestrator(
    backend: MockBackend,
    config: OrchestratorConfig,
) -> (ReportOrchestrator<Arc<MockBackend>>, Arc<MockBackend>, Arc<Calls>) {
    let backend = Arc::new(backend);
    let orch = ReportOrchestrator::new(Arc::clone(&backend), config);
    let calls = Arc::new(Calls::default());

    let c = Arc::clone(&calls);
    orch.on_success(move |_| {
        c.success.fetch_add(1, Ordering::SeqCst);
    });
    let c = Arc::clone(&calls);
    orch.on_error(move |msg| {
        c.error.fetch_add(1, Ordering::SeqCst);
        *c.last_error.lock().unwrap() = Some(msg.to_string());
    });
    (orch, backend, calls)
}

// -- End to end ---------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn pending_then_success_completes_with_report() {
    let backend = MockBackend::default()
        .submit(Ok("abc123"))
        .status(pending())
        .status(success("good"));
    let (orch, backend, calls) = orchestrator(backend, OrchestratorConfig::default());

    let outcome = orch.generate(VIN).await;

    let GenerationOutcome::Completed(report) = outcome else {
        panic!("expected completion, got {outcome:?}");
    };
    assert_eq!(report.executive_summary.overall_condition, OverallCondition::Good);

    let state = orch.state();
    assert_eq!(state.status, GenerationStatus::Completed);
    assert_eq!(state.progress, 100);
    assert_eq!(state.job_id.unwrap().as_str(), "abc123");
    assert!(state.error.is_none());
    assert!(!orch.is_loading());

    assert_eq!(backend.status_queries.load(Ordering::SeqCst), 2);
    assert_eq!(calls.success.load(Ordering::SeqCst), 1);
    assert_eq!(calls.error.load(Ordering::SeqCst), 0);
    assert_eq!(orch.report().unwrap().vin.as_str(), VIN);
}

#[tokio::test(start_paused = true)]
async fn lowercase_vin_with_separators_is_normalized() {
    let (orch, _backend, _calls) =
        orchestrator(MockBackend::default().status(success("fair")), OrchestratorConfig::default());
    let outcome = orch.generate("1hgbh41jxmn-109186").await;
    assert!(matches!(outcome, GenerationOutcome::Completed(_)), "got {outcome:?}");
}

// -- Validation ---------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn invalid_vin_fails_without_network() {
    let (orch, backend, calls) = orchestrator(MockBackend::default(), OrchestratorConfig::default());

    let outcome = orch.generate("TOO-SHORT").await;

    assert!(matches!(outcome, GenerationOutcome::Failed(_)));
    let state = orch.state();
    assert_eq!(state.status, GenerationStatus::Error);
    assert_eq!(state.progress, 0);
    assert_eq!(state.error_code, Some(ErrorCode::ValidationError));
    assert_eq!(state.error.as_deref(), Some("VIN must be exactly 17 characters"));
    assert_eq!(backend.submit_calls(), 0);
    assert_eq!(calls.error.load(Ordering::SeqCst), 1);
    assert_eq!(
        calls.last_error.lock().unwrap().as_deref(),
        Some("VIN must be exactly 17 characters")
    );
}

#[tokio::test(start_paused = true)]
async fn empty_vin_is_required() {
    let (orch, _backend, _calls) = orchestrator(MockBackend::default(), OrchestratorConfig::default());
    orch.generate("   ").await;
    assert_eq!(orch.error().as_deref(), Some("VIN is required"));
    assert!(orch.has_error());
}

// -- Submission retry ---------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn submission_retries_connectivity_with_growing_delay() {
    let backend = MockBackend::default()
        .submit(Err(connection_refused()))
        .submit(Err(connection_refused()))
        .submit(Ok("abc123"));
    let (orch, backend, _calls) = orchestrator(backend, OrchestratorConfig::default());

    let handle = orch.spawn_generate(VIN);
    // Backoff is 1 s then 2 s; the first poll follows immediately.
    tokio::time::sleep(Duration::from_millis(3500)).await;

    assert_eq!(orch.state().status, GenerationStatus::Polling);
    assert_eq!(backend.submit_calls(), 3);

    let times = backend.submit_times.lock().unwrap().clone();
    let first_gap = times[1] - times[0];
    let second_gap = times[2] - times[1];
    assert!(first_gap >= Duration::from_secs(1));
    assert!(second_gap > first_gap, "{first_gap:?} then {second_gap:?}");

    orch.cancel();
    assert_eq!(handle.await.unwrap(), GenerationOutcome::Cancelled);
}

#[tokio::test(start_paused = true)]
async fn client_errors_are_not_retried() {
    let backend = MockBackend::default().submit(Err(ApiError::Http {
        endpoint: "POST /api/v1/reports/generate".into(),
        status: 422,
        code: Some("VALIDATION_ERROR".into()),
        message: "VIN rejected by provider".into(),
    }));
    let (orch, backend, calls) = orchestrator(backend, OrchestratorConfig::default());

    orch.generate(VIN).await;

    assert_eq!(backend.submit_calls(), 1);
    let state = orch.state();
    assert_eq!(state.error_code, Some(ErrorCode::HttpError));
    assert_eq!(state.error.as_deref(), Some("VIN rejected by provider"));
    assert_eq!(calls.error.load(Ordering::SeqCst), 1);
}

#[tokio::test(start_paused = true)]
async fn exhausted_retries_surface_network_error() {
    let backend = MockBackend::default()
        .submit(Err(connection_refused()))
        .submit(Err(connection_refused()))
        .submit(Err(connection_refused()));
    let (orch, backend, _calls) = orchestrator(backend, OrchestratorConfig::default());

    orch.generate(VIN).await;

    assert_eq!(backend.submit_calls(), 3);
    assert_eq!(orch.state().error_code, Some(ErrorCode::NetworkError));
    assert_eq!(
        orch.error().as_deref(),
        Some("Unable to connect to the server. Please check your internet connection.")
    );
}

// -- Polling failures ---------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn attempt_ceiling_surfaces_polling_timeout() {
    let mut config = OrchestratorConfig::default();
    config.poll.max_attempts = 3;
    let (orch, backend, calls) = orchestrator(MockBackend::default(), config);

    orch.generate(VIN).await;

    assert_eq!(backend.status_queries.load(Ordering::SeqCst), 3);
    let state = orch.state();
    assert_eq!(state.status, GenerationStatus::Error);
    assert_eq!(state.progress, 0);
    assert_eq!(state.error_code, Some(ErrorCode::PollingTimeout));
    assert_eq!(calls.error.load(Ordering::SeqCst), 1);
    assert_eq!(calls.success.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn expired_task_is_reported_distinctly() {
    let backend = MockBackend::default()
        .status(pending())
        .status_error(ApiError::Http {
            endpoint: "GET /api/v1/reports/result/abc123".into(),
            status: 404,
            code: None,
            message: "Task ID abc123 not found".into(),
        });
    let (orch, _backend, _calls) = orchestrator(backend, OrchestratorConfig::default());

    orch.generate(VIN).await;

    assert_eq!(orch.state().error_code, Some(ErrorCode::TaskNotFound));
    assert!(orch.error().unwrap().contains("may have expired"));
}

#[tokio::test(start_paused = true)]
async fn upstream_generation_error_is_surfaced() {
    let failed = JobStatusReport {
        status: TaskStatus::Success,
        message: None,
        payload: Some(RawReportPayload {
            report_data: serde_json::json!({ "error": "AI provider unavailable" }),
            ..RawReportPayload::default()
        }),
    };
    let (orch, _backend, _calls) =
        orchestrator(MockBackend::default().status(failed), OrchestratorConfig::default());

    orch.generate(VIN).await;

    assert_eq!(orch.state().error_code, Some(ErrorCode::UpstreamGenerationFailed));
    assert_eq!(
        orch.error().as_deref(),
        Some("Report generation failed: AI provider unavailable")
    );
}

// -- Cancellation -------------------------------------------------------------

#[tokio::test(start_paused = true)]
async fn immediate_cancel_is_silent() {
    let backend = MockBackend::default().status(success("good"));
    let (orch, backend, calls) = orchestrator(backend, OrchestratorConfig::default());

    let handle = orch.spawn_generate(VIN);
    orch.cancel();

    assert_eq!(handle.await.unwrap(), GenerationOutcome::Cancelled);
    let state = orch.state();
    assert_eq!(state.status, GenerationStatus::Idle);
    assert_eq!(state.progress, 0);
    assert_eq!(calls.success.load(Ordering::SeqCst), 0);
    assert_eq!(calls.error.load(Ordering::SeqCst), 0);
    assert_eq!(backend.status_queries.load(Ordering::SeqCst), 0);
    assert!(orch.report().is_none());
}

#[tokio::test(start_paused = true)]
async fn cancel_while_polling_stops_queries() {
    let (orch, backend, calls) = orchestrator(MockBackend::default(), OrchestratorConfig::default());

    let handle = orch.spawn_generate(VIN);
    tokio::time::sleep(Duration::from_millis(4500)).await;
    assert_eq!(orch.state().status, GenerationStatus::Polling);
    orch.cancel();
    assert_eq!(handle.await.unwrap(), GenerationOutcome::Cancelled);

    let queries = backend.status_queries.load(Ordering::SeqCst);
    tokio::time::sleep(Duration::from_secs(30)).await;
    assert_eq!(backend.status_queries.load(Ordering::SeqCst), queries);
    assert_eq!(orch.state().status, GenerationStatus::Idle);
    assert_eq!(calls.error.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn progress_snapshots_are_monotone_until_completion() {
    let backend = MockBackend::default()
        .status(pending())
        .status(pending())
        .status(success("excellent"));
    let (orch, _backend, _calls) = orchestrator(backend, OrchestratorConfig::default());
    let seen = Arc::new(Mutex::new(Vec::new()));
    let s = Arc::clone(&seen);
    orch.on_progress(move |state| s.lock().unwrap().push((state.status, state.progress)));

    orch.generate(VIN).await;

    let seen = seen.lock().unwrap().clone();
    assert_eq!(seen.first().unwrap().0, GenerationStatus::Starting);
    assert_eq!(*seen.last().unwrap(), (GenerationStatus::Completed, 100));
    assert!(seen.windows(2).all(|w| w[0].1 <= w[1].1), "{seen:?}");
}
