//! Report generation error taxonomy and the user-facing message mapper.
//!
//! Every failure that can end a generation attempt is folded into
//! [`ReportError`] at the orchestrator boundary. Each variant has a stable
//! [`ErrorCode`] for presentation layers, and [`ReportError::user_message`]
//! is the single place that turns an error into copy for the user.

use vhr_client::ApiError;
use vhr_core::{JobId, VinError};
use vhr_transform::TransformError;

/// Stable machine-readable error codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    ValidationError,
    NetworkError,
    HttpError,
    Timeout,
    TaskFailed,
    TaskNotFound,
    NoResult,
    UnknownStatus,
    PollingTimeout,
    InvalidPayload,
    UpstreamGenerationFailed,
}

impl ErrorCode {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::ValidationError => "VALIDATION_ERROR",
            Self::NetworkError => "NETWORK_ERROR",
            Self::HttpError => "HTTP_ERROR",
            Self::Timeout => "TIMEOUT",
            Self::TaskFailed => "TASK_FAILED",
            Self::TaskNotFound => "TASK_NOT_FOUND",
            Self::NoResult => "NO_RESULT",
            Self::UnknownStatus => "UNKNOWN_STATUS",
            Self::PollingTimeout => "POLLING_TIMEOUT",
            Self::InvalidPayload => "INVALID_PAYLOAD",
            Self::UpstreamGenerationFailed => "UPSTREAM_GENERATION_FAILED",
        }
    }
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A terminal failure of one report generation attempt.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReportError {
    /// The VIN failed local validation. Never retried.
    #[error("invalid VIN: {0}")]
    Validation(#[from] VinError),

    /// No HTTP response was obtained.
    #[error("network error calling {endpoint}: {detail}")]
    Network { endpoint: String, detail: String },

    /// The backend answered with a non-2xx status.
    #[error("{endpoint} returned HTTP {status}: {message}")]
    Http {
        endpoint: String,
        status: u16,
        code: Option<String>,
        message: String,
    },

    /// A single backend call exceeded its timeout.
    #[error("request to {endpoint} timed out after {timeout_ms}ms")]
    Timeout { endpoint: String, timeout_ms: u64 },

    /// The backend reported the job as failed or revoked.
    #[error("task {job_id} failed: {}", .message.as_deref().unwrap_or("no message"))]
    TaskFailed {
        job_id: JobId,
        message: Option<String>,
    },

    /// The backend no longer recognizes the job id.
    #[error("task {job_id} not found")]
    TaskNotFound { job_id: JobId },

    /// The job succeeded but carried no payload.
    #[error("task {job_id} completed without a result")]
    NoResult { job_id: JobId },

    /// The backend reported a status outside the known vocabulary.
    #[error("task {job_id} reported unknown status {status:?}")]
    UnknownStatus { job_id: JobId, status: String },

    /// The attempt ceiling or the session timeout was reached first.
    #[error("polling task {job_id} timed out after {attempts} attempts ({elapsed_ms}ms)")]
    PollingTimeout {
        job_id: JobId,
        attempts: u32,
        elapsed_ms: u64,
    },

    /// The result could not be turned into a report.
    #[error(transparent)]
    Transform(#[from] TransformError),
}

impl From<ApiError> for ReportError {
    fn from(e: ApiError) -> Self {
        match e {
            ApiError::Network { endpoint, source } => Self::Network {
                endpoint,
                detail: source.to_string(),
            },
            ApiError::Timeout {
                endpoint,
                timeout_ms,
            } => Self::Timeout {
                endpoint,
                timeout_ms,
            },
            ApiError::Http {
                endpoint,
                status,
                code,
                message,
            } => Self::Http {
                endpoint,
                status,
                code,
                message,
            },
            ApiError::Deserialization { endpoint, source } => {
                Self::Transform(TransformError::InvalidPayload {
                    reason: format!("malformed response from {endpoint}: {source}"),
                })
            }
            ApiError::Config(e) => Self::Network {
                endpoint: "client configuration".into(),
                detail: e.to_string(),
            },
        }
    }
}

impl ReportError {
    /// Classify an error raised by a status query for `job_id`.
    pub fn from_poll(job_id: &JobId, e: ApiError) -> Self {
        if e.is_task_not_found() {
            Self::TaskNotFound {
                job_id: job_id.clone(),
            }
        } else {
            Self::from(e)
        }
    }

    pub fn code(&self) -> ErrorCode {
        match self {
            Self::Validation(_) => ErrorCode::ValidationError,
            Self::Network { .. } => ErrorCode::NetworkError,
            Self::Http { .. } => ErrorCode::HttpError,
            Self::Timeout { .. } => ErrorCode::Timeout,
            Self::TaskFailed { .. } => ErrorCode::TaskFailed,
            Self::TaskNotFound { .. } => ErrorCode::TaskNotFound,
            Self::NoResult { .. } => ErrorCode::NoResult,
            Self::UnknownStatus { .. } => ErrorCode::UnknownStatus,
            Self::PollingTimeout { .. } => ErrorCode::PollingTimeout,
            Self::Transform(TransformError::InvalidPayload { .. }) => ErrorCode::InvalidPayload,
            Self::Transform(TransformError::UpstreamGenerationFailed { .. }) => {
                ErrorCode::UpstreamGenerationFailed
            }
        }
    }

    /// Human-readable message for display. Always non-empty.
    pub fn user_message(&self) -> String {
        match self {
            Self::Validation(e) => e.to_string(),
            Self::Network { .. } => {
                "Unable to connect to the server. Please check your internet connection.".into()
            }
            Self::Http {
                status, message, ..
            } => {
                if message.trim().is_empty() {
                    format!("The server returned an error (HTTP {status}). Please try again.")
                } else {
                    message.clone()
                }
            }
            Self::Timeout { .. } => "Request timed out. Please try again.".into(),
            Self::TaskFailed { .. } => "Report generation failed. Please try again.".into(),
            Self::TaskNotFound { .. } => "Task not found. The report generation task may have \
                expired or been cleaned up. Please try generating the report again."
                .into(),
            Self::NoResult { .. } => {
                "Report generation finished without producing a report. Please try again.".into()
            }
            Self::UnknownStatus { status, .. } => format!("Unknown task status: {status}"),
            Self::PollingTimeout { .. } => "Report generation is taking longer than expected. \
                Please try again later."
                .into(),
            Self::Transform(TransformError::InvalidPayload { .. }) => {
                "The report data received from the server was invalid. Please try again.".into()
            }
            Self::Transform(TransformError::UpstreamGenerationFailed { message }) => {
                format!("Report generation failed: {message}")
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn job() -> JobId {
        JobId::new("abc123").unwrap()
    }

    fn http(status: u16, message: &str) -> ApiError {
        ApiError::Http {
            endpoint: "GET /api/v1/reports/result/abc123".into(),
            status,
            code: None,
            message: message.into(),
        }
    }

    #[test]
    fn api_errors_keep_their_kind() {
        let network = ReportError::from(ApiError::Network {
            endpoint: "POST /api/v1/reports/generate".into(),
            source: Box::new(std::io::Error::from(std::io::ErrorKind::ConnectionRefused)),
        });
        assert_eq!(network.code(), ErrorCode::NetworkError);

        let timeout = ReportError::from(ApiError::Timeout {
            endpoint: "x".into(),
            timeout_ms: 60_000,
        });
        assert_eq!(timeout.code(), ErrorCode::Timeout);

        let server = ReportError::from(http(502, "Bad gateway"));
        assert_eq!(server.code(), ErrorCode::HttpError);
        assert_eq!(server.user_message(), "Bad gateway");
    }

    #[test]
    fn poll_errors_detect_missing_tasks() {
        let err = ReportError::from_poll(&job(), http(404, "Task ID not found"));
        assert_eq!(err, ReportError::TaskNotFound { job_id: job() });
        assert!(err.user_message().contains("expired"));

        let other = ReportError::from_poll(&job(), http(500, "boom"));
        assert_eq!(other.code(), ErrorCode::HttpError);
    }

    #[test]
    fn codes_render_as_screaming_snake_case() {
        assert_eq!(ErrorCode::PollingTimeout.to_string(), "POLLING_TIMEOUT");
        assert_eq!(
            serde_json::to_value(ErrorCode::UpstreamGenerationFailed).unwrap(),
            "UPSTREAM_GENERATION_FAILED"
        );
    }

    #[test]
    fn validation_message_comes_from_validator() {
        let err = ReportError::from(VinError::Empty);
        assert_eq!(err.code(), ErrorCode::ValidationError);
        assert_eq!(err.user_message(), "VIN is required");
    }

    #[test]
    fn every_message_is_non_empty() {
        let errors = [
            ReportError::from(VinError::InvalidCharacters),
            ReportError::from(http(400, "")),
            ReportError::TaskFailed {
                job_id: job(),
                message: None,
            },
            ReportError::NoResult { job_id: job() },
            ReportError::UnknownStatus {
                job_id: job(),
                status: "ON_HOLD".into(),
            },
            ReportError::PollingTimeout {
                job_id: job(),
                attempts: 3,
                elapsed_ms: 4000,
            },
            ReportError::from(TransformError::InvalidPayload {
                reason: "x".into(),
            }),
            ReportError::from(TransformError::UpstreamGenerationFailed {
                message: "quota".into(),
            }),
        ];
        for err in errors {
            assert!(!err.user_message().trim().is_empty(), "{err:?}");
        }
    }

    #[test]
    fn unknown_status_message_names_the_literal() {
        let err = ReportError::UnknownStatus {
            job_id: job(),
            status: "ON_HOLD".into(),
        };
        assert_eq!(err.user_message(), "Unknown task status: ON_HOLD");
    }
}
