//! Report API client error types.
//!
//! Connectivity failures (no response at all) are kept distinct from
//! HTTP-level failures (a response with a non-2xx status), and the latter
//! carry the status code plus any backend-supplied error code.

/// Boxed transport error, so test doubles can stand in for `reqwest`.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors from report API calls.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// No HTTP response was obtained.
    #[error("network error calling {endpoint}: {source}")]
    Network {
        endpoint: String,
        #[source]
        source: BoxError,
    },
    /// The request did not complete within the per-request timeout.
    #[error("request to {endpoint} timed out after {timeout_ms}ms")]
    Timeout { endpoint: String, timeout_ms: u64 },
    /// The backend returned a non-2xx status.
    #[error("{endpoint} returned HTTP {status}: {message}")]
    Http {
        endpoint: String,
        status: u16,
        /// Backend-supplied machine-readable error code, if any.
        code: Option<String>,
        /// Backend `detail`, or a synthesized `HTTP <status>: <reason>`.
        message: String,
    },
    /// A 2xx body could not be decoded into the expected shape.
    #[error("failed to deserialize response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        source: serde_json::Error,
    },
    /// Configuration error.
    #[error("configuration error: {0}")]
    Config(#[from] crate::config::ConfigError),
}

impl ApiError {
    /// Whether a caller may retry the request: connectivity failures,
    /// timeouts and 5xx responses. 4xx responses are terminal.
    pub fn is_retryable(&self) -> bool {
        match self {
            Self::Network { .. } | Self::Timeout { .. } => true,
            Self::Http { status, .. } => *status >= 500,
            Self::Deserialization { .. } | Self::Config(_) => false,
        }
    }

    /// HTTP status code, for HTTP-level failures.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Http { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Backend-supplied error code, if any.
    pub fn code(&self) -> Option<&str> {
        match self {
            Self::Http { code, .. } => code.as_deref(),
            _ => None,
        }
    }

    /// Whether the backend reported that the job id is unknown to it.
    ///
    /// Matches an HTTP 404, a `TASK_NOT_FOUND` code, or a message of the
    /// form "Task ID ... not found".
    pub fn is_task_not_found(&self) -> bool {
        let Self::Http {
            status,
            code,
            message,
            ..
        } = self
        else {
            return false;
        };

        if *status == 404 || code.as_deref() == Some("TASK_NOT_FOUND") {
            return true;
        }
        let lower = message.to_ascii_lowercase();
        lower.contains("task") && lower.contains("not found")
    }
}
