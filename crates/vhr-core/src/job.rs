//! # Jobs and Task Status
//!
//! A [`JobId`] identifies one asynchronous report-generation task on the
//! backend. [`TaskStatus`] is the canonical vocabulary for its progress.
//!
//! ## Status Mapping Table
//!
//! Backend literals are matched case-insensitively, with `-` and spaces
//! treated as `_`:
//!
//! | Literal(s) | Status | Disposition |
//! |------------|--------|-------------|
//! | `PENDING` | `Pending` | continue |
//! | `STARTED` | `Started` | continue |
//! | `IN_PROGRESS`, `PROGRESS`, `RETRY` | `InProgress` | continue |
//! | `SUCCESS`, `COMPLETED` | `Success` | success |
//! | `FAILURE`, `FAILED` | `Failure` | failure |
//! | `REVOKED` | `Revoked` | failure |
//! | anything else | `Unknown(literal)` | unknown |

use serde::{Deserialize, Serialize};

use crate::error::JobIdError;
use crate::payload::RawReportPayload;

/// Opaque identifier of a backend report-generation task.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct JobId(String);

impl JobId {
    /// Wrap a backend-issued identifier.
    ///
    /// # Errors
    ///
    /// Returns [`JobIdError`] if the identifier is empty or whitespace.
    pub fn new(value: impl Into<String>) -> Result<Self, JobIdError> {
        let s = value.into();
        if s.trim().is_empty() {
            return Err(JobIdError);
        }
        Ok(Self(s))
    }

    /// Access the identifier string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for JobId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// What the poller should do after observing a status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TaskDisposition {
    /// The job is still running; poll again.
    Continue,
    /// The job finished; a payload is expected.
    Success,
    /// The job failed or was revoked.
    Failure,
    /// The literal is outside the known vocabulary.
    Unknown,
}

/// Canonical progress state of a backend job.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TaskStatus {
    Pending,
    Started,
    InProgress,
    Success,
    Failure,
    Revoked,
    /// A literal outside the known vocabulary, kept verbatim for diagnostics.
    Unknown(String),
}

impl TaskStatus {
    /// Map a backend literal onto the canonical vocabulary.
    pub fn from_literal(raw: &str) -> Self {
        let key: String = raw
            .trim()
            .chars()
            .map(|c| match c {
                '-' | ' ' => '_',
                other => other.to_ascii_uppercase(),
            })
            .collect();

        match key.as_str() {
            "PENDING" => Self::Pending,
            "STARTED" => Self::Started,
            "IN_PROGRESS" | "PROGRESS" | "RETRY" => Self::InProgress,
            "SUCCESS" | "COMPLETED" => Self::Success,
            "FAILURE" | "FAILED" => Self::Failure,
            "REVOKED" => Self::Revoked,
            _ => Self::Unknown(raw.to_string()),
        }
    }

    /// Canonical literal for this status.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "PENDING",
            Self::Started => "STARTED",
            Self::InProgress => "IN_PROGRESS",
            Self::Success => "SUCCESS",
            Self::Failure => "FAILURE",
            Self::Revoked => "REVOKED",
            Self::Unknown(raw) => raw,
        }
    }

    /// The single action associated with this status.
    pub fn disposition(&self) -> TaskDisposition {
        match self {
            Self::Pending | Self::Started | Self::InProgress => TaskDisposition::Continue,
            Self::Success => TaskDisposition::Success,
            Self::Failure | Self::Revoked => TaskDisposition::Failure,
            Self::Unknown(_) => TaskDisposition::Unknown,
        }
    }

    /// Whether polling stops at this status.
    pub fn is_terminal(&self) -> bool {
        self.disposition() != TaskDisposition::Continue
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for TaskStatus {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for TaskStatus {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::from_literal(&raw))
    }
}

/// One observation of a job, as returned by the status endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobStatusReport {
    pub status: TaskStatus,
    #[serde(default)]
    pub message: Option<String>,
    /// Present only once the job has succeeded.
    #[serde(default, rename = "result")]
    pub payload: Option<RawReportPayload>,
}
