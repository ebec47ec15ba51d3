//! Observable generation state.
//!
//! ```text
//!   idle ──► validating ──► starting ──► polling ──► completed
//!                │              │           │
//!                └──────────────┴───────────┴──► error
//!
//!   any ──► idle        (cancel / reset)
//!   any ──► validating  (new attempt supersedes the current one)
//! ```

use serde::Serialize;
use vhr_core::JobId;

use crate::error::ErrorCode;

/// Lifecycle phase of the current generation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum GenerationStatus {
    #[default]
    Idle,
    Validating,
    Starting,
    Polling,
    Completed,
    Error,
}

impl GenerationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Idle => "idle",
            Self::Validating => "validating",
            Self::Starting => "starting",
            Self::Polling => "polling",
            Self::Completed => "completed",
            Self::Error => "error",
        }
    }

    /// Whether an attempt is in flight.
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Validating | Self::Starting | Self::Polling)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Completed | Self::Error)
    }

    /// Whether moving from `self` to `next` is a legal transition.
    pub fn can_transition_to(&self, next: GenerationStatus) -> bool {
        use GenerationStatus::*;
        match (self, next) {
            (_, Idle) | (_, Validating) => true,
            (Validating, Starting) | (Starting, Polling) | (Polling, Completed) => true,
            (Validating | Starting | Polling, Error) => true,
            _ => false,
        }
    }
}

impl std::fmt::Display for GenerationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Read-only snapshot handed to callers.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct ReportGenerationState {
    pub status: GenerationStatus,
    /// Percentage in `[0, 100]`.
    pub progress: u8,
    pub estimated_seconds_remaining: Option<u64>,
    pub current_step: Option<String>,
    /// User-facing message; set exactly when `status` is `Error`.
    pub error: Option<String>,
    pub error_code: Option<ErrorCode>,
    pub job_id: Option<JobId>,
}

impl ReportGenerationState {
    pub fn is_loading(&self) -> bool {
        self.status.is_active()
    }

    pub fn has_error(&self) -> bool {
        self.status == GenerationStatus::Error
    }

    /// Move to `next`. Illegal transitions indicate an orchestrator bug.
    pub(crate) fn transition(&mut self, next: GenerationStatus) {
        debug_assert!(
            self.status.can_transition_to(next),
            "illegal transition {} -> {next}",
            self.status
        );
        tracing::info!(from = %self.status, to = %next, "report generation state change");
        self.status = next;
    }
}
