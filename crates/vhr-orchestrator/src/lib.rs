//! # vhr-orchestrator -- Vehicle-history report generation
//!
//! Turns a VIN into a validated [`Report`](vhr_core::Report):
//!
//! 1. validate the VIN locally;
//! 2. submit a job, retrying connectivity and 5xx failures with backoff;
//! 3. poll the job until it is terminal ([`poller`]);
//! 4. transform the payload ([`vhr_transform::transform`]).
//!
//! [`ReportOrchestrator`] owns the observable [`ReportGenerationState`] and
//! is the only component that mutates it. Failures of every kind end as a
//! [`ReportError`], whose [`user_message`](ReportError::user_message) is
//! published in the state and passed to the error callback.
//!
//! ## Crate Policy
//!
//! - The state lock is a `parking_lot::Mutex` and is never held across an
//!   `.await`.
//! - Cancellation is a `CancellationToken` per attempt, checked under the
//!   state lock before every mutation.
//! - Interpolated progress is cosmetic. Only a real poll result completes
//!   an attempt.

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod poller;
pub mod progress;
pub mod state;

pub use config::{OrchestratorConfig, PollConfig};
pub use error::{ErrorCode, ReportError};
pub use orchestrator::{GenerationOutcome, ReportOrchestrator};
pub use poller::{poll_job, PollOutcome, PollProgress};
pub use state::{GenerationStatus, ReportGenerationState};
