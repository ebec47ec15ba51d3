//! # vhr-core -- Foundational Types for Vehicle-History Reporting
//!
//! Defines the type-system primitives shared by every other crate in the
//! workspace. It depends on nothing internal.
//!
//! ## Key Design Principles
//!
//! 1. **Validated newtypes.** A [`Vin`] can only be built through the VIN
//!    validator, so every value of that type is 17 characters drawn from
//!    `[A-HJ-NPR-Z0-9]`. A [`JobId`] is never empty.
//!
//! 2. **One task-status vocabulary.** Backends have emitted `SUCCESS` and
//!    `COMPLETED`, `FAILURE` and `FAILED`, `RETRY` and `IN_PROGRESS`. All of
//!    them collapse into the single [`TaskStatus`] enum through one mapping
//!    table, and each status has exactly one [`TaskDisposition`].
//!
//! 3. **Loose wire, strict domain.** [`RawReportPayload`] mirrors whatever
//!    the backend sends and tolerates missing fields. [`Report`] is the
//!    fully-typed output that the rest of the system hands to the UI.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `vhr-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod error;
pub mod job;
pub mod payload;
pub mod report;
pub mod vin;

pub use error::{JobIdError, VinError};
pub use job::{JobId, JobStatusReport, TaskDisposition, TaskStatus};
pub use payload::RawReportPayload;
pub use report::{
    ExecutiveSummary, OverallCondition, RecommendedAction, Report, ReportMetadata, ReportSection,
    RiskLevel, SectionData, SectionId, SectionStatus,
};
pub use vin::{normalize_vin, validate_vin, Vin, VIN_LENGTH};
