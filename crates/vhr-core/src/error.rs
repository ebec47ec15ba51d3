//! # Error Types
//!
//! Validation errors for the core newtypes. The `Display` text of
//! [`VinError`] is user-facing: the orchestrator publishes it verbatim
//! as the generation error message.

use thiserror::Error;

/// Rejection reason from the VIN validator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum VinError {
    /// The candidate was empty or whitespace only.
    #[error("VIN is required")]
    Empty,

    /// The normalized candidate is not exactly 17 characters long.
    #[error("VIN must be exactly 17 characters")]
    InvalidLength {
        /// Length after normalization.
        length: usize,
    },

    /// The candidate contains characters outside `[A-HJ-NPR-Z0-9]`.
    #[error("VIN contains invalid characters (I, O, Q not allowed)")]
    InvalidCharacters,
}

/// A backend returned an unusable job identifier.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("job identifier must not be empty")]
pub struct JobIdError;
