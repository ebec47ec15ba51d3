//! # VIN Validator
//!
//! Syntactic validation of 17-character Vehicle Identification Numbers.
//!
//! Rules are applied in order:
//!
//! 1. The candidate must be non-empty.
//! 2. It is normalized: ASCII letters are uppercased and every character
//!    outside `[A-HJ-NPR-Z0-9]` is stripped. `I`, `O` and `Q` never survive
//!    normalization because they are too easily confused with `1` and `0`.
//! 3. The normalized value must be exactly 17 characters.
//! 4. The normalized value must fully match `^[A-HJ-NPR-Z0-9]{17}$`.
//!
//! [`normalize_vin`] is exposed separately so form collaborators can use
//! it as a live-input sanitizer; [`validate_vin`] is the pre-submission gate.

use serde::{Deserialize, Serialize};

use crate::error::VinError;

/// Number of characters in a VIN.
pub const VIN_LENGTH: usize = 17;

/// Whether `c` belongs to the VIN alphabet (uppercase only).
pub fn is_vin_char(c: char) -> bool {
    matches!(c, 'A'..='H' | 'J'..='N' | 'P' | 'R'..='Z' | '0'..='9')
}

/// Uppercase ASCII letters and drop everything outside the VIN alphabet.
pub fn normalize_vin(input: &str) -> String {
    input
        .chars()
        .map(|c| c.to_ascii_uppercase())
        .filter(|c| is_vin_char(*c))
        .collect()
}

/// Validate a candidate VIN, returning the normalized [`Vin`] on success.
///
/// # Errors
///
/// Returns [`VinError`] describing the first rule the candidate fails.
pub fn validate_vin(input: &str) -> Result<Vin, VinError> {
    if input.trim().is_empty() {
        return Err(VinError::Empty);
    }

    let normalized = normalize_vin(input);
    let length = normalized.chars().count();
    if length != VIN_LENGTH {
        return Err(VinError::InvalidLength { length });
    }

    if !normalized.chars().all(is_vin_char) {
        return Err(VinError::InvalidCharacters);
    }

    Ok(Vin(normalized))
}

/// A syntactically valid, normalized Vehicle Identification Number.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
pub struct Vin(String);

impl Vin {
    /// Validate and normalize a VIN. Equivalent to [`validate_vin`].
    pub fn new(value: impl AsRef<str>) -> Result<Self, VinError> {
        validate_vin(value.as_ref())
    }

    /// Access the normalized VIN string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl<'de> Deserialize<'de> for Vin {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        Self::new(raw).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Display for Vin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl std::str::FromStr for Vin {
    type Err = VinError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for Vin {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
