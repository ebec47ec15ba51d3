//! Confidence normalization and the data-completion metric.
//!
//! The backend emits confidence on either a 0-1 or a 0-10 scale without
//! saying which. The rule applied here:
//!
//! - values `<= 1` are read on the 0-1 scale and kept as-is;
//! - values `> 1` are read on the 0-10 scale and divided by 10;
//! - the result is clamped to `[0, 1]`; missing, NaN and negative
//!   values become `0`.
//!
//! The rule cannot tell a 0-10 score of `1.0` (meaning 0.1) from a
//! 0-1 score of `1.0` (meaning 1.0). It resolves `1.0` as full confidence.

use crate::fields::{self, Object};

/// Top-level keys of a complete report body.
pub const CANONICAL_SECTIONS: [&str; 8] = [
    "vehicle_identification",
    "accident_history",
    "ownership_history",
    "title_status",
    "recalls",
    "maintenance",
    "insurance_claims",
    "overall_assessment",
];

/// Map a raw backend confidence onto `[0, 1]`.
pub fn normalize_confidence(raw: Option<f64>) -> f64 {
    let Some(raw) = raw.filter(|v| v.is_finite()) else {
        return 0.0;
    };
    let scaled = if raw > 1.0 { raw / 10.0 } else { raw };
    scaled.clamp(0.0, 1.0)
}

/// Fraction of [`CANONICAL_SECTIONS`] present as non-empty objects.
pub fn data_completion(report_data: &Object) -> f64 {
    let present = CANONICAL_SECTIONS
        .iter()
        .filter(|key| fields::is_present(report_data, key))
        .count();
    present as f64 / CANONICAL_SECTIONS.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn unit_scale_is_kept() {
        assert!(close(normalize_confidence(Some(0.42)), 0.42));
        assert!(close(normalize_confidence(Some(0.0)), 0.0));
    }

    #[test]
    fn ten_scale_is_divided() {
        assert!(close(normalize_confidence(Some(8.5)), 0.85));
        assert!(close(normalize_confidence(Some(10.0)), 1.0));
        assert!(close(normalize_confidence(Some(1.5)), 0.15));
    }

    #[test]
    fn one_is_read_on_the_unit_scale() {
        // 1.0 is ambiguous: 0-1 reading gives 1.0, 0-10 reading gives 0.1.
        let normalized = normalize_confidence(Some(1.0));
        assert!(close(normalized, 1.0));
        assert!(!close(normalized, 0.1));
        // Just above the boundary flips to the 0-10 reading.
        assert!(close(normalize_confidence(Some(1.0 + 1e-9)), 0.1 + 1e-10));
    }

    #[test]
    fn out_of_range_and_missing() {
        assert_eq!(normalize_confidence(None), 0.0);
        assert_eq!(normalize_confidence(Some(f64::NAN)), 0.0);
        assert_eq!(normalize_confidence(Some(f64::INFINITY)), 0.0);
        assert_eq!(normalize_confidence(Some(-3.0)), 0.0);
        assert_eq!(normalize_confidence(Some(25.0)), 1.0);
    }

    #[test]
    fn completion_counts_non_empty_sections() {
        let data = json!({
            "vehicle_identification": {"make": "Honda"},
            "accident_history": {},
            "recalls": {"total_recalls": 0},
            "maintenance": "n/a",
            "unrelated": {"x": 1}
        });
        let completion = data_completion(data.as_object().unwrap());
        assert!(close(completion, 2.0 / 8.0));
    }

    #[test]
    fn completion_of_empty_body_is_zero() {
        assert_eq!(data_completion(&Object::new()), 0.0);
    }

    proptest! {
        #[test]
        fn normalized_confidence_is_a_fraction(raw in proptest::num::f64::ANY) {
            let n = normalize_confidence(Some(raw));
            prop_assert!((0.0..=1.0).contains(&n));
        }
    }
}
