//! # vhr-transform -- Backend payload to typed Report
//!
//! [`transform`] converts a [`RawReportPayload`] into a validated
//! [`Report`]. It is pure and deterministic: the same payload always
//! yields a deep-equal report, and nothing is read from the clock.
//!
//! Only two inputs are fatal:
//!
//! | Condition | Error |
//! |-----------|-------|
//! | `report_data` missing, not an object, or a string that is not a JSON object | [`TransformError::InvalidPayload`] |
//! | `report_data.error` is set | [`TransformError::UpstreamGenerationFailed`] |
//!
//! Every other gap is filled with a neutral default and, for whole
//! sections, marked [`SectionStatus::Unavailable`](vhr_core::SectionStatus).

pub mod confidence;
mod fields;
pub mod sections;

use std::borrow::Cow;

use serde_json::Value;
use vhr_core::report::{DataSource, ValueRange};
use vhr_core::{
    ExecutiveSummary, OverallCondition, RawReportPayload, RecommendedAction, Report,
    ReportMetadata, RiskLevel, Vin,
};

pub use confidence::{data_completion, normalize_confidence, CANONICAL_SECTIONS};
pub use fields::parse_timestamp;

use fields::Object;

/// Fatal transformation failures. Neither is worth retrying.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransformError {
    #[error("invalid report payload: {reason}")]
    InvalidPayload { reason: String },

    #[error("report generation failed upstream: {message}")]
    UpstreamGenerationFailed { message: String },
}

/// Convert a backend payload into a [`Report`] for `vin`.
pub fn transform(payload: &RawReportPayload, vin: &Vin) -> Result<Report, TransformError> {
    let data = report_data_object(&payload.report_data)?;

    if let Some(message) = embedded_error(&data) {
        tracing::error!(vin = %vin, %message, "backend reported a generation failure");
        return Err(TransformError::UpstreamGenerationFailed { message });
    }

    let generated_at = payload.generated_at.as_deref().and_then(parse_timestamp);
    if generated_at.is_none() {
        tracing::warn!(vin = %vin, raw = ?payload.generated_at, "unparsable generated_at timestamp");
    }

    let confidence = normalize_confidence(payload.confidence_score);
    let completion = data_completion(&data);
    tracing::debug!(
        vin = %vin,
        raw_confidence = ?payload.confidence_score,
        confidence,
        completion,
        "transforming report payload"
    );

    let sources = payload
        .providers_used
        .iter()
        .map(|name| DataSource {
            name: name.clone(),
            coverage: completion,
            reliability: confidence,
            last_update: generated_at,
        })
        .collect();

    Ok(Report {
        vin: vin.clone(),
        generated_at,
        providers_used: payload.providers_used.clone(),
        confidence,
        executive_summary: executive_summary(fields::object(Some(&data), "overall_assessment"), confidence),
        sections: sections::build_sections(&data, vin, generated_at),
        metadata: ReportMetadata {
            data_quality: confidence,
            data_completion: completion,
            last_data_update: generated_at,
            sources,
            processing_time_ms: None,
        },
    })
}

/// Borrow `report_data` as an object, decoding it first when the backend
/// sent it JSON-encoded.
fn report_data_object(value: &Value) -> Result<Cow<'_, Object>, TransformError> {
    match value {
        Value::Object(map) => Ok(Cow::Borrowed(map)),
        Value::String(text) => match serde_json::from_str::<Value>(text) {
            Ok(Value::Object(map)) => Ok(Cow::Owned(map)),
            Ok(_) => Err(invalid("report_data string does not encode a JSON object")),
            Err(e) => Err(invalid(&format!("report_data string is not valid JSON: {e}"))),
        },
        Value::Null => Err(invalid("report_data is missing")),
        _ => Err(invalid("report_data is not an object")),
    }
}

fn invalid(reason: &str) -> TransformError {
    TransformError::InvalidPayload {
        reason: reason.to_string(),
    }
}

/// Falsy values (`null`, `false`, `0`, blank string) mean no error.
/// Objects and arrays, even empty ones, are reported.
fn embedded_error(data: &Object) -> Option<String> {
    match data.get("error")? {
        Value::Null | Value::Bool(false) => None,
        Value::Number(n) if n.as_f64() == Some(0.0) => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.trim().to_string()),
        other => Some(other.to_string()),
    }
}

fn executive_summary(assessment: Option<&Object>, confidence: f64) -> ExecutiveSummary {
    let estimated_value = fields::object(assessment, "estimated_value")
        .map(|v| {
            let v = Some(v);
            let a = fields::f64_field(v, "min").unwrap_or(0.0);
            let b = fields::f64_field(v, "max").unwrap_or(0.0);
            ValueRange {
                min: a.min(b),
                max: a.max(b),
                currency: fields::string(v, "currency").unwrap_or_else(|| "USD".into()),
            }
        })
        .unwrap_or_default();

    ExecutiveSummary {
        overall_condition: fields::string(assessment, "condition")
            .and_then(|s| OverallCondition::parse(&s))
            .unwrap_or(OverallCondition::Unknown),
        risk_level: fields::string(assessment, "risk_level")
            .and_then(|s| RiskLevel::parse(&s))
            .unwrap_or(RiskLevel::Unknown),
        recommended_action: fields::string(assessment, "recommended_action")
            .and_then(|s| RecommendedAction::parse(&s))
            .unwrap_or(RecommendedAction::Inspect),
        key_findings: fields::string_list(assessment, "key_findings"),
        estimated_value,
        confidence: fields::f64_field(assessment, "confidence")
            .map(|c| normalize_confidence(Some(c)))
            .unwrap_or(confidence),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn vin() -> Vin {
        Vin::new("1HGBH41JXMN109186").unwrap()
    }

    fn payload(report_data: Value) -> RawReportPayload {
        RawReportPayload {
            vin: Some("1HGBH41JXMN109186".into()),
            report_data,
            generated_at: Some("2026-03-01T10:15:00Z".into()),
            providers_used: vec!["Carfax".into()],
            confidence_score: Some(8.5),
        }
    }

    #[test]
    fn missing_report_data_is_invalid() {
        let err = transform(&payload(Value::Null), &vin()).unwrap_err();
        assert!(matches!(err, TransformError::InvalidPayload { .. }));
    }

    #[test]
    fn non_object_report_data_is_invalid() {
        for bad in [json!([1, 2]), json!(42), json!("plain text"), json!("[1,2]")] {
            let err = transform(&payload(bad.clone()), &vin()).unwrap_err();
            assert!(
                matches!(err, TransformError::InvalidPayload { .. }),
                "{bad} gave {err:?}"
            );
        }
    }

    #[test]
    fn embedded_error_is_propagated() {
        let err = transform(&payload(json!({ "error": "model quota exceeded" })), &vin())
            .unwrap_err();
        assert_eq!(
            err,
            TransformError::UpstreamGenerationFailed {
                message: "model quota exceeded".into()
            }
        );
    }

    #[test]
    fn falsy_error_field_is_ignored() {
        for falsy in [json!(null), json!(false), json!(""), json!(0), json!(0.0)] {
            assert!(transform(&payload(json!({ "error": falsy })), &vin()).is_ok());
        }
    }

    #[test]
    fn truthy_non_string_error_field_fails() {
        for truthy in [json!(1), json!({}), json!([])] {
            assert!(matches!(
                transform(&payload(json!({ "error": truthy })), &vin()),
                Err(TransformError::UpstreamGenerationFailed { .. })
            ));
        }
    }

    #[test]
    fn string_encoded_report_data_is_accepted() {
        let encoded = json!({ "overall_assessment": { "condition": "fair" } }).to_string();
        let report = transform(&payload(Value::String(encoded)), &vin()).unwrap();
        assert_eq!(report.executive_summary.overall_condition, OverallCondition::Fair);
    }

    #[test]
    fn summary_defaults_when_assessment_missing() {
        let report = transform(&payload(json!({})), &vin()).unwrap();
        let summary = &report.executive_summary;
        assert_eq!(summary.overall_condition, OverallCondition::Unknown);
        assert_eq!(summary.risk_level, RiskLevel::Unknown);
        assert_eq!(summary.recommended_action, RecommendedAction::Inspect);
        assert!(summary.key_findings.is_empty());
        assert_eq!(summary.estimated_value, ValueRange::default());
        assert!((summary.confidence - 0.85).abs() < 1e-9);
    }

    #[test]
    fn assessment_confidence_wins_and_is_normalized() {
        let report = transform(
            &payload(json!({ "overall_assessment": { "confidence": 9 } })),
            &vin(),
        )
        .unwrap();
        assert!((report.executive_summary.confidence - 0.9).abs() < 1e-9);
        assert!((report.confidence - 0.85).abs() < 1e-9);
    }

    #[test]
    fn value_range_is_ordered() {
        let report = transform(
            &payload(json!({
                "overall_assessment": { "estimated_value": { "min": "25000", "max": 22000 } }
            })),
            &vin(),
        )
        .unwrap();
        let range = &report.executive_summary.estimated_value;
        assert_eq!((range.min, range.max), (22000.0, 25000.0));
        assert_eq!(range.currency, "USD");
    }

    #[test]
    fn metadata_mirrors_providers() {
        let mut p = payload(json!({ "vehicle_identification": { "make": "Honda" } }));
        p.providers_used = vec!["Carfax".into(), "NHTSA".into()];
        let report = transform(&p, &vin()).unwrap();
        let meta = &report.metadata;
        assert_eq!(meta.sources.len(), 2);
        assert!((meta.data_completion - 0.125).abs() < 1e-9);
        assert!(meta.sources.iter().all(|s| s.coverage == meta.data_completion));
        assert!(meta.sources.iter().all(|s| s.reliability == report.confidence));
        assert_eq!(meta.last_data_update, report.generated_at);
        assert!(meta.processing_time_ms.is_none());
    }

    #[test]
    fn bad_timestamp_is_tolerated() {
        let mut p = payload(json!({}));
        p.generated_at = Some("not a date".into());
        let report = transform(&p, &vin()).unwrap();
        assert!(report.generated_at.is_none());
    }
}
