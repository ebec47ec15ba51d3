//! Section synthesis: typed payloads and status badges.
//!
//! Each builder accepts the (possibly absent) source object and always
//! produces a fully-defaulted payload. Badge rules are plain functions so
//! they can be checked in isolation.

use chrono::{DateTime, Utc};
use vhr_core::report::{
    AccidentData, AccidentReport, AccidentSeverity, ClaimSeverity, ClaimsSeverity, InsuranceClaim,
    InsuranceData, MaintenanceData, OwnershipData, OwnershipRecord, RecallData, RecallRecord,
    RecallSeverity, RecallStatus, ServiceEvent, TitleData, TitleStatus, VehicleData,
};
use vhr_core::{ReportSection, SectionData, SectionId, SectionStatus, Vin};

use crate::fields::{self, Object};

const UNKNOWN: &str = "Unknown";
const NO_DESCRIPTION: &str = "No description available";

/// Top-level key in `report_data` that feeds `id`.
pub fn source_key(id: SectionId) -> &'static str {
    match id {
        SectionId::Vehicle => "vehicle_identification",
        SectionId::Maintenance => "maintenance",
        SectionId::Accidents => "accident_history",
        SectionId::Ownership => "ownership_history",
        SectionId::Recalls => "recalls",
        SectionId::Title => "title_status",
        SectionId::Insurance => "insurance_claims",
    }
}

// -- Badge rules --------------------------------------------------------------

pub fn accident_status(severity: AccidentSeverity) -> SectionStatus {
    match severity {
        AccidentSeverity::None => SectionStatus::Clean,
        AccidentSeverity::Minor => SectionStatus::Warning,
        _ => SectionStatus::Critical,
    }
}

pub fn recall_status(open_recalls: u32) -> SectionStatus {
    if open_recalls > 0 {
        SectionStatus::Warning
    } else {
        SectionStatus::Clean
    }
}

pub fn title_status(status: TitleStatus) -> SectionStatus {
    if status == TitleStatus::Clean {
        SectionStatus::Clean
    } else {
        SectionStatus::Warning
    }
}

pub fn insurance_status(severity: ClaimsSeverity) -> SectionStatus {
    match severity {
        ClaimsSeverity::Low => SectionStatus::Clean,
        ClaimsSeverity::Medium => SectionStatus::Warning,
        _ => SectionStatus::Critical,
    }
}

pub fn maintenance_status(regular_maintenance: bool) -> SectionStatus {
    if regular_maintenance {
        SectionStatus::Clean
    } else {
        SectionStatus::Warning
    }
}

// -- Synthesis ----------------------------------------------------------------

/// Build all seven sections in display order.
pub fn build_sections(
    report_data: &Object,
    vin: &Vin,
    last_updated: Option<DateTime<Utc>>,
) -> Vec<ReportSection> {
    SectionId::ALL
        .iter()
        .map(|&id| {
            let key = source_key(id);
            let src = fields::object(Some(report_data), key);
            let present = fields::is_present(report_data, key);
            if !present {
                tracing::warn!(section = key, "report section missing; using defaults");
            }

            let (data, status, summary) = match id {
                SectionId::Vehicle => vehicle(src, vin),
                SectionId::Maintenance => maintenance(src),
                SectionId::Accidents => accidents(src),
                SectionId::Ownership => ownership(src),
                SectionId::Recalls => recalls(src),
                SectionId::Title => title(src),
                SectionId::Insurance => insurance(src),
            };

            ReportSection {
                id,
                title: id.title().to_string(),
                status: if present { status } else { SectionStatus::Unavailable },
                summary,
                data,
                last_updated,
            }
        })
        .collect()
}

type Built = (SectionData, SectionStatus, String);

fn vehicle(src: Option<&Object>, vin: &Vin) -> Built {
    let data = VehicleData {
        vin: fields::string(src, "vin").unwrap_or_else(|| vin.to_string()),
        make: fields::string(src, "make").unwrap_or_else(|| UNKNOWN.into()),
        model: fields::string(src, "model").unwrap_or_else(|| UNKNOWN.into()),
        year: fields::u32_field(src, "year").unwrap_or(0),
        engine: fields::string(src, "engine").unwrap_or_else(|| UNKNOWN.into()),
        transmission: fields::string(src, "transmission").unwrap_or_else(|| UNKNOWN.into()),
    };
    let year = match data.year {
        0 => UNKNOWN.to_string(),
        y => y.to_string(),
    };
    let summary = format!("{year} {} {}", data.make, data.model);
    (SectionData::Vehicle(data), SectionStatus::Clean, summary)
}

fn maintenance(src: Option<&Object>) -> Built {
    let last_service = fields::object(src, "last_service").map(|svc| {
        let svc = Some(svc);
        ServiceEvent {
            date: fields::date(svc, "date"),
            mileage: fields::u32_field(svc, "mileage").unwrap_or(0),
            service_type: fields::string(svc, "type")
                .or_else(|| fields::string(svc, "service_type"))
                .unwrap_or_else(|| UNKNOWN.into()),
        }
    });
    let data = MaintenanceData {
        total_services: fields::u32_field(src, "total_services").unwrap_or(0),
        regular_maintenance: fields::bool_field(src, "regular_maintenance").unwrap_or(false),
        overdue_services: fields::string_list(src, "overdue_services"),
        last_service,
    };
    let status = maintenance_status(data.regular_maintenance);
    let summary = format!(
        "Total services: {}, {} overdue",
        data.total_services,
        data.overdue_services.len()
    );
    (SectionData::Maintenance(data), status, summary)
}

fn accidents(src: Option<&Object>) -> Built {
    let reports = fields::records(src, "accidents")
        .into_iter()
        .map(|acc| {
            let acc = Some(acc);
            let mut damage_types = fields::string_list(acc, "damage_type");
            if damage_types.is_empty() {
                damage_types = fields::string_list(acc, "damage_types");
            }
            AccidentReport {
                date: fields::date(acc, "date"),
                severity: parsed(acc, "severity", AccidentSeverity::parse)
                    .unwrap_or(AccidentSeverity::Minor),
                damage_types,
                estimated_cost: fields::f64_field(acc, "estimated_cost"),
                location: fields::string(acc, "location"),
                description: fields::string(acc, "description")
                    .unwrap_or_else(|| NO_DESCRIPTION.into()),
            }
        })
        .collect();
    // An absent severity means nothing was reported, not an unknown grade.
    let severity = match fields::string(src, "severity") {
        Some(raw) => AccidentSeverity::parse(&raw).unwrap_or(AccidentSeverity::Unknown),
        None => AccidentSeverity::None,
    };
    let data = AccidentData {
        total_accidents: fields::u32_field(src, "total_accidents").unwrap_or(0),
        severity,
        structural_damage: fields::bool_field(src, "structural_damage").unwrap_or(false),
        flood_damage: fields::bool_field(src, "flood_damage").unwrap_or(false),
        reports,
    };
    let summary = format!("{} accidents reported", data.total_accidents);
    (SectionData::Accidents(data), accident_status(severity), summary)
}

fn ownership(src: Option<&Object>) -> Built {
    let owners: Vec<OwnershipRecord> = fields::records(src, "owners")
        .into_iter()
        .enumerate()
        .map(|(index, owner)| {
            let owner = Some(owner);
            OwnershipRecord {
                owner_number: u32::try_from(index + 1).unwrap_or(u32::MAX),
                duration_months: fields::f64_field(owner, "duration")
                    .or_else(|| fields::f64_field(owner, "duration_months")),
                location: fields::string(owner, "location"),
                end_reason: fields::string(owner, "end_reason"),
                mileage_start: fields::u32_field(owner, "mileage_start"),
                mileage_end: fields::u32_field(owner, "mileage_end"),
            }
        })
        .collect();
    let data = OwnershipData {
        total_owners: fields::u32_field(src, "total_owners").unwrap_or(0),
        average_ownership_months: fields::f64_field(src, "average_ownership_duration_months")
            .filter(|m| *m >= 0.0)
            .unwrap_or(0.0),
        commercial_use: fields::bool_field(src, "commercial_use").unwrap_or(false),
        rental_history: fields::bool_field(src, "rental_history").unwrap_or(false),
        owners,
    };
    let summary = format!(
        "{} owners, avg {} months",
        data.total_owners, data.average_ownership_months
    );
    (SectionData::Ownership(data), SectionStatus::Clean, summary)
}

fn recalls(src: Option<&Object>) -> Built {
    let recalls = fields::records(src, "recall_list")
        .into_iter()
        .enumerate()
        .map(|(index, recall)| {
            let recall = Some(recall);
            RecallRecord {
                recall_number: fields::string(recall, "recall_number")
                    .or_else(|| fields::string(recall, "number"))
                    .unwrap_or_else(|| format!("RECALL-{}", index + 1)),
                date: fields::date(recall, "date"),
                component: fields::string(recall, "component").unwrap_or_else(|| UNKNOWN.into()),
                description: fields::string(recall, "description")
                    .unwrap_or_else(|| NO_DESCRIPTION.into()),
                severity: parsed(recall, "severity", RecallSeverity::parse)
                    .unwrap_or(RecallSeverity::Other),
                status: parsed(recall, "status", RecallStatus::parse)
                    .unwrap_or(RecallStatus::Unknown),
                remedy: fields::string(recall, "remedy"),
            }
        })
        .collect();
    let data = RecallData {
        total_recalls: fields::u32_field(src, "total_recalls").unwrap_or(0),
        open_recalls: fields::u32_field(src, "open_recalls").unwrap_or(0),
        safety_recalls: fields::u32_field(src, "safety_recalls").unwrap_or(0),
        recalls,
    };
    let status = recall_status(data.open_recalls);
    let summary = format!(
        "{} recalls, {} open",
        data.total_recalls, data.open_recalls
    );
    (SectionData::Recalls(data), status, summary)
}

fn title(src: Option<&Object>) -> Built {
    let status = parsed(src, "status", TitleStatus::parse).unwrap_or(TitleStatus::Unknown);
    let data = TitleData {
        status,
        issues: fields::string_list(src, "issues"),
        state_issued: fields::string(src, "state_issued").unwrap_or_else(|| UNKNOWN.into()),
    };
    let summary = format!("{status} title");
    (SectionData::Title(data), title_status(status), summary)
}

fn insurance(src: Option<&Object>) -> Built {
    let claims = fields::records(src, "claims")
        .into_iter()
        .map(|claim| {
            let claim = Some(claim);
            InsuranceClaim {
                date: fields::date(claim, "date"),
                claim_type: fields::string(claim, "claim_type")
                    .or_else(|| fields::string(claim, "type"))
                    .unwrap_or_else(|| UNKNOWN.into()),
                amount: fields::f64_field(claim, "amount"),
                severity: parsed(claim, "severity", ClaimSeverity::parse)
                    .unwrap_or(ClaimSeverity::Minor),
                description: fields::string(claim, "description")
                    .unwrap_or_else(|| NO_DESCRIPTION.into()),
            }
        })
        .collect();
    let claims_severity = match fields::string(src, "claims_severity") {
        Some(raw) => ClaimsSeverity::parse(&raw).unwrap_or(ClaimsSeverity::Unknown),
        None => ClaimsSeverity::Low,
    };
    let data = InsuranceData {
        total_claims: fields::u32_field(src, "total_claims").unwrap_or(0),
        claims_severity,
        claims,
    };
    let summary = format!("{} claims", data.total_claims);
    (
        SectionData::Insurance(data),
        insurance_status(claims_severity),
        summary,
    )
}

fn parsed<T>(obj: Option<&Object>, key: &str, parse: fn(&str) -> Option<T>) -> Option<T> {
    fields::string(obj, key).and_then(|raw| parse(&raw))
}
