//! # Report Domain Model
//!
//! The validated, fully-typed vehicle-history report handed to the UI.
//!
//! ## Invariants
//!
//! - `confidence`, `executive_summary.confidence`, `metadata.data_quality`
//!   and `metadata.data_completion` are in `[0, 1]`.
//! - `vin` is a validated [`Vin`].
//! - `sections` contains every [`SectionId`] exactly once, in
//!   [`SectionId::ALL`] order, even when the backend supplied no data.
//!
//! Nothing in this module constructs a `Report`; see `vhr-transform`.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::vin::Vin;

/// Declares a closed string enum with a lenient, case-insensitive parser.
macro_rules! literal_enum {
    (
        $(#[$meta:meta])*
        $name:ident { $($(#[$vmeta:meta])* $variant:ident => $lit:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        pub enum $name {
            $($(#[$vmeta])* #[serde(rename = $lit)] $variant),+
        }

        impl $name {
            /// Parse a literal, ignoring case and surrounding whitespace.
            pub fn parse(raw: &str) -> Option<Self> {
                let key = raw.trim().to_ascii_lowercase();
                match key.as_str() {
                    $($lit => Some(Self::$variant),)+
                    _ => None,
                }
            }

            /// The wire literal for this value.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $lit),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

// -- Executive summary --------------------------------------------------------

literal_enum! {
    /// Overall vehicle condition.
    OverallCondition {
        Excellent => "excellent",
        Good => "good",
        Fair => "fair",
        Poor => "poor",
        Unknown => "unknown",
    }
}

literal_enum! {
    /// Purchase risk.
    RiskLevel {
        Low => "low",
        Medium => "medium",
        High => "high",
        Unknown => "unknown",
    }
}

literal_enum! {
    /// What the buyer should do next.
    RecommendedAction {
        Buy => "buy",
        Negotiate => "negotiate",
        Inspect => "inspect",
        Avoid => "avoid",
    }
}

/// Estimated market value band.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValueRange {
    pub min: f64,
    pub max: f64,
    pub currency: String,
}

impl Default for ValueRange {
    fn default() -> Self {
        Self {
            min: 0.0,
            max: 0.0,
            currency: "USD".to_string(),
        }
    }
}

/// Condensed, decision-oriented view of the report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExecutiveSummary {
    pub overall_condition: OverallCondition,
    pub risk_level: RiskLevel,
    pub recommended_action: RecommendedAction,
    pub key_findings: Vec<String>,
    pub estimated_value: ValueRange,
    /// In `[0, 1]`.
    pub confidence: f64,
}

// -- Sections -----------------------------------------------------------------

literal_enum! {
    /// Identifier of a report section.
    SectionId {
        Vehicle => "vehicle",
        Maintenance => "maintenance",
        Accidents => "accidents",
        Ownership => "ownership",
        Recalls => "recalls",
        Title => "title",
        Insurance => "insurance",
    }
}

impl SectionId {
    /// Every section, in report order.
    pub const ALL: [SectionId; 7] = [
        SectionId::Vehicle,
        SectionId::Maintenance,
        SectionId::Accidents,
        SectionId::Ownership,
        SectionId::Recalls,
        SectionId::Title,
        SectionId::Insurance,
    ];

    /// Human-readable section heading.
    pub fn title(&self) -> &'static str {
        match self {
            Self::Vehicle => "Vehicle Information",
            Self::Maintenance => "Maintenance History",
            Self::Accidents => "Accident History",
            Self::Ownership => "Ownership History",
            Self::Recalls => "Safety Recalls",
            Self::Title => "Title Information",
            Self::Insurance => "Insurance Claims",
        }
    }
}

literal_enum! {
    /// Badge shown next to a section.
    SectionStatus {
        Clean => "clean",
        Warning => "warning",
        Critical => "critical",
        /// The backend supplied no data for the section.
        Unavailable => "unavailable",
    }
}

literal_enum! {
    AccidentSeverity {
        None => "none",
        Minor => "minor",
        Moderate => "moderate",
        Severe => "severe",
        Unknown => "unknown",
    }
}

literal_enum! {
    TitleStatus {
        Clean => "clean",
        Salvage => "salvage",
        Rebuilt => "rebuilt",
        Flood => "flood",
        Lemon => "lemon",
        Unknown => "unknown",
    }
}

literal_enum! {
    /// Aggregate severity across all insurance claims.
    ClaimsSeverity {
        Low => "low",
        Medium => "medium",
        High => "high",
        Unknown => "unknown",
    }
}

literal_enum! {
    /// Severity of a single insurance claim.
    ClaimSeverity {
        Minor => "minor",
        Moderate => "moderate",
        Major => "major",
        Unknown => "unknown",
    }
}

literal_enum! {
    RecallSeverity {
        Safety => "safety",
        Emissions => "emissions",
        Other => "other",
    }
}

literal_enum! {
    RecallStatus {
        Open => "open",
        Completed => "completed",
        Unknown => "unknown",
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VehicleData {
    pub vin: String,
    pub make: String,
    pub model: String,
    pub year: u32,
    pub engine: String,
    pub transmission: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServiceEvent {
    pub date: Option<NaiveDate>,
    pub mileage: u32,
    pub service_type: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaintenanceData {
    pub total_services: u32,
    pub regular_maintenance: bool,
    pub overdue_services: Vec<String>,
    pub last_service: Option<ServiceEvent>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccidentReport {
    pub date: Option<NaiveDate>,
    pub severity: AccidentSeverity,
    pub damage_types: Vec<String>,
    pub estimated_cost: Option<f64>,
    pub location: Option<String>,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AccidentData {
    pub total_accidents: u32,
    pub severity: AccidentSeverity,
    pub structural_damage: bool,
    pub flood_damage: bool,
    pub reports: Vec<AccidentReport>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnershipRecord {
    /// 1-based position in the ownership chain.
    pub owner_number: u32,
    pub duration_months: Option<f64>,
    pub location: Option<String>,
    pub end_reason: Option<String>,
    pub mileage_start: Option<u32>,
    pub mileage_end: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OwnershipData {
    pub total_owners: u32,
    pub average_ownership_months: f64,
    pub commercial_use: bool,
    pub rental_history: bool,
    pub owners: Vec<OwnershipRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecallRecord {
    pub recall_number: String,
    pub date: Option<NaiveDate>,
    pub component: String,
    pub description: String,
    pub severity: RecallSeverity,
    pub status: RecallStatus,
    pub remedy: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecallData {
    pub total_recalls: u32,
    pub open_recalls: u32,
    pub safety_recalls: u32,
    pub recalls: Vec<RecallRecord>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleData {
    pub status: TitleStatus,
    pub issues: Vec<String>,
    pub state_issued: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsuranceClaim {
    pub date: Option<NaiveDate>,
    pub claim_type: String,
    pub amount: Option<f64>,
    pub severity: ClaimSeverity,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsuranceData {
    pub total_claims: u32,
    pub claims_severity: ClaimsSeverity,
    pub claims: Vec<InsuranceClaim>,
}

/// Typed payload of a section, tagged by `type` on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SectionData {
    Vehicle(VehicleData),
    Maintenance(MaintenanceData),
    Accidents(AccidentData),
    Ownership(OwnershipData),
    Recalls(RecallData),
    Title(TitleData),
    Insurance(InsuranceData),
}

impl SectionData {
    /// The section this payload belongs to.
    pub fn section_id(&self) -> SectionId {
        match self {
            Self::Vehicle(_) => SectionId::Vehicle,
            Self::Maintenance(_) => SectionId::Maintenance,
            Self::Accidents(_) => SectionId::Accidents,
            Self::Ownership(_) => SectionId::Ownership,
            Self::Recalls(_) => SectionId::Recalls,
            Self::Title(_) => SectionId::Title,
            Self::Insurance(_) => SectionId::Insurance,
        }
    }
}

/// One categorized subdivision of a report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportSection {
    pub id: SectionId,
    pub title: String,
    pub status: SectionStatus,
    pub summary: String,
    pub data: SectionData,
    pub last_updated: Option<DateTime<Utc>>,
}

// -- Metadata -----------------------------------------------------------------

/// Coverage and reliability attributed to one data provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataSource {
    pub name: String,
    pub coverage: f64,
    pub reliability: f64,
    pub last_update: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportMetadata {
    /// Normalized confidence, in `[0, 1]`.
    pub data_quality: f64,
    /// Fraction of canonical sections that were present and non-empty.
    pub data_completion: f64,
    pub last_data_update: Option<DateTime<Utc>>,
    pub sources: Vec<DataSource>,
    /// Wall-clock time from submission to transformation, when measured.
    pub processing_time_ms: Option<u64>,
}

// -- Report -------------------------------------------------------------------

/// A complete, validated vehicle-history report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub vin: Vin,
    pub generated_at: Option<DateTime<Utc>>,
    pub providers_used: Vec<String>,
    /// Normalized confidence, in `[0, 1]`.
    pub confidence: f64,
    pub executive_summary: ExecutiveSummary,
    pub sections: Vec<ReportSection>,
    pub metadata: ReportMetadata,
}

impl Report {
    /// Look up a section by id.
    pub fn section(&self, id: SectionId) -> Option<&ReportSection> {
        self.sections.iter().find(|s| s.id == id)
    }
}
