use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Budget years kept during aggregation; everything else in the
/// serialized annual-budget field is ignored.
pub const VALID_YEARS: [&str; 4] = ["2021", "2022", "2023", "2024"];

/// Year assigned when a contractor row has no usable last-contract year.
pub const FALLBACK_YEAR: i32 = 2024;

/// A public-sector contracting authority.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    /// Municipality or department; "Indeterminate" when the source has no
    /// location-like column.
    pub municipality: String,
    /// Total historical budget in local currency. Zero when missing.
    pub total_budget: f64,
    pub contract_count: u64,
    /// Legal risk exposure as a percentage, clamped to [0, 100].
    pub legal_risk_pct: f64,
    /// Year → budgeted amount, restricted to [`VALID_YEARS`].
    pub annual_budget: BTreeMap<String, f64>,
}

/// A vendor/provider awarded one or more contracts.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Contractor {
    pub name: String,
    pub tax_id: String,
    pub risk: RiskLevel,
    pub verdict: Verdict,
    pub affiliation: String,
    pub health_regime: String,
    /// Free-text back-reference to the contracting entity. Matched against
    /// entity names by substring, not by key.
    pub entity: String,
    pub last_contract_year: i32,
}

/// Bounded alert severity derived from the source compliance flag.
/// Anything outside the known vocabulary collapses to [`RiskLevel::Ok`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum RiskLevel {
    Critical,
    High,
    Medium,
    Low,
    Ok,
}

impl RiskLevel {
    pub const ALL: [RiskLevel; 5] = [
        RiskLevel::Critical,
        RiskLevel::High,
        RiskLevel::Medium,
        RiskLevel::Low,
        RiskLevel::Ok,
    ];
}

impl std::fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RiskLevel::Critical => write!(f, "CRITICAL"),
            RiskLevel::High => write!(f, "HIGH"),
            RiskLevel::Medium => write!(f, "MEDIUM"),
            RiskLevel::Low => write!(f, "LOW"),
            RiskLevel::Ok => write!(f, "OK"),
        }
    }
}

/// Policy outcome for a contractor, derived from its risk level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// Requires attention; shown first in every report.
    Flag,
    /// Worth reviewing but not alarming.
    Review,
    /// Nothing to act on.
    Clear,
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Flag => write!(f, "flag"),
            Verdict::Review => write!(f, "review"),
            Verdict::Clear => write!(f, "clear"),
        }
    }
}

/// Where the contractor table comes from: a gzipped delimited file or a
/// local SQLite store (later dataset revisions ship the latter).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ContractorSource {
    CsvGz(PathBuf),
    Sqlite(PathBuf),
}

impl ContractorSource {
    pub fn path(&self) -> &std::path::Path {
        match self {
            ContractorSource::CsvGz(p) | ContractorSource::Sqlite(p) => p,
        }
    }
}

impl std::fmt::Display for ContractorSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ContractorSource::CsvGz(p) => write!(f, "csv.gz ({})", p.display()),
            ContractorSource::Sqlite(p) => write!(f, "sqlite ({})", p.display()),
        }
    }
}
