//! Dataset Verification Module
//!
//! Checks the loaded dataset against the assumptions the query layer makes:
//! both tables populated, dates in `YYYY-MM-DD`, every measurement pointing at
//! a known station, station codes unique. None of these are enforced by the
//! service itself, so run this after loading a new snapshot.

use chrono::Utc;
use serde::Serialize;

use crate::model::{DatasetProfile, RepositoryError, StationActivity, parse_date};
use crate::repository::MeasurementRepository;
use crate::stations::rank_by_activity;

/// How many of the most active stations the report lists.
const TOP_STATIONS: usize = 5;

// ============================================================================
// Verification Results
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct VerificationReport {
    pub timestamp: String,
    pub profile: DatasetProfile,
    pub most_active: Vec<StationCount>,
    pub checks: Vec<CheckResult>,
    pub status: VerificationStatus,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct StationCount {
    pub station: String,
    pub measurements: i64,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckResult {
    pub name: &'static str,
    pub status: VerificationStatus,
    pub detail: String,
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq, PartialOrd, Ord)]
pub enum VerificationStatus {
    Success,
    PartialSuccess,
    Failed,
}

impl VerificationReport {
    pub fn passed(&self) -> bool {
        self.status != VerificationStatus::Failed
    }
}

// ============================================================================
// Checks
// ============================================================================

fn check(name: &'static str, status: VerificationStatus, detail: String) -> CheckResult {
    CheckResult {
        name,
        status,
        detail,
    }
}

/// Evaluates every check against a dataset profile.
pub fn evaluate(profile: &DatasetProfile) -> Vec<CheckResult> {
    use VerificationStatus::*;

    let mut checks = Vec::new();

    checks.push(if profile.station_rows > 0 {
        check("stations present", Success, format!("{} rows", profile.station_rows))
    } else {
        check("stations present", Failed, "station table is empty".to_string())
    });

    checks.push(if profile.measurement_rows > 0 {
        check(
            "measurements present",
            Success,
            format!("{} rows", profile.measurement_rows),
        )
    } else {
        check(
            "measurements present",
            Failed,
            "measurement table is empty; year-window routes will return nothing".to_string(),
        )
    });

    let bad_dates: Vec<&str> = [&profile.earliest_date, &profile.latest_date]
        .into_iter()
        .flatten()
        .filter(|d| parse_date(d).is_err())
        .map(String::as_str)
        .collect();
    checks.push(if bad_dates.is_empty() {
        check(
            "date format",
            Success,
            format!(
                "{} .. {}",
                profile.earliest_date.as_deref().unwrap_or("-"),
                profile.latest_date.as_deref().unwrap_or("-")
            ),
        )
    } else {
        check(
            "date format",
            Failed,
            format!("not YYYY-MM-DD: {}", bad_dates.join(", ")),
        )
    });

    checks.push(if profile.orphaned_measurements == 0 {
        check("station references", Success, "all measurements reference a station".to_string())
    } else {
        check(
            "station references",
            PartialSuccess,
            format!("{} measurements reference unknown stations", profile.orphaned_measurements),
        )
    });

    checks.push(if profile.duplicate_station_codes == 0 {
        check("unique station codes", Success, "no duplicates".to_string())
    } else {
        check(
            "unique station codes",
            PartialSuccess,
            format!(
                "{} codes appear more than once; /stations will repeat them",
                profile.duplicate_station_codes
            ),
        )
    });

    checks.push(check(
        "null precipitation",
        Success,
        format!("{} rows (served as null)", profile.null_precipitation_rows),
    ));

    checks
}

/// Worst status across all checks.
pub fn overall_status(checks: &[CheckResult]) -> VerificationStatus {
    checks
        .iter()
        .map(|c| c.status)
        .max()
        .unwrap_or(VerificationStatus::Success)
}

fn top_stations(activity: &[StationActivity]) -> Vec<StationCount> {
    rank_by_activity(activity)
        .into_iter()
        .take(TOP_STATIONS)
        .map(|a| StationCount {
            station: a.station,
            measurements: a.count,
        })
        .collect()
}

// ============================================================================
// Full Verification Runner
// ============================================================================

pub fn run_verification(
    repo: &dyn MeasurementRepository,
) -> Result<VerificationReport, RepositoryError> {
    let profile = repo.profile()?;
    let activity = repo.station_activity()?;
    let checks = evaluate(&profile);
    let status = overall_status(&checks);

    Ok(VerificationReport {
        timestamp: Utc::now().to_rfc3339(),
        profile,
        most_active: top_stations(&activity),
        checks,
        status,
    })
}

pub fn print_summary(report: &VerificationReport) {
    println!("\n═══════════════════════════════════════════════════════════");
    println!("📊 DATASET VERIFICATION");
    println!("═══════════════════════════════════════════════════════════");
    println!();
    for c in &report.checks {
        let mark = match c.status {
            VerificationStatus::Success => "✓",
            VerificationStatus::PartialSuccess => "⚠",
            VerificationStatus::Failed => "✗",
        };
        println!("  {} {:<22} {}", mark, c.name, c.detail);
    }
    println!();
    if !report.most_active.is_empty() {
        println!("Most active stations:");
        for (rank, s) in report.most_active.iter().enumerate() {
            println!("  {}. {}  {} measurements", rank + 1, s.station, s.measurements);
        }
        println!();
    }
    println!("Overall: {:?}", report.status);
    println!("═══════════════════════════════════════════════════════════");
}

// ============================================================================
// Tests
// ============================================================================
