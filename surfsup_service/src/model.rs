/// Core data types for the SurfsUp climate API.
///
/// This module defines the shared domain model imported by all other modules:
/// the two dataset rows, the shapes returned by the query layer, and the
/// error enums. It contains no I/O.

use chrono::{Duration, NaiveDate};
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

// ---------------------------------------------------------------------------
// Date handling
// ---------------------------------------------------------------------------

/// Storage and wire format for every measurement date.
///
/// Zero-padded `YYYY-MM-DD` sorts lexicographically in chronological order,
/// which is what lets the store compare date strings directly.
pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// Length of the "last 12 months" window, in calendar days.
pub const YEAR_WINDOW_DAYS: i64 = 365;

/// Parses a `YYYY-MM-DD` date, returning `QueryError::InvalidDate` on failure.
///
/// The year must be exactly four digits. chrono's `%Y` also takes signed and
/// five-digit years, which would not sort correctly against stored dates.
pub fn parse_date(raw: &str) -> Result<NaiveDate, QueryError> {
    let trimmed = raw.trim();
    if !has_date_shape(trimmed) {
        return Err(QueryError::InvalidDate {
            input: raw.to_string(),
            reason: "not four-digit year, month and day separated by '-'".to_string(),
        });
    }
    NaiveDate::parse_from_str(trimmed, DATE_FORMAT).map_err(|e| QueryError::InvalidDate {
        input: raw.to_string(),
        reason: e.to_string(),
    })
}

/// `DDDD-D[D]-D[D]`, ASCII digits only.
fn has_date_shape(s: &str) -> bool {
    let mut parts = s.split('-');
    let (Some(year), Some(month), Some(day), None) =
        (parts.next(), parts.next(), parts.next(), parts.next())
    else {
        return false;
    };
    let digits = |p: &str| !p.is_empty() && p.bytes().all(|b| b.is_ascii_digit());
    year.len() == 4
        && (1..=2).contains(&month.len())
        && (1..=2).contains(&day.len())
        && [year, month, day].into_iter().all(digits)
}

/// Formats a date the way the store holds it.
pub fn format_date(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

/// `latest − 365 days`, the lower bound for the "last 12 months" queries.
pub fn year_ago(latest: NaiveDate) -> NaiveDate {
    latest - Duration::days(YEAR_WINDOW_DAYS)
}

// ---------------------------------------------------------------------------
// Dataset rows
// ---------------------------------------------------------------------------

/// A weather-reporting location (`station` table).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Station {
    pub id: i32,
    pub station: String, // unique code, e.g. "USC00519281"
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub elevation: f64,
}

/// One daily reading at a station (`measurement` table).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Measurement {
    pub id: i32,
    pub station: String,
    pub date: String, // YYYY-MM-DD
    pub prcp: Option<f64>,
    pub tobs: f64,
}

/// Row count for one station, as produced by `GROUP BY station`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationActivity {
    pub station: String,
    pub count: i64,
}

/// Raw min/avg/max of tobs over a filtered set. All `None` when the set is empty.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TemperatureStats {
    pub min: Option<f64>,
    pub avg: Option<f64>,
    pub max: Option<f64>,
}

// ---------------------------------------------------------------------------
// Response shapes
// ---------------------------------------------------------------------------

/// Date → precipitation for the last 12 months. Dates shared by several
/// stations collapse to the last row read.
pub type PrecipitationByDate = BTreeMap<String, Option<f64>>;

/// Response body for `/api/v1.0/<start>` and `/api/v1.0/<start>/<end>`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TemperatureSummary {
    #[serde(rename = "Start Date")]
    pub start_date: String,
    #[serde(rename = "End Date", skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(rename = "Min Temp")]
    pub min_temp: Option<f64>,
    #[serde(rename = "Avg Temp")]
    pub avg_temp: Option<f64>,
    #[serde(rename = "Max Temp")]
    pub max_temp: Option<f64>,
}

/// Aggregate facts about the loaded dataset, consumed by `verify`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DatasetProfile {
    pub station_rows: i64,
    pub measurement_rows: i64,
    pub earliest_date: Option<String>,
    pub latest_date: Option<String>,
    pub distinct_measurement_stations: i64,
    pub orphaned_measurements: i64,
    pub null_precipitation_rows: i64,
    pub duplicate_station_codes: i64,
}

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Failures of the data-access layer.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// The store could not be reached or the connection was lost.
    #[error("data source unavailable: {0}")]
    Unavailable(String),
    /// A query was rejected or failed while executing.
    #[error("query failed: {0}")]
    Query(String),
    /// A stored value did not match the declared schema.
    #[error("malformed row: {0}")]
    MalformedRow(String),
}

/// Failures surfaced by `QueryService`.
#[derive(Debug, Error)]
pub enum QueryError {
    /// A `<start>`/`<end>` segment is not a valid `YYYY-MM-DD` date.
    #[error("invalid date '{input}', expected YYYY-MM-DD: {reason}")]
    InvalidDate { input: String, reason: String },
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
