//! The five read operations behind the HTTP routes.
//!
//! `QueryService` owns the date arithmetic and result shaping; the repository
//! only answers fixed reads. Nothing is cached: every call recomputes the
//! latest date, the cutoff, and the most active station.

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::debug;

use crate::analysis::collapse_by_date;
use crate::logging::DataSource;
use crate::model::{
    PrecipitationByDate, QueryError, RepositoryError, TemperatureSummary, format_date, parse_date,
    year_ago,
};
use crate::repository::MeasurementRepository;
use crate::stations::most_active_station;

pub const ROUTE_PRECIPITATION: &str = "/api/v1.0/precipitation";
pub const ROUTE_STATIONS: &str = "/api/v1.0/stations";
pub const ROUTE_TOBS: &str = "/api/v1.0/tobs";
pub const ROUTE_START: &str = "/api/v1.0/<start>";
pub const ROUTE_START_END: &str = "/api/v1.0/<start>/<end>";

/// Every route the API serves besides the index, in display order.
pub static AVAILABLE_ROUTES: &[&str] = &[
    ROUTE_PRECIPITATION,
    ROUTE_STATIONS,
    ROUTE_TOBS,
    ROUTE_START,
    ROUTE_START_END,
];

#[derive(Clone)]
pub struct QueryService {
    repo: Arc<dyn MeasurementRepository>,
}

impl QueryService {
    pub fn new(repo: Arc<dyn MeasurementRepository>) -> Self {
        Self { repo }
    }

    pub fn list_routes(&self) -> &'static [&'static str] {
        AVAILABLE_ROUTES
    }

    /// Latest measurement date and the cutoff a year before it.
    /// `None` when the dataset has no measurements.
    fn year_window(&self) -> Result<Option<(NaiveDate, String)>, QueryError> {
        let Some(raw) = self.repo.latest_date()? else {
            return Ok(None);
        };
        let latest = parse_date(&raw).map_err(|_| {
            RepositoryError::MalformedRow(format!("measurement.date '{}' is not YYYY-MM-DD", raw))
        })?;
        Ok(Some((latest, format_date(year_ago(latest)))))
    }

    /// Date → precipitation for the last 12 months of data.
    pub fn precipitation(&self) -> Result<PrecipitationByDate, QueryError> {
        let Some((latest, cutoff)) = self.year_window()? else {
            debug!(source = %DataSource::Database, "no measurements; empty precipitation");
            return Ok(PrecipitationByDate::new());
        };
        let rows = self.repo.precipitation_since(&cutoff)?;
        debug!(
            source = %DataSource::Database,
            "precipitation: latest={} cutoff={} rows={}",
            latest,
            cutoff,
            rows.len()
        );
        Ok(collapse_by_date(rows))
    }

    pub fn stations(&self) -> Result<Vec<String>, QueryError> {
        Ok(self.repo.station_codes()?)
    }

    /// tobs of the most active station over the last 12 months of data.
    pub fn recent_temperatures(&self) -> Result<Vec<f64>, QueryError> {
        let Some((_, cutoff)) = self.year_window()? else {
            return Ok(Vec::new());
        };
        let activity = self.repo.station_activity()?;
        let Some(station) = most_active_station(&activity) else {
            return Ok(Vec::new());
        };
        debug!(source = %DataSource::Database, station, cutoff = %cutoff, "most active station selected");
        Ok(self.repo.temperatures_since(station, &cutoff)?)
    }

    /// Min/avg/max tobs from `start` onward, or within `start..=end`.
    ///
    /// An empty window yields null aggregates, not an error.
    pub fn temperature_summary(
        &self,
        start: &str,
        end: Option<&str>,
    ) -> Result<TemperatureSummary, QueryError> {
        let start = format_date(parse_date(start)?);
        let end = end.map(parse_date).transpose()?.map(format_date);

        let stats = self.repo.temperature_stats(&start, end.as_deref())?;

        Ok(TemperatureSummary {
            start_date: start,
            end_date: end,
            min_temp: stats.min,
            avg_temp: stats.avg,
            max_temp: stats.max,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
