//! Read-only access to the station/measurement dataset.
//!
//! `MeasurementRepository` is the seam between the query layer and the store.
//! The query layer owns date arithmetic, ranking and response shaping; a
//! repository only answers fixed reads. Every method returns rows in natural
//! row order (ascending `id`).
//!
//! Implementations:
//! - `postgres`: the production store.
//! - `memory`: a fixed in-process snapshot, used by tests and fixtures.

pub mod memory;
pub mod postgres;

pub use memory::InMemoryRepository;
pub use postgres::PostgresRepository;

use crate::model::{DatasetProfile, RepositoryError, StationActivity, TemperatureStats};

pub trait MeasurementRepository: Send + Sync {
    /// `MAX(measurement.date)`, or `None` when there are no measurements.
    fn latest_date(&self) -> Result<Option<String>, RepositoryError>;

    /// `(date, prcp)` for every measurement with `date >= cutoff`.
    fn precipitation_since(
        &self,
        cutoff: &str,
    ) -> Result<Vec<(String, Option<f64>)>, RepositoryError>;

    /// Every station code in the `station` table.
    fn station_codes(&self) -> Result<Vec<String>, RepositoryError>;

    /// Measurement row count per station code. Order is unspecified.
    fn station_activity(&self) -> Result<Vec<StationActivity>, RepositoryError>;

    /// tobs for one station with `date >= cutoff`.
    fn temperatures_since(&self, station: &str, cutoff: &str)
    -> Result<Vec<f64>, RepositoryError>;

    /// Min/avg/max tobs over `start <= date [<= end]`, both bounds inclusive.
    fn temperature_stats(
        &self,
        start: &str,
        end: Option<&str>,
    ) -> Result<TemperatureStats, RepositoryError>;

    /// Whole-dataset counts for the verification report.
    fn profile(&self) -> Result<DatasetProfile, RepositoryError>;
}
