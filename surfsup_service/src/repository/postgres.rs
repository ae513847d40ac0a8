/// Postgres-backed dataset reader.
///
/// One `postgres::Client` is opened at startup and shared behind a mutex;
/// reads are serialized on that single session. The client is synchronous,
/// so callers inside an async runtime must go through `spawn_blocking`.
///
/// Dates are stored as `YYYY-MM-DD` TEXT and compared as strings.

use super::MeasurementRepository;
use crate::logging::{self, DataSource};
use crate::model::{DatasetProfile, RepositoryError, StationActivity, TemperatureStats};
use postgres::Client;
use std::error::Error as _;
use std::sync::{Mutex, MutexGuard};

const LATEST_DATE_SQL: &str = "SELECT MAX(date) FROM measurement";

const PRECIPITATION_SQL: &str = "
    SELECT date, prcp
    FROM measurement
    WHERE date >= $1
    ORDER BY id
";

const STATION_CODES_SQL: &str = "SELECT station FROM station ORDER BY id";

const STATION_ACTIVITY_SQL: &str = "
    SELECT station, COUNT(*)
    FROM measurement
    GROUP BY station
";

const TEMPERATURES_SQL: &str = "
    SELECT tobs
    FROM measurement
    WHERE station = $1
      AND date >= $2
    ORDER BY id
";

const STATS_FROM_SQL: &str = "
    SELECT MIN(tobs), AVG(tobs), MAX(tobs)
    FROM measurement
    WHERE date >= $1
";

const STATS_BETWEEN_SQL: &str = "
    SELECT MIN(tobs), AVG(tobs), MAX(tobs)
    FROM measurement
    WHERE date >= $1
      AND date <= $2
";

const PROFILE_SQL: &str = "
    SELECT
        (SELECT COUNT(*) FROM station),
        (SELECT COUNT(*) FROM measurement),
        (SELECT MIN(date) FROM measurement),
        (SELECT MAX(date) FROM measurement),
        (SELECT COUNT(DISTINCT station) FROM measurement),
        (SELECT COUNT(*) FROM measurement m
            WHERE NOT EXISTS (SELECT 1 FROM station s WHERE s.station = m.station)),
        (SELECT COUNT(*) FROM measurement WHERE prcp IS NULL),
        (SELECT COUNT(*) FROM (
            SELECT station FROM station GROUP BY station HAVING COUNT(*) > 1
        ) dup)
";

pub struct PostgresRepository {
    client: Mutex<Client>,
}

impl PostgresRepository {
    pub fn new(client: Client) -> Self {
        Self {
            client: Mutex::new(client),
        }
    }

    fn client(&self) -> Result<MutexGuard<'_, Client>, RepositoryError> {
        self.client
            .lock()
            .map_err(|_| RepositoryError::Unavailable("database session lock poisoned".to_string()))
    }

    /// Runs `f` against the shared client, translating driver errors.
    fn with_client<T>(
        &self,
        operation: &str,
        f: impl FnOnce(&mut Client) -> Result<T, postgres::Error>,
    ) -> Result<T, RepositoryError> {
        let mut client = self.client()?;
        f(&mut client).map_err(|e| {
            let err = classify_driver_error(client.is_closed(), &e);
            logging::log_repository_failure(DataSource::Database, operation, &err);
            err
        })
    }
}

/// Maps a driver error onto the repository error kinds.
///
/// A closed session, an I/O failure, or a SQLSTATE class 08 (connection
/// exception) means the store is gone; everything else is a query failure.
pub fn classify_driver_error(client_closed: bool, err: &postgres::Error) -> RepositoryError {
    let io_failure = err
        .source()
        .is_some_and(|source| source.downcast_ref::<std::io::Error>().is_some());
    let connection_class = err
        .code()
        .is_some_and(|state| state.code().starts_with("08"));

    if client_closed || err.is_closed() || io_failure || connection_class {
        RepositoryError::Unavailable(err.to_string())
    } else {
        RepositoryError::Query(err.to_string())
    }
}

impl MeasurementRepository for PostgresRepository {
    fn latest_date(&self) -> Result<Option<String>, RepositoryError> {
        self.with_client("latest_date", |client| {
            let row = client.query_one(LATEST_DATE_SQL, &[])?;
            row.try_get::<_, Option<String>>(0)
        })
    }

    fn precipitation_since(
        &self,
        cutoff: &str,
    ) -> Result<Vec<(String, Option<f64>)>, RepositoryError> {
        self.with_client("precipitation_since", |client| {
            client
                .query(PRECIPITATION_SQL, &[&cutoff])?
                .iter()
                .map(|row| -> Result<_, postgres::Error> { Ok((row.try_get(0)?, row.try_get(1)?)) })
                .collect()
        })
    }

    fn station_codes(&self) -> Result<Vec<String>, RepositoryError> {
        self.with_client("station_codes", |client| {
            client
                .query(STATION_CODES_SQL, &[])?
                .iter()
                .map(|row| row.try_get(0))
                .collect()
        })
    }

    fn station_activity(&self) -> Result<Vec<StationActivity>, RepositoryError> {
        self.with_client("station_activity", |client| {
            client
                .query(STATION_ACTIVITY_SQL, &[])?
                .iter()
                .map(|row| -> Result<_, postgres::Error> {
                    Ok(StationActivity {
                        station: row.try_get(0)?,
                        count: row.try_get(1)?,
                    })
                })
                .collect()
        })
    }

    fn temperatures_since(
        &self,
        station: &str,
        cutoff: &str,
    ) -> Result<Vec<f64>, RepositoryError> {
        self.with_client("temperatures_since", |client| {
            client
                .query(TEMPERATURES_SQL, &[&station, &cutoff])?
                .iter()
                .map(|row| row.try_get(0))
                .collect()
        })
    }

    fn temperature_stats(
        &self,
        start: &str,
        end: Option<&str>,
    ) -> Result<TemperatureStats, RepositoryError> {
        self.with_client("temperature_stats", |client| {
            let row = match end {
                Some(end) => client.query_one(STATS_BETWEEN_SQL, &[&start, &end])?,
                None => client.query_one(STATS_FROM_SQL, &[&start])?,
            };
            Ok(TemperatureStats {
                min: row.try_get(0)?,
                avg: row.try_get(1)?,
                max: row.try_get(2)?,
            })
        })
    }

    fn profile(&self) -> Result<DatasetProfile, RepositoryError> {
        self.with_client("profile", |client| {
            let row = client.query_one(PROFILE_SQL, &[])?;
            Ok(DatasetProfile {
                station_rows: row.try_get(0)?,
                measurement_rows: row.try_get(1)?,
                earliest_date: row.try_get(2)?,
                latest_date: row.try_get(3)?,
                distinct_measurement_stations: row.try_get(4)?,
                orphaned_measurements: row.try_get(5)?,
                null_precipitation_rows: row.try_get(6)?,
                duplicate_station_codes: row.try_get(7)?,
            })
        })
    }
}
