/// In-process snapshot of the dataset.
///
/// Holds `Station` and `Measurement` rows exactly as they would sit in the
/// tables and answers every repository read with the same filters the SQL
/// uses: string comparison on `YYYY-MM-DD` dates, natural (id) order.
/// Used by unit tests, router tests, and for serving a fixture file without
/// a database.

use super::MeasurementRepository;
use crate::analysis::summarize_temperatures;
use crate::model::{
    DatasetProfile, Measurement, RepositoryError, Station, StationActivity, TemperatureStats,
    format_date, parse_date,
};
use crate::stations::duplicate_codes;
use serde::Deserialize;
use std::collections::{BTreeMap, HashSet};
use std::path::Path;

#[derive(Debug, Clone, Default)]
pub struct InMemoryRepository {
    stations: Vec<Station>,
    measurements: Vec<Measurement>,
}

/// On-disk fixture layout: `[[station]]` and `[[measurement]]` TOML tables.
#[derive(Debug, Deserialize)]
struct Fixture {
    #[serde(default)]
    station: Vec<FixtureStation>,
    #[serde(default)]
    measurement: Vec<FixtureMeasurement>,
}

#[derive(Debug, Deserialize)]
struct FixtureStation {
    station: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    latitude: f64,
    #[serde(default)]
    longitude: f64,
    #[serde(default)]
    elevation: f64,
}

#[derive(Debug, Deserialize)]
struct FixtureMeasurement {
    station: String,
    date: String,
    prcp: Option<f64>,
    tobs: f64,
}

impl InMemoryRepository {
    /// Builds a snapshot, sorting both tables by id so reads follow natural row order.
    pub fn new(mut stations: Vec<Station>, mut measurements: Vec<Measurement>) -> Self {
        stations.sort_by_key(|s| s.id);
        measurements.sort_by_key(|m| m.id);
        Self {
            stations,
            measurements,
        }
    }

    /// Parses a TOML fixture. Row ids are assigned in file order starting at 1.
    pub fn from_toml_str(raw: &str) -> Result<Self, RepositoryError> {
        let fixture: Fixture = toml::from_str(raw)
            .map_err(|e| RepositoryError::MalformedRow(format!("fixture: {}", e)))?;

        let stations = fixture
            .station
            .into_iter()
            .zip(1..)
            .map(|(s, id)| Station {
                id,
                station: s.station,
                name: s.name,
                latitude: s.latitude,
                longitude: s.longitude,
                elevation: s.elevation,
            })
            .collect();

        let measurements = fixture
            .measurement
            .into_iter()
            .zip(1..)
            .map(|(m, id)| {
                check_stored_date(id, &m.date)?;
                Ok(Measurement {
                    id,
                    station: m.station,
                    date: m.date,
                    prcp: m.prcp,
                    tobs: m.tobs,
                })
            })
            .collect::<Result<Vec<_>, RepositoryError>>()?;

        Ok(Self::new(stations, measurements))
    }

    /// Reads a TOML fixture from disk.
    pub fn from_toml_file(path: &Path) -> Result<Self, RepositoryError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            RepositoryError::Unavailable(format!("cannot read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&raw)
    }

    pub fn stations(&self) -> &[Station] {
        &self.stations
    }

    pub fn measurements(&self) -> &[Measurement] {
        &self.measurements
    }
}

/// Fixture dates must already be in stored form: zero-padded `YYYY-MM-DD`,
/// the same shape the `measurement.date` CHECK constraint enforces.
fn check_stored_date(id: i32, date: &str) -> Result<(), RepositoryError> {
    match parse_date(date) {
        Ok(parsed) if format_date(parsed) == date => Ok(()),
        _ => Err(RepositoryError::MalformedRow(format!(
            "fixture measurement {}: date '{}' is not YYYY-MM-DD",
            id, date
        ))),
    }
}

impl MeasurementRepository for InMemoryRepository {
    fn latest_date(&self) -> Result<Option<String>, RepositoryError> {
        Ok(self.measurements.iter().map(|m| m.date.clone()).max())
    }

    fn precipitation_since(
        &self,
        cutoff: &str,
    ) -> Result<Vec<(String, Option<f64>)>, RepositoryError> {
        Ok(self
            .measurements
            .iter()
            .filter(|m| m.date.as_str() >= cutoff)
            .map(|m| (m.date.clone(), m.prcp))
            .collect())
    }

    fn station_codes(&self) -> Result<Vec<String>, RepositoryError> {
        Ok(self.stations.iter().map(|s| s.station.clone()).collect())
    }

    fn station_activity(&self) -> Result<Vec<StationActivity>, RepositoryError> {
        let mut counts: BTreeMap<&str, i64> = BTreeMap::new();
        for m in &self.measurements {
            *counts.entry(m.station.as_str()).or_default() += 1;
        }
        Ok(counts
            .into_iter()
            .map(|(station, count)| StationActivity {
                station: station.to_string(),
                count,
            })
            .collect())
    }

    fn temperatures_since(
        &self,
        station: &str,
        cutoff: &str,
    ) -> Result<Vec<f64>, RepositoryError> {
        Ok(self
            .measurements
            .iter()
            .filter(|m| m.station == station && m.date.as_str() >= cutoff)
            .map(|m| m.tobs)
            .collect())
    }

    fn temperature_stats(
        &self,
        start: &str,
        end: Option<&str>,
    ) -> Result<TemperatureStats, RepositoryError> {
        let values = self
            .measurements
            .iter()
            .filter(|m| m.date.as_str() >= start)
            .filter(|m| end.is_none_or(|end| m.date.as_str() <= end))
            .map(|m| m.tobs);
        Ok(summarize_temperatures(values))
    }

    fn profile(&self) -> Result<DatasetProfile, RepositoryError> {
        let codes: Vec<String> = self.stations.iter().map(|s| s.station.clone()).collect();
        let known: HashSet<&str> = codes.iter().map(String::as_str).collect();
        let distinct: HashSet<&str> = self.measurements.iter().map(|m| m.station.as_str()).collect();

        Ok(DatasetProfile {
            station_rows: self.stations.len() as i64,
            measurement_rows: self.measurements.len() as i64,
            earliest_date: self.measurements.iter().map(|m| m.date.clone()).min(),
            latest_date: self.latest_date()?,
            distinct_measurement_stations: distinct.len() as i64,
            orphaned_measurements: self
                .measurements
                .iter()
                .filter(|m| !known.contains(m.station.as_str()))
                .count() as i64,
            null_precipitation_rows: self.measurements.iter().filter(|m| m.prcp.is_none()).count()
                as i64,
            duplicate_station_codes: duplicate_codes(&codes).len() as i64,
        })
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"
        [[station]]
        station = "USC00519397"
        name = "WAIKIKI 717.2, HI US"
        latitude = 21.2716
        longitude = -157.8168
        elevation = 3.0

        [[station]]
        station = "USC00519281"
        name = "WAIHEE 837.5, HI US"

        [[measurement]]
        station = "USC00519397"
        date = "2017-08-22"
        prcp = 0.0
        tobs = 82.0

        [[measurement]]
        station = "USC00519281"
        date = "2017-08-23"
        tobs = 76.0

        [[measurement]]
        station = "USC00519281"
        date = "2017-08-21"
        prcp = 0.56
        tobs = 79.0
    "#;

    #[test]
    fn test_fixture_assigns_ids_in_file_order() {
        let repo = InMemoryRepository::from_toml_str(FIXTURE).expect("fixture should parse");
        assert_eq!(repo.stations().len(), 2);
        let ids: Vec<_> = repo.measurements().iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
        assert_eq!(repo.measurements()[1].prcp, None);
    }

    #[test]
    fn test_malformed_fixture_is_rejected() {
        let result = InMemoryRepository::from_toml_str("[[measurement]]\nstation = 5");
        assert!(matches!(result, Err(RepositoryError::MalformedRow(_))));
    }

    #[test]
    fn test_fixture_with_malformed_date_is_rejected_at_load() {
        for date in ["08/23/2017", "2017-8-23", "2017-02-30", "+2017-08-23"] {
            let raw = format!(
                "[[measurement]]\nstation = \"A\"\ndate = \"{}\"\ntobs = 70.0\n",
                date
            );
            let result = InMemoryRepository::from_toml_str(&raw);
            match result {
                Err(RepositoryError::MalformedRow(msg)) => {
                    assert!(msg.contains(date), "message should name the date: {}", msg)
                }
                other => panic!("'{}' should be rejected at load, got {:?}", date, other),
            }
        }
    }

    #[test]
    fn test_missing_fixture_file_is_unavailable() {
        let result = InMemoryRepository::from_toml_file(Path::new("/nonexistent/fixture.toml"));
        assert!(matches!(result, Err(RepositoryError::Unavailable(_))));
    }

    #[test]
    fn test_fixture_file_round_trip_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fixture.toml");
        std::fs::write(&path, FIXTURE).unwrap();
        let repo = InMemoryRepository::from_toml_file(&path).expect("fixture should load");
        assert_eq!(repo.measurements().len(), 3);
    }

    #[test]
    fn test_latest_date_is_max_not_last() {
        let repo = InMemoryRepository::from_toml_str(FIXTURE).unwrap();
        assert_eq!(repo.latest_date().unwrap().as_deref(), Some("2017-08-23"));
    }

    #[test]
    fn test_latest_date_on_empty_dataset() {
        let repo = InMemoryRepository::default();
        assert_eq!(repo.latest_date().unwrap(), None);
    }

    #[test]
    fn test_precipitation_since_is_inclusive_and_in_row_order() {
        let repo = InMemoryRepository::from_toml_str(FIXTURE).unwrap();
        let rows = repo.precipitation_since("2017-08-22").unwrap();
        assert_eq!(
            rows,
            vec![
                ("2017-08-22".to_string(), Some(0.0)),
                ("2017-08-23".to_string(), None),
            ]
        );
    }

    #[test]
    fn test_temperature_stats_bounds_are_inclusive() {
        let repo = InMemoryRepository::from_toml_str(FIXTURE).unwrap();
        let stats = repo
            .temperature_stats("2017-08-21", Some("2017-08-22"))
            .unwrap();
        assert_eq!(stats.min, Some(79.0));
        assert_eq!(stats.max, Some(82.0));
    }

    #[test]
    fn test_profile_counts_orphans_and_nulls() {
        let mut repo = InMemoryRepository::from_toml_str(FIXTURE).unwrap();
        repo.measurements.push(Measurement {
            id: 4,
            station: "USC99999999".to_string(),
            date: "2010-01-01".to_string(),
            prcp: None,
            tobs: 65.0,
        });
        let profile = repo.profile().unwrap();
        assert_eq!(profile.station_rows, 2);
        assert_eq!(profile.measurement_rows, 4);
        assert_eq!(profile.orphaned_measurements, 1);
        assert_eq!(profile.null_precipitation_rows, 2);
        assert_eq!(profile.distinct_measurement_stations, 3);
        assert_eq!(profile.earliest_date.as_deref(), Some("2010-01-01"));
        assert_eq!(profile.duplicate_station_codes, 0);
    }
}
