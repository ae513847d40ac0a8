/// Data shaping helpers for the climate API.
///
/// Pure functions over rows already read from the store. The Postgres
/// repository pushes aggregation into SQL; these are what the in-memory
/// repository and the query layer use, and they define the reference
/// semantics both must agree on.

use crate::model::{PrecipitationByDate, TemperatureStats};

/// Builds the date → precipitation mapping from `(date, prcp)` rows.
///
/// Rows are applied in order, so when several stations report the same date
/// the last one read wins. Null precipitation is kept as `None`.
pub fn collapse_by_date<I>(rows: I) -> PrecipitationByDate
where
    I: IntoIterator<Item = (String, Option<f64>)>,
{
    let mut by_date = PrecipitationByDate::new();
    for (date, prcp) in rows {
        by_date.insert(date, prcp);
    }
    by_date
}

/// Min, average and max of a set of temperature observations.
///
/// Returns all-`None` for an empty input rather than an error.
pub fn summarize_temperatures<I>(values: I) -> TemperatureStats
where
    I: IntoIterator<Item = f64>,
{
    let mut count = 0usize;
    let mut sum = 0.0;
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;

    for value in values {
        count += 1;
        sum += value;
        min = min.min(value);
        max = max.max(value);
    }

    if count == 0 {
        return TemperatureStats::default();
    }

    TemperatureStats {
        min: Some(min),
        avg: Some(sum / count as f64),
        max: Some(max),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_collapse_keeps_last_row_for_shared_date() {
        let rows = vec![
            ("2017-08-23".to_string(), Some(0.0)),
            ("2017-08-22".to_string(), Some(0.5)),
            ("2017-08-23".to_string(), Some(0.45)),
        ];
        let by_date = collapse_by_date(rows);
        assert_eq!(by_date.len(), 2);
        assert_eq!(by_date["2017-08-23"], Some(0.45));
    }

    #[test]
    fn test_collapse_keeps_null_precipitation() {
        let by_date = collapse_by_date(vec![("2017-08-20".to_string(), None)]);
        assert_eq!(by_date.get("2017-08-20"), Some(&None));
    }

    #[test]
    fn test_collapse_null_can_overwrite_value() {
        let by_date = collapse_by_date(vec![
            ("2017-08-20".to_string(), Some(0.1)),
            ("2017-08-20".to_string(), None),
        ]);
        assert_eq!(by_date["2017-08-20"], None);
    }

    #[test]
    fn test_summarize_fifty_sixty_seventy() {
        let stats = summarize_temperatures(vec![50.0, 60.0, 70.0]);
        assert_eq!(stats.min, Some(50.0));
        assert_eq!(stats.avg, Some(60.0));
        assert_eq!(stats.max, Some(70.0));
    }

    #[test]
    fn test_summarize_empty_is_all_none() {
        assert_eq!(summarize_temperatures(Vec::new()), TemperatureStats::default());
    }

    #[test]
    fn test_summarize_single_value() {
        let stats = summarize_temperatures(vec![72.0]);
        assert_eq!(stats.min, stats.max);
        assert_eq!(stats.avg, Some(72.0));
    }

    #[test]
    fn test_summarize_orders_min_avg_max() {
        let stats = summarize_temperatures(vec![81.0, 56.0, 74.0, 62.0, 77.0]);
        let (min, avg, max) = (stats.min.unwrap(), stats.avg.unwrap(), stats.max.unwrap());
        assert!(min <= avg && avg <= max);
    }
}
