/// Station activity ranking.
///
/// "Most active" means the station with the most measurement rows. The store
/// hands back one `StationActivity` per station in whatever order its
/// `GROUP BY` produces; the ranking here is independent of that order.

use crate::model::StationActivity;
use std::cmp::Ordering;

/// Orders stations from most to least active.
///
/// Higher count first; equal counts fall back to the lexicographically
/// smallest station code so the result never depends on the store.
pub fn activity_order(a: &StationActivity, b: &StationActivity) -> Ordering {
    b.count
        .cmp(&a.count)
        .then_with(|| a.station.cmp(&b.station))
}

/// Returns a copy of `activity` sorted by `activity_order`.
pub fn rank_by_activity(activity: &[StationActivity]) -> Vec<StationActivity> {
    let mut ranked = activity.to_vec();
    ranked.sort_by(activity_order);
    ranked
}

/// Picks the most active station. Returns `None` for an empty dataset.
pub fn most_active_station(activity: &[StationActivity]) -> Option<&str> {
    activity
        .iter()
        .min_by(|a, b| activity_order(a, b))
        .map(|a| a.station.as_str())
}

/// Station codes that appear more than once, in first-seen order.
pub fn duplicate_codes<'a>(codes: &'a [String]) -> Vec<&'a str> {
    let mut seen = std::collections::HashSet::new();
    let mut duplicates = Vec::new();
    for code in codes {
        if !seen.insert(code.as_str()) && !duplicates.contains(&code.as_str()) {
            duplicates.push(code.as_str());
        }
    }
    duplicates
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
