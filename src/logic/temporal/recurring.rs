//! Daily / weekly recurring patterns

use std::collections::BTreeMap;

use chrono::{Datelike, Timelike};

use super::types::{RecurringBucket, RecurringPatterns};
use crate::logic::stats::{mean, median};
use crate::logic::traffic::TimeWindow;

const WEEKDAYS: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

fn buckets<F, L>(windows: &[TimeWindow], key_of: F, label_of: L) -> Vec<RecurringBucket>
where
    F: Fn(&TimeWindow) -> u32,
    L: Fn(u32) -> String,
{
    let mut grouped: BTreeMap<u32, Vec<f64>> = BTreeMap::new();
    for w in windows {
        grouped.entry(key_of(w)).or_default().push(w.total_bytes as f64);
    }
    grouped
        .into_iter()
        .map(|(key, values)| RecurringBucket {
            key,
            label: label_of(key),
            window_count: values.len(),
            mean_bytes: mean(&values),
            median_bytes: median(&values),
        })
        .collect()
}

/// Group windows by hour-of-day and by weekday of their start
pub fn extract_recurring(windows: &[TimeWindow]) -> RecurringPatterns {
    RecurringPatterns {
        daily: buckets(windows, |w| w.start.hour(), |h| format!("{:02}:00", h)),
        weekly: buckets(
            windows,
            |w| w.start.weekday().num_days_from_monday(),
            |d| WEEKDAYS[d as usize % 7].to_string(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::fixtures::{spike_records, BASE_TS};
    use crate::logic::traffic::aggregate;

    #[test]
    fn test_daily_and_weekly_buckets() {
        let windows = aggregate(&spike_records(), 3600).unwrap();
        let patterns = extract_recurring(&windows);

        assert_eq!(patterns.daily.len(), 24);
        assert!(patterns.daily.iter().all(|b| b.window_count == 2));
        assert_eq!(patterns.daily[0].label, "00:00");

        // 2024-01-01 is a Monday; 48 hours span Mon and Tue
        assert_eq!(BASE_TS % 86_400, 0);
        assert_eq!(patterns.weekly.len(), 2);
        assert_eq!(patterns.weekly[0].label, "Mon");
        assert_eq!(patterns.weekly[1].window_count, 24);
    }
}
