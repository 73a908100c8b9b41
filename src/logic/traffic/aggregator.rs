//! Traffic Aggregator
//!
//! Buckets records into epoch-aligned windows of fixed length.
//! Bucket assignment is one sequential pass; per-window metrics are
//! computed in parallel and collected back in window order.

use std::collections::HashSet;

use chrono::{DateTime, Duration, TimeZone, Utc};
use rayon::prelude::*;

use super::types::{TimeWindow, TrafficRecord};
use crate::constants::DEFAULT_MAX_WINDOWS;
use crate::logic::error::{AnalysisError, Result};

/// Windows plus the records that fell into each of them
#[derive(Debug, Clone)]
pub struct WindowedTraffic<'a> {
    pub window_secs: i64,
    pub windows: Vec<TimeWindow>,
    /// `partition[i]` holds the records of `windows[i]`, in input order
    pub partition: Vec<Vec<&'a TrafficRecord>>,
}

impl<'a> WindowedTraffic<'a> {
    pub fn empty(window_secs: i64) -> Self {
        Self {
            window_secs,
            windows: Vec::new(),
            partition: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.windows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.windows.len()
    }

    /// Total bytes per window, in window order
    pub fn byte_series(&self) -> Vec<f64> {
        self.windows.iter().map(|w| w.total_bytes as f64).collect()
    }

    pub fn records(&self, index: usize) -> &[&'a TrafficRecord] {
        self.partition.get(index).map(|v| v.as_slice()).unwrap_or(&[])
    }
}

/// Aggregate records into windows of `window_secs` seconds
pub fn aggregate(records: &[TrafficRecord], window_secs: i64) -> Result<Vec<TimeWindow>> {
    Ok(partition(records, window_secs)?.windows)
}

/// Aggregate and keep the per-window record partition
pub fn partition(records: &[TrafficRecord], window_secs: i64) -> Result<WindowedTraffic<'_>> {
    partition_bounded(records, window_secs, DEFAULT_MAX_WINDOWS)
}

/// `partition` that refuses to allocate more than `max_windows` windows
pub fn partition_bounded(
    records: &[TrafficRecord],
    window_secs: i64,
    max_windows: usize,
) -> Result<WindowedTraffic<'_>> {
    if window_secs <= 0 {
        return Err(AnalysisError::InvalidWindow { secs: window_secs });
    }
    let window_ms = window_secs
        .checked_mul(1000)
        .ok_or(AnalysisError::InvalidWindow { secs: window_secs })?;

    let (min_ms, max_ms) = match records
        .iter()
        .map(|r| r.timestamp.timestamp_millis())
        .fold(None, |acc: Option<(i64, i64)>, ms| match acc {
            None => Some((ms, ms)),
            Some((lo, hi)) => Some((lo.min(ms), hi.max(ms))),
        }) {
        Some(bounds) => bounds,
        None => return Ok(WindowedTraffic::empty(window_secs)),
    };

    let first_slot = min_ms.div_euclid(window_ms);
    let last_slot = max_ms.div_euclid(window_ms);
    let span = last_slot.saturating_sub(first_slot).saturating_add(1);
    let window_count = usize::try_from(span)
        .ok()
        .filter(|&n| n <= max_windows)
        .ok_or(AnalysisError::TooManyWindows {
            windows: span,
            limit: max_windows,
        })?;

    // Sequential bucket assignment
    let mut buckets: Vec<Vec<&TrafficRecord>> = vec![Vec::new(); window_count];
    for record in records {
        let slot = record.timestamp.timestamp_millis().div_euclid(window_ms) - first_slot;
        buckets[slot as usize].push(record);
    }

    let length = Duration::milliseconds(window_ms);
    let starts = (0..window_count)
        .map(|i| slot_start(first_slot + i as i64, window_ms, window_secs))
        .collect::<Result<Vec<_>>>()?;

    let windows: Vec<TimeWindow> = buckets
        .par_iter()
        .zip(starts.par_iter())
        .enumerate()
        .map(|(index, (bucket, start))| summarize(index, *start, length, bucket))
        .collect();

    log::debug!(
        "Aggregated {} records into {} windows of {}s",
        records.len(),
        windows.len(),
        window_secs
    );

    Ok(WindowedTraffic {
        window_secs,
        windows,
        partition: buckets,
    })
}

fn slot_start(slot: i64, window_ms: i64, window_secs: i64) -> Result<DateTime<Utc>> {
    slot.checked_mul(window_ms)
        .and_then(|ms| Utc.timestamp_millis_opt(ms).single())
        .ok_or(AnalysisError::InvalidWindow { secs: window_secs })
}

fn summarize(index: usize, start: DateTime<Utc>, length: Duration, bucket: &[&TrafficRecord]) -> TimeWindow {
    let mut window = TimeWindow::empty(index, start, length);
    if bucket.is_empty() {
        return window;
    }

    let mut sources = HashSet::new();
    let mut destinations = HashSet::new();
    for record in bucket {
        window.total_bytes = window.total_bytes.saturating_add(record.bytes);
        window.total_packets = window.total_packets.saturating_add(record.packets);
        sources.insert(record.source_ip.as_str());
        destinations.insert(record.destination_ip.as_str());
    }
    window.record_count = bucket.len();
    window.unique_sources = sources.len();
    window.unique_destinations = destinations.len();
    window
}
