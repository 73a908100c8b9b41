//! Traffic Module - records, windowing and per-window patterns
//!
//! ## Structure
//! - `types`: `TrafficRecord`, `RawTrafficRecord`, `TimeWindow`, `TrafficPattern`
//! - `aggregator`: epoch-aligned windowing with per-window record partition
//! - `pattern`: pattern shapes and final pattern construction

pub mod types;
pub mod aggregator;
pub mod pattern;
#[cfg(test)]
mod tests;

pub use types::{RawTrafficRecord, TimeWindow, TrafficPattern, TrafficRecord};
pub use aggregator::{aggregate, partition, partition_bounded, WindowedTraffic};
pub use pattern::{build_patterns, pattern_risk, shapes, PatternShape};

use crate::logic::error::{AnalysisError, AnalysisWarning, Result};

/// Validate raw records, skipping malformed ones.
/// Returns the valid records and one warning per skipped record.
pub fn ingest(raw: Vec<RawTrafficRecord>) -> (Vec<TrafficRecord>, Vec<AnalysisWarning>) {
    let mut records = Vec::with_capacity(raw.len());
    let mut warnings = Vec::new();

    for (index, item) in raw.into_iter().enumerate() {
        match item.into_record(index) {
            Ok(record) => records.push(record),
            Err(err) => {
                log::warn!("Skipping record: {}", err);
                if let Ok(w) = AnalysisWarning::try_from(err) {
                    warnings.push(w);
                }
            }
        }
    }

    if !warnings.is_empty() {
        log::info!("Ingested {} records, skipped {}", records.len(), warnings.len());
    }
    (records, warnings)
}

/// Strict variant: first malformed record fails the batch
pub fn ingest_strict(raw: Vec<RawTrafficRecord>) -> Result<Vec<TrafficRecord>> {
    raw.into_iter()
        .enumerate()
        .map(|(index, item)| item.into_record(index))
        .collect::<std::result::Result<Vec<_>, AnalysisError>>()
}
