//! Behavioral feature extraction from a traffic sample

use std::collections::BTreeSet;

use super::types::{BehaviorSample, BEHAVIOR_FEATURE_COUNT};
use crate::logic::stats::{item_entropy, mean, std_dev, EPSILON};
use crate::logic::traffic::TrafficRecord;

/// Coefficient of variation of inter-arrival gaps (seconds); 0 when undefined
pub fn temporal_regularity(records: &[&TrafficRecord]) -> f64 {
    let mut times: Vec<f64> = records
        .iter()
        .map(|r| r.timestamp.timestamp_millis() as f64 / 1000.0)
        .collect();
    times.sort_by(|a, b| a.total_cmp(b));
    let gaps: Vec<f64> = times.windows(2).map(|w| w[1] - w[0]).collect();
    if gaps.len() < 2 {
        return 0.0;
    }
    let m = mean(&gaps);
    if m <= EPSILON {
        return 0.0;
    }
    std_dev(&gaps) / m
}

/// None for an empty sample
pub fn behavior_sample(records: &[&TrafficRecord], window_index: Option<usize>) -> Option<BehaviorSample> {
    if records.is_empty() {
        return None;
    }
    let protocols: Vec<&str> = records.iter().map(|r| r.protocol.as_str()).collect();
    let ports: Vec<u16> = records.iter().map(|r| r.port).collect();
    let (bytes, packets) = records.iter().fold((0u64, 0u64), |(b, p), r| {
        (b.saturating_add(r.bytes), p.saturating_add(r.packets))
    });
    let destinations: BTreeSet<&str> = records.iter().map(|r| r.destination_ip.as_str()).collect();

    let values: [f64; BEHAVIOR_FEATURE_COUNT] = [
        item_entropy(&protocols),
        item_entropy(&ports),
        (bytes as f64 / packets.max(1) as f64).ln_1p(),
        destinations.len() as f64 / records.len() as f64,
        temporal_regularity(records),
    ];
    Some(BehaviorSample { window_index, values })
}
