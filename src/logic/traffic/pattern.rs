//! Traffic Pattern Builder
//!
//! One `TrafficPattern` per non-empty window. Shape metrics are available
//! before scoring so the pattern check can compare windows; the final
//! pattern is built once the window's anomaly scores are known.

use std::collections::{BTreeMap, BTreeSet};

use chrono::Timelike;
use serde::{Deserialize, Serialize};

use super::aggregator::WindowedTraffic;
use super::types::{TimeWindow, TrafficPattern, TrafficRecord};
use crate::logic::stats::combine_scores;

/// Shape metrics of a window compared by the pattern check
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatternShape {
    pub window_index: usize,
    /// Hour-of-day bucket of the window start (0..24)
    pub hour: u32,
    pub unique_peers: usize,
    pub average_packet_size: f64,
}

impl PatternShape {
    pub fn of(window: &TimeWindow, records: &[&TrafficRecord]) -> Self {
        let peers: BTreeSet<&str> = records
            .iter()
            .flat_map(|r| [r.source_ip.as_str(), r.destination_ip.as_str()])
            .collect();
        Self {
            window_index: window.index,
            hour: window.start.hour(),
            unique_peers: peers.len(),
            average_packet_size: window.avg_packet_size(),
        }
    }
}

/// Shapes of every non-empty window, in window order
pub fn shapes(traffic: &WindowedTraffic<'_>) -> Vec<PatternShape> {
    traffic
        .windows
        .iter()
        .filter(|w| !w.is_empty())
        .map(|w| PatternShape::of(w, traffic.records(w.index)))
        .collect()
}

/// Risk score in [0, 10] from a window's anomaly scores
pub fn pattern_risk(scores: &[f64]) -> f64 {
    10.0 * combine_scores(scores.iter().copied())
}

/// Build the final patterns; `scores` maps window index to anomaly scores
pub fn build_patterns(
    traffic: &WindowedTraffic<'_>,
    scores: &BTreeMap<usize, Vec<f64>>,
) -> Vec<TrafficPattern> {
    traffic
        .windows
        .iter()
        .filter(|w| !w.is_empty())
        .enumerate()
        .map(|(seq, window)| {
            let records = traffic.records(window.index);
            let mut protocols = BTreeMap::new();
            let mut ports = BTreeMap::new();
            for r in records {
                *protocols.entry(r.protocol.clone()).or_insert(0) += 1;
                *ports.entry(r.port).or_insert(0) += 1;
            }
            let risk = scores
                .get(&window.index)
                .map(|s| pattern_risk(s))
                .unwrap_or(0.0);

            TrafficPattern {
                pattern_id: format!("pattern_{:04}", seq),
                window_index: window.index,
                start_time: window.start,
                end_time: window.end,
                source_ips: records.iter().map(|r| r.source_ip.clone()).collect(),
                destination_ips: records.iter().map(|r| r.destination_ip.clone()).collect(),
                protocols,
                ports,
                bytes_transferred: window.total_bytes,
                packet_count: window.total_packets,
                average_packet_size: window.avg_packet_size(),
                risk_score: risk,
            }
        })
        .collect()
}
