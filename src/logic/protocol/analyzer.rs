//! Protocol Distribution Analyzer

use std::collections::BTreeMap;

use super::types::*;
use crate::logic::stats::{mean, normalized_entropy, sample_std_dev, shannon_entropy};
use crate::logic::traffic::TrafficRecord;

/// Protocol histogram and (normalized) entropy of any record subset
pub fn protocol_entropy<'a, I>(records: I) -> (f64, f64, usize)
where
    I: IntoIterator<Item = &'a TrafficRecord>,
{
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for r in records {
        *counts.entry(r.protocol.as_str()).or_insert(0) += 1;
    }
    let k = counts.len();
    let h = shannon_entropy(counts.into_values());
    (h, normalized_entropy(h, k), k)
}

pub fn protocol_statistics(records: &[TrafficRecord]) -> BTreeMap<String, ProtocolStats> {
    let mut grouped: BTreeMap<&str, Vec<&TrafficRecord>> = BTreeMap::new();
    for r in records {
        grouped.entry(r.protocol.as_str()).or_default().push(r);
    }

    grouped
        .into_iter()
        .map(|(protocol, group)| {
            let bytes: Vec<f64> = group.iter().map(|r| r.bytes as f64).collect();
            let packets: Vec<f64> = group.iter().map(|r| r.packets as f64).collect();
            let stats = ProtocolStats {
                protocol: protocol.to_string(),
                record_count: group.len(),
                bytes_sum: group.iter().fold(0u64, |acc, r| acc.saturating_add(r.bytes)),
                bytes_mean: mean(&bytes),
                bytes_std: sample_std_dev(&bytes),
                packets_sum: group.iter().fold(0u64, |acc, r| acc.saturating_add(r.packets)),
                packets_mean: mean(&packets),
                packets_std: sample_std_dev(&packets),
            };
            (protocol.to_string(), stats)
        })
        .collect()
}

/// (protocol, port) pairs that are rare in this batch or absent from `reference`
pub fn unusual_combinations(
    records: &[TrafficRecord],
    rarity_threshold: f64,
    reference: Option<&ReferenceCombinations>,
) -> Vec<UnusualCombination> {
    if records.is_empty() {
        return Vec::new();
    }
    let mut counts: BTreeMap<(&str, u16), usize> = BTreeMap::new();
    for r in records {
        *counts.entry((r.protocol.as_str(), r.port)).or_insert(0) += 1;
    }
    let total = records.len() as f64;

    counts
        .into_iter()
        .filter_map(|((protocol, port), count)| {
            let frequency = count as f64 / total;
            let unseen = reference
                .map(|known| !known.contains(&(protocol.to_string(), port)))
                .unwrap_or(false);
            let reason = if unseen {
                UnusualReason::Unseen
            } else if frequency < rarity_threshold {
                UnusualReason::Rare
            } else {
                return None;
            };
            Some(UnusualCombination {
                protocol: protocol.to_string(),
                port,
                count,
                frequency,
                reason,
            })
        })
        .collect()
}

pub fn analyze_protocols(
    records: &[TrafficRecord],
    rarity_threshold: f64,
    reference: Option<&ReferenceCombinations>,
) -> ProtocolAnalysis {
    let (entropy, normalized, k) = protocol_entropy(records);
    let unusual = unusual_combinations(records, rarity_threshold, reference);
    log::debug!(
        "Protocol mix: {} protocols, H = {:.3} nats ({:.2} normalized), {} unusual pairs",
        k,
        entropy,
        normalized,
        unusual.len()
    );
    ProtocolAnalysis {
        statistics: protocol_statistics(records),
        entropy,
        normalized_entropy: normalized,
        unusual_combinations: unusual,
    }
}
