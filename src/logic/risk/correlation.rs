//! Cross-method correlation of findings

use std::collections::{BTreeMap, BTreeSet};

use super::types::{CorrelatedFinding, CorrelationKind};
use crate::logic::anomaly::{AnomalyKind, AnomalyReport};
use crate::logic::protocol::UnusualCombination;
use crate::logic::spatial::Hotspot;
use crate::logic::temporal::Burst;
use crate::logic::threat::AttackPattern;
use crate::logic::traffic::WindowedTraffic;

pub struct CorrelationInput<'a, 'r> {
    pub traffic: &'a WindowedTraffic<'r>,
    pub anomalies: &'a AnomalyReport,
    pub bursts: &'a [Burst],
    pub hotspots: &'a [Hotspot],
    pub unusual: &'a [UnusualCombination],
    pub attack_patterns: &'a BTreeMap<usize, AttackPattern>,
}

pub fn correlate_findings(input: &CorrelationInput<'_, '_>) -> Vec<CorrelatedFinding> {
    let mut found = Vec::new();
    found.extend(bursts_with_hotspots(input));
    found.extend(protocol_with_unusual(input));
    found.extend(volume_with_behavioral(input));
    found.extend(patterns_with_anomalies(input));
    found.sort_by(|a, b| a.window_index.cmp(&b.window_index).then(a.kind.cmp(&b.kind)));

    if !found.is_empty() {
        log::info!("Correlated {} findings across methods", found.len());
    }
    found
}

fn bursts_with_hotspots(input: &CorrelationInput<'_, '_>) -> Vec<CorrelatedFinding> {
    let hot: BTreeSet<&str> = input.hotspots.iter().map(|h| h.node.as_str()).collect();
    if hot.is_empty() {
        return Vec::new();
    }
    input
        .bursts
        .iter()
        .filter_map(|burst| {
            let involved: BTreeSet<&str> = input
                .traffic
                .records(burst.window_index)
                .iter()
                .flat_map(|r| [r.source_ip.as_str(), r.destination_ip.as_str()])
                .filter(|ip| hot.contains(ip))
                .collect();
            if involved.is_empty() {
                return None;
            }
            Some(CorrelatedFinding {
                kind: CorrelationKind::BurstHotspot,
                window_index: burst.window_index,
                description: format!(
                    "burst of {:.0} bytes involves {} hotspot host(s)",
                    burst.value,
                    involved.len()
                ),
                evidence: involved.into_iter().map(String::from).collect(),
                confidence: (burst_strength(burst) * 0.5 + 0.5).min(1.0),
            })
        })
        .collect()
}

/// Burst strength mapped into [0, 1]
fn burst_strength(burst: &Burst) -> f64 {
    (burst.deviation / 10.0).clamp(0.0, 1.0)
}

fn protocol_with_unusual(input: &CorrelationInput<'_, '_>) -> Vec<CorrelatedFinding> {
    let unusual: BTreeSet<(&str, u16)> = input.unusual.iter().map(|u| (u.protocol.as_str(), u.port)).collect();
    if unusual.is_empty() {
        return Vec::new();
    }
    input
        .anomalies
        .of_kind(AnomalyKind::Protocol)
        .filter_map(|finding| {
            let pairs: BTreeSet<(&str, u16)> = input
                .traffic
                .records(finding.window_index)
                .iter()
                .map(|r| (r.protocol.as_str(), r.port))
                .filter(|pair| unusual.contains(pair))
                .collect();
            if pairs.is_empty() {
                return None;
            }
            Some(CorrelatedFinding {
                kind: CorrelationKind::ProtocolUnusualCombination,
                window_index: finding.window_index,
                description: format!("skewed protocol mix carries {} unusual protocol/port pair(s)", pairs.len()),
                evidence: pairs.iter().map(|(p, port)| format!("{}/{}", p, port)).collect(),
                confidence: finding.score.max(0.5),
            })
        })
        .collect()
}

fn volume_with_behavioral(input: &CorrelationInput<'_, '_>) -> Vec<CorrelatedFinding> {
    input
        .anomalies
        .of_kind(AnomalyKind::Volume)
        .filter_map(|volume| {
            let behavioral = input
                .anomalies
                .in_window(volume.window_index)
                .find(|f| f.kind == AnomalyKind::Behavioral)?;
            Some(CorrelatedFinding {
                kind: CorrelationKind::VolumeBehavioral,
                window_index: volume.window_index,
                description: "volume anomaly coincides with a baseline deviation".to_string(),
                evidence: vec![volume.description.clone()],
                confidence: (volume.score + behavioral.score) / 2.0,
            })
        })
        .collect()
}

fn patterns_with_anomalies(input: &CorrelationInput<'_, '_>) -> Vec<CorrelatedFinding> {
    let mut found = Vec::new();
    let mut seen: BTreeSet<(usize, usize)> = BTreeSet::new();
    for finding in &input.anomalies.findings {
        for pattern in input.attack_patterns.values() {
            let profile = &pattern.temporal_profile;
            let overlaps = profile.first_seen < finding.end && profile.last_seen >= finding.start;
            if !overlaps || !seen.insert((finding.window_index, pattern.cluster_id)) {
                continue;
            }
            found.push(CorrelatedFinding {
                kind: CorrelationKind::AttackPatternAnomaly,
                window_index: finding.window_index,
                description: format!(
                    "attack pattern {} ({}) active during {} anomaly",
                    pattern.cluster_id, pattern.severity.level, finding.kind
                ),
                evidence: vec![pattern.signature.clone()],
                confidence: (pattern.severity.score + finding.score) / 2.0,
            });
        }
    }
    found
}
