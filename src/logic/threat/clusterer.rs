//! Threat Pattern Clusterer
//!
//! events -> feature matrix -> standardize -> DBSCAN -> one `AttackPattern`
//! per cluster. Noise is labelled but produces no pattern. Every call
//! clusters from scratch; nothing from a previous run is reused.

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use ndarray::Array2;
use sha2::{Digest, Sha256};

use super::dbscan::dbscan;
use super::features::{feature_matrix, standardize, DefaultThreatFeatures, ThreatFeatureExtractor};
use super::types::*;
use crate::logic::config::AnalyzerConfig;
use crate::logic::error::Result;
use crate::logic::risk::{DefaultRecommendations, RecommendationStrategy};

// ============================================================================
// SEVERITY WEIGHTS
// ============================================================================

const SIZE_WEIGHT: f64 = 0.4;
const EXTREMITY_WEIGHT: f64 = 0.3;
const TEMPORAL_WEIGHT: f64 = 0.3;

/// Cluster size at which the size factor saturates
const SIZE_SATURATION: f64 = 50.0;
/// Mean |z| at which extremity saturates
const EXTREMITY_SCALE: f64 = 3.0;
/// Events per minute at which the rate part of temporal density saturates
const RATE_SATURATION: f64 = 10.0;

pub struct ThreatPatternClusterer {
    eps: f64,
    min_samples: usize,
    extractor: Arc<dyn ThreatFeatureExtractor>,
    recommendations: Arc<dyn RecommendationStrategy>,
}

impl ThreatPatternClusterer {
    pub fn new(eps: f64, min_samples: usize) -> Self {
        Self {
            eps,
            min_samples,
            extractor: Arc::new(DefaultThreatFeatures),
            recommendations: Arc::new(DefaultRecommendations),
        }
    }

    pub fn from_config(config: &AnalyzerConfig) -> Self {
        Self::new(config.cluster_eps, config.cluster_min_samples)
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn ThreatFeatureExtractor>) -> Self {
        self.extractor = extractor;
        self
    }

    pub fn with_recommendations(mut self, strategy: Arc<dyn RecommendationStrategy>) -> Self {
        self.recommendations = strategy;
        self
    }

    pub fn identify_attack_patterns(&self, events: &[ThreatEvent]) -> Result<ClusteringOutcome> {
        let layout = self.extractor.layout();
        if events.is_empty() {
            return Ok(ClusteringOutcome {
                layout,
                ..Default::default()
            });
        }

        let raw = feature_matrix(self.extractor.as_ref(), events)?;
        let scaled = standardize(&raw);
        let labels = dbscan(&scaled, self.eps, self.min_samples);

        let mut members: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for (i, label) in labels.iter().enumerate() {
            if let Some(id) = label.cluster_id() {
                members.entry(id).or_default().push(i);
            }
        }

        let names = self.extractor.feature_names();
        let patterns: BTreeMap<usize, AttackPattern> = members
            .into_iter()
            .map(|(id, idx)| (id, self.build_pattern(id, &idx, events, &raw, &scaled, &names)))
            .collect();

        let outcome = ClusteringOutcome { layout, labels, patterns };
        log::info!(
            "Clustered {} threat events: {} patterns, {} noise (layout v{} {:08x})",
            events.len(),
            outcome.patterns.len(),
            outcome.noise_count(),
            outcome.layout.version,
            outcome.layout.hash
        );
        Ok(outcome)
    }

    fn build_pattern(
        &self,
        cluster_id: usize,
        idx: &[usize],
        events: &[ThreatEvent],
        raw: &Array2<f64>,
        scaled: &Array2<f64>,
        names: &[String],
    ) -> AttackPattern {
        let cluster_events: Vec<&ThreatEvent> = idx.iter().map(|&i| &events[i]).collect();
        let feature_ranges = feature_ranges(idx, raw, names);
        let common_attributes = common_attributes(&cluster_events);
        let temporal_profile = temporal_profile(&cluster_events);
        let severity = severity(idx, scaled, &temporal_profile);
        let recommended_actions = self.recommendations.for_attack_pattern(&severity, &common_attributes);

        AttackPattern {
            cluster_id,
            member_event_ids: cluster_events.iter().map(|e| e.event_id.clone()).collect(),
            signature: signature(&feature_ranges, &cluster_events),
            feature_ranges,
            common_attributes,
            temporal_profile,
            severity,
            recommended_actions,
        }
    }
}

impl Default for ThreatPatternClusterer {
    fn default() -> Self {
        Self::from_config(&AnalyzerConfig::default())
    }
}

// ============================================================================
// PER-CLUSTER ANALYSIS
// ============================================================================

fn feature_ranges(idx: &[usize], raw: &Array2<f64>, names: &[String]) -> Vec<FeatureRange> {
    names
        .iter()
        .enumerate()
        .map(|(col, name)| {
            let (min, max) = idx.iter().map(|&i| raw[[i, col]]).fold(
                (f64::INFINITY, f64::NEG_INFINITY),
                |(lo, hi), v| (lo.min(v), hi.max(v)),
            );
            FeatureRange {
                feature: name.clone(),
                min,
                max,
            }
        })
        .collect()
}

/// SHA-256 over ranges quantized to one decimal plus sorted member categories
fn signature(ranges: &[FeatureRange], events: &[&ThreatEvent]) -> String {
    let mut hasher = Sha256::new();
    for r in ranges {
        hasher.update(format!("{}:{:.1}:{:.1};", r.feature, r.min, r.max).as_bytes());
    }
    let categories: BTreeSet<&str> = events.iter().map(|e| e.category.as_str()).collect();
    for c in categories {
        hasher.update(c.as_bytes());
        hasher.update([0u8]);
    }
    hex::encode(hasher.finalize())
}

fn common_attributes(events: &[&ThreatEvent]) -> Vec<CommonAttribute> {
    let mut counts: BTreeMap<(&'static str, String), usize> = BTreeMap::new();
    for event in events {
        let mut seen: BTreeSet<(&'static str, String)> = BTreeSet::new();
        seen.insert(("category", event.category.clone()));
        seen.extend(event.source_ips.iter().map(|ip| ("source_ip", ip.clone())));
        seen.extend(event.destination_ips.iter().map(|ip| ("destination_ip", ip.clone())));
        seen.extend(event.destination_ports.iter().map(|p| ("destination_port", p.to_string())));
        for key in seen {
            *counts.entry(key).or_insert(0) += 1;
        }
    }

    let n = events.len();
    counts
        .into_iter()
        .filter(|(_, count)| count * 2 > n)
        .map(|((attribute, value), count)| CommonAttribute {
            attribute: attribute.to_string(),
            value,
            support: count as f64 / n as f64,
        })
        .collect()
}

/// Time-ordered profile; consecutive events sharing a source form a transition
fn temporal_profile(events: &[&ThreatEvent]) -> TemporalProfile {
    let mut ordered: Vec<&ThreatEvent> = events.to_vec();
    ordered.sort_by(|a, b| a.timestamp.cmp(&b.timestamp).then_with(|| a.event_id.cmp(&b.event_id)));

    let first_seen = ordered[0].timestamp;
    let last_seen = ordered[ordered.len() - 1].timestamp;
    let span_secs = (last_seen - first_seen).num_milliseconds() as f64 / 1000.0;
    let events_per_minute = ordered.len() as f64 / (span_secs / 60.0).max(1.0);

    let transitions: Vec<EventTransition> = ordered
        .windows(2)
        .filter_map(|pair| {
            let from: BTreeSet<&String> = pair[0].source_ips.iter().collect();
            let shared: Vec<String> = pair[1]
                .source_ips
                .iter()
                .filter(|ip| from.contains(ip))
                .cloned()
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect();
            if shared.is_empty() {
                return None;
            }
            Some(EventTransition {
                from_event: pair[0].event_id.clone(),
                to_event: pair[1].event_id.clone(),
                gap_secs: (pair[1].timestamp - pair[0].timestamp).num_milliseconds() as f64 / 1000.0,
                shared_sources: shared,
            })
        })
        .collect();

    let chain_ratio = if ordered.len() > 1 {
        transitions.len() as f64 / (ordered.len() - 1) as f64
    } else {
        0.0
    };

    TemporalProfile {
        first_seen,
        last_seen,
        span_secs,
        events_per_minute,
        transitions,
        chain_ratio,
    }
}

fn severity(idx: &[usize], scaled: &Array2<f64>, profile: &TemporalProfile) -> PatternSeverity {
    let size_factor = (idx.len() as f64 / SIZE_SATURATION).min(1.0);

    let cells = idx.len() * scaled.ncols();
    let mean_abs_z = if cells == 0 {
        0.0
    } else {
        idx.iter().map(|&i| scaled.row(i).iter().map(|z| z.abs()).sum::<f64>()).sum::<f64>() / cells as f64
    };
    let extremity = (mean_abs_z / EXTREMITY_SCALE).min(1.0);

    let rate = (profile.events_per_minute / RATE_SATURATION).min(1.0);
    let temporal_density = 0.5 * rate + 0.5 * profile.chain_ratio;

    let score = (SIZE_WEIGHT * size_factor + EXTREMITY_WEIGHT * extremity + TEMPORAL_WEIGHT * temporal_density)
        .clamp(0.0, 1.0);

    PatternSeverity {
        level: SeverityLevel::from_score(score),
        score,
        size_factor,
        extremity,
        temporal_density,
    }
}
