//! Baseline Types
//!
//! Behavioral features, per-feature append-only baselines and detection results.

use serde::{Deserialize, Serialize};

use crate::logic::stats::{histogram_entropy, mean, std_dev};

/// Equal-width bins used for the baseline's distribution entropy
pub const HISTOGRAM_BINS: usize = 10;

// ============================================================================
// FEATURES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BehaviorFeature {
    ProtocolEntropy,
    PortEntropy,
    PayloadPerPacket,
    DestinationDiversity,
    TemporalRegularity,
}

pub const BEHAVIOR_FEATURE_COUNT: usize = 5;

impl BehaviorFeature {
    /// Storage order of the per-feature baselines
    pub const ALL: [BehaviorFeature; BEHAVIOR_FEATURE_COUNT] = [
        BehaviorFeature::ProtocolEntropy,
        BehaviorFeature::PortEntropy,
        BehaviorFeature::PayloadPerPacket,
        BehaviorFeature::DestinationDiversity,
        BehaviorFeature::TemporalRegularity,
    ];

    pub fn index(&self) -> usize {
        *self as usize
    }

    pub fn name(&self) -> &'static str {
        match self {
            BehaviorFeature::ProtocolEntropy => "protocol_entropy",
            BehaviorFeature::PortEntropy => "port_entropy",
            BehaviorFeature::PayloadPerPacket => "payload_per_packet",
            BehaviorFeature::DestinationDiversity => "destination_diversity",
            BehaviorFeature::TemporalRegularity => "temporal_regularity",
        }
    }
}

impl std::fmt::Display for BehaviorFeature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Behavioral feature values of one traffic sample (one window)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BehaviorSample {
    pub window_index: Option<usize>,
    pub values: [f64; BEHAVIOR_FEATURE_COUNT],
}

impl BehaviorSample {
    pub fn get(&self, feature: BehaviorFeature) -> f64 {
        self.values[feature.index()]
    }
}

// ============================================================================
// FEATURE BASELINE
// ============================================================================

/// Observed values of one feature. Values are only ever appended;
/// the derived statistics are recomputed once per appended batch.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FeatureBaseline {
    values: Vec<f64>,
    pub mean: f64,
    pub std: f64,
    /// Normalized histogram entropy of `values`
    pub entropy: f64,
    pub threshold: f64,
}

impl FeatureBaseline {
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    pub fn samples(&self) -> usize {
        self.values.len()
    }

    pub fn is_trained(&self, min_samples: usize) -> bool {
        !self.values.is_empty() && self.values.len() >= min_samples
    }

    /// Append one value and refresh mean, std, entropy and threshold
    pub fn push(&mut self, value: f64, deviation_band: f64) {
        self.extend(std::iter::once(value), deviation_band);
    }

    /// Append a batch, then refresh the statistics once
    pub fn extend<I: IntoIterator<Item = f64>>(&mut self, values: I, deviation_band: f64) -> usize {
        let before = self.values.len();
        self.values.extend(values);
        let added = self.values.len() - before;
        if added > 0 {
            self.refresh(deviation_band);
        }
        added
    }

    fn refresh(&mut self, deviation_band: f64) {
        self.mean = mean(&self.values);
        self.std = std_dev(&self.values);
        self.entropy = histogram_entropy(&self.values, HISTOGRAM_BINS);
        self.threshold = deviation_band * (1.0 + self.entropy);
    }
}

// ============================================================================
// DETECTION RESULTS
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    Normal,
    Anomalous,
    /// No feature had a trained baseline; no verdict is made
    InsufficientData,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureDeviation {
    pub feature: BehaviorFeature,
    pub value: f64,
    pub baseline_mean: f64,
    /// z-score against the baseline distribution
    pub deviation: f64,
    pub threshold: f64,
    pub flagged: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehavioralAssessment {
    pub window_index: Option<usize>,
    pub verdict: Verdict,
    pub deviations: Vec<FeatureDeviation>,
    /// Untrained features that were not evaluated
    pub skipped: Vec<BehaviorFeature>,
    /// 0..=1, 0 unless anomalous
    pub severity: f64,
}

impl BehavioralAssessment {
    pub fn flagged(&self) -> impl Iterator<Item = &FeatureDeviation> {
        self.deviations.iter().filter(|d| d.flagged)
    }

    pub fn is_anomalous(&self) -> bool {
        self.verdict == Verdict::Anomalous
    }
}

/// Read-only view of one feature's baseline for reports
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureSnapshot {
    pub feature: BehaviorFeature,
    pub samples: usize,
    pub mean: f64,
    pub std: f64,
    pub threshold: f64,
    pub trained: bool,
}
