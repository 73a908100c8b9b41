//! Zero-Day Detector - per-feature behavioral baseline
//!
//! One `RwLock` per feature: training takes the write lock of one feature
//! at a time, detection only read locks.

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use super::types::*;
use crate::logic::config::{AnalyzerConfig, VerdictPolicy};
use crate::logic::error::{AnalysisError, AnalysisWarning};
use crate::logic::stats::EPSILON;

/// Std floor for deviations, as a fraction of |mean|
const STD_FLOOR_RATIO: f64 = 0.05;

/// Detection settings taken from the analyzer configuration
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct DetectionSettings {
    pub min_samples: usize,
    pub policy: VerdictPolicy,
}

impl From<&AnalyzerConfig> for DetectionSettings {
    fn from(config: &AnalyzerConfig) -> Self {
        Self {
            min_samples: config.baseline_min_samples.max(1),
            policy: config.verdict_policy,
        }
    }
}

pub struct BehaviorBaseline {
    deviation_band: f64,
    features: [RwLock<FeatureBaseline>; BEHAVIOR_FEATURE_COUNT],
}

impl BehaviorBaseline {
    pub fn new(deviation_band: f64) -> Self {
        Self {
            deviation_band,
            features: std::array::from_fn(|_| RwLock::new(FeatureBaseline::default())),
        }
    }

    pub fn deviation_band(&self) -> f64 {
        self.deviation_band
    }

    // ========================================================================
    // TRAINING
    // ========================================================================

    /// Append every feature value of `sample` to its baseline
    pub fn train(&self, sample: &BehaviorSample) {
        for feature in BehaviorFeature::ALL {
            self.features[feature.index()]
                .write()
                .push(sample.get(feature), self.deviation_band);
        }
    }

    /// Train on a batch: one write lock and one refresh per feature
    pub fn train_all<'a, I>(&self, samples: I) -> usize
    where
        I: IntoIterator<Item = &'a BehaviorSample>,
    {
        let batch: Vec<&BehaviorSample> = samples.into_iter().collect();
        if batch.is_empty() {
            return 0;
        }
        for feature in BehaviorFeature::ALL {
            self.features[feature.index()]
                .write()
                .extend(batch.iter().map(|s| s.get(feature)), self.deviation_band);
        }
        log::debug!(
            "Baseline trained on {} samples ({} total)",
            batch.len(),
            self.samples(BehaviorFeature::ProtocolEntropy)
        );
        batch.len()
    }

    pub fn samples(&self, feature: BehaviorFeature) -> usize {
        self.features[feature.index()].read().samples()
    }

    pub fn is_trained(&self, feature: BehaviorFeature, min_samples: usize) -> bool {
        self.features[feature.index()].read().is_trained(min_samples)
    }

    pub fn snapshot(&self, min_samples: usize) -> Vec<FeatureSnapshot> {
        BehaviorFeature::ALL
            .iter()
            .map(|&feature| {
                let b = self.features[feature.index()].read();
                FeatureSnapshot {
                    feature,
                    samples: b.samples(),
                    mean: b.mean,
                    std: b.std,
                    threshold: b.threshold,
                    trained: b.is_trained(min_samples),
                }
            })
            .collect()
    }

    // ========================================================================
    // DETECTION
    // ========================================================================

    /// Deviation of one feature value; `UnknownBaseline` while untrained
    pub fn deviation(
        &self,
        feature: BehaviorFeature,
        value: f64,
        min_samples: usize,
    ) -> Result<FeatureDeviation, AnalysisError> {
        let b = self.features[feature.index()].read();
        if !b.is_trained(min_samples) {
            return Err(AnalysisError::UnknownBaseline {
                feature: feature.name().to_string(),
            });
        }
        let scale = b.std.max(STD_FLOOR_RATIO * b.mean.abs()).max(EPSILON);
        let deviation = (value - b.mean).abs() / scale;
        Ok(FeatureDeviation {
            feature,
            value,
            baseline_mean: b.mean,
            deviation,
            threshold: b.threshold,
            flagged: deviation > b.threshold,
        })
    }

    pub fn detect(&self, sample: &BehaviorSample, settings: &DetectionSettings) -> BehavioralAssessment {
        let mut deviations = Vec::new();
        let mut skipped = Vec::new();
        for feature in BehaviorFeature::ALL {
            match self.deviation(feature, sample.get(feature), settings.min_samples) {
                Ok(d) => deviations.push(d),
                Err(_) => skipped.push(feature),
            }
        }

        let trained = deviations.len();
        let flagged: Vec<&FeatureDeviation> = deviations.iter().filter(|d| d.flagged).collect();

        let verdict = if trained == 0 {
            Verdict::InsufficientData
        } else {
            let anomalous = match settings.policy {
                VerdictPolicy::Any => !flagged.is_empty(),
                VerdictPolicy::Majority => flagged.len() * 2 > trained,
            };
            if anomalous { Verdict::Anomalous } else { Verdict::Normal }
        };

        let severity = if verdict == Verdict::Anomalous {
            let coverage = flagged.len() as f64 / trained as f64;
            let excess = flagged
                .iter()
                .map(|d| (d.deviation / d.threshold.max(EPSILON) - 1.0).clamp(0.0, 1.0))
                .fold(0.0, f64::max);
            (0.5 * coverage + 0.5 * excess).clamp(0.0, 1.0)
        } else {
            0.0
        };

        BehavioralAssessment {
            window_index: sample.window_index,
            verdict,
            deviations,
            skipped,
            severity,
        }
    }
}

impl Default for BehaviorBaseline {
    fn default() -> Self {
        Self::new(crate::constants::DEFAULT_DEVIATION_BAND)
    }
}

/// One warning per untrained feature across a batch of assessments
pub fn untrained_warnings(assessments: &[BehavioralAssessment]) -> Vec<AnalysisWarning> {
    let mut features: Vec<BehaviorFeature> = assessments.iter().flat_map(|a| a.skipped.iter().copied()).collect();
    features.sort();
    features.dedup();
    features
        .into_iter()
        .map(|f| {
            AnalysisWarning::insufficient(
                "baseline",
                format!("feature '{}' has no trained baseline; skipped", f),
            )
        })
        .collect()
}
