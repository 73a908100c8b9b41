//! Analyzer Configuration
//!
//! Every tunable of the engine as a named option with a default.
//! Sources, lowest priority first: `Default` -> JSON -> `TRAFFIC_*` env vars.

use serde::{Deserialize, Serialize};

use crate::constants::*;
use super::error::{AnalysisError, Result};

/// How per-feature behavioral flags combine into one verdict
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum VerdictPolicy {
    /// Any flagged feature makes the sample anomalous
    Any,
    /// More than half of the trained features must be flagged
    Majority,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    // --- Windowing ---
    pub window_size_secs: i64,
    /// Batches spanning more windows skip the windowed methods
    pub max_windows: usize,

    // --- Anomaly thresholds ---
    /// Std devs from trailing mean for volume anomalies
    pub volume_threshold: f64,
    /// Normalized protocol entropy floor
    pub entropy_threshold: f64,
    /// Std devs above trailing mean for bursts
    pub burst_factor: f64,
    /// Z-score limit on pattern shape metrics
    pub pattern_threshold: f64,

    // --- History requirements ---
    pub min_history_windows: usize,
    pub trailing_windows: usize,
    pub min_pattern_history: usize,
    pub min_window_records: usize,

    // --- Seasonality ---
    pub default_period: usize,
    pub seasonality_min_strength: f64,

    // --- Flow graph ---
    pub hotspot_percentile: f64,
    pub fan_threshold: usize,

    // --- Protocol ---
    pub rarity_threshold: f64,

    // --- Clustering ---
    pub cluster_eps: f64,
    pub cluster_min_samples: usize,

    // --- Behavioral baseline ---
    pub baseline_min_samples: usize,
    pub deviation_band: f64,
    pub verdict_policy: VerdictPolicy,
    /// Train the context baseline on each analyzed batch
    pub learn_baseline: bool,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            window_size_secs: DEFAULT_WINDOW_SECS,
            max_windows: DEFAULT_MAX_WINDOWS,
            volume_threshold: DEFAULT_VOLUME_THRESHOLD,
            entropy_threshold: DEFAULT_ENTROPY_THRESHOLD,
            burst_factor: DEFAULT_BURST_FACTOR,
            pattern_threshold: DEFAULT_PATTERN_THRESHOLD,
            min_history_windows: DEFAULT_MIN_HISTORY_WINDOWS,
            trailing_windows: DEFAULT_TRAILING_WINDOWS,
            min_pattern_history: DEFAULT_MIN_PATTERN_HISTORY,
            min_window_records: DEFAULT_MIN_WINDOW_RECORDS,
            default_period: DEFAULT_SEASONAL_PERIOD,
            seasonality_min_strength: DEFAULT_SEASONALITY_MIN_STRENGTH,
            hotspot_percentile: DEFAULT_HOTSPOT_PERCENTILE,
            fan_threshold: DEFAULT_FAN_THRESHOLD,
            rarity_threshold: DEFAULT_RARITY_THRESHOLD,
            cluster_eps: DEFAULT_CLUSTER_EPS,
            cluster_min_samples: DEFAULT_CLUSTER_MIN_SAMPLES,
            baseline_min_samples: DEFAULT_BASELINE_MIN_SAMPLES,
            deviation_band: DEFAULT_DEVIATION_BAND,
            verdict_policy: VerdictPolicy::Any,
            learn_baseline: true,
        }
    }
}

impl AnalyzerConfig {
    pub fn with_window_secs(mut self, secs: i64) -> Self {
        self.window_size_secs = secs;
        self
    }

    pub fn with_clustering(mut self, eps: f64, min_samples: usize) -> Self {
        self.cluster_eps = eps;
        self.cluster_min_samples = min_samples;
        self
    }

    /// High sensitivity - lower thresholds, more findings
    pub fn high_sensitivity() -> Self {
        Self {
            volume_threshold: 2.0,
            burst_factor: 2.5,
            pattern_threshold: 2.5,
            entropy_threshold: 0.8,
            deviation_band: 2.0,
            ..Default::default()
        }
    }

    /// Low sensitivity - higher thresholds, fewer findings
    pub fn low_sensitivity() -> Self {
        Self {
            volume_threshold: 3.5,
            burst_factor: 4.0,
            pattern_threshold: 4.0,
            entropy_threshold: 0.5,
            deviation_band: 4.0,
            ..Default::default()
        }
    }

    /// Parse from JSON; missing fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    /// Overlay `TRAFFIC_*` environment variables on top of `self`
    pub fn overlay_env(self) -> Self {
        Self {
            window_size_secs: env_or("TRAFFIC_WINDOW_SECS", self.window_size_secs),
            max_windows: env_or("TRAFFIC_MAX_WINDOWS", self.max_windows),
            volume_threshold: env_or("TRAFFIC_VOLUME_THRESHOLD", self.volume_threshold),
            entropy_threshold: env_or("TRAFFIC_ENTROPY_THRESHOLD", self.entropy_threshold),
            burst_factor: env_or("TRAFFIC_BURST_FACTOR", self.burst_factor),
            hotspot_percentile: env_or("TRAFFIC_HOTSPOT_PERCENTILE", self.hotspot_percentile),
            cluster_eps: env_or("TRAFFIC_CLUSTER_EPS", self.cluster_eps),
            cluster_min_samples: env_or("TRAFFIC_CLUSTER_MIN_SAMPLES", self.cluster_min_samples),
            baseline_min_samples: env_or("TRAFFIC_BASELINE_MIN_SAMPLES", self.baseline_min_samples),
            learn_baseline: env_or("TRAFFIC_LEARN_BASELINE", self.learn_baseline),
            ..self
        }
    }

    /// Defaults with the env overlay applied
    pub fn from_env() -> Self {
        Self::default().overlay_env()
    }

    /// Reject structurally invalid configuration (the only fatal errors)
    pub fn validate(&self) -> Result<()> {
        if self.window_size_secs <= 0 {
            return Err(AnalysisError::InvalidWindow { secs: self.window_size_secs });
        }
        if self.max_windows == 0 {
            return Err(AnalysisError::InvalidConfig("max_windows must be > 0".into()));
        }
        if !(self.cluster_eps > 0.0) {
            return Err(AnalysisError::InvalidConfig(format!(
                "cluster_eps must be > 0, got {}", self.cluster_eps
            )));
        }
        if self.cluster_min_samples == 0 {
            return Err(AnalysisError::InvalidConfig("cluster_min_samples must be > 0".into()));
        }
        if !(0.0..=100.0).contains(&self.hotspot_percentile) {
            return Err(AnalysisError::InvalidConfig(format!(
                "hotspot_percentile must be within [0, 100], got {}", self.hotspot_percentile
            )));
        }
        let positive = [
            ("volume_threshold", self.volume_threshold),
            ("entropy_threshold", self.entropy_threshold),
            ("burst_factor", self.burst_factor),
            ("pattern_threshold", self.pattern_threshold),
            ("deviation_band", self.deviation_band),
        ];
        if let Some((name, value)) = positive.iter().find(|(_, v)| !(*v > 0.0)) {
            return Err(AnalysisError::InvalidConfig(format!("{} must be > 0, got {}", name, value)));
        }
        if self.trailing_windows == 0 || self.default_period < 2 {
            return Err(AnalysisError::InvalidConfig(
                "trailing_windows must be > 0 and default_period >= 2".into(),
            ));
        }
        Ok(())
    }

    pub fn window_duration(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.window_size_secs)
    }
}
