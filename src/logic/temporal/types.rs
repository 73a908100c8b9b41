//! Temporal Types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::logic::error::Outcome;

/// Dominant period of a series, in windows
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Seasonality {
    pub period: usize,
    /// Autocorrelation at `period` (0 when falling back to the default)
    pub strength: f64,
    /// false when `period` is the configured fallback
    pub detected: bool,
}

/// Additive decomposition: observed = trend + seasonal + residual
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decomposition {
    pub period: usize,
    pub trend: Vec<f64>,
    /// Empty when the series holds fewer than two full periods
    pub seasonal: Vec<f64>,
    pub residual: Vec<f64>,
}

impl Decomposition {
    pub fn has_seasonal(&self) -> bool {
        !self.seasonal.is_empty()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Burst {
    pub window_index: usize,
    pub start: DateTime<Utc>,
    pub value: f64,
    pub baseline_mean: f64,
    pub baseline_std: f64,
    /// Std devs above the trailing mean (relative excess for flat baselines)
    pub deviation: f64,
}

/// Aggregate over windows sharing an hour-of-day or weekday
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecurringBucket {
    /// Hour (0..24) or weekday (0 = Monday)
    pub key: u32,
    pub label: String,
    pub window_count: usize,
    pub mean_bytes: f64,
    pub median_bytes: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecurringPatterns {
    pub daily: Vec<RecurringBucket>,
    pub weekly: Vec<RecurringBucket>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TemporalAnalysis {
    pub seasonality: Outcome<Seasonality>,
    pub decomposition: Outcome<Decomposition>,
    pub bursts: Outcome<Vec<Burst>>,
    pub recurring: RecurringPatterns,
}
