//! Burst Detection - trailing-window mean/std test

use super::types::Burst;
use crate::logic::stats::{mean, std_dev, EPSILON};
use crate::logic::traffic::TimeWindow;

/// Trailing statistics of `series[..index]`; None for seed windows
pub(crate) fn trailing_baseline(
    series: &[f64],
    index: usize,
    min_history: usize,
    trailing: usize,
) -> Option<(f64, f64)> {
    if index < min_history.max(1) {
        return None;
    }
    let lo = index.saturating_sub(trailing);
    let history = &series[lo..index];
    Some((mean(history), std_dev(history)))
}

/// Deviation of `value` from a trailing baseline.
///
/// A z-score while the trailing std exceeds `EPSILON`. On a flat baseline
/// (every trailing window carried the same bytes) the z-score is undefined,
/// so the result is the relative excess `(value - mean) / max(mean, 1)`:
/// a 100-byte history jumping to 1000 scores 9. An idle history (mean 0)
/// falls back to plain bytes, so any window above `factor` bytes counts.
/// Volume anomalies share this rule.
pub(crate) fn deviation(value: f64, baseline_mean: f64, baseline_std: f64) -> f64 {
    if baseline_std > EPSILON {
        (value - baseline_mean) / baseline_std
    } else {
        (value - baseline_mean) / baseline_mean.max(1.0)
    }
}

/// Flag windows whose bytes exceed trailing mean + `factor` x std, or
/// `factor` x the relative excess when the trailing windows are flat
/// (see `deviation`). The first `min_history` windows only seed the baseline.
pub fn detect_bursts(
    windows: &[TimeWindow],
    series: &[f64],
    factor: f64,
    min_history: usize,
    trailing: usize,
) -> Vec<Burst> {
    let mut bursts = Vec::new();
    for (i, window) in windows.iter().enumerate().take(series.len()) {
        let Some((m, s)) = trailing_baseline(series, i, min_history, trailing) else {
            continue;
        };
        let value = series[i];
        let dev = deviation(value, m, s);
        if dev > factor {
            log::debug!("Burst at window {}: {:.0} bytes ({:.2} sd)", i, value, dev);
            bursts.push(Burst {
                window_index: window.index,
                start: window.start,
                value,
                baseline_mean: m,
                baseline_std: s,
                deviation: dev,
            });
        }
    }
    bursts
}
