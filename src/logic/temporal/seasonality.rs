//! Seasonality Detection - autocorrelation peak search

use super::types::Seasonality;
use crate::logic::stats::{mean, EPSILON};

/// Sample autocorrelation at `lag` (biased estimator, normalized by lag-0)
pub fn autocorrelation(series: &[f64], lag: usize) -> f64 {
    let n = series.len();
    if lag >= n {
        return 0.0;
    }
    let m = mean(series);
    let denom: f64 = series.iter().map(|x| (x - m).powi(2)).sum();
    if denom <= EPSILON {
        return 0.0;
    }
    let num: f64 = (0..n - lag)
        .map(|t| (series[t] - m) * (series[t + lag] - m))
        .sum();
    num / denom
}

/// Highest local ACF peak over lags `2..=n/2` with strength >= `min_strength`,
/// otherwise `default_period`
pub fn detect_seasonality(series: &[f64], default_period: usize, min_strength: f64) -> Seasonality {
    let fallback = Seasonality {
        period: default_period,
        strength: 0.0,
        detected: false,
    };

    let max_lag = series.len() / 2;
    if max_lag < 2 {
        return fallback;
    }

    // acf[k] for k in 0..=max_lag+1 so every candidate has both neighbours
    let acf: Vec<f64> = (0..=max_lag + 1).map(|k| autocorrelation(series, k)).collect();

    let mut best: Option<(usize, f64)> = None;
    for lag in 2..=max_lag {
        let r = acf[lag];
        let is_peak = r > acf[lag - 1] && r >= acf[lag + 1];
        if !is_peak || r < min_strength {
            continue;
        }
        if best.map_or(true, |(_, b)| r > b) {
            best = Some((lag, r));
        }
    }

    match best {
        Some((period, strength)) => Seasonality {
            period,
            strength,
            detected: true,
        },
        None => fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detects_period_of_repeating_signal() {
        let series: Vec<f64> = (0..96)
            .map(|t| 100.0 + 50.0 * ((t % 12) as f64 / 12.0 * std::f64::consts::TAU).sin())
            .collect();
        let s = detect_seasonality(&series, 24, 0.3);
        assert!(s.detected);
        assert_eq!(s.period, 12);
        assert!(s.strength > 0.5);
    }

    #[test]
    fn test_constant_series_falls_back() {
        let s = detect_seasonality(&[5.0; 48], 24, 0.3);
        assert_eq!(s.period, 24);
        assert!(!s.detected);
    }

    #[test]
    fn test_short_series_falls_back() {
        let s = detect_seasonality(&[1.0, 2.0, 3.0], 24, 0.3);
        assert_eq!(s.period, 24);
    }

    #[test]
    fn test_autocorrelation_lag_zero_is_one() {
        let series = [1.0, 3.0, 2.0, 5.0];
        assert!((autocorrelation(&series, 0) - 1.0).abs() < 1e-12);
    }
}
