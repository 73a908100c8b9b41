//! Additive Seasonal Decomposition

use super::types::Decomposition;
use crate::logic::stats::mean;

/// Centered moving average over one period (2xP for even P), shrinking at the edges
pub fn centered_trend(series: &[f64], period: usize) -> Vec<f64> {
    let n = series.len();
    let half = (period / 2) as isize;
    let even = period % 2 == 0;

    (0..n as isize)
        .map(|t| {
            let mut sum = 0.0;
            let mut weight = 0.0;
            for j in -half..=half {
                let idx = t + j;
                if idx < 0 || idx >= n as isize {
                    continue;
                }
                let w = if even && j.abs() == half { 0.5 } else { 1.0 };
                sum += w * series[idx as usize];
                weight += w;
            }
            if weight > 0.0 { sum / weight } else { 0.0 }
        })
        .collect()
}

/// Decompose `series` with the given period.
/// With fewer than two full periods the seasonal component is left empty.
pub fn decompose(series: &[f64], period: usize) -> Decomposition {
    let period = period.max(2);
    let trend = centered_trend(series, period);
    let detrended: Vec<f64> = series.iter().zip(&trend).map(|(x, t)| x - t).collect();

    if series.len() < 2 * period {
        return Decomposition {
            period,
            trend,
            seasonal: Vec::new(),
            residual: detrended,
        };
    }

    let mut phase_means: Vec<f64> = (0..period)
        .map(|phase| {
            let values: Vec<f64> = detrended.iter().skip(phase).step_by(period).copied().collect();
            mean(&values)
        })
        .collect();
    let offset = mean(&phase_means);
    for m in phase_means.iter_mut() {
        *m -= offset;
    }

    let seasonal: Vec<f64> = (0..series.len()).map(|t| phase_means[t % period]).collect();
    let residual: Vec<f64> = detrended.iter().zip(&seasonal).map(|(d, s)| d - s).collect();

    Decomposition {
        period,
        trend,
        seasonal,
        residual,
    }
}
