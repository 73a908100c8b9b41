//! Shared numeric helpers (mean/std, entropy, percentiles)

use std::collections::HashMap;
use std::hash::Hash;

pub const EPSILON: f64 = 1e-9;

pub fn mean(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    values.iter().sum::<f64>() / values.len() as f64
}

/// Population standard deviation (ddof = 0)
pub fn std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / values.len() as f64;
    variance.sqrt()
}

/// Sample standard deviation (ddof = 1), 0 when fewer than two values
pub fn sample_std_dev(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let m = mean(values);
    let variance = values.iter().map(|v| (v - m).powi(2)).sum::<f64>() / (values.len() - 1) as f64;
    variance.sqrt()
}

pub fn median(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        (sorted[mid - 1] + sorted[mid]) / 2.0
    } else {
        sorted[mid]
    }
}

/// Percentile with linear interpolation between closest ranks (`p` in [0, 100])
pub fn percentile(values: &[f64], p: f64) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));
    let rank = (p.clamp(0.0, 100.0) / 100.0) * (sorted.len() - 1) as f64;
    let lower = rank.floor() as usize;
    let upper = rank.ceil() as usize;
    let frac = rank - lower as f64;
    sorted[lower] + (sorted[upper] - sorted[lower]) * frac
}

/// Shannon entropy (natural log) of a frequency table
pub fn shannon_entropy<I>(counts: I) -> f64
where
    I: IntoIterator<Item = usize>,
{
    let counts: Vec<usize> = counts.into_iter().filter(|&c| c > 0).collect();
    let total: usize = counts.iter().sum();
    if total == 0 {
        return 0.0;
    }
    counts
        .iter()
        .map(|&c| {
            let p = c as f64 / total as f64;
            -p * p.ln()
        })
        .sum()
}

/// Entropy divided by ln(k); 0 when fewer than two categories
pub fn normalized_entropy(entropy: f64, categories: usize) -> f64 {
    if categories < 2 {
        return 0.0;
    }
    (entropy / (categories as f64).ln()).clamp(0.0, 1.0)
}

/// Normalized entropy of the distinct items of a slice
pub fn item_entropy<T: Eq + Hash>(items: &[T]) -> f64 {
    let mut counts: HashMap<&T, usize> = HashMap::new();
    for item in items {
        *counts.entry(item).or_insert(0) += 1;
    }
    let k = counts.len();
    normalized_entropy(shannon_entropy(counts.into_values()), k)
}

/// Normalized entropy of a histogram of `values` over `bins` equal-width bins
pub fn histogram_entropy(values: &[f64], bins: usize) -> f64 {
    if values.len() < 2 || bins < 2 {
        return 0.0;
    }
    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let width = max - min;
    if width <= EPSILON {
        return 0.0;
    }
    let mut hist = vec![0usize; bins];
    for v in values {
        let idx = (((v - min) / width) * bins as f64) as usize;
        hist[idx.min(bins - 1)] += 1;
    }
    normalized_entropy(shannon_entropy(hist), bins)
}

/// Score in [0, 1]: 0.5 at the threshold, 1.0 at twice the threshold
pub fn threshold_score(deviation: f64, threshold: f64) -> f64 {
    if threshold <= 0.0 {
        return 1.0;
    }
    (deviation.abs() / (2.0 * threshold)).clamp(0.0, 1.0)
}

/// Combine independent scores in [0, 1]: 1 - prod(1 - s)
pub fn combine_scores<I: IntoIterator<Item = f64>>(scores: I) -> f64 {
    1.0 - scores
        .into_iter()
        .map(|s| 1.0 - s.clamp(0.0, 1.0))
        .product::<f64>()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mean_and_std() {
        let v = [2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0];
        assert_eq!(mean(&v), 5.0);
        assert!((std_dev(&v) - 2.0).abs() < 1e-12);
        assert_eq!(std_dev(&[3.0]), 0.0);
        assert_eq!(sample_std_dev(&[3.0]), 0.0);
    }

    #[test]
    fn test_percentile_interpolates() {
        let v = [1.0, 2.0, 3.0, 4.0, 5.0];
        assert_eq!(percentile(&v, 50.0), 3.0);
        assert_eq!(percentile(&v, 100.0), 5.0);
        assert!((percentile(&v, 95.0) - 4.8).abs() < 1e-12);
    }

    #[test]
    fn test_entropy_single_category_is_zero() {
        assert_eq!(shannon_entropy(vec![42]), 0.0);
        assert_eq!(item_entropy(&["tcp", "tcp", "tcp"]), 0.0);
    }

    #[test]
    fn test_entropy_uniform_is_ln_k() {
        let h = shannon_entropy(vec![10, 10, 10, 10]);
        assert!((h - 4f64.ln()).abs() < 1e-12);
        assert!((normalized_entropy(h, 4) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_combine_scores_monotonic() {
        let a = combine_scores(vec![0.2, 0.3]);
        let b = combine_scores(vec![0.2, 0.5]);
        assert!(b > a);
        assert_eq!(combine_scores(Vec::<f64>::new()), 0.0);
    }
}
