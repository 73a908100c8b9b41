//! DBSCAN over the rows of a feature matrix
//!
//! A point counts itself as a neighbor. Cluster ids follow input order,
//! so the same matrix always yields the same labels.

use std::collections::VecDeque;

use ndarray::{Array2, ArrayView1};
use rayon::prelude::*;

use super::types::ClusterLabel;

fn euclidean(a: ArrayView1<'_, f64>, b: ArrayView1<'_, f64>) -> f64 {
    a.iter().zip(b.iter()).map(|(x, y)| (x - y).powi(2)).sum::<f64>().sqrt()
}

/// Indices within `eps` of each row (inclusive), computed in parallel
pub fn neighborhoods(points: &Array2<f64>, eps: f64) -> Vec<Vec<usize>> {
    let n = points.nrows();
    (0..n)
        .into_par_iter()
        .map(|i| {
            let row = points.row(i);
            (0..n).filter(|&j| euclidean(row, points.row(j)) <= eps).collect()
        })
        .collect()
}

pub fn dbscan(points: &Array2<f64>, eps: f64, min_samples: usize) -> Vec<ClusterLabel> {
    let n = points.nrows();
    let neighbors = neighborhoods(points, eps);
    let is_core = |i: usize| neighbors[i].len() >= min_samples;

    let mut labels: Vec<Option<ClusterLabel>> = vec![None; n];
    let mut next_id = 0;

    for i in 0..n {
        if labels[i].is_some() {
            continue;
        }
        if !is_core(i) {
            labels[i] = Some(ClusterLabel::Noise);
            continue;
        }

        let id = next_id;
        next_id += 1;
        labels[i] = Some(ClusterLabel::Core(id));
        let mut queue: VecDeque<usize> = neighbors[i].iter().copied().collect();

        while let Some(j) = queue.pop_front() {
            match labels[j] {
                // Border point previously marked as noise
                Some(ClusterLabel::Noise) => labels[j] = Some(ClusterLabel::Core(id)),
                Some(ClusterLabel::Core(_)) => continue,
                None => {
                    labels[j] = Some(ClusterLabel::Core(id));
                    if is_core(j) {
                        queue.extend(neighbors[j].iter().copied());
                    }
                }
            }
        }
    }

    labels
        .into_iter()
        .map(|l| l.unwrap_or(ClusterLabel::Noise))
        .collect()
}
