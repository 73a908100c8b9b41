//! Anomaly Detector - volume, pattern and protocol checks
//!
//! Each check returns its findings plus the windows it had to skip.
//! `detect_anomalies` merges them by union.

use std::collections::BTreeSet;

use rayon::prelude::*;

use super::types::*;
use crate::logic::config::AnalyzerConfig;
use crate::logic::protocol::protocol_entropy;
use crate::logic::stats::{mean, std_dev, threshold_score, EPSILON};
use crate::logic::temporal::bursts::{deviation, trailing_baseline};
use crate::logic::traffic::{PatternShape, WindowedTraffic};

/// Std floor for pattern metrics, as a fraction of |mean|
const PATTERN_STD_FLOOR: f64 = 0.05;

fn skipped(kind: AnomalyKind, windows: Vec<usize>, reason: String) -> Option<SkippedCheck> {
    if windows.is_empty() {
        None
    } else {
        Some(SkippedCheck { kind, windows, reason })
    }
}

// ============================================================================
// VOLUME
// ============================================================================

pub fn detect_volume_anomalies(traffic: &WindowedTraffic<'_>, config: &AnalyzerConfig) -> AnomalyReport {
    let series = traffic.byte_series();
    let mut report = AnomalyReport::default();
    let mut seed = Vec::new();

    for window in &traffic.windows {
        let i = window.index;
        let Some((m, s)) = trailing_baseline(&series, i, config.min_history_windows, config.trailing_windows)
        else {
            seed.push(i);
            continue;
        };
        let dev = deviation(series[i], m, s);
        if dev.abs() > config.volume_threshold {
            let direction = if dev > 0.0 { "above" } else { "below" };
            report.findings.push(AnomalyFinding {
                kind: AnomalyKind::Volume,
                window_index: i,
                start: window.start,
                end: window.end,
                score: threshold_score(dev, config.volume_threshold),
                observed: series[i],
                expected: m,
                description: format!(
                    "{:.0} bytes is {:.1} sd {} the trailing mean of {:.0}",
                    series[i],
                    dev.abs(),
                    direction,
                    m
                ),
            });
        }
    }

    report.skipped.extend(skipped(
        AnomalyKind::Volume,
        seed,
        format!("fewer than {} prior windows", config.min_history_windows),
    ));
    report
}

// ============================================================================
// PATTERN
// ============================================================================

fn z_score(value: f64, history: &[f64]) -> f64 {
    let m = mean(history);
    let sd = std_dev(history).max(PATTERN_STD_FLOOR * m.abs()).max(EPSILON);
    (value - m) / sd
}

pub fn detect_pattern_anomalies(
    traffic: &WindowedTraffic<'_>,
    shapes: &[PatternShape],
    config: &AnalyzerConfig,
) -> AnomalyReport {
    let mut report = AnomalyReport::default();
    let mut short_history = Vec::new();

    for (j, shape) in shapes.iter().enumerate() {
        let prior: Vec<&PatternShape> = shapes[..j].iter().filter(|p| p.hour == shape.hour).collect();
        if prior.len() < config.min_pattern_history {
            short_history.push(shape.window_index);
            continue;
        }

        let peers: Vec<f64> = prior.iter().map(|p| p.unique_peers as f64).collect();
        let sizes: Vec<f64> = prior.iter().map(|p| p.average_packet_size).collect();
        let candidates = [
            ("unique peers", shape.unique_peers as f64, mean(&peers), z_score(shape.unique_peers as f64, &peers)),
            ("average packet size", shape.average_packet_size, mean(&sizes), z_score(shape.average_packet_size, &sizes)),
        ];
        let Some((metric, observed, expected, z)) = candidates
            .iter()
            .copied()
            .max_by(|a, b| a.3.abs().total_cmp(&b.3.abs()))
        else {
            continue;
        };

        if z.abs() > config.pattern_threshold {
            let Some(window) = traffic.windows.get(shape.window_index) else { continue };
            report.findings.push(AnomalyFinding {
                kind: AnomalyKind::Pattern,
                window_index: shape.window_index,
                start: window.start,
                end: window.end,
                score: threshold_score(z, config.pattern_threshold),
                observed,
                expected,
                description: format!(
                    "{} {:.1} deviates {:.1} sd from {} prior windows at {:02}:00",
                    metric,
                    observed,
                    z.abs(),
                    prior.len(),
                    shape.hour
                ),
            });
        }
    }

    report.skipped.extend(skipped(
        AnomalyKind::Pattern,
        short_history,
        format!(
            "fewer than {} prior patterns in the same hour-of-day bucket",
            config.min_pattern_history
        ),
    ));
    report
}

// ============================================================================
// PROTOCOL
// ============================================================================

enum ProtocolCheck {
    Finding(AnomalyFinding),
    TooFewRecords(usize),
    Normal,
}

pub fn detect_protocol_anomalies(traffic: &WindowedTraffic<'_>, config: &AnalyzerConfig) -> AnomalyReport {
    let mut report = AnomalyReport::default();
    let non_empty: Vec<usize> = traffic.windows.iter().filter(|w| !w.is_empty()).map(|w| w.index).collect();

    let global: BTreeSet<&str> = traffic
        .partition
        .iter()
        .flatten()
        .map(|r| r.protocol.as_str())
        .collect();
    let k_global = global.len();
    if k_global < 2 {
        report.skipped.extend(skipped(
            AnomalyKind::Protocol,
            non_empty,
            format!("batch carries {} protocol(s), need at least 2", k_global),
        ));
        return report;
    }
    let scale = (k_global as f64).ln();

    let checks: Vec<ProtocolCheck> = non_empty
        .par_iter()
        .map(|&i| {
            let records = traffic.records(i);
            if records.len() < config.min_window_records {
                return ProtocolCheck::TooFewRecords(i);
            }
            let (h, _, k) = protocol_entropy(records.iter().copied());
            let normalized = (h / scale).clamp(0.0, 1.0);
            if normalized >= config.entropy_threshold {
                return ProtocolCheck::Normal;
            }
            let window = &traffic.windows[i];
            ProtocolCheck::Finding(AnomalyFinding {
                kind: AnomalyKind::Protocol,
                window_index: i,
                start: window.start,
                end: window.end,
                score: ((config.entropy_threshold - normalized) / config.entropy_threshold).clamp(0.0, 1.0),
                observed: normalized,
                expected: config.entropy_threshold,
                description: format!(
                    "protocol entropy {:.2} below {:.2} ({} of {} protocols in use)",
                    normalized, config.entropy_threshold, k, k_global
                ),
            })
        })
        .collect();

    let mut sparse = Vec::new();
    for check in checks {
        match check {
            ProtocolCheck::Finding(f) => report.findings.push(f),
            ProtocolCheck::TooFewRecords(i) => sparse.push(i),
            ProtocolCheck::Normal => {}
        }
    }
    report.skipped.extend(skipped(
        AnomalyKind::Protocol,
        sparse,
        format!("fewer than {} records in window", config.min_window_records),
    ));
    report
}

// ============================================================================
// UNION
// ============================================================================

pub fn detect_anomalies(
    traffic: &WindowedTraffic<'_>,
    shapes: &[PatternShape],
    config: &AnalyzerConfig,
) -> AnomalyReport {
    let mut report = detect_volume_anomalies(traffic, config);
    report.merge(detect_pattern_anomalies(traffic, shapes, config));
    report.merge(detect_protocol_anomalies(traffic, config));

    log::info!(
        "Anomaly detection: {} findings, {} skipped checks",
        report.findings.len(),
        report.skipped.len()
    );
    report
}
