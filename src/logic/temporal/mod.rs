//! Temporal Pattern Analyzer
//!
//! Works on the per-window byte series produced by the aggregator.
//!
//! ## Structure
//! - `seasonality`: autocorrelation period search
//! - `decompose`: additive trend/seasonal/residual split
//! - `bursts`: trailing mean/std burst test
//! - `recurring`: hour-of-day and weekday buckets

pub mod types;
pub mod seasonality;
pub mod decompose;
pub mod bursts;
pub mod recurring;

pub use types::{Burst, Decomposition, RecurringBucket, RecurringPatterns, Seasonality, TemporalAnalysis};
pub use seasonality::{autocorrelation, detect_seasonality};
pub use decompose::{centered_trend, decompose};
pub use bursts::detect_bursts;
pub use recurring::extract_recurring;

use crate::logic::config::AnalyzerConfig;
use crate::logic::error::{AnalysisWarning, Outcome};
use crate::logic::traffic::WindowedTraffic;

const COMPONENT: &str = "temporal";

/// Run every temporal method over the windowed traffic.
/// Methods that lack data are marked not computed and reported in `warnings`.
pub fn analyze_temporal(
    traffic: &WindowedTraffic<'_>,
    config: &AnalyzerConfig,
    warnings: &mut Vec<AnalysisWarning>,
) -> TemporalAnalysis {
    let series = traffic.byte_series();
    let n = series.len();

    if n < 4 {
        let reason = format!("{} windows, need at least 4", n);
        warnings.push(AnalysisWarning::insufficient(COMPONENT, reason.clone()));
        return TemporalAnalysis {
            seasonality: Outcome::not_computed(reason.clone()),
            decomposition: Outcome::not_computed(reason),
            bursts: bursts_outcome(traffic, &series, config, warnings),
            recurring: extract_recurring(&traffic.windows),
        };
    }

    let seasonality = detect_seasonality(&series, config.default_period, config.seasonality_min_strength);
    if seasonality.detected {
        log::info!("Detected seasonality: period {} (acf {:.2})", seasonality.period, seasonality.strength);
    } else {
        log::debug!("No dominant period, using default {}", seasonality.period);
    }

    let decomposition = decompose(&series, seasonality.period);
    if !decomposition.has_seasonal() {
        warnings.push(AnalysisWarning::insufficient(
            COMPONENT,
            format!(
                "{} windows cover fewer than two periods of {}; seasonal component omitted",
                n, seasonality.period
            ),
        ));
    }

    TemporalAnalysis {
        seasonality: Outcome::Computed(seasonality),
        decomposition: Outcome::Computed(decomposition),
        bursts: bursts_outcome(traffic, &series, config, warnings),
        recurring: extract_recurring(&traffic.windows),
    }
}

fn bursts_outcome(
    traffic: &WindowedTraffic<'_>,
    series: &[f64],
    config: &AnalyzerConfig,
    warnings: &mut Vec<AnalysisWarning>,
) -> Outcome<Vec<Burst>> {
    if series.len() <= config.min_history_windows {
        let reason = format!(
            "burst detection needs more than {} windows, got {}",
            config.min_history_windows,
            series.len()
        );
        warnings.push(AnalysisWarning::insufficient(COMPONENT, reason.clone()));
        return Outcome::not_computed(reason);
    }
    Outcome::Computed(detect_bursts(
        &traffic.windows,
        series,
        config.burst_factor,
        config.min_history_windows,
        config.trailing_windows,
    ))
}
