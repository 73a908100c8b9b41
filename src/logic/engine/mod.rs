//! Engine Module - Traffic Analysis Orchestration
//!
//! `TrafficAnalyzer` runs every analysis method over one batch and
//! assembles an `AnalysisReport`. Learned state lives in the caller's
//! `AnalysisContext`, so one analyzer can serve many contexts.
//!
//! # Pipeline
//! 1. Window the records
//! 2. Temporal, spatial and protocol analysis
//! 3. Volume / pattern / protocol anomalies
//! 4. Behavioral assessment against the context baseline, then training
//!    on windows without a volume or behavioral finding
//! 5. Threat event clustering
//! 6. Per-window patterns, cross-method correlation, risk

pub mod context;
pub mod report;
#[cfg(test)]
mod tests;

pub use context::AnalysisContext;
pub use report::{AnalysisInput, AnalysisReport, BehavioralSection};

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;

use chrono::Utc;
use rayon::prelude::*;

use crate::constants::APP_VERSION;
use crate::logic::anomaly::{detect_anomalies, AnomalyFinding, AnomalyKind, AnomalyReport};
use crate::logic::baseline::{
    behavior_sample, untrained_warnings, BehaviorSample, BehavioralAssessment, DetectionSettings,
};
use crate::logic::config::AnalyzerConfig;
use crate::logic::error::{AnalysisError, AnalysisWarning, Outcome, Result};
use crate::logic::protocol::analyze_protocols;
use crate::logic::risk::{
    assess_risk, correlate_findings, CorrelationInput, DefaultRecommendations, DefaultRiskFactors,
    RecommendationStrategy, RiskFactorStrategy, RiskInput,
};
use crate::logic::spatial::{analyze_spatial, FlowGraph};
use crate::logic::temporal::analyze_temporal;
use crate::logic::threat::{AttackPattern, ClusteringOutcome, ThreatEvent, ThreatFeatureExtractor, ThreatPatternClusterer};
use crate::logic::traffic::{build_patterns, ingest, partition_bounded, shapes, TrafficRecord, WindowedTraffic};

pub struct TrafficAnalyzer {
    config: AnalyzerConfig,
    clusterer: ThreatPatternClusterer,
    risk_factors: Arc<dyn RiskFactorStrategy>,
    recommendations: Arc<dyn RecommendationStrategy>,
}

impl TrafficAnalyzer {
    /// Fails only on invalid configuration
    pub fn new(config: AnalyzerConfig) -> Result<Self> {
        config.validate()?;
        let recommendations: Arc<dyn RecommendationStrategy> = Arc::new(DefaultRecommendations);
        Ok(Self {
            clusterer: ThreatPatternClusterer::from_config(&config).with_recommendations(recommendations.clone()),
            config,
            risk_factors: Arc::new(DefaultRiskFactors),
            recommendations,
        })
    }

    pub fn with_risk_factors(mut self, strategy: Arc<dyn RiskFactorStrategy>) -> Self {
        self.risk_factors = strategy;
        self
    }

    /// Used for both attack patterns and the overall assessment
    pub fn with_recommendations(mut self, strategy: Arc<dyn RecommendationStrategy>) -> Self {
        self.clusterer = self.clusterer.with_recommendations(strategy.clone());
        self.recommendations = strategy;
        self
    }

    pub fn with_extractor(mut self, extractor: Arc<dyn ThreatFeatureExtractor>) -> Self {
        self.clusterer = self.clusterer.with_extractor(extractor);
        self
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    // ========================================================================
    // ENTRY POINTS
    // ========================================================================

    /// Lenient entry point: malformed records are skipped with a warning
    pub fn analyze(&self, input: AnalysisInput, ctx: &AnalysisContext) -> Result<AnalysisReport> {
        let (records, mut warnings) = ingest(input.records);
        let mut report = self.run(&records, &input.threat_events, ctx)?;
        warnings.append(&mut report.warnings);
        report.warnings = warnings;
        Ok(report)
    }

    pub fn analyze_traffic(&self, records: &[TrafficRecord], ctx: &AnalysisContext) -> Result<AnalysisReport> {
        self.run(records, &[], ctx)
    }

    pub fn analyze_with_threats(
        &self,
        records: &[TrafficRecord],
        events: &[ThreatEvent],
        ctx: &AnalysisContext,
    ) -> Result<AnalysisReport> {
        self.run(records, events, ctx)
    }

    /// Clustering alone, without traffic
    pub fn identify_attack_patterns(&self, events: &[ThreatEvent]) -> Result<ClusteringOutcome> {
        self.clusterer.identify_attack_patterns(events)
    }

    /// Assess one sample against the context baseline without training it
    pub fn assess_behavior(&self, records: &[TrafficRecord], ctx: &AnalysisContext) -> Result<BehavioralAssessment> {
        let sample = whole_sample(records)?;
        Ok(ctx.baseline().detect(&sample, &DetectionSettings::from(&self.config)))
    }

    /// Train the context baseline on one sample
    pub fn train_baseline(&self, records: &[TrafficRecord], ctx: &AnalysisContext) -> Result<()> {
        let sample = whole_sample(records)?;
        ctx.baseline().train(&sample);
        Ok(())
    }

    // ========================================================================
    // PIPELINE
    // ========================================================================

    fn run(&self, records: &[TrafficRecord], events: &[ThreatEvent], ctx: &AnalysisContext) -> Result<AnalysisReport> {
        let run = ctx.record_run();
        log::info!(
            "[{}] Analysis run {}: {} records, {} threat events",
            ctx.tenant(),
            run,
            records.len(),
            events.len()
        );

        let mut warnings = Vec::new();
        if records.is_empty() {
            warnings.push(AnalysisWarning::insufficient("traffic", "no traffic records supplied"));
        }

        let traffic = match partition_bounded(records, self.config.window_size_secs, self.config.max_windows) {
            Ok(traffic) => traffic,
            Err(err) if err.is_recoverable() => {
                log::warn!("[{}] Windowed analysis skipped (E{}): {}", ctx.tenant(), err.error_code(), err);
                warnings.push(AnalysisWarning::try_from(err)?);
                WindowedTraffic::empty(self.config.window_size_secs)
            }
            Err(err) => return Err(err),
        };
        let pattern_shapes = shapes(&traffic);

        let temporal = analyze_temporal(&traffic, &self.config, &mut warnings);
        let graph = FlowGraph::from_records(records);
        let spatial = analyze_spatial(&graph, &self.config, &mut warnings);
        let reference = ctx.reference_combinations();
        let protocol = analyze_protocols(records, self.config.rarity_threshold, reference.as_ref());

        let mut anomalies = detect_anomalies(&traffic, &pattern_shapes, &self.config);

        let (assessments, samples) = self.assess_windows(&traffic, ctx);
        warnings.extend(untrained_warnings(&assessments));
        anomalies.merge(behavioral_findings(&traffic, &assessments));
        if self.config.learn_baseline {
            let flagged = deviating_windows(&anomalies);
            let clean = samples
                .iter()
                .filter(|s| s.window_index.map_or(true, |i| !flagged.contains(&i)));
            let trained = ctx.baseline().train_all(clean);
            if trained < samples.len() {
                log::info!(
                    "[{}] Baseline skipped {} deviating window(s)",
                    ctx.tenant(),
                    samples.len() - trained
                );
            }
            ctx.learn_combinations(records);
        }

        let attack_patterns = self.cluster_events(events, &mut warnings)?;
        let no_patterns = BTreeMap::new();
        let patterns_ref = attack_patterns.computed().unwrap_or(&no_patterns);

        let traffic_patterns = build_patterns(&traffic, &window_scores(&anomalies));

        let empty_bursts = Vec::new();
        let bursts = temporal.bursts.computed().unwrap_or(&empty_bursts);
        let empty_hotspots = Vec::new();
        let hotspots = spatial.hotspots.computed().unwrap_or(&empty_hotspots);

        let correlated_findings = correlate_findings(&CorrelationInput {
            traffic: &traffic,
            anomalies: &anomalies,
            bursts,
            hotspots,
            unusual: &protocol.unusual_combinations,
            attack_patterns: patterns_ref,
        });

        let risk_assessment = assess_risk(
            &RiskInput {
                window_count: traffic.len(),
                anomalies: &anomalies,
                bursts,
                spatial: &spatial,
                protocol: &protocol,
                attack_patterns: patterns_ref,
                behavioral: &assessments,
            },
            self.risk_factors.as_ref(),
            self.recommendations.as_ref(),
        );

        for w in &warnings {
            log::debug!("[{}] {:?}: {}", w.component, w.kind, w.message);
        }

        let settings = DetectionSettings::from(&self.config);
        Ok(AnalysisReport {
            report_id: uuid::Uuid::new_v4().to_string(),
            tenant: ctx.tenant().to_string(),
            run,
            generated_at: Utc::now(),
            engine_version: APP_VERSION.to_string(),
            window_size_secs: self.config.window_size_secs,
            record_count: records.len(),
            windows: traffic.windows.clone(),
            temporal,
            spatial,
            protocol,
            anomalies,
            traffic_patterns,
            attack_patterns,
            behavioral: BehavioralSection {
                assessments,
                baseline: ctx.baseline().snapshot(settings.min_samples),
            },
            correlated_findings,
            risk_assessment,
            warnings,
        })
    }

    /// Assess every non-empty window against the baseline as it stood
    /// before this batch. Returns the assessments and the samples.
    fn assess_windows(
        &self,
        traffic: &WindowedTraffic<'_>,
        ctx: &AnalysisContext,
    ) -> (Vec<BehavioralAssessment>, Vec<BehaviorSample>) {
        let settings = DetectionSettings::from(&self.config);
        let samples: Vec<BehaviorSample> = (0..traffic.len())
            .into_par_iter()
            .filter_map(|i| behavior_sample(traffic.records(i), Some(i)))
            .collect();
        let assessments: Vec<BehavioralAssessment> = samples
            .par_iter()
            .map(|s| ctx.baseline().detect(s, &settings))
            .collect();

        let anomalous = assessments.iter().filter(|a| a.is_anomalous()).count();
        if anomalous > 0 {
            log::warn!("[{}] {} window(s) deviate from the behavioral baseline", ctx.tenant(), anomalous);
        }
        (assessments, samples)
    }

    fn cluster_events(
        &self,
        events: &[ThreatEvent],
        warnings: &mut Vec<AnalysisWarning>,
    ) -> Result<Outcome<BTreeMap<usize, AttackPattern>>> {
        if events.is_empty() {
            return Ok(Outcome::not_computed("no threat events supplied"));
        }
        let outcome = self.clusterer.identify_attack_patterns(events)?;
        if outcome.patterns.is_empty() {
            warnings.push(AnalysisWarning::insufficient(
                "threat",
                format!(
                    "{} threat events formed no cluster (eps {}, min_samples {})",
                    events.len(),
                    self.config.cluster_eps,
                    self.config.cluster_min_samples
                ),
            ));
        }
        Ok(Outcome::Computed(outcome.patterns))
    }
}

fn whole_sample(records: &[TrafficRecord]) -> Result<BehaviorSample> {
    let refs: Vec<&TrafficRecord> = records.iter().collect();
    behavior_sample(&refs, None).ok_or_else(|| AnalysisError::insufficient("baseline", "no records in sample"))
}

/// Windows with a volume or behavioral finding; kept out of the baseline
fn deviating_windows(anomalies: &AnomalyReport) -> BTreeSet<usize> {
    anomalies
        .findings
        .iter()
        .filter(|f| matches!(f.kind, AnomalyKind::Volume | AnomalyKind::Behavioral))
        .map(|f| f.window_index)
        .collect()
}

/// Anomalous assessments as `Behavioral` findings
fn behavioral_findings(traffic: &WindowedTraffic<'_>, assessments: &[BehavioralAssessment]) -> AnomalyReport {
    let findings = assessments
        .iter()
        .filter(|a| a.is_anomalous())
        .filter_map(|a| {
            let window = traffic.windows.get(a.window_index?)?;
            let worst = a.flagged().max_by(|x, y| x.deviation.total_cmp(&y.deviation))?;
            Some(AnomalyFinding {
                kind: AnomalyKind::Behavioral,
                window_index: window.index,
                start: window.start,
                end: window.end,
                score: a.severity,
                observed: worst.value,
                expected: worst.baseline_mean,
                description: format!(
                    "{} feature(s) off baseline, worst {} at {:.1} (limit {:.1})",
                    a.flagged().count(),
                    worst.feature,
                    worst.deviation,
                    worst.threshold
                ),
            })
        })
        .collect();
    AnomalyReport {
        findings,
        skipped: Vec::new(),
    }
}

fn window_scores(anomalies: &AnomalyReport) -> BTreeMap<usize, Vec<f64>> {
    let mut scores: BTreeMap<usize, Vec<f64>> = BTreeMap::new();
    for f in &anomalies.findings {
        scores.entry(f.window_index).or_default().push(f.score);
    }
    scores
}
