//! Risk Strategies
//!
//! `RiskFactorStrategy` decides which factors a report carries;
//! `RecommendationStrategy` turns factors and attack patterns into actions.
//! Both are swappable on `TrafficAnalyzer`.

use std::collections::BTreeMap;

use super::types::*;
use crate::logic::anomaly::AnomalyReport;
use crate::logic::baseline::BehavioralAssessment;
use crate::logic::protocol::ProtocolAnalysis;
use crate::logic::spatial::SpatialAnalysis;
use crate::logic::stats::combine_scores;
use crate::logic::temporal::Burst;
use crate::logic::threat::{AttackPattern, CommonAttribute, PatternSeverity, SeverityLevel};

/// Everything a risk strategy may look at
pub struct RiskInput<'a> {
    pub window_count: usize,
    pub anomalies: &'a AnomalyReport,
    pub bursts: &'a [Burst],
    pub spatial: &'a SpatialAnalysis,
    pub protocol: &'a ProtocolAnalysis,
    pub attack_patterns: &'a BTreeMap<usize, AttackPattern>,
    pub behavioral: &'a [BehavioralAssessment],
}

pub trait RiskFactorStrategy: Send + Sync {
    fn risk_factors(&self, input: &RiskInput<'_>) -> Vec<RiskFactor>;
}

pub trait RecommendationStrategy: Send + Sync {
    fn for_attack_pattern(&self, severity: &PatternSeverity, attributes: &[CommonAttribute]) -> Vec<String>;

    fn for_risk(&self, factors: &[RiskFactor], class: ThreatClass) -> Vec<String> {
        default_risk_recommendations(factors, class)
    }
}

/// 10 x (1 - prod(1 - w*s))
pub fn overall_risk_score(factors: &[RiskFactor]) -> f64 {
    10.0 * combine_scores(factors.iter().map(|f| f.contribution()))
}

pub fn assess_risk(
    input: &RiskInput<'_>,
    factors: &dyn RiskFactorStrategy,
    recommendations: &dyn RecommendationStrategy,
) -> RiskAssessment {
    let risk_factors = factors.risk_factors(input);
    let overall_risk_score = overall_risk_score(&risk_factors);
    let threat_class = ThreatClass::from_risk_score(overall_risk_score);
    let recommendations = recommendations.for_risk(&risk_factors, threat_class);

    log::info!(
        "Risk assessment: {:.2}/10 ({}), {} factors",
        overall_risk_score,
        threat_class,
        risk_factors.len()
    );

    RiskAssessment {
        overall_risk_score,
        threat_class,
        risk_factors,
        recommendations,
    }
}

// ============================================================================
// DEFAULT RISK FACTORS
// ============================================================================

/// Default factors and weights:
///
/// | factor              | score                                 | weight |
/// |---------------------|---------------------------------------|--------|
/// | anomaly_density     | 4 x anomalous windows / windows       | 0.6    |
/// | peak_anomaly        | highest finding score                 | 0.5    |
/// | traffic_bursts      | bursts / 3                            | 0.4    |
/// | fan_out_hosts       | fan-out hosts / 3                     | 0.5    |
/// | hotspots            | hotspots / 5                          | 0.3    |
/// | unusual_protocols   | unusual (protocol, port) pairs / 5    | 0.4    |
/// | attack_patterns     | highest pattern severity score        | 0.9    |
/// | zero_day_behavior   | highest behavioral severity           | 0.9    |
///
/// Scores are capped at 1; factors scoring 0 are omitted.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRiskFactors;

impl RiskFactorStrategy for DefaultRiskFactors {
    fn risk_factors(&self, input: &RiskInput<'_>) -> Vec<RiskFactor> {
        let mut factors = Vec::new();

        let mut anomalous: Vec<usize> = input.anomalies.findings.iter().map(|f| f.window_index).collect();
        anomalous.sort_unstable();
        anomalous.dedup();
        if input.window_count > 0 && !anomalous.is_empty() {
            let ratio = anomalous.len() as f64 / input.window_count as f64;
            factors.push(RiskFactor::new(
                "anomaly_density",
                4.0 * ratio,
                0.6,
                format!("{} of {} windows anomalous", anomalous.len(), input.window_count),
            ));
        }

        if let Some(peak) = input.anomalies.findings.iter().max_by(|a, b| a.score.total_cmp(&b.score)) {
            factors.push(RiskFactor::new(
                "peak_anomaly",
                peak.score,
                0.5,
                format!("strongest {} anomaly in window {}", peak.kind, peak.window_index),
            ));
        }

        push_count(&mut factors, "traffic_bursts", input.bursts.len(), 3.0, 0.4, "traffic bursts");
        push_count(
            &mut factors,
            "fan_out_hosts",
            input.spatial.flow_patterns.fan_out.len(),
            3.0,
            0.5,
            "hosts contacting many peers",
        );
        push_count(
            &mut factors,
            "hotspots",
            input.spatial.hotspots.computed().map_or(0, |h| h.len()),
            5.0,
            0.3,
            "traffic hotspots",
        );
        push_count(
            &mut factors,
            "unusual_protocols",
            input.protocol.unusual_combinations.len(),
            5.0,
            0.4,
            "unusual protocol/port pairs",
        );

        if let Some(worst) = input
            .attack_patterns
            .values()
            .max_by(|a, b| a.severity.score.total_cmp(&b.severity.score))
        {
            factors.push(RiskFactor::new(
                "attack_patterns",
                worst.severity.score,
                0.9,
                format!(
                    "{} attack pattern(s), worst {} ({} events)",
                    input.attack_patterns.len(),
                    worst.severity.level,
                    worst.size()
                ),
            ));
        }

        let anomalous_behavior: Vec<&BehavioralAssessment> =
            input.behavioral.iter().filter(|a| a.is_anomalous()).collect();
        if let Some(max) = anomalous_behavior.iter().map(|a| a.severity).reduce(f64::max) {
            factors.push(RiskFactor::new(
                "zero_day_behavior",
                max,
                0.9,
                format!("{} sample(s) deviate from the behavioral baseline", anomalous_behavior.len()),
            ));
        }

        factors.retain(|f| f.score > 0.0);
        factors
    }
}

fn push_count(factors: &mut Vec<RiskFactor>, name: &str, count: usize, saturation: f64, weight: f64, what: &str) {
    if count > 0 {
        factors.push(RiskFactor::new(
            name,
            count as f64 / saturation,
            weight,
            format!("{} {}", count, what),
        ));
    }
}

// ============================================================================
// DEFAULT RECOMMENDATIONS
// ============================================================================

/// Default actions: severity-tiered advice for attack patterns, plus
/// per-factor advice and a class summary for the overall assessment.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultRecommendations;

impl RecommendationStrategy for DefaultRecommendations {
    fn for_attack_pattern(&self, severity: &PatternSeverity, attributes: &[CommonAttribute]) -> Vec<String> {
        let mut actions: Vec<String> = match severity.level {
            SeverityLevel::Critical => vec![
                "Block the pattern's source addresses at the perimeter".into(),
                "Open an incident and preserve related flow records".into(),
            ],
            SeverityLevel::High => vec![
                "Rate-limit or temporarily block the pattern's sources".into(),
                "Review exposure of the targeted services".into(),
            ],
            SeverityLevel::Medium => vec!["Add the pattern signature to the watchlist".into()],
            SeverityLevel::Low => vec!["Monitor the pattern for recurrence".into()],
        };

        if severity.level >= SeverityLevel::High {
            for attr in attributes {
                match attr.attribute.as_str() {
                    "source_ip" => actions.push(format!("Investigate source host {}", attr.value)),
                    "destination_port" => actions.push(format!("Restrict access to port {}", attr.value)),
                    _ => {}
                }
            }
        }
        actions
    }
}

pub fn default_risk_recommendations(factors: &[RiskFactor], class: ThreatClass) -> Vec<String> {
    let mut actions: Vec<String> = factors
        .iter()
        .filter_map(|f| {
            let advice = match f.name.as_str() {
                "anomaly_density" | "peak_anomaly" => "Review the anomalous windows and their top talkers",
                "traffic_bursts" => "Check burst windows for exfiltration or flooding",
                "fan_out_hosts" => "Inspect fan-out hosts for scanning or lateral movement",
                "hotspots" => "Verify that hotspot hosts are expected to carry their traffic share",
                "unusual_protocols" => "Audit unusual protocol/port pairs against policy",
                "attack_patterns" => "Apply the actions listed on each attack pattern",
                "zero_day_behavior" => "Escalate baseline deviations for manual analysis",
                _ => return None,
            };
            Some(advice.to_string())
        })
        .collect();
    actions.dedup();

    match class {
        ThreatClass::Malicious => actions.insert(0, "Treat as an active incident".to_string()),
        ThreatClass::Suspicious => actions.push("Increase monitoring on affected hosts".to_string()),
        ThreatClass::Benign if actions.is_empty() => actions.push("No action required".to_string()),
        ThreatClass::Benign => {}
    }
    actions
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overall_score_bounds() {
        assert_eq!(overall_risk_score(&[]), 0.0);
        let one = [RiskFactor::new("x", 1.0, 1.0, "")];
        assert!((overall_risk_score(&one) - 10.0).abs() < 1e-12);
        let half = [RiskFactor::new("x", 0.5, 1.0, ""), RiskFactor::new("y", 0.5, 1.0, "")];
        assert!((overall_risk_score(&half) - 7.5).abs() < 1e-12);
    }

    #[test]
    fn test_threat_class_mapping() {
        assert_eq!(ThreatClass::from_risk_score(3.9), ThreatClass::Benign);
        assert_eq!(ThreatClass::from_risk_score(4.0), ThreatClass::Suspicious);
        assert_eq!(ThreatClass::from_risk_score(8.0), ThreatClass::Malicious);
    }

    #[test]
    fn test_factor_clamping() {
        let f = RiskFactor::new("x", 3.0, 2.0, "");
        assert_eq!((f.score, f.weight), (1.0, 1.0));
    }

    #[test]
    fn test_pattern_recommendations_by_level() {
        let severity = |level| PatternSeverity {
            level,
            score: 0.0,
            size_factor: 0.0,
            extremity: 0.0,
            temporal_density: 0.0,
        };
        let attrs = vec![CommonAttribute {
            attribute: "destination_port".into(),
            value: "22".into(),
            support: 1.0,
        }];
        let critical = DefaultRecommendations.for_attack_pattern(&severity(SeverityLevel::Critical), &attrs);
        assert!(critical.iter().any(|a| a.contains("port 22")));
        let low = DefaultRecommendations.for_attack_pattern(&severity(SeverityLevel::Low), &attrs);
        assert_eq!(low.len(), 1);
    }

    #[test]
    fn test_benign_without_factors() {
        let actions = default_risk_recommendations(&[], ThreatClass::Benign);
        assert_eq!(actions, vec!["No action required".to_string()]);
    }
}
