//! Analysis Report - serializable result of one engine run

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::logic::anomaly::AnomalyReport;
use crate::logic::baseline::{BehavioralAssessment, FeatureSnapshot, Verdict};
use crate::logic::error::{AnalysisWarning, Outcome};
use crate::logic::protocol::ProtocolAnalysis;
use crate::logic::risk::{CorrelatedFinding, RiskAssessment};
use crate::logic::spatial::SpatialAnalysis;
use crate::logic::temporal::TemporalAnalysis;
use crate::logic::threat::{AttackPattern, ThreatEvent};
use crate::logic::traffic::{RawTrafficRecord, TimeWindow, TrafficPattern};

/// Engine input as read from JSON
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisInput {
    #[serde(default)]
    pub records: Vec<RawTrafficRecord>,
    #[serde(default)]
    pub threat_events: Vec<ThreatEvent>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BehavioralSection {
    pub assessments: Vec<BehavioralAssessment>,
    pub baseline: Vec<FeatureSnapshot>,
}

impl BehavioralSection {
    pub fn anomalous(&self) -> impl Iterator<Item = &BehavioralAssessment> {
        self.assessments.iter().filter(|a| a.is_anomalous())
    }

    pub fn all_insufficient(&self) -> bool {
        self.assessments.iter().all(|a| a.verdict == Verdict::InsufficientData)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub report_id: String,
    pub tenant: String,
    /// Run number within the context, starting at 1
    pub run: u64,
    pub generated_at: DateTime<Utc>,
    pub engine_version: String,
    pub window_size_secs: i64,
    pub record_count: usize,
    pub windows: Vec<TimeWindow>,

    pub temporal: TemporalAnalysis,
    pub spatial: SpatialAnalysis,
    pub protocol: ProtocolAnalysis,
    pub anomalies: AnomalyReport,
    pub traffic_patterns: Vec<TrafficPattern>,
    pub attack_patterns: Outcome<BTreeMap<usize, AttackPattern>>,
    pub behavioral: BehavioralSection,

    pub correlated_findings: Vec<CorrelatedFinding>,
    pub risk_assessment: RiskAssessment,
    pub warnings: Vec<AnalysisWarning>,
}

impl AnalysisReport {
    pub fn to_json(&self) -> crate::logic::error::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Patterns sorted by risk, highest first
    pub fn riskiest_patterns(&self, limit: usize) -> Vec<&TrafficPattern> {
        let mut patterns: Vec<&TrafficPattern> = self.traffic_patterns.iter().collect();
        patterns.sort_by(|a, b| b.risk_score.total_cmp(&a.risk_score).then(a.window_index.cmp(&b.window_index)));
        patterns.truncate(limit);
        patterns
    }
}
