//! Risk Types
//!
//! Threat class, risk factors and correlated findings. No logic.

use serde::{Deserialize, Serialize};

// ============================================================================
// THREAT CLASSIFICATION
// ============================================================================

/// Below this (0-1 scale) = Benign
pub const BENIGN_THRESHOLD: f64 = 0.4;

/// At or above this (0-1 scale) = Malicious
pub const MALICIOUS_THRESHOLD: f64 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ThreatClass {
    /// Normal behavior, no action needed
    Benign,
    /// Worth monitoring
    Suspicious,
    /// Needs action now
    Malicious,
}

impl ThreatClass {
    pub fn as_str(&self) -> &'static str {
        match self {
            ThreatClass::Benign => "benign",
            ThreatClass::Suspicious => "suspicious",
            ThreatClass::Malicious => "malicious",
        }
    }

    /// Map a risk score on the 0-10 scale
    pub fn from_risk_score(score: f64) -> Self {
        let normalized = score / 10.0;
        if normalized >= MALICIOUS_THRESHOLD {
            ThreatClass::Malicious
        } else if normalized >= BENIGN_THRESHOLD {
            ThreatClass::Suspicious
        } else {
            ThreatClass::Benign
        }
    }
}

impl std::fmt::Display for ThreatClass {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

// ============================================================================
// RISK
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFactor {
    pub name: String,
    /// 0..=1
    pub score: f64,
    /// 0..=1
    pub weight: f64,
    pub description: String,
}

impl RiskFactor {
    pub fn new<N: Into<String>, D: Into<String>>(name: N, score: f64, weight: f64, description: D) -> Self {
        Self {
            name: name.into(),
            score: score.clamp(0.0, 1.0),
            weight: weight.clamp(0.0, 1.0),
            description: description.into(),
        }
    }

    pub fn contribution(&self) -> f64 {
        self.score * self.weight
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// 0..=10
    pub overall_risk_score: f64,
    pub threat_class: ThreatClass,
    pub risk_factors: Vec<RiskFactor>,
    pub recommendations: Vec<String>,
}

// ============================================================================
// CORRELATION
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CorrelationKind {
    /// Burst window whose traffic involves a hotspot host
    BurstHotspot,
    /// Low-entropy window carrying an unusual (protocol, port) pair
    ProtocolUnusualCombination,
    /// Volume and behavioral anomaly in the same window
    VolumeBehavioral,
    /// Attack pattern active during an anomalous window
    AttackPatternAnomaly,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrelatedFinding {
    pub kind: CorrelationKind,
    pub window_index: usize,
    pub description: String,
    pub evidence: Vec<String>,
    /// 0..=1
    pub confidence: f64,
}
