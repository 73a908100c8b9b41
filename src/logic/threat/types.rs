//! Threat Types
//!
//! Threat events, cluster labels and the attack patterns built from clusters.
//! Data structures only.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::layout::LayoutInfo;

// ============================================================================
// THREAT EVENT
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThreatEvent {
    pub event_id: String,
    pub timestamp: DateTime<Utc>,
    pub category: String,
    #[serde(default)]
    pub source_ips: Vec<String>,
    #[serde(default)]
    pub destination_ips: Vec<String>,
    #[serde(default)]
    pub destination_ports: Vec<u16>,
    #[serde(default)]
    pub payload_sizes: Vec<u64>,
    #[serde(default)]
    pub inter_arrival_ms: Vec<f64>,
}

// ============================================================================
// CLUSTER LABEL
// ============================================================================

/// DBSCAN label. `Core` covers every cluster member, border points included.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum ClusterLabel {
    Core(usize),
    Noise,
}

impl ClusterLabel {
    pub fn cluster_id(&self) -> Option<usize> {
        match self {
            ClusterLabel::Core(id) => Some(*id),
            ClusterLabel::Noise => None,
        }
    }

    pub fn is_noise(&self) -> bool {
        matches!(self, ClusterLabel::Noise)
    }
}

// ============================================================================
// SEVERITY
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SeverityLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl SeverityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            SeverityLevel::Low => "LOW",
            SeverityLevel::Medium => "MEDIUM",
            SeverityLevel::High => "HIGH",
            SeverityLevel::Critical => "CRITICAL",
        }
    }

    pub fn from_score(score: f64) -> Self {
        if score >= 0.75 {
            SeverityLevel::Critical
        } else if score >= 0.5 {
            SeverityLevel::High
        } else if score >= 0.25 {
            SeverityLevel::Medium
        } else {
            SeverityLevel::Low
        }
    }
}

impl std::fmt::Display for SeverityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Severity with the factors it came from (all in [0, 1])
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PatternSeverity {
    pub level: SeverityLevel,
    pub score: f64,
    pub size_factor: f64,
    pub extremity: f64,
    pub temporal_density: f64,
}

// ============================================================================
// ATTACK PATTERN
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRange {
    pub feature: String,
    pub min: f64,
    pub max: f64,
}

/// Attribute value shared by a strict majority of members
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommonAttribute {
    pub attribute: String,
    pub value: String,
    /// Fraction of members carrying the value
    pub support: f64,
}

/// Consecutive events of the same cluster sharing a source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventTransition {
    pub from_event: String,
    pub to_event: String,
    pub gap_secs: f64,
    pub shared_sources: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TemporalProfile {
    pub first_seen: DateTime<Utc>,
    pub last_seen: DateTime<Utc>,
    pub span_secs: f64,
    pub events_per_minute: f64,
    pub transitions: Vec<EventTransition>,
    /// transitions / (members - 1)
    pub chain_ratio: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AttackPattern {
    pub cluster_id: usize,
    pub member_event_ids: Vec<String>,
    pub signature: String,
    pub feature_ranges: Vec<FeatureRange>,
    pub common_attributes: Vec<CommonAttribute>,
    pub temporal_profile: TemporalProfile,
    pub severity: PatternSeverity,
    pub recommended_actions: Vec<String>,
}

impl AttackPattern {
    pub fn size(&self) -> usize {
        self.member_event_ids.len()
    }
}

/// Labels for every input event plus the patterns of non-noise clusters
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ClusteringOutcome {
    /// Feature layout the events were clustered on
    pub layout: LayoutInfo,
    pub labels: Vec<ClusterLabel>,
    pub patterns: BTreeMap<usize, AttackPattern>,
}

impl ClusteringOutcome {
    pub fn noise_count(&self) -> usize {
        self.labels.iter().filter(|l| l.is_noise()).count()
    }
}
