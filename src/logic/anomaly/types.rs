//! Anomaly Types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    Volume,
    Pattern,
    Protocol,
    Behavioral,
}

impl AnomalyKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            AnomalyKind::Volume => "volume",
            AnomalyKind::Pattern => "pattern",
            AnomalyKind::Protocol => "protocol",
            AnomalyKind::Behavioral => "behavioral",
        }
    }
}

impl std::fmt::Display for AnomalyKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnomalyFinding {
    pub kind: AnomalyKind,
    pub window_index: usize,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    /// Normalized severity in [0, 1]
    pub score: f64,
    pub observed: f64,
    pub expected: f64,
    pub description: String,
}

/// A check that could not run for some windows
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SkippedCheck {
    pub kind: AnomalyKind,
    pub windows: Vec<usize>,
    pub reason: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnomalyReport {
    pub findings: Vec<AnomalyFinding>,
    pub skipped: Vec<SkippedCheck>,
}

impl AnomalyReport {
    pub fn of_kind(&self, kind: AnomalyKind) -> impl Iterator<Item = &AnomalyFinding> {
        self.findings.iter().filter(move |f| f.kind == kind)
    }

    pub fn in_window(&self, window_index: usize) -> impl Iterator<Item = &AnomalyFinding> {
        self.findings.iter().filter(move |f| f.window_index == window_index)
    }

    /// Union with another report, ordered by window then kind
    pub fn merge(&mut self, other: AnomalyReport) {
        self.findings.extend(other.findings);
        self.skipped.extend(other.skipped);
        self.findings
            .sort_by(|a, b| a.window_index.cmp(&b.window_index).then(a.kind.cmp(&b.kind)));
    }
}
