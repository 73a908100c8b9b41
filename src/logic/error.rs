//! Error Types
//!
//! Fatal conditions are limited to invalid configuration. Everything else is
//! recoverable and normally surfaces as an `AnalysisWarning` in the report.

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AnalysisError>;

#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Window size must be strictly positive
    #[error("Invalid window size: {secs}s (must be > 0)")]
    InvalidWindow { secs: i64 },

    /// Too few samples for the requested computation
    #[error("Insufficient data for {component}: {detail}")]
    InsufficientData { component: String, detail: String },

    /// Detection attempted before any baseline was learned
    #[error("No baseline learned for '{feature}'")]
    UnknownBaseline { feature: String },

    /// Traffic record missing a required field or carrying an invalid one
    #[error("Malformed record #{index}: {reason}")]
    MalformedRecord { index: usize, reason: String },

    /// Batch spans more windows than the configured limit
    #[error("Batch spans {windows} windows (limit {limit})")]
    TooManyWindows { windows: i64, limit: usize },

    /// Structurally invalid configuration
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl AnalysisError {
    pub fn insufficient<C: Into<String>, D: Into<String>>(component: C, detail: D) -> Self {
        Self::InsufficientData {
            component: component.into(),
            detail: detail.into(),
        }
    }

    pub fn malformed<S: Into<String>>(index: usize, reason: S) -> Self {
        Self::MalformedRecord {
            index,
            reason: reason.into(),
        }
    }

    /// Recoverable errors degrade one analysis method, never the pipeline
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::InsufficientData { .. }
                | Self::UnknownBaseline { .. }
                | Self::MalformedRecord { .. }
                | Self::TooManyWindows { .. }
        )
    }

    pub fn error_code(&self) -> u32 {
        match self {
            Self::InvalidWindow { .. } => 1001,
            Self::InsufficientData { .. } => 1002,
            Self::UnknownBaseline { .. } => 1003,
            Self::MalformedRecord { .. } => 1004,
            Self::InvalidConfig(_) => 1005,
            Self::Serialization(_) => 1006,
            Self::TooManyWindows { .. } => 1007,
        }
    }
}

// ============================================================================
// WARNINGS (surfaced in the report, never only logged)
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WarningKind {
    InsufficientData,
    UnknownBaseline,
    MalformedRecord,
    WindowLimit,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisWarning {
    pub kind: WarningKind,
    pub component: String,
    pub message: String,
}

impl AnalysisWarning {
    pub fn new<C: Into<String>, M: Into<String>>(kind: WarningKind, component: C, message: M) -> Self {
        Self {
            kind,
            component: component.into(),
            message: message.into(),
        }
    }

    pub fn insufficient<C: Into<String>, M: Into<String>>(component: C, message: M) -> Self {
        Self::new(WarningKind::InsufficientData, component, message)
    }
}

/// Converts recoverable errors into warnings; fatal errors pass through
impl TryFrom<AnalysisError> for AnalysisWarning {
    type Error = AnalysisError;

    fn try_from(err: AnalysisError) -> std::result::Result<Self, Self::Error> {
        let message = err.to_string();
        match err {
            AnalysisError::InsufficientData { component, .. } => {
                Ok(Self::new(WarningKind::InsufficientData, component, message))
            }
            AnalysisError::UnknownBaseline { .. } => {
                Ok(Self::new(WarningKind::UnknownBaseline, "baseline", message))
            }
            AnalysisError::MalformedRecord { .. } => {
                Ok(Self::new(WarningKind::MalformedRecord, "ingest", message))
            }
            AnalysisError::TooManyWindows { .. } => Ok(Self::new(WarningKind::WindowLimit, "traffic", message)),
            other => Err(other),
        }
    }
}

// ============================================================================
// OUTCOME MARKER
// ============================================================================

/// Result of one analysis method: computed, or explicitly not computed
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum Outcome<T> {
    Computed(T),
    NotComputed { reason: String },
}

impl<T> Outcome<T> {
    pub fn not_computed<S: Into<String>>(reason: S) -> Self {
        Outcome::NotComputed { reason: reason.into() }
    }

    pub fn computed(&self) -> Option<&T> {
        match self {
            Outcome::Computed(v) => Some(v),
            Outcome::NotComputed { .. } => None,
        }
    }

    pub fn is_computed(&self) -> bool {
        matches!(self, Outcome::Computed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_recoverable_classification() {
        assert!(AnalysisError::insufficient("temporal", "3 windows").is_recoverable());
        assert!(AnalysisError::malformed(4, "missing source_ip").is_recoverable());
        assert!(!AnalysisError::InvalidWindow { secs: 0 }.is_recoverable());
        assert!(!AnalysisError::InvalidConfig("eps".into()).is_recoverable());
    }

    #[test]
    fn test_error_codes() {
        assert_eq!(AnalysisError::InvalidWindow { secs: -1 }.error_code(), 1001);
        assert_eq!(AnalysisError::UnknownBaseline { feature: "x".into() }.error_code(), 1003);
    }

    #[test]
    fn test_warning_conversion() {
        let warning = AnalysisWarning::try_from(AnalysisError::malformed(2, "bad ip")).unwrap();
        assert_eq!(warning.kind, WarningKind::MalformedRecord);
        assert!(warning.message.contains("#2"));

        let fatal = AnalysisWarning::try_from(AnalysisError::InvalidWindow { secs: 0 });
        assert!(fatal.is_err());

        let limited = AnalysisError::TooManyWindows { windows: 172_800, limit: 100_000 };
        assert!(limited.is_recoverable());
        assert_eq!(limited.error_code(), 1007);
        let warning = AnalysisWarning::try_from(limited).unwrap();
        assert_eq!(warning.kind, WarningKind::WindowLimit);
        assert_eq!(warning.component, "traffic");
    }

    #[test]
    fn test_outcome_marker() {
        let done: Outcome<u32> = Outcome::Computed(3);
        let skipped: Outcome<u32> = Outcome::not_computed("no records");
        assert_eq!(done.computed(), Some(&3));
        assert!(!skipped.is_computed());
        let json = serde_json::to_string(&skipped).unwrap();
        assert!(json.contains("not_computed"));
    }
}
