//! Risk Module - risk assessment and cross-method correlation
//!
//! ## Structure
//! - `types`: `ThreatClass`, `RiskFactor`, `RiskAssessment`, `CorrelatedFinding`
//! - `strategy`: pluggable risk factor / recommendation strategies
//! - `correlation`: findings that agree across analysis methods

pub mod types;
pub mod strategy;
pub mod correlation;

pub use types::{
    CorrelatedFinding, CorrelationKind, RiskAssessment, RiskFactor, ThreatClass, BENIGN_THRESHOLD,
    MALICIOUS_THRESHOLD,
};
pub use strategy::{
    assess_risk, default_risk_recommendations, overall_risk_score, DefaultRecommendations, DefaultRiskFactors,
    RecommendationStrategy, RiskFactorStrategy, RiskInput,
};
pub use correlation::{correlate_findings, CorrelationInput};
