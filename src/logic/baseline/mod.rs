//! Baseline Module - Behavioral Baseline & Zero-Day Detection
//!
//! Learns per-feature distributions of traffic behavior and flags samples
//! that deviate beyond an entropy-scaled band.
//!
//! # Architecture
//! - `types.rs`: `BehaviorFeature`, `FeatureBaseline`, `BehavioralAssessment`
//! - `features.rs`: behavioral features of a traffic sample
//! - `detector.rs`: `BehaviorBaseline` (train / detect)
//!
//! # Lifecycle
//! A feature is untrained until it holds `baseline_min_samples` values.
//! Untrained features are skipped; with none trained the verdict is
//! `InsufficientData`.

pub mod types;
pub mod features;
pub mod detector;
#[cfg(test)]
mod tests;

pub use types::{
    BehaviorFeature, BehaviorSample, BehavioralAssessment, FeatureBaseline, FeatureDeviation,
    FeatureSnapshot, Verdict, BEHAVIOR_FEATURE_COUNT,
};
pub use features::{behavior_sample, temporal_regularity};
pub use detector::{untrained_warnings, BehaviorBaseline, DetectionSettings};
