use super::*;
use crate::logic::config::{AnalyzerConfig, VerdictPolicy};
use crate::logic::error::AnalysisError;

fn sample(values: [f64; BEHAVIOR_FEATURE_COUNT]) -> BehaviorSample {
    BehaviorSample { window_index: None, values }
}

fn settings(policy: VerdictPolicy) -> DetectionSettings {
    DetectionSettings { min_samples: 1, policy }
}

fn normal(i: usize) -> BehaviorSample {
    let jitter = (i % 5) as f64 * 0.01;
    sample([0.9 + jitter, 0.6 + jitter, 4.6 + jitter, 0.3 + jitter, 0.2 + jitter])
}

#[test]
fn test_detection_before_training_is_insufficient() {
    let baseline = BehaviorBaseline::default();
    let assessment = baseline.detect(&normal(0), &settings(VerdictPolicy::Any));

    assert_eq!(assessment.verdict, Verdict::InsufficientData);
    assert!(assessment.deviations.is_empty());
    assert_eq!(assessment.skipped.len(), BEHAVIOR_FEATURE_COUNT);
    assert_eq!(assessment.severity, 0.0);
    assert_eq!(untrained_warnings(&[assessment]).len(), BEHAVIOR_FEATURE_COUNT);
}

#[test]
fn test_unknown_baseline_error_per_feature() {
    let baseline = BehaviorBaseline::default();
    let result = baseline.deviation(BehaviorFeature::PortEntropy, 0.5, 1);
    assert!(matches!(result, Err(AnalysisError::UnknownBaseline { ref feature }) if feature == "port_entropy"));
}

#[test]
fn test_values_are_append_only() {
    let baseline = BehaviorBaseline::default();
    baseline.train(&normal(0));
    baseline.train(&normal(1));
    assert_eq!(baseline.samples(BehaviorFeature::ProtocolEntropy), 2);
    assert!(baseline.is_trained(BehaviorFeature::TemporalRegularity, 1));
    assert!(!baseline.is_trained(BehaviorFeature::TemporalRegularity, 3));
}

#[test]
fn test_threshold_scales_with_entropy() {
    let mut fb = FeatureBaseline::default();
    fb.push(1.0, 3.0);
    assert_eq!(fb.threshold, 3.0);
    for v in [2.0, 3.0, 4.0, 5.0, 6.0, 7.0, 8.0, 9.0, 10.0] {
        fb.push(v, 3.0);
    }
    // Ten values in ten distinct bins: maximal entropy
    assert!((fb.threshold - 6.0).abs() < 1e-9);
    assert_eq!(fb.values().len(), 10);
}

#[test]
fn test_normal_sample_passes_after_training() {
    let baseline = BehaviorBaseline::default();
    baseline.train_all(&(0..50).map(normal).collect::<Vec<_>>());
    let assessment = baseline.detect(&normal(7), &settings(VerdictPolicy::Any));
    assert_eq!(assessment.verdict, Verdict::Normal);
    assert!(assessment.skipped.is_empty());
}

#[test]
fn test_novel_behavior_is_flagged() {
    let baseline = BehaviorBaseline::default();
    baseline.train_all(&(0..50).map(normal).collect::<Vec<_>>());

    // Single-protocol, single-port exfiltration-like sample
    let odd = sample([0.0, 0.0, 9.5, 0.3, 0.2]);
    let any = baseline.detect(&odd, &settings(VerdictPolicy::Any));
    assert_eq!(any.verdict, Verdict::Anomalous);
    assert_eq!(any.flagged().count(), 3);
    assert!(any.severity > 0.5);

    let majority = baseline.detect(&odd, &settings(VerdictPolicy::Majority));
    assert_eq!(majority.verdict, Verdict::Anomalous);

    let one_off = sample([0.0, 0.62, 4.62, 0.32, 0.22]);
    assert_eq!(baseline.detect(&one_off, &settings(VerdictPolicy::Any)).verdict, Verdict::Anomalous);
    assert_eq!(baseline.detect(&one_off, &settings(VerdictPolicy::Majority)).verdict, Verdict::Normal);
}

#[test]
fn test_settings_from_config() {
    let mut config = AnalyzerConfig::default();
    config.baseline_min_samples = 0;
    config.verdict_policy = VerdictPolicy::Majority;
    let s = DetectionSettings::from(&config);
    assert_eq!(s.min_samples, 1);
    assert_eq!(s.policy, VerdictPolicy::Majority);
}

#[test]
fn test_concurrent_readers() {
    let baseline = BehaviorBaseline::default();
    baseline.train_all(&(0..20).map(normal).collect::<Vec<_>>());
    std::thread::scope(|scope| {
        for i in 0..4 {
            let b = &baseline;
            scope.spawn(move || {
                let a = b.detect(&normal(i), &settings(VerdictPolicy::Any));
                assert_eq!(a.verdict, Verdict::Normal);
            });
        }
    });
}

#[test]
fn test_batch_training_matches_incremental() {
    let samples: Vec<BehaviorSample> = (0..200).map(normal).collect();

    let batched = BehaviorBaseline::default();
    assert_eq!(batched.train_all(&samples), 200);
    let incremental = BehaviorBaseline::default();
    for s in &samples {
        incremental.train(s);
    }

    let a = batched.snapshot(1);
    let b = incremental.snapshot(1);
    for (x, y) in a.iter().zip(&b) {
        assert_eq!(x.samples, y.samples);
        assert!((x.mean - y.mean).abs() < 1e-12);
        assert!((x.std - y.std).abs() < 1e-12);
        assert!((x.threshold - y.threshold).abs() < 1e-12);
    }
}

#[test]
fn test_large_batch_trains_once() {
    let baseline = BehaviorBaseline::default();
    let samples: Vec<BehaviorSample> = (0..20_000).map(normal).collect();
    assert_eq!(baseline.train_all(&samples), 20_000);
    assert_eq!(baseline.train_all(&Vec::<BehaviorSample>::new()), 0);
    assert_eq!(baseline.samples(BehaviorFeature::PortEntropy), 20_000);

    let mut fb = FeatureBaseline::default();
    assert_eq!(fb.extend([1.0, 2.0, 3.0], 3.0), 3);
    assert_eq!(fb.extend(std::iter::empty(), 3.0), 0);
    assert!((fb.mean - 2.0).abs() < 1e-12);
}
