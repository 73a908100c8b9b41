use super::*;
use crate::logic::baseline::{BehaviorFeature, Verdict};
use crate::logic::error::{AnalysisError, WarningKind};
use crate::logic::fixtures::{bridge_records, rec, spike_records, threat_events, BASE_TS};
use crate::logic::risk::{CorrelationKind, RiskFactor, ThreatClass};

fn analyzer() -> TrafficAnalyzer {
    TrafficAnalyzer::new(AnalyzerConfig::default()).unwrap()
}

#[test]
fn test_spike_yields_one_burst_and_one_volume_anomaly() {
    let ctx = AnalysisContext::new("spike");
    let report = analyzer().analyze_traffic(&spike_records(), &ctx).unwrap();

    assert_eq!(report.windows.len(), 48);
    let bursts = report.temporal.bursts.computed().unwrap();
    assert_eq!(bursts.len(), 1);
    assert_eq!(bursts[0].window_index, 30);

    let volume: Vec<_> = report.anomalies.of_kind(AnomalyKind::Volume).collect();
    assert_eq!(volume.len(), 1);
    assert_eq!(volume[0].window_index, 30);

    let riskiest = report.riskiest_patterns(1);
    assert_eq!(riskiest[0].window_index, 30);
    assert!(riskiest[0].risk_score > 0.0);
}

#[test]
fn test_first_run_has_no_baseline() {
    let ctx = AnalysisContext::new("fresh");
    let report = analyzer().analyze_traffic(&spike_records(), &ctx).unwrap();

    assert!(report.behavioral.all_insufficient());
    assert_eq!(report.anomalies.of_kind(AnomalyKind::Behavioral).count(), 0);
    let baseline_warnings = report
        .warnings
        .iter()
        .filter(|w| w.component == "baseline" && w.kind == WarningKind::InsufficientData)
        .count();
    assert_eq!(baseline_warnings, 5);

    // Trained after the run, without the spike window
    assert!(report.behavioral.baseline.iter().all(|s| s.trained && s.samples == 47));
    assert_eq!(ctx.runs(), 1);
}

#[test]
fn test_second_run_flags_behavioral_deviation() {
    let ctx = AnalysisContext::new("repeat");
    let engine = analyzer();
    engine.analyze_traffic(&spike_records(), &ctx).unwrap();
    let report = engine.analyze_traffic(&spike_records(), &ctx).unwrap();

    assert_eq!(report.run, 2);
    let behavioral: Vec<_> = report.anomalies.of_kind(AnomalyKind::Behavioral).collect();
    assert_eq!(behavioral.len(), 1);
    assert_eq!(behavioral[0].window_index, 30);
    assert_eq!(report.behavioral.anomalous().count(), 1);

    assert!(report
        .correlated_findings
        .iter()
        .any(|c| c.kind == CorrelationKind::VolumeBehavioral && c.window_index == 30));
    assert!(report.risk_assessment.risk_factors.iter().any(|f| f.name == "zero_day_behavior"));
    assert!(report.behavioral.baseline.iter().all(|s| s.samples == 94));
}

#[test]
fn test_spike_window_is_kept_out_of_baseline() {
    let ctx = AnalysisContext::new("clean");
    analyzer().analyze_traffic(&spike_records(), &ctx).unwrap();

    // Regular windows only carry 100..=102 bytes per packet
    let payload = ctx
        .baseline()
        .snapshot(1)
        .into_iter()
        .find(|s| s.feature == BehaviorFeature::PayloadPerPacket)
        .unwrap();
    assert_eq!(payload.samples, 47);
    assert!(payload.mean < 103f64.ln());
}

#[test]
fn test_learning_can_be_disabled() {
    let mut config = AnalyzerConfig::default();
    config.learn_baseline = false;
    let engine = TrafficAnalyzer::new(config).unwrap();
    let ctx = AnalysisContext::default();

    engine.analyze_traffic(&spike_records(), &ctx).unwrap();
    let report = engine.analyze_traffic(&spike_records(), &ctx).unwrap();
    assert!(report.behavioral.all_insufficient());
    assert!(ctx.reference_combinations().is_none());
}

#[test]
fn test_burst_correlates_with_hotspot() {
    // Window 30 traffic all flows from 10.0.0.1 to a new host
    let records: Vec<TrafficRecord> = spike_records()
        .into_iter()
        .map(|mut r| {
            if r.timestamp.timestamp() >= crate::logic::fixtures::BASE_TS + 30 * 3600
                && r.timestamp.timestamp() < crate::logic::fixtures::BASE_TS + 31 * 3600
            {
                r.source_ip = "10.0.0.1".into();
                r.destination_ip = "10.0.9.9".into();
            }
            r
        })
        .collect();

    let report = analyzer().analyze_traffic(&records, &AnalysisContext::default()).unwrap();
    let hotspots = report.spatial.hotspots.computed().unwrap();
    assert_eq!(hotspots.len(), 1);
    assert_eq!(hotspots[0].node, "10.0.0.1");

    let found: Vec<_> = report
        .correlated_findings
        .iter()
        .filter(|c| c.kind == CorrelationKind::BurstHotspot)
        .collect();
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].window_index, 30);
    assert_eq!(found[0].evidence, vec!["10.0.0.1".to_string()]);
}

#[test]
fn test_bridge_graph_has_two_communities() {
    let report = analyzer()
        .analyze_traffic(&bridge_records(), &AnalysisContext::default())
        .unwrap();
    let partition = report.spatial.communities.computed().unwrap();
    assert_eq!(partition.communities.len(), 2);
    assert!(partition.communities.iter().all(|c| c.size() == 4));
    assert_eq!(report.spatial.node_count, 8);
}

#[test]
fn test_threat_events_become_attack_patterns() {
    let report = analyzer()
        .analyze_with_threats(&spike_records(), &threat_events(), &AnalysisContext::default())
        .unwrap();
    let patterns = report.attack_patterns.computed().unwrap();
    assert_eq!(patterns.len(), 2);
    assert!(report.risk_assessment.risk_factors.iter().any(|f| f.name == "attack_patterns"));
}

#[test]
fn test_no_threat_events_is_not_computed() {
    let report = analyzer()
        .analyze_traffic(&spike_records(), &AnalysisContext::default())
        .unwrap();
    assert!(!report.attack_patterns.is_computed());
}

#[test]
fn test_empty_input_reports_warnings() {
    let report = analyzer().analyze_traffic(&[], &AnalysisContext::default()).unwrap();

    assert_eq!(report.record_count, 0);
    assert!(report.windows.is_empty());
    assert!(!report.temporal.seasonality.is_computed());
    assert!(!report.temporal.bursts.is_computed());
    assert!(!report.spatial.communities.is_computed());
    assert!(report.warnings.iter().any(|w| w.component == "traffic"));
    assert_eq!(report.risk_assessment.threat_class, ThreatClass::Benign);
}

#[test]
fn test_invalid_window_is_fatal() {
    let result = TrafficAnalyzer::new(AnalyzerConfig::default().with_window_secs(-60));
    assert!(matches!(result, Err(AnalysisError::InvalidWindow { secs: -60 })));
}

#[test]
fn test_raw_input_skips_malformed_records() {
    let json = r#"{
        "records": [
            {"timestamp": "2024-01-01T00:00:00Z", "source_ip": "10.0.0.1", "destination_ip": "10.0.0.2",
             "protocol": "tcp", "port": 443, "bytes": 1200, "packets": 4},
            {"timestamp": "2024-01-01T00:00:30Z", "src_ip": "not-an-ip", "dst_ip": "10.0.0.2",
             "protocol": "tcp", "port": 443, "bytes": 1200, "packets": 4},
            {"timestamp": "2024-01-01T00:01:00Z", "src_ip": "10.0.0.3", "dst_ip": "10.0.0.2",
             "protocol": "udp", "port": 53, "bytes": 80, "packets": 1}
        ]
    }"#;
    let input: AnalysisInput = serde_json::from_str(json).unwrap();
    let report = analyzer().analyze(input, &AnalysisContext::default()).unwrap();

    assert_eq!(report.record_count, 2);
    let malformed: Vec<_> = report
        .warnings
        .iter()
        .filter(|w| w.kind == WarningKind::MalformedRecord)
        .collect();
    assert_eq!(malformed.len(), 1);
    assert!(malformed[0].message.contains("not-an-ip"));
}

#[test]
fn test_custom_risk_strategy() {
    struct Fixed;
    impl RiskFactorStrategy for Fixed {
        fn risk_factors(&self, _input: &RiskInput<'_>) -> Vec<RiskFactor> {
            vec![RiskFactor::new("fixed", 1.0, 0.9, "always")]
        }
    }

    let engine = analyzer().with_risk_factors(Arc::new(Fixed));
    let report = engine.analyze_traffic(&bridge_records(), &AnalysisContext::default()).unwrap();
    assert!((report.risk_assessment.overall_risk_score - 9.0).abs() < 1e-9);
    assert_eq!(report.risk_assessment.threat_class, ThreatClass::Malicious);
}

#[test]
fn test_assess_behavior_does_not_train() {
    let engine = analyzer();
    let ctx = AnalysisContext::default();
    let records = spike_records();

    let before = engine.assess_behavior(&records, &ctx).unwrap();
    assert_eq!(before.verdict, Verdict::InsufficientData);
    engine.train_baseline(&records, &ctx).unwrap();
    let after = engine.assess_behavior(&records, &ctx).unwrap();
    assert_eq!(after.verdict, Verdict::Normal);
}

#[test]
fn test_empty_sample_is_insufficient_data() {
    let engine = analyzer();
    let ctx = AnalysisContext::default();

    let trained = engine.train_baseline(&[], &ctx);
    assert!(matches!(trained, Err(AnalysisError::InsufficientData { ref component, .. }) if component == "baseline"));
    assert!(matches!(engine.assess_behavior(&[], &ctx), Err(AnalysisError::InsufficientData { .. })));
    assert_eq!(ctx.baseline().samples(BehaviorFeature::ProtocolEntropy), 0);
}

#[test]
fn test_window_limit_degrades_to_warning() {
    // 48 hours at one-second windows exceeds the default limit
    let engine = TrafficAnalyzer::new(AnalyzerConfig::default().with_window_secs(1)).unwrap();
    let report = engine.analyze_traffic(&spike_records(), &AnalysisContext::default()).unwrap();

    assert!(report.windows.is_empty());
    assert!(report
        .warnings
        .iter()
        .any(|w| w.kind == WarningKind::WindowLimit && w.component == "traffic"));
    assert_eq!(report.spatial.node_count, 6);
    assert_eq!(report.record_count, 144);
}

#[test]
fn test_near_max_bytes_analyze_cleanly() {
    let big = i64::MAX as u64;
    let records = vec![
        rec(BASE_TS, "10.0.0.1", "10.0.0.2", "TCP", 443, big, 1),
        rec(BASE_TS + 1, "10.0.0.1", "10.0.0.2", "TCP", 443, big, 1),
        rec(BASE_TS + 2, "10.0.0.2", "10.0.0.1", "TCP", 443, big, 1),
    ];
    let report = analyzer().analyze_traffic(&records, &AnalysisContext::default()).unwrap();
    assert_eq!(report.windows.len(), 1);
    assert_eq!(report.windows[0].total_bytes, u64::MAX);
}

#[test]
fn test_report_serializes() {
    let report = analyzer()
        .analyze_traffic(&spike_records(), &AnalysisContext::default())
        .unwrap();
    let json = report.to_json().unwrap();
    let value: serde_json::Value = serde_json::from_str(&json).unwrap();

    assert_eq!(value["window_size_secs"], 3600);
    assert_eq!(value["attack_patterns"]["status"], "not_computed");
    assert_eq!(value["temporal"]["bursts"]["status"], "computed");
    assert!(value["risk_assessment"]["overall_risk_score"].is_number());
}
