use proptest::prelude::*;

use super::*;
use crate::logic::error::{AnalysisError, WarningKind};
use crate::logic::fixtures::{rec, spike_records, ts, BASE_TS};

#[test]
fn test_reject_non_positive_window() {
    let records = vec![rec(BASE_TS, "10.0.0.1", "10.0.0.2", "tcp", 80, 10, 1)];
    assert!(matches!(aggregate(&records, 0), Err(AnalysisError::InvalidWindow { secs: 0 })));
    assert!(matches!(aggregate(&records, -60), Err(AnalysisError::InvalidWindow { secs: -60 })));
}

#[test]
fn test_window_span_is_bounded_before_allocation() {
    // Ten years apart at one-second windows
    let records = vec![
        rec(BASE_TS, "10.0.0.1", "10.0.0.2", "TCP", 80, 10, 1),
        rec(BASE_TS + 10 * 365 * 86_400, "10.0.0.1", "10.0.0.2", "TCP", 80, 10, 1),
    ];
    let result = partition(&records, 1);
    assert!(matches!(result, Err(AnalysisError::TooManyWindows { limit: 100_000, .. })));

    let bounded = partition_bounded(&records[..1], 1, 1).unwrap();
    assert_eq!(bounded.len(), 1);
    assert!(matches!(
        partition_bounded(&records, 3600, 87_600),
        Err(AnalysisError::TooManyWindows { windows: 87_601, .. })
    ));
}

#[test]
fn test_empty_input_yields_no_windows() {
    let windows = aggregate(&[], 3600).unwrap();
    assert!(windows.is_empty());
}

#[test]
fn test_empty_windows_keep_zero_counts() {
    let records = vec![
        rec(BASE_TS + 10, "10.0.0.1", "10.0.0.2", "TCP", 80, 100, 2),
        rec(BASE_TS + 3 * 3600 + 5, "10.0.0.3", "10.0.0.2", "UDP", 53, 50, 1),
    ];
    let windows = aggregate(&records, 3600).unwrap();
    assert_eq!(windows.len(), 4);
    assert_eq!(windows[0].start, ts(BASE_TS));
    assert_eq!(windows[1].record_count, 0);
    assert_eq!(windows[2].total_bytes, 0);
    assert_eq!(windows[3].total_bytes, 50);
    assert_eq!(windows[3].unique_sources, 1);
}

#[test]
fn test_windows_are_epoch_aligned() {
    let records = vec![rec(BASE_TS + 1234, "10.0.0.1", "10.0.0.2", "TCP", 80, 1, 1)];
    let windows = aggregate(&records, 600).unwrap();
    assert_eq!(windows.len(), 1);
    assert_eq!(windows[0].start.timestamp() % 600, 0);
    assert!(windows[0].contains(records[0].timestamp));
}

#[test]
fn test_spike_partition() {
    let records = spike_records();
    let traffic = partition(&records, 3600).unwrap();
    assert_eq!(traffic.len(), 48);
    assert!(traffic.partition.iter().all(|p| p.len() == 3));
    assert_eq!(traffic.windows[30].total_bytes, 30_000);
    assert_eq!(traffic.windows[30].unique_destinations, 3);
}

#[test]
fn test_pattern_ids_and_risk() {
    let records = spike_records();
    let traffic = partition(&records, 3600).unwrap();
    let mut scores = std::collections::BTreeMap::new();
    scores.insert(30, vec![1.0, 0.5]);
    let patterns = build_patterns(&traffic, &scores);

    assert_eq!(patterns.len(), 48);
    assert_eq!(patterns[0].pattern_id, "pattern_0000");
    assert_eq!(patterns[30].risk_score, 10.0);
    assert_eq!(patterns[29].risk_score, 0.0);
    assert_eq!(patterns[0].protocols.len(), 3);
    assert_eq!(patterns[0].unique_peers(), 6);
}

#[test]
fn test_pattern_risk_bounds() {
    assert_eq!(pattern_risk(&[]), 0.0);
    assert!((pattern_risk(&[0.5]) - 5.0).abs() < 1e-12);
    assert!(pattern_risk(&[0.9, 0.9, 0.9]) <= 10.0);
}

#[test]
fn test_lenient_ingest_skips_malformed() {
    let raw: Vec<RawTrafficRecord> = serde_json::from_str(
        r#"[
            {"timestamp": "2024-01-01T00:00:00Z", "source_ip": "10.0.0.1", "destination_ip": "10.0.0.2",
             "protocol": "tcp", "port": 443, "bytes": 1200, "packets": 3},
            {"timestamp": "2024-01-01T00:01:00Z", "source_ip": "not-an-ip", "destination_ip": "10.0.0.2",
             "protocol": "udp", "port": 53, "bytes": 80, "packets": 1},
            {"timestamp": "2024-01-01T00:02:00Z", "src_ip": "10.0.0.3", "dest_ip": "10.0.0.2",
             "protocol": "udp", "port": 70000, "bytes": 80, "packets": 1},
            {"source_ip": "10.0.0.4", "destination_ip": "10.0.0.2",
             "protocol": "icmp", "port": 0, "bytes": 64, "packets": 1}
        ]"#,
    )
    .unwrap();

    let (records, warnings) = ingest(raw);
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].protocol, "TCP");
    assert_eq!(warnings.len(), 3);
    assert!(warnings.iter().all(|w| w.kind == WarningKind::MalformedRecord));
    assert!(warnings[0].message.contains("source_ip"));
    assert!(warnings[1].message.contains("out of range"));
    assert!(warnings[2].message.contains("timestamp"));
}

#[test]
fn test_strict_ingest_fails_on_negative_bytes() {
    let raw = vec![RawTrafficRecord {
        timestamp: Some(ts(BASE_TS)),
        source_ip: Some("10.0.0.1".into()),
        destination_ip: Some("10.0.0.2".into()),
        protocol: Some("TCP".into()),
        port: Some(80),
        bytes: Some(-5),
        packets: Some(1),
    }];
    assert!(matches!(ingest_strict(raw), Err(AnalysisError::MalformedRecord { index: 0, .. })));
}

proptest! {
    #[test]
    fn prop_windows_cover_range_contiguously(
        offsets in prop::collection::vec(0i64..500_000, 1..60),
        window in 1i64..20_000,
    ) {
        let records: Vec<TrafficRecord> = offsets
            .iter()
            .map(|o| rec(BASE_TS + o, "10.0.0.1", "10.0.0.2", "TCP", 80, 10, 1))
            .collect();
        let windows = aggregate(&records, window).unwrap();

        let min = records.iter().map(|r| r.timestamp).min().unwrap();
        let max = records.iter().map(|r| r.timestamp).max().unwrap();
        prop_assert!(windows[0].start <= min);
        prop_assert!(windows[windows.len() - 1].end > max);

        for pair in windows.windows(2) {
            prop_assert_eq!(pair[0].end, pair[1].start);
        }
        for (i, w) in windows.iter().enumerate() {
            prop_assert_eq!(w.index, i);
            prop_assert_eq!((w.end - w.start).num_seconds(), window);
        }
        let counted: usize = windows.iter().map(|w| w.record_count).sum();
        prop_assert_eq!(counted, records.len());
        let bytes: u64 = windows.iter().map(|w| w.total_bytes).sum();
        prop_assert_eq!(bytes, 10 * records.len() as u64);
    }
}
