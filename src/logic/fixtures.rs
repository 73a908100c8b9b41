//! Shared test fixtures

use chrono::{DateTime, TimeZone, Utc};

use super::threat::ThreatEvent;
use super::traffic::TrafficRecord;

/// 2024-01-01T00:00:00Z, aligned to hourly windows
pub const BASE_TS: i64 = 1_704_067_200;

pub fn ts(secs: i64) -> DateTime<Utc> {
    Utc.timestamp_opt(secs, 0).unwrap()
}

pub fn rec(secs: i64, src: &str, dst: &str, proto: &str, port: u16, bytes: u64, packets: u64) -> TrafficRecord {
    TrafficRecord::new(ts(secs), src, dst, proto, port, bytes, packets)
}

/// 48 hourly windows of 3 records (TCP/UDP/ICMP); window 30 carries 10x bytes
pub fn spike_records() -> Vec<TrafficRecord> {
    let protocols = [("TCP", 443u16), ("UDP", 53), ("ICMP", 0)];
    let mut records = Vec::new();
    for i in 0..48i64 {
        let multiplier = if i == 30 { 10 } else { 1 };
        let bytes = (1000 + (i as u64 % 3) * 10) * multiplier;
        for (k, (proto, port)) in protocols.iter().enumerate() {
            records.push(rec(
                BASE_TS + i * 3600 + 60 * k as i64,
                &format!("10.0.0.{}", k + 1),
                &format!("10.0.1.{}", k + 1),
                proto,
                *port,
                bytes,
                10,
            ));
        }
    }
    records
}

/// Two 4-host cliques (all ordered pairs) joined by one bridging flow
pub fn bridge_records() -> Vec<TrafficRecord> {
    let a: Vec<String> = (1..=4).map(|i| format!("10.1.0.{}", i)).collect();
    let b: Vec<String> = (1..=4).map(|i| format!("10.2.0.{}", i)).collect();
    let mut records = Vec::new();
    let mut t = BASE_TS;
    for group in [&a, &b] {
        for src in group.iter() {
            for dst in group.iter().filter(|d| *d != src) {
                records.push(rec(t, src, dst, "TCP", 443, 500, 5));
                t += 10;
            }
        }
    }
    records.push(rec(t, &a[0], &b[0], "TCP", 443, 500, 5));
    records
}

/// 100 events: 40 SSH-like, 45 scan-like, 15 scattered outliers
pub fn threat_events() -> Vec<ThreatEvent> {
    let mut events = Vec::new();

    for i in 0..40u64 {
        events.push(ThreatEvent {
            event_id: format!("ssh-{:03}", i),
            timestamp: ts(BASE_TS + i as i64 * 30),
            category: "brute_force".into(),
            source_ips: vec!["10.0.0.1".into()],
            destination_ips: vec!["192.168.1.10".into()],
            destination_ports: vec![22; 10],
            payload_sizes: vec![100 + i, 110 + i],
            inter_arrival_ms: vec![1000.0 + i as f64],
        });
    }

    for i in 0..45u64 {
        events.push(ThreatEvent {
            event_id: format!("scan-{:03}", i),
            timestamp: ts(BASE_TS + 5000 + i as i64 * 20),
            category: "port_scan".into(),
            source_ips: vec!["10.0.1.1".into(), "10.0.1.2".into()],
            destination_ips: vec!["192.168.1.20".into()],
            destination_ports: (2000..2050).collect(),
            payload_sizes: vec![60 + (i % 5); 4],
            inter_arrival_ms: vec![10.0 + (i % 3) as f64],
        });
    }

    for k in 0..15u64 {
        let sources = (k % 5 + 3) as usize;
        let ports = ((7 * k) % 15 + 2) as usize;
        events.push(ThreatEvent {
            event_id: format!("odd-{:03}", k),
            timestamp: ts(BASE_TS + 20_000 + k as i64 * 600),
            category: "unknown".into(),
            source_ips: (0..sources).map(|j| format!("172.16.{}.{}", k, j)).collect(),
            destination_ips: vec!["192.168.1.30".into()],
            destination_ports: (0..ports).map(|j| (100 * k + 7 * j as u64 + 1) as u16).collect(),
            payload_sizes: vec![500 * (k + 1) + 37 * k * k, 80 * (k % 3 + 1)],
            inter_arrival_ms: vec![(100 * (k + 1) * (k % 4 + 1)) as f64],
        });
    }

    events
}
