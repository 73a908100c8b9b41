//! Traffic Types - records, raw ingestion form, windows, patterns

use std::collections::{BTreeMap, BTreeSet};
use std::net::IpAddr;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::logic::error::{AnalysisError, Result};

// ============================================================================
// TRAFFIC RECORD
// ============================================================================

/// One parsed traffic observation. Immutable once ingested.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrafficRecord {
    pub timestamp: DateTime<Utc>,
    pub source_ip: String,
    pub destination_ip: String,
    /// Upper-cased protocol identifier (TCP, UDP, ICMP, ...)
    pub protocol: String,
    pub port: u16,
    pub bytes: u64,
    pub packets: u64,
}

impl TrafficRecord {
    pub fn new(
        timestamp: DateTime<Utc>,
        source_ip: &str,
        destination_ip: &str,
        protocol: &str,
        port: u16,
        bytes: u64,
        packets: u64,
    ) -> Self {
        Self {
            timestamp,
            source_ip: source_ip.to_string(),
            destination_ip: destination_ip.to_string(),
            protocol: protocol.to_uppercase(),
            port,
            bytes,
            packets,
        }
    }
}

// ============================================================================
// RAW RECORD (lenient ingestion path)
// ============================================================================

/// Ingestion-side record: every field optional, validated on conversion
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RawTrafficRecord {
    #[serde(default)]
    pub timestamp: Option<DateTime<Utc>>,
    #[serde(default, alias = "src_ip")]
    pub source_ip: Option<String>,
    #[serde(default, alias = "dest_ip", alias = "dst_ip")]
    pub destination_ip: Option<String>,
    #[serde(default)]
    pub protocol: Option<String>,
    #[serde(default)]
    pub port: Option<i64>,
    #[serde(default)]
    pub bytes: Option<i64>,
    #[serde(default)]
    pub packets: Option<i64>,
}

impl RawTrafficRecord {
    /// Validate into a `TrafficRecord`; `index` is the position in the batch
    pub fn into_record(self, index: usize) -> Result<TrafficRecord> {
        let timestamp = self
            .timestamp
            .ok_or_else(|| AnalysisError::malformed(index, "missing timestamp"))?;
        let source_ip = parse_ip(index, "source_ip", self.source_ip)?;
        let destination_ip = parse_ip(index, "destination_ip", self.destination_ip)?;

        let protocol = match self.protocol.map(|p| p.trim().to_uppercase()) {
            Some(p) if !p.is_empty() => p,
            _ => return Err(AnalysisError::malformed(index, "missing protocol")),
        };

        let port = self
            .port
            .ok_or_else(|| AnalysisError::malformed(index, "missing port"))?;
        let port = u16::try_from(port)
            .map_err(|_| AnalysisError::malformed(index, format!("port {} out of range", port)))?;

        let bytes = non_negative(index, "bytes", self.bytes)?;
        let packets = non_negative(index, "packets", self.packets)?;

        Ok(TrafficRecord {
            timestamp,
            source_ip,
            destination_ip,
            protocol,
            port,
            bytes,
            packets,
        })
    }
}

fn parse_ip(index: usize, field: &str, value: Option<String>) -> Result<String> {
    let raw = value.ok_or_else(|| AnalysisError::malformed(index, format!("missing {}", field)))?;
    raw.trim()
        .parse::<IpAddr>()
        .map(|ip| ip.to_string())
        .map_err(|_| AnalysisError::malformed(index, format!("invalid {} '{}'", field, raw)))
}

fn non_negative(index: usize, field: &str, value: Option<i64>) -> Result<u64> {
    let v = value.ok_or_else(|| AnalysisError::malformed(index, format!("missing {}", field)))?;
    u64::try_from(v).map_err(|_| AnalysisError::malformed(index, format!("negative {}: {}", field, v)))
}

// ============================================================================
// TIME WINDOW
// ============================================================================

/// Half-open `[start, end)` bucket with summary statistics
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimeWindow {
    pub index: usize,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub total_bytes: u64,
    pub total_packets: u64,
    pub record_count: usize,
    pub unique_sources: usize,
    pub unique_destinations: usize,
}

impl TimeWindow {
    pub fn empty(index: usize, start: DateTime<Utc>, length: Duration) -> Self {
        Self {
            index,
            start,
            end: start + length,
            total_bytes: 0,
            total_packets: 0,
            record_count: 0,
            unique_sources: 0,
            unique_destinations: 0,
        }
    }

    pub fn contains(&self, ts: DateTime<Utc>) -> bool {
        ts >= self.start && ts < self.end
    }

    pub fn is_empty(&self) -> bool {
        self.record_count == 0
    }

    pub fn avg_packet_size(&self) -> f64 {
        if self.total_packets == 0 {
            0.0
        } else {
            self.total_bytes as f64 / self.total_packets as f64
        }
    }
}

// ============================================================================
// TRAFFIC PATTERN
// ============================================================================

/// Summary of one non-empty window. Built once, never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrafficPattern {
    pub pattern_id: String,
    pub window_index: usize,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub source_ips: BTreeSet<String>,
    pub destination_ips: BTreeSet<String>,
    pub protocols: BTreeMap<String, usize>,
    pub ports: BTreeMap<u16, usize>,
    pub bytes_transferred: u64,
    pub packet_count: u64,
    pub average_packet_size: f64,
    /// 0..=10
    pub risk_score: f64,
}

impl TrafficPattern {
    /// Distinct hosts seen on either side of the window's flows
    pub fn unique_peers(&self) -> usize {
        self.source_ips.union(&self.destination_ips).count()
    }
}
