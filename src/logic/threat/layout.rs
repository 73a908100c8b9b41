//! Threat Feature Layout - Centralized Feature Definition
//!
//! ## Rules:
//! 1. Add feature -> increment THREAT_FEATURE_VERSION
//! 2. Change order -> increment THREAT_FEATURE_VERSION
//! 3. Remove feature -> increment THREAT_FEATURE_VERSION

use crc32fast::Hasher;
use serde::{Deserialize, Serialize};

/// Current layout version
pub const THREAT_FEATURE_VERSION: u8 = 1;

/// Feature names in vector order
pub const THREAT_FEATURE_LAYOUT: &[&str] = &[
    // === Sources (0-1) ===
    "source_ip_entropy",     // 0: normalized entropy of source IPs
    "source_count_log",      // 1: ln(1 + distinct sources)

    // === Ports (2-3) ===
    "port_entropy",          // 2: normalized entropy of destination ports
    "port_count_log",        // 3: ln(1 + distinct ports)

    // === Payload (4-5) ===
    "payload_mean_log",      // 4: ln(1 + mean payload size)
    "payload_std_log",       // 5: ln(1 + payload std)

    // === Timing / targets (6-7) ===
    "inter_arrival_log",     // 6: ln(1 + mean inter-arrival ms)
    "privileged_port_ratio", // 7: share of ports below 1024
];

/// Must match THREAT_FEATURE_LAYOUT.len()
pub const THREAT_FEATURE_COUNT: usize = 8;

/// CRC32 over version and ordered names
pub fn compute_layout_hash(version: u8, names: &[&str]) -> u32 {
    let mut hasher = Hasher::new();
    hasher.update(&[version]);
    for name in names {
        hasher.update(name.as_bytes());
        hasher.update(&[0]);
    }
    hasher.finalize()
}

pub fn layout_hash() -> u32 {
    compute_layout_hash(THREAT_FEATURE_VERSION, THREAT_FEATURE_LAYOUT)
}

pub fn feature_index(name: &str) -> Option<usize> {
    THREAT_FEATURE_LAYOUT.iter().position(|&n| n == name)
}

/// Layout a feature matrix was built with
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LayoutInfo {
    pub version: u8,
    pub hash: u32,
    pub feature_names: Vec<String>,
}

impl LayoutInfo {
    pub fn current() -> Self {
        Self {
            version: THREAT_FEATURE_VERSION,
            hash: layout_hash(),
            feature_names: THREAT_FEATURE_LAYOUT.iter().map(|s| s.to_string()).collect(),
        }
    }

    pub fn from_names(version: u8, feature_names: Vec<String>) -> Self {
        let names: Vec<&str> = feature_names.iter().map(|s| s.as_str()).collect();
        Self {
            version,
            hash: compute_layout_hash(version, &names),
            feature_names,
        }
    }

    pub fn is_current(&self) -> bool {
        self.version == THREAT_FEATURE_VERSION && self.hash == layout_hash()
    }
}
