//! Protocol Types

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolStats {
    pub protocol: String,
    pub record_count: usize,
    pub bytes_sum: u64,
    pub bytes_mean: f64,
    /// Sample std, 0 with fewer than two records
    pub bytes_std: f64,
    pub packets_sum: u64,
    pub packets_mean: f64,
    pub packets_std: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UnusualReason {
    /// Frequency below the rarity threshold
    Rare,
    /// Not present in the reference baseline
    Unseen,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnusualCombination {
    pub protocol: String,
    pub port: u16,
    pub count: usize,
    pub frequency: f64,
    pub reason: UnusualReason,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProtocolAnalysis {
    pub statistics: BTreeMap<String, ProtocolStats>,
    /// Shannon entropy (nats) of record counts per protocol
    pub entropy: f64,
    /// entropy / ln(k), in [0, 1]
    pub normalized_entropy: f64,
    pub unusual_combinations: Vec<UnusualCombination>,
}

/// Known-good (protocol, port) pairs
pub type ReferenceCombinations = BTreeSet<(String, u16)>;
