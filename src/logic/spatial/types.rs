//! Spatial Types

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::logic::error::Outcome;

/// Cumulative traffic from one host to another
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FlowEdge {
    pub source: String,
    pub destination: String,
    pub bytes: u64,
    pub packets: u64,
    pub records: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Community {
    pub id: usize,
    /// Sorted ascending
    pub members: Vec<String>,
}

impl Community {
    pub fn size(&self) -> usize {
        self.members.len()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CommunityPartition {
    pub communities: Vec<Community>,
    pub modularity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hotspot {
    pub rank: usize,
    pub node: String,
    /// in + out bytes
    pub weight: u64,
    pub in_bytes: u64,
    pub out_bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FanHost {
    pub node: String,
    pub distinct_peers: usize,
    pub bytes: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AsymmetricPair {
    /// Heavy direction
    pub source: String,
    pub destination: String,
    pub forward_bytes: u64,
    pub reverse_bytes: u64,
    pub ratio: f64,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FlowPatterns {
    pub top_flows: Vec<FlowEdge>,
    pub fan_out: Vec<FanHost>,
    pub fan_in: Vec<FanHost>,
    pub asymmetric: Vec<AsymmetricPair>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SpatialAnalysis {
    pub node_count: usize,
    pub edge_count: usize,
    pub centrality: BTreeMap<String, f64>,
    pub communities: Outcome<CommunityPartition>,
    pub hotspots: Outcome<Vec<Hotspot>>,
    pub flow_patterns: FlowPatterns,
}
