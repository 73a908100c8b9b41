//! Flow Graph - ordered directed graph of host-to-host traffic
//!
//! Built by a single writer; read-only afterwards.

use std::collections::{BTreeMap, BTreeSet};

use super::types::FlowEdge;
use crate::logic::traffic::TrafficRecord;

#[derive(Debug, Clone, Default)]
pub struct FlowGraph {
    nodes: BTreeSet<String>,
    edges: BTreeMap<(String, String), FlowEdge>,
}

impl FlowGraph {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records<'a, I>(records: I) -> Self
    where
        I: IntoIterator<Item = &'a TrafficRecord>,
    {
        let mut graph = Self::new();
        for record in records {
            graph.add_flow(&record.source_ip, &record.destination_ip, record.bytes, record.packets);
        }
        graph
    }

    pub fn add_flow(&mut self, source: &str, destination: &str, bytes: u64, packets: u64) {
        self.nodes.insert(source.to_string());
        self.nodes.insert(destination.to_string());
        let edge = self
            .edges
            .entry((source.to_string(), destination.to_string()))
            .or_insert_with(|| FlowEdge {
                source: source.to_string(),
                destination: destination.to_string(),
                ..Default::default()
            });
        edge.bytes = edge.bytes.saturating_add(bytes);
        edge.packets = edge.packets.saturating_add(packets);
        edge.records += 1;
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn edge_count(&self) -> usize {
        self.edges.len()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &String> {
        self.nodes.iter()
    }

    pub fn edges(&self) -> impl Iterator<Item = &FlowEdge> {
        self.edges.values()
    }

    pub fn edge(&self, source: &str, destination: &str) -> Option<&FlowEdge> {
        self.edges.get(&(source.to_string(), destination.to_string()))
    }

    /// Undirected, unweighted projection without self-loops; pairs as (low, high)
    pub fn undirected_pairs(&self) -> BTreeSet<(&str, &str)> {
        self.edges
            .keys()
            .filter(|(s, d)| s != d)
            .map(|(s, d)| {
                if s < d {
                    (s.as_str(), d.as_str())
                } else {
                    (d.as_str(), s.as_str())
                }
            })
            .collect()
    }

    /// (in_bytes, out_bytes) per node
    pub fn node_bytes(&self) -> BTreeMap<&str, (u64, u64)> {
        let mut totals: BTreeMap<&str, (u64, u64)> =
            self.nodes.iter().map(|n| (n.as_str(), (0, 0))).collect();
        for edge in self.edges.values() {
            if let Some(t) = totals.get_mut(edge.source.as_str()) {
                t.1 = t.1.saturating_add(edge.bytes);
            }
            if let Some(t) = totals.get_mut(edge.destination.as_str()) {
                t.0 = t.0.saturating_add(edge.bytes);
            }
        }
        totals
    }
}

/// (in-degree + out-degree) / (n - 1), self-loops excluded
pub fn degree_centrality(graph: &FlowGraph) -> BTreeMap<String, f64> {
    let n = graph.node_count();
    if n < 2 {
        return graph.nodes().map(|node| (node.clone(), 0.0)).collect();
    }
    let mut degree: BTreeMap<&str, usize> = graph.nodes().map(|node| (node.as_str(), 0)).collect();
    for edge in graph.edges().filter(|e| e.source != e.destination) {
        *degree.entry(edge.source.as_str()).or_insert(0) += 1;
        *degree.entry(edge.destination.as_str()).or_insert(0) += 1;
    }
    let scale = (n - 1) as f64;
    degree
        .into_iter()
        .map(|(node, d)| (node.to_string(), d as f64 / scale))
        .collect()
}
