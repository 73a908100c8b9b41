//! Flow Patterns - heavy flows, fan-out/fan-in hosts, asymmetric pairs

use std::collections::{BTreeMap, BTreeSet};

use super::graph::FlowGraph;
use super::types::{AsymmetricPair, FanHost, FlowEdge, FlowPatterns};

/// Flows listed in `top_flows`
pub const TOP_FLOW_LIMIT: usize = 10;

/// Minimum one-way / reverse byte ratio for an asymmetric pair
pub const ASYMMETRY_RATIO: f64 = 10.0;

pub fn analyze_flow_patterns(graph: &FlowGraph, fan_threshold: usize) -> FlowPatterns {
    let mut top_flows: Vec<FlowEdge> = graph.edges().cloned().collect();
    top_flows.sort_by(|a, b| {
        b.bytes
            .cmp(&a.bytes)
            .then_with(|| a.source.cmp(&b.source))
            .then_with(|| a.destination.cmp(&b.destination))
    });
    top_flows.truncate(TOP_FLOW_LIMIT);

    let mut outgoing: BTreeMap<&str, (BTreeSet<&str>, u64)> = BTreeMap::new();
    let mut incoming: BTreeMap<&str, (BTreeSet<&str>, u64)> = BTreeMap::new();
    for edge in graph.edges().filter(|e| e.source != e.destination) {
        let out = outgoing.entry(edge.source.as_str()).or_default();
        out.0.insert(edge.destination.as_str());
        out.1 = out.1.saturating_add(edge.bytes);

        let inc = incoming.entry(edge.destination.as_str()).or_default();
        inc.0.insert(edge.source.as_str());
        inc.1 = inc.1.saturating_add(edge.bytes);
    }

    FlowPatterns {
        top_flows,
        fan_out: fan_hosts(outgoing, fan_threshold),
        fan_in: fan_hosts(incoming, fan_threshold),
        asymmetric: asymmetric_pairs(graph),
    }
}

fn fan_hosts(peers: BTreeMap<&str, (BTreeSet<&str>, u64)>, threshold: usize) -> Vec<FanHost> {
    let mut hosts: Vec<FanHost> = peers
        .into_iter()
        .filter(|(_, (set, _))| set.len() >= threshold)
        .map(|(node, (set, bytes))| FanHost {
            node: node.to_string(),
            distinct_peers: set.len(),
            bytes,
        })
        .collect();
    hosts.sort_by(|a, b| b.distinct_peers.cmp(&a.distinct_peers).then_with(|| a.node.cmp(&b.node)));
    hosts
}

/// Pairs with traffic both ways where one direction carries >= 10x the other
fn asymmetric_pairs(graph: &FlowGraph) -> Vec<AsymmetricPair> {
    let mut pairs = Vec::new();
    for (low, high) in graph.undirected_pairs() {
        let (Some(fwd), Some(rev)) = (graph.edge(low, high), graph.edge(high, low)) else {
            continue;
        };
        if fwd.bytes == 0 || rev.bytes == 0 {
            continue;
        }
        let (heavy, light) = if fwd.bytes >= rev.bytes { (fwd, rev) } else { (rev, fwd) };
        let ratio = heavy.bytes as f64 / light.bytes as f64;
        if ratio >= ASYMMETRY_RATIO {
            pairs.push(AsymmetricPair {
                source: heavy.source.clone(),
                destination: heavy.destination.clone(),
                forward_bytes: heavy.bytes,
                reverse_bytes: light.bytes,
                ratio,
            });
        }
    }
    pairs.sort_by(|a, b| b.ratio.total_cmp(&a.ratio));
    pairs
}
