//! Traffic Hotspots - nodes above a weight percentile

use super::graph::FlowGraph;
use super::types::Hotspot;
use crate::logic::stats::percentile;

/// Nodes whose in+out bytes strictly exceed the `pct` percentile, heaviest first
pub fn identify_hotspots(graph: &FlowGraph, pct: f64) -> Vec<Hotspot> {
    if graph.node_count() < 2 {
        return Vec::new();
    }
    let totals = graph.node_bytes();
    let weights: Vec<f64> = totals.values().map(|(i, o)| i.saturating_add(*o) as f64).collect();
    let cutoff = percentile(&weights, pct);

    let mut hot: Vec<(&str, u64, u64)> = totals
        .iter()
        .filter(|(_, (i, o))| i.saturating_add(*o) as f64 > cutoff)
        .map(|(node, (i, o))| (*node, *i, *o))
        .collect();
    hot.sort_by(|a, b| b.1.saturating_add(b.2).cmp(&a.1.saturating_add(a.2)).then_with(|| a.0.cmp(b.0)));

    hot.into_iter()
        .enumerate()
        .map(|(rank, (node, in_bytes, out_bytes))| Hotspot {
            rank: rank + 1,
            node: node.to_string(),
            weight: in_bytes.saturating_add(out_bytes),
            in_bytes,
            out_bytes,
        })
        .collect()
}
