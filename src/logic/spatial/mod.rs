//! Spatial Flow Graph Builder
//!
//! Edges are accumulated by a single writer, then centrality, communities
//! and hotspots run in parallel over the read-only graph.

pub mod types;
pub mod graph;
pub mod community;
pub mod hotspots;
pub mod flows;

pub use types::{
    AsymmetricPair, Community, CommunityPartition, FanHost, FlowEdge, FlowPatterns, Hotspot,
    SpatialAnalysis,
};
pub use graph::{degree_centrality, FlowGraph};
pub use community::detect_communities;
pub use hotspots::identify_hotspots;
pub use flows::analyze_flow_patterns;

use crate::logic::config::AnalyzerConfig;
use crate::logic::error::{AnalysisWarning, Outcome};

const COMPONENT: &str = "spatial";

pub fn analyze_spatial(
    graph: &FlowGraph,
    config: &AnalyzerConfig,
    warnings: &mut Vec<AnalysisWarning>,
) -> SpatialAnalysis {
    let ((centrality, partition), (hotspots, flow_patterns)) = rayon::join(
        || rayon::join(|| degree_centrality(graph), || detect_communities(graph)),
        || {
            rayon::join(
                || identify_hotspots(graph, config.hotspot_percentile),
                || analyze_flow_patterns(graph, config.fan_threshold),
            )
        },
    );

    let (communities, hotspots) = if graph.node_count() < 2 {
        let reason = format!("flow graph has {} node(s), need at least 2", graph.node_count());
        warnings.push(AnalysisWarning::insufficient(COMPONENT, reason.clone()));
        (Outcome::not_computed(reason.clone()), Outcome::not_computed(reason))
    } else {
        (Outcome::Computed(partition), Outcome::Computed(hotspots))
    };

    log::info!(
        "Flow graph: {} nodes, {} edges, {} fan-out hosts",
        graph.node_count(),
        graph.edge_count(),
        flow_patterns.fan_out.len()
    );

    SpatialAnalysis {
        node_count: graph.node_count(),
        edge_count: graph.edge_count(),
        centrality,
        communities,
        hotspots,
        flow_patterns,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::fixtures::{bridge_records, rec, BASE_TS};
    use proptest::prelude::*;

    #[test]
    fn test_single_node_graph_marks_not_computed() {
        let records = vec![rec(BASE_TS, "10.0.0.1", "10.0.0.1", "TCP", 80, 10, 1)];
        let graph = FlowGraph::from_records(&records);
        let mut warnings = Vec::new();
        let spatial = analyze_spatial(&graph, &AnalyzerConfig::default(), &mut warnings);
        assert!(!spatial.communities.is_computed());
        assert!(!spatial.hotspots.is_computed());
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn test_bridge_analysis() {
        let records = bridge_records();
        let graph = FlowGraph::from_records(&records);
        let mut warnings = Vec::new();
        let spatial = analyze_spatial(&graph, &AnalyzerConfig::default(), &mut warnings);
        assert_eq!(spatial.node_count, 8);
        assert_eq!(spatial.edge_count, 25);
        assert_eq!(spatial.communities.computed().map(|p| p.communities.len()), Some(2));
        assert!(warnings.is_empty());
    }

    proptest! {
        #[test]
        fn prop_communities_partition_nodes(
            edges in prop::collection::vec((0u8..12, 0u8..12), 1..40),
        ) {
            let mut graph = FlowGraph::new();
            for (a, b) in &edges {
                graph.add_flow(&format!("h{:02}", a), &format!("h{:02}", b), 1, 1);
            }
            prop_assume!(graph.node_count() >= 2);

            let partition = detect_communities(&graph);
            let mut seen: Vec<&String> = partition.communities.iter().flat_map(|c| c.members.iter()).collect();
            let total = seen.len();
            seen.sort();
            seen.dedup();
            prop_assert_eq!(total, graph.node_count());
            prop_assert_eq!(seen.len(), graph.node_count());
        }
    }
}
