//! Community Detection - greedy agglomerative modularity (CNM)
//!
//! Runs on the undirected, unweighted projection of the flow graph.
//! Starts from singletons and merges the pair with the largest modularity
//! gain until no merge improves modularity. Ties go to the smallest
//! (community, community) index pair, so results are deterministic.

use std::collections::{BTreeMap, BTreeSet};

use super::graph::FlowGraph;
use super::types::{Community, CommunityPartition};

const GAIN_EPSILON: f64 = 1e-12;

pub fn detect_communities(graph: &FlowGraph) -> CommunityPartition {
    let nodes: Vec<&str> = graph.nodes().map(|n| n.as_str()).collect();
    let n = nodes.len();
    if n < 2 {
        return CommunityPartition {
            communities: Vec::new(),
            modularity: 0.0,
        };
    }

    let index: BTreeMap<&str, usize> = nodes.iter().enumerate().map(|(i, n)| (*n, i)).collect();
    let pairs = graph.undirected_pairs();
    let m = pairs.len() as f64;

    let mut members: Vec<Option<BTreeSet<usize>>> = (0..n).map(|i| Some(BTreeSet::from([i]))).collect();

    if m > 0.0 {
        // between[(i, j)] with i < j: edge count between communities i and j
        let mut between: BTreeMap<(usize, usize), f64> = BTreeMap::new();
        let mut degree = vec![0.0f64; n];
        for (a, b) in &pairs {
            let (i, j) = (index[a], index[b]);
            *between.entry((i.min(j), i.max(j))).or_insert(0.0) += 1.0;
            degree[i] += 1.0;
            degree[j] += 1.0;
        }

        loop {
            let mut best: Option<((usize, usize), f64)> = None;
            for (&(i, j), &e) in &between {
                let gain = e / m - degree[i] * degree[j] / (2.0 * m * m);
                if best.map_or(true, |(_, g)| gain > g + GAIN_EPSILON) {
                    best = Some(((i, j), gain));
                }
            }
            let Some(((keep, absorb), gain)) = best else { break };
            if gain <= GAIN_EPSILON {
                break;
            }

            merge(&mut between, keep, absorb);
            degree[keep] += degree[absorb];
            degree[absorb] = 0.0;
            if let Some(absorbed) = members[absorb].take() {
                if let Some(target) = members[keep].as_mut() {
                    target.extend(absorbed);
                }
            }
        }
    }

    let mut groups: Vec<Vec<String>> = members
        .into_iter()
        .flatten()
        .map(|set| set.into_iter().map(|i| nodes[i].to_string()).collect())
        .collect();
    // Largest first, then lowest address
    groups.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a[0].cmp(&b[0])));

    let modularity = modularity(&groups, &pairs);
    log::debug!("Found {} communities (Q = {:.3})", groups.len(), modularity);

    CommunityPartition {
        communities: groups
            .into_iter()
            .enumerate()
            .map(|(id, members)| Community { id, members })
            .collect(),
        modularity,
    }
}

/// Fold community `absorb` into `keep` in the between-community table
fn merge(between: &mut BTreeMap<(usize, usize), f64>, keep: usize, absorb: usize) {
    let touching: Vec<((usize, usize), f64)> = between
        .iter()
        .filter(|((i, j), _)| *i == absorb || *j == absorb)
        .map(|(k, v)| (*k, *v))
        .collect();

    for (key, weight) in touching {
        between.remove(&key);
        let other = if key.0 == absorb { key.1 } else { key.0 };
        if other == keep {
            continue;
        }
        *between.entry((keep.min(other), keep.max(other))).or_insert(0.0) += weight;
    }
}

/// Newman modularity of a partition over the undirected projection
pub fn modularity(groups: &[Vec<String>], pairs: &BTreeSet<(&str, &str)>) -> f64 {
    let m = pairs.len() as f64;
    if m == 0.0 {
        return 0.0;
    }
    let mut label: BTreeMap<&str, usize> = BTreeMap::new();
    for (c, group) in groups.iter().enumerate() {
        for node in group {
            label.insert(node.as_str(), c);
        }
    }
    let mut internal = vec![0.0; groups.len()];
    let mut degree = vec![0.0; groups.len()];
    for (a, b) in pairs {
        let (ca, cb) = (label[a], label[b]);
        degree[ca] += 1.0;
        degree[cb] += 1.0;
        if ca == cb {
            internal[ca] += 1.0;
        }
    }
    internal
        .iter()
        .zip(&degree)
        .map(|(l, d)| l / m - (d / (2.0 * m)).powi(2))
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::logic::fixtures::bridge_records;

    #[test]
    fn test_bridge_yields_two_communities() {
        let records = bridge_records();
        let graph = FlowGraph::from_records(&records);
        let partition = detect_communities(&graph);

        assert_eq!(partition.communities.len(), 2);
        assert_eq!(partition.communities[0].members[0], "10.1.0.1");
        assert!(partition.communities.iter().all(|c| c.size() == 4));
        assert!(partition.communities[1].members.iter().all(|m| m.starts_with("10.2.")));
        assert!(partition.modularity > 0.3);
    }

    #[test]
    fn test_degenerate_graphs() {
        let empty = detect_communities(&FlowGraph::new());
        assert!(empty.communities.is_empty());

        let mut single = FlowGraph::new();
        single.add_flow("a", "a", 10, 1);
        assert!(detect_communities(&single).communities.is_empty());
    }

    #[test]
    fn test_isolated_pairs_stay_separate() {
        let mut g = FlowGraph::new();
        g.add_flow("a", "b", 1, 1);
        g.add_flow("c", "d", 1, 1);
        let p = detect_communities(&g);
        assert_eq!(p.communities.len(), 2);
        assert_eq!(p.communities[0].members, vec!["a".to_string(), "b".to_string()]);
    }
}
