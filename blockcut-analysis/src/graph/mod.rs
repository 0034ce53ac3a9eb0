//! Pure functions over directed edge sets with integer node ids: quotient
//! relabeling, SCC labeling, WCC labeling. Deterministic in the input ordering
//! of `nodes`; linear in nodes + edges.

use blockcut_core::FxHashMap;
use petgraph::algo::tarjan_scc;
use petgraph::graphmap::DiGraphMap;
use petgraph::unionfind::UnionFind;

/// Relabel each endpoint of `edges` under `group_of`. Duplicates and self-loops
/// (after relabeling) are preserved; callers drop self-loops explicitly where
/// that matters for their algorithm.
pub fn quotient(edges: &[(usize, usize)], group_of: impl Fn(usize) -> usize) -> Vec<(usize, usize)> {
    edges
        .iter()
        .map(|&(a, b)| (group_of(a), group_of(b)))
        .collect()
}

/// Dense 0..k-1 labeling of `nodes` by strongly connected component of the
/// directed graph formed by `edges`. Nodes with no incident edge form a
/// singleton SCC. Labels are deterministic given `nodes`' order: components
/// are numbered in the order `petgraph::algo::tarjan_scc` emits them, which is
/// itself a deterministic function of graph construction order.
pub fn scc_labels(nodes: &[usize], edges: &[(usize, usize)]) -> FxHashMap<usize, usize> {
    let mut g: DiGraphMap<usize, ()> = DiGraphMap::new();
    for &n in nodes {
        g.add_node(n);
    }
    for &(a, b) in edges {
        if a != b {
            g.add_edge(a, b, ());
        }
    }

    let sccs = tarjan_scc(&g);
    let mut labels = FxHashMap::default();
    // tarjan_scc yields components in reverse topological order; reverse so
    // that label 0 tends to be an "upstream" component, matching the solver's
    // part-0-is-upstream bias without actually depending on it.
    for (label, component) in sccs.into_iter().rev().enumerate() {
        for node in component {
            labels.insert(node, label);
        }
    }
    labels
}

/// Dense 0..k-1 labeling of `nodes` by weakly connected component, ignoring
/// edge direction.
pub fn wcc_labels(nodes: &[usize], edges: &[(usize, usize)]) -> FxHashMap<usize, usize> {
    if nodes.is_empty() {
        return FxHashMap::default();
    }
    let mut index_of: FxHashMap<usize, usize> = FxHashMap::default();
    for (i, &n) in nodes.iter().enumerate() {
        index_of.insert(n, i);
    }

    let mut uf = UnionFind::new(nodes.len());
    for &(a, b) in edges {
        if a == b {
            continue;
        }
        if let (Some(&ia), Some(&ib)) = (index_of.get(&a), index_of.get(&b)) {
            uf.union(ia, ib);
        }
    }

    let reps = uf.into_labeling();
    let mut dense: FxHashMap<usize, usize> = FxHashMap::default();
    let mut labels = FxHashMap::default();
    for (i, &n) in nodes.iter().enumerate() {
        let rep = reps[i];
        let next = dense.len();
        let label = *dense.entry(rep).or_insert(next);
        labels.insert(n, label);
    }
    labels
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn scc_merges_a_cycle() {
        let nodes = vec![0, 1, 2, 3];
        let edges = vec![(0, 1), (1, 2), (2, 0), (2, 3)];
        let labels = scc_labels(&nodes, &edges);
        assert_eq!(labels[&0], labels[&1]);
        assert_eq!(labels[&1], labels[&2]);
        assert_ne!(labels[&2], labels[&3]);
    }

    #[test]
    fn scc_singleton_nodes_get_distinct_labels() {
        let nodes = vec![0, 1];
        let edges: Vec<(usize, usize)> = vec![];
        let labels = scc_labels(&nodes, &edges);
        assert_ne!(labels[&0], labels[&1]);
    }

    #[test]
    fn wcc_two_disjoint_components() {
        let nodes = vec![0, 1, 2, 3];
        let edges = vec![(0, 1), (2, 3)];
        let labels = wcc_labels(&nodes, &edges);
        assert_eq!(labels[&0], labels[&1]);
        assert_eq!(labels[&2], labels[&3]);
        assert_ne!(labels[&0], labels[&2]);
    }

    #[test]
    fn wcc_labels_are_dense() {
        let nodes = vec![0, 1, 2, 3];
        let edges = vec![(0, 1), (2, 3)];
        let labels = wcc_labels(&nodes, &edges);
        let mut vals: Vec<usize> = labels.values().copied().collect();
        vals.sort();
        vals.dedup();
        assert_eq!(vals, vec![0, 1]);
    }

    #[test]
    fn quotient_relabels_both_endpoints() {
        let edges = vec![(0, 1), (1, 2)];
        let grouped = quotient(&edges, |n| n / 2);
        assert_eq!(grouped, vec![(0, 0), (0, 1)]);
    }
}
