//! Black-box scenario tests driving the clustering pipeline end to end.

use blockcut_analysis::cluster;
use blockcut_core::{ClusterConfig, DependencyEdge, DependencyKind, Entity, EntityId, EntityKind, EntityTable, FxHashSet};

fn entity(id: usize, name: &str, kind: EntityKind) -> Entity {
    Entity::new(EntityId(id), name, kind)
}

fn call(src: usize, tgt: usize) -> DependencyEdge {
    DependencyEdge::new(EntityId(src), EntityId(tgt), DependencyKind::Call)
}

#[test]
fn lone_file_entity_lands_in_a_single_block() {
    let mut table = EntityTable::new(vec![entity(0, "Widget.java", EntityKind::File)]);
    let target_ids: FxHashSet<EntityId> = FxHashSet::default();
    let report = cluster::run(&mut table, &[], &target_ids, &ClusterConfig::default());

    assert!(report.bisections.is_empty());
    assert_eq!(table.block_name[0].as_deref(), Some("W0"));
    assert_eq!(table.block_id[0], Some(0.into()));
}

#[test]
fn two_disjoint_dependency_chains_become_two_leaf_blocks() {
    let entities = vec![
        entity(0, "A", EntityKind::Other("method".into())),
        entity(1, "B", EntityKind::Other("method".into())),
        entity(2, "C", EntityKind::Other("method".into())),
        entity(3, "D", EntityKind::Other("method".into())),
    ];
    let deps = vec![call(0, 1), call(2, 3)];
    let target_ids: FxHashSet<EntityId> = entities.iter().map(|e| e.id).collect();
    let mut table = EntityTable::new(entities);

    let config = ClusterConfig { use_text_edges: Some(false), ..Default::default() };
    let report = cluster::run(&mut table, &deps, &target_ids, &config);

    assert!(report.bisections.is_empty(), "no WCC should exceed max_weight");
    let blocks: FxHashSet<&str> = table.block_name.iter().map(|b| b.as_deref().unwrap()).collect();
    assert_eq!(blocks.len(), 2);
    assert_eq!(table.block_name[0], table.block_name[1]);
    assert_eq!(table.block_name[2], table.block_name[3]);
    assert_ne!(table.block_name[0], table.block_name[2]);
}

#[test]
fn a_long_chain_bisects_with_a_single_edge_cut() {
    const N: usize = 40;
    let entities: Vec<Entity> = (0..N)
        .map(|i| entity(i, &format!("node{i}"), EntityKind::Other("method".into())))
        .collect();
    let deps: Vec<DependencyEdge> = (0..N - 1).map(|i| call(i, i + 1)).collect();
    let target_ids: FxHashSet<EntityId> = entities.iter().map(|e| e.id).collect();
    let mut table = EntityTable::new(entities);

    let config = ClusterConfig { use_text_edges: Some(false), use_all: Some(false), ..Default::default() };
    let report = cluster::run(&mut table, &deps, &target_ids, &config);

    assert!(!report.bisections.is_empty(), "a 40-node chain exceeds max_weight and must bisect");

    let first = report.bisections.first().unwrap();
    if let blockcut_analysis::solver::SolverOutcome::Optimal { cut_value, .. } = &first.outcome {
        assert_eq!(*cut_value, 512);
    }

    let bound = ((1.5 * (N as f64 / 2.0).ceil()).ceil()) as usize;
    let mut counts = std::collections::HashMap::new();
    for name in table.block_name.iter() {
        *counts.entry(name.clone().unwrap()).or_insert(0usize) += 1;
    }
    for (name, &count) in &counts {
        assert!(count <= bound, "block {name} has {count} entities, exceeding bound {bound}");
    }
}
