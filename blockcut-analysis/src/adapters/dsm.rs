//! DV8-compatible design structure matrix output.

use blockcut_core::{DependencyEdge, Entity};
use serde::Serialize;
use serde_json::{Map, Value};

#[derive(Debug, Serialize)]
pub struct Dsm {
    #[serde(rename = "schemaVersion")]
    pub schema_version: String,
    pub name: String,
    pub variables: Vec<String>,
    pub cells: Vec<DsmCell>,
}

#[derive(Debug, Serialize)]
pub struct DsmCell {
    pub src: usize,
    pub dest: usize,
    pub values: Map<String, Value>,
}

/// Build a DSM over `targets` (in table order) and the dependency edges among
/// them. One cell per distinct `(src, dest)` pair with a `values` map keying
/// each dependency kind present between them to `1.0`.
pub fn to_dsm(name: &str, targets: &[Entity], target_deps: &[DependencyEdge]) -> Dsm {
    let variables: Vec<String> = targets.iter().map(|e| e.name.clone()).collect();
    let index_of = |id: blockcut_core::EntityId| targets.iter().position(|e| e.id == id);

    let mut cells: Vec<DsmCell> = Vec::new();
    let mut seen: std::collections::HashMap<(usize, usize), usize> = std::collections::HashMap::new();

    for dep in target_deps {
        let (Some(src_ix), Some(dest_ix)) = (index_of(dep.src_id), index_of(dep.tgt_id)) else {
            continue;
        };
        let cell_ix = *seen.entry((src_ix, dest_ix)).or_insert_with(|| {
            cells.push(DsmCell { src: src_ix, dest: dest_ix, values: Map::new() });
            cells.len() - 1
        });
        cells[cell_ix].values.insert(dep.kind.as_str().to_string(), Value::from(1.0));
    }

    Dsm {
        schema_version: "1.0".to_string(),
        name: name.to_string(),
        variables,
        cells,
    }
}

pub fn write_dsm(path: &std::path::Path, name: &str, targets: &[Entity], target_deps: &[DependencyEdge]) -> std::io::Result<()> {
    let dsm = to_dsm(name, targets, target_deps);
    let file = std::fs::File::create(path)?;
    serde_json::to_writer(file, &dsm)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockcut_core::{DependencyKind, EntityId, EntityKind};

    #[test]
    fn builds_one_cell_per_pair_with_merged_kinds() {
        let targets = vec![
            Entity::new(EntityId(0), "render", EntityKind::Other("method".into())),
            Entity::new(EntityId(1), "paint", EntityKind::Other("method".into())),
        ];
        let deps = vec![
            DependencyEdge::new(EntityId(0), EntityId(1), DependencyKind::Call),
            DependencyEdge::new(EntityId(0), EntityId(1), DependencyKind::Reference),
        ];
        let dsm = to_dsm("widget", &targets, &deps);
        assert_eq!(dsm.variables, vec!["render", "paint"]);
        assert_eq!(dsm.cells.len(), 1);
        assert_eq!(dsm.cells[0].src, 0);
        assert_eq!(dsm.cells[0].dest, 1);
        assert_eq!(dsm.cells[0].values.len(), 2);
    }

    #[test]
    fn ignores_edges_outside_the_target_set() {
        let targets = vec![Entity::new(EntityId(0), "render", EntityKind::Other("method".into()))];
        let deps = vec![DependencyEdge::new(EntityId(0), EntityId(99), DependencyKind::Call)];
        let dsm = to_dsm("widget", &targets, &deps);
        assert!(dsm.cells.is_empty());
    }
}
