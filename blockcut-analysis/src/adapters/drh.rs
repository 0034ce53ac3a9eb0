//! DV8-compatible design rule hierarchy output.
//!
//! The hierarchy is reconstructed purely from each entity's `block_name`:
//! a leading weak-id digit string followed by a path of `A`/`B` bisection
//! choices (e.g. `"12AB"` means weak group 12, left child, then right child).

use blockcut_core::Entity;
use serde::Serialize;
use serde_json::{json, Value};

#[derive(Debug, Serialize)]
pub struct Drh {
    #[serde(rename = "@schemaVersion")]
    pub schema_version: String,
    pub name: String,
    pub structure: Vec<Value>,
}

fn group(name: impl Into<String>) -> Value {
    json!({ "@type": "group", "name": name.into(), "nested": Value::Array(Vec::new()) })
}

fn item(name: impl Into<String>) -> Value {
    json!({ "@type": "item", "name": name.into() })
}

/// Parse a block name like `"12AB"` into `[12, 0, 1]` (weak id, then a 0/1 per
/// bisection letter in path order).
fn to_idx_list(block_name: &str) -> Vec<usize> {
    let mut letters: Vec<usize> = Vec::new();
    let mut digits_rev = String::new();
    for c in block_name.chars().rev() {
        match c {
            'A' => letters.push(0),
            'B' => letters.push(1),
            '0'..='9' => digits_rev.push(c),
            _ => {}
        }
    }
    let weak_id: usize = digits_rev.chars().rev().collect::<String>().parse().unwrap_or(0);
    let mut idx_list = vec![weak_id];
    idx_list.extend(letters.into_iter().rev());
    idx_list
}

fn add_to_root(root: &mut Vec<Value>, idx_list: &[usize], item_name: &str) {
    let weak_ix = idx_list[0];
    while root.len() <= weak_ix {
        root.push(Value::Null);
    }
    if root[weak_ix].is_null() {
        root[weak_ix] = group(format!("W{weak_ix}"));
    }

    let mut curr = &mut root[weak_ix];
    for &ix in &idx_list[1..] {
        let nested = curr.get_mut("nested").unwrap().as_array_mut().unwrap();
        if nested.is_empty() {
            nested.push(Value::Null);
            nested.push(Value::Null);
        }
        if nested[ix].is_null() {
            nested[ix] = group(if ix == 0 { "A" } else { "B" });
        }
        curr = &mut nested[ix];
    }

    curr.get_mut("nested").unwrap().as_array_mut().unwrap().push(item(item_name));
}

/// Build a DRH tree from every entity's `block_name`, keyed by its originally
/// assigned hierarchical path.
pub fn to_drh(name: &str, entities: &[(Entity, String)]) -> Drh {
    let mut root: Vec<Value> = Vec::new();
    for (entity, block_name) in entities {
        add_to_root(&mut root, &to_idx_list(block_name), &entity.name);
    }
    Drh {
        schema_version: "1.0".to_string(),
        name: name.to_string(),
        structure: root,
    }
}

pub fn write_drh(path: &std::path::Path, name: &str, entities: &[(Entity, String)]) -> std::io::Result<()> {
    let drh = to_drh(name, entities);
    let file = std::fs::File::create(path)?;
    serde_json::to_writer(file, &drh)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use blockcut_core::{EntityId, EntityKind};

    #[test]
    fn parses_weak_id_and_path() {
        assert_eq!(to_idx_list("12AB"), vec![12, 0, 1]);
        assert_eq!(to_idx_list("0"), vec![0]);
        assert_eq!(to_idx_list("3A"), vec![3, 0]);
    }

    #[test]
    fn builds_nested_groups_for_shared_paths() {
        let entities = vec![
            (Entity::new(EntityId(0), "render", EntityKind::Other("method".into())), "0A".to_string()),
            (Entity::new(EntityId(1), "paint", EntityKind::Other("method".into())), "0B".to_string()),
            (Entity::new(EntityId(2), "run", EntityKind::Other("method".into())), "1".to_string()),
        ];
        let drh = to_drh("widget-drh", &entities);
        assert_eq!(drh.structure.len(), 2);
        let w0 = &drh.structure[0];
        assert_eq!(w0["@type"], "group");
        assert_eq!(w0["name"], "W0");
        let nested = w0["nested"].as_array().unwrap();
        assert_eq!(nested.len(), 2);
        assert_eq!(nested[0]["name"], "A");
        assert_eq!(nested[0]["nested"][0]["name"], "render");
        assert_eq!(nested[1]["nested"][0]["name"], "paint");

        let w1 = &drh.structure[1];
        assert_eq!(w1["nested"][0]["name"], "run");
    }
}
