//! Dataset loader: the relational-store collaborator, queried through a fixed
//! set of parameterized SQL statements over a SQLite connection.
//!
//! Schema (supplemented with a `refs` table per `db.py`'s `fetch_lead_ref_name`,
//! needed to pick a reference snapshot):
//!
//! ```sql
//! CREATE TABLE refs(name TEXT NOT NULL);              -- one row per analyzed revision
//! CREATE TABLE entities(id INTEGER PRIMARY KEY, ref_name TEXT, name TEXT, kind TEXT, parent_id INTEGER);
//! CREATE TABLE deps(src_id INTEGER, tgt_id INTEGER, kind TEXT);
//! CREATE TABLE touches(author_email TEXT, sha1 TEXT, entity_id INTEGER);
//! ```

use blockcut_core::errors::LoadError;
use blockcut_core::types::dependency::DependencyKind;
use blockcut_core::{DependencyEdge, Entity, EntityKind, EntityId};
use rusqlite::{params, Connection};

/// The five input tables plus the outgoing type name list, scoped to one god
/// file's decomposition run.
#[derive(Debug, Clone, Default)]
pub struct Dataset {
    pub targets: Vec<Entity>,
    pub target_deps: Vec<DependencyEdge>,
    pub clients: Vec<Entity>,
    pub client_deps: Vec<DependencyEdge>,
    pub outgoing_type_names: Vec<String>,
}

impl Dataset {
    pub fn entities(&self) -> Vec<Entity> {
        self.targets.iter().chain(self.clients.iter()).cloned().collect()
    }

    pub fn deps(&self) -> Vec<DependencyEdge> {
        self.target_deps.iter().chain(self.client_deps.iter()).cloned().collect()
    }

    pub fn target_ids(&self) -> blockcut_core::FxHashSet<EntityId> {
        self.targets.iter().map(|e| e.id).collect()
    }
}

/// The most recently analyzed revision's ref name.
pub fn fetch_lead_ref_name(conn: &Connection) -> Result<String, LoadError> {
    conn.query_row("SELECT name FROM refs LIMIT 1", [], |row| row.get(0))
        .map_err(|e| LoadError::SqliteError { message: e.to_string() })
}

/// Load the full dataset for decomposing the single file entity named `filename`.
pub fn load_dataset(conn: &Connection, filename: &str) -> Result<Dataset, LoadError> {
    let ref_name = fetch_lead_ref_name(conn)?;

    let top_id = fetch_unique_file_id(conn, filename)?;
    let mut targets = fetch_children(conn, &ref_name, top_id)?;

    // If there's only one top-level item (e.g. a single class), descend into its children.
    let effective_top_id = if targets.len() == 1 {
        let only = targets[0].id;
        targets = fetch_children(conn, &ref_name, only.index() as i64)?;
        only.index() as i64
    } else {
        top_id
    };

    let target_deps = fetch_internal_deps(conn, effective_top_id)?;
    let clients = fetch_clients(conn, filename)?;
    let client_deps = fetch_client_deps(conn, effective_top_id, filename)?;
    let outgoing_type_names = fetch_outgoing_type_names(conn, effective_top_id)?;

    let (targets, target_deps, clients, client_deps) = renumber(targets, target_deps, clients, client_deps);

    Ok(Dataset {
        targets,
        target_deps,
        clients,
        client_deps,
        outgoing_type_names,
    })
}

/// Entity ids coming out of the store are the table's own primary keys, not a
/// dense `0..n` run. `EntityTable` indexes its grouping columns by
/// `EntityId::index()`, so every id is remapped here, in target-then-client
/// order, before the dataset leaves this module.
fn renumber(
    targets: Vec<Entity>,
    target_deps: Vec<DependencyEdge>,
    clients: Vec<Entity>,
    client_deps: Vec<DependencyEdge>,
) -> (Vec<Entity>, Vec<DependencyEdge>, Vec<Entity>, Vec<DependencyEdge>) {
    let mut remap: blockcut_core::FxHashMap<EntityId, EntityId> = blockcut_core::FxHashMap::default();
    for e in targets.iter().chain(clients.iter()) {
        let next = EntityId(remap.len());
        remap.entry(e.id).or_insert(next);
    }

    let remap_entity = |e: &Entity| Entity::new(remap[&e.id], e.name.clone(), e.kind.clone());
    let remap_edges = |deps: &[DependencyEdge]| -> Vec<DependencyEdge> {
        deps.iter()
            .filter_map(|d| {
                let src = remap.get(&d.src_id)?;
                let tgt = remap.get(&d.tgt_id)?;
                Some(DependencyEdge::new(*src, *tgt, d.kind.clone()))
            })
            .collect()
    };

    let new_targets: Vec<Entity> = targets.iter().map(remap_entity).collect();
    let new_clients: Vec<Entity> = clients.iter().map(remap_entity).collect();
    let new_target_deps = remap_edges(&target_deps);
    let new_client_deps = remap_edges(&client_deps);

    (new_targets, new_target_deps, new_clients, new_client_deps)
}

fn fetch_unique_file_id(conn: &Connection, filename: &str) -> Result<i64, LoadError> {
    let mut stmt = conn
        .prepare_cached("SELECT id FROM entities WHERE name = ?1 AND kind = 'file'")
        .map_err(|e| LoadError::SqliteError { message: e.to_string() })?;
    let ids: Vec<i64> = stmt
        .query_map(params![filename], |row| row.get(0))
        .map_err(|e| LoadError::SqliteError { message: e.to_string() })?
        .collect::<Result<_, _>>()
        .map_err(|e| LoadError::SqliteError { message: e.to_string() })?;

    match ids.len() {
        0 => Err(LoadError::NoFileFound { filename: filename.to_string() }),
        1 => Ok(ids[0]),
        count => Err(LoadError::AmbiguousFile { filename: filename.to_string(), count }),
    }
}

fn fetch_children(conn: &Connection, ref_name: &str, target_id: i64) -> Result<Vec<Entity>, LoadError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT id, name, kind FROM entities WHERE ref_name = ?1 AND parent_id = ?2 ORDER BY id",
        )
        .map_err(|e| LoadError::SqliteError { message: e.to_string() })?;
    let rows = stmt
        .query_map(params![ref_name, target_id], map_entity_row)
        .map_err(|e| LoadError::SqliteError { message: e.to_string() })?;
    collect_entities(rows)
}

fn fetch_internal_deps(conn: &Connection, target_id: i64) -> Result<Vec<DependencyEdge>, LoadError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT d.src_id, d.tgt_id, d.kind
             FROM deps d
             JOIN entities s ON s.id = d.src_id
             JOIN entities t ON t.id = d.tgt_id
             WHERE s.parent_id = ?1 AND t.parent_id = ?1",
        )
        .map_err(|e| LoadError::SqliteError { message: e.to_string() })?;
    let rows = stmt
        .query_map(params![target_id], map_dep_row)
        .map_err(|e| LoadError::SqliteError { message: e.to_string() })?;
    collect_deps(rows)
}

fn fetch_clients(conn: &Connection, target_file: &str) -> Result<Vec<Entity>, LoadError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT DISTINCT e.id, e.name, e.kind
             FROM entities e
             JOIN deps d ON d.src_id = e.id OR d.tgt_id = e.id
             JOIN entities f ON f.id = d.tgt_id OR f.id = d.src_id
             JOIN entities file_entity ON file_entity.name = ?1 AND file_entity.kind = 'file'
             WHERE e.parent_id != file_entity.id AND f.parent_id = file_entity.id",
        )
        .map_err(|e| LoadError::SqliteError { message: e.to_string() })?;
    let rows = stmt
        .query_map(params![target_file], map_entity_row)
        .map_err(|e| LoadError::SqliteError { message: e.to_string() })?;
    collect_entities(rows)
}

fn fetch_client_deps(conn: &Connection, target_id: i64, target_file: &str) -> Result<Vec<DependencyEdge>, LoadError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT d.src_id, d.tgt_id, d.kind
             FROM deps d
             JOIN entities s ON s.id = d.src_id
             JOIN entities t ON t.id = d.tgt_id
             JOIN entities file_entity ON file_entity.name = ?2 AND file_entity.kind = 'file'
             WHERE (s.parent_id = ?1 AND t.parent_id != file_entity.id)
                OR (t.parent_id = ?1 AND s.parent_id != file_entity.id)",
        )
        .map_err(|e| LoadError::SqliteError { message: e.to_string() })?;
    let rows = stmt
        .query_map(params![target_id, target_file], map_dep_row)
        .map_err(|e| LoadError::SqliteError { message: e.to_string() })?;
    collect_deps(rows)
}

fn fetch_outgoing_type_names(conn: &Connection, target_id: i64) -> Result<Vec<String>, LoadError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT DISTINCT t.name
             FROM deps d
             JOIN entities s ON s.id = d.src_id
             JOIN entities t ON t.id = d.tgt_id
             WHERE s.parent_id = ?1 AND d.kind IN ('reference', 'inheritance')",
        )
        .map_err(|e| LoadError::SqliteError { message: e.to_string() })?;
    let rows = stmt
        .query_map(params![target_id], |row| row.get::<_, String>(0))
        .map_err(|e| LoadError::SqliteError { message: e.to_string() })?;
    let mut result = Vec::new();
    for row in rows {
        result.push(row.map_err(|e| LoadError::SqliteError { message: e.to_string() })?);
    }
    Ok(result)
}

fn map_entity_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Entity> {
    let id: i64 = row.get(0)?;
    let name: String = row.get(1)?;
    let kind: String = row.get(2)?;
    Ok(Entity::new(EntityId(id as usize), name, EntityKind::from_str_kind(&kind)))
}

fn map_dep_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<DependencyEdge> {
    let src: i64 = row.get(0)?;
    let tgt: i64 = row.get(1)?;
    let kind: String = row.get(2)?;
    Ok(DependencyEdge::new(
        EntityId(src as usize),
        EntityId(tgt as usize),
        DependencyKind::from_str_kind(&kind),
    ))
}

fn collect_entities(
    rows: rusqlite::MappedRows<'_, impl FnMut(&rusqlite::Row<'_>) -> rusqlite::Result<Entity>>,
) -> Result<Vec<Entity>, LoadError> {
    let mut result = Vec::new();
    for row in rows {
        result.push(row.map_err(|e| LoadError::SqliteError { message: e.to_string() })?);
    }
    Ok(result)
}

fn collect_deps(
    rows: rusqlite::MappedRows<'_, impl FnMut(&rusqlite::Row<'_>) -> rusqlite::Result<DependencyEdge>>,
) -> Result<Vec<DependencyEdge>, LoadError> {
    let mut result = Vec::new();
    for row in rows {
        result.push(row.map_err(|e| LoadError::SqliteError { message: e.to_string() })?);
    }
    Ok(result)
}

/// Candidate god-file subjects: files whose line count (approximated here by
/// child-entity count) meets `min_children`. Mirrors `fetch_candidate_files`,
/// used by the CLI's subject-selection glue, kept outside the core pipeline.
pub fn candidate_files(conn: &Connection, ref_name: &str, min_children: i64) -> Result<Vec<String>, LoadError> {
    let mut stmt = conn
        .prepare_cached(
            "SELECT f.name FROM entities f
             WHERE f.kind = 'file' AND f.ref_name = ?1
             AND (SELECT COUNT(*) FROM entities c WHERE c.parent_id = f.id) >= ?2
             ORDER BY f.name",
        )
        .map_err(|e| LoadError::SqliteError { message: e.to_string() })?;
    let rows = stmt
        .query_map(params![ref_name, min_children], |row| row.get::<_, String>(0))
        .map_err(|e| LoadError::SqliteError { message: e.to_string() })?;
    let mut result = Vec::new();
    for row in rows {
        result.push(row.map_err(|e| LoadError::SqliteError { message: e.to_string() })?);
    }
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn setup(conn: &Connection) {
        conn.execute_batch(
            "CREATE TABLE refs(name TEXT NOT NULL);
             CREATE TABLE entities(id INTEGER PRIMARY KEY, ref_name TEXT, name TEXT, kind TEXT, parent_id INTEGER);
             CREATE TABLE deps(src_id INTEGER, tgt_id INTEGER, kind TEXT);
             CREATE TABLE touches(author_email TEXT, sha1 TEXT, entity_id INTEGER);
             INSERT INTO refs(name) VALUES ('main');
             INSERT INTO entities VALUES (1, 'main', 'Widget.java', 'file', NULL);
             INSERT INTO entities VALUES (2, 'main', 'render', 'method', 1);
             INSERT INTO entities VALUES (3, 'main', 'paint', 'method', 1);
             INSERT INTO entities VALUES (4, 'main', 'Caller.java', 'file', NULL);
             INSERT INTO entities VALUES (5, 'main', 'run', 'method', 4);
             INSERT INTO deps VALUES (2, 3, 'call');
             INSERT INTO deps VALUES (5, 2, 'call');",
        )
        .unwrap();
    }

    #[test]
    fn loads_targets_and_clients() {
        let conn = Connection::open_in_memory().unwrap();
        setup(&conn);
        let dataset = load_dataset(&conn, "Widget.java").unwrap();
        assert_eq!(dataset.targets.len(), 2);
        assert_eq!(dataset.target_deps.len(), 1);
        assert_eq!(dataset.clients.len(), 1);
        assert_eq!(dataset.client_deps.len(), 1);
    }

    #[test]
    fn no_file_found_is_an_error() {
        let conn = Connection::open_in_memory().unwrap();
        setup(&conn);
        let err = load_dataset(&conn, "Missing.java").unwrap_err();
        assert!(matches!(err, LoadError::NoFileFound { .. }));
    }

    #[test]
    fn ambiguous_file_is_an_error() {
        let conn = Connection::open_in_memory().unwrap();
        setup(&conn);
        conn.execute(
            "INSERT INTO entities VALUES (6, 'main', 'Widget.java', 'file', NULL)",
            [],
        )
        .unwrap();
        let err = load_dataset(&conn, "Widget.java").unwrap_err();
        assert!(matches!(err, LoadError::AmbiguousFile { .. }));
    }
}
