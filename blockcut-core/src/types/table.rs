//! The entity table: the grouping columns are modeled as an immutable sequence of
//! derived mappings from `EntityId` to each grouping id, populated by successive
//! passes, rather than as a mutated dataframe.

use super::entity::Entity;
use super::identifiers::{BlockId, EntityId, NameId, StrongId, WeakId};

/// Struct-of-arrays over the entities of one clustering run, plus the grouping
/// columns attached to it as the driver proceeds. Every column is keyed on the
/// entity's position in `entities`, which equals `EntityId::index()`.
#[derive(Debug, Clone, Default)]
pub struct EntityTable {
    pub entities: Vec<Entity>,
    pub name_id: Vec<Option<NameId>>,
    pub strong_id: Vec<Option<StrongId>>,
    pub weak_id: Vec<Option<WeakId>>,
    pub block_name: Vec<Option<String>>,
    pub block_id: Vec<Option<BlockId>>,
}

impl EntityTable {
    pub fn new(entities: Vec<Entity>) -> Self {
        let n = entities.len();
        Self {
            entities,
            name_id: vec![None; n],
            strong_id: vec![None; n],
            weak_id: vec![None; n],
            block_name: vec![None; n],
            block_id: vec![None; n],
        }
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }

    pub fn entity(&self, id: EntityId) -> &Entity {
        &self.entities[id.index()]
    }

    pub fn name_id_of(&self, id: EntityId) -> NameId {
        self.name_id[id.index()].expect("name_id not yet assigned")
    }

    pub fn strong_id_of(&self, id: EntityId) -> StrongId {
        self.strong_id[id.index()].expect("strong_id not yet assigned")
    }

    pub fn weak_id_of(&self, id: EntityId) -> WeakId {
        self.weak_id[id.index()].expect("weak_id not yet assigned")
    }

    pub fn block_name_of(&self, id: EntityId) -> &str {
        self.block_name[id.index()]
            .as_deref()
            .expect("block_name not yet assigned")
    }

    pub fn block_id_of(&self, id: EntityId) -> BlockId {
        self.block_id[id.index()].expect("block_id not yet assigned")
    }
}
