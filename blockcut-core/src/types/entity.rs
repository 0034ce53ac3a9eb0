//! The entity row itself: an atomic code element inside or referencing the god file.

use serde::{Deserialize, Serialize};

use super::identifiers::EntityId;

/// Structural role of an entity. Only `File` entities carry zero clustering weight;
/// every other kind (method, field, class, ...) carries weight 1.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    File,
    Other(String),
}

impl EntityKind {
    pub fn from_str_kind(s: &str) -> Self {
        if s == "file" {
            EntityKind::File
        } else {
            EntityKind::Other(s.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            EntityKind::File => "file",
            EntityKind::Other(s) => s,
        }
    }

    /// entity_weight(id) per the clustering driver's weight rule.
    pub fn weight(&self) -> u32 {
        match self {
            EntityKind::File => 0,
            EntityKind::Other(_) => 1,
        }
    }
}

/// An atomic code element: a target (child of the god file) or a client
/// (external entity referencing a target).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub name: String,
    pub kind: EntityKind,
}

impl Entity {
    pub fn new(id: EntityId, name: impl Into<String>, kind: EntityKind) -> Self {
        Self {
            id,
            name: name.into(),
            kind,
        }
    }

    pub fn weight(&self) -> u32 {
        self.kind.weight()
    }

    pub fn is_file(&self) -> bool {
        matches!(self.kind, EntityKind::File)
    }
}
