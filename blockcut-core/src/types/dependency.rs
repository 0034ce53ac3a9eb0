//! Directed dependency edges between entities.

use serde::{Deserialize, Serialize};

use super::identifiers::EntityId;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DependencyKind {
    Call,
    Reference,
    Inheritance,
    Other(String),
}

impl DependencyKind {
    pub fn from_str_kind(s: &str) -> Self {
        match s {
            "call" => DependencyKind::Call,
            "reference" => DependencyKind::Reference,
            "inheritance" => DependencyKind::Inheritance,
            other => DependencyKind::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            DependencyKind::Call => "call",
            DependencyKind::Reference => "reference",
            DependencyKind::Inheritance => "inheritance",
            DependencyKind::Other(s) => s,
        }
    }
}

/// A directed edge `(src_id, tgt_id)`. Multiplicity is not preserved by the core;
/// self-loops (`src_id == tgt_id`) are ignored by every consumer.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DependencyEdge {
    pub src_id: EntityId,
    pub tgt_id: EntityId,
    pub kind: DependencyKind,
}

impl DependencyEdge {
    pub fn new(src_id: EntityId, tgt_id: EntityId, kind: DependencyKind) -> Self {
        Self { src_id, tgt_id, kind }
    }

    pub fn is_self_loop(&self) -> bool {
        self.src_id == self.tgt_id
    }
}
