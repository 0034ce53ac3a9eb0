//! Dense integer identifiers for entities and the grouping columns derived from them.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! dense_id {
    ($name:ident, $doc:expr) => {
        #[doc = $doc]
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        pub struct $name(pub usize);

        impl $name {
            pub fn index(self) -> usize {
                self.0
            }
        }

        impl From<usize> for $name {
            fn from(v: usize) -> Self {
                Self(v)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

dense_id!(EntityId, "Stable integer id of an input entity row.");
dense_id!(NameId, "Dense 0..N1-1 equivalence class over identical normalized identifiers.");
dense_id!(StrongId, "Dense 0..N2-1 equivalence class: SCC of the quotient graph on name_id.");
dense_id!(WeakId, "Dense 0..N3-1 equivalence class: WCC of the quotient graph on strong_id.");
dense_id!(BlockId, "Dense reindexing of a leaf block_name, assigned after recursive bisection.");
