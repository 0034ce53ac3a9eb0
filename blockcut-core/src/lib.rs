//! # blockcut-core
//!
//! Foundation crate for the blockcut decomposition engine.
//! Defines all types, errors, config, constants, and tracing setup.
//! Every other crate in the workspace depends on this.

#![allow(dead_code)]

pub mod config;
pub mod constants;
pub mod errors;
pub mod tracing_init;
pub mod types;

pub use config::ClusterConfig;
pub use errors::error_code::BlockcutErrorCode;
pub use errors::{ClusterError, LoadError};
pub use types::collections::{FxHashMap, FxHashSet};
pub use types::dependency::{DependencyEdge, DependencyKind};
pub use types::entity::{Entity, EntityKind};
pub use types::identifiers::{BlockId, EntityId, NameId, StrongId, WeakId};
pub use types::table::EntityTable;
