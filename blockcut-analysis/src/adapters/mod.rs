//! External collaborators: the SQLite-backed dataset loader and the DSM/DRH/
//! validation output adapters. Deliberately thin: the core clustering
//! pipeline never depends on these directly.

pub mod drh;
pub mod dsm;
pub mod loader;
pub mod validate;

pub use loader::{candidate_files, load_dataset, Dataset};
