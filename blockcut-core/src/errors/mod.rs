//! Error kinds for the blockcut engine, following the load-time-fatal /
//! solver-failure-recovered-locally split laid out by the component design.

pub mod cluster_error;
pub mod error_code;
pub mod load_error;

pub use cluster_error::ClusterError;
pub use error_code::BlockcutErrorCode;
pub use load_error::LoadError;
