//! Clustering run configuration.

use serde::{Deserialize, Serialize};

/// Configuration options recognized by the clustering driver and its
/// collaborators. Every field is `Option<T>`; absent fields fall back to the
/// documented defaults via the `effective_*` accessors, matching how scan-time
/// configuration is modeled elsewhere in this workspace.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct ClusterConfig {
    /// Use DBSCAN on 1-S (eps=0.30, min_pts=3) to seed name_id instead of
    /// grouping by exact normalized name. Default: false.
    pub use_init_text_clx: Option<bool>,
    /// Include similarity edges in the cut objective. Default: true.
    pub use_text_edges: Option<bool>,
    /// Score threshold for emitting a similarity edge. Default: 0.35.
    pub text_edge_min_sim: Option<f64>,
    /// Similarity weight amplification. Default: 8.
    pub text_edge_multiplier: Option<f64>,
    /// Whether identical names reinforce occurrence counts. Default: true.
    pub allow_dup_names: Option<bool>,
    /// Integer scale for dependency edges. Default: 512.
    pub unit_edge_weight: Option<u32>,
    /// Pass full edge sets (inactive-node weights zeroed) vs. restrict edges
    /// to the active subset. Default: true.
    pub use_all: Option<bool>,
    /// Balance relaxation for `partition`. Default: 0.5.
    pub cut_eps: Option<f64>,
    /// Recursion termination threshold. Default: 24 with similarity edges
    /// enabled, 16 without.
    pub max_weight: Option<u32>,
    /// Per-bisection solver wall-clock limit, in seconds. Default: 30.
    pub solver_time_limit_secs: Option<u64>,
    /// Skip-bigram window for name similarity occurrence extraction. Default: 1.
    pub lookback: Option<usize>,
}

impl ClusterConfig {
    pub fn effective_use_init_text_clx(&self) -> bool {
        self.use_init_text_clx.unwrap_or(false)
    }

    pub fn effective_use_text_edges(&self) -> bool {
        self.use_text_edges.unwrap_or(true)
    }

    pub fn effective_text_edge_min_sim(&self) -> f64 {
        self.text_edge_min_sim.unwrap_or(0.35)
    }

    pub fn effective_text_edge_multiplier(&self) -> f64 {
        self.text_edge_multiplier.unwrap_or(8.0)
    }

    pub fn effective_allow_dup_names(&self) -> bool {
        self.allow_dup_names.unwrap_or(true)
    }

    pub fn effective_unit_edge_weight(&self) -> u32 {
        self.unit_edge_weight.unwrap_or(512)
    }

    pub fn effective_use_all(&self) -> bool {
        self.use_all.unwrap_or(true)
    }

    pub fn effective_cut_eps(&self) -> f64 {
        self.cut_eps.unwrap_or(0.5)
    }

    /// 24 when similarity edges are in play, 16 when the run is pure-dependency.
    pub fn effective_max_weight(&self) -> u32 {
        self.max_weight.unwrap_or(if self.effective_use_text_edges() {
            24
        } else {
            16
        })
    }

    pub fn effective_solver_time_limit_secs(&self) -> u64 {
        self.solver_time_limit_secs.unwrap_or(30)
    }

    pub fn effective_lookback(&self) -> usize {
        self.lookback.unwrap_or(1)
    }
}
