//! Fixed constants referenced by more than one crate.

/// k for the recursive bisection solver calls; the driver always splits in two.
pub const BISECTION_K: usize = 2;

/// Default English stop words applied after stemming when the caller doesn't
/// supply its own set.
pub const DEFAULT_STOP_WORDS: &[&str] =
    &["m", "get", "set", "on", "by", "for", "as", "is", "and", "in", "has"];
