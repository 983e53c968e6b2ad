//! Minimum-hop filtering.
//!
//! Two forms over the same rule: structured [`Path`]s are measured by their
//! relation count, rendered strings by their `->` token count (a k-hop path
//! carries 2k arrows). Both preserve input order and are idempotent.

use crate::{PATH_DELIMITER, Path};

/// Hop count the export flow treats as "multi-hop".
pub const MULTI_HOP_MIN: usize = 2;

/// Keep paths with at least `min_hops` relations.
pub fn filter_min_hops(paths: Vec<Path>, min_hops: usize) -> Vec<Path> {
    if min_hops == 0 {
        return paths;
    }
    let before = paths.len();
    let kept: Vec<Path> = paths
        .into_iter()
        .filter(|p| p.hop_count() >= min_hops)
        .collect();
    log::debug!(
        "hop filter (min {min_hops}) kept {} of {before} paths",
        kept.len()
    );
    kept
}

/// Number of `->` delimiters in a rendered path.
pub fn count_arrows(rendered: &str) -> usize {
    rendered.matches(PATH_DELIMITER).count()
}

/// Keep rendered paths carrying at least `min_arrows` delimiters.
pub fn filter_rendered<S: AsRef<str>>(paths: &[S], min_arrows: usize) -> Vec<String> {
    paths
        .iter()
        .map(|p| p.as_ref())
        .filter(|p| count_arrows(p) >= min_arrows)
        .map(str::to_string)
        .collect()
}
