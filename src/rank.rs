use std::cmp::Ordering;

use crate::models::{RankedResult, ScoredLabel};

/// Highest `n` scores, descending. Equal scores keep their input order.
pub fn top_n(scores: &[ScoredLabel], n: usize) -> RankedResult {
    let mut ranked = scores.to_vec();
    // `sort_by` is stable, which is what gives the tie-break
    ranked.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));
    ranked.truncate(n);
    ranked
}
