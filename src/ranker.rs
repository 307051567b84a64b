//! Score fusion and result ordering.
//!
//! Fuses a normalized match score with an externally tracked usage
//! frequency into one ranking value. This is the shared contract every
//! result-producing domain honors so heterogeneous result sets merge
//! into a single ordered list: same fusion weights, same exclusion rule,
//! same tie-break.

use crate::resource::Resource;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Arc;

/// Weight of the textual match score in the fused ranking value.
pub const MATCH_WEIGHT: f64 = 0.6;

/// Weight of the normalized usage score in the fused ranking value.
pub const USAGE_WEIGHT: f64 = 0.4;

/// Raw usage counts at or above this normalize to the 1.0 cap (sqrt(100)/10).
const USAGE_SATURATION: f64 = 10.0;

/// Read-only usage frequency lookup, owned by a collaborator outside the
/// engine (e.g. a frecency store). The engine consumes it at ranking time
/// and never records or decays anything itself.
pub trait UsageLookup: Send + Sync {
    /// Raw frequency count for a resource id; `0.0` when unknown.
    fn usage_score(&self, id: &str) -> f64;
}

/// No usage signal at all; ranking degenerates to pure text relevance.
pub struct NoUsage;

impl UsageLookup for NoUsage {
    fn usage_score(&self, _id: &str) -> f64 {
        0.0
    }
}

impl UsageLookup for HashMap<String, f64> {
    fn usage_score(&self, id: &str) -> f64 {
        self.get(id).copied().unwrap_or(0.0)
    }
}

/// One ranked search result: the resource plus its fused score.
#[derive(Debug, Clone)]
pub struct SearchHit {
    pub resource: Arc<Resource>,
    /// Fused match/usage score; see [`combine`].
    pub score: f64,
}

/// Compress a raw frequency count into `[0, 1]`.
///
/// Square root damping keeps heavy use from dominating text relevance;
/// negative inputs (decayed scores that undershot) clamp to zero.
pub fn normalized_usage(raw: f64) -> f64 {
    (raw.max(0.0).sqrt() / USAGE_SATURATION).min(1.0)
}

/// Fuse a match score with a raw usage count.
///
/// Returns `None` when `match_score == 0.0`: usage alone never surfaces
/// a non-matching item.
pub fn combine(match_score: f64, raw_usage: f64) -> Option<f64> {
    if match_score == 0.0 {
        return None;
    }
    Some(match_score * MATCH_WEIGHT + normalized_usage(raw_usage) * USAGE_WEIGHT)
}

/// Comparator implementing the shared sort contract: descending by fused
/// score, ties broken by case-insensitive display name ascending, then by
/// resource id so equal-named hits keep a reproducible order.
pub fn compare_hits(a: &SearchHit, b: &SearchHit) -> Ordering {
    match b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal) {
        Ordering::Equal => a
            .resource
            .display_name
            .to_lowercase()
            .cmp(&b.resource.display_name.to_lowercase())
            .then_with(|| a.resource.id.cmp(&b.resource.id)),
        other => other,
    }
}

/// Sort hits in place under the shared contract.
pub fn sort_hits(hits: &mut [SearchHit]) {
    hits.sort_by(compare_hits);
}
