//! Cross-domain result providers.
//!
//! Resource discovery is one of several result domains a launcher hosts
//! (folders, calendar, math, ...). Every domain implements
//! [`ResultProvider`] and honors the shared scoring contract in
//! [`crate::ranker`] — same fusion weights, same exclusion rule, same
//! tie-break — so [`merge_ranked`] can fold heterogeneous result sets
//! into one ordered list without knowing anything about their internals.

use crate::coordinator::DiscoveryCoordinator;
use crate::ranker::{self, SearchHit, UsageLookup};
use std::sync::Arc;

/// One capability: produce results already scored under the shared
/// contract. Implementations must never emit hits for zero match scores.
pub trait ResultProvider: Send + Sync {
    fn produce_scored_results(&self, query: &str, limit: usize) -> Vec<SearchHit>;
}

/// The discovery engine as a result provider, bound to one usage lookup.
pub struct CatalogProvider {
    coordinator: DiscoveryCoordinator,
    usage: Arc<dyn UsageLookup>,
}

impl CatalogProvider {
    pub fn new(coordinator: DiscoveryCoordinator, usage: Arc<dyn UsageLookup>) -> Self {
        CatalogProvider { coordinator, usage }
    }
}

impl ResultProvider for CatalogProvider {
    fn produce_scored_results(&self, query: &str, limit: usize) -> Vec<SearchHit> {
        self.coordinator.search(query, limit, self.usage.as_ref())
    }
}

/// Merge every provider's results into one list under the shared sort,
/// truncated to `limit`. Each provider is asked for up to `limit` hits.
pub fn merge_ranked(
    providers: &[&dyn ResultProvider],
    query: &str,
    limit: usize,
) -> Vec<SearchHit> {
    let mut merged = Vec::new();
    for provider in providers {
        merged.extend(provider.produce_scored_results(query, limit));
    }
    ranker::sort_hits(&mut merged);
    merged.truncate(limit);
    merged
}
