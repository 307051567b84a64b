//! The query façade: free-text search over one catalog snapshot.
//!
//! Two paths. The fast path answers purely from the exact-name map when
//! it alone satisfies `limit` — it deliberately skips fuzzy scoring of
//! other equally relevant terms, an accepted precision trade-off. The
//! full path walks the inverted index in deterministic term order,
//! expands matching terms to candidate resources, scores each resource
//! once, and stops collecting once `limit * OVERSCAN` candidates are
//! scored to bound work on large catalogs.

use crate::catalog::Catalog;
use crate::matcher;
use crate::ranker::{self, SearchHit, UsageLookup};
use crate::resource::Resource;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::debug;

/// Keyword and index-term contributions are discounted against direct
/// name/display-name matches.
const KEYWORD_WEIGHT: f64 = 0.8;

/// The full path stops collecting new candidates at `limit * OVERSCAN`.
const OVERSCAN: usize = 3;

/// Search the snapshot, returning at most `limit` hits ordered by the
/// shared ranking contract. Empty or whitespace queries return nothing.
pub fn search(
    catalog: &Catalog,
    usage: &dyn UsageLookup,
    query: &str,
    limit: usize,
) -> Vec<SearchHit> {
    let query = query.trim().to_lowercase();
    if query.is_empty() || limit == 0 {
        return Vec::new();
    }

    // Fast path: exact-name hits alone satisfy the limit.
    if let Some(ids) = catalog.exact_name_matches(&query) {
        if ids.len() >= limit {
            debug!(query = %query, hits = ids.len(), "Exact fast path");
            let mut hits: Vec<SearchHit> = ids
                .iter()
                .filter_map(|id| catalog.get(id))
                .filter_map(|resource| {
                    hit(resource, matcher::EXACT_SCORE, usage)
                })
                .collect();
            ranker::sort_hits(&mut hits);
            hits.truncate(limit);
            return hits;
        }
    }

    // Full path: walk index terms in deterministic order.
    let cap = limit.saturating_mul(OVERSCAN);
    let mut scored: HashMap<&str, f64> = HashMap::new();

    'terms: for (term, ids) in catalog.terms() {
        let term_score = matcher::match_score(&query, term);
        if term_score == 0.0 {
            continue;
        }
        for id in ids {
            if scored.contains_key(id.as_str()) {
                continue;
            }
            let Some(resource) = catalog.get(id) else {
                continue;
            };
            let best = resource_score(&query, resource, term_score);
            if best > 0.0 {
                scored.insert(resource.id.as_str(), best);
                if scored.len() >= cap {
                    debug!(query = %query, cap, "Over-collection cap reached");
                    break 'terms;
                }
            }
        }
    }

    let mut hits: Vec<SearchHit> = scored
        .into_iter()
        .filter_map(|(id, match_score)| {
            let resource = catalog.get(id)?;
            hit(resource, match_score, usage)
        })
        .collect();

    ranker::sort_hits(&mut hits);
    hits.truncate(limit);
    hits
}

/// Per-resource match score: the best of the direct name/display-name
/// match, the discounted best keyword match, and the discounted score of
/// the index term that surfaced the candidate (which carries description
/// words and prefix expansions).
fn resource_score(query: &str, resource: &Arc<Resource>, term_score: f64) -> f64 {
    let name_score = matcher::match_best(
        query,
        [resource.name.as_str(), resource.display_name.as_str()].into_iter(),
    );
    // An exact name match is already the score ceiling.
    if name_score == matcher::EXACT_SCORE {
        return name_score;
    }

    let keyword_score = resource
        .keywords
        .iter()
        .map(|kw| matcher::match_score(query, kw))
        .fold(0.0f64, f64::max);

    name_score
        .max(keyword_score * KEYWORD_WEIGHT)
        .max(term_score * KEYWORD_WEIGHT)
}

fn hit(resource: &Arc<Resource>, match_score: f64, usage: &dyn UsageLookup) -> Option<SearchHit> {
    let raw_usage = usage.usage_score(&resource.id);
    let score = ranker::combine(match_score, raw_usage)?;
    Some(SearchHit {
        resource: Arc::clone(resource),
        score,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ranker::NoUsage;
    use crate::resource::ResourceDescriptor;
    use std::path::PathBuf;

    fn descriptor(id: &str, name: &str) -> ResourceDescriptor {
        ResourceDescriptor {
            id: id.to_string(),
            name: name.to_string(),
            display_name: name.to_string(),
            location: PathBuf::from(format!("/Applications/{name}.app")),
            last_modified: 0,
            description: None,
            categories: Vec::new(),
            keywords: Vec::new(),
        }
    }

    fn sample_catalog() -> Catalog {
        Catalog::build(vec![
            descriptor("com.apple.safari", "Safari"),
            descriptor("com.apple.terminal", "Terminal"),
            descriptor("com.apple.notes", "Notes"),
        ])
    }

    #[test]
    fn empty_query_returns_nothing() {
        let catalog = sample_catalog();
        assert!(search(&catalog, &NoUsage, "", 5).is_empty());
        assert!(search(&catalog, &NoUsage, "   ", 5).is_empty());
    }

    #[test]
    fn zero_limit_returns_nothing() {
        let catalog = sample_catalog();
        assert!(search(&catalog, &NoUsage, "safari", 0).is_empty());
    }

    #[test]
    fn prefix_query_finds_the_obvious_winner() {
        let catalog = sample_catalog();

        let hits = search(&catalog, &NoUsage, "safa", 5);
        assert_eq!(hits[0].resource.name, "Safari");
        assert!(hits[0].score >= 0.95 * ranker::MATCH_WEIGHT);

        let hits = search(&catalog, &NoUsage, "term", 5);
        assert_eq!(hits[0].resource.name, "Terminal");
    }

    #[test]
    fn nonsense_query_returns_empty() {
        let catalog = sample_catalog();
        assert!(search(&catalog, &NoUsage, "zzz-nonexistent", 5).is_empty());
    }

    #[test]
    fn exact_name_query_ranks_exact_first() {
        let catalog = sample_catalog();
        let hits = search(&catalog, &NoUsage, "Notes", 5);
        assert_eq!(hits[0].resource.name, "Notes");
        // Exact match, zero usage: 1.0 * 0.6
        assert!((hits[0].score - ranker::MATCH_WEIGHT).abs() < 1e-9);
    }

    #[test]
    fn usage_breaks_ties_between_equal_matches() {
        let catalog = Catalog::build(vec![
            descriptor("com.a.notes", "Notes Classic"),
            descriptor("com.b.notes", "Notes Modern"),
        ]);
        let mut usage = HashMap::new();
        usage.insert("com.b.notes".to_string(), 100.0);

        // Both are prefix matches of "notes "; higher usage ranks first.
        let hits = search(&catalog, &usage, "notes", 5);
        assert_eq!(hits[0].resource.id, "com.b.notes");
        assert_eq!(hits[1].resource.id, "com.a.notes");
    }

    #[test]
    fn keyword_matches_are_discounted() {
        let mut with_kw = descriptor("com.x.editor", "Zedit");
        with_kw.keywords = vec!["terminal".to_string()];
        let catalog = Catalog::build(vec![with_kw, descriptor("com.apple.terminal", "Terminal")]);

        let hits = search(&catalog, &NoUsage, "terminal", 5);
        assert_eq!(hits.len(), 2);
        assert_eq!(
            hits[0].resource.id, "com.apple.terminal",
            "direct name match outranks keyword match"
        );
    }

    #[test]
    fn description_words_surface_resources() {
        let mut desc = descriptor("com.x.mail", "Postbox");
        desc.description = Some("Email client for busy people".to_string());
        let catalog = Catalog::build(vec![desc]);

        let hits = search(&catalog, &NoUsage, "email", 5);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].resource.id, "com.x.mail");
    }

    #[test]
    fn results_are_limit_truncated() {
        let descriptors: Vec<_> = (0..20)
            .map(|i| descriptor(&format!("com.x.note{i}"), &format!("Note{i}")))
            .collect();
        let catalog = Catalog::build(descriptors);
        let hits = search(&catalog, &NoUsage, "note", 3);
        assert_eq!(hits.len(), 3);
    }

    #[test]
    fn search_is_deterministic() {
        let descriptors: Vec<_> = (0..50)
            .map(|i| descriptor(&format!("com.x.app{i}"), &format!("App{i}")))
            .collect();
        let catalog = Catalog::build(descriptors);
        let first: Vec<String> = search(&catalog, &NoUsage, "app", 10)
            .into_iter()
            .map(|h| h.resource.id.clone())
            .collect();
        for _ in 0..3 {
            let again: Vec<String> = search(&catalog, &NoUsage, "app", 10)
                .into_iter()
                .map(|h| h.resource.id.clone())
                .collect();
            assert_eq!(first, again);
        }
    }

    #[test]
    fn same_named_resources_keep_a_stable_order() {
        let descriptors: Vec<_> = (0..10)
            .map(|i| descriptor(&format!("id{i}"), "Notes"))
            .collect();
        let catalog = Catalog::build(descriptors);

        // All ten tie on both score and display name; the order must
        // still be reproducible within one process.
        let first: Vec<String> = search(&catalog, &NoUsage, "note", 10)
            .into_iter()
            .map(|h| h.resource.id.clone())
            .collect();
        assert_eq!(first.len(), 10);
        for _ in 0..5 {
            let again: Vec<String> = search(&catalog, &NoUsage, "note", 10)
                .into_iter()
                .map(|h| h.resource.id.clone())
                .collect();
            assert_eq!(first, again);
        }
    }

    #[test]
    fn fast_path_skips_fuzzy_competitors_when_limit_satisfied() {
        // Accepted trade-off: with limit 1 and an exact-name hit, the
        // near-identical fuzzy competitor is never scored.
        let catalog = Catalog::build(vec![
            descriptor("com.x.exact", "Mail"),
            descriptor("com.x.fuzzy", "Mails"),
        ]);
        let hits = search(&catalog, &NoUsage, "mail", 1);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].resource.id, "com.x.exact");
    }
}
