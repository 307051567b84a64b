//! Query-to-text relevance scoring.
//!
//! Pure functions: no state, deterministic for identical inputs. Scores
//! are normalized to `[0.0, 1.0]` so they compose with usage fusion in
//! [`crate::ranker`] and compare cleanly across result providers.
//!
//! Score tiers:
//! - exact match (case-insensitive): `1.0`
//! - prefix match: `0.95`
//! - fuzzy match: normalized similarity scaled by `0.85`, rejected below
//!   the `0.3` floor — a fuzzy hit never outranks a prefix hit

/// Score for a case-insensitive exact match.
pub const EXACT_SCORE: f64 = 1.0;

/// Score for a case-insensitive prefix match.
pub const PREFIX_SCORE: f64 = 0.95;

/// Fuzzy scores are capped below prefix/exact quality by this scale.
pub const FUZZY_SCALE: f64 = 0.85;

/// Raw similarity below this is treated as no match at all.
pub const FUZZY_FLOOR: f64 = 0.3;

/// Score `query` against a single text fragment.
///
/// Returns a score in `[0.0, 1.0]`; `0.0` means the candidate should be
/// excluded from results entirely.
pub fn match_score(query: &str, text: &str) -> f64 {
    if query.is_empty() || text.is_empty() {
        return 0.0;
    }

    let query = query.to_lowercase();
    let text = text.to_lowercase();

    if text == query {
        return EXACT_SCORE;
    }
    if text.starts_with(&query) {
        return PREFIX_SCORE;
    }

    scale_raw(strsim::normalized_levenshtein(&query, &text))
}

/// Score `query` against several candidate texts, returning the best score.
///
/// Exact and prefix shortcuts are checked against every candidate before
/// any fuzzy scoring, so a prefix hit on the second candidate beats a
/// strong fuzzy hit on the first.
pub fn match_best<'a, I>(query: &str, candidates: I) -> f64
where
    I: IntoIterator<Item = &'a str>,
{
    if query.is_empty() {
        return 0.0;
    }

    let query = query.to_lowercase();
    let mut best_raw = 0.0f64;
    let mut saw_prefix = false;

    for text in candidates {
        if text.is_empty() {
            continue;
        }
        let text = text.to_lowercase();
        if text == query {
            return EXACT_SCORE;
        }
        if text.starts_with(&query) {
            saw_prefix = true;
            continue;
        }
        best_raw = best_raw.max(strsim::normalized_levenshtein(&query, &text));
    }

    if saw_prefix {
        return PREFIX_SCORE;
    }
    scale_raw(best_raw)
}

/// Apply the acceptance floor and fuzzy cap to a raw similarity in `[0,1]`.
fn scale_raw(raw: f64) -> f64 {
    if raw < FUZZY_FLOOR {
        0.0
    } else {
        raw * FUZZY_SCALE
    }
}
