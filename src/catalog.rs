//! The searchable catalog snapshot.
//!
//! A [`Catalog`] is built once from the complete descriptor set of one
//! scan pass, then never mutated: the discovery coordinator swaps whole
//! snapshots and in-flight readers keep the one they hold. The builder
//! dedupes by id, derives keyword sets, and constructs the inverted
//! index including a length-capped prefix expansion so short queries hit
//! the index without running the matcher.

use crate::resource::{Resource, ResourceDescriptor};
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::Arc;
use tracing::debug;

/// Only index prefixes at least this long.
const PREFIX_MIN: usize = 3;

/// Never index prefixes longer than this.
const PREFIX_MAX: usize = 6;

/// Terms longer than this get no prefix expansion, bounding index growth
/// on arbitrary user data.
const PREFIX_TERM_CAP: usize = 8;

/// How many leading description words become keywords/index terms.
const DESCRIPTION_WORD_LIMIT: usize = 5;

/// Description words must be longer than this to qualify.
const MEANINGFUL_WORD_LEN: usize = 2;

/// Identifier segments too generic to be useful search terms.
const GENERIC_ID_SEGMENTS: &[&str] = &["com", "org", "net", "io", "www", "app", "apps"];

/// Category metadata to keyword expansion. Categories arrive as the last
/// dot-separated component of platform category strings (e.g.
/// "public.app-category.developer-tools" -> "developer-tools").
const CATEGORY_KEYWORDS: &[(&str, &[&str])] = &[
    ("developer-tools", &["developer", "code", "programming"]),
    ("productivity", &["productivity", "work", "office"]),
    ("utilities", &["utility", "tool", "system"]),
    ("graphics-design", &["graphics", "design", "image"]),
    ("photography", &["photo", "image", "camera"]),
    ("music", &["music", "audio", "sound"]),
    ("video", &["video", "movie", "media"]),
    ("social-networking", &["social", "chat", "messaging"]),
    ("games", &["game", "play"]),
    ("education", &["education", "learning"]),
    ("finance", &["finance", "money", "banking"]),
    ("browsers", &["browser", "web", "internet"]),
    ("news", &["news", "reading"]),
    ("reference", &["reference", "documentation"]),
];

/// Immutable snapshot of all known resources plus derived search indexes.
pub struct Catalog {
    /// id -> resource.
    resources: HashMap<String, Arc<Resource>>,
    /// term -> ids. Ordered map so full-path search iterates terms in a
    /// deterministic order (search results must be reproducible for a
    /// fixed snapshot).
    index: BTreeMap<String, BTreeSet<String>>,
    /// Lowercased name/display name -> ids, for the exact fast path.
    exact_names: HashMap<String, BTreeSet<String>>,
}

impl Catalog {
    /// An empty snapshot, served until the first scan completes.
    pub fn empty() -> Self {
        Catalog {
            resources: HashMap::new(),
            index: BTreeMap::new(),
            exact_names: HashMap::new(),
        }
    }

    /// Build a snapshot from one scan pass's descriptors.
    /// Duplicate ids are resolved last-writer-wins.
    pub fn build(descriptors: Vec<ResourceDescriptor>) -> Self {
        let mut resources: HashMap<String, Arc<Resource>> = HashMap::new();

        for desc in descriptors {
            let keywords = derive_keywords(&desc);
            let resource = Resource {
                id: desc.id.clone(),
                name: desc.name,
                display_name: desc.display_name,
                location: desc.location,
                last_modified: desc.last_modified,
                description: desc.description,
                keywords,
            };
            if resources.insert(desc.id, Arc::new(resource)).is_some() {
                debug!("Duplicate resource id, keeping last writer");
            }
        }

        let mut index: BTreeMap<String, BTreeSet<String>> = BTreeMap::new();
        let mut exact_names: HashMap<String, BTreeSet<String>> = HashMap::new();

        for resource in resources.values() {
            let name = resource.name.to_lowercase();
            let display = resource.display_name.to_lowercase();

            for key in [&name, &display] {
                if !key.is_empty() {
                    exact_names
                        .entry(key.clone())
                        .or_default()
                        .insert(resource.id.clone());
                }
            }

            let mut terms: BTreeSet<String> = BTreeSet::new();
            terms.insert(name);
            terms.insert(display);
            terms.extend(resource.keywords.iter().cloned());

            for term in terms {
                if term.is_empty() {
                    continue;
                }
                index_term(&mut index, &term, &resource.id);
            }
        }

        debug!(
            resources = resources.len(),
            terms = index.len(),
            "Built catalog snapshot"
        );

        Catalog {
            resources,
            index,
            exact_names,
        }
    }

    pub fn get(&self, id: &str) -> Option<&Arc<Resource>> {
        self.resources.get(id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.resources.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.resources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// All resource ids, unordered.
    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.resources.keys().map(String::as_str)
    }

    /// Inverted-index entries in deterministic (lexical) term order.
    pub fn terms(&self) -> impl Iterator<Item = (&str, &BTreeSet<String>)> {
        self.index.iter().map(|(t, ids)| (t.as_str(), ids))
    }

    /// Ids whose name or display name equals `query_lower` exactly.
    pub fn exact_name_matches(&self, query_lower: &str) -> Option<&BTreeSet<String>> {
        self.exact_names.get(query_lower)
    }
}

/// Insert a term plus its capped prefix expansion into the index.
fn index_term(index: &mut BTreeMap<String, BTreeSet<String>>, term: &str, id: &str) {
    index
        .entry(term.to_string())
        .or_default()
        .insert(id.to_string());

    let chars: Vec<char> = term.chars().collect();
    let len = chars.len();
    if len <= PREFIX_MIN || len > PREFIX_TERM_CAP {
        return;
    }
    let max = PREFIX_MAX.min(len - 1);
    for plen in PREFIX_MIN..=max {
        let prefix: String = chars[..plen].iter().collect();
        index.entry(prefix).or_default().insert(id.to_string());
    }
}

/// Derive the searchable keyword set for one descriptor: manifest
/// keywords, name tokens, identifier components (minus generic segments),
/// category expansion, and the leading meaningful description words.
/// Deduplicated, lowercase, no empty strings.
fn derive_keywords(desc: &ResourceDescriptor) -> Vec<String> {
    let mut set: BTreeSet<String> = BTreeSet::new();

    for kw in &desc.keywords {
        push_keyword(&mut set, kw);
    }

    for token in tokenize(&desc.name) {
        push_keyword(&mut set, &token);
    }
    for token in tokenize(&desc.display_name) {
        push_keyword(&mut set, &token);
    }

    // Reverse-domain identifier components, e.g. "com.apple.Safari"
    for segment in desc.id.split(['.', '/']) {
        let segment = segment.trim().to_lowercase();
        if segment.len() > MEANINGFUL_WORD_LEN
            && !GENERIC_ID_SEGMENTS.contains(&segment.as_str())
        {
            push_keyword(&mut set, &segment);
        }
    }

    for category in &desc.categories {
        let tail = category.rsplit('.').next().unwrap_or(category);
        if let Some((_, expansions)) = CATEGORY_KEYWORDS
            .iter()
            .find(|(name, _)| *name == tail.to_lowercase())
        {
            for kw in *expansions {
                push_keyword(&mut set, kw);
            }
        }
        // The raw category tail is itself searchable
        push_keyword(&mut set, tail);
    }

    if let Some(ref description) = desc.description {
        for word in description
            .split_whitespace()
            .filter(|w| w.chars().filter(|c| c.is_alphanumeric()).count() > MEANINGFUL_WORD_LEN)
            .take(DESCRIPTION_WORD_LIMIT)
        {
            let cleaned: String = word
                .chars()
                .filter(|c| c.is_alphanumeric())
                .collect::<String>()
                .to_lowercase();
            push_keyword(&mut set, &cleaned);
        }
    }

    set.into_iter().collect()
}

fn push_keyword(set: &mut BTreeSet<String>, raw: &str) {
    let kw = raw.trim().to_lowercase();
    if !kw.is_empty() {
        set.insert(kw);
    }
}

/// Split a name into lowercase word tokens ("Visual Studio Code" ->
/// ["visual", "studio", "code"]).
fn tokenize(name: &str) -> Vec<String> {
    name.split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| t.to_lowercase())
        .collect()
}
