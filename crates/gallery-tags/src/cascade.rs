//! Cascading facet filter over the shuffled item index.
//!
//! Filtering runs in a fixed sequence:
//!
//! 1. free-text match on the item name or any of its tag names (folded),
//! 2. author match,
//! 3. one narrowing step per category level, ascending.
//!
//! Within a category the selected tags are OR-ed; across categories and
//! levels the steps are AND-ed. Right before a level narrows the working
//! set, the tags of that level still present in the working set are
//! recorded as the level's availability, so a level only ever reflects the
//! narrowing done by the levels above it.
//!
//! Every call recomputes the whole result from scratch.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::catalog::TagCatalog;
use crate::item::{AuthorId, ItemId, ItemSummary};
use crate::normalize::{normalize_query, normalize_text};
use crate::shuffle::{shuffle, SessionSeed};
use crate::tag::TagId;

/// Filter inputs owned by the caller. The engine never mutates it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    pub search_text: String,
    /// Selected tags in selection order, without duplicates.
    pub selected_tag_ids: Vec<TagId>,
    pub author_filter: Option<AuthorId>,
    pub sort_by_recency: bool,
}

impl FilterState {
    /// The initial, empty state.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the free-text query.
    pub fn with_search_text(mut self, text: impl Into<String>) -> Self {
        self.search_text = text.into();
        self
    }

    /// Select the tag, or unselect it if it was already selected.
    pub fn toggle_tag(mut self, tag_id: impl Into<TagId>) -> Self {
        let tag_id = tag_id.into();
        if let Some(pos) = self.selected_tag_ids.iter().position(|t| *t == tag_id) {
            self.selected_tag_ids.remove(pos);
        } else {
            self.selected_tag_ids.push(tag_id);
        }
        self
    }

    /// Restrict to one author, or `None` for everyone.
    pub fn with_author(mut self, author: Option<AuthorId>) -> Self {
        self.author_filter = author;
        self
    }

    /// Sort the result newest first.
    pub fn with_sort_by_recency(mut self, enabled: bool) -> Self {
        self.sort_by_recency = enabled;
        self
    }

    /// Reset to the initial state.
    pub fn cleared(&self) -> Self {
        Self::default()
    }

    pub fn is_selected(&self, tag_id: &str) -> bool {
        self.selected_tag_ids.iter().any(|t| t == tag_id)
    }

    pub fn has_selection(&self) -> bool {
        !self.selected_tag_ids.is_empty()
    }
}

/// Output of one filter computation.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterResult {
    /// Matching items in shuffle order (or newest first).
    pub ordered_ids: Vec<ItemId>,
    /// Tags still reachable at each level given the levels above it.
    pub available_tags_by_level: BTreeMap<u32, BTreeSet<TagId>>,
    /// Tags present on the result. Empty unless a tag is selected.
    pub lineage_tags: BTreeSet<TagId>,
}

impl FilterResult {
    /// Whether a tag can still be chosen at a level.
    pub fn is_available(&self, level: u32, tag_id: &str) -> bool {
        self.available_tags_by_level
            .get(&level)
            .is_some_and(|tags| tags.contains(tag_id))
    }

    /// Whether a tag still matters for the current selection.
    pub fn is_lineage(&self, tag_id: &str) -> bool {
        self.lineage_tags.contains(tag_id)
    }

    pub fn len(&self) -> usize {
        self.ordered_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ordered_ids.is_empty()
    }
}

/// Filter an already-shuffled index.
///
/// Tag names are folded on every call; use [`CascadeEngine`] to fold them
/// once per session.
pub fn compute_filter_result(
    index: &[ItemSummary],
    catalog: &TagCatalog,
    state: &FilterState,
) -> FilterResult {
    let mut folded_tags: HashMap<&str, String> = HashMap::new();
    if normalize_query(&state.search_text).is_some() {
        for item in index {
            for tag_id in &item.tag_ids {
                if let Some(tag) = catalog.tag(tag_id) {
                    folded_tags
                        .entry(tag_id.as_str())
                        .or_insert_with(|| normalize_text(&tag.name));
                }
            }
        }
    }

    cascade(index, catalog, state, |_, item, query| {
        normalize_text(&item.name).contains(query)
            || item
                .tag_ids
                .iter()
                .any(|t| folded_tags.get(t.as_str()).is_some_and(|n| n.contains(query)))
    })
}

fn cascade<F>(index: &[ItemSummary], catalog: &TagCatalog, state: &FilterState, matches_text: F) -> FilterResult
where
    F: Fn(usize, &ItemSummary, &str) -> bool,
{
    let query = normalize_query(&state.search_text);

    let mut working: Vec<&ItemSummary> = index
        .iter()
        .enumerate()
        .filter(|(i, item)| query.as_deref().map_or(true, |q| matches_text(*i, *item, q)))
        .filter(|(_, item)| {
            state
                .author_filter
                .as_ref()
                .map_or(true, |author| item.author_id == *author)
        })
        .map(|(_, item)| item)
        .collect();

    let mut available_tags_by_level = BTreeMap::new();
    for (level, category_ids) in catalog.levels() {
        let snapshot: BTreeSet<TagId> = working
            .iter()
            .flat_map(|item| item.tag_ids.iter())
            .filter(|t| {
                catalog
                    .tag(t)
                    .is_some_and(|tag| category_ids.contains(&tag.category_id))
            })
            .cloned()
            .collect();
        available_tags_by_level.insert(level, snapshot);

        for category_id in category_ids {
            let chosen: Vec<&TagId> = state
                .selected_tag_ids
                .iter()
                .filter(|t| catalog.tag_in_category(t, category_id))
                .collect();
            if !chosen.is_empty() {
                working.retain(|item| item.has_any_tag(chosen.iter().copied()));
            }
        }
    }

    for tag_id in &state.selected_tag_ids {
        if catalog.category_of(tag_id).is_none() {
            tracing::trace!(tag = %tag_id, "selected tag has no category, ignored");
        }
    }

    if state.sort_by_recency {
        working.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    }

    let lineage_tags = if state.has_selection() {
        working
            .iter()
            .flat_map(|item| item.tag_ids.iter().cloned())
            .collect()
    } else {
        BTreeSet::new()
    };

    FilterResult {
        ordered_ids: working.iter().map(|item| item.id.clone()).collect(),
        available_tags_by_level,
        lineage_tags,
    }
}

/// Session-scoped filter engine.
///
/// Shuffles the index once with the session seed and folds item and tag
/// names once, then answers [`CascadeEngine::compute`] per filter change.
#[derive(Debug, Clone)]
pub struct CascadeEngine {
    seed: SessionSeed,
    index: Vec<ItemSummary>,
    positions: HashMap<ItemId, usize>,
    catalog: TagCatalog,
    folded_names: Vec<String>,
    folded_tags: HashMap<TagId, String>,
}

impl CascadeEngine {
    /// Build an engine for one session.
    pub fn new(index: &[ItemSummary], catalog: TagCatalog, seed: SessionSeed) -> Self {
        let index = shuffle(index, seed.value());
        let positions = index
            .iter()
            .enumerate()
            .map(|(i, item)| (item.id.clone(), i))
            .collect();
        let folded_names = index.iter().map(|item| normalize_text(&item.name)).collect();
        let folded_tags = index
            .iter()
            .flat_map(|item| item.tag_ids.iter())
            .filter_map(|id| catalog.tag(id).map(|t| (id.clone(), normalize_text(&t.name))))
            .collect();

        tracing::debug!(items = index.len(), tags = catalog.len(), seed = seed.value(), "cascade engine ready");

        Self {
            seed,
            index,
            positions,
            catalog,
            folded_names,
            folded_tags,
        }
    }

    pub fn seed(&self) -> SessionSeed {
        self.seed
    }

    /// The index in session order.
    pub fn shuffled(&self) -> &[ItemSummary] {
        &self.index
    }

    pub fn catalog(&self) -> &TagCatalog {
        &self.catalog
    }

    /// Look up an item summary by id.
    pub fn item(&self, id: &str) -> Option<&ItemSummary> {
        self.positions.get(id).map(|&i| &self.index[i])
    }

    /// Recompute the filter result for a state.
    pub fn compute(&self, state: &FilterState) -> FilterResult {
        cascade(&self.index, &self.catalog, state, |i, item, query| {
            self.folded_names[i].contains(query)
                || item
                    .tag_ids
                    .iter()
                    .any(|t| self.folded_tags.get(t).is_some_and(|n| n.contains(query)))
        })
    }

    /// One page of a result, for incremental "load more" rendering.
    pub fn page<'a>(&'a self, result: &FilterResult, offset: usize, limit: usize) -> Vec<&'a ItemSummary> {
        result
            .ordered_ids
            .iter()
            .skip(offset)
            .take(limit)
            .filter_map(|id| self.item(id))
            .collect()
    }
}
