//! Tag suggestions for the filter search box.
//!
//! Ranking: available > prefix match > lower level > tag order > name.

use crate::cascade::FilterResult;
use crate::catalog::TagCatalog;
use crate::normalize::{normalize_query, normalize_text};
use crate::tag::{Tag, TagId};

/// A suggested tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Suggestion {
    pub tag_id: TagId,
    pub name: String,
    pub level: u32,
    /// Whether choosing it can still return items.
    pub available: bool,
}

/// Suggestion engine over a tag catalog.
pub struct TagSuggester<'a> {
    catalog: &'a TagCatalog,
    folded: Vec<(&'a Tag, u32, String)>,
}

impl<'a> TagSuggester<'a> {
    /// Create a suggester. Tags without a loaded category are skipped.
    pub fn new(catalog: &'a TagCatalog) -> Self {
        let folded = catalog
            .levels()
            .flat_map(move |(level, category_ids)| {
                category_ids
                    .iter()
                    .flat_map(move |c| catalog.tags_in(c).into_iter().map(move |t| (t, level)))
            })
            .map(|(t, level)| (t, level, normalize_text(&t.name)))
            .collect();
        Self { catalog, folded }
    }

    /// Find tags whose folded name contains the prefix.
    pub fn suggest(&self, prefix: &str, result: Option<&FilterResult>, limit: usize) -> Vec<Suggestion> {
        let Some(query) = normalize_query(prefix) else {
            return Vec::new();
        };

        let mut ranked: Vec<(bool, &Tag, u32, bool)> = self
            .folded
            .iter()
            .filter(|(_, _, name)| name.contains(&query))
            .map(|(tag, level, name)| {
                let available = result.map_or(true, |r| r.is_available(*level, &tag.id));
                (name.starts_with(&query), *tag, *level, available)
            })
            .collect();

        ranked.sort_by(|a, b| {
            b.3.cmp(&a.3)
                .then_with(|| b.0.cmp(&a.0))
                .then_with(|| a.2.cmp(&b.2))
                .then_with(|| a.1.order.cmp(&b.1.order))
                .then_with(|| a.1.name.cmp(&b.1.name))
        });

        ranked
            .into_iter()
            .take(limit)
            .map(|(_, tag, level, available)| Suggestion {
                tag_id: tag.id.clone(),
                name: tag.name.clone(),
                level,
                available,
            })
            .collect()
    }

    pub fn catalog(&self) -> &TagCatalog {
        self.catalog
    }
}
