//! In-memory tag catalog with level and category lookups.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::error::{CatalogError, Result};
use crate::tag::{CategoryId, Tag, TagCategory, TagId};

/// Tags sharing an order inside one category.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderCollision {
    pub category_id: CategoryId,
    pub order: i32,
    pub tags: Vec<TagId>,
}

impl From<OrderCollision> for CatalogError {
    fn from(c: OrderCollision) -> Self {
        CatalogError::OrderCollision {
            category_id: c.category_id,
            order: c.order,
            tags: c.tags,
        }
    }
}

/// Fully loaded tag and category definitions.
#[derive(Debug, Clone, Default)]
pub struct TagCatalog {
    tags: HashMap<TagId, Tag>,
    categories: HashMap<CategoryId, TagCategory>,
    /// Tag ids per category, sorted by (order, name).
    by_category: HashMap<CategoryId, Vec<TagId>>,
    /// Category ids per level, sorted by id.
    levels: BTreeMap<u32, Vec<CategoryId>>,
}

impl TagCatalog {
    /// Build a catalog, tolerating order collisions and dangling tags.
    pub fn new(tags: Vec<Tag>, categories: Vec<TagCategory>) -> Self {
        let catalog = Self::build(tags, categories);
        for collision in catalog.order_collisions() {
            tracing::debug!(
                category = %collision.category_id,
                order = collision.order,
                tags = ?collision.tags,
                "tags share an order inside a category"
            );
        }
        for tag in catalog.tags.values() {
            if !catalog.categories.contains_key(&tag.category_id) {
                tracing::warn!(tag = %tag.id, category = %tag.category_id, "tag references unknown category");
            }
        }
        catalog
    }

    /// Build a catalog that enforces `(categoryId, order)` uniqueness and
    /// rejects tags whose category is missing.
    pub fn new_strict(tags: Vec<Tag>, categories: Vec<TagCategory>) -> Result<Self> {
        let catalog = Self::build(tags, categories);

        let mut dangling: Vec<&Tag> = catalog
            .tags
            .values()
            .filter(|t| !catalog.categories.contains_key(&t.category_id))
            .collect();
        dangling.sort_by(|a, b| a.id.cmp(&b.id));
        if let Some(tag) = dangling.first() {
            return Err(CatalogError::UnknownCategory {
                tag_id: tag.id.clone(),
                category_id: tag.category_id.clone(),
            });
        }

        if let Some(collision) = catalog.order_collisions().into_iter().next() {
            return Err(collision.into());
        }
        Ok(catalog)
    }

    fn build(tags: Vec<Tag>, categories: Vec<TagCategory>) -> Self {
        let mut levels: BTreeMap<u32, Vec<CategoryId>> = BTreeMap::new();
        let mut category_map = HashMap::new();
        for category in categories {
            levels.entry(category.order).or_default().push(category.id.clone());
            category_map.insert(category.id.clone(), category);
        }
        for ids in levels.values_mut() {
            ids.sort();
            ids.dedup();
        }

        let mut tag_map = HashMap::new();
        let mut by_category: HashMap<CategoryId, Vec<TagId>> = HashMap::new();
        for tag in tags {
            by_category.entry(tag.category_id.clone()).or_default().push(tag.id.clone());
            tag_map.insert(tag.id.clone(), tag);
        }
        for ids in by_category.values_mut() {
            ids.sort_by(|a, b| {
                let (ta, tb) = (&tag_map[a], &tag_map[b]);
                ta.order.cmp(&tb.order).then_with(|| ta.name.cmp(&tb.name))
            });
            ids.dedup();
        }

        Self {
            tags: tag_map,
            categories: category_map,
            by_category,
            levels,
        }
    }

    /// Get a tag by id.
    pub fn tag(&self, id: &str) -> Option<&Tag> {
        self.tags.get(id)
    }

    /// Get a category by id.
    pub fn category(&self, id: &str) -> Option<&TagCategory> {
        self.categories.get(id)
    }

    /// The category a tag belongs to, if it was loaded.
    pub fn category_of(&self, tag_id: &str) -> Option<&TagCategory> {
        self.tags
            .get(tag_id)
            .and_then(|t| self.categories.get(&t.category_id))
    }

    /// Tags of a category in display order.
    pub fn tags_in(&self, category_id: &str) -> Vec<&Tag> {
        self.by_category
            .get(category_id)
            .map(|ids| ids.iter().filter_map(|id| self.tags.get(id)).collect())
            .unwrap_or_default()
    }

    /// Whether the tag belongs to the category.
    pub fn tag_in_category(&self, tag_id: &str, category_id: &str) -> bool {
        self.tags
            .get(tag_id)
            .is_some_and(|t| t.category_id == category_id)
    }

    /// Levels in ascending order with their category ids.
    pub fn levels(&self) -> impl Iterator<Item = (u32, &[CategoryId])> {
        self.levels.iter().map(|(level, ids)| (*level, ids.as_slice()))
    }

    /// Every set of tags that share an order inside one category.
    pub fn order_collisions(&self) -> Vec<OrderCollision> {
        let mut collisions = Vec::new();
        let mut category_ids: Vec<&CategoryId> = self.by_category.keys().collect();
        category_ids.sort();

        for category_id in category_ids {
            let mut by_order: BTreeMap<i32, Vec<TagId>> = BTreeMap::new();
            for tag in self.tags_in(category_id) {
                by_order.entry(tag.order).or_default().push(tag.id.clone());
            }
            for (order, mut tags) in by_order {
                if tags.len() > 1 {
                    tags.sort();
                    collisions.push(OrderCollision {
                        category_id: category_id.clone(),
                        order,
                        tags,
                    });
                }
            }
        }
        collisions
    }

    /// Required categories whose obligation a tag set leaves unmet.
    ///
    /// An obligation is met by any tag from the category or one of its
    /// peers. A peer group is reported once, through its lowest-level member.
    pub fn missing_required<'a>(
        &self,
        tag_ids: impl IntoIterator<Item = &'a TagId>,
    ) -> Vec<&TagCategory> {
        let present: BTreeSet<&CategoryId> = tag_ids
            .into_iter()
            .filter_map(|id| self.tags.get(id))
            .map(|t| &t.category_id)
            .collect();

        let mut required: Vec<&TagCategory> =
            self.categories.values().filter(|c| c.is_required).collect();
        required.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));

        let mut reported: BTreeSet<&CategoryId> = BTreeSet::new();
        let mut missing = Vec::new();
        for category in required {
            if reported.contains(&category.id) {
                continue;
            }
            let group = self.peer_group(category);
            if group.iter().any(|id| present.contains(id)) {
                continue;
            }
            reported.extend(group);
            missing.push(category);
        }
        missing
    }

    /// A category plus its declared peers and every category declaring it
    /// as a peer.
    fn peer_group<'a>(&'a self, category: &'a TagCategory) -> BTreeSet<&'a CategoryId> {
        let mut group: BTreeSet<&CategoryId> = BTreeSet::new();
        group.insert(&category.id);
        group.extend(category.peer_category_ids.iter());
        group.extend(
            self.categories
                .values()
                .filter(|c| c.peer_category_ids.contains(&category.id))
                .map(|c| &c.id),
        );
        group
    }

    /// Names of the given tags, ordered by category level then tag order.
    pub fn tag_names<'a>(&self, tag_ids: impl IntoIterator<Item = &'a TagId>) -> Vec<&str> {
        let mut tags: Vec<&Tag> = tag_ids.into_iter().filter_map(|id| self.tags.get(id)).collect();
        tags.sort_by_key(|t| {
            let level = self.categories.get(&t.category_id).map_or(u32::MAX, |c| c.order);
            (level, t.order, t.name.clone())
        });
        tags.into_iter().map(|t| t.name.as_str()).collect()
    }

    /// Total number of tags.
    pub fn len(&self) -> usize {
        self.tags.len()
    }

    /// Whether the catalog has no tags.
    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    /// Format as a level/category/tag tree for display.
    pub fn format_tree(&self) -> String {
        let mut output = String::new();
        for (level, category_ids) in self.levels() {
            for category_id in category_ids {
                let Some(category) = self.categories.get(category_id) else {
                    continue;
                };
                let marker = if category.is_required { " *" } else { "" };
                output.push_str(&format!("{}. {}{}\n", level, category.name, marker));

                let tags = self.tags_in(category_id);
                for (i, tag) in tags.iter().enumerate() {
                    let connector = if i == tags.len() - 1 { "└── " } else { "├── " };
                    output.push_str(&format!("   {}{}\n", connector, tag.name));
                }
            }
        }
        output
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_catalog() -> TagCatalog {
        let categories = vec![
            TagCategory::new("type", "Type", 1).required(),
            TagCategory::new("size", "Size", 2),
            TagCategory::new("floor", "Floor", 3).required().with_peer("facade"),
            TagCategory::new("facade", "Facade", 3),
        ];
        let tags = vec![
            Tag::new("built", "Built", "type").with_order(1),
            Tag::new("basic", "Basic", "type").with_order(2),
            Tag::new("20m2", "20m²", "size").with_order(1),
            Tag::new("30m2", "30m²", "size").with_order(1),
            Tag::new("tile", "Tile", "floor"),
            Tag::new("brick", "Brick", "facade"),
        ];
        TagCatalog::new(tags, categories)
    }

    #[test]
    fn levels_ascending() {
        let catalog = sample_catalog();
        let levels: Vec<u32> = catalog.levels().map(|(l, _)| l).collect();
        assert_eq!(levels, vec![1, 2, 3]);
        let third: Vec<&str> = catalog
            .levels()
            .find(|(l, _)| *l == 3)
            .map(|(_, ids)| ids.iter().map(String::as_str).collect())
            .unwrap();
        assert_eq!(third, vec!["facade", "floor"]);
    }

    #[test]
    fn tags_in_display_order() {
        let catalog = sample_catalog();
        let names: Vec<&str> = catalog.tags_in("type").iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, vec!["Built", "Basic"]);
        assert!(catalog.tags_in("missing").is_empty());
    }

    #[test]
    fn detects_order_collisions() {
        let catalog = sample_catalog();
        let collisions = catalog.order_collisions();
        assert_eq!(collisions.len(), 1);
        assert_eq!(collisions[0].category_id, "size");
        assert_eq!(collisions[0].tags, vec!["20m2".to_string(), "30m2".to_string()]);
    }

    #[test]
    fn strict_rejects_collisions() {
        let err = TagCatalog::new_strict(
            vec![
                Tag::new("a", "A", "c").with_order(1),
                Tag::new("b", "B", "c").with_order(1),
            ],
            vec![TagCategory::new("c", "C", 1)],
        )
        .unwrap_err();
        assert!(matches!(err, CatalogError::OrderCollision { order: 1, .. }));
    }

    #[test]
    fn strict_rejects_unknown_category() {
        let err = TagCatalog::new_strict(vec![Tag::new("a", "A", "ghost")], vec![]).unwrap_err();
        assert_eq!(
            err,
            CatalogError::UnknownCategory {
                tag_id: "a".to_string(),
                category_id: "ghost".to_string()
            }
        );
    }

    #[test]
    fn strict_accepts_clean_catalog() {
        let catalog = TagCatalog::new_strict(
            vec![
                Tag::new("a", "A", "c").with_order(1),
                Tag::new("b", "B", "c").with_order(2),
            ],
            vec![TagCategory::new("c", "C", 1)],
        )
        .unwrap();
        assert_eq!(catalog.len(), 2);
    }

    #[test]
    fn missing_required_honours_peers() {
        let catalog = sample_catalog();

        let ids = ["built".to_string(), "brick".to_string()];
        assert!(catalog.missing_required(&ids).is_empty());

        let ids = ["20m2".to_string()];
        let missing: Vec<&str> = catalog
            .missing_required(&ids)
            .iter()
            .map(|c| c.id.as_str())
            .collect();
        assert_eq!(missing, vec!["type", "floor"]);
    }

    #[test]
    fn tag_names_by_level() {
        let catalog = sample_catalog();
        let ids = ["20m2".to_string(), "built".to_string(), "unknown".to_string()];
        assert_eq!(catalog.tag_names(&ids), vec!["Built", "20m²"]);
    }

    #[test]
    fn format_tree() {
        let tree = sample_catalog().format_tree();
        assert!(tree.contains("1. Type *"));
        assert!(tree.contains("└── Basic"));
    }
}
