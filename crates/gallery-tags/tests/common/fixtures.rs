//! Shared catalogs and item indexes for integration tests

use chrono::{Duration, TimeZone, Utc};
use gallery_tags::{ItemSummary, Tag, TagCatalog, TagCategory};

/// Build an item summary created `day` days after the epoch of the fixtures.
pub fn item(id: &str, name: &str, tags: &[&str], author: &str, day: i64) -> ItemSummary {
    ItemSummary {
        id: id.to_string(),
        name: name.to_string(),
        tag_ids: tags.iter().map(|t| t.to_string()).collect(),
        author_id: author.to_string(),
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::days(day),
    }
}

/// Two levels: Type (order 1) and Size (order 2).
pub fn type_size_catalog() -> TagCatalog {
    TagCatalog::new(
        vec![
            Tag::new("built", "Built", "type"),
            Tag::new("basic", "Basic", "type"),
            Tag::new("20m2", "20m²", "size"),
            Tag::new("30m2", "30m²", "size"),
        ],
        vec![
            TagCategory::new("type", "Type", 1),
            TagCategory::new("size", "Size", 2),
        ],
    )
}

/// A{Built,20m²}, B{Built,30m²}, C{Basic,20m²}
pub fn type_size_index() -> Vec<ItemSummary> {
    vec![
        item("A", "Casa Azul", &["built", "20m2"], "ana", 1),
        item("B", "Loft Norte", &["built", "30m2"], "bruno", 2),
        item("C", "Estúdio Sul", &["basic", "20m2"], "ana", 3),
    ]
}

/// Three levels with several tags each, for generated indexes.
#[allow(dead_code)]
pub fn three_level_catalog() -> TagCatalog {
    let mut tags = Vec::new();
    let mut categories = Vec::new();
    for (level, category) in ["type", "size", "finish"].iter().enumerate() {
        categories.push(TagCategory::new(*category, category.to_uppercase(), level as u32 + 1));
        for n in 0..4 {
            tags.push(Tag::new(format!("{}-{}", category, n), format!("{} {}", category, n), *category).with_order(n));
        }
    }
    TagCatalog::new(tags, categories)
}

/// All tag ids of [`three_level_catalog`].
#[allow(dead_code)]
pub fn three_level_tag_ids() -> Vec<String> {
    ["type", "size", "finish"]
        .iter()
        .flat_map(|c| (0..4).map(move |n| format!("{}-{}", c, n)))
        .collect()
}
