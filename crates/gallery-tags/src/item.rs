//! Gallery item records.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::tag::TagId;

/// An item identifier as issued by the remote store.
pub type ItemId = String;

/// An author (registering user) identifier.
pub type AuthorId = String;

/// Lightweight item entry, bulk-fetched for the whole catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemSummary {
    pub id: ItemId,
    pub name: String,
    #[serde(default)]
    pub tag_ids: BTreeSet<TagId>,
    pub author_id: AuthorId,
    pub created_at: DateTime<Utc>,
}

impl ItemSummary {
    /// Whether the item carries any of the given tags.
    pub fn has_any_tag<'a>(&self, tags: impl IntoIterator<Item = &'a TagId>) -> bool {
        tags.into_iter().any(|t| self.tag_ids.contains(t))
    }
}

/// Full item record, fetched only for items that go into a report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FullItem {
    pub id: ItemId,
    pub name: String,
    #[serde(default)]
    pub tag_ids: BTreeSet<TagId>,
    pub author_id: AuthorId,
    #[serde(default)]
    pub author_name: Option<String>,
    pub image_url: String,
}
