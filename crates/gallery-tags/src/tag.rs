//! Core tag and category types.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A tag identifier as issued by the remote store.
pub type TagId = String;

/// A category identifier as issued by the remote store.
pub type CategoryId = String;

/// A tag attached to gallery items.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Tag {
    pub id: TagId,
    pub name: String,
    pub category_id: CategoryId,
    /// Position inside the category. Meant to be unique per category but
    /// not enforced; see [`crate::TagCatalog::order_collisions`].
    #[serde(default)]
    pub order: i32,
}

impl Tag {
    /// Create a tag in a category.
    pub fn new(id: impl Into<TagId>, name: impl Into<String>, category_id: impl Into<CategoryId>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            category_id: category_id.into(),
            order: 0,
        }
    }

    /// Builder method to set the in-category order.
    pub fn with_order(mut self, order: i32) -> Self {
        self.order = order;
        self
    }
}

/// A tag category. Its `order` is the cascade level (1 = first).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TagCategory {
    pub id: CategoryId,
    pub name: String,
    pub order: u32,
    #[serde(default)]
    pub is_required: bool,
    /// Categories that share this category's "required" obligation.
    #[serde(default)]
    pub peer_category_ids: BTreeSet<CategoryId>,
}

impl TagCategory {
    /// Create an optional category at a level.
    pub fn new(id: impl Into<CategoryId>, name: impl Into<String>, order: u32) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            order,
            is_required: false,
            peer_category_ids: BTreeSet::new(),
        }
    }

    /// Builder method to mark the category as required.
    pub fn required(mut self) -> Self {
        self.is_required = true;
        self
    }

    /// Builder method to add a peer category.
    pub fn with_peer(mut self, peer: impl Into<CategoryId>) -> Self {
        self.peer_category_ids.insert(peer.into());
        self
    }
}
