//! Error types for gallery-tags

use thiserror::Error;

use crate::tag::{CategoryId, TagId};

/// Result type alias for catalog operations
pub type Result<T> = std::result::Result<T, CatalogError>;

/// Errors raised when a catalog is built in strict mode
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    /// Two or more tags share an order inside one category
    #[error("Tags {tags:?} share order {order} in category {category_id}")]
    OrderCollision {
        category_id: CategoryId,
        order: i32,
        tags: Vec<TagId>,
    },

    /// A tag points at a category that was not loaded
    #[error("Tag {tag_id} references unknown category {category_id}")]
    UnknownCategory { tag_id: TagId, category_id: CategoryId },
}
