//! In-memory collaborators that count their calls

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};

use gallery_report::{AssetError, DecodedImage, ImageLoader, ItemSource, SourceError};
use gallery_tags::{FullItem, ItemId, Tag, TagCatalog, TagCategory};

/// Item source that builds a record for every requested id.
#[derive(Default)]
pub struct CountingSource {
    fetch_calls: AtomicUsize,
}

impl CountingSource {
    pub fn fetch_calls(&self) -> usize {
        self.fetch_calls.load(Ordering::SeqCst)
    }
}

impl ItemSource for CountingSource {
    async fn fetch_full(&self, ids: &[ItemId]) -> Result<Vec<FullItem>, SourceError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        Ok(ids.iter().map(|id| full_item(id)).collect())
    }
}

pub fn full_item(id: &str) -> FullItem {
    FullItem {
        id: id.to_string(),
        name: format!("Item {}", id),
        tag_ids: ["built".to_string()].into_iter().collect(),
        author_id: "ana".to_string(),
        author_name: Some("Ana".to_string()),
        image_url: format!("https://cdn.example/{}.jpg", id),
    }
}

/// Image loader that fails for a fixed set of urls.
#[derive(Default)]
pub struct CountingLoader {
    unreachable: HashSet<String>,
    load_calls: AtomicUsize,
}

impl CountingLoader {
    pub fn failing(urls: &[&str]) -> Self {
        Self {
            unreachable: urls.iter().map(|u| u.to_string()).collect(),
            ..Default::default()
        }
    }

    pub fn load_calls(&self) -> usize {
        self.load_calls.load(Ordering::SeqCst)
    }
}

impl ImageLoader for CountingLoader {
    async fn load(&self, url: &str) -> Result<DecodedImage, AssetError> {
        self.load_calls.fetch_add(1, Ordering::SeqCst);
        if self.unreachable.contains(url) {
            return Err(AssetError::Fetch(format!("{} unreachable", url)));
        }
        Ok(DecodedImage::new_rgb8(64, 48))
    }
}

pub fn catalog() -> TagCatalog {
    TagCatalog::new(
        vec![Tag::new("built", "Built", "type")],
        vec![TagCategory::new("type", "Type", 1)],
    )
}

pub fn ids(n: usize) -> Vec<ItemId> {
    (0..n).map(|i| format!("item-{:02}", i)).collect()
}
