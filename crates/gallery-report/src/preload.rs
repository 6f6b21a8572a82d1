//! Bounded image preloading.
//!
//! Full records are fetched in one batched call, then images are decoded in
//! sequential batches of `concurrency`: each batch is awaited as a group
//! before the next one starts. A failed image is logged and left out of the
//! result; it never aborts the batch or the job. Progress moves once per
//! batch through the 5..=85 band.

use std::collections::HashMap;

use futures_util::future::join_all;
use gallery_tags::{FullItem, ItemId};

use crate::error::Result;
use crate::progress::{preload_progress, ProgressTracker};
use crate::source::{DecodedImage, ImageLoader, ItemSource};

/// Records and decoded images for a report.
#[derive(Debug, Default)]
pub struct Preloaded {
    /// Records in the order the ids were requested.
    pub items: Vec<FullItem>,
    /// Decoded images by item id. Items whose image failed are absent.
    pub images: HashMap<ItemId, DecodedImage>,
}

impl Preloaded {
    pub fn image(&self, id: &str) -> Option<&DecodedImage> {
        self.images.get(id)
    }

    /// Number of items whose image could not be loaded.
    pub fn missing_images(&self) -> usize {
        self.items.len() - self.images.len()
    }
}

/// Fetch records for `ids` and decode their images, `concurrency` at a time.
pub async fn preload<S, L>(
    ids: &[ItemId],
    source: &S,
    loader: &L,
    concurrency: usize,
    progress: &ProgressTracker,
) -> Result<Preloaded>
where
    S: ItemSource,
    L: ImageLoader,
{
    let concurrency = concurrency.max(1);

    let mut fetched: HashMap<ItemId, FullItem> = source
        .fetch_full(ids)
        .await?
        .into_iter()
        .map(|item| (item.id.clone(), item))
        .collect();
    let items: Vec<FullItem> = ids.iter().filter_map(|id| fetched.remove(id)).collect();
    if items.len() < ids.len() {
        tracing::warn!(requested = ids.len(), found = items.len(), "some item records were not found");
    }

    let total = items.len();
    progress.advance(preload_progress(0, total));

    let mut images = HashMap::with_capacity(total);
    let mut completed = 0;
    for batch in items.chunks(concurrency) {
        let results = join_all(batch.iter().map(|item| async move {
            (item, loader.load(&item.image_url).await)
        }))
        .await;

        for (item, result) in results {
            match result {
                Ok(image) => {
                    images.insert(item.id.clone(), image);
                }
                Err(e) => {
                    tracing::warn!(item = %item.id, url = %item.image_url, "image failed to load: {}", e);
                }
            }
        }

        completed += batch.len();
        progress.advance(preload_progress(completed, total));
        tracing::debug!(completed, total, "preload batch done");
    }

    Ok(Preloaded { items, images })
}
