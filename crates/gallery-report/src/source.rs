//! Collaborator seams: item records and images.
//!
//! The engine never talks to the remote store directly. Callers hand in an
//! [`ItemSource`] for full records and an [`ImageLoader`] for pictures.

use std::collections::{BTreeSet, HashMap};
use std::future::Future;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use gallery_tags::{AuthorId, FullItem, ItemId, ItemSummary, Tag, TagCategory, TagId};
use serde::{Deserialize, Serialize};

use crate::error::{AssetError, SourceError};

/// A decoded raster image.
pub type DecodedImage = image::DynamicImage;

/// Batched access to full item records.
pub trait ItemSource {
    /// Fetch the records for `ids` in one call. Unknown ids are left out.
    fn fetch_full(&self, ids: &[ItemId]) -> impl Future<Output = Result<Vec<FullItem>, SourceError>>;
}

/// Fetches and decodes one image.
pub trait ImageLoader {
    fn load(&self, url: &str) -> impl Future<Output = Result<DecodedImage, AssetError>>;
}

/// One catalog record as stored in a JSON export.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogRecord {
    pub id: ItemId,
    pub name: String,
    #[serde(default)]
    pub tag_ids: BTreeSet<TagId>,
    pub author_id: AuthorId,
    #[serde(default)]
    pub author_name: Option<String>,
    pub image_url: String,
    pub created_at: DateTime<Utc>,
}

impl CatalogRecord {
    pub fn summary(&self) -> ItemSummary {
        ItemSummary {
            id: self.id.clone(),
            name: self.name.clone(),
            tag_ids: self.tag_ids.clone(),
            author_id: self.author_id.clone(),
            created_at: self.created_at,
        }
    }

    pub fn full(&self) -> FullItem {
        FullItem {
            id: self.id.clone(),
            name: self.name.clone(),
            tag_ids: self.tag_ids.clone(),
            author_id: self.author_id.clone(),
            author_name: self.author_name.clone(),
            image_url: self.image_url.clone(),
        }
    }
}

/// A whole gallery export: definitions plus records.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogFile {
    pub categories: Vec<TagCategory>,
    pub tags: Vec<Tag>,
    pub items: Vec<CatalogRecord>,
}

/// Item source backed by a JSON catalog file.
#[derive(Debug, Clone)]
pub struct JsonCatalogSource {
    catalog: CatalogFile,
    by_id: HashMap<ItemId, usize>,
    base_dir: PathBuf,
}

impl JsonCatalogSource {
    /// Read and parse a catalog file.
    pub async fn open(path: &Path) -> Result<Self, SourceError> {
        let content = tokio::fs::read_to_string(path).await?;
        let catalog: CatalogFile = serde_json::from_str(&content)?;
        let base_dir = path.parent().map(Path::to_path_buf).unwrap_or_default();
        tracing::info!(items = catalog.items.len(), tags = catalog.tags.len(), "Loaded catalog from {:?}", path);
        Ok(Self::from_catalog(catalog, base_dir))
    }

    pub fn from_catalog(catalog: CatalogFile, base_dir: PathBuf) -> Self {
        let by_id = catalog
            .items
            .iter()
            .enumerate()
            .map(|(i, r)| (r.id.clone(), i))
            .collect();
        Self {
            catalog,
            by_id,
            base_dir,
        }
    }

    /// Directory relative image paths resolve against.
    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Lightweight summaries for the whole catalog.
    pub fn summaries(&self) -> Vec<ItemSummary> {
        self.catalog.items.iter().map(CatalogRecord::summary).collect()
    }

    pub fn catalog(&self) -> &CatalogFile {
        &self.catalog
    }
}

impl ItemSource for JsonCatalogSource {
    async fn fetch_full(&self, ids: &[ItemId]) -> Result<Vec<FullItem>, SourceError> {
        Ok(ids
            .iter()
            .filter_map(|id| self.by_id.get(id))
            .map(|&i| self.catalog.items[i].full())
            .collect())
    }
}

/// Image loader for local files.
#[derive(Debug, Clone, Default)]
pub struct FsImageLoader {
    base_dir: PathBuf,
}

impl FsImageLoader {
    /// Relative paths resolve against `base_dir`.
    pub fn new(base_dir: impl Into<PathBuf>) -> Self {
        Self {
            base_dir: base_dir.into(),
        }
    }

    fn resolve(&self, url: &str) -> PathBuf {
        let path = Path::new(url.strip_prefix("file://").unwrap_or(url));
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.base_dir.join(path)
        }
    }
}

impl ImageLoader for FsImageLoader {
    async fn load(&self, url: &str) -> Result<DecodedImage, AssetError> {
        let bytes = tokio::fs::read(self.resolve(url)).await?;
        Ok(image::load_from_memory(&bytes)?)
    }
}

#[cfg(feature = "http")]
pub use http::HttpImageLoader;

#[cfg(feature = "http")]
mod http {
    use reqwest::Client;

    use super::{DecodedImage, ImageLoader};
    use crate::error::AssetError;

    /// Image loader for remote object storage.
    #[derive(Debug, Clone)]
    pub struct HttpImageLoader {
        client: Client,
    }

    impl HttpImageLoader {
        pub fn new(user_agent: &str) -> Result<Self, AssetError> {
            let client = Client::builder()
                .user_agent(user_agent)
                .build()
                .map_err(|e| AssetError::Fetch(e.to_string()))?;
            Ok(Self { client })
        }
    }

    impl ImageLoader for HttpImageLoader {
        async fn load(&self, url: &str) -> Result<DecodedImage, AssetError> {
            let response = self
                .client
                .get(url)
                .send()
                .await
                .and_then(|r| r.error_for_status())
                .map_err(|e| AssetError::Fetch(e.to_string()))?;
            let bytes = response
                .bytes()
                .await
                .map_err(|e| AssetError::Fetch(e.to_string()))?;
            Ok(image::load_from_memory(&bytes)?)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn catalog() -> CatalogFile {
        serde_json::from_str(
            r#"{
                "categories": [{"id": "type", "name": "Type", "order": 1}],
                "tags": [{"id": "built", "name": "Built", "categoryId": "type"}],
                "items": [
                    {"id": "a", "name": "A", "tagIds": ["built"], "authorId": "u1",
                     "authorName": "Ana", "imageUrl": "a.png", "createdAt": "2024-01-01T00:00:00Z"},
                    {"id": "b", "name": "B", "authorId": "u2",
                     "imageUrl": "b.png", "createdAt": "2024-01-02T00:00:00Z"}
                ]
            }"#,
        )
        .unwrap()
    }

    #[tokio::test]
    async fn fetch_full_keeps_request_order() {
        let source = JsonCatalogSource::from_catalog(catalog(), PathBuf::new());
        let ids = vec!["b".to_string(), "missing".to_string(), "a".to_string()];
        let records = source.fetch_full(&ids).await.unwrap();
        let got: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
        assert_eq!(got, vec!["b", "a"]);
        assert_eq!(records[1].author_name.as_deref(), Some("Ana"));
    }

    #[test]
    fn summaries_cover_catalog() {
        let source = JsonCatalogSource::from_catalog(catalog(), PathBuf::new());
        let summaries = source.summaries();
        assert_eq!(summaries.len(), 2);
        assert!(summaries[0].tag_ids.contains("built"));
    }

    #[tokio::test]
    async fn fs_loader_decodes_png() {
        let dir = tempfile::tempdir().unwrap();
        let img = image::RgbImage::from_pixel(4, 3, image::Rgb([10, 20, 30]));
        img.save(dir.path().join("pic.png")).unwrap();

        let loader = FsImageLoader::new(dir.path());
        let decoded = loader.load("pic.png").await.unwrap();
        assert_eq!((decoded.width(), decoded.height()), (4, 3));
    }

    #[tokio::test]
    async fn fs_loader_missing_file_is_fetch_error() {
        let loader = FsImageLoader::new("/nonexistent");
        let err = loader.load("nope.png").await.unwrap_err();
        assert!(matches!(err, AssetError::Fetch(_)));
    }

    #[tokio::test]
    async fn fs_loader_garbage_is_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("bad.png"), b"not an image").unwrap();
        let err = FsImageLoader::new(dir.path()).load("bad.png").await.unwrap_err();
        assert!(matches!(err, AssetError::Decode(_)));
    }
}
