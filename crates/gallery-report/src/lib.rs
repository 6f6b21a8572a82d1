//! Gallery Report - PDF export for filtered media galleries
//!
//! This crate turns a selection of gallery items into a paginated PDF:
//!
//! - **Job**: Selection ∩ filter intersection, item ceiling checks, orchestration
//! - **Preload**: One batched record fetch, then image decodes in bounded batches
//! - **Layout**: Two items per page between full-width header and footer masks
//! - **Compose**: Title, metadata line and fitted image per slot, page captions
//! - **PDF**: Minimal PDF 1.4 writer with Helvetica text and JPEG images
//! - **Progress**: Monotone 0..=100 counter split into preload and compose bands
//! - **Alert**: Structured user-facing outcomes delivered through a reporter
//! - **Config**: TOML report settings
//!
//! # Pipeline
//!
//! ```text
//! FilterResult ∩ selection → ReportJob → masks → preload → compose → ReportArtifact
//!                                                  5..85     85..100
//! ```

pub mod alert;
pub mod compose;
pub mod config;
pub mod error;
pub mod filename;
pub mod job;
pub mod layout;
pub mod pdf;
pub mod preload;
pub mod progress;
pub mod source;

pub use alert::{Alert, AlertReporter, CollectingReporter, LogReporter, Severity};
pub use compose::{compose, metadata_line, ComposedReport, Masks, IMAGE_PLACEHOLDER};
pub use config::{PageSize, ReportConfig};
pub use error::{AssetError, ConfigError, ReportError, Result, SourceError};
pub use filename::{report_filename, sanitize_prefix};
pub use job::{Exporter, ReportArtifact, ReportJob};
pub use layout::{fit_image, mask_height, page_count, plan_pages, PageGeometry, PagePlan, Rect, SlotPlan};
pub use preload::{preload, Preloaded};
pub use progress::{compose_progress, preload_progress, ProgressTracker};
pub use source::{
    CatalogFile, CatalogRecord, DecodedImage, FsImageLoader, ImageLoader, ItemSource, JsonCatalogSource,
};

#[cfg(feature = "http")]
pub use source::HttpImageLoader;
