//! Export job orchestration.
//!
//! A job runs in fixed steps: intersect the selection with the filtered
//! result and check the item ceiling, load the masks, re-check the ceiling,
//! preload records and images, compose, name the file. Validation failures
//! are reported before any fetch. Any other failure resets progress and
//! reports a generic alert; no partial document is returned.
//!
//! Jobs cannot be cancelled and carry no timeout: once [`Exporter::run`] is
//! awaited it runs to completion, and a hung fetch stalls the whole job.

use std::collections::HashSet;

use chrono::Utc;
use gallery_tags::{ItemId, TagCatalog};

use crate::alert::{Alert, AlertReporter, Severity};
use crate::compose::{compose, Masks};
use crate::config::ReportConfig;
use crate::error::{ReportError, Result};
use crate::filename::report_filename;
use crate::preload::preload;
use crate::progress::{ProgressTracker, DONE};
use crate::source::{ImageLoader, ItemSource};

/// Validated list of items to export, in filter order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportJob {
    item_ids: Vec<ItemId>,
    item_limit: usize,
}

impl ReportJob {
    /// Keep the filtered ids that are also selected, in filter order.
    ///
    /// Selected ids that are not currently visible are dropped. Fails with
    /// `SelectionEmpty` when nothing remains and `LimitExceeded` when more
    /// than `limit` items remain.
    pub fn prepare(filtered_ids: &[ItemId], selected: &HashSet<ItemId>, limit: usize) -> Result<Self> {
        let item_ids: Vec<ItemId> = filtered_ids
            .iter()
            .filter(|id| selected.contains(*id))
            .cloned()
            .collect();

        if item_ids.is_empty() {
            return Err(ReportError::SelectionEmpty);
        }
        if item_ids.len() > limit {
            return Err(ReportError::LimitExceeded {
                limit,
                actual: item_ids.len(),
            });
        }
        Ok(Self {
            item_ids,
            item_limit: limit,
        })
    }

    pub fn item_ids(&self) -> &[ItemId] {
        &self.item_ids
    }

    pub fn item_limit(&self) -> usize {
        self.item_limit
    }

    pub fn len(&self) -> usize {
        self.item_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.item_ids.is_empty()
    }
}

/// A finished export, ready for preview, download or sharing.
#[derive(Debug, Clone)]
pub struct ReportArtifact {
    /// PDF bytes.
    pub document: Vec<u8>,
    pub filename: String,
    pub page_count: usize,
    /// Items whose image was replaced by the placeholder.
    pub placeholders: usize,
}

/// Runs export jobs against a set of collaborators.
pub struct Exporter<'a, S, L> {
    source: &'a S,
    loader: &'a L,
    catalog: &'a TagCatalog,
    config: &'a ReportConfig,
    reporter: &'a dyn AlertReporter,
    progress: ProgressTracker,
}

impl<'a, S, L> Exporter<'a, S, L>
where
    S: ItemSource,
    L: ImageLoader,
{
    pub fn new(
        source: &'a S,
        loader: &'a L,
        catalog: &'a TagCatalog,
        config: &'a ReportConfig,
        reporter: &'a dyn AlertReporter,
    ) -> Self {
        Self {
            source,
            loader,
            catalog,
            config,
            reporter,
            progress: ProgressTracker::new(),
        }
    }

    /// Report progress through `progress` instead of a private tracker.
    pub fn with_progress(mut self, progress: ProgressTracker) -> Self {
        self.progress = progress;
        self
    }

    pub fn progress(&self) -> &ProgressTracker {
        &self.progress
    }

    /// Validate the selection against the filtered result, then run the job.
    pub async fn export(&self, filtered_ids: &[ItemId], selected: &HashSet<ItemId>) -> Result<ReportArtifact> {
        let job = match ReportJob::prepare(filtered_ids, selected, self.config.item_limit) {
            Ok(job) => job,
            Err(e) => {
                tracing::info!("Export rejected: {}", e);
                self.reporter.report(e.to_alert());
                return Err(e);
            }
        };
        self.run(&job).await
    }

    /// Run a prepared job and report the outcome.
    pub async fn run(&self, job: &ReportJob) -> Result<ReportArtifact> {
        tracing::info!(items = job.len(), limit = job.item_limit(), "Starting report export");
        self.progress.reset();
        match self.generate(job).await {
            Ok(artifact) => {
                self.progress.advance(DONE);
                tracing::info!(
                    pages = artifact.page_count,
                    bytes = artifact.document.len(),
                    placeholders = artifact.placeholders,
                    "Report ready: {}",
                    artifact.filename
                );
                self.reporter.report(success_alert(&artifact));
                Ok(artifact)
            }
            Err(e) => {
                self.progress.reset();
                match &e {
                    ReportError::JobFailure(_) => tracing::error!("Report export failed: {}", e),
                    _ => tracing::info!("Export rejected: {}", e),
                }
                self.reporter.report(e.to_alert());
                Err(e)
            }
        }
    }

    async fn generate(&self, job: &ReportJob) -> Result<ReportArtifact> {
        let limit = job.item_limit().min(self.config.item_limit);
        if job.len() > limit {
            return Err(ReportError::LimitExceeded {
                limit,
                actual: job.len(),
            });
        }

        let masks = Masks::load(
            self.loader,
            self.config.header_mask.as_deref(),
            self.config.footer_mask.as_deref(),
        )
        .await;

        let preloaded = preload(
            job.item_ids(),
            self.source,
            self.loader,
            self.config.concurrency,
            &self.progress,
        )
        .await?;
        if preloaded.items.is_empty() {
            return Err(ReportError::JobFailure(
                "none of the selected item records could be fetched".to_string(),
            ));
        }

        let composed = compose(&preloaded, self.catalog, &masks, self.config, &self.progress)?;

        Ok(ReportArtifact {
            document: composed.document,
            filename: report_filename(&self.config.filename_prefix, Utc::now()),
            page_count: composed.page_count,
            placeholders: composed.placeholders,
        })
    }
}

fn success_alert(artifact: &ReportArtifact) -> Alert {
    let pages = if artifact.page_count == 1 { "page" } else { "pages" };
    let mut message = format!("{} ({} {}) is ready.", artifact.filename, artifact.page_count, pages);
    if artifact.placeholders > 0 {
        message.push_str(&format!(
            " {} image(s) could not be loaded and were left blank.",
            artifact.placeholders
        ));
    }
    Alert::new("Report generated", message, Severity::Success)
}
