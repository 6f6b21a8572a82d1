//! Gallery Report CLI
//!
//! Filters a local JSON catalog and exports the selection as a PDF report.

use std::collections::HashSet;
use std::path::PathBuf;

use clap::Parser;
use gallery_report::{Exporter, FsImageLoader, JsonCatalogSource, LogReporter, ProgressTracker, ReportConfig};
use gallery_tags::{CascadeEngine, FilterState, ItemId, SessionSeed, TagCatalog};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "gallery-report", version, about = "Export filtered gallery items as a PDF report")]
struct Args {
    /// JSON catalog with categories, tags and items
    #[arg(long)]
    catalog: PathBuf,

    /// Report config (defaults to .gallery/report.toml, then ~/.gallery/report.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Session seed for the shuffle order
    #[arg(long, allow_negative_numbers = true)]
    seed: Option<i32>,

    /// Free-text search over item names and tag names
    #[arg(long)]
    search: Option<String>,

    /// Tag to select (repeatable)
    #[arg(long = "tag", value_name = "ID")]
    tags: Vec<String>,

    /// Only items registered by this author
    #[arg(long, value_name = "ID")]
    author: Option<String>,

    /// Sort newest first instead of shuffled
    #[arg(long)]
    recent: bool,

    /// Item to export (repeatable); defaults to every visible item
    #[arg(long = "select", value_name = "ID")]
    select: Vec<String>,

    /// Output directory
    #[arg(long, default_value = ".")]
    out: PathBuf,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();

    let config = match &args.config {
        Some(path) => ReportConfig::load(path)?,
        None => ReportConfig::load_standard()?,
    };

    let source = JsonCatalogSource::open(&args.catalog).await?;
    let file = source.catalog();
    let catalog = TagCatalog::new(file.tags.clone(), file.categories.clone());

    let seed = args.seed.map(SessionSeed::from).unwrap_or_else(SessionSeed::generate);
    let engine = CascadeEngine::new(&source.summaries(), catalog, seed);
    tracing::debug!(seed = seed.value(), "session seed");

    let state = args
        .tags
        .iter()
        .fold(FilterState::new(), |state, tag| {
            if state.is_selected(tag) {
                state
            } else {
                state.toggle_tag(tag.clone())
            }
        })
        .with_search_text(args.search.clone().unwrap_or_default())
        .with_author(args.author.clone())
        .with_sort_by_recency(args.recent);
    let result = engine.compute(&state);
    tracing::info!(visible = result.len(), "Filter applied");

    let selected: HashSet<ItemId> = if args.select.is_empty() {
        result.ordered_ids.iter().cloned().collect()
    } else {
        args.select.iter().cloned().collect()
    };

    let loader = FsImageLoader::new(source.base_dir());
    let progress = ProgressTracker::with_observer(|p| tracing::debug!(progress = p, "export progress"));
    let exporter =
        Exporter::new(&source, &loader, engine.catalog(), &config, &LogReporter).with_progress(progress);
    let artifact = exporter.export(&result.ordered_ids, &selected).await?;

    tokio::fs::create_dir_all(&args.out).await?;
    let path = args.out.join(&artifact.filename);
    tokio::fs::write(&path, &artifact.document).await?;
    println!("{}", path.display());

    Ok(())
}
