//! Export job integration tests

mod common;

use std::collections::HashSet;

use common::fixtures::{catalog, ids, CountingLoader, CountingSource};
use gallery_report::{
    page_count, plan_pages, CollectingReporter, Exporter, PageGeometry, ReportConfig, ReportError, ReportJob,
    Severity, IMAGE_PLACEHOLDER,
};
use gallery_tags::ItemId;
use proptest::prelude::*;

fn occurrences(document: &[u8], needle: &str) -> usize {
    String::from_utf8_lossy(document).matches(needle).count()
}

// === Limit enforcement ===

#[tokio::test]
async fn test_limit_exceeded_makes_no_fetch_or_decode_calls() {
    let source = CountingSource::default();
    let loader = CountingLoader::default();
    let catalog = catalog();
    let config = ReportConfig {
        item_limit: 30,
        ..Default::default()
    };
    let reporter = CollectingReporter::new();
    let exporter = Exporter::new(&source, &loader, &catalog, &config, &reporter);

    let filtered = ids(31);
    let selected: HashSet<ItemId> = filtered.iter().cloned().collect();
    let err = exporter.export(&filtered, &selected).await.unwrap_err();

    assert!(matches!(err, ReportError::LimitExceeded { limit: 30, actual: 31 }));
    assert_eq!(source.fetch_calls(), 0);
    assert_eq!(loader.load_calls(), 0);

    let alerts = reporter.alerts();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].severity, Severity::Warning);
    assert!(alerts[0].message.contains("30") && alerts[0].message.contains("31"));
}

#[tokio::test]
async fn test_exactly_at_limit_is_exported() {
    let source = CountingSource::default();
    let loader = CountingLoader::default();
    let catalog = catalog();
    let config = ReportConfig {
        item_limit: 4,
        ..Default::default()
    };
    let reporter = CollectingReporter::new();
    let exporter = Exporter::new(&source, &loader, &catalog, &config, &reporter);

    let filtered = ids(4);
    let selected: HashSet<ItemId> = filtered.iter().cloned().collect();
    let artifact = exporter.export(&filtered, &selected).await.unwrap();

    assert_eq!(artifact.page_count, 2);
    assert_eq!(source.fetch_calls(), 1);
    assert_eq!(loader.load_calls(), 4);
}

// === Asset failure resilience ===

#[tokio::test]
async fn test_unreachable_image_degrades_to_placeholder() {
    let source = CountingSource::default();
    let loader = CountingLoader::failing(&["https://cdn.example/item-01.jpg"]);
    let catalog = catalog();
    let config = ReportConfig::default();
    let reporter = CollectingReporter::new();
    let exporter = Exporter::new(&source, &loader, &catalog, &config, &reporter);

    let filtered = ids(3);
    let selected: HashSet<ItemId> = filtered.iter().cloned().collect();
    let artifact = exporter.export(&filtered, &selected).await.unwrap();

    assert_eq!(artifact.page_count, 2);
    assert_eq!(artifact.placeholders, 1);
    assert_eq!(occurrences(&artifact.document, "(Item item-0"), 3);
    assert_eq!(occurrences(&artifact.document, IMAGE_PLACEHOLDER), 1);
    assert_eq!(occurrences(&artifact.document, "/Subtype /Image"), 2);

    let alerts = reporter.alerts();
    assert_eq!(alerts.len(), 1);
    assert_eq!(alerts[0].severity, Severity::Success);
}

#[tokio::test]
async fn test_missing_masks_do_not_abort() {
    let source = CountingSource::default();
    let loader = CountingLoader::failing(&["header.png", "footer.png"]);
    let catalog = catalog();
    let config = ReportConfig {
        header_mask: Some("header.png".to_string()),
        footer_mask: Some("footer.png".to_string()),
        ..Default::default()
    };
    let reporter = CollectingReporter::new();
    let exporter = Exporter::new(&source, &loader, &catalog, &config, &reporter);

    let filtered = ids(2);
    let selected: HashSet<ItemId> = filtered.iter().cloned().collect();
    let artifact = exporter.export(&filtered, &selected).await.unwrap();

    assert_eq!(artifact.page_count, 1);
    assert_eq!(occurrences(&artifact.document, "/Mh Do"), 0);
    assert_eq!(loader.load_calls(), 4);
}

// === Selection / filter intersection ===

#[tokio::test]
async fn test_selection_outside_filter_is_ignored() {
    let source = CountingSource::default();
    let loader = CountingLoader::default();
    let catalog = catalog();
    let config = ReportConfig::default();
    let reporter = CollectingReporter::new();
    let exporter = Exporter::new(&source, &loader, &catalog, &config, &reporter);

    let filtered = ids(3);
    let selected: HashSet<ItemId> = ["item-02", "item-00", "elsewhere"].iter().map(|s| s.to_string()).collect();
    let artifact = exporter.export(&filtered, &selected).await.unwrap();

    assert_eq!(artifact.page_count, 1);
    assert_eq!(loader.load_calls(), 2);
    let text = String::from_utf8_lossy(&artifact.document).to_string();
    let first = text.find("(Item item-00)").unwrap();
    let second = text.find("(Item item-02)").unwrap();
    assert!(first < second);
    assert!(!text.contains("(Item item-01)"));
}

#[tokio::test]
async fn test_empty_intersection_is_rejected() {
    let source = CountingSource::default();
    let loader = CountingLoader::default();
    let catalog = catalog();
    let config = ReportConfig::default();
    let reporter = CollectingReporter::new();
    let exporter = Exporter::new(&source, &loader, &catalog, &config, &reporter);

    let selected: HashSet<ItemId> = ["elsewhere".to_string()].into_iter().collect();
    let err = exporter.export(&ids(3), &selected).await.unwrap_err();

    assert!(matches!(err, ReportError::SelectionEmpty));
    assert_eq!(source.fetch_calls(), 0);
    assert_eq!(reporter.alerts()[0].severity, Severity::Warning);
}

proptest! {
    #[test]
    fn job_is_exactly_selection_intersect_filter(
        filtered in prop::collection::vec(0u8..60, 0..40),
        selected in prop::collection::hash_set(0u8..60, 0..40),
    ) {
        let mut seen = HashSet::new();
        let filtered: Vec<ItemId> = filtered
            .into_iter()
            .filter(|n| seen.insert(*n))
            .map(|n| n.to_string())
            .collect();
        let selected: HashSet<ItemId> = selected.into_iter().map(|n| n.to_string()).collect();

        let expected: Vec<ItemId> = filtered.iter().filter(|id| selected.contains(*id)).cloned().collect();
        match ReportJob::prepare(&filtered, &selected, 100) {
            Ok(job) => prop_assert_eq!(job.item_ids(), expected.as_slice()),
            Err(e) => {
                prop_assert!(matches!(e, ReportError::SelectionEmpty));
                prop_assert!(expected.is_empty());
            }
        }
    }

    #[test]
    fn pages_hold_two_items_in_order(n in 0usize..80) {
        let geometry = PageGeometry::new(&ReportConfig::default(), None, None).unwrap();
        let pages = plan_pages(n, &geometry);

        prop_assert_eq!(pages.len(), (n + 1) / 2);
        prop_assert_eq!(page_count(n), pages.len());
        for page in &pages {
            for slot in &page.slots {
                prop_assert_eq!(page.number, slot.item_index / 2 + 1);
                prop_assert_eq!(slot.slot, slot.item_index % 2);
            }
        }
        let placed: Vec<usize> = pages.iter().flat_map(|p| p.slots.iter().map(|s| s.item_index)).collect();
        prop_assert_eq!(placed, (0..n).collect::<Vec<_>>());
    }
}
