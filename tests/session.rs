//! Scan → edit → split through a session over an in-memory document.

mod common;

use common::{file_names, read_pages, FakeDoc, Recorder};
use edgequake_pdfsplit::{PageError, PdfSplitError, SplitConfig, SplitSession};
use std::sync::atomic::Ordering;
use std::sync::Arc;

#[test]
fn scan_maps_ending_pages_to_following_split_points() {
    let doc = FakeDoc::new(6).with_endings([1, 3, 5]);
    let mut session = SplitSession::new(doc, SplitConfig::default());

    let report = session.scan().unwrap();

    assert_eq!(report.candidates, vec![1, 3, 5]);
    // Page index 5 is the last page: its boundary is implicit.
    assert_eq!(report.suggested_splits, vec![3, 5]);
    assert_eq!(session.suggested().iter().copied().collect::<Vec<_>>(), vec![3, 5]);
    assert!(session.selected().is_empty());
}

#[test]
fn broken_pages_become_placeholders_and_scan_continues() {
    let recorder = Arc::new(Recorder::default());
    let config = SplitConfig::builder()
        .progress_callback(recorder.clone())
        .build()
        .unwrap();
    let doc = FakeDoc::new(50).with_broken([12, 40]).with_endings([20]);
    let mut session = SplitSession::new(doc, config);

    let report = session.scan().unwrap();

    assert_eq!(report.summary(), "processed 48/50 pages, 2 skipped, 1 candidates");
    assert_eq!(report.candidates, vec![20]);
    assert!(matches!(
        &report.failed_pages[0],
        PageError::RenderFailed { page: 13, .. }
    ));
    assert_eq!(report.failed_pages[1].page(), 41);

    assert_eq!(recorder.scanned.load(Ordering::SeqCst), 50);
    assert_eq!(recorder.page_errors.load(Ordering::SeqCst), 2);
    assert_eq!(recorder.candidates.load(Ordering::SeqCst), 1);
    assert_eq!(
        *recorder.events.lock().unwrap(),
        vec!["scan_start:50".to_string(), "scan_complete:50:1".to_string()]
    );
}

#[test]
fn thumbnail_of_broken_page_is_placeholder() {
    let doc = FakeDoc::new(3).with_broken([1]);
    let mut session = SplitSession::new(doc, SplitConfig::default());

    let page = session.thumbnail(1, 0.5).unwrap();

    assert!(page.is_placeholder());
    assert_eq!((page.image.width(), page.image.height()), (100, 150));
}

#[test]
fn thumbnail_out_of_range_is_an_error() {
    let mut session = SplitSession::new(FakeDoc::new(3), SplitConfig::default());
    assert!(matches!(
        session.thumbnail(3, 0.5),
        Err(PdfSplitError::PageOutOfRange { index: 3, total: 3 })
    ));
}

#[test]
fn large_document_cache_stays_bounded() {
    let doc = FakeDoc::new(120);
    let mut session = SplitSession::new(doc, SplitConfig::default());
    assert!(session.is_memory_optimized());

    session.scan().unwrap();
    assert_eq!(session.cache_len(), 50);

    // Early pages were evicted and re-render; recent ones come from cache.
    let before = session.source().renders.get();
    session.thumbnail(119, 0.5).unwrap();
    assert_eq!(session.source().renders.get(), before);
    session.thumbnail(0, 0.5).unwrap();
    assert_eq!(session.source().renders.get(), before + 1);
    assert_eq!(session.cache_len(), 50);
}

#[test]
fn small_document_is_not_cached() {
    let mut session = SplitSession::new(FakeDoc::new(10), SplitConfig::default());
    assert!(!session.is_memory_optimized());
    session.scan().unwrap();
    assert_eq!(session.cache_len(), 0);
}

#[test]
fn rescanning_replaces_suggestions_only() {
    let mut session = SplitSession::new(FakeDoc::new(8).with_endings([2]), SplitConfig::default());
    session.select(6).unwrap();

    session.scan().unwrap();
    session.scan().unwrap();

    assert_eq!(session.suggested().iter().copied().collect::<Vec<_>>(), vec![4]);
    assert_eq!(session.selected().iter().copied().collect::<Vec<_>>(), vec![6]);
}

#[test]
fn scan_edit_split_round() {
    let dir = tempfile::tempdir().unwrap();
    let doc = FakeDoc::new(10).with_endings([2, 6]);
    let mut session =
        SplitSession::new(doc, SplitConfig::default()).with_original_filename("Protocolo.pdf");

    session.scan().unwrap();
    session.use_suggested();
    // Reviewer disagrees with the second suggestion and adds another.
    assert!(!session.toggle(8).unwrap());
    assert!(session.toggle(9).unwrap());

    let outcome = session.split(dir.path(), None).unwrap();

    assert_eq!(
        file_names(dir.path()),
        vec!["Protocolo-1-3.pdf", "Protocolo-4-8.pdf", "Protocolo-9-10.pdf"]
    );
    assert_eq!(read_pages(&outcome.outputs[1].path), vec![3, 4, 5, 6, 7]);
}

#[test]
fn split_with_empty_selection_is_a_no_op() {
    let dir = tempfile::tempdir().unwrap();
    let session = SplitSession::new(FakeDoc::new(4), SplitConfig::default());
    let outcome = session.split(dir.path(), None).unwrap();
    assert!(outcome.outputs.is_empty());
    assert!(file_names(dir.path()).is_empty());
}
