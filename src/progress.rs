//! Progress-callback trait for per-page scan and per-segment split events.
//!
//! Inject an [`Arc<dyn SplitProgressCallback>`] via
//! [`crate::config::SplitConfigBuilder::progress_callback`] to hear about
//! each page as the detector finishes it and each segment as it is written.
//! Scanning a few hundred pages takes a while; callers report "N of M"
//! rather than blocking silently.
//!
//! # Example
//!
//! ```rust
//! use edgequake_pdfsplit::{SplitProgressCallback, SplitConfig};
//! use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};
//!
//! struct CountingCallback {
//!     scanned: AtomicUsize,
//! }
//!
//! impl SplitProgressCallback for CountingCallback {
//!     fn on_page_scanned(&self, page_num: usize, total_pages: usize, is_candidate: bool) {
//!         self.scanned.fetch_add(1, Ordering::SeqCst);
//!         eprintln!("Page {}/{} scanned (candidate: {})", page_num, total_pages, is_candidate);
//!     }
//! }
//!
//! let counter = Arc::new(CountingCallback { scanned: AtomicUsize::new(0) });
//!
//! let config = SplitConfig::builder()
//!     .progress_callback(counter as Arc<dyn SplitProgressCallback>)
//!     .build()
//!     .unwrap();
//! ```

use std::path::Path;
use std::sync::Arc;

/// Called by the scan loop and the segmentation engine.
///
/// All methods have default no-op implementations so callers only override
/// what they care about. The core runs sequentially, but the trait is
/// `Send + Sync` so the same callback can be moved into a blocking task.
pub trait SplitProgressCallback: Send + Sync {
    /// Called once before the first page is rendered.
    fn on_scan_start(&self, total_pages: usize) {
        let _ = total_pages;
    }

    /// Called after a page has been rendered and analysed.
    ///
    /// # Arguments
    /// * `page_num`    : 1-indexed page number
    /// * `total_pages` : total pages in the document
    /// * `is_candidate`: whether the detector flagged the page
    fn on_page_scanned(&self, page_num: usize, total_pages: usize, is_candidate: bool) {
        let _ = (page_num, total_pages, is_candidate);
    }

    /// Called when a page could not be rendered and a placeholder was used.
    fn on_page_error(&self, page_num: usize, total_pages: usize, error: &str) {
        let _ = (page_num, total_pages, error);
    }

    /// Called once after every page has been attempted.
    fn on_scan_complete(&self, total_pages: usize, candidate_count: usize) {
        let _ = (total_pages, candidate_count);
    }

    /// Called once before the first segment is materialised.
    fn on_split_start(&self, total_segments: usize) {
        let _ = total_segments;
    }

    /// Called when a segment has been written to its final path.
    ///
    /// `segment_num` is 1-indexed in emission order.
    fn on_segment_written(&self, segment_num: usize, total_segments: usize, path: &Path) {
        let _ = (segment_num, total_segments, path);
    }

    /// Called when a segment was skipped after a failure.
    fn on_segment_error(&self, segment_num: usize, total_segments: usize, error: &str) {
        let _ = (segment_num, total_segments, error);
    }

    /// Called once after every segment has been attempted.
    fn on_split_complete(&self, total_segments: usize, written: usize) {
        let _ = (total_segments, written);
    }
}

/// A no-op implementation for callers that don't need progress events.
pub struct NoopProgressCallback;

impl SplitProgressCallback for NoopProgressCallback {}

/// Convenience alias matching the type stored in [`crate::config::SplitConfig`].
pub type ProgressCallback = Arc<dyn SplitProgressCallback>;
