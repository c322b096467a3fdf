//! One document's scan-and-split state.
//!
//! A [`SplitSession`] owns the open source, the page renderer (and with it
//! the thumbnail cache), the boundary detector and the two split-point sets:
//!
//! * **suggested**: filled by [`SplitSession::scan`], replaced on every scan
//! * **selected**: edited by the caller, handed to [`SplitSession::split`]
//!
//! The sets are independent until the caller copies one into the other with
//! [`SplitSession::use_suggested`]. A session is not shared between threads;
//! callers that need that must serialise access themselves.

use crate::config::SplitConfig;
use crate::error::{PageError, PdfSplitError};
use crate::output::{DocumentInfo, ScanReport, SplitOutcome};
use crate::pipeline::detect::BoundaryDetector;
use crate::pipeline::render::{PageRasterizer, PageRenderer, RenderedPage};
use crate::pipeline::segment::{SegmentBackend, SegmentationEngine};
use crate::progress::{NoopProgressCallback, ProgressCallback};
use std::collections::BTreeSet;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

pub struct SplitSession<S> {
    source: S,
    renderer: PageRenderer,
    detector: BoundaryDetector,
    engine: SegmentationEngine,
    suggested: BTreeSet<usize>,
    selected: BTreeSet<usize>,
}

impl<S> SplitSession<S>
where
    S: PageRasterizer + SegmentBackend,
{
    pub fn new(source: S, config: SplitConfig) -> Self {
        let page_count = PageRasterizer::page_count(&source);
        Self {
            renderer: PageRenderer::new(&config, page_count),
            detector: BoundaryDetector::new(config.detector.clone()),
            engine: SegmentationEngine::new(config),
            source,
            suggested: BTreeSet::new(),
            selected: BTreeSet::new(),
        }
    }

    /// Bind the name the document was uploaded under; used for output names
    /// when [`split`](Self::split) is not given one.
    pub fn with_original_filename(mut self, name: impl Into<String>) -> Self {
        self.engine.bind_filename(name);
        self
    }

    pub fn original_filename(&self) -> Option<&str> {
        self.engine.bound_filename()
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn page_count(&self) -> usize {
        PageRasterizer::page_count(&self.source)
    }

    pub fn is_memory_optimized(&self) -> bool {
        self.renderer.is_memory_optimized()
    }

    /// Page count, size and the policies they trigger. Renders nothing.
    pub fn document_info(&self) -> DocumentInfo {
        let config = self.engine.config();
        let page_count = self.page_count();
        let byte_len = self.source.source_len();
        DocumentInfo {
            path: self.source.source_path().to_path_buf(),
            page_count,
            byte_len,
            memory_optimized: config.is_memory_optimized(page_count),
            large: config.is_large_file(byte_len),
        }
    }

    /// Render one page for display. Unrenderable pages come back as a
    /// placeholder with [`RenderedPage::error`] set.
    pub fn thumbnail(&mut self, page_index: usize, zoom: f32) -> Result<RenderedPage, PdfSplitError> {
        self.renderer.render(&self.source, page_index, zoom)
    }

    pub fn cache_len(&self) -> usize {
        self.renderer.cache_len()
    }

    /// Run the detector over every page at the configured default zoom and
    /// replace the suggested split points.
    pub fn scan(&mut self) -> Result<ScanReport, PdfSplitError> {
        let zoom = self.engine.config().default_zoom;
        self.scan_with_zoom(zoom)
    }

    /// [`scan`](Self::scan) at an explicit zoom.
    ///
    /// A flagged page at 0-based index `i` ends a document, so it suggests
    /// split point `i + 2`. The last page suggests nothing.
    pub fn scan_with_zoom(&mut self, zoom: f32) -> Result<ScanReport, PdfSplitError> {
        let total = self.page_count();
        let callback: ProgressCallback = self
            .engine
            .config()
            .progress_callback
            .clone()
            .unwrap_or_else(|| Arc::new(NoopProgressCallback));

        info!("Scanning {} pages", total);
        callback.on_scan_start(total);

        let mut report = ScanReport {
            total_pages: total,
            ..ScanReport::default()
        };
        let mut suggested = BTreeSet::new();

        for page_index in 0..total {
            let page = self.renderer.render(&self.source, page_index, zoom)?;

            let failure = match page.error {
                Some(e) => Some(e),
                None => match self.detector.is_boundary_candidate(&page.image) {
                    Ok(true) => {
                        report.candidates.push(page_index);
                        if page_index + 2 <= total {
                            suggested.insert(page_index + 2);
                        }
                        None
                    }
                    Ok(false) => None,
                    Err(e) => {
                        warn!("Page {} could not be analysed: {}", page_index + 1, e);
                        Some(PageError::RenderFailed {
                            page: page_index + 1,
                            detail: e.to_string(),
                        })
                    }
                },
            };

            if let Some(err) = failure {
                callback.on_page_error(page_index + 1, total, &err.to_string());
                report.failed_pages.push(err);
            }
            callback.on_page_scanned(
                page_index + 1,
                total,
                report.candidates.last() == Some(&page_index),
            );
        }

        report.suggested_splits = suggested.iter().copied().collect();
        self.suggested = suggested;

        callback.on_scan_complete(total, report.candidates.len());
        info!("{}", report.summary());
        Ok(report)
    }

    pub fn suggested(&self) -> &BTreeSet<usize> {
        &self.suggested
    }

    pub fn selected(&self) -> &BTreeSet<usize> {
        &self.selected
    }

    fn check_point(&self, page: usize) -> Result<(), PdfSplitError> {
        let total = self.page_count();
        if page < 2 || page > total {
            return Err(PdfSplitError::InvalidSplitPoint { page, total });
        }
        Ok(())
    }

    /// Add a split point. Returns `false` if it was already selected.
    pub fn select(&mut self, page: usize) -> Result<bool, PdfSplitError> {
        self.check_point(page)?;
        Ok(self.selected.insert(page))
    }

    /// Remove a split point. Returns `false` if it was not selected.
    pub fn deselect(&mut self, page: usize) -> bool {
        self.selected.remove(&page)
    }

    /// Flip a split point. Returns whether it is selected afterwards.
    pub fn toggle(&mut self, page: usize) -> Result<bool, PdfSplitError> {
        self.check_point(page)?;
        if self.selected.remove(&page) {
            Ok(false)
        } else {
            self.selected.insert(page);
            Ok(true)
        }
    }

    /// Replace the selection with the detector's suggestions.
    pub fn use_suggested(&mut self) {
        self.selected = self.suggested.clone();
    }

    pub fn reset_selection(&mut self) {
        self.selected.clear();
    }

    /// Split at the selected points into `output_dir`.
    ///
    /// An empty selection writes nothing and returns an empty outcome.
    pub fn split(
        &self,
        output_dir: &Path,
        original_filename: Option<&str>,
    ) -> Result<SplitOutcome, PdfSplitError> {
        let points: Vec<usize> = self.selected.iter().copied().collect();
        self.engine
            .split(&self.source, &points, output_dir, original_filename)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{DynamicImage, RgbImage};
    use std::ops::Range;
    use std::path::PathBuf;

    struct BlankDoc {
        pages: usize,
        path: PathBuf,
    }

    impl PageRasterizer for BlankDoc {
        fn page_count(&self) -> usize {
            self.pages
        }
        fn rasterize(&self, _page: usize, _zoom: f32) -> Result<DynamicImage, String> {
            Ok(DynamicImage::ImageRgb8(RgbImage::from_pixel(
                60,
                80,
                image::Rgb([255, 255, 255]),
            )))
        }
    }

    impl SegmentBackend for BlankDoc {
        type Output = Vec<usize>;
        fn page_count(&self) -> usize {
            self.pages
        }
        fn source_len(&self) -> u64 {
            1024
        }
        fn source_path(&self) -> &Path {
            &self.path
        }
        fn create_output(&self) -> Result<Self::Output, String> {
            Ok(Vec::new())
        }
        fn copy_pages(&self, out: &mut Self::Output, pages: Range<usize>) -> Result<(), String> {
            out.extend(pages);
            Ok(())
        }
        fn save(&self, _out: Self::Output, path: &Path) -> Result<(), String> {
            std::fs::write(path, b"%PDF").map_err(|e| e.to_string())
        }
    }

    fn session(pages: usize) -> SplitSession<BlankDoc> {
        SplitSession::new(
            BlankDoc {
                pages,
                path: PathBuf::from("/tmp/upload.pdf"),
            },
            SplitConfig::default(),
        )
    }

    #[test]
    fn selection_editing() {
        let mut s = session(10);
        assert!(s.select(3).unwrap());
        assert!(!s.select(3).unwrap());
        assert!(s.toggle(7).unwrap());
        assert!(!s.toggle(3).unwrap());
        assert_eq!(s.selected().iter().copied().collect::<Vec<_>>(), vec![7]);
        assert!(s.deselect(7));
        assert!(!s.deselect(7));
        assert!(s.selected().is_empty());
    }

    #[test]
    fn selection_is_range_checked() {
        let mut s = session(5);
        assert!(matches!(
            s.select(1),
            Err(PdfSplitError::InvalidSplitPoint { page: 1, total: 5 })
        ));
        assert!(s.toggle(6).is_err());
        assert!(s.select(5).is_ok());
    }

    #[test]
    fn blank_scan_suggests_nothing() {
        let mut s = session(4);
        let report = s.scan().unwrap();
        assert_eq!(report.total_pages, 4);
        assert!(report.candidates.is_empty());
        assert!(s.suggested().is_empty());
    }

    #[test]
    fn use_suggested_and_reset() {
        let mut s = session(6);
        s.suggested.extend([3, 5]);
        s.select(2).unwrap();
        s.use_suggested();
        assert_eq!(s.selected(), s.suggested());
        s.reset_selection();
        assert!(s.selected().is_empty());
        assert_eq!(s.suggested().len(), 2);
    }

    #[test]
    fn document_info_reflects_thresholds() {
        let s = session(150);
        let info = s.document_info();
        assert_eq!(info.page_count, 150);
        assert!(info.memory_optimized);
        assert!(!info.large);
        assert_eq!(info.path, PathBuf::from("/tmp/upload.pdf"));
    }
}
