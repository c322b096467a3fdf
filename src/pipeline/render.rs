//! Page rasterisation with a bounded thumbnail cache.
//!
//! [`PageRenderer`] sits between the caller and a [`PageRasterizer`] (the
//! pdfium-backed [`crate::pdfium::PdfiumSource`] in production, an in-memory
//! fake in tests). It owns three policies:
//!
//! * **Memory-optimized mode**: documents with more pages than the configured
//!   threshold have their zoom clamped to a ceiling.
//! * **Caching**: in memory-optimized mode successful renders are kept in a
//!   [`RenderCache`] keyed by `(page, zoom)`.
//! * **Best effort**: a page that fails to rasterise yields a blank
//!   placeholder plus a [`PageError`]; it never aborts the scan.

use crate::config::SplitConfig;
use crate::error::{PageError, PdfSplitError};
use crate::pipeline::cache::{CacheKey, RenderCache};
use image::{DynamicImage, Rgb, RgbImage};
use std::sync::Arc;
use tracing::{debug, warn};

/// Anything that can rasterise individual pages.
pub trait PageRasterizer {
    /// Number of pages in the document.
    fn page_count(&self) -> usize;

    /// Render the 0-based page `page_index` scaled by `zoom`.
    ///
    /// Errors are reported as text; the renderer turns them into a
    /// [`PageError`] and a placeholder.
    fn rasterize(&self, page_index: usize, zoom: f32) -> Result<DynamicImage, String>;
}

/// A rendered page as handed to the caller.
#[derive(Debug, Clone)]
pub struct RenderedPage {
    pub page_index: usize,
    /// Zoom actually used after the memory-optimized clamp.
    pub zoom: f32,
    pub image: Arc<DynamicImage>,
    /// Set when `image` is a placeholder for a page that failed to render.
    pub error: Option<PageError>,
}

impl RenderedPage {
    pub fn is_placeholder(&self) -> bool {
        self.error.is_some()
    }
}

/// Renders pages of one document and caches thumbnails.
pub struct PageRenderer {
    cache: RenderCache,
    memory_optimized: bool,
    zoom_ceiling: f32,
    placeholder_width: u32,
    placeholder_height: u32,
}

impl PageRenderer {
    /// Create a renderer for a document with `page_count` pages.
    pub fn new(config: &SplitConfig, page_count: usize) -> Self {
        let memory_optimized = config.is_memory_optimized(page_count);
        if memory_optimized {
            debug!(
                "{} pages > {}: memory-optimized rendering (zoom ≤ {})",
                page_count, config.memory_optimized_page_threshold, config.memory_optimized_zoom_ceiling
            );
        }
        Self {
            cache: RenderCache::new(config.cache_capacity),
            memory_optimized,
            zoom_ceiling: config.memory_optimized_zoom_ceiling,
            placeholder_width: config.placeholder_width,
            placeholder_height: config.placeholder_height,
        }
    }

    pub fn is_memory_optimized(&self) -> bool {
        self.memory_optimized
    }

    /// Zoom that will actually be used for a request of `zoom`.
    pub fn effective_zoom(&self, zoom: f32) -> f32 {
        if self.memory_optimized && zoom > self.zoom_ceiling {
            self.zoom_ceiling
        } else {
            zoom
        }
    }

    /// Render one page.
    ///
    /// # Errors
    /// Only precondition violations: `page_index` outside the document, or a
    /// zoom that is not a positive finite number. Rasterisation failures are
    /// absorbed into a placeholder.
    pub fn render<S: PageRasterizer + ?Sized>(
        &mut self,
        source: &S,
        page_index: usize,
        zoom: f32,
    ) -> Result<RenderedPage, PdfSplitError> {
        let total = source.page_count();
        if page_index >= total {
            return Err(PdfSplitError::PageOutOfRange {
                index: page_index,
                total,
            });
        }
        if !(zoom.is_finite() && zoom > 0.0) {
            return Err(PdfSplitError::InvalidZoom(zoom));
        }

        let zoom = self.effective_zoom(zoom);
        let key = CacheKey::new(page_index, zoom);
        if let Some(image) = self.cache.get(&key) {
            debug!("Cache hit for page {} @ {}", page_index + 1, zoom);
            return Ok(RenderedPage {
                page_index,
                zoom,
                image,
                error: None,
            });
        }

        match source.rasterize(page_index, zoom) {
            Ok(image) => {
                debug!(
                    "Rendered page {} → {}x{} px",
                    page_index + 1,
                    image.width(),
                    image.height()
                );
                let image = Arc::new(image);
                if self.memory_optimized {
                    if let Some(evicted) = self.cache.insert(key, Arc::clone(&image)) {
                        debug!("Evicted page {} from render cache", evicted.page_index + 1);
                    }
                }
                Ok(RenderedPage {
                    page_index,
                    zoom,
                    image,
                    error: None,
                })
            }
            Err(detail) => {
                warn!(
                    "Page {} failed to render, using placeholder: {}",
                    page_index + 1,
                    detail
                );
                Ok(RenderedPage {
                    page_index,
                    zoom,
                    image: Arc::new(self.placeholder()),
                    error: Some(PageError::RenderFailed {
                        page: page_index + 1,
                        detail,
                    }),
                })
            }
        }
    }

    /// The blank image substituted for unrenderable pages.
    pub fn placeholder(&self) -> DynamicImage {
        DynamicImage::ImageRgb8(RgbImage::from_pixel(
            self.placeholder_width,
            self.placeholder_height,
            Rgb([255, 255, 255]),
        ))
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    pub fn cache_capacity(&self) -> usize {
        self.cache.capacity()
    }

    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    struct FakePages {
        pages: usize,
        broken: Option<usize>,
        calls: Cell<usize>,
    }

    impl FakePages {
        fn new(pages: usize) -> Self {
            Self {
                pages,
                broken: None,
                calls: Cell::new(0),
            }
        }
    }

    impl PageRasterizer for FakePages {
        fn page_count(&self) -> usize {
            self.pages
        }

        fn rasterize(&self, page_index: usize, zoom: f32) -> Result<DynamicImage, String> {
            self.calls.set(self.calls.get() + 1);
            if self.broken == Some(page_index) {
                return Err("corrupt content stream".into());
            }
            let side = (200.0 * zoom) as u32;
            Ok(DynamicImage::ImageRgb8(RgbImage::new(side, side)))
        }
    }

    #[test]
    fn small_document_keeps_requested_zoom_and_skips_cache() {
        let config = SplitConfig::default();
        let source = FakePages::new(10);
        let mut renderer = PageRenderer::new(&config, source.page_count());

        let page = renderer.render(&source, 2, 0.5).unwrap();
        assert_eq!(page.zoom, 0.5);
        assert_eq!(page.image.width(), 100);
        assert_eq!(renderer.cache_len(), 0);

        renderer.render(&source, 2, 0.5).unwrap();
        assert_eq!(source.calls.get(), 2);
    }

    #[test]
    fn large_document_clamps_zoom_and_caches() {
        let config = SplitConfig::default();
        let source = FakePages::new(101);
        let mut renderer = PageRenderer::new(&config, source.page_count());
        assert!(renderer.is_memory_optimized());

        let page = renderer.render(&source, 0, 0.5).unwrap();
        assert_eq!(page.zoom, 0.3);
        assert_eq!(renderer.cache_len(), 1);

        let again = renderer.render(&source, 0, 0.5).unwrap();
        assert!(Arc::ptr_eq(&page.image, &again.image));
        assert_eq!(source.calls.get(), 1);
    }

    #[test]
    fn zoom_below_ceiling_is_untouched() {
        let config = SplitConfig::default();
        let renderer = PageRenderer::new(&config, 500);
        assert_eq!(renderer.effective_zoom(0.2), 0.2);
        assert_eq!(renderer.effective_zoom(0.9), 0.3);
    }

    #[test]
    fn failure_yields_placeholder() {
        let config = SplitConfig::default();
        let mut source = FakePages::new(4);
        source.broken = Some(1);
        let mut renderer = PageRenderer::new(&config, source.page_count());

        let page = renderer.render(&source, 1, 0.5).unwrap();
        assert!(page.is_placeholder());
        assert_eq!((page.image.width(), page.image.height()), (100, 150));
        assert_eq!(
            page.error,
            Some(PageError::RenderFailed {
                page: 2,
                detail: "corrupt content stream".into()
            })
        );
    }

    #[test]
    fn placeholders_are_not_cached() {
        let config = SplitConfig::default();
        let mut source = FakePages::new(120);
        source.broken = Some(7);
        let mut renderer = PageRenderer::new(&config, source.page_count());
        renderer.render(&source, 7, 0.3).unwrap();
        assert_eq!(renderer.cache_len(), 0);
    }

    #[test]
    fn out_of_range_page_is_rejected() {
        let config = SplitConfig::default();
        let source = FakePages::new(3);
        let mut renderer = PageRenderer::new(&config, source.page_count());
        let err = renderer.render(&source, 3, 0.5).unwrap_err();
        assert!(matches!(err, PdfSplitError::PageOutOfRange { index: 3, total: 3 }));
    }

    #[test]
    fn bad_zoom_is_rejected() {
        let config = SplitConfig::default();
        let source = FakePages::new(3);
        let mut renderer = PageRenderer::new(&config, source.page_count());
        for zoom in [0.0, -1.0, f32::NAN, f32::INFINITY] {
            assert!(matches!(
                renderer.render(&source, 0, zoom),
                Err(PdfSplitError::InvalidZoom(_))
            ));
        }
    }
}
