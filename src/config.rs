//! Configuration types for scanning and splitting.
//!
//! Every knob lives in [`SplitConfig`], built via [`SplitConfigBuilder`].
//! The boundary heuristics have their own [`DetectorConfig`] because their
//! thresholds are empirical and callers tune them independently of the
//! rendering and segmentation policy.

use crate::error::PdfSplitError;
use crate::progress::ProgressCallback;
use serde::{Deserialize, Serialize};
use std::fmt;

/// One mebibyte.
pub const MIB: u64 = 1024 * 1024;

/// Configuration for rendering, detection and segmentation.
///
/// Built via [`SplitConfig::builder()`] or using [`SplitConfig::default()`].
///
/// # Example
/// ```rust
/// use edgequake_pdfsplit::SplitConfig;
///
/// let config = SplitConfig::builder()
///     .default_zoom(0.4)
///     .cache_capacity(20)
///     .batch_size(25)
///     .build()
///     .unwrap();
/// assert_eq!(config.batch_size, 25);
/// ```
#[derive(Clone)]
pub struct SplitConfig {
    /// Zoom factor used for thumbnails when the caller does not ask for one. Default: 0.5.
    pub default_zoom: f32,

    /// Documents with more pages than this render in memory-optimized mode. Default: 100.
    pub memory_optimized_page_threshold: usize,

    /// Highest zoom allowed in memory-optimized mode. Default: 0.3.
    ///
    /// Requests above the ceiling are clamped down to it.
    pub memory_optimized_zoom_ceiling: f32,

    /// Maximum number of thumbnails kept by the render cache. Default: 50.
    pub cache_capacity: usize,

    /// Width of the blank image substituted for a page that fails to render. Default: 100.
    pub placeholder_width: u32,

    /// Height of the blank placeholder image. Default: 150.
    pub placeholder_height: u32,

    /// Source files larger than this many bytes are "large". Default: 100 MiB.
    pub large_file_bytes: u64,

    /// In a large source, segments longer than this are copied in batches. Default: 50.
    pub batch_threshold_pages: usize,

    /// Pages copied per batch for large segments. Default: 30.
    pub batch_size: usize,

    /// Extension used when the original filename has none. Default: ".pdf".
    pub default_extension: String,

    /// PDF user password for encrypted documents.
    pub password: Option<String>,

    /// Boundary detector thresholds.
    pub detector: DetectorConfig,

    /// Optional receiver for "page N of M" and "segment N of M" events.
    pub progress_callback: Option<ProgressCallback>,
}

impl Default for SplitConfig {
    fn default() -> Self {
        Self {
            default_zoom: 0.5,
            memory_optimized_page_threshold: 100,
            memory_optimized_zoom_ceiling: 0.3,
            cache_capacity: 50,
            placeholder_width: 100,
            placeholder_height: 150,
            large_file_bytes: 100 * MIB,
            batch_threshold_pages: 50,
            batch_size: 30,
            default_extension: ".pdf".to_string(),
            password: None,
            detector: DetectorConfig::default(),
            progress_callback: None,
        }
    }
}

impl fmt::Debug for SplitConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SplitConfig")
            .field("default_zoom", &self.default_zoom)
            .field(
                "memory_optimized_page_threshold",
                &self.memory_optimized_page_threshold,
            )
            .field(
                "memory_optimized_zoom_ceiling",
                &self.memory_optimized_zoom_ceiling,
            )
            .field("cache_capacity", &self.cache_capacity)
            .field("large_file_bytes", &self.large_file_bytes)
            .field("batch_threshold_pages", &self.batch_threshold_pages)
            .field("batch_size", &self.batch_size)
            .field("default_extension", &self.default_extension)
            .field("password", &self.password.as_ref().map(|_| "<redacted>"))
            .field("detector", &self.detector)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<dyn SplitProgressCallback>"),
            )
            .finish()
    }
}

impl SplitConfig {
    /// Create a new builder for `SplitConfig`.
    pub fn builder() -> SplitConfigBuilder {
        SplitConfigBuilder {
            config: Self::default(),
        }
    }

    /// Whether a document with `page_count` pages renders in memory-optimized mode.
    pub fn is_memory_optimized(&self, page_count: usize) -> bool {
        page_count > self.memory_optimized_page_threshold
    }

    /// Whether a source file of `byte_len` bytes counts as large.
    pub fn is_large_file(&self, byte_len: u64) -> bool {
        byte_len > self.large_file_bytes
    }
}

/// Builder for [`SplitConfig`].
#[derive(Debug)]
pub struct SplitConfigBuilder {
    config: SplitConfig,
}

impl SplitConfigBuilder {
    pub fn default_zoom(mut self, zoom: f32) -> Self {
        self.config.default_zoom = zoom;
        self
    }

    pub fn memory_optimized_page_threshold(mut self, pages: usize) -> Self {
        self.config.memory_optimized_page_threshold = pages;
        self
    }

    pub fn memory_optimized_zoom_ceiling(mut self, zoom: f32) -> Self {
        self.config.memory_optimized_zoom_ceiling = zoom;
        self
    }

    pub fn cache_capacity(mut self, n: usize) -> Self {
        self.config.cache_capacity = n.max(1);
        self
    }

    pub fn placeholder_size(mut self, width: u32, height: u32) -> Self {
        self.config.placeholder_width = width.max(1);
        self.config.placeholder_height = height.max(1);
        self
    }

    pub fn large_file_bytes(mut self, bytes: u64) -> Self {
        self.config.large_file_bytes = bytes;
        self
    }

    pub fn batch_threshold_pages(mut self, pages: usize) -> Self {
        self.config.batch_threshold_pages = pages;
        self
    }

    pub fn batch_size(mut self, pages: usize) -> Self {
        self.config.batch_size = pages.max(1);
        self
    }

    pub fn default_extension(mut self, ext: impl Into<String>) -> Self {
        let ext = ext.into();
        self.config.default_extension = if ext.is_empty() || ext.starts_with('.') {
            ext
        } else {
            format!(".{ext}")
        };
        self
    }

    pub fn password(mut self, pwd: impl Into<String>) -> Self {
        self.config.password = Some(pwd.into());
        self
    }

    pub fn detector(mut self, detector: DetectorConfig) -> Self {
        self.config.detector = detector;
        self
    }

    pub fn progress_callback(mut self, cb: ProgressCallback) -> Self {
        self.config.progress_callback = Some(cb);
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<SplitConfig, PdfSplitError> {
        let c = &self.config;
        if !(c.default_zoom.is_finite() && c.default_zoom > 0.0) {
            return Err(PdfSplitError::InvalidConfig(format!(
                "default zoom must be > 0, got {}",
                c.default_zoom
            )));
        }
        if !(c.memory_optimized_zoom_ceiling.is_finite() && c.memory_optimized_zoom_ceiling > 0.0)
        {
            return Err(PdfSplitError::InvalidConfig(format!(
                "memory-optimized zoom ceiling must be > 0, got {}",
                c.memory_optimized_zoom_ceiling
            )));
        }
        if c.cache_capacity == 0 || c.batch_size == 0 {
            return Err(PdfSplitError::InvalidConfig(
                "cache capacity and batch size must be ≥ 1".into(),
            ));
        }
        c.detector.validate()?;
        Ok(self.config)
    }
}

// ── Detector thresholds ──────────────────────────────────────────────────

/// Thresholds for the three boundary heuristics.
///
/// The defaults were tuned by eye on scanned legal bundles rendered at 0.5×
/// zoom. None of them has a derivation; treat them as starting points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectorConfig {
    /// Enhanced-gray level at or below which a pixel counts as ink. Default: 150.
    pub binarize_threshold: u8,

    /// CLAHE clip limit, relative to a uniform histogram. Default: 2.0.
    pub clahe_clip_limit: f32,

    /// CLAHE grid size per axis. Default: 8 (an 8×8 grid).
    pub clahe_tiles: u32,

    /// Blobs smaller than this are ignored as speckle. Default: 100.
    pub noise_area: usize,

    /// A signature-like blob must be strictly larger than this. Default: 1000.
    pub min_blob_area: usize,

    /// Blob width/height must be strictly greater than this. Default: 1.0.
    pub min_aspect: f32,

    /// Blob width/height must be strictly less than this. Default: 8.0.
    pub max_aspect: f32,

    /// A blob's top edge must lie strictly below this fraction of the page height. Default: 0.5.
    pub blob_region_start: f32,

    /// Smallest stamp radius searched, in pixels. Default: 20.
    pub circle_min_radius: u32,

    /// Largest stamp radius searched, in pixels. Default: 100.
    pub circle_max_radius: u32,

    /// Minimum distance between two accepted stamp centres. Default: 20.
    pub circle_min_distance: u32,

    /// Upper edge-detector threshold; the lower one is half of it. Default: 50.
    pub canny_high: f32,

    /// Votes a stamp centre and radius need to be accepted. Default: 30.
    pub circle_votes: u32,

    /// Height of the footer band as a fraction of the page. Default: 0.3.
    pub footer_fraction: f32,

    /// Footer ink fraction above which the footer signal fires. Default: 0.03.
    pub footer_density: f64,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        Self {
            binarize_threshold: 150,
            clahe_clip_limit: 2.0,
            clahe_tiles: 8,
            noise_area: 100,
            min_blob_area: 1000,
            min_aspect: 1.0,
            max_aspect: 8.0,
            blob_region_start: 0.5,
            circle_min_radius: 20,
            circle_max_radius: 100,
            circle_min_distance: 20,
            canny_high: 50.0,
            circle_votes: 30,
            footer_fraction: 0.3,
            footer_density: 0.03,
        }
    }
}

impl DetectorConfig {
    fn validate(&self) -> Result<(), PdfSplitError> {
        if self.clahe_tiles == 0 {
            return Err(PdfSplitError::InvalidConfig(
                "CLAHE grid must have at least one tile".into(),
            ));
        }
        if self.circle_min_radius == 0 || self.circle_min_radius > self.circle_max_radius {
            return Err(PdfSplitError::InvalidConfig(format!(
                "circle radius window {}..={} is empty",
                self.circle_min_radius, self.circle_max_radius
            )));
        }
        if self.min_aspect >= self.max_aspect {
            return Err(PdfSplitError::InvalidConfig(format!(
                "aspect window ({}, {}) is empty",
                self.min_aspect, self.max_aspect
            )));
        }
        if !(0.0..=1.0).contains(&self.footer_fraction)
            || !(0.0..=1.0).contains(&self.blob_region_start)
        {
            return Err(PdfSplitError::InvalidConfig(
                "footer_fraction and blob_region_start must lie in 0..=1".into(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let c = SplitConfig::default();
        assert_eq!(c.default_zoom, 0.5);
        assert_eq!(c.cache_capacity, 50);
        assert_eq!(c.large_file_bytes, 100 * 1024 * 1024);
        assert_eq!(c.batch_threshold_pages, 50);
        assert_eq!(c.batch_size, 30);
        assert_eq!(c.default_extension, ".pdf");
        assert_eq!(c.detector.min_blob_area, 1000);
        assert_eq!(c.detector.footer_density, 0.03);
    }

    #[test]
    fn memory_optimized_is_strictly_above_threshold() {
        let c = SplitConfig::default();
        assert!(!c.is_memory_optimized(100));
        assert!(c.is_memory_optimized(101));
    }

    #[test]
    fn large_file_is_strictly_above_threshold() {
        let c = SplitConfig::default();
        assert!(!c.is_large_file(100 * MIB));
        assert!(c.is_large_file(100 * MIB + 1));
    }

    #[test]
    fn builder_rejects_non_positive_zoom() {
        let err = SplitConfig::builder().default_zoom(0.0).build().unwrap_err();
        assert!(matches!(err, PdfSplitError::InvalidConfig(_)));
    }

    #[test]
    fn builder_clamps_counts() {
        let c = SplitConfig::builder()
            .cache_capacity(0)
            .batch_size(0)
            .build()
            .unwrap();
        assert_eq!(c.cache_capacity, 1);
        assert_eq!(c.batch_size, 1);
    }

    #[test]
    fn extension_gets_leading_dot() {
        let c = SplitConfig::builder().default_extension("pdf").build().unwrap();
        assert_eq!(c.default_extension, ".pdf");
    }

    #[test]
    fn detector_radius_window_validated() {
        let detector = DetectorConfig {
            circle_min_radius: 120,
            ..DetectorConfig::default()
        };
        let err = SplitConfig::builder().detector(detector).build().unwrap_err();
        assert!(err.to_string().contains("radius"));
    }

    #[test]
    fn debug_redacts_password() {
        let c = SplitConfig::builder().password("hunter2").build().unwrap();
        let dbg = format!("{c:?}");
        assert!(!dbg.contains("hunter2"));
        assert!(dbg.contains("<redacted>"));
    }
}
