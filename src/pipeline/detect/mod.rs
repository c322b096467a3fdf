//! Boundary-candidate detection on rendered page images.
//!
//! A page is a candidate for the last page of a document when any of three
//! independent visual signals fires:
//!
//! | Signal | Looks for | Stage |
//! |--------|-----------|-------|
//! | Ink blob | a large, wide ink region in the lower half (signature block) | [`blobs`] |
//! | Stamp | a circle of radius 20–100 px (seal or rubber stamp) | [`circles`] |
//! | Footer text | ink covering more than 3% of the bottom 30% of the page | [`footer_density`] |
//!
//! All stages operate on the contrast-enhanced grayscale page produced by
//! [`contrast`]. The detector is a pure function of the image and its
//! [`DetectorConfig`]: the same image always gives the same answer.

pub mod blobs;
pub mod circles;
pub mod contrast;

pub use blobs::{find_blobs, signature_blob_count, Blob};
pub use circles::{find_circles, Circle};
pub use contrast::{binarize, enhance_contrast, to_grayscale};

use crate::config::DetectorConfig;
use crate::error::PdfSplitError;
use image::{DynamicImage, GrayImage};
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Which signals fired on a page, and the measurements behind them.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DetectionSignals {
    pub ink_blob: bool,
    pub stamp: bool,
    pub footer_text: bool,
    /// Blobs that passed the signature shape rules.
    pub signature_blobs: usize,
    /// Circles found in the radius window.
    pub circles: usize,
    /// Ink fraction of the footer band, `0.0..=1.0`.
    pub footer_density: f64,
}

impl DetectionSignals {
    /// `true` when at least one signal fired.
    pub fn any(&self) -> bool {
        self.ink_blob || self.stamp || self.footer_text
    }
}

/// Fraction of ink pixels in the bottom `fraction` of a binary mask.
pub fn footer_density(binary: &GrayImage, fraction: f32) -> f64 {
    let (width, height) = binary.dimensions();
    // Band starts at floor(h * (1 - fraction)); the fraction is snapped to
    // six decimals so 0.3f32 means 0.3.
    let keep = 1.0 - (f64::from(fraction) * 1e6).round() / 1e6;
    let start = ((height as f64 * keep).floor().max(0.0) as u32).min(height);
    let rows = height - start;
    if rows == 0 || width == 0 {
        return 0.0;
    }
    let mut ink = 0u64;
    for y in start..height {
        for x in 0..width {
            if binary.get_pixel(x, y)[0] > 0 {
                ink += 1;
            }
        }
    }
    ink as f64 / (rows as u64 * width as u64) as f64
}

/// Signature-block signal on a binary ink mask.
pub fn ink_blob_signal(binary: &GrayImage, config: &DetectorConfig) -> bool {
    signature_blob_count(binary, config) > 0
}

/// Stamp signal on a contrast-enhanced grayscale page.
pub fn stamp_signal(enhanced: &GrayImage, config: &DetectorConfig) -> bool {
    !find_circles(enhanced, config).is_empty()
}

/// Footer-text signal on a binary ink mask.
pub fn footer_density_signal(binary: &GrayImage, config: &DetectorConfig) -> bool {
    footer_density(binary, config.footer_fraction) > config.footer_density
}

/// Runs the three signals over a page image.
#[derive(Debug, Clone, Default)]
pub struct BoundaryDetector {
    config: DetectorConfig,
}

impl BoundaryDetector {
    pub fn new(config: DetectorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &DetectorConfig {
        &self.config
    }

    /// Evaluate every signal on `image`.
    ///
    /// # Errors
    /// [`PdfSplitError::MalformedImage`] for an image with no pixels.
    pub fn analyze(&self, image: &DynamicImage) -> Result<DetectionSignals, PdfSplitError> {
        let (width, height) = (image.width(), image.height());
        if width == 0 || height == 0 {
            return Err(PdfSplitError::MalformedImage {
                width,
                height,
                reason: "image has no pixels".into(),
            });
        }

        let cfg = &self.config;
        let gray = to_grayscale(image);
        let enhanced = enhance_contrast(&gray, cfg.clahe_clip_limit, cfg.clahe_tiles);
        let binary = binarize(&enhanced, cfg.binarize_threshold);

        let signature_blobs = signature_blob_count(&binary, cfg);
        let circles = find_circles(&enhanced, cfg).len();
        let density = footer_density(&binary, cfg.footer_fraction);

        let signals = DetectionSignals {
            ink_blob: signature_blobs > 0,
            stamp: circles > 0,
            footer_text: density > cfg.footer_density,
            signature_blobs,
            circles,
            footer_density: density,
        };
        debug!(
            "{}x{} page: blobs={} circles={} footer={:.4} → {}",
            width,
            height,
            signature_blobs,
            circles,
            density,
            signals.any()
        );
        Ok(signals)
    }

    /// `true` when the page looks like the last page of a document.
    pub fn is_boundary_candidate(&self, image: &DynamicImage) -> Result<bool, PdfSplitError> {
        Ok(self.analyze(image)?.any())
    }
}

#[cfg(test)]
pub(crate) mod fixtures {
    use image::{GrayImage, Luma};

    /// White 8-bit page.
    pub fn blank_page(width: u32, height: u32) -> GrayImage {
        GrayImage::from_pixel(width, height, Luma([255]))
    }

    /// Binary mask with no ink.
    pub fn blank_mask(width: u32, height: u32) -> GrayImage {
        GrayImage::new(width, height)
    }

    pub fn fill_rect(img: &mut GrayImage, x: u32, y: u32, w: u32, h: u32, value: u8) {
        for yy in y..(y + h).min(img.height()) {
            for xx in x..(x + w).min(img.width()) {
                img.put_pixel(xx, yy, Luma([value]));
            }
        }
    }

    /// Pixels whose centre lies within `thickness / 2` of the circle.
    pub fn ring(img: &mut GrayImage, cx: f32, cy: f32, radius: f32, thickness: f32, value: u8) {
        let half = thickness / 2.0;
        for y in 0..img.height() {
            for x in 0..img.width() {
                let d = ((x as f32 - cx).powi(2) + (y as f32 - cy).powi(2)).sqrt();
                if (d - radius).abs() <= half {
                    img.put_pixel(x, y, Luma([value]));
                }
            }
        }
    }
}
