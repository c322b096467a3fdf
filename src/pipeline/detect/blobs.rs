//! Connected ink regions on a binary mask.
//!
//! Only outer outlines matter: enclosed background (the counter of an `o`,
//! the inside of a stamp ring) is filled first, then the mask is labelled
//! with 8-connectivity. Area is the pixel count of the filled region.

use crate::config::DetectorConfig;
use image::GrayImage;

/// One connected ink region.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Blob {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
    /// Pixels inside the outer outline, holes included.
    pub area: usize,
}

impl Blob {
    /// Width divided by height of the bounding box.
    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height.max(1) as f32
    }

    /// Large, wider than tall but not a rule line, and in the lower part of
    /// the page.
    pub fn is_signature_like(&self, page_height: u32, config: &DetectorConfig) -> bool {
        let aspect = self.aspect_ratio();
        self.area > config.min_blob_area
            && aspect > config.min_aspect
            && aspect < config.max_aspect
            && self.y as f32 > page_height as f32 * config.blob_region_start
    }
}

/// All blobs of at least `min_area` pixels, in raster order of their first
/// pixel.
pub fn find_blobs(binary: &GrayImage, min_area: usize) -> Vec<Blob> {
    let (width, height) = binary.dimensions();
    let (w, h) = (width as usize, height as usize);
    if w == 0 || h == 0 {
        return Vec::new();
    }

    let filled = fill_holes(binary);
    let mut seen = vec![false; w * h];
    let mut stack = Vec::new();
    let mut blobs = Vec::new();

    for start in 0..w * h {
        if !filled[start] || seen[start] {
            continue;
        }
        seen[start] = true;
        stack.push(start);

        let (mut min_x, mut min_y) = (usize::MAX, usize::MAX);
        let (mut max_x, mut max_y) = (0usize, 0usize);
        let mut area = 0usize;

        while let Some(idx) = stack.pop() {
            let (x, y) = (idx % w, idx / w);
            area += 1;
            min_x = min_x.min(x);
            max_x = max_x.max(x);
            min_y = min_y.min(y);
            max_y = max_y.max(y);

            for ny in y.saturating_sub(1)..=(y + 1).min(h - 1) {
                for nx in x.saturating_sub(1)..=(x + 1).min(w - 1) {
                    let n = ny * w + nx;
                    if filled[n] && !seen[n] {
                        seen[n] = true;
                        stack.push(n);
                    }
                }
            }
        }

        if area >= min_area {
            blobs.push(Blob {
                x: min_x as u32,
                y: min_y as u32,
                width: (max_x - min_x + 1) as u32,
                height: (max_y - min_y + 1) as u32,
                area,
            });
        }
    }
    blobs
}

/// Ink mask with every background region not reachable from the image
/// border turned into ink.
fn fill_holes(binary: &GrayImage) -> Vec<bool> {
    let (w, h) = (binary.width() as usize, binary.height() as usize);
    let ink: Vec<bool> = binary.pixels().map(|p| p[0] > 0).collect();
    let mut outside = vec![false; w * h];
    let mut stack = Vec::new();

    let seed = |idx: usize, outside: &mut Vec<bool>, stack: &mut Vec<usize>| {
        if !ink[idx] && !outside[idx] {
            outside[idx] = true;
            stack.push(idx);
        }
    };
    for x in 0..w {
        seed(x, &mut outside, &mut stack);
        seed((h - 1) * w + x, &mut outside, &mut stack);
    }
    for y in 0..h {
        seed(y * w, &mut outside, &mut stack);
        seed(y * w + w - 1, &mut outside, &mut stack);
    }

    // Background is 4-connected so that diagonal gaps in an outline still
    // close it.
    while let Some(idx) = stack.pop() {
        let (x, y) = (idx % w, idx / w);
        let mut visit = |n: usize| {
            if !ink[n] && !outside[n] {
                outside[n] = true;
                stack.push(n);
            }
        };
        if x > 0 {
            visit(idx - 1);
        }
        if x + 1 < w {
            visit(idx + 1);
        }
        if y > 0 {
            visit(idx - w);
        }
        if y + 1 < h {
            visit(idx + w);
        }
    }

    outside.iter().map(|o| !o).collect()
}

/// Number of blobs on the page that look like a signature block.
pub fn signature_blob_count(binary: &GrayImage, config: &DetectorConfig) -> usize {
    let height = binary.height();
    find_blobs(binary, config.noise_area)
        .iter()
        .filter(|b| b.is_signature_like(height, config))
        .count()
}
