//! Grayscale conversion, local contrast enhancement and binarisation.

use image::{DynamicImage, GrayImage, Luma};

/// Collapse any colour model to 8-bit luma.
pub fn to_grayscale(image: &DynamicImage) -> GrayImage {
    image.to_luma8()
}

/// Contrast-limited adaptive histogram equalisation (CLAHE).
///
/// The image is divided into a `tiles × tiles` grid. Each tile gets its own
/// equalisation curve, built from a histogram whose bins are clipped at
/// `clip_limit` times the uniform bin height with the excess spread evenly
/// over all bins. Pixels are mapped by bilinear interpolation between the
/// curves of the four nearest tile centres, so no tile seams appear.
pub fn enhance_contrast(gray: &GrayImage, clip_limit: f32, tiles: u32) -> GrayImage {
    let (width, height) = gray.dimensions();
    if width == 0 || height == 0 {
        return gray.clone();
    }

    let tile_w = width.div_ceil(tiles.clamp(1, width));
    let tile_h = height.div_ceil(tiles.clamp(1, height));
    let tiles_x = width.div_ceil(tile_w);
    let tiles_y = height.div_ceil(tile_h);

    let mut luts = Vec::with_capacity((tiles_x * tiles_y) as usize);
    for ty in 0..tiles_y {
        for tx in 0..tiles_x {
            let (x0, x1) = (tx * tile_w, ((tx + 1) * tile_w).min(width));
            let (y0, y1) = (ty * tile_h, ((ty + 1) * tile_h).min(height));
            let mut hist = [0u32; 256];
            for y in y0..y1 {
                for x in x0..x1 {
                    hist[gray.get_pixel(x, y)[0] as usize] += 1;
                }
            }
            luts.push(tile_curve(&mut hist, (x1 - x0) * (y1 - y0), clip_limit));
        }
    }

    let lut_at = |tx: u32, ty: u32, value: usize| luts[(ty * tiles_x + tx) as usize][value] as f32;

    let mut out = GrayImage::new(width, height);
    for y in 0..height {
        let (ty0, ty1, wy) = neighbouring_tiles(y, tile_h, tiles_y);
        for x in 0..width {
            let (tx0, tx1, wx) = neighbouring_tiles(x, tile_w, tiles_x);
            let v = gray.get_pixel(x, y)[0] as usize;
            let top = lut_at(tx0, ty0, v) * (1.0 - wx) + lut_at(tx1, ty0, v) * wx;
            let bottom = lut_at(tx0, ty1, v) * (1.0 - wx) + lut_at(tx1, ty1, v) * wx;
            let mapped = top * (1.0 - wy) + bottom * wy;
            out.put_pixel(x, y, Luma([mapped.round().clamp(0.0, 255.0) as u8]));
        }
    }
    out
}

/// Equalisation curve for one tile, after clipping its histogram.
fn tile_curve(hist: &mut [u32; 256], area: u32, clip_limit: f32) -> [u8; 256] {
    if clip_limit > 0.0 {
        let limit = ((clip_limit * area as f32) / 256.0).max(1.0) as u32;
        let mut excess = 0u32;
        for bin in hist.iter_mut() {
            if *bin > limit {
                excess += *bin - limit;
                *bin = limit;
            }
        }
        let bonus = excess / 256;
        let residual = (excess % 256) as usize;
        for bin in hist.iter_mut() {
            *bin += bonus;
        }
        if residual > 0 {
            let step = (256 / residual).max(1);
            for i in (0..256).step_by(step).take(residual) {
                hist[i] += 1;
            }
        }
    }

    let scale = 255.0 / area.max(1) as f32;
    let mut curve = [0u8; 256];
    let mut cdf = 0u32;
    for (value, count) in hist.iter().enumerate() {
        cdf += count;
        curve[value] = (cdf as f32 * scale).round().min(255.0) as u8;
    }
    curve
}

/// The two tiles whose centres bracket `pos` and the weight of the second.
fn neighbouring_tiles(pos: u32, tile: u32, tiles: u32) -> (u32, u32, f32) {
    let f = (pos as f32 + 0.5) / tile as f32 - 0.5;
    if f <= 0.0 {
        return (0, 0, 0.0);
    }
    let i = f.floor() as u32;
    if i >= tiles - 1 {
        return (tiles - 1, tiles - 1, 0.0);
    }
    (i, i + 1, f - i as f32)
}

/// Inverse binary threshold: pixels at or below `threshold` become ink (255),
/// everything brighter becomes background (0).
pub fn binarize(enhanced: &GrayImage, threshold: u8) -> GrayImage {
    let (width, height) = enhanced.dimensions();
    GrayImage::from_fn(width, height, |x, y| {
        if enhanced.get_pixel(x, y)[0] <= threshold {
            Luma([255])
        } else {
            Luma([0])
        }
    })
}
