//! Circle finding by gradient voting (Hough gradient method).
//!
//! 1. Canny edges: 3×3 Sobel, L1 magnitude, non-maximum suppression and
//!    hysteresis with the low threshold at half the high one.
//! 2. Every edge pixel votes for centres along its gradient direction, both
//!    ways, at each distance in the radius window.
//! 3. Accumulator local maxima above the vote threshold become centre
//!    candidates, strongest first, at least `circle_min_distance` apart.
//! 4. A candidate is kept when enough edge pixels sit at a common distance
//!    from it; that distance is the radius.

use crate::config::DetectorConfig;
use image::GrayImage;

/// A detected circle in pixel coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Circle {
    pub x: f32,
    pub y: f32,
    pub radius: f32,
    /// Edge pixels supporting the radius.
    pub support: u32,
}

struct Gradients {
    width: usize,
    height: usize,
    gx: Vec<i32>,
    gy: Vec<i32>,
}

fn sobel(gray: &GrayImage) -> Gradients {
    let (w, h) = (gray.width() as usize, gray.height() as usize);
    let px = |x: usize, y: usize| gray.get_pixel(x as u32, y as u32)[0] as i32;
    let mut gx = vec![0i32; w * h];
    let mut gy = vec![0i32; w * h];
    for y in 1..h.saturating_sub(1) {
        for x in 1..w.saturating_sub(1) {
            let idx = y * w + x;
            gx[idx] = px(x + 1, y - 1) + 2 * px(x + 1, y) + px(x + 1, y + 1)
                - px(x - 1, y - 1)
                - 2 * px(x - 1, y)
                - px(x - 1, y + 1);
            gy[idx] = px(x - 1, y + 1) + 2 * px(x, y + 1) + px(x + 1, y + 1)
                - px(x - 1, y - 1)
                - 2 * px(x, y - 1)
                - px(x + 1, y - 1);
        }
    }
    Gradients {
        width: w,
        height: h,
        gx,
        gy,
    }
}

/// Edge map as a flat `width * height` mask.
fn canny(grad: &Gradients, low: f32, high: f32) -> Vec<bool> {
    let (w, h) = (grad.width, grad.height);
    let mag: Vec<f32> = grad
        .gx
        .iter()
        .zip(&grad.gy)
        .map(|(gx, gy)| (gx.abs() + gy.abs()) as f32)
        .collect();

    // tan(22.5°) and tan(67.5°)
    const TAN_22: f32 = 0.414_213_57;
    const TAN_67: f32 = 2.414_213_6;

    let mut candidate = vec![false; w * h];
    let mut strong = Vec::new();
    for y in 1..h.saturating_sub(1) {
        for x in 1..w.saturating_sub(1) {
            let idx = y * w + x;
            let m = mag[idx];
            if m <= low {
                continue;
            }
            let (gx, gy) = (grad.gx[idx] as f32, grad.gy[idx] as f32);
            let (ax, ay) = (gx.abs(), gy.abs());
            let (a, b) = if ay <= ax * TAN_22 {
                (idx - 1, idx + 1)
            } else if ay > ax * TAN_67 {
                (idx - w, idx + w)
            } else if (gx > 0.0) == (gy > 0.0) {
                (idx - w - 1, idx + w + 1)
            } else {
                (idx - w + 1, idx + w - 1)
            };
            if m > mag[a] && m >= mag[b] {
                candidate[idx] = true;
                if m > high {
                    strong.push(idx);
                }
            }
        }
    }

    let mut edges = vec![false; w * h];
    for &idx in &strong {
        edges[idx] = true;
    }
    while let Some(idx) = strong.pop() {
        let (x, y) = (idx % w, idx / w);
        for ny in y - 1..=y + 1 {
            for nx in x - 1..=x + 1 {
                let n = ny * w + nx;
                if candidate[n] && !edges[n] {
                    edges[n] = true;
                    strong.push(n);
                }
            }
        }
    }
    edges
}

/// Find circles whose radius lies in the configured window.
///
/// Results are ordered by accumulator strength, strongest first.
pub fn find_circles(gray: &GrayImage, config: &DetectorConfig) -> Vec<Circle> {
    let (width, height) = gray.dimensions();
    if width < 3 || height < 3 {
        return Vec::new();
    }
    let grad = sobel(gray);
    let (w, h) = (grad.width, grad.height);
    let edges = canny(&grad, (config.canny_high / 2.0).max(1.0), config.canny_high);

    let min_r = config.circle_min_radius as f32;
    let max_r = config.circle_max_radius as f32;

    let mut acc = vec![0u32; w * h];
    let mut edge_points = Vec::new();
    for (idx, _) in edges.iter().enumerate().filter(|(_, e)| **e) {
        let (x, y) = ((idx % w) as f32, (idx / w) as f32);
        edge_points.push((x, y));
        let (gx, gy) = (grad.gx[idx] as f32, grad.gy[idx] as f32);
        let norm = (gx * gx + gy * gy).sqrt();
        if norm == 0.0 {
            continue;
        }
        let (dx, dy) = (gx / norm, gy / norm);
        for sign in [-1.0f32, 1.0] {
            let mut r = min_r;
            while r <= max_r {
                let cx = (x + sign * r * dx).round();
                let cy = (y + sign * r * dy).round();
                if cx < 0.0 || cy < 0.0 || cx >= w as f32 || cy >= h as f32 {
                    break;
                }
                acc[cy as usize * w + cx as usize] += 1;
                r += 1.0;
            }
        }
    }

    let mut centres = Vec::new();
    for y in 1..h - 1 {
        for x in 1..w - 1 {
            let idx = y * w + x;
            let v = acc[idx];
            if v > config.circle_votes
                && v > acc[idx - 1]
                && v >= acc[idx + 1]
                && v > acc[idx - w]
                && v >= acc[idx + w]
            {
                centres.push((idx, v));
            }
        }
    }
    centres.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));

    let min_dist2 = (config.circle_min_distance as f32).powi(2);
    let mut circles: Vec<Circle> = Vec::new();
    let mut bins = vec![0u32; config.circle_max_radius as usize + 1];

    for (idx, _) in centres {
        let (cx, cy) = ((idx % w) as f32, (idx / w) as f32);
        if circles
            .iter()
            .any(|c| (c.x - cx).powi(2) + (c.y - cy).powi(2) < min_dist2)
        {
            continue;
        }

        bins.iter_mut().for_each(|b| *b = 0);
        for &(x, y) in &edge_points {
            let d = ((x - cx).powi(2) + (y - cy).powi(2)).sqrt();
            if d >= min_r && d <= max_r {
                bins[d.round() as usize] += 1;
            }
        }

        // Best radius by support per unit radius so that large circles do
        // not win on circumference alone.
        let mut best: Option<(usize, u32)> = None;
        for (r, &count) in bins.iter().enumerate().skip(config.circle_min_radius as usize) {
            if count == 0 {
                continue;
            }
            let better = match best {
                None => true,
                Some((br, bc)) => (count as u64) * (br as u64) > (bc as u64) * (r as u64),
            };
            if better {
                best = Some((r, count));
            }
        }

        if let Some((r, support)) = best {
            if support > config.circle_votes {
                circles.push(Circle {
                    x: cx,
                    y: cy,
                    radius: r as f32,
                    support,
                });
            }
        }
    }
    circles
}
