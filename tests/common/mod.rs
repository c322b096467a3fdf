//! In-memory document used by the integration tests.
//!
//! Pages render as white images; "ending" pages get a dark signature block
//! in their lower half. Outputs are lists of page indices saved as a tiny
//! `%PDF`-prefixed JSON file so tests can read back exactly which pages
//! landed in which document.

#![allow(dead_code)]

use edgequake_pdfsplit::{PageRasterizer, SegmentBackend, SplitProgressCallback};
use image::{DynamicImage, Rgb, RgbImage};
use std::cell::{Cell, RefCell};
use std::collections::HashSet;
use std::ops::Range;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub const MIB: u64 = 1024 * 1024;
const HEADER: &[u8] = b"%PDF-fake\n";

pub struct FakeDoc {
    pub pages: usize,
    pub byte_len: u64,
    pub path: PathBuf,
    pub ending_pages: HashSet<usize>,
    pub broken_pages: HashSet<usize>,
    /// Copying any range containing this page fails.
    pub poison_copy: Option<usize>,
    /// Saving any output whose first page is this one fails.
    pub poison_save: Option<usize>,
    pub copy_calls: RefCell<Vec<Range<usize>>>,
    pub releases: Cell<usize>,
    pub renders: Cell<usize>,
}

impl FakeDoc {
    pub fn new(pages: usize) -> Self {
        Self {
            pages,
            byte_len: 4 * MIB,
            path: PathBuf::from("/tmp/tmp_upload_x1.pdf"),
            ending_pages: HashSet::new(),
            broken_pages: HashSet::new(),
            poison_copy: None,
            poison_save: None,
            copy_calls: RefCell::new(Vec::new()),
            releases: Cell::new(0),
            renders: Cell::new(0),
        }
    }

    pub fn with_endings(mut self, pages: impl IntoIterator<Item = usize>) -> Self {
        self.ending_pages.extend(pages);
        self
    }

    pub fn with_broken(mut self, pages: impl IntoIterator<Item = usize>) -> Self {
        self.broken_pages.extend(pages);
        self
    }

    pub fn large(mut self) -> Self {
        self.byte_len = 200 * MIB;
        self
    }
}

impl PageRasterizer for FakeDoc {
    fn page_count(&self) -> usize {
        self.pages
    }

    fn rasterize(&self, page_index: usize, zoom: f32) -> Result<DynamicImage, String> {
        self.renders.set(self.renders.get() + 1);
        if self.broken_pages.contains(&page_index) {
            return Err(format!("bad xref entry for page {}", page_index + 1));
        }
        let width = (300.0 * zoom) as u32;
        let height = (400.0 * zoom) as u32;
        let mut img = RgbImage::from_pixel(width, height, Rgb([255, 255, 255]));
        if self.ending_pages.contains(&page_index) {
            let (bw, bh) = (width * 2 / 5, height / 8);
            let (x0, y0) = (width / 4, height * 13 / 20);
            for y in y0..y0 + bh {
                for x in x0..x0 + bw {
                    img.put_pixel(x, y, Rgb([10, 10, 10]));
                }
            }
        }
        Ok(DynamicImage::ImageRgb8(img))
    }
}

impl SegmentBackend for FakeDoc {
    type Output = Vec<usize>;

    fn page_count(&self) -> usize {
        self.pages
    }

    fn source_len(&self) -> u64 {
        self.byte_len
    }

    fn source_path(&self) -> &Path {
        &self.path
    }

    fn create_output(&self) -> Result<Self::Output, String> {
        Ok(Vec::new())
    }

    fn copy_pages(&self, out: &mut Self::Output, pages: Range<usize>) -> Result<(), String> {
        self.copy_calls.borrow_mut().push(pages.clone());
        if let Some(p) = self.poison_copy {
            if pages.contains(&p) {
                return Err(format!("page {} has an unreadable content stream", p + 1));
            }
        }
        out.extend(pages);
        Ok(())
    }

    fn release(&self, _out: &mut Self::Output) {
        self.releases.set(self.releases.get() + 1);
    }

    fn save(&self, out: Self::Output, path: &Path) -> Result<(), String> {
        if self.poison_save.is_some() && out.first().copied() == self.poison_save {
            // Leave a partial file behind, as a crashed writer would.
            std::fs::write(path, b"%PDF-trunc").map_err(|e| e.to_string())?;
            return Err("disk full".into());
        }
        let mut bytes = HEADER.to_vec();
        bytes.extend(serde_json::to_vec(&out).map_err(|e| e.to_string())?);
        std::fs::write(path, bytes).map_err(|e| e.to_string())
    }
}

/// Page indices stored in a file written by [`FakeDoc::save`].
pub fn read_pages(path: &Path) -> Vec<usize> {
    let bytes = std::fs::read(path).unwrap();
    assert!(bytes.starts_with(HEADER), "{} is not a fake pdf", path.display());
    serde_json::from_slice(&bytes[HEADER.len()..]).unwrap()
}

/// File names in `dir`, sorted.
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
        .collect();
    names.sort();
    names
}

/// Counts every callback event.
#[derive(Default)]
pub struct Recorder {
    pub scanned: AtomicUsize,
    pub page_errors: AtomicUsize,
    pub candidates: AtomicUsize,
    pub written: AtomicUsize,
    pub segment_errors: AtomicUsize,
    pub events: Mutex<Vec<String>>,
}

impl SplitProgressCallback for Recorder {
    fn on_scan_start(&self, total_pages: usize) {
        self.events.lock().unwrap().push(format!("scan_start:{total_pages}"));
    }

    fn on_page_scanned(&self, _page_num: usize, _total_pages: usize, is_candidate: bool) {
        self.scanned.fetch_add(1, Ordering::SeqCst);
        if is_candidate {
            self.candidates.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn on_page_error(&self, _page_num: usize, _total_pages: usize, _error: &str) {
        self.page_errors.fetch_add(1, Ordering::SeqCst);
    }

    fn on_scan_complete(&self, total_pages: usize, candidate_count: usize) {
        self.events
            .lock()
            .unwrap()
            .push(format!("scan_complete:{total_pages}:{candidate_count}"));
    }

    fn on_split_start(&self, total_segments: usize) {
        self.events.lock().unwrap().push(format!("split_start:{total_segments}"));
    }

    fn on_segment_written(&self, _segment_num: usize, _total: usize, _path: &Path) {
        self.written.fetch_add(1, Ordering::SeqCst);
    }

    fn on_segment_error(&self, _segment_num: usize, _total: usize, _error: &str) {
        self.segment_errors.fetch_add(1, Ordering::SeqCst);
    }

    fn on_split_complete(&self, total_segments: usize, written: usize) {
        self.events
            .lock()
            .unwrap()
            .push(format!("split_complete:{total_segments}:{written}"));
    }
}
