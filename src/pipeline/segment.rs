//! Segmentation engine: split points → page ranges → output documents.
//!
//! ## Partitioning
//!
//! Split points are 1-based page numbers; split point `p` means "a new
//! document starts at page `p`". The engine brackets them with the
//! sentinels `0` and `page_count` and takes consecutive pairs:
//!
//! ```text
//! points {3} on 5 pages:  0 ──── 2 ──── 5
//!                         [0,2)  [2,5)   →  "1-2", "3-5"
//! ```
//!
//! Empty pairs (from duplicate points) are dropped, so the emitted segments
//! always partition `[0, page_count)` exactly.
//!
//! ## Large sources
//!
//! When the source file exceeds `large_file_bytes`, segments longer than
//! `batch_threshold_pages` are copied in runs of `batch_size` pages with
//! [`SegmentBackend::release`] called between runs. The page sequence is the
//! same as a single-pass copy.
//!
//! ## Writes
//!
//! Each output is saved to a hidden `.part` file in the output directory and
//! renamed onto its final name only once it is complete. A failed segment is
//! logged, recorded in [`SplitOutcome::failures`] and skipped.

use crate::config::SplitConfig;
use crate::error::{PdfSplitError, SegmentError};
use crate::output::{OutputDocument, SplitOutcome};
use crate::pipeline::naming::resolve_naming;
use crate::progress::{NoopProgressCallback, ProgressCallback};
use serde::{Deserialize, Serialize};
use std::ops::Range;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Half-open 0-based page range `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Segment {
    pub start: usize,
    pub end: usize,
}

impl Segment {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.end <= self.start
    }

    pub fn pages(&self) -> Range<usize> {
        self.start..self.end
    }

    /// 1-based inclusive `(first, last)` as shown to users.
    pub fn display_range(&self) -> (usize, usize) {
        (self.start + 1, self.end)
    }
}

/// How a segment's pages are copied into its output document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CopyStrategy {
    /// All pages in one copy call.
    SinglePass,
    /// Runs of at most `batch_size` pages, releasing memory between runs.
    Batched { batch_size: usize },
}

/// The document operations the engine needs.
///
/// Implemented by [`crate::pdfium::PdfiumSource`]; tests use an in-memory
/// fake. Errors are plain text; the engine wraps them in [`SegmentError`].
pub trait SegmentBackend {
    /// An output document under construction.
    type Output;

    fn page_count(&self) -> usize;

    /// Size of the source file in bytes.
    fn source_len(&self) -> u64;

    /// Path of the source file, used as the last-resort output name.
    fn source_path(&self) -> &Path;

    fn create_output(&self) -> Result<Self::Output, String>;

    /// Append the source pages in `pages` (0-based, half-open) to `out`.
    fn copy_pages(&self, out: &mut Self::Output, pages: Range<usize>) -> Result<(), String>;

    /// Drop any intermediate state retained while copying. Called between
    /// batches.
    fn release(&self, _out: &mut Self::Output) {}

    /// Serialise `out` to `path`, replacing any existing file.
    fn save(&self, out: Self::Output, path: &Path) -> Result<(), String>;
}

/// Check split points against a document of `page_count` pages.
///
/// Points must be non-decreasing and each in `2..=page_count` (page 1 can
/// never start a new document). Repeated points are accepted.
pub fn validate_split_points(points: &[usize], page_count: usize) -> Result<(), PdfSplitError> {
    for &page in points {
        if page < 2 || page > page_count {
            return Err(PdfSplitError::InvalidSplitPoint {
                page,
                total: page_count,
            });
        }
    }
    if let Some(pair) = points.windows(2).find(|w| w[1] < w[0]) {
        return Err(PdfSplitError::UnsortedSplitPoints {
            previous: pair[0],
            next: pair[1],
        });
    }
    Ok(())
}

/// Partition `[0, page_count)` at `points`, dropping empty segments.
///
/// An empty point set yields no segments: there is nothing to split.
pub fn compute_segments(points: &[usize], page_count: usize) -> Vec<Segment> {
    if points.is_empty() {
        return Vec::new();
    }
    // 1-based split point p → 0-based boundary p - 1.
    let boundaries: Vec<usize> = std::iter::once(0)
        .chain(points.iter().map(|p| p.saturating_sub(1)))
        .chain(std::iter::once(page_count))
        .collect();
    boundaries
        .windows(2)
        .map(|w| Segment::new(w[0], w[1]))
        .filter(|s| !s.is_empty())
        .collect()
}

/// Pick the copy strategy for one segment.
pub fn choose_strategy(segment: Segment, source_is_large: bool, config: &SplitConfig) -> CopyStrategy {
    if source_is_large && segment.len() > config.batch_threshold_pages {
        CopyStrategy::Batched {
            batch_size: config.batch_size.max(1),
        }
    } else {
        CopyStrategy::SinglePass
    }
}

/// Consecutive runs of at most `batch_size` pages covering `segment`.
pub fn batch_ranges(segment: Segment, batch_size: usize) -> Vec<Range<usize>> {
    let step = batch_size.max(1);
    (segment.start..segment.end)
        .step_by(step)
        .map(|from| from..(from + step).min(segment.end))
        .collect()
}

/// Materialises segments of one source document as files.
pub struct SegmentationEngine {
    config: SplitConfig,
    bound_filename: Option<String>,
}

impl SegmentationEngine {
    pub fn new(config: SplitConfig) -> Self {
        Self {
            config,
            bound_filename: None,
        }
    }

    /// Remember an original filename to use when a split call supplies none.
    pub fn bind_filename(&mut self, name: impl Into<String>) {
        self.bound_filename = Some(name.into());
    }

    pub fn bound_filename(&self) -> Option<&str> {
        self.bound_filename.as_deref()
    }

    pub fn config(&self) -> &SplitConfig {
        &self.config
    }

    /// Split `backend` at `split_points` and write the parts to `output_dir`.
    ///
    /// Output names derive from `original_filename`, else the bound filename,
    /// else the source file's stem.
    ///
    /// # Errors
    /// Invalid split points and an output directory that cannot be created
    /// are fatal. Per-segment failures are reported in the outcome.
    pub fn split<B: SegmentBackend + ?Sized>(
        &self,
        backend: &B,
        split_points: &[usize],
        output_dir: &Path,
        original_filename: Option<&str>,
    ) -> Result<SplitOutcome, PdfSplitError> {
        let total_pages = backend.page_count();
        validate_split_points(split_points, total_pages)?;

        let segments = compute_segments(split_points, total_pages);
        if segments.is_empty() {
            info!("No split points; nothing to write");
            return Ok(SplitOutcome::default());
        }

        std::fs::create_dir_all(output_dir).map_err(|source| PdfSplitError::OutputDirFailed {
            path: output_dir.to_path_buf(),
            source,
        })?;

        let naming = resolve_naming(
            original_filename,
            self.bound_filename.as_deref(),
            backend.source_path(),
            &self.config.default_extension,
        );
        let source_is_large = self.config.is_large_file(backend.source_len());
        let callback: ProgressCallback = self
            .config
            .progress_callback
            .clone()
            .unwrap_or_else(|| Arc::new(NoopProgressCallback));

        info!(
            "Splitting {} pages into {} documents{}",
            total_pages,
            segments.len(),
            if source_is_large { " (large source)" } else { "" }
        );
        callback.on_split_start(segments.len());

        let mut outcome = SplitOutcome {
            segments_total: segments.len(),
            ..SplitOutcome::default()
        };

        for (i, segment) in segments.iter().copied().enumerate() {
            let strategy = choose_strategy(segment, source_is_large, &self.config);
            let dest = output_dir.join(naming.filename(segment.start, segment.end));

            match write_segment(backend, segment, strategy, output_dir, &dest) {
                Ok(()) => {
                    debug!("Wrote {}", dest.display());
                    callback.on_segment_written(i + 1, segments.len(), &dest);
                    outcome.outputs.push(OutputDocument {
                        path: dest,
                        segment,
                        strategy,
                    });
                }
                Err(e) => {
                    warn!("Skipping segment: {}", e);
                    callback.on_segment_error(i + 1, segments.len(), &e.to_string());
                    outcome.failures.push(e);
                }
            }
        }

        callback.on_split_complete(segments.len(), outcome.outputs.len());
        info!("{}", outcome.summary());
        Ok(outcome)
    }
}

fn write_segment<B: SegmentBackend + ?Sized>(
    backend: &B,
    segment: Segment,
    strategy: CopyStrategy,
    output_dir: &Path,
    dest: &Path,
) -> Result<(), SegmentError> {
    let (start, end) = segment.display_range();

    let mut out = backend
        .create_output()
        .map_err(|detail| SegmentError::CreateFailed { start, end, detail })?;

    let copy_err = |detail| SegmentError::CopyFailed { start, end, detail };
    match strategy {
        CopyStrategy::SinglePass => backend.copy_pages(&mut out, segment.pages()).map_err(copy_err)?,
        CopyStrategy::Batched { batch_size } => {
            for run in batch_ranges(segment, batch_size) {
                debug!("Copying pages {}-{}", run.start + 1, run.end);
                backend.copy_pages(&mut out, run).map_err(copy_err)?;
                backend.release(&mut out);
            }
        }
    }

    let write_err = |detail: String| SegmentError::WriteFailed {
        start,
        end,
        path: dest.to_path_buf(),
        detail,
    };
    let part = tempfile::Builder::new()
        .prefix(".")
        .suffix(".part")
        .tempfile_in(output_dir)
        .map_err(|e| write_err(e.to_string()))?;
    backend.save(out, part.path()).map_err(write_err)?;

    part.persist(dest)
        .map_err(|e| SegmentError::PublishFailed {
            start,
            end,
            path: dest.to_path_buf(),
            detail: e.error.to_string(),
        })?;
    Ok(())
}
