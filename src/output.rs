//! Result types returned by scans and splits.
//!
//! All types serialise with serde so the CLI can emit them as JSON.

use crate::error::{PageError, PdfSplitError, SegmentError};
use crate::pipeline::naming;
use crate::pipeline::segment::{CopyStrategy, Segment};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Facts about a source document that drive the rendering and copy policy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentInfo {
    pub path: PathBuf,
    pub page_count: usize,
    pub byte_len: u64,
    /// More pages than the memory-optimized threshold.
    pub memory_optimized: bool,
    /// Larger on disk than the large-file threshold.
    pub large: bool,
}

/// Outcome of running the detector over every page of a document.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanReport {
    /// Pages in the document.
    pub total_pages: usize,
    /// 0-based indices of pages the detector flagged.
    pub candidates: Vec<usize>,
    /// 1-based split points derived from the candidates, ascending.
    pub suggested_splits: Vec<usize>,
    /// Pages that fell back to a placeholder image.
    pub failed_pages: Vec<PageError>,
}

impl ScanReport {
    /// Pages rendered from real content (not placeholders).
    pub fn processed_pages(&self) -> usize {
        self.total_pages.saturating_sub(self.failed_pages.len())
    }

    /// One-line summary such as `processed 48/50 pages, 2 skipped, 3 candidates`.
    pub fn summary(&self) -> String {
        format!(
            "processed {}/{} pages, {} skipped, {} candidates",
            self.processed_pages(),
            self.total_pages,
            self.failed_pages.len(),
            self.candidates.len()
        )
    }
}

/// A written output document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputDocument {
    pub path: PathBuf,
    pub segment: Segment,
    pub strategy: CopyStrategy,
}

/// Outcome of a split: the documents that made it to disk and the segments
/// that did not.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitOutcome {
    /// Successfully written documents, in ascending page order.
    pub outputs: Vec<OutputDocument>,
    /// Segments that were skipped, in ascending page order.
    pub failures: Vec<SegmentError>,
    /// Non-empty segments the split points produced.
    pub segments_total: usize,
}

impl SplitOutcome {
    /// Paths of the written documents, in ascending page order.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.outputs.iter().map(|o| o.path.clone()).collect()
    }

    /// `true` when every segment was written.
    pub fn is_complete(&self) -> bool {
        self.failures.is_empty() && self.outputs.len() == self.segments_total
    }

    /// One-line summary such as `wrote 3/4 documents, 1 skipped`.
    pub fn summary(&self) -> String {
        format!(
            "wrote {}/{} documents, {} skipped",
            self.outputs.len(),
            self.segments_total,
            self.failures.len()
        )
    }

    /// Describe each written file for display or packaging.
    pub fn summaries(&self) -> Result<Vec<OutputSummary>, PdfSplitError> {
        self.outputs
            .iter()
            .map(|o| OutputSummary::from_path(&o.path))
            .collect()
    }
}

/// File name, page range and size of one written document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSummary {
    pub file_name: String,
    /// 1-based inclusive range parsed from the `-{start}-{end}` suffix.
    pub page_range: Option<(usize, usize)>,
    pub size_bytes: u64,
}

impl OutputSummary {
    /// Build a summary from a file on disk.
    pub fn from_path(path: &Path) -> Result<Self, PdfSplitError> {
        let size_bytes = std::fs::metadata(path)
            .map_err(|e| PdfSplitError::Internal(format!("stat {}: {e}", path.display())))?
            .len();
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let page_range = naming::parse_range_suffix(&file_name);
        Ok(Self {
            file_name,
            page_range,
            size_bytes,
        })
    }

    /// "Pages 3-5", or an empty string when the name carries no range.
    pub fn range_label(&self) -> String {
        match self.page_range {
            Some((start, end)) => format!("Pages {start}-{end}"),
            None => String::new(),
        }
    }

    /// Size in kibibytes with one decimal, e.g. `12.5 KB`.
    pub fn size_label(&self) -> String {
        format!("{:.1} KB", self.size_bytes as f64 / 1024.0)
    }
}
