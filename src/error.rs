//! Error types for the edgequake-pdfsplit library.
//!
//! Three error types reflect three distinct failure modes:
//!
//! * [`PdfSplitError`] (**fatal**): the operation cannot proceed at all
//!   (bad input file, wrong password, a split point outside the document,
//!   an unusable output directory). Returned as `Err(PdfSplitError)`.
//!
//! * [`PageError`] (**non-fatal**): a single page failed to rasterise. The
//!   renderer substitutes a blank placeholder and the scan carries on.
//!
//! * [`SegmentError`] (**non-fatal**): a single output document could not be
//!   built or written. The segment is skipped and the remaining segments are
//!   still produced; the caller sees a shorter output list plus the failure.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the edgequake-pdfsplit library.
///
/// Page-level and segment-level failures use [`PageError`] and
/// [`SegmentError`] and are reported inside [`crate::output::ScanReport`]
/// and [`crate::output::SplitOutcome`] rather than propagated here.
#[derive(Debug, Error)]
pub enum PdfSplitError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Input file was not found at the given path.
    #[error("PDF file not found: '{path}'\nCheck the path exists and is readable.")]
    FileNotFound { path: PathBuf },

    /// Process does not have read permission on the file.
    #[error("Permission denied reading '{path}'\nTry: chmod +r {path:?}")]
    PermissionDenied { path: PathBuf },

    /// The file exists and was read, but is not a PDF.
    #[error("File is not a valid PDF: '{path}'\nFirst bytes: {magic:?}")]
    NotAPdf { path: PathBuf, magic: [u8; 4] },

    // ── PDF errors ────────────────────────────────────────────────────────
    /// PDF header/trailer/xref is corrupt and cannot be parsed.
    #[error("PDF '{path}' is corrupt: {detail}\nTry repairing with: qpdf input.pdf output.pdf")]
    CorruptPdf { path: PathBuf, detail: String },

    /// PDF requires a password but none was provided.
    #[error("PDF '{path}' is encrypted and requires a password.\nProvide it with --password <PASSWORD>.")]
    PasswordRequired { path: PathBuf },

    /// A password was provided but it is wrong.
    #[error("Wrong password for PDF '{path}'")]
    WrongPassword { path: PathBuf },

    // ── Precondition violations ───────────────────────────────────────────
    /// A 0-based page index is outside `[0, total)`.
    #[error("Page index {index} is out of range (document has {total} pages)")]
    PageOutOfRange { index: usize, total: usize },

    /// A 1-based split point is outside `[2, total]`.
    #[error("Split point {page} is out of range: must lie in 2..={total}")]
    InvalidSplitPoint { page: usize, total: usize },

    /// Split points were not supplied in ascending order.
    #[error("Split points must be sorted ascending: {previous} is followed by {next}")]
    UnsortedSplitPoints { previous: usize, next: usize },

    /// Render zoom factor is zero, negative or not finite.
    #[error("Zoom factor must be a positive finite number, got {0}")]
    InvalidZoom(f32),

    /// The detector was handed an image it cannot analyse.
    #[error("Malformed page image ({width}x{height}): {reason}")]
    MalformedImage {
        width: u32,
        height: u32,
        reason: String,
    },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not create the directory that receives the split documents.
    #[error("Failed to prepare output directory '{path}': {source}")]
    OutputDirFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Pdfium binding errors ─────────────────────────────────────────────
    /// Could not bind to a pdfium library.
    #[error(
        "Failed to bind to pdfium library: {0}\n\n\
You can:\n\
  • Set PDFIUM_LIB_PATH=/path/to/libpdfium to use an existing copy.\n\
  • Place libpdfium next to the executable or in the working directory.\n\
  • Install pdfium system-wide so the dynamic loader can find it.\n"
    )]
    PdfiumBindingFailed(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PdfSplitError {
    /// `true` for the precondition-violation family: bad page index, bad
    /// split points, bad zoom, malformed image.
    pub fn is_precondition_violation(&self) -> bool {
        matches!(
            self,
            PdfSplitError::PageOutOfRange { .. }
                | PdfSplitError::InvalidSplitPoint { .. }
                | PdfSplitError::UnsortedSplitPoints { .. }
                | PdfSplitError::InvalidZoom(_)
                | PdfSplitError::MalformedImage { .. }
        )
    }
}

/// A non-fatal error for a single page.
///
/// Stored in [`crate::pipeline::render::RenderedPage`] when the renderer had
/// to fall back to a placeholder.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum PageError {
    /// Page rasterisation failed; a blank placeholder was substituted.
    #[error("Page {page}: rasterisation failed: {detail}")]
    RenderFailed { page: usize, detail: String },
}

impl PageError {
    /// 1-indexed page number the error refers to.
    pub fn page(&self) -> usize {
        match self {
            PageError::RenderFailed { page, .. } => *page,
        }
    }
}

/// A non-fatal error for a single output segment.
///
/// `start` and `end` are the 1-based inclusive display range of the segment,
/// i.e. the same numbers that appear in the output filename.
#[derive(Debug, Clone, PartialEq, Eq, Error, serde::Serialize, serde::Deserialize)]
pub enum SegmentError {
    /// An empty output document could not be created.
    #[error("Pages {start}-{end}: could not create output document: {detail}")]
    CreateFailed {
        start: usize,
        end: usize,
        detail: String,
    },

    /// Copying a run of pages into the output document failed.
    #[error("Pages {start}-{end}: copying pages failed: {detail}")]
    CopyFailed {
        start: usize,
        end: usize,
        detail: String,
    },

    /// Serialising the output document to its temporary file failed.
    #[error("Pages {start}-{end}: writing '{path}' failed: {detail}")]
    WriteFailed {
        start: usize,
        end: usize,
        path: PathBuf,
        detail: String,
    },

    /// Moving the temporary file to its final name failed.
    #[error("Pages {start}-{end}: publishing '{path}' failed: {detail}")]
    PublishFailed {
        start: usize,
        end: usize,
        path: PathBuf,
        detail: String,
    },
}

impl SegmentError {
    /// The 1-based inclusive display range of the failed segment.
    pub fn display_range(&self) -> (usize, usize) {
        match self {
            SegmentError::CreateFailed { start, end, .. }
            | SegmentError::CopyFailed { start, end, .. }
            | SegmentError::WriteFailed { start, end, .. }
            | SegmentError::PublishFailed { start, end, .. } => (*start, *end),
        }
    }
}
