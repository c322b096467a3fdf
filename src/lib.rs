//! # edgequake-pdfsplit
//!
//! Find where one document ends and the next begins inside a scanned PDF
//! bundle, and split the bundle into page-range sub-documents.
//!
//! ## Why this crate?
//!
//! Notaries, courts and archives scan whole stacks of paper into a single
//! PDF. The documents inside usually end the same way: a signature block, a
//! rubber stamp or seal, or a dense footer of legal boilerplate. This crate
//! renders each page to a small thumbnail, looks for those three signals and
//! suggests split points. A human (or a policy) confirms them, and the
//! bundle is cut into independent documents without re-encoding any page.
//!
//! ## Pipeline Overview
//!
//! ```text
//! PDF
//!  │
//!  ├─ 1. Input    validate a path or buffer (%PDF magic)
//!  ├─ 2. Render   rasterise pages via pdfium; zoom clamp + cache for big files
//!  ├─ 3. Detect   signature blob │ stamp circle │ footer density  (OR)
//!  ├─ 4. Edit     suggested → selected split points
//!  └─ 5. Segment  copy page ranges into new PDFs (batched for big files)
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use edgequake_pdfsplit::{scan_file, split_file, SplitConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SplitConfig::default();
//!     let report = scan_file("bundle.pdf", &config)?;
//!     eprintln!("{}", report.summary());
//!
//!     let outcome = split_file("bundle.pdf", &report.suggested_splits, "out/", None, &config)?;
//!     for doc in &outcome.outputs {
//!         println!("{}", doc.path.display());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! For interactive use (thumbnails, editing the selection between scan and
//! split) open a [`SplitSession`] over a [`PdfiumSource`].
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pdfsplit` binary (clap + anyhow + indicatif + tracing-subscriber) |
//!
//! Disable `cli` when using only the library:
//! ```toml
//! edgequake-pdfsplit = { version = "0.1", default-features = false }
//! ```
//!
//! ## Runtime requirement
//!
//! pdfium is loaded at runtime from `PDFIUM_LIB_PATH`, the working
//! directory or the system library path; see [`pdfium::bind_pdfium`].

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod error;
pub mod output;
pub mod pdfium;
pub mod pipeline;
pub mod progress;
pub mod session;
pub mod split;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{DetectorConfig, SplitConfig, SplitConfigBuilder};
pub use error::{PageError, PdfSplitError, SegmentError};
pub use output::{DocumentInfo, OutputDocument, OutputSummary, ScanReport, SplitOutcome};
pub use pdfium::{bind_pdfium, PdfiumSource};
pub use pipeline::detect::{BoundaryDetector, DetectionSignals};
pub use pipeline::render::{PageRasterizer, PageRenderer, RenderedPage};
pub use pipeline::segment::{CopyStrategy, Segment, SegmentBackend, SegmentationEngine};
pub use progress::{NoopProgressCallback, ProgressCallback, SplitProgressCallback};
pub use session::SplitSession;
pub use split::{inspect, scan_file, scan_file_async, split_bytes, split_file, split_file_async};
