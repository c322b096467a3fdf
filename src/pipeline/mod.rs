//! Pipeline stages for boundary detection and splitting.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ render ──▶ detect ──▶ (caller edits split points) ──▶ segment
//! (path/bytes) (pdfium+cache) (signals)                          (write files)
//! ```
//!
//! 1. [`input`]: validate a path or buffer as a local PDF file
//! 2. [`render`]: rasterise pages, clamping zoom and caching thumbnails for
//!    large documents; failures become placeholders
//! 3. [`detect`]: score each page for signature, stamp and footer signals
//! 4. [`segment`]: partition the document at split points and write each
//!    part, batching page copies for large sources
//!
//! [`naming`] and [`cache`] are shared helpers.

pub mod cache;
pub mod detect;
pub mod input;
pub mod naming;
pub mod render;
pub mod segment;
