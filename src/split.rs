//! One-call entry points over [`SplitSession`] with a pdfium source.
//!
//! Each call binds pdfium, opens the document, does its work and drops
//! everything before returning. The `_async` variants move that work onto
//! `spawn_blocking` because pdfium is blocking and not async-safe.

use crate::config::SplitConfig;
use crate::error::PdfSplitError;
use crate::output::{DocumentInfo, ScanReport, SplitOutcome};
use crate::pdfium::{bind_pdfium, PdfiumSource};
use crate::pipeline::input::{self, ResolvedInput};
use crate::pipeline::segment::validate_split_points;
use crate::session::SplitSession;
use std::path::{Path, PathBuf};
use tracing::info;

fn with_session<T>(
    resolved: &ResolvedInput,
    config: &SplitConfig,
    original_filename: Option<&str>,
    f: impl FnOnce(&mut SplitSession<PdfiumSource<'_>>) -> Result<T, PdfSplitError>,
) -> Result<T, PdfSplitError> {
    let pdfium = bind_pdfium()?;
    let source = PdfiumSource::open(&pdfium, resolved.path(), config.password.as_deref())?;
    let mut session = SplitSession::new(source, config.clone());
    if let Some(name) = original_filename {
        session = session.with_original_filename(name);
    }
    f(&mut session)
}

/// Page count, size and the rendering/copy policies they trigger, without
/// rendering any page.
pub fn inspect(path: impl AsRef<Path>, config: &SplitConfig) -> Result<DocumentInfo, PdfSplitError> {
    let resolved = input::resolve_local(path)?;
    with_session(&resolved, config, None, |s| Ok(s.document_info()))
}

/// Scan every page and report candidates and suggested split points.
pub fn scan_file(path: impl AsRef<Path>, config: &SplitConfig) -> Result<ScanReport, PdfSplitError> {
    let resolved = input::resolve_local(path)?;
    with_session(&resolved, config, None, |s| s.scan())
}

/// Split a PDF on disk at `split_points` (1-based, ascending).
///
/// # Example
/// ```rust,no_run
/// use edgequake_pdfsplit::{split_file, SplitConfig};
///
/// # fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let outcome = split_file("bundle.pdf", &[3, 9], "out/", None, &SplitConfig::default())?;
/// for doc in &outcome.outputs {
///     println!("{}", doc.path.display());
/// }
/// # Ok(())
/// # }
/// ```
pub fn split_file(
    path: impl AsRef<Path>,
    split_points: &[usize],
    output_dir: impl AsRef<Path>,
    original_filename: Option<&str>,
    config: &SplitConfig,
) -> Result<SplitOutcome, PdfSplitError> {
    let resolved = input::resolve_local(path)?;
    split_resolved(&resolved, split_points, output_dir.as_ref(), original_filename, config)
}

/// Split an in-memory PDF.
///
/// The bytes are written to a managed temp file for the duration of the
/// call. Pass `original_filename` to name the outputs after the upload;
/// otherwise they carry the temp file's name.
pub fn split_bytes(
    bytes: &[u8],
    split_points: &[usize],
    output_dir: impl AsRef<Path>,
    original_filename: Option<&str>,
    config: &SplitConfig,
) -> Result<SplitOutcome, PdfSplitError> {
    let resolved = input::resolve_bytes(bytes)?;
    split_resolved(&resolved, split_points, output_dir.as_ref(), original_filename, config)
}

fn split_resolved(
    resolved: &ResolvedInput,
    split_points: &[usize],
    output_dir: &Path,
    original_filename: Option<&str>,
    config: &SplitConfig,
) -> Result<SplitOutcome, PdfSplitError> {
    with_session(resolved, config, original_filename, |s| {
        validate_split_points(split_points, s.page_count())?;
        for &page in split_points {
            s.select(page)?;
        }
        if s.selected().len() != split_points.len() {
            info!(
                "{} duplicate split points collapsed",
                split_points.len() - s.selected().len()
            );
        }
        s.split(output_dir, None)
    })
}

/// [`scan_file`] on a blocking thread.
pub async fn scan_file_async(path: PathBuf, config: SplitConfig) -> Result<ScanReport, PdfSplitError> {
    tokio::task::spawn_blocking(move || scan_file(&path, &config))
        .await
        .map_err(|e| PdfSplitError::Internal(format!("Scan task panicked: {}", e)))?
}

/// [`split_file`] on a blocking thread.
pub async fn split_file_async(
    path: PathBuf,
    split_points: Vec<usize>,
    output_dir: PathBuf,
    original_filename: Option<String>,
    config: SplitConfig,
) -> Result<SplitOutcome, PdfSplitError> {
    tokio::task::spawn_blocking(move || {
        split_file(
            &path,
            &split_points,
            &output_dir,
            original_filename.as_deref(),
            &config,
        )
    })
    .await
    .map_err(|e| PdfSplitError::Internal(format!("Split task panicked: {}", e)))?
}
