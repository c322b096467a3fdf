//! Input resolution: turn a path or an uploaded buffer into a local PDF file.
//!
//! pdfium opens documents by path, so byte buffers are written to a
//! [`NamedTempFile`] that lives as long as the [`ResolvedInput`]. Both paths
//! check the `%PDF` magic bytes first so callers get [`PdfSplitError::NotAPdf`]
//! rather than an opaque pdfium failure.

use crate::error::PdfSplitError;
use std::io::{Read, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

const PDF_MAGIC: &[u8; 4] = b"%PDF";

/// A PDF on disk, either the caller's file or a managed temp copy.
pub enum ResolvedInput {
    Local(PathBuf),
    /// Written from memory; deleted when dropped.
    Buffered(NamedTempFile),
}

impl ResolvedInput {
    pub fn path(&self) -> &Path {
        match self {
            ResolvedInput::Local(p) => p,
            ResolvedInput::Buffered(tmp) => tmp.path(),
        }
    }
}

fn magic_of(bytes: &[u8]) -> [u8; 4] {
    let mut magic = [0u8; 4];
    let n = bytes.len().min(4);
    magic[..n].copy_from_slice(&bytes[..n]);
    magic
}

/// Validate that `path` exists, is readable and starts with `%PDF`.
pub fn resolve_local(path: impl AsRef<Path>) -> Result<ResolvedInput, PdfSplitError> {
    let path = path.as_ref().to_path_buf();

    if !path.exists() {
        return Err(PdfSplitError::FileNotFound { path });
    }

    let mut file = match std::fs::File::open(&path) {
        Ok(f) => f,
        Err(e) if e.kind() == std::io::ErrorKind::PermissionDenied => {
            return Err(PdfSplitError::PermissionDenied { path });
        }
        Err(_) => return Err(PdfSplitError::FileNotFound { path }),
    };

    let mut head = Vec::with_capacity(4);
    Read::by_ref(&mut file)
        .take(4)
        .read_to_end(&mut head)
        .map_err(|e| PdfSplitError::Internal(format!("read {}: {e}", path.display())))?;
    if head.as_slice() != PDF_MAGIC {
        let magic = magic_of(&head);
        return Err(PdfSplitError::NotAPdf { path, magic });
    }

    debug!("Resolved local PDF: {}", path.display());
    Ok(ResolvedInput::Local(path))
}

/// Write an in-memory PDF to a managed temp file.
pub fn resolve_bytes(bytes: &[u8]) -> Result<ResolvedInput, PdfSplitError> {
    if !bytes.starts_with(PDF_MAGIC) {
        return Err(PdfSplitError::NotAPdf {
            path: PathBuf::from("<memory>"),
            magic: magic_of(bytes),
        });
    }

    let mut tmp = tempfile::Builder::new()
        .prefix("pdfsplit-")
        .suffix(".pdf")
        .tempfile()
        .map_err(|e| PdfSplitError::Internal(format!("tempfile: {e}")))?;
    tmp.write_all(bytes)
        .and_then(|_| tmp.flush())
        .map_err(|e| PdfSplitError::Internal(format!("tempfile write: {e}")))?;

    debug!("Buffered {} bytes to {}", bytes.len(), tmp.path().display());
    Ok(ResolvedInput::Buffered(tmp))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file() {
        let err = resolve_local("/definitely/not/here.pdf").err().unwrap();
        assert!(matches!(err, PdfSplitError::FileNotFound { .. }));
    }

    #[test]
    fn wrong_magic() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("fake.pdf");
        std::fs::write(&path, b"PK\x03\x04zip").unwrap();
        match resolve_local(&path).err().unwrap() {
            PdfSplitError::NotAPdf { magic, .. } => assert_eq!(&magic, b"PK\x03\x04"),
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn short_file_is_not_a_pdf() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("tiny.pdf");
        std::fs::write(&path, b"%P").unwrap();
        assert!(matches!(
            resolve_local(&path).err().unwrap(),
            PdfSplitError::NotAPdf { .. }
        ));
    }

    #[test]
    fn local_pdf_header_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ok.pdf");
        std::fs::write(&path, b"%PDF-1.7\n").unwrap();
        let resolved = resolve_local(&path).unwrap();
        assert_eq!(resolved.path(), path.as_path());
    }

    #[test]
    fn buffered_input_lives_until_dropped() {
        let resolved = resolve_bytes(b"%PDF-1.4\n%%EOF").unwrap();
        let path = resolved.path().to_path_buf();
        assert!(path.exists());
        assert_eq!(std::fs::read(&path).unwrap(), b"%PDF-1.4\n%%EOF");
        drop(resolved);
        assert!(!path.exists());
    }

    #[test]
    fn buffered_input_checks_magic() {
        let err = resolve_bytes(b"hello").err().unwrap();
        assert!(matches!(err, PdfSplitError::NotAPdf { .. }));
    }
}
