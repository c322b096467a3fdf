//! pdfium-backed document source.
//!
//! `pdfium-render` ties every [`PdfDocument`] to the [`Pdfium`] instance that
//! loaded it, so callers bind the library once with [`bind_pdfium`] and open
//! documents against it:
//!
//! ```rust,no_run
//! use edgequake_pdfsplit::pdfium::{bind_pdfium, PdfiumSource};
//!
//! # fn main() -> Result<(), edgequake_pdfsplit::PdfSplitError> {
//! let pdfium = bind_pdfium()?;
//! let source = PdfiumSource::open(&pdfium, "bundle.pdf".as_ref(), None)?;
//! println!("{} pages", source.page_count());
//! # Ok(())
//! # }
//! ```
//!
//! pdfium is blocking and CPU-bound; async callers go through
//! [`crate::split::scan_file_async`] and [`crate::split::split_file_async`],
//! which run on `spawn_blocking`.

use crate::error::PdfSplitError;
use crate::pipeline::render::PageRasterizer;
use crate::pipeline::segment::SegmentBackend;
use image::DynamicImage;
use pdfium_render::prelude::*;
use std::ops::Range;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Environment variable naming a directory that holds the pdfium library.
pub const PDFIUM_LIB_PATH_ENV: &str = "PDFIUM_LIB_PATH";

/// Bind to the pdfium shared library.
///
/// Search order: the directory in `PDFIUM_LIB_PATH`, the working directory,
/// then the system library path.
pub fn bind_pdfium() -> Result<Pdfium, PdfSplitError> {
    let from_env = std::env::var(PDFIUM_LIB_PATH_ENV).ok().map(|dir| {
        debug!("Binding pdfium from {}={}", PDFIUM_LIB_PATH_ENV, dir);
        Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path(&dir))
    });

    let bindings = match from_env {
        Some(Ok(bindings)) => Ok(bindings),
        _ => Pdfium::bind_to_library(Pdfium::pdfium_platform_library_name_at_path("./"))
            .or_else(|_| Pdfium::bind_to_system_library()),
    }
    .map_err(|e| PdfSplitError::PdfiumBindingFailed(format!("{e:?}")))?;

    Ok(Pdfium::new(bindings))
}

/// An open source document.
pub struct PdfiumSource<'a> {
    pdfium: &'a Pdfium,
    document: PdfDocument<'a>,
    path: PathBuf,
    byte_len: u64,
    page_count: usize,
}

impl<'a> PdfiumSource<'a> {
    /// Open `path`, decrypting with `password` if given.
    pub fn open(
        pdfium: &'a Pdfium,
        path: &Path,
        password: Option<&'a str>,
    ) -> Result<Self, PdfSplitError> {
        let byte_len = std::fs::metadata(path)
            .map_err(|_| PdfSplitError::FileNotFound {
                path: path.to_path_buf(),
            })?
            .len();

        let document = pdfium
            .load_pdf_from_file(path, password)
            .map_err(|e| load_error(path, password, e))?;

        let page_count = document.pages().len() as usize;
        info!(
            "Opened {}: {} pages, {} bytes",
            path.display(),
            page_count,
            byte_len
        );

        Ok(Self {
            pdfium,
            document,
            path: path.to_path_buf(),
            byte_len,
            page_count,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn byte_len(&self) -> u64 {
        self.byte_len
    }

    pub fn page_count(&self) -> usize {
        self.page_count
    }
}

fn load_error(path: &Path, password: Option<&str>, e: PdfiumError) -> PdfSplitError {
    let detail = format!("{e:?}");
    if detail.contains("Password") || detail.contains("password") {
        if password.is_some() {
            PdfSplitError::WrongPassword {
                path: path.to_path_buf(),
            }
        } else {
            PdfSplitError::PasswordRequired {
                path: path.to_path_buf(),
            }
        }
    } else {
        PdfSplitError::CorruptPdf {
            path: path.to_path_buf(),
            detail,
        }
    }
}

fn page_index(index: usize) -> Result<PdfPageIndex, String> {
    PdfPageIndex::try_from(index).map_err(|_| format!("page index {index} exceeds pdfium's limit"))
}

impl PageRasterizer for PdfiumSource<'_> {
    fn page_count(&self) -> usize {
        self.page_count
    }

    fn rasterize(&self, page_index_0: usize, zoom: f32) -> Result<DynamicImage, String> {
        let page = self
            .document
            .pages()
            .get(page_index(page_index_0)?)
            .map_err(|e| format!("{e:?}"))?;
        let bitmap = page
            .render_with_config(&PdfRenderConfig::new().scale_page_by_factor(zoom))
            .map_err(|e| format!("{e:?}"))?;
        Ok(bitmap.as_image())
    }
}

impl<'a> SegmentBackend for PdfiumSource<'a> {
    type Output = PdfDocument<'a>;

    fn page_count(&self) -> usize {
        self.page_count
    }

    fn source_len(&self) -> u64 {
        self.byte_len
    }

    fn source_path(&self) -> &Path {
        &self.path
    }

    fn create_output(&self) -> Result<Self::Output, String> {
        self.pdfium.create_new_pdf().map_err(|e| format!("{e:?}"))
    }

    fn copy_pages(&self, out: &mut Self::Output, pages: Range<usize>) -> Result<(), String> {
        if pages.is_empty() {
            return Ok(());
        }
        let first = page_index(pages.start)?;
        let last = page_index(pages.end - 1)?;
        let at = out.pages().len();
        out.pages_mut()
            .copy_page_range_from_document(&self.document, first..=last, at)
            .map_err(|e| format!("{e:?}"))
    }

    fn save(&self, out: Self::Output, path: &Path) -> Result<(), String> {
        out.save_to_file(path).map_err(|e| format!("{e:?}"))
    }
}
