//! Output filenames: `{base}-{first}-{last}{ext}`.
//!
//! `first` and `last` are the 1-based inclusive page numbers of the segment,
//! so a segment covering 0-based pages `[0, 2)` of `Contract.pdf` becomes
//! `Contract-1-2.pdf`. Collisions are not de-duplicated: distinct ascending
//! split points never produce two segments with the same range.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

static RANGE_SUFFIX: Lazy<Regex> = Lazy::new(|| {
    // Compile-time constant pattern.
    Regex::new(r"-(\d+)-(\d+)$").expect("valid range suffix regex")
});

/// The stem and extension every output filename of one split shares.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputNaming {
    pub base: String,
    /// Includes the leading dot, or is empty.
    pub extension: String,
}

impl OutputNaming {
    /// Filename for the half-open 0-based page range `[start_page, end_page)`.
    pub fn filename(&self, start_page: usize, end_page: usize) -> String {
        derive_filename(&self.base, start_page, end_page, &self.extension)
    }
}

/// Build `{base}-{start_page+1}-{end_page}{extension}`.
///
/// `start_page` is 0-based inclusive and `end_page` 0-based exclusive, which
/// is the same number as the 1-based inclusive last page.
pub fn derive_filename(base: &str, start_page: usize, end_page: usize, extension: &str) -> String {
    format!("{}-{}-{}{}", base, start_page + 1, end_page, extension)
}

/// Split a filename into its stem and its extension (with the dot).
///
/// Any directory components are dropped so a crafted upload name cannot
/// steer output files outside the output directory.
pub fn split_filename(name: &str) -> (String, Option<String>) {
    let path = Path::new(name);
    let stem = path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let ext = path
        .extension()
        .map(|e| format!(".{}", e.to_string_lossy()))
        .filter(|e| e.len() > 1);
    (stem, ext)
}

/// Pick the output stem and extension.
///
/// Stem priority: the explicitly supplied original filename, then the
/// filename previously bound to the session, then the source file's own
/// basename. The extension comes from whichever original filename supplied
/// the stem; the source basename never contributes one (it is usually a
/// temp file), so that case and extension-less names use `default_ext`.
pub fn resolve_naming(
    explicit: Option<&str>,
    bound: Option<&str>,
    source_path: &Path,
    default_ext: &str,
) -> OutputNaming {
    let original = explicit
        .filter(|s| !s.trim().is_empty())
        .or(bound.filter(|s| !s.trim().is_empty()));

    if let Some(name) = original {
        let (stem, ext) = split_filename(name);
        if !stem.is_empty() {
            return OutputNaming {
                base: stem,
                extension: ext.unwrap_or_else(|| default_ext.to_string()),
            };
        }
    }

    let base = source_path
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "document".to_string());

    OutputNaming {
        base,
        extension: default_ext.to_string(),
    }
}

/// Recover the 1-based inclusive page range from an output filename.
///
/// ```rust
/// use edgequake_pdfsplit::pipeline::naming::parse_range_suffix;
///
/// assert_eq!(parse_range_suffix("Contract-3-5.pdf"), Some((3, 5)));
/// assert_eq!(parse_range_suffix("notes.pdf"), None);
/// ```
pub fn parse_range_suffix(file_name: &str) -> Option<(usize, usize)> {
    let stem = Path::new(file_name).file_stem()?.to_str()?;
    let caps = RANGE_SUFFIX.captures(stem)?;
    let start = caps.get(1)?.as_str().parse().ok()?;
    let end = caps.get(2)?.as_str().parse().ok()?;
    Some((start, end))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn contract_first_two_pages() {
        assert_eq!(derive_filename("Contract", 0, 2, ".pdf"), "Contract-1-2.pdf");
    }

    #[test]
    fn single_page_segment() {
        assert_eq!(derive_filename("a", 4, 5, ".pdf"), "a-5-5.pdf");
    }

    #[test]
    fn split_filename_handles_missing_extension() {
        assert_eq!(split_filename("Contract"), ("Contract".to_string(), None));
        assert_eq!(
            split_filename("Escritura.final.PDF"),
            ("Escritura.final".to_string(), Some(".PDF".to_string()))
        );
    }

    #[test]
    fn split_filename_drops_directories() {
        assert_eq!(
            split_filename("../../etc/bundle.pdf"),
            ("bundle".to_string(), Some(".pdf".to_string()))
        );
    }

    #[test]
    fn explicit_name_wins() {
        let n = resolve_naming(
            Some("Lease.pdf"),
            Some("Bound.pdf"),
            Path::new("/tmp/tmpab12.pdf"),
            ".pdf",
        );
        assert_eq!(n.base, "Lease");
        assert_eq!(n.extension, ".pdf");
    }

    #[test]
    fn bound_name_used_when_no_explicit() {
        let n = resolve_naming(None, Some("Bound.PDF"), Path::new("/tmp/tmpab12.pdf"), ".pdf");
        assert_eq!(n.base, "Bound");
        assert_eq!(n.extension, ".PDF");
    }

    #[test]
    fn blank_explicit_name_is_ignored() {
        let n = resolve_naming(Some("  "), Some("Bound.pdf"), Path::new("/x/y.pdf"), ".pdf");
        assert_eq!(n.base, "Bound");
    }

    #[test]
    fn source_basename_is_last_resort() {
        let n = resolve_naming(None, None, Path::new("/tmp/upload_77.bin"), ".pdf");
        assert_eq!(n.base, "upload_77");
        assert_eq!(n.extension, ".pdf");
    }

    #[test]
    fn missing_extension_falls_back_to_default() {
        let n = resolve_naming(Some("Contract"), None, Path::new("/x/y.pdf"), ".pdf");
        assert_eq!(n.filename(0, 2), "Contract-1-2.pdf");
    }

    #[test]
    fn range_suffix_round_trips_through_filename() {
        let name = derive_filename("Deed-2019", 2, 5, ".pdf");
        assert_eq!(parse_range_suffix(&name), Some((3, 5)));
    }

    #[test]
    fn range_suffix_absent() {
        assert_eq!(parse_range_suffix("bundle.pdf"), None);
        assert_eq!(parse_range_suffix("bundle-3.pdf"), None);
    }
}
