//! Export page discovery and reading.
//!
//! Telegram splits long histories into `messages.html`, `messages2.html`,
//! ..., `messages10.html`. Pages are concatenated in that natural order
//! before parsing, so message order across pages is preserved.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{ChatvaultError, Result};

/// File extensions accepted as export pages.
pub const HTML_EXTENSIONS: &[&str] = &["html", "htm"];

/// Stem prefix of Telegram Desktop message pages.
const PAGE_PREFIX: &str = "messages";

/// Returns `true` if `path` has an HTML extension (case-insensitive).
pub fn is_html_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| HTML_EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e)))
}

/// Natural sort key: `messages10` sorts after `messages2`; an unnumbered page comes first.
fn page_key(path: &Path) -> (String, u64) {
    let stem = path
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_lowercase();
    let split = stem.trim_end_matches(|c: char| c.is_ascii_digit()).len();
    let number = stem[split..].parse().unwrap_or(0);
    (stem[..split].to_string(), number)
}

/// Lists the export pages in `dir`, in page order.
///
/// When `messages*.html` pages are present only those are returned; other
/// HTML files in the directory (indexes, lists) are ignored.
pub fn discover_pages(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut pages: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && is_html_file(path))
        .collect();

    if pages.iter().any(|p| page_key(p).0 == PAGE_PREFIX) {
        pages.retain(|p| page_key(p).0 == PAGE_PREFIX);
    }
    pages.sort_by_key(|p| page_key(p));

    if pages.is_empty() {
        return Err(ChatvaultError::invalid_input(
            "no HTML export pages found",
            Some(dir.to_path_buf()),
        ));
    }
    tracing::debug!(dir = %dir.display(), pages = pages.len(), "discovered export pages");
    Ok(pages)
}

/// Resolves command-line inputs into the ordered list of pages to read.
///
/// Either a single directory (pages are discovered) or one or more HTML
/// files, kept in the order given.
pub fn resolve_inputs(inputs: &[PathBuf]) -> Result<Vec<PathBuf>> {
    match inputs {
        [] => Err(ChatvaultError::invalid_input("no input given", None)),
        [dir] if dir.is_dir() => discover_pages(dir),
        files => files
            .iter()
            .map(|path| {
                if path.is_dir() {
                    Err(ChatvaultError::invalid_input(
                        "directories cannot be mixed with page files",
                        Some(path.clone()),
                    ))
                } else if !path.exists() {
                    Err(ChatvaultError::invalid_input("file does not exist", Some(path.clone())))
                } else if !is_html_file(path) {
                    Err(ChatvaultError::invalid_input(
                        "not an HTML export page (expected .html or .htm)",
                        Some(path.clone()),
                    ))
                } else {
                    Ok(path.clone())
                }
            })
            .collect(),
    }
}

/// Reads and concatenates pages in order.
pub fn read_pages(pages: &[PathBuf]) -> Result<Vec<u8>> {
    let mut html = Vec::new();
    for page in pages {
        let bytes = fs::read(page)?;
        tracing::debug!(page = %page.display(), bytes = bytes.len(), "read export page");
        if !html.is_empty() {
            html.push(b'\n');
        }
        html.extend_from_slice(&bytes);
    }
    Ok(html)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn touch(dir: &Path, name: &str, contents: &str) -> PathBuf {
        let path = dir.join(name);
        fs::write(&path, contents).unwrap();
        path
    }

    fn names(paths: &[PathBuf]) -> Vec<String> {
        paths
            .iter()
            .map(|p| p.file_name().unwrap().to_string_lossy().into_owned())
            .collect()
    }

    #[test]
    fn test_natural_page_order() {
        let dir = TempDir::new().unwrap();
        for name in ["messages10.html", "messages2.html", "messages.html", "messages3.html"] {
            touch(dir.path(), name, "<p></p>");
        }
        touch(dir.path(), "style.css", "");

        let pages = discover_pages(dir.path()).unwrap();
        assert_eq!(
            names(&pages),
            ["messages.html", "messages2.html", "messages3.html", "messages10.html"]
        );
    }

    #[test]
    fn test_non_page_html_ignored_when_pages_exist() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "messages.html", "");
        touch(dir.path(), "export_results.html", "");
        assert_eq!(names(&discover_pages(dir.path()).unwrap()), ["messages.html"]);
    }

    #[test]
    fn test_any_html_without_pages() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "archive.HTM", "");
        assert_eq!(names(&discover_pages(dir.path()).unwrap()), ["archive.HTM"]);
    }

    #[test]
    fn test_empty_dir_is_invalid_input() {
        let dir = TempDir::new().unwrap();
        assert!(discover_pages(dir.path()).unwrap_err().is_invalid_input());
    }

    #[test]
    fn test_resolve_inputs_rejects_wrong_extension() {
        let dir = TempDir::new().unwrap();
        let json = touch(dir.path(), "result.json", "{}");
        let err = resolve_inputs(&[json]).unwrap_err();
        assert!(err.is_invalid_input());
        assert!(err.to_string().contains("result.json"));
    }

    #[test]
    fn test_resolve_inputs_keeps_argument_order() {
        let dir = TempDir::new().unwrap();
        let b = touch(dir.path(), "b.html", "");
        let a = touch(dir.path(), "a.html", "");
        assert_eq!(names(&resolve_inputs(&[b, a]).unwrap()), ["b.html", "a.html"]);
    }

    #[test]
    fn test_resolve_missing_file() {
        let err = resolve_inputs(&[PathBuf::from("/nonexistent/messages.html")]).unwrap_err();
        assert!(err.is_invalid_input());
    }

    #[test]
    fn test_read_pages_concatenates() {
        let dir = TempDir::new().unwrap();
        let one = touch(dir.path(), "messages.html", "<p>1</p>");
        let two = touch(dir.path(), "messages2.html", "<p>2</p>");
        let html = read_pages(&[one, two]).unwrap();
        assert_eq!(html, b"<p>1</p>\n<p>2</p>");
    }
}
