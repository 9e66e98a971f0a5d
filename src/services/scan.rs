//! Chapter-file discovery in the extracted tree.

use std::path::Path;

use walkdir::WalkDir;

use crate::error::Result;
use crate::models::ChapterFile;

/// Extensions treated as chapter markup, compared lower-cased.
const MARKUP_EXTENSIONS: [&str; 4] = ["html", "htm", "xhtml", "xhtm"];

/// Recursively collect markup files under `root`, ordered by file name at
/// every directory level so repeated scans of an unchanged tree yield the
/// same sequence. The first walk error aborts the scan.
pub fn scan(root: &Path) -> Result<Vec<ChapterFile>> {
    let mut chapters = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() {
            continue;
        }
        let matches = entry
            .path()
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| MARKUP_EXTENSIONS.contains(&e.to_ascii_lowercase().as_str()))
            .unwrap_or(false);
        if !matches {
            continue;
        }

        let route = entry
            .path()
            .strip_prefix(root)
            .unwrap_or(entry.path())
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");
        let name = entry.file_name().to_string_lossy().into_owned();
        chapters.push(ChapterFile {
            path: entry.path().to_path_buf(),
            route,
            name,
        });
    }
    Ok(chapters)
}
