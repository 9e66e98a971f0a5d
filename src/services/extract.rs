//! EPUB (ZIP) extraction into the working directory.

use std::fs::File;
use std::io;
use std::path::Path;

use tracing::{debug, warn};
use zip::ZipArchive;

use crate::error::{Error, Result};

/// Unpack every entry of the archive under `target_dir`, recreating the
/// archive's relative layout. Returns the number of file entries written.
///
/// `target_dir` is created if absent. A failure partway through leaves the
/// partial extraction in place; the caller's lifecycle handling removes it.
pub fn extract(archive_path: &Path, target_dir: &Path) -> Result<usize> {
    std::fs::create_dir_all(target_dir)?;

    let file = File::open(archive_path).map_err(|e| Error::ArchiveOpen {
        path: archive_path.to_path_buf(),
        source: zip::result::ZipError::Io(e),
    })?;
    let mut archive = ZipArchive::new(file).map_err(|e| Error::ArchiveOpen {
        path: archive_path.to_path_buf(),
        source: e,
    })?;

    let mut written = 0;
    for i in 0..archive.len() {
        let mut entry = archive.by_index(i).map_err(|e| Error::ArchiveOpen {
            path: archive_path.to_path_buf(),
            source: e,
        })?;

        // Entries with absolute or parent-escaping names must not land
        // outside the working directory.
        let Some(relative) = entry.enclosed_name().map(Path::to_path_buf) else {
            warn!("skipping unsafe archive entry {:?}", entry.name());
            continue;
        };
        let out_path = target_dir.join(&relative);

        if entry.is_dir() {
            std::fs::create_dir_all(&out_path)?;
            continue;
        }
        if let Some(parent) = out_path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let mut out = File::create(&out_path)?;
        io::copy(&mut entry, &mut out)?;
        debug!("extracted {}", relative.display());
        written += 1;
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::FileOptions;

    fn make_archive(dir: &Path, entries: &[(&str, &str)]) -> std::path::PathBuf {
        let path = dir.join("book.epub");
        let mut writer = zip::ZipWriter::new(File::create(&path).unwrap());
        let options: FileOptions = FileOptions::default();
        for (name, body) in entries {
            if name.ends_with('/') {
                writer.add_directory(name.trim_end_matches('/'), options).unwrap();
            } else {
                writer.start_file(*name, options).unwrap();
                writer.write_all(body.as_bytes()).unwrap();
            }
        }
        writer.finish().unwrap();
        path
    }

    #[test]
    fn extracts_nested_entries_verbatim() {
        let tmp = tempfile::tempdir().unwrap();
        let archive = make_archive(
            tmp.path(),
            &[
                ("mimetype", "application/epub+zip"),
                ("OEBPS/", ""),
                ("OEBPS/ch01.html", "<html><body>Hello world</body></html>"),
                ("OEBPS/styles/base.css", "body { margin: 0 }"),
            ],
        );

        let target = tmp.path().join("out");
        let written = extract(&archive, &target).unwrap();
        assert_eq!(written, 3);

        let body = std::fs::read_to_string(target.join("OEBPS/ch01.html")).unwrap();
        assert_eq!(body, "<html><body>Hello world</body></html>");
        assert!(target.join("OEBPS/styles/base.css").is_file());
    }

    #[test]
    fn rejects_non_zip_input() {
        let tmp = tempfile::tempdir().unwrap();
        let bogus = tmp.path().join("not-a.epub");
        std::fs::write(&bogus, "plain text, no zip magic").unwrap();

        let err = extract(&bogus, &tmp.path().join("out")).unwrap_err();
        assert!(matches!(err, Error::ArchiveOpen { .. }));
    }

    #[test]
    fn creates_missing_target_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let archive = make_archive(tmp.path(), &[("a.html", "x")]);
        let target = tmp.path().join("deep/nested/out");
        extract(&archive, &target).unwrap();
        assert!(target.join("a.html").is_file());
    }
}
