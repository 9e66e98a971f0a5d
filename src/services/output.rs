//! Markdown persistence for the generated post.

use std::io::Write;
use std::path::{Path, PathBuf};

use regex::Regex;
use tracing::info;

use crate::error::Result;
use crate::models::BlogPost;

/// Write the post's content verbatim to `<dir>/<title>.md`, creating the
/// directory if needed. Returns the written path.
pub fn save_markdown(dir: &Path, post: &BlogPost) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.md", sanitize_title(&post.title)));
    let mut file = std::fs::File::create(&path)?;
    file.write_all(post.content.as_bytes())?;
    info!("saved at: {}", path.display());
    Ok(path)
}

/// Reduce a generated title to a safe file stem. Anything outside
/// `[A-Za-z0-9 ._-]` is dropped; an empty result falls back to "untitled".
fn sanitize_title(title: &str) -> String {
    let re = Regex::new(r"[^A-Za-z0-9 ._-]").expect("pattern is a fixed literal");
    let cleaned = re.replace_all(title, "").trim().to_string();
    if cleaned.is_empty() {
        "untitled".to_string()
    } else {
        cleaned
    }
}
