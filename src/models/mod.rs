use std::path::PathBuf;

use serde::Deserialize;

/// A markup file discovered inside the extracted book.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterFile {
    /// Absolute location on disk
    pub path: PathBuf,
    /// Slash-separated path relative to the served root; doubles as the URL route
    pub route: String,
    /// Final path segment, shown in the selection list
    pub name: String,
}

/// One extracted unit of chapter text, in document order.
#[derive(Debug, Clone)]
pub struct Subchapter {
    pub title: String,
    pub text: String,
}

impl Subchapter {
    pub fn new(title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            text: text.into(),
        }
    }
}

/// Result of running the BPE over the assembled chapter text.
#[derive(Debug, Clone)]
pub struct EncodedResponse {
    pub original_text: String,
    pub encoded_text: Vec<usize>,
    pub token_length: usize,
}

/// The structured reply expected back from the generation API.
#[derive(Debug, Clone, Deserialize)]
pub struct BlogPost {
    pub title: String,
    pub content: String,
}
