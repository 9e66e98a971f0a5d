use std::path::PathBuf;

use thiserror::Error;

/// Errors a conversion run can die with.
#[derive(Debug, Error)]
pub enum Error {
    /// The input file is not a readable ZIP container
    #[error("cannot open archive {path}: {source}")]
    ArchiveOpen {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    /// Filesystem failures during extraction or output
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Directory walk could not be completed
    #[error("walk failed: {0}")]
    Walk(#[from] walkdir::Error),

    /// The chapter fetch came back with a network or HTTP failure
    #[error("fetch of {url} failed: {source}")]
    Fetch {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    /// The selected chapter produced no text at all
    #[error("chapter {0} contains no extractable text")]
    EmptyChapter(String),

    /// The BPE vocabulary could not be loaded
    #[error("tokenizer unavailable: {0}")]
    TokenizerUnavailable(String),

    /// The generation API call failed or returned something unparseable
    #[error("generation failed: {0}")]
    Generation(String),

    /// Chapter selection could not be resolved from console input
    #[error("invalid chapter selection: {0}")]
    UserInput(String),
}

pub type Result<T> = std::result::Result<T, Error>;
