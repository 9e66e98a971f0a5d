//! epub2post: turn one EPUB chapter into an AI-paraphrased Markdown blog post.
//!
//! The pipeline extracts the EPUB into a scratch directory, serves it over a
//! loopback HTTP server, scrapes the chosen chapter's visible text, reports
//! its token length, and hands the text to a chat-completion API for
//! paraphrasing.

pub mod error;
pub mod models;
pub mod pipeline;
pub mod services;
pub mod workdir;

pub use error::{Error, Result};
pub use models::{BlogPost, ChapterFile, EncodedResponse, Subchapter};
