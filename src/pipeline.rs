//! Post-selection pipeline: fetch the chapter, measure it, generate, persist.

use std::path::{Path, PathBuf};

use tracing::info;

use crate::error::{Error, Result};
use crate::services::llm::GenerationClient;
use crate::services::{output, scrape, tokenize};

/// Drive one selected chapter through scrape -> tokenize -> generate -> save
/// and return the written Markdown path.
///
/// An empty chapter fails here before the tokenizer or the generation API
/// are touched; the token count is consumed before the generation call goes
/// out and always describes the exact text sent.
pub async fn convert_chapter(
    http: &reqwest::Client,
    generator: &GenerationClient,
    url: &str,
    output_dir: &Path,
) -> Result<PathBuf> {
    let subchapters = scrape::scrape(http, url).await?;
    let full_text = scrape::concatenate(&subchapters);

    // Tokenize in the background while the pipeline logs its bookkeeping.
    let encoded_rx = tokenize::spawn_encode(full_text);
    info!("{url} flattened into {} subchapter(s)", subchapters.len());
    let encoded = encoded_rx
        .await
        .map_err(|_| Error::TokenizerUnavailable("encode task vanished".to_string()))??;
    println!("Original token length is: {}", encoded.token_length);

    let post = generator.generate(&encoded.original_text).await?;
    output::save_markdown(output_dir, &post)
}
