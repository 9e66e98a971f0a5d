//! Chapter fetch and text flattening.

use scraper::{Html, Selector};
use tracing::{debug, info};

use crate::error::{Error, Result};
use crate::models::Subchapter;

/// Elements whose flattened text becomes the chapter body.
const BODY_SELECTOR: &str = "body";
/// Attribute some EPUB pipelines stamp on sections; used as the subchapter label.
const BOOKMARK_ATTR: &str = "data-pdf-bookmark";

/// Fetch one chapter over HTTP and flatten it into subchapters.
///
/// Fails with [`Error::EmptyChapter`] when the page yields no text at all,
/// short-circuiting the run before any tokenization or generation work.
pub async fn scrape(client: &reqwest::Client, url: &str) -> Result<Vec<Subchapter>> {
    info!("fetching {url}");
    let response = client
        .get(url)
        .send()
        .await
        .and_then(|r| r.error_for_status())
        .map_err(|e| Error::Fetch {
            url: url.to_string(),
            source: e,
        })?;
    let body = response.text().await.map_err(|e| Error::Fetch {
        url: url.to_string(),
        source: e,
    })?;

    let subchapters = extract_subchapters(&body, BODY_SELECTOR);
    let total: usize = subchapters.iter().map(|s| s.text.len()).sum();
    debug!("extracted {total} characters from {} element(s)", subchapters.len());
    if total == 0 {
        return Err(Error::EmptyChapter(url.to_string()));
    }
    Ok(subchapters)
}

/// Parse markup and return one `(label, text)` pair per element matching
/// `selector`, in document order. Text is the concatenation of the element's
/// text nodes exactly as the parser flattens them.
pub fn extract_subchapters(html: &str, selector: &str) -> Vec<Subchapter> {
    let selector = Selector::parse(selector).expect("selector is a fixed literal");
    let document = Html::parse_document(html);
    document
        .select(&selector)
        .map(|element| {
            let title = element.value().attr(BOOKMARK_ATTR).unwrap_or("output");
            let text: String = element.text().collect();
            Subchapter::new(title, text)
        })
        .collect()
}

/// Ordered concatenation of every subchapter's text.
pub fn concatenate(subchapters: &[Subchapter]) -> String {
    subchapters.iter().map(|s| s.text.as_str()).collect()
}
