//! Ephemeral HTTP server for the extracted book.
//!
//! Serves every file under the working directory at its relative path, plus
//! an index page of chapter links, so the scraper can fetch a chapter the
//! same way a browser would. Lives for the rest of the process; shut down
//! implicitly at exit.

use std::net::SocketAddr;
use std::path::{Component, PathBuf};
use std::sync::Arc;

use axum::{
    Router,
    extract::State,
    response::{Html, IntoResponse, Response},
    routing::get,
};
use http::{StatusCode, Uri, header};
use percent_encoding::percent_decode_str;
use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::error::Result;
use crate::models::ChapterFile;

struct ServeState {
    root: PathBuf,
    chapters: Vec<ChapterFile>,
}

/// Bind `127.0.0.1:<port>` and serve the tree in a background task.
///
/// The listener is bound before this returns, so the server is reachable by
/// the time the caller moves on; the readiness [`probe`] is belt and braces.
pub async fn start(
    root: PathBuf,
    chapters: Vec<ChapterFile>,
    port: u16,
) -> Result<(SocketAddr, JoinHandle<()>)> {
    let state = Arc::new(ServeState { root, chapters });
    let app = Router::new()
        .route("/", get(index))
        .fallback(serve_file)
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], port))).await?;
    let addr = listener.local_addr()?;
    info!("serving extracted book on http://{addr}");

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            warn!("content server stopped: {e}");
        }
    });
    Ok((addr, handle))
}

/// One best-effort GET against the index. A failure is logged and tolerated;
/// the listener may still become ready a moment later.
pub async fn probe(client: &reqwest::Client, addr: SocketAddr) {
    match client.get(format!("http://{addr}/")).send().await {
        Ok(_) => info!("content server ready on {addr}"),
        Err(e) => warn!("readiness probe failed (continuing): {e}"),
    }
}

async fn index(State(state): State<Arc<ServeState>>) -> Html<String> {
    let mut links = String::new();
    for chapter in &state.chapters {
        links.push_str(&format!(
            "<a href=\"/{}\">{}</a> <br>\n",
            html_escape::encode_double_quoted_attribute(&chapter.route),
            html_escape::encode_text(&chapter.name),
        ));
    }
    Html(format!(
        "<!DOCTYPE html>\n<html>\n<head><title>epub2post</title></head>\n<body>\n<h1>Chapters</h1>\n{links}</body>\n</html>\n"
    ))
}

async fn serve_file(State(state): State<Arc<ServeState>>, uri: Uri) -> Response {
    // Clients percent-encode spaces and non-ASCII file names; decode before
    // touching the filesystem so such chapters resolve.
    let Ok(decoded) = percent_decode_str(uri.path()).decode_utf8() else {
        return StatusCode::NOT_FOUND.into_response();
    };
    let relative = decoded.trim_start_matches('/');
    let candidate = PathBuf::from(relative);
    let escapes = candidate
        .components()
        .any(|c| !matches!(c, Component::Normal(_)));
    if relative.is_empty() || escapes {
        return StatusCode::NOT_FOUND.into_response();
    }

    let full = state.root.join(&candidate);
    match tokio::fs::read(&full).await {
        Ok(bytes) => {
            let ext = full
                .extension()
                .and_then(|e| e.to_str())
                .map(str::to_ascii_lowercase)
                .unwrap_or_default();
            ([(header::CONTENT_TYPE, content_type_for(&ext))], bytes).into_response()
        }
        Err(_) => StatusCode::NOT_FOUND.into_response(),
    }
}

/// Content type by extension. XHTML must be declared as XML so the scraping
/// client parses it in the right mode.
fn content_type_for(ext: &str) -> &'static str {
    match ext {
        "html" | "htm" => "text/html; charset=utf-8",
        "xhtml" | "xhtm" => "application/xhtml+xml",
        "css" => "text/css",
        "xml" | "opf" | "ncx" => "application/xml",
        "js" => "text/javascript",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}
