//! End-to-end pipeline: zip -> extract -> scan -> serve -> scrape -> encode.

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use zip::write::FileOptions;

use epub2post::error::Error;
use epub2post::pipeline;
use epub2post::services::{extract, llm, scan, scrape, server, tokenize};

fn build_epub(dir: &Path) -> PathBuf {
    let path = dir.join("book.epub");
    let mut writer = zip::ZipWriter::new(File::create(&path).unwrap());
    let options: FileOptions = FileOptions::default();

    writer.start_file("mimetype", options).unwrap();
    writer.write_all(b"application/epub+zip").unwrap();

    writer.add_directory("OEBPS", options).unwrap();
    writer.start_file("OEBPS/ch01.html", options).unwrap();
    writer
        .write_all(b"<html><head><title>ch01</title></head><body>Hello world</body></html>")
        .unwrap();

    writer.start_file("OEBPS/cover.jpg", options).unwrap();
    writer.write_all(b"\xff\xd8\xff").unwrap();

    writer.finish().unwrap();
    path
}

#[tokio::test]
async fn one_chapter_book_flows_through_to_token_report() {
    let tmp = tempfile::tempdir().unwrap();
    let epub = build_epub(tmp.path());
    let workdir = tmp.path().join("work");

    extract::extract(&epub, &workdir).unwrap();

    let chapters = scan::scan(&workdir).unwrap();
    assert_eq!(chapters.len(), 1);
    assert_eq!(chapters[0].name, "ch01.html");
    assert_eq!(chapters[0].route, "OEBPS/ch01.html");

    let (addr, _server) = server::start(workdir.clone(), chapters.clone(), 0)
        .await
        .unwrap();
    let client = reqwest::Client::new();
    server::probe(&client, addr).await;

    let url = format!("http://{addr}/{}", chapters[0].route);
    let subchapters = scrape::scrape(&client, &url).await.unwrap();
    let full_text = scrape::concatenate(&subchapters);
    assert_eq!(full_text, "Hello world");

    let rx = tokenize::spawn_encode(full_text.clone());
    let encoded = rx.await.unwrap().unwrap();
    assert_eq!(encoded.token_length, 2);
    // the reported length always describes the exact text handed onward
    assert_eq!(encoded.original_text, full_text);
}

#[tokio::test]
async fn chapter_names_needing_url_encoding_flow_through_scrape() {
    let tmp = tempfile::tempdir().unwrap();
    let workdir = tmp.path().join("work");
    std::fs::create_dir_all(workdir.join("OEBPS")).unwrap();
    std::fs::write(
        workdir.join("OEBPS/my 第1章.html"),
        "<html><body>Hello world</body></html>",
    )
    .unwrap();

    let chapters = scan::scan(&workdir).unwrap();
    assert_eq!(chapters.len(), 1);
    assert_eq!(chapters[0].route, "OEBPS/my 第1章.html");

    let (addr, _server) = server::start(workdir.clone(), chapters.clone(), 0)
        .await
        .unwrap();
    let client = reqwest::Client::new();

    // the URL parser percent-encodes the space and CJK bytes; the server
    // must still resolve the file on disk
    let url = format!("http://{addr}/{}", chapters[0].route);
    let subchapters = scrape::scrape(&client, &url).await.unwrap();
    assert_eq!(scrape::concatenate(&subchapters), "Hello world");
}

#[tokio::test]
async fn empty_chapter_never_reaches_the_generation_endpoint() {
    let tmp = tempfile::tempdir().unwrap();
    let workdir = tmp.path().join("work");
    std::fs::create_dir_all(&workdir).unwrap();
    std::fs::write(workdir.join("empty.html"), "<html><body></body></html>").unwrap();

    let chapters = scan::scan(&workdir).unwrap();
    let (addr, _server) = server::start(workdir.clone(), chapters.clone(), 0)
        .await
        .unwrap();

    // any connection to this listener means generation was attempted
    let canary = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let canary_addr = canary.local_addr().unwrap();
    let hits = Arc::new(AtomicUsize::new(0));
    let hits_bg = hits.clone();
    tokio::spawn(async move {
        loop {
            if canary.accept().await.is_ok() {
                hits_bg.fetch_add(1, Ordering::SeqCst);
            }
        }
    });

    let generator = llm::GenerationClient::new(
        format!("http://{canary_addr}/chat/completions"),
        "test-key",
        "test-model",
    );
    let client = reqwest::Client::new();
    let url = format!("http://{addr}/{}", chapters[0].route);
    let out_dir = tmp.path().join("out");

    let err = pipeline::convert_chapter(&client, &generator, &url, &out_dir)
        .await
        .unwrap_err();
    assert!(matches!(err, Error::EmptyChapter(_)));
    assert_eq!(hits.load(Ordering::SeqCst), 0);
    assert!(!out_dir.exists());
}
