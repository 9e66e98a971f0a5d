use std::io::BufRead;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use epub2post::error::Error;
use epub2post::models::ChapterFile;
use epub2post::pipeline;
use epub2post::services::{extract, llm, scan, server};
use epub2post::workdir::{self, WorkDir};

const SELECTION_ATTEMPTS: u32 = 3;

/// Convert one chapter of an EPUB into an AI-paraphrased Markdown blog post.
#[derive(Parser, Debug)]
#[command(name = "epub2post", version)]
struct Args {
    /// Path to the EPUB file, ex: book.epub
    book: Option<PathBuf>,

    /// Port for the local content server
    #[arg(short, long, default_value_t = 8000)]
    port: u16,

    /// Directory the generated Markdown is written to
    #[arg(short, long, default_value = "output")]
    output: PathBuf,
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "epub2post=info,tower_http=warn".into()),
        )
        .init();

    let args = Args::parse();
    let Some(book) = args.book.clone() else {
        eprintln!("Usage: epub2post <book.epub>");
        eprintln!("Optional custom port: epub2post <book.epub> --port <portnumber>");
        std::process::exit(1);
    };

    let workdir = match WorkDir::create() {
        Ok(w) => w,
        Err(e) => {
            error!("could not create working directory: {e}");
            std::process::exit(1);
        }
    };
    let _watcher = workdir::spawn_signal_watcher(&workdir);

    let outcome = run(&args, &book, &workdir).await;
    workdir.cleanup();
    if let Err(e) = outcome {
        error!("{e:#}");
        std::process::exit(1);
    }
}

async fn run(args: &Args, book: &PathBuf, workdir: &WorkDir) -> anyhow::Result<()> {
    // Fail before extraction if the credential is missing.
    let generator = llm::GenerationClient::from_env()?;

    let written = extract::extract(book, workdir.path())
        .with_context(|| format!("extracting {}", book.display()))?;
    info!("extracted {written} file(s)");

    let chapters = scan::scan(workdir.path())?;
    if chapters.is_empty() {
        anyhow::bail!("no markup files found in {}", book.display());
    }

    let (addr, _server) =
        server::start(workdir.path().to_path_buf(), chapters.clone(), args.port).await?;
    let client = reqwest::Client::new();
    server::probe(&client, addr).await;

    let chosen = prompt_selection(&chapters).await?;
    let url = format!("http://{addr}/{}", chosen.route);
    let path = pipeline::convert_chapter(&client, &generator, &url, &args.output).await?;
    println!("saved at: {}", path.display());
    Ok(())
}

/// Print the chapter list and resolve one line of console input into a
/// chapter. Bad input gets a fresh prompt instead of a silent default;
/// three strikes and the run fails.
async fn prompt_selection(chapters: &[ChapterFile]) -> Result<&ChapterFile, Error> {
    for (i, chapter) in chapters.iter().enumerate() {
        println!("{}: {}", i + 1, chapter.name);
    }
    for _ in 0..SELECTION_ATTEMPTS {
        println!("choose a chapter based on number");
        let line = tokio::task::spawn_blocking(|| {
            let mut line = String::new();
            std::io::stdin().lock().read_line(&mut line).map(|_| line)
        })
        .await
        .map_err(|e| Error::UserInput(e.to_string()))??;

        match line.trim().parse::<usize>() {
            Ok(n) if (1..=chapters.len()).contains(&n) => return Ok(&chapters[n - 1]),
            Ok(n) => println!("{n} is out of range, pick 1..={}", chapters.len()),
            Err(_) => println!("that was not a number"),
        }
    }
    Err(Error::UserInput(format!(
        "no valid chapter number after {SELECTION_ATTEMPTS} attempts"
    )))
}
