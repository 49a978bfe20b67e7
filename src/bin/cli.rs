//! PDF Measure - calibrated measurements on PDF pages
//!
//! This is the CLI entry point for the pdf-measure tool.
//! Run with: cargo run --bin pdf-measure -- specimen.pdf

use std::env;
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use pdf_measure::{load_store, AppSettings, PageSource, PdfDocument, Session};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "pdf-measure")]
#[command(about = "Calibrated measurements on PDF pages: specimen rectangles, distances and particle displacements")]
struct Cli {
    /// PDF file to measure
    pdf_path: PathBuf,

    /// Rendering DPI for pixel coordinates
    #[arg(long)]
    dpi: Option<u32>,

    /// Directory for exported files
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Read commands from a file instead of stdin
    #[arg(long)]
    script: Option<PathBuf>,

    /// Resume from a previously saved JSON export
    #[arg(long)]
    load: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    // Load .env file if present (ignore errors if file doesn't exist)
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();

    // Flags override environment, environment overrides saved settings
    let settings = AppSettings::load();
    let mut options = settings.session_options();
    if let Some(dpi) = env::var("PDF_MEASURE_DPI").ok().and_then(|s| s.parse().ok()) {
        options = options.with_dpi(dpi);
    }
    if let Ok(dir) = env::var("PDF_MEASURE_OUTPUT_DIR") {
        options = options.with_output_dir(dir);
    }
    if let Some(dpi) = cli.dpi {
        options = options.with_dpi(dpi);
    }
    if let Some(dir) = cli.output_dir {
        options = options.with_output_dir(dir);
    }

    let document = PdfDocument::open(&cli.pdf_path)
        .with_context(|| format!("Failed to load {}", cli.pdf_path.display()))?;
    let stem = document.stem();

    let mut session = Session::new(document, stem, options)?;
    if let Some(path) = &cli.load {
        let store = load_store(path).with_context(|| format!("Failed to load {}", path.display()))?;
        session = session.with_store(store)?;
    }

    println!("{}\n", session.banner());

    match &cli.script {
        Some(path) => {
            let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
            run_script(&mut session, BufReader::new(file))
        }
        None => run_interactive(&mut session),
    }
}

/// Run commands from a script, one per line. `#` starts a comment.
fn run_script<D: PageSource>(session: &mut Session<D>, reader: impl BufRead) -> anyhow::Result<()> {
    for line in reader.lines() {
        let line = line?;
        let command = line.trim();
        if command.is_empty() || command.starts_with('#') {
            continue;
        }

        println!("> {}", command);
        let outcome = session.handle_line(command);
        if let Some(message) = &outcome.message {
            println!("{}", message);
        }
        if outcome.quit {
            break;
        }
    }
    Ok(())
}

fn run_interactive<D: PageSource>(session: &mut Session<D>) -> anyhow::Result<()> {
    println!("Type 'h' for help, 'q' to quit.\n");

    let stdin = io::stdin();
    loop {
        print!("[page {}] > ", session.page() + 1);
        io::stdout().flush()?;

        let mut line = String::new();
        if stdin.lock().read_line(&mut line)? == 0 {
            break;
        }
        if line.trim().is_empty() {
            continue;
        }

        let outcome = session.handle_line(&line);
        match (&outcome.message, outcome.success) {
            (Some(message), true) => println!("{}", message),
            (Some(message), false) => println!("! {}", message),
            (None, _) => {}
        }
        if outcome.quit {
            break;
        }
    }

    println!("\n{}", session.status_line());
    Ok(())
}
