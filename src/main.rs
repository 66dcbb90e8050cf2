//! mobidoc - MOBI/PalmDOC e-book inspector

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::Level;
use tracing_subscriber::EnvFilter;

use mobidoc::{Document, is_mobi_file, parse_mobi};

#[derive(Parser)]
#[command(name = "mobidoc")]
#[command(version, about = "Decode MOBI/PalmDOC e-books", long_about = None)]
#[command(after_help = "EXAMPLES:
    mobidoc book.mobi              Show metadata and chapter titles
    mobidoc --info book.mobi       Also show header diagnostics
    mobidoc --chapter 3 book.mobi  Print the plain text of chapter 3
    mobidoc --json book.mobi       Dump the decoded document as JSON")]
struct Cli {
    /// Input file (MOBI, PRC or PalmDOC)
    #[arg(value_name = "FILE")]
    input: PathBuf,

    /// Show header diagnostics
    #[arg(short, long)]
    info: bool,

    /// Print the whole document as JSON
    #[arg(short, long, conflicts_with_all = ["info", "chapter", "check"])]
    json: bool,

    /// Print the plain text of chapter N (1-based)
    #[arg(short, long, value_name = "N")]
    chapter: Option<usize>,

    /// Only check the file signature; exit status 0 if it looks like MOBI
    #[arg(long)]
    check: bool,

    /// Increase log verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive(level.into()))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match run(&cli) {
        Ok(code) => code,
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<ExitCode, String> {
    let data = std::fs::read(&cli.input)
        .map_err(|e| format!("cannot read {}: {e}", cli.input.display()))?;

    if cli.check {
        return Ok(if is_mobi_file(&data) {
            ExitCode::SUCCESS
        } else {
            ExitCode::FAILURE
        });
    }

    let doc = parse_mobi(&data).map_err(|e| e.to_string())?;

    if cli.json {
        let json = serde_json::to_string_pretty(&doc).map_err(|e| e.to_string())?;
        println!("{json}");
        return Ok(ExitCode::SUCCESS);
    }

    if let Some(n) = cli.chapter {
        let chapter = n
            .checked_sub(1)
            .and_then(|i| doc.chapters.get(i))
            .ok_or_else(|| format!("no chapter {n} (book has {})", doc.chapters.len()))?;
        println!("{}", chapter.plain_text);
        return Ok(ExitCode::SUCCESS);
    }

    show_summary(cli, &doc);
    Ok(ExitCode::SUCCESS)
}

fn show_summary(cli: &Cli, doc: &Document) {
    let meta = &doc.metadata;
    println!("File: {}", cli.input.display());
    println!("Title: {}", meta.title);
    println!("Author: {}", meta.author);
    println!("Language: {}", meta.language);
    if !meta.publisher.is_empty() {
        println!("Publisher: {}", meta.publisher);
    }
    if !meta.isbn.is_empty() {
        println!("ISBN: {}", meta.isbn);
    }
    if !meta.description.is_empty() {
        let desc = meta.description.trim();
        match desc.char_indices().nth(200) {
            Some((cut, _)) => println!("Description: {}...", &desc[..cut]),
            None => println!("Description: {desc}"),
        }
    }

    if cli.info {
        let info = &doc.info;
        println!();
        println!("Container: {:?}", info.container_name);
        println!("Records: {}", info.record_count);
        println!("Compression: {:?}", info.compression);
        println!(
            "Text: {} bytes in {} records of {}",
            info.text_length, info.text_record_count, info.text_record_size
        );
        println!("Encryption: {}", info.encryption);
        if info.has_mobi_header {
            println!("MOBI type: {}", info.mobi_type);
            println!("Encoding: {:?}", info.encoding);
            println!("First image record: {}", info.first_image_index);
            println!("EXTH flags: {:#x}", info.exth_flags);
        } else {
            println!("MOBI header: absent");
        }
        println!("Markup: {} bytes, CSS: {} bytes", doc.raw_markup.len(), doc.css.len());
    }

    println!();
    println!("Chapters: {}", doc.chapters.len());
    for (i, chapter) in doc.chapters.iter().enumerate() {
        println!("  {:>3}. {}", i + 1, chapter.title);
    }
}
