use anyhow::Context;
use clap::{Parser, Subcommand};
use shelfmate::catalog::BookRecord;
use shelfmate::engine::Engine;
use shelfmate::query::parse_query;
use std::fs::File;
use std::io::{BufRead, BufReader, Read};

#[derive(Parser)]
#[command(version, about)]
struct Cli {
    #[command(subcommand)]
    cmd: Cmd,
}

#[derive(Subcommand)]
enum Cmd {
    /// Load a JSON (array) or JSONL catalog, train, optionally start a REPL
    Ingest {
        path: String,
        /// Start interactive REPL after training
        #[arg(long)]
        repl: bool,
    },
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();
    match cli.cmd {
        Cmd::Ingest { path, repl } => run_ingest(path, repl)?,
    }
    Ok(())
}

fn init_tracing() {
    use tracing_subscriber::{fmt, EnvFilter};
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .try_init();
}

fn read_records(path: &str) -> anyhow::Result<Vec<BookRecord>> {
    let mut br = BufReader::new(File::open(path).with_context(|| format!("open {path}"))?);
    let starts_with_array = br
        .fill_buf()?
        .iter()
        .find(|b| !b.is_ascii_whitespace())
        .is_some_and(|&b| b == b'[');

    if starts_with_array {
        let mut buf = String::new();
        br.read_to_string(&mut buf)?;
        return serde_json::from_str(&buf).context("parse catalog array");
    }

    let mut out = Vec::new();
    for (n, line) in br.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let rec = serde_json::from_str(&line).with_context(|| format!("line {}", n + 1))?;
        out.push(rec);
    }
    Ok(out)
}

fn run_ingest(path: String, repl: bool) -> anyhow::Result<()> {
    let records = read_records(&path)?;
    let engine = Engine::new();
    match engine.train(records) {
        Ok(report) => eprintln!(
            "trained on {} books ({} terms)",
            report.books, report.vocabulary_size
        ),
        Err(e) => eprintln!("not ready: {e}"),
    }

    if repl {
        use std::io::{stdin, stdout, Write};
        let mut input = String::new();
        loop {
            input.clear();
            print!("ids> ");
            stdout().flush().ok();
            match stdin().read_line(&mut input) {
                Ok(0) | Err(_) => break,
                Ok(_) => {}
            }
            let s = input.trim();
            if s.is_empty() || s == ":q" || s == ":quit" {
                break;
            }

            let (ids, opts) = match parse_query(s) {
                Ok(x) => x,
                Err(e) => {
                    println!("parse error: {e}");
                    continue;
                }
            };
            let recs = engine.recommend(&ids, opts.limit);
            if recs.is_empty() {
                println!("(no recommendations)");
            }
            for (rank, r) in recs.iter().enumerate() {
                let reasons: Vec<String> = r.reasons.iter().map(|x| x.to_string()).collect();
                println!(
                    "{}\t{}\t{}\t{}%\t{}",
                    rank + 1,
                    r.book.id,
                    r.book.title,
                    r.score,
                    reasons.join("; ")
                );
            }
        }
    }

    Ok(())
}
