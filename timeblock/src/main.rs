use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use chrono::NaiveTime;
use clap::{Args, Parser, Subcommand};
use serde::Deserialize;
use timeblock::core::{PositionedInterval, Record, minute_of_day};
use timeblock::format::{ClockStyle, format_interval};
use timeblock::parser::parse_interval_with_pattern;
use timeblock::pipeline::{self, ScopeBatch};
use timeblock::{ChainSnapshot, TimeblockConfig};

#[derive(Debug, Parser)]
#[command(
    name = "timeblock",
    about = "Time-block extraction and column layout over outline snapshots",
    version
)]
struct Cli {
    /// Enable verbose logging for debugging.
    #[arg(long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Parse time intervals out of one or more text lines.
    Parse(ParseArgs),

    /// Lay out the time blocks of an outline snapshot.
    Layout(LayoutArgs),
}

#[derive(Debug, Args)]
struct ParseArgs {
    /// Lines of outline text.
    #[arg(required = true)]
    texts: Vec<String>,
    /// Emit JSON instead of a human-readable list.
    #[arg(long)]
    json: bool,
}

#[derive(Debug, Args)]
struct LayoutArgs {
    /// Snapshot JSON: `{ "scopes": [...], "ancestors": [...] }`.
    snapshot: PathBuf,
    /// Category configuration JSON. Without it every block is uncategorized.
    #[arg(long)]
    config: Option<PathBuf>,
    /// Emit JSON instead of a table.
    #[arg(long)]
    json: bool,
    /// Mark blocks running at this time (HH:MM).
    #[arg(long, value_parser = parse_clock)]
    now: Option<NaiveTime>,
}

/// On-disk shape of a host snapshot.
#[derive(Debug, Deserialize)]
struct SnapshotFile {
    #[serde(default)]
    scopes: Vec<ScopeBatch>,
    /// Ancestor lines that carry no time block themselves.
    #[serde(default)]
    ancestors: Vec<Record>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.command {
        Commands::Parse(args) => handle_parse(args),
        Commands::Layout(args) => handle_layout(args),
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Warn
    };
    env_logger::Builder::from_default_env()
        .filter_level(level)
        .init();
}

fn parse_clock(s: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(s, "%H:%M").map_err(|e| format!("expected HH:MM ({e})"))
}

fn handle_parse(args: ParseArgs) -> Result<()> {
    let ParseArgs { texts, json } = args;
    let parsed: Vec<_> = texts
        .iter()
        .map(|text| (text, parse_interval_with_pattern(text)))
        .collect();

    if json {
        #[derive(serde::Serialize)]
        struct JsonOutput<'a> {
            text: &'a str,
            pattern: Option<timeblock::parser::IntervalPattern>,
            interval: Option<&'a timeblock::core::TimeInterval>,
        }

        let payload: Vec<JsonOutput<'_>> = parsed
            .iter()
            .map(|(text, hit)| JsonOutput {
                text,
                pattern: hit.as_ref().map(|(p, _)| *p),
                interval: hit.as_ref().map(|(_, iv)| iv),
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&payload)?);
    } else {
        for (text, hit) in &parsed {
            match hit {
                Some((pattern, iv)) => println!(
                    "{} {:<22} {:?}  <- {:?}",
                    format_interval(iv, ClockStyle::TwentyFourHour),
                    format!("{pattern:?}"),
                    iv.source_text,
                    text
                ),
                None => println!("{:<11} {:<22} {:?}", "—", "no interval", text),
            }
        }
    }
    Ok(())
}

fn handle_layout(args: LayoutArgs) -> Result<()> {
    let LayoutArgs {
        snapshot,
        config,
        json,
        now,
    } = args;

    let config = match config {
        Some(path) => TimeblockConfig::load(&path)?,
        None => TimeblockConfig::default(),
    };
    let file = load_snapshot(&snapshot)?;
    log::debug!(
        "{} scopes, {} ancestors, {} categories",
        file.scopes.len(),
        file.ancestors.len(),
        config.categories.len()
    );
    let ancestors = ChainSnapshot::from_records(&file.ancestors);
    let results = pipeline::run(&config, &file.scopes, Some(&ancestors))
        .with_context(|| format!("laying out {:?}", snapshot))?;

    if results.is_empty() {
        eprintln!("No time blocks found in the provided snapshot.");
        return Ok(());
    }

    if json {
        println!("{}", serde_json::to_string_pretty(&results)?);
    } else {
        let now = now.map(minute_of_day);
        for item in &results {
            println!("{}", render_row(item, now));
        }
    }
    Ok(())
}

fn load_snapshot(path: &Path) -> Result<SnapshotFile> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {:?}", path))?;
    serde_json::from_str(&text).with_context(|| format!("decoding snapshot {:?}", path))
}

fn render_row(item: &PositionedInterval, now: Option<u32>) -> String {
    let marker = match now {
        Some(minute) if item.interval.contains_minute(minute) => "*",
        _ => " ",
    };
    let label = item
        .category
        .as_ref()
        .map(|c| c.label.as_str())
        .unwrap_or("-");
    format!(
        "{marker} {} {}/{} {:<12} {}",
        format_interval(&item.interval, ClockStyle::TwentyFourHour),
        item.column + 1,
        item.total_columns,
        label,
        item.record.text
    )
}
