//! mailtally-extract - Pull the total out of receipt emails.
//!
//! Reads plain-text email bodies and prints one receipt record per input,
//! normalized to the user's currency.
//!
//! # Usage
//!
//! ```bash
//! mailtally-extract receipt.txt --currency EUR
//! mailtally-extract receipt.txt --reply '243,37|Travel|Flight' --category 10=Travel
//! cat receipt.txt | mailtally-extract --format json
//! ```

use crate::cmd::completions::ShellType;
use anyhow::{bail, Context, Result};
use chrono::{DateTime, FixedOffset};
use clap::{Parser, ValueEnum};
use mailtally_core::CurrencyTable;
use mailtally_extract::{
    Category, EmailContent, PipelineConfig, ReceiptPipeline, ReceiptRecord, ReplyClassifier,
};
use rayon::prelude::*;
use serde::Serialize;
use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, info};

/// Name of the currency table looked up in the user's config directory.
const CURRENCY_TABLE_FILE: &str = "currencies.json";

/// Output format for receipt records.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable text output (default)
    #[default]
    Text,
    /// JSON array, one entry per input
    Json,
}

/// Extract the total, currency and category from receipt emails.
#[derive(Parser, Debug)]
#[command(name = "mailtally-extract")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Generate shell completions and exit
    #[arg(long, value_name = "SHELL", hide = true)]
    generate_completions: Option<ShellType>,

    /// Plain-text email bodies to read (stdin when empty or `-`)
    #[arg(value_name = "FILES")]
    files: Vec<PathBuf>,

    /// The user's currency; every amount is normalized to it
    #[arg(short, long, default_value = "USD")]
    currency: String,

    /// JSON currency table merged over the built-in one
    #[arg(long, value_name = "FILE")]
    currency_table: Option<PathBuf>,

    /// A model's `Total|Category|Summary` reply to post-process
    #[arg(long, value_name = "TEXT")]
    reply: Option<String>,

    /// Parser name recorded for receipts totalled from --reply
    #[arg(long, value_name = "NAME", requires = "reply")]
    reply_parser: Option<String>,

    /// A category the reply may name, as ID=NAME (repeatable)
    #[arg(long = "category", value_name = "ID=NAME", value_parser = parse_category)]
    categories: Vec<Category>,

    /// Message-ID recorded on the receipt
    #[arg(long)]
    message_id: Option<String>,

    /// Sender address of the email
    #[arg(long, value_name = "ADDR")]
    from: Option<String>,

    /// Default category for a sender when no reply names one, as ADDR=ID (repeatable)
    #[arg(long = "sender-category", value_name = "ADDR=ID", value_parser = parse_sender_category)]
    sender_categories: Vec<(String, i64)>,

    /// Date the email was sent (RFC 2822)
    #[arg(long, value_parser = parse_date)]
    date: Option<DateTime<FixedOffset>>,

    /// Don't scan the body when the reply has no usable total
    #[arg(long)]
    no_fallback: bool,

    /// Output format
    #[arg(short = 'f', long, value_enum, default_value = "text")]
    format: OutputFormat,

    /// Show debug logging on stderr
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors
    #[arg(short, long)]
    quiet: bool,
}

/// One input and the receipt found in it.
#[derive(Debug, Serialize)]
struct JsonReceipt<'a> {
    source: &'a str,
    receipt: Option<&'a ReceiptRecord>,
}

struct Input {
    source: String,
    body: String,
}

/// Main entry point for the extract command.
pub fn main() -> ExitCode {
    main_with_name("mailtally-extract")
}

/// Main entry point with custom binary name.
pub fn main_with_name(bin_name: &str) -> ExitCode {
    let args = Args::parse();

    if let Some(shell) = args.generate_completions {
        crate::cmd::completions::generate_completions::<Args>(shell, bin_name);
        return ExitCode::SUCCESS;
    }

    crate::cmd::init_tracing(args.verbose, args.quiet);

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitCode::from(1)
        }
    }
}

fn run(args: &Args) -> Result<()> {
    let table = load_currency_table(args.currency_table.as_deref())?;
    if table.get(&args.currency).is_none() {
        bail!(
            "unknown currency {} (known: {})",
            args.currency.trim().to_ascii_uppercase(),
            table.codes().join(", ")
        );
    }

    let mut builder = PipelineConfig::builder()
        .currency(&args.currency)
        .categories(args.categories.clone())
        .fallback(!args.no_fallback)
        .table(table);
    for (sender, id) in &args.sender_categories {
        builder = builder.sender_category(sender, *id);
    }
    let config = builder.build();

    let mut pipeline = ReceiptPipeline::new(config);
    if let Some(reply) = &args.reply {
        let mut classifier = ReplyClassifier::new(reply.clone());
        if let Some(name) = &args.reply_parser {
            classifier = classifier.with_name(name.clone());
        }
        pipeline = pipeline.with_classifier(classifier);
    }

    let inputs = read_inputs(&args.files)?;
    debug!(inputs = inputs.len(), currency = %pipeline.config().currency, "processing");

    let records = inputs
        .par_iter()
        .map(|input| {
            let mut email = EmailContent::new(input.body.clone());
            email.message_id.clone_from(&args.message_id);
            email.from.clone_from(&args.from);
            email.date = args.date;
            pipeline
                .process(&email)
                .with_context(|| format!("failed to process {}", input.source))
        })
        .collect::<Result<Vec<_>>>()?;

    let found = records.iter().filter(|r| r.is_some()).count();
    info!(found, total = records.len(), "done");

    let mut stdout = io::stdout().lock();
    match args.format {
        OutputFormat::Json => {
            let entries: Vec<JsonReceipt<'_>> = inputs
                .iter()
                .zip(&records)
                .map(|(input, record)| JsonReceipt {
                    source: &input.source,
                    receipt: record.as_ref(),
                })
                .collect();
            serde_json::to_writer_pretty(&mut stdout, &entries)?;
            writeln!(stdout)?;
        }
        OutputFormat::Text => {
            for (input, record) in inputs.iter().zip(&records) {
                write_text(&mut stdout, &input.source, record.as_ref(), &pipeline)?;
            }
        }
    }

    Ok(())
}

/// Built-in table, with the user's file merged over it.
///
/// An explicit `--currency-table` must exist; the config directory file is
/// only used when present.
fn load_currency_table(explicit: Option<&Path>) -> Result<CurrencyTable> {
    let mut table = CurrencyTable::builtin();

    let path = match explicit {
        Some(path) => Some(path.to_path_buf()),
        None => dirs::config_dir()
            .map(|dir| dir.join("mailtally").join(CURRENCY_TABLE_FILE))
            .filter(|path| path.is_file()),
    };

    if let Some(path) = path {
        let user = CurrencyTable::from_file(&path)
            .with_context(|| format!("failed to load currency table {}", path.display()))?;
        debug!(path = %path.display(), currencies = user.len(), "loaded currency table");
        table.extend(user);
    }

    Ok(table)
}

fn read_inputs(files: &[PathBuf]) -> Result<Vec<Input>> {
    if files.is_empty() {
        return Ok(vec![read_stdin()?]);
    }
    if files.iter().filter(|path| path.as_os_str() == "-").count() > 1 {
        bail!("stdin (`-`) can only be given once");
    }

    files
        .iter()
        .map(|path| {
            if path.as_os_str() == "-" {
                return read_stdin();
            }
            let body = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            Ok(Input {
                source: path.display().to_string(),
                body,
            })
        })
        .collect()
}

fn read_stdin() -> Result<Input> {
    let mut body = String::new();
    io::stdin()
        .read_to_string(&mut body)
        .context("failed to read stdin")?;
    Ok(Input {
        source: "-".to_string(),
        body,
    })
}

fn write_text<W: Write>(
    out: &mut W,
    source: &str,
    record: Option<&ReceiptRecord>,
    pipeline: &ReceiptPipeline,
) -> Result<()> {
    let Some(record) = record else {
        writeln!(out, "{source}: no amount found")?;
        return Ok(());
    };

    let result = &record.extraction;
    let table = &pipeline.config().table;
    let major = |minor: i64| {
        table
            .get(&result.currency)
            .and_then(|currency| currency.to_major(minor))
            .map_or_else(|| format!("{minor} (minor units)"), |major| major.to_string())
    };

    writeln!(
        out,
        "{source}: {} {} ({})",
        major(result.amount),
        result.currency,
        record.parser
    )?;
    if let Some(summary) = &record.summary {
        writeln!(out, "  summary: {summary}")?;
    }
    if let Some(id) = record.category_id {
        writeln!(out, "  category: {id}")?;
    }
    let candidates: Vec<String> = result.other_amounts.iter().map(|&a| major(a)).collect();
    writeln!(out, "  candidates: {}", candidates.join(", "))?;

    Ok(())
}

fn parse_category(s: &str) -> Result<Category, String> {
    let (id, name) = s
        .split_once('=')
        .ok_or_else(|| format!("expected ID=NAME, got {s:?}"))?;
    let id = id
        .trim()
        .parse::<i64>()
        .map_err(|e| format!("invalid category id {id:?}: {e}"))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(format!("category {id} has no name"));
    }
    Ok(Category::new(id, name))
}

fn parse_sender_category(s: &str) -> Result<(String, i64), String> {
    let (sender, id) = s
        .rsplit_once('=')
        .ok_or_else(|| format!("expected ADDR=ID, got {s:?}"))?;
    let sender = sender.trim();
    if sender.is_empty() {
        return Err(format!("sender missing in {s:?}"));
    }
    let id = id
        .trim()
        .parse::<i64>()
        .map_err(|e| format!("invalid category id {id:?}: {e}"))?;
    Ok((sender.to_string(), id))
}

fn parse_date(s: &str) -> Result<DateTime<FixedOffset>, String> {
    DateTime::parse_from_rfc2822(s).map_err(|e| format!("invalid RFC 2822 date {s:?}: {e}"))
}
