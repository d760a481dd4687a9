//! ╭─────────────────────────────────────────────────────────────────────────────╮
//! │ vellum-cli                                                                  │
//! ╰─────────────────────────────────────────────────────────────────────────────╯
//!
//! Loads a JSON document Delta, applies one edit, and prints the resulting
//! Delta and plain text. A minimal demonstration of the engine end to end,
//! with no UI layer in front of it.
//!
//! ```not_rust
//! vellum-cli --input doc.json insert --at 5 --text "hello"
//! vellum-cli --input doc.json delete --at 0 --length 3
//! vellum-cli --input doc.json format --at 0 --length 5 --key bold --bool true
//! ```

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use vellum_delta::{
    delta_from_json_str, delta_to_json_string, Attribute, AttributeRegistry, AttributeScope,
    AttributeValue, Delta, EmbedRegistry,
};
use vellum_engine::Document;
use vellum_log::{info, LogConfig, LogLevel};

#[derive(Debug, Parser)]
#[command(name = "vellum-cli")]
#[command(about = "Apply one edit to a Delta document and print the result")]
struct App {
    /// Path to a JSON Delta document. Defaults to the empty document `"\n"`.
    #[clap(long)]
    input: Option<PathBuf>,

    /// Log verbosity.
    #[clap(long, value_enum, default_value = "warn")]
    log_level: LogLevel,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Insert plain text at an index.
    Insert {
        #[arg(long)]
        at: usize,
        #[arg(long)]
        text: String,
    },
    /// Delete a range of characters.
    Delete {
        #[arg(long)]
        at: usize,
        #[arg(long)]
        length: usize,
    },
    /// Apply an inline or line attribute over a range.
    Format {
        #[arg(long)]
        at: usize,
        #[arg(long, default_value_t = 0)]
        length: usize,
        /// Attribute key, e.g. "bold" or "list".
        #[arg(long)]
        key: String,
        /// Line-scoped attribute (default is inline).
        #[arg(long)]
        line: bool,
        #[arg(long)]
        string: Option<String>,
        #[arg(long)]
        bool: Option<bool>,
    },
    /// Print the document's Delta JSON and plain text without editing it.
    Show,
}

fn main() -> Result<()> {
    let args = App::parse();

    vellum_log::init_logger(args.log_level, &LogConfig::default())
        .context("failed to initialize logger")?;

    let starting_delta = match &args.input {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            delta_from_json_str(&raw).context("parsing document JSON")?
        }
        None => Delta::new().insert("\n", None),
    };

    let attributes = AttributeRegistry::standard();
    let embeds = EmbedRegistry::standard();
    let mut document = Document::from_delta(starting_delta, attributes, embeds)
        .context("loading document")?;

    match args.command {
        Command::Insert { at, text } => {
            let change = document.insert(at, &text)?;
            info!(ops = change.ops().len(), "applied insert");
        }
        Command::Delete { at, length } => {
            let change = document.delete(at, length)?;
            info!(ops = change.ops().len(), "applied delete");
        }
        Command::Format {
            at,
            length,
            key,
            line,
            string,
            bool,
        } => {
            let value = match (string, bool) {
                (Some(s), _) => AttributeValue::String(s),
                (None, Some(b)) => AttributeValue::Boolean(b),
                (None, None) => AttributeValue::Null,
            };
            let scope = if line { AttributeScope::Line } else { AttributeScope::Inline };
            let attribute = Attribute::new(&key, scope, value);
            let change = document.format(at, length, &attribute)?;
            info!(ops = change.ops().len(), "applied format");
        }
        Command::Show => {}
    }

    println!("{}", delta_to_json_string(document.delta())?);
    println!("---");
    println!("{}", document.to_plain_text());

    Ok(())
}
