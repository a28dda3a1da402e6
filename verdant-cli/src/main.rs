//! `verdant` — ask the sustainability assistant or browse the facility map
//! from the terminal.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tracing::debug;
use tracing_subscriber::EnvFilter;

use verdant_core::{Category, LocationIndex, LocationRecord, VerdantConfig};
use verdant_llm::AssistantClient;

#[derive(Parser, Debug)]
#[command(name = "verdant", version, about = "Bay Area sustainability assistant")]
struct Cli {
    /// Path to verdant.toml (defaults are used when omitted)
    #[arg(short, long, global = true, env = "VERDANT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Ask the assistant a question
    Ask {
        /// The question; multiple words are joined with spaces
        #[arg(required = true, num_args = 1..)]
        message: Vec<String>,
    },
    /// List facilities, optionally filtered like the map page
    Locations {
        /// composting, recycling, workshop, or garden
        #[arg(short, long)]
        category: Option<Category>,
        /// Case-insensitive name or city fragment
        #[arg(short, long, default_value = "")]
        search: String,
    },
    /// Print the effective configuration
    Config,
}

fn load_config(path: Option<&PathBuf>) -> Result<VerdantConfig> {
    match path {
        Some(path) => VerdantConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => Ok(VerdantConfig::default()),
    }
}

fn load_index(config: &VerdantConfig) -> Result<LocationIndex> {
    let index = match &config.locations.dataset_path {
        Some(path) => LocationIndex::from_file(path)
            .with_context(|| format!("loading locations from {}", path.display()))?,
        None => LocationIndex::bundled().context("loading bundled locations")?,
    };
    debug!(records = index.len(), "Location index ready");
    Ok(index)
}

fn init_tracing(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

/// A copy of `config` safe to print: an explicit API key is masked.
fn redacted(config: &VerdantConfig) -> VerdantConfig {
    let mut shown = config.clone();
    if shown.assistant.api_key.is_some() {
        shown.assistant.api_key = Some("<redacted>".to_string());
    }
    shown
}

fn print_record(rec: &LocationRecord) {
    println!("[{}] {} ({})", rec.id, rec.name, rec.category);
    println!("    {}", rec.full_address());
    println!("    {}", rec.kind);
    if let Some(phone) = &rec.phone {
        println!("    Phone: {phone}");
    }
    if let Some(website) = &rec.website {
        println!("    Website: {website}");
    }
    if !rec.materials().is_empty() {
        println!("    Materials: {}", rec.materials().join(", "));
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(cli.config.as_ref())?;
    init_tracing(&config.general.log_level);

    match cli.command {
        Command::Ask { message } => {
            let index = load_index(&config)?;
            let client = AssistantClient::http(&config, index);
            let answer = client
                .send_message(&message.join(" "))
                .await
                .context("assistant request failed")?;
            println!("{answer}");
        }
        Command::Locations { category, search } => {
            let index = load_index(&config)?;
            let hits = index.filter(category, &search);
            if hits.is_empty() {
                println!("No locations match.");
            }
            for rec in hits {
                print_record(rec);
            }
        }
        Command::Config => {
            print!("{}", toml::to_string_pretty(&redacted(&config))?);
        }
    }
    Ok(())
}
