//! Command-line front end for the link service.
//!
//! # Usage
//!
//! ```bash
//! # Shorten one URL
//! cargo run -- shorten https://example.com --owner 1
//!
//! # Shorten several URLs with correlation ids
//! cargo run -- batch --owner 1 a=https://a.example b=https://b.example
//!
//! # Look up a code
//! cargo run -- resolve Ab3dE
//!
//! # List and delete links of an owner
//! cargo run -- list --owner 1
//! cargo run -- delete --owner 1 Ab3dE Xy9zQ
//!
//! # Storage diagnostics
//! cargo run -- stats
//! cargo run -- db-check
//! ```
//!
//! # Environment Variables
//!
//! See [`link_shortener::config`]. A `.env` file in the working directory is
//! loaded first.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::*;
use dialoguer::Confirm;
use tracing_subscriber::EnvFilter;

use link_shortener::application::services::DynLinkService;
use link_shortener::bootstrap::build_link_service;
use link_shortener::config::{self, Config};
use link_shortener::domain::entities::BatchItem;

/// Link shortener administration tool.
#[derive(Parser)]
#[command(name = "link-shortener")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Shorten a URL, reusing the existing code if it is already known
    Shorten {
        url: String,

        /// Owner id recorded on a newly created link
        #[arg(short, long, default_value_t = 0)]
        owner: u64,
    },

    /// Shorten several URLs given as `correlation_id=url`
    Batch {
        #[arg(short, long, default_value_t = 0)]
        owner: u64,

        #[arg(required = true, value_parser = parse_batch_item)]
        items: Vec<BatchItem>,
    },

    /// Show the target of a short code
    Resolve { code: String },

    /// List links created by an owner
    List {
        #[arg(short, long)]
        owner: u64,
    },

    /// Soft-delete codes owned by an owner
    Delete {
        #[arg(short, long)]
        owner: u64,

        #[arg(required = true)]
        codes: Vec<String>,

        /// Skip confirmation prompt
        #[arg(short = 'y', long)]
        yes: bool,
    },

    /// Show storage statistics
    Stats,

    /// Check that storage is reachable
    DbCheck,
}

fn parse_batch_item(raw: &str) -> Result<BatchItem, String> {
    let (correlation_id, target) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected correlation_id=url, got '{raw}'"))?;
    if correlation_id.is_empty() {
        return Err(format!("missing correlation id in '{raw}'"));
    }
    Ok(BatchItem::new(correlation_id, target))
}

fn init_tracing(config: &Config) -> Result<()> {
    let filter = EnvFilter::try_new(&config.log_level)
        .with_context(|| format!("Invalid RUST_LOG '{}'", config.log_level))?;

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    if config.log_format == "json" {
        builder.json().init();
    } else {
        builder.init();
    }

    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    // Load environment variables from .env file
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = config::load_from_env().context("Failed to load configuration")?;
    init_tracing(&config)?;
    config.print_summary();

    let service = build_link_service(&config).await?;

    let outcome = run(&service, cli.command).await;

    // Pending deletions are flushed here, also when the command failed.
    service.shutdown().await;

    outcome
}

async fn run(service: &DynLinkService, command: Commands) -> Result<()> {
    match command {
        Commands::Shorten { url, owner } => shorten(service, &url, owner).await,
        Commands::Batch { owner, items } => batch(service, items, owner).await,
        Commands::Resolve { code } => resolve(service, &code).await,
        Commands::List { owner } => list(service, owner).await,
        Commands::Delete { owner, codes, yes } => delete(service, owner, codes, yes).await,
        Commands::Stats => stats(service).await,
        Commands::DbCheck => db_check(service).await,
    }
}

async fn shorten(service: &DynLinkService, url: &str, owner: u64) -> Result<()> {
    let (link, existed) = service
        .get_or_create(url, owner)
        .await
        .with_context(|| format!("Failed to shorten {url}"))?;

    let short_url = service.short_url(&link.code);
    if existed {
        println!(
            "{} {}",
            "Already shortened:".yellow(),
            short_url.bright_yellow().bold()
        );
    } else {
        println!("{} {}", "Created:".green(), short_url.bright_green().bold());
    }

    Ok(())
}

async fn batch(service: &DynLinkService, items: Vec<BatchItem>, owner: u64) -> Result<()> {
    let results = service
        .get_or_create_batch(items, owner)
        .await
        .context("Failed to shorten batch")?;

    for result in &results {
        println!(
            "  {:<20} {}",
            result.correlation_id.cyan(),
            result.short_url.bright_green()
        );
    }
    println!();
    println!(
        "  Total: {}",
        results.len().to_string().bright_white().bold()
    );

    Ok(())
}

async fn resolve(service: &DynLinkService, code: &str) -> Result<()> {
    let link = service.resolve(code).await?;

    println!("  Code:   {}", link.code.cyan());
    println!("  Target: {}", link.target.bright_white());
    println!("  Owner:  {}", link.owner_id.to_string().bright_black());
    if link.is_deleted() {
        println!("  Status: {}", "DELETED".red());
    } else {
        println!("  Status: {}", "ACTIVE".green());
    }

    Ok(())
}

/// Lists an owner's links.
///
/// # Output Format
///
/// ```text
///   Code       Target                                   Status
///   ──────────────────────────────────────────────────────────────
///   Ab3dE      https://example.com                      ACTIVE
/// ```
async fn list(service: &DynLinkService, owner: u64) -> Result<()> {
    let links = service.list_owned(owner).await?;

    if links.is_empty() {
        println!("{}", "  No links found".yellow());
        return Ok(());
    }

    println!(
        "  {:<10} {:<40} {:<8}",
        "Code".bright_white().bold(),
        "Target".bright_white().bold(),
        "Status".bright_white().bold()
    );
    println!("  {}", "─".repeat(62).bright_black());

    for link in &links {
        let status = if link.is_deleted() {
            "DELETED".red()
        } else {
            "ACTIVE".green()
        };
        println!("  {:<10} {:<40} {}", link.code.cyan(), link.target, status);
    }

    println!();
    println!("  Total: {}", links.len().to_string().bright_white().bold());

    Ok(())
}

/// Requests deletion after a confirmation prompt (default: No).
///
/// Deletion is applied by the background pipeline; the final flush happens
/// when `main` shuts the service down.
async fn delete(service: &DynLinkService, owner: u64, codes: Vec<String>, yes: bool) -> Result<()> {
    println!("  Owner: {}", owner.to_string().cyan());
    println!("  Codes: {}", codes.join(", ").bright_white());
    println!();

    if !yes {
        let confirmed = Confirm::new()
            .with_prompt("Delete these links?")
            .default(false)
            .interact()?;

        if !confirmed {
            println!("{}", "Cancelled".red());
            return Ok(());
        }
    }

    let count = codes.len();
    service.request_delete(owner, codes).await;

    println!(
        "{} {} deletion request(s) queued",
        "Done:".green().bold(),
        count
    );

    Ok(())
}

async fn stats(service: &DynLinkService) -> Result<()> {
    let links = service.count_links().await?;

    println!(
        "  Links:       {}",
        links.to_string().bright_green().bold()
    );
    println!(
        "  Code length: {}",
        service.current_code_length().to_string().bright_green().bold()
    );

    Ok(())
}

async fn db_check(service: &DynLinkService) -> Result<()> {
    println!("{}", "Checking storage...".bright_blue());

    service.ping().await.context("Storage is not reachable")?;

    println!("{}", "Storage OK".green().bold());
    Ok(())
}
