//! Kehillah CLI - one-shot content migration tooling.
//!
//! # Usage
//!
//! ```bash
//! # Scrape the legacy shop listing into data/scraped-products.json
//! kehillah-cli images scrape
//!
//! # Fuzzy-match scraped products against the CMS catalog
//! kehillah-cli images match
//!
//! # Upload matched images and patch products (requires SANITY_API_TOKEN)
//! kehillah-cli images upload
//!
//! # Run the whole pipeline without writing anything to the CMS
//! kehillah-cli images --dry-run all
//! ```
//!
//! Each phase writes its output under `data/` so later phases can be rerun
//! without repeating earlier ones.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod images;

#[derive(Parser)]
#[command(name = "kehillah-cli")]
#[command(author, version, about = "Kehillah CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Product image migration pipeline
    Images {
        /// Preview without uploading images or patching documents
        #[arg(long)]
        dry_run: bool,

        #[command(subcommand)]
        phase: ImagePhase,
    },
}

#[derive(Subcommand)]
enum ImagePhase {
    /// Scrape the legacy WooCommerce shop listing
    Scrape,
    /// Match scraped products against the CMS catalog
    Match,
    /// Upload matched images and patch products
    Upload,
    /// Run scrape, match and upload in sequence
    All,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Images { dry_run, phase } => match phase {
            ImagePhase::Scrape => images::scrape_phase().await,
            ImagePhase::Match => images::match_phase().await,
            ImagePhase::Upload => images::upload_phase(dry_run).await,
            ImagePhase::All => images::run_all(dry_run).await,
        },
    };

    if let Err(e) = result {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}
