//! # Catalog Sync CLI (`catalog-sync`)
//!
//! Synchronizes an XML product catalog into the product store.
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `catalog-sync init` | Create the product collection |
//! | `catalog-sync sync` | Map every catalog record and reconcile it with the store |
//! | `catalog-sync get <stock_code>` | Print one stored product as JSON |
//!
//! ## Examples
//!
//! ```bash
//! # Create the collection
//! catalog-sync init --config ./config/catalog.toml
//!
//! # Synchronize the configured catalog
//! catalog-sync sync --config ./config/catalog.toml
//!
//! # Check a new catalog file without writing anything
//! catalog-sync sync --file ./lonca-sample.xml --dry-run
//! ```

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use catalog_sync::progress::ProgressFormat;
use catalog_sync::{config, get, ingest, migrate};

/// Catalog Sync: synchronize an XML product catalog into a document store.
///
/// All commands accept a `--config` flag pointing to a TOML configuration
/// file.
#[derive(Parser)]
#[command(name = "catalog-sync", version)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Defaults to `./config/catalog.toml`. The store connection string may
    /// be given here as `db.url` or in the `CATALOG_DB_URL` environment
    /// variable.
    #[arg(long, global = true, default_value = "./config/catalog.toml")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

/// Top-level CLI commands.
#[derive(Subcommand)]
enum Commands {
    /// Create the product collection.
    ///
    /// Idempotent; running it multiple times is safe.
    Init,

    /// Synchronize the catalog into the store.
    ///
    /// New stock codes are inserted, changed fields are updated in place,
    /// and records that fail to map or to write are reported and skipped.
    Sync {
        /// Catalog file to read instead of `source.path` from the config.
        #[arg(long)]
        file: Option<PathBuf>,

        /// Map every record and report failures without touching the store.
        #[arg(long)]
        dry_run: bool,

        /// Progress output format.
        #[arg(long, value_enum, default_value = "human")]
        format: ProgressFormat,
    },

    /// Print a stored product by stock code.
    Get {
        /// Stock code (the catalog's `ProductId`).
        stock_code: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config(&cli.config)?;

    match cli.command {
        Commands::Init => {
            migrate::run_migrations(&cfg).await?;
            println!("Collection '{}' initialized.", cfg.db.collection);
        }
        Commands::Sync {
            file,
            dry_run,
            format,
        } => {
            ingest::run_sync(&cfg, file, dry_run, format).await?;
        }
        Commands::Get { stock_code } => {
            get::run_get(&cfg, &stock_code).await?;
        }
    }

    Ok(())
}
