//! Product retrieval by stock code.
//!
//! Used by the `catalog-sync get` command to inspect what a sync stored.

use anyhow::{bail, Result};

use crate::config::Config;
use crate::db;
use crate::models::ProductDocument;
use crate::sqlite_store::SqliteStore;
use crate::store::Store;

/// Fetch one stored product.
pub async fn get_product(config: &Config, stock_code: &str) -> Result<ProductDocument> {
    let pool = db::connect(config).await?;
    let store = SqliteStore::new(pool, &config.db.collection);
    let found = store.find_one(stock_code).await;
    store.close().await;

    match found? {
        Some(doc) => Ok(doc),
        None => bail!("product not found: {}", stock_code),
    }
}

/// CLI entry point: prints the stored document as JSON.
pub async fn run_get(config: &Config, stock_code: &str) -> Result<()> {
    let doc = match get_product(config, stock_code).await {
        Ok(d) => d,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    };

    println!("{}", serde_json::to_string_pretty(&doc)?);
    Ok(())
}
