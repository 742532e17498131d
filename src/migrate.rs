use anyhow::Result;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::db;

pub async fn run_migrations(config: &Config) -> Result<()> {
    let pool = db::connect(config).await?;
    let result = create_collection(&pool, &config.db.collection).await;
    pool.close().await;
    result
}

/// Create the collection table if it does not exist. Idempotent.
///
/// `collection` must already be a validated identifier.
pub async fn create_collection(pool: &SqlitePool, collection: &str) -> Result<()> {
    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS {collection} (
            stock_code TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            price REAL NOT NULL,
            discounted_price REAL NOT NULL,
            product_type TEXT NOT NULL,
            quantity INTEGER NOT NULL,
            color TEXT NOT NULL DEFAULT '[]',
            series TEXT NOT NULL,
            images TEXT NOT NULL DEFAULT '[]',
            description TEXT NOT NULL DEFAULT '',
            is_discounted INTEGER NOT NULL,
            created_at INTEGER NOT NULL,
            updated_at INTEGER NOT NULL
        )
        "#
    ))
    .execute(pool)
    .await?;

    sqlx::query(&format!(
        "CREATE INDEX IF NOT EXISTS idx_{collection}_updated_at ON {collection}(updated_at DESC)"
    ))
    .execute(pool)
    .await?;

    Ok(())
}
