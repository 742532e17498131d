//! SQLite-backed [`Store`] implementation.
//!
//! Each collection is one table keyed by `stock_code`. Scalar fields map to
//! columns; `color` and `images` are JSON arrays; timestamps are epoch
//! milliseconds. Partial updates are a single `UPDATE ... SET` naming only
//! the columns the patch carries.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::sqlite::SqliteRow;
use sqlx::{QueryBuilder, Row, Sqlite, SqlitePool};

use crate::error::{BoxError, StoreError};
use crate::models::{ProductDocument, ProductPatch};
use crate::store::Store;

const COLUMNS: &str = "stock_code, name, price, discounted_price, product_type, quantity, \
                       color, series, images, description, is_discounted, created_at, updated_at";

/// SQLite implementation of the [`Store`] trait.
pub struct SqliteStore {
    pool: SqlitePool,
    collection: String,
}

impl SqliteStore {
    /// `collection` must be a validated identifier; it is spliced into SQL.
    pub fn new(pool: SqlitePool, collection: impl Into<String>) -> Self {
        Self {
            pool,
            collection: collection.into(),
        }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Release the underlying connection.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

fn row_to_product(row: &SqliteRow) -> Result<ProductDocument, BoxError> {
    let color: String = row.try_get("color")?;
    let images: String = row.try_get("images")?;
    let created_at: i64 = row.try_get("created_at")?;
    let updated_at: i64 = row.try_get("updated_at")?;

    Ok(ProductDocument {
        stock_code: row.try_get("stock_code")?,
        name: row.try_get("name")?,
        price: row.try_get("price")?,
        discounted_price: row.try_get("discounted_price")?,
        product_type: row.try_get("product_type")?,
        quantity: row.try_get("quantity")?,
        color: serde_json::from_str(&color)?,
        series: row.try_get("series")?,
        images: serde_json::from_str(&images)?,
        description: row.try_get("description")?,
        is_discounted: row.try_get("is_discounted")?,
        created_at: from_millis(created_at)?,
        updated_at: from_millis(updated_at)?,
    })
}

fn from_millis(ms: i64) -> Result<DateTime<Utc>, BoxError> {
    DateTime::from_timestamp_millis(ms).ok_or_else(|| format!("timestamp {} out of range", ms).into())
}

#[async_trait]
impl Store for SqliteStore {
    async fn find_one(&self, stock_code: &str) -> Result<Option<ProductDocument>, StoreError> {
        let sql = format!(
            "SELECT {} FROM {} WHERE stock_code = ?",
            COLUMNS, self.collection
        );
        let row = sqlx::query(&sql)
            .bind(stock_code)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| StoreError::Lookup {
                stock_code: stock_code.to_string(),
                source: e.into(),
            })?;

        row.as_ref()
            .map(row_to_product)
            .transpose()
            .map_err(|source| StoreError::Decode {
                stock_code: stock_code.to_string(),
                source,
            })
    }

    async fn insert_one(&self, doc: &ProductDocument) -> Result<(), StoreError> {
        let insert_err = |source: BoxError| StoreError::Insert {
            stock_code: doc.stock_code.clone(),
            source,
        };
        let color = serde_json::to_string(&doc.color).map_err(|e| insert_err(e.into()))?;
        let images = serde_json::to_string(&doc.images).map_err(|e| insert_err(e.into()))?;

        let sql = format!(
            "INSERT INTO {} ({}) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            self.collection, COLUMNS
        );
        sqlx::query(&sql)
            .bind(&doc.stock_code)
            .bind(&doc.name)
            .bind(doc.price)
            .bind(doc.discounted_price)
            .bind(&doc.product_type)
            .bind(doc.quantity)
            .bind(color)
            .bind(&doc.series)
            .bind(images)
            .bind(&doc.description)
            .bind(doc.is_discounted)
            .bind(doc.created_at.timestamp_millis())
            .bind(doc.updated_at.timestamp_millis())
            .execute(&self.pool)
            .await
            .map_err(|e| insert_err(e.into()))?;

        Ok(())
    }

    async fn update_partial(
        &self,
        stock_code: &str,
        patch: &ProductPatch,
    ) -> Result<(), StoreError> {
        let update_err = |source: BoxError| StoreError::Update {
            stock_code: stock_code.to_string(),
            source,
        };

        if patch.fields().is_empty() {
            return Ok(());
        }

        let mut qb: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("UPDATE {} SET ", self.collection));
        {
            let mut set = qb.separated(", ");
            if let Some(name) = &patch.name {
                set.push("name = ").push_bind_unseparated(name.clone());
            }
            if let Some(price) = patch.price {
                set.push("price = ").push_bind_unseparated(price);
            }
            if let Some(discounted_price) = patch.discounted_price {
                set.push("discounted_price = ")
                    .push_bind_unseparated(discounted_price);
            }
            if let Some(product_type) = &patch.product_type {
                set.push("product_type = ")
                    .push_bind_unseparated(product_type.clone());
            }
            if let Some(quantity) = patch.quantity {
                set.push("quantity = ").push_bind_unseparated(quantity);
            }
            if let Some(color) = &patch.color {
                let json = serde_json::to_string(color).map_err(|e| update_err(e.into()))?;
                set.push("color = ").push_bind_unseparated(json);
            }
            if let Some(series) = &patch.series {
                set.push("series = ").push_bind_unseparated(series.clone());
            }
            if let Some(images) = &patch.images {
                let json = serde_json::to_string(images).map_err(|e| update_err(e.into()))?;
                set.push("images = ").push_bind_unseparated(json);
            }
            if let Some(description) = &patch.description {
                set.push("description = ")
                    .push_bind_unseparated(description.clone());
            }
            if let Some(is_discounted) = patch.is_discounted {
                set.push("is_discounted = ")
                    .push_bind_unseparated(is_discounted);
            }
            if let Some(updated_at) = patch.updated_at {
                set.push("updated_at = ")
                    .push_bind_unseparated(updated_at.timestamp_millis());
            }
        }
        qb.push(" WHERE stock_code = ").push_bind(stock_code.to_string());

        let result = qb
            .build()
            .execute(&self.pool)
            .await
            .map_err(|e| update_err(e.into()))?;

        if result.rows_affected() == 0 {
            return Err(update_err("no document with this stock_code".into()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migrate::create_collection;
    use chrono::TimeZone;
    use sqlx::sqlite::{SqliteConnectOptions, SqlitePoolOptions};
    use tempfile::TempDir;

    async fn test_store(dir: &TempDir) -> SqliteStore {
        let options = SqliteConnectOptions::new()
            .filename(dir.path().join("catalog.sqlite"))
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .unwrap();
        create_collection(&pool, "products").await.unwrap();
        SqliteStore::new(pool, "products")
    }

    fn sample() -> ProductDocument {
        let t = Utc.with_ymd_and_hms(2024, 3, 1, 9, 30, 0).unwrap();
        ProductDocument {
            stock_code: "A1".into(),
            name: "Shirt".into(),
            price: 10.0,
            discounted_price: 8.5,
            product_type: "Gömlek".into(),
            quantity: 4,
            color: vec!["Beyaz".into()],
            series: "1S-1M".into(),
            images: vec!["a.jpg".into(), "b.jpg".into()],
            description: "<p>Nice</p>".into(),
            is_discounted: true,
            created_at: t,
            updated_at: t,
        }
    }

    #[tokio::test]
    async fn insert_then_find_round_trips() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir).await;
        let doc = sample();

        assert!(store.find_one("A1").await.unwrap().is_none());
        store.insert_one(&doc).await.unwrap();
        assert_eq!(store.find_one("A1").await.unwrap(), Some(doc));
        store.close().await;
    }

    #[tokio::test]
    async fn duplicate_insert_is_a_store_error() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir).await;
        store.insert_one(&sample()).await.unwrap();
        let err = store.insert_one(&sample()).await.unwrap_err();
        assert!(matches!(err, StoreError::Insert { .. }));
    }

    #[tokio::test]
    async fn partial_update_touches_only_patched_columns() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir).await;
        let doc = sample();
        store.insert_one(&doc).await.unwrap();

        let later = doc.updated_at + chrono::Duration::hours(1);
        let patch = ProductPatch {
            quantity: Some(9),
            images: Some(vec!["c.jpg".into()]),
            updated_at: Some(later),
            ..Default::default()
        };
        store.update_partial("A1", &patch).await.unwrap();

        let stored = store.find_one("A1").await.unwrap().unwrap();
        let mut expected = doc.clone();
        expected.quantity = 9;
        expected.images = vec!["c.jpg".into()];
        expected.updated_at = later;
        assert_eq!(stored, expected);
        assert_eq!(stored.created_at, doc.created_at);
    }

    #[tokio::test]
    async fn update_of_unknown_document_fails() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir).await;
        let patch = ProductPatch {
            quantity: Some(1),
            updated_at: Some(Utc::now()),
            ..Default::default()
        };
        let err = store.update_partial("missing", &patch).await.unwrap_err();
        assert!(matches!(err, StoreError::Update { .. }));
    }

    #[tokio::test]
    async fn lookup_against_missing_table_is_a_store_error() {
        let dir = TempDir::new().unwrap();
        let store = test_store(&dir).await;
        let other = SqliteStore::new(store.pool().clone(), "not_created");
        let err = other.find_one("A1").await.unwrap_err();
        assert!(matches!(err, StoreError::Lookup { .. }));
    }
}
