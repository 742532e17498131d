//! Storage abstraction for product documents.
//!
//! The [`Store`] trait is the whole contract the reconciler needs from a
//! document store: a point lookup by stock code, a full insert, and a
//! partial update that touches only the fields a [`ProductPatch`] sets.
//! Each call is atomic on its own; nothing here spans more than one call.
//!
//! | Implementation | Backing |
//! |----------------|---------|
//! | [`memory::InMemoryStore`] | `HashMap` behind a `RwLock`, for tests |
//! | [`crate::sqlite_store::SqliteStore`] | one SQLite table per collection |

pub mod memory;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::{ProductDocument, ProductPatch};

#[async_trait]
pub trait Store: Send + Sync {
    /// Fetch the stored document for `stock_code`, if any.
    async fn find_one(&self, stock_code: &str) -> Result<Option<ProductDocument>, StoreError>;

    /// Insert a new document.
    async fn insert_one(&self, doc: &ProductDocument) -> Result<(), StoreError>;

    /// Write exactly the fields set in `patch` on the document for `stock_code`.
    async fn update_partial(&self, stock_code: &str, patch: &ProductPatch)
        -> Result<(), StoreError>;
}
