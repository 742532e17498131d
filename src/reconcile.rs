//! Reconciliation of a freshly mapped document against stored state.
//!
//! One point lookup by `stock_code`, then at most one write:
//!
//! - no stored document → insert the full document;
//! - stored document differs in at least one business field → partial
//!   update of exactly the differing fields plus `updatedAt`;
//! - otherwise → no write.
//!
//! `stock_code` and `createdAt` never take part in the diff.

use chrono::{DateTime, Utc};

use crate::error::StoreError;
use crate::models::{ProductDocument, ProductPatch};
use crate::store::Store;

/// What reconciling one document did to the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Inserted,
    /// Fields written, `updatedAt` included.
    Updated { fields: Vec<&'static str> },
    Unchanged,
}

/// Field-level diff of `fresh` against `stored`.
///
/// `updated_at` is set to `now` only when some business field differs.
pub fn diff(stored: &ProductDocument, fresh: &ProductDocument, now: DateTime<Utc>) -> ProductPatch {
    fn changed<T: PartialEq + Clone>(old: &T, new: &T) -> Option<T> {
        (old != new).then(|| new.clone())
    }

    let mut patch = ProductPatch {
        name: changed(&stored.name, &fresh.name),
        price: changed(&stored.price, &fresh.price),
        discounted_price: changed(&stored.discounted_price, &fresh.discounted_price),
        product_type: changed(&stored.product_type, &fresh.product_type),
        quantity: changed(&stored.quantity, &fresh.quantity),
        color: changed(&stored.color, &fresh.color),
        series: changed(&stored.series, &fresh.series),
        images: changed(&stored.images, &fresh.images),
        description: changed(&stored.description, &fresh.description),
        is_discounted: changed(&stored.is_discounted, &fresh.is_discounted),
        updated_at: None,
    };
    if !patch.is_empty() {
        patch.updated_at = Some(now);
    }
    patch
}

/// Bring the store in line with `doc`.
///
/// `now` is the time of comparison and becomes `updatedAt` on an update.
pub async fn reconcile<S: Store + ?Sized>(
    store: &S,
    doc: &ProductDocument,
    now: DateTime<Utc>,
) -> Result<Outcome, StoreError> {
    let Some(stored) = store.find_one(&doc.stock_code).await? else {
        store.insert_one(doc).await?;
        return Ok(Outcome::Inserted);
    };

    let patch = diff(&stored, doc, now);
    if patch.is_empty() {
        return Ok(Outcome::Unchanged);
    }

    store.update_partial(&doc.stock_code, &patch).await?;
    Ok(Outcome::Updated {
        fields: patch.fields(),
    })
}
