//! # Catalog Sync
//!
//! One-shot synchronization of an XML product catalog into a document store.
//!
//! The job reads every `<Product>` record from the catalog, maps each one
//! into a canonical [`ProductDocument`](models::ProductDocument), and
//! reconciles it against the store: new stock codes are inserted, changed
//! fields are written with a partial update, and unchanged products are
//! left alone.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌──────────┐   ┌────────────┐   ┌──────────┐
//! │ Catalog XML │──▶│  Mapper  │──▶│ Reconciler │──▶│  Store   │
//! │ (quick-xml) │   │  (pure)  │   │ (diff)     │   │ (SQLite) │
//! └─────────────┘   └──────────┘   └────────────┘   └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! catalog-sync init              # create the collection
//! catalog-sync sync              # synchronize the configured catalog
//! catalog-sync get A1            # print one stored product
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Canonical document and partial update types |
//! | [`xml`] | Catalog XML → element tree |
//! | [`mapper`] | Element tree → canonical document |
//! | [`reconcile`] | Field-level diff and insert/update decision |
//! | [`store`] | Store trait and in-memory implementation |
//! | [`sqlite_store`] | SQLite store |
//! | [`ingest`] | The sync job |
//! | [`progress`] | Per-record outcome reporting |
//! | [`db`] | Store connection |
//! | [`migrate`] | Schema creation |

pub mod clock;
pub mod config;
pub mod db;
pub mod error;
pub mod get;
pub mod ingest;
pub mod mapper;
pub mod migrate;
pub mod models;
pub mod progress;
pub mod reconcile;
pub mod sqlite_store;
pub mod store;
pub mod xml;
