//! In-memory [`Store`] implementation for testing.
//!
//! Counts writes so tests can assert how many inserts and updates a sync
//! produced, and can be told to fail writes for chosen stock codes.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::RwLock;

use async_trait::async_trait;

use crate::error::StoreError;
use crate::models::{ProductDocument, ProductPatch};

use super::Store;

/// In-memory store for tests.
pub struct InMemoryStore {
    docs: RwLock<HashMap<String, ProductDocument>>,
    failing: RwLock<HashSet<String>>,
    inserts: AtomicUsize,
    updates: AtomicUsize,
    last_patch: RwLock<Option<ProductPatch>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            docs: RwLock::new(HashMap::new()),
            failing: RwLock::new(HashSet::new()),
            inserts: AtomicUsize::new(0),
            updates: AtomicUsize::new(0),
            last_patch: RwLock::new(None),
        }
    }

    /// Make every write for `stock_code` fail.
    pub fn fail_writes_for(&self, stock_code: &str) {
        self.failing
            .write()
            .unwrap_or_else(|e| e.into_inner())
            .insert(stock_code.to_string());
    }

    pub fn get(&self, stock_code: &str) -> Option<ProductDocument> {
        self.docs
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .get(stock_code)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.docs.read().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn insert_count(&self) -> usize {
        self.inserts.load(Ordering::SeqCst)
    }

    pub fn update_count(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    /// The most recent patch passed to `update_partial`.
    pub fn last_patch(&self) -> Option<ProductPatch> {
        self.last_patch
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .clone()
    }

    fn is_failing(&self, stock_code: &str) -> bool {
        self.failing
            .read()
            .unwrap_or_else(|e| e.into_inner())
            .contains(stock_code)
    }
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Store for InMemoryStore {
    async fn find_one(&self, stock_code: &str) -> Result<Option<ProductDocument>, StoreError> {
        Ok(self.get(stock_code))
    }

    async fn insert_one(&self, doc: &ProductDocument) -> Result<(), StoreError> {
        if self.is_failing(&doc.stock_code) {
            return Err(StoreError::Insert {
                stock_code: doc.stock_code.clone(),
                source: "write rejected".into(),
            });
        }
        let mut docs = self.docs.write().unwrap_or_else(|e| e.into_inner());
        if docs.contains_key(&doc.stock_code) {
            return Err(StoreError::Insert {
                stock_code: doc.stock_code.clone(),
                source: "duplicate stock_code".into(),
            });
        }
        docs.insert(doc.stock_code.clone(), doc.clone());
        self.inserts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn update_partial(
        &self,
        stock_code: &str,
        patch: &ProductPatch,
    ) -> Result<(), StoreError> {
        if self.is_failing(stock_code) {
            return Err(StoreError::Update {
                stock_code: stock_code.to_string(),
                source: "write rejected".into(),
            });
        }
        let mut docs = self.docs.write().unwrap_or_else(|e| e.into_inner());
        let doc = docs.get_mut(stock_code).ok_or_else(|| StoreError::Update {
            stock_code: stock_code.to_string(),
            source: "no document with this stock_code".into(),
        })?;
        patch.apply(doc);
        self.updates.fetch_add(1, Ordering::SeqCst);
        *self.last_patch.write().unwrap_or_else(|e| e.into_inner()) = Some(patch.clone());
        Ok(())
    }
}
