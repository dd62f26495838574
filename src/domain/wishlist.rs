//! Wishlist engine: an ordered, deduplicated list of product references.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::{Catalog, Product};
use crate::domain::Notice;
use crate::error::{Result, StoreError};
use crate::session::{self, SessionStore, SCHEMA_VERSION, WISHLIST_KEY};

/// The persisted wishlist: product ids in insertion order, no duplicates.
///
/// Ids are never purged when a product leaves the catalog; `list` simply
/// skips ids it cannot resolve. An id that later reappears in the catalog
/// resurfaces in its original position.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WishlistRecord {
    pub schema_version: u32,
    pub product_ids: Vec<Uuid>,
}

impl WishlistRecord {
    fn empty() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            product_ids: Vec::new(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WishlistUpdate {
    pub product_id: Uuid,
    pub notice: Option<Notice>,
}

#[derive(Clone)]
pub struct WishlistEngine {
    catalog: Arc<dyn Catalog>,
    sessions: Arc<dyn SessionStore>,
}

impl WishlistEngine {
    pub fn new(catalog: Arc<dyn Catalog>, sessions: Arc<dyn SessionStore>) -> Self {
        Self { catalog, sessions }
    }

    /// Appends a product (by slug) to the end of the wishlist.
    ///
    /// Already-present products are left where they are and reported with
    /// an advisory notice, not an error.
    pub async fn add(&self, session_id: &str, slug: &str) -> Result<WishlistUpdate> {
        let product = self
            .catalog
            .get_by_slug(slug)
            .await?
            .ok_or_else(|| StoreError::NotFound(slug.to_string()))?;

        let mut record = self.load(session_id).await?;
        if record.product_ids.contains(&product.id) {
            return Ok(WishlistUpdate {
                product_id: product.id,
                notice: Some(Notice::AlreadyInWishlist),
            });
        }

        record.product_ids.push(product.id);
        self.store(session_id, &record).await?;

        tracing::info!(product = %product.name, "added to wishlist");
        Ok(WishlistUpdate {
            product_id: product.id,
            notice: None,
        })
    }

    /// Removes a product (by slug) if present; absent is a no-op.
    pub async fn remove(&self, session_id: &str, slug: &str) -> Result<()> {
        let product = self
            .catalog
            .get_by_slug(slug)
            .await?
            .ok_or_else(|| StoreError::NotFound(slug.to_string()))?;

        let mut record = self.load(session_id).await?;
        let before = record.product_ids.len();
        record.product_ids.retain(|id| *id != product.id);
        if record.product_ids.len() != before {
            self.store(session_id, &record).await?;
        }
        Ok(())
    }

    /// Resolves the wishlist against the catalog, preserving insertion
    /// order. Products no longer in the catalog are absent from the result.
    pub async fn list(&self, session_id: &str) -> Result<Vec<Product>> {
        let record = self.load(session_id).await?;
        let mut products = self.catalog.bulk_get(&record.product_ids).await?;
        Ok(record
            .product_ids
            .iter()
            .filter_map(|id| products.remove(id))
            .collect())
    }

    async fn load(&self, session_id: &str) -> Result<WishlistRecord> {
        Ok(
            session::load_record(self.sessions.as_ref(), session_id, WISHLIST_KEY)
                .await?
                .unwrap_or_else(WishlistRecord::empty),
        )
    }

    async fn store(&self, session_id: &str, record: &WishlistRecord) -> Result<()> {
        session::store_record(self.sessions.as_ref(), session_id, WISHLIST_KEY, record).await
    }
}
