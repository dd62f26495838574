//! In-memory catalog backing the binary and the test suite.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::RwLock;
use uuid::Uuid;

use crate::catalog::{Catalog, NewProduct, Product, StockDecrement};
use crate::error::{Result, StoreError};

#[derive(Default)]
struct CatalogState {
    products: HashMap<Uuid, Product>,
    by_slug: HashMap<String, Uuid>,
}

/// Catalog held behind a single writer lock.
///
/// The lock is what makes `decrement_stock` atomic: every line is checked
/// and applied while the write guard is held, so two concurrent checkouts
/// racing for the last unit serialize and exactly one succeeds.
#[derive(Clone, Default)]
pub struct InMemoryCatalog {
    state: Arc<RwLock<CatalogState>>,
}

impl InMemoryCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a product, deriving a unique slug from its name.
    pub async fn insert(&self, new: NewProduct) -> Product {
        let mut state = self.state.write().await;
        let base = crate::domain::value_objects::Slug::from_name(&new.name);
        let mut slug = base.clone();
        let mut counter = 1;
        while state.by_slug.contains_key(slug.as_str()) {
            slug = base.with_suffix(counter);
            counter += 1;
        }
        let product = Product {
            id: Uuid::new_v4(),
            slug: slug.clone(),
            name: new.name,
            brief: new.brief,
            price: new.price,
            discount_percent: new.discount_percent,
            stock: new.stock,
            created_at: Utc::now(),
        };
        state.by_slug.insert(slug.as_str().to_string(), product.id);
        state.products.insert(product.id, product.clone());
        product
    }

    /// Removes a product entirely, as an admin surface would.
    pub async fn remove(&self, id: Uuid) -> Option<Product> {
        let mut state = self.state.write().await;
        let product = state.products.remove(&id)?;
        state.by_slug.remove(product.slug.as_str());
        Some(product)
    }

    /// Current stock level, for assertions in tests.
    pub async fn stock_of(&self, id: Uuid) -> Option<u32> {
        self.state.read().await.products.get(&id).map(|p| p.stock)
    }

    /// Overwrites a product's base price, keeping everything else.
    pub async fn set_price(&self, id: Uuid, price: crate::domain::value_objects::Price) {
        if let Some(p) = self.state.write().await.products.get_mut(&id) {
            p.price = price;
        }
    }
}

#[async_trait]
impl Catalog for InMemoryCatalog {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Product>> {
        Ok(self.state.read().await.products.get(&id).cloned())
    }

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Product>> {
        let state = self.state.read().await;
        Ok(state
            .by_slug
            .get(slug)
            .and_then(|id| state.products.get(id))
            .cloned())
    }

    async fn bulk_get(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, Product>> {
        let state = self.state.read().await;
        Ok(ids
            .iter()
            .filter_map(|id| state.products.get(id).map(|p| (*id, p.clone())))
            .collect())
    }

    async fn decrement_stock(&self, lines: &[StockDecrement]) -> Result<()> {
        let mut state = self.state.write().await;

        // Check every line before touching any stock count.
        for line in lines {
            let product = state
                .products
                .get(&line.product_id)
                .ok_or_else(|| StoreError::NotFound(line.product_id.to_string()))?;
            if line.quantity > product.stock {
                return Err(StoreError::InsufficientStock {
                    name: product.name.clone(),
                });
            }
        }

        for line in lines {
            if let Some(product) = state.products.get_mut(&line.product_id) {
                product.stock -= line.quantity;
                tracing::debug!(
                    product = %product.name,
                    remaining = product.stock,
                    "stock decremented"
                );
            }
        }
        Ok(())
    }
}
