//! Product catalog: the shared inventory the core sells against.
//!
//! The catalog is an external collaborator from the cart's point of view.
//! [`Catalog`] is the seam; [`memory::InMemoryCatalog`] is the bundled
//! implementation used by the binary and the tests.

pub mod memory;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use uuid::Uuid;

use crate::domain::pricing;
use crate::domain::value_objects::{DiscountPercent, Price, Slug};
use crate::error::Result;

pub use memory::InMemoryCatalog;

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Product {
    pub id: Uuid,
    pub slug: Slug,
    pub name: String,
    pub brief: String,
    pub price: Price,
    pub discount_percent: DiscountPercent,
    pub stock: u32,
    pub created_at: DateTime<Utc>,
}

impl Product {
    /// Unit price after the product's discount, quantized half-up.
    pub fn discounted_price(&self) -> Price {
        pricing::effective_unit_price(self.price, self.discount_percent)
    }

    pub fn discount_amount(&self) -> Price {
        pricing::discount_amount(self.price, self.discount_percent)
    }

    pub fn has_discount(&self) -> bool {
        !self.discount_percent.is_zero()
    }

    pub fn is_in_stock(&self) -> bool {
        self.stock > 0
    }

    pub fn is_low_stock(&self, threshold: u32) -> bool {
        self.stock > 0 && self.stock <= threshold
    }
}

/// Input for seeding a product into the catalog.
#[derive(Clone, Debug)]
pub struct NewProduct {
    pub name: String,
    pub brief: String,
    pub price: Price,
    pub discount_percent: DiscountPercent,
    pub stock: u32,
}

/// One line of an atomic stock commit.
#[derive(Clone, Copy, Debug)]
pub struct StockDecrement {
    pub product_id: Uuid,
    pub quantity: u32,
}

/// Read/write access to the shared product inventory.
///
/// `decrement_stock` is the only mutation the core performs and carries the
/// central contract of the whole crate: the batch is applied all-or-nothing,
/// and no product's stock ever goes negative. Implementations must perform
/// the check and the decrement of every line inside one transaction (or one
/// writer critical section) and surface [`StoreError::InsufficientStock`]
/// for the first shortfall, or [`StoreError::Conflict`] on transactional
/// contention, without applying anything.
///
/// [`StoreError::InsufficientStock`]: crate::error::StoreError::InsufficientStock
/// [`StoreError::Conflict`]: crate::error::StoreError::Conflict
#[async_trait]
pub trait Catalog: Send + Sync {
    async fn get_by_id(&self, id: Uuid) -> Result<Option<Product>>;

    async fn get_by_slug(&self, slug: &str) -> Result<Option<Product>>;

    /// Resolves a set of ids in one call. Missing ids are simply absent
    /// from the returned map.
    async fn bulk_get(&self, ids: &[Uuid]) -> Result<HashMap<Uuid, Product>>;

    /// Atomically decrements stock for every line, or nothing at all.
    async fn decrement_stock(&self, lines: &[StockDecrement]) -> Result<()>;
}
