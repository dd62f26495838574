//! Cart engine: session-scoped line items staged against live inventory.
//!
//! Mutations load the session's cart record, rewrite it, and store it back
//! whole. Reads ("materialization") join the stored lines against the live
//! catalog and never persist anything.

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::{Catalog, Product};
use crate::domain::value_objects::Price;
use crate::domain::Notice;
use crate::error::{Result, StoreError};
use crate::session::{self, SessionStore, CART_KEY, SCHEMA_VERSION};

/// One stored cart line. The unit price is captured when the line is first
/// added and stays authoritative for the life of the line, even if the
/// catalog price changes afterwards.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub quantity: u32,
    pub unit_price: Price,
}

/// The persisted cart: product id to line, unordered.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct CartRecord {
    pub schema_version: u32,
    pub lines: HashMap<Uuid, CartLine>,
}

impl CartRecord {
    fn empty() -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            lines: HashMap::new(),
        }
    }
}

/// Result of a cart mutation: the line's resulting quantity (0 when the
/// line was removed or never existed) plus an optional advisory notice.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CartUpdate {
    pub product_id: Uuid,
    pub quantity: u32,
    pub notice: Option<Notice>,
}

/// A cart line joined against the live catalog, priced and subtotaled.
#[derive(Clone, Debug, Serialize)]
pub struct MaterializedLine {
    pub product: Product,
    pub quantity: u32,
    pub unit_price: Price,
    pub subtotal: Price,
}

#[derive(Clone, Debug, Serialize)]
pub struct MaterializedCart {
    pub lines: Vec<MaterializedLine>,
    pub total: Price,
}

impl MaterializedCart {
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }
}

#[derive(Clone)]
pub struct CartEngine {
    catalog: Arc<dyn Catalog>,
    sessions: Arc<dyn SessionStore>,
}

impl CartEngine {
    pub fn new(catalog: Arc<dyn Catalog>, sessions: Arc<dyn SessionStore>) -> Self {
        Self { catalog, sessions }
    }

    /// Adds a product (by slug) to the session's cart.
    ///
    /// A requested quantity below 1 is treated as 1. Requests beyond live
    /// stock are clamped with a [`Notice::QuantityAdjusted`]; a product with
    /// no stock at all is rejected with `OutOfStock` and the cart is left
    /// untouched. Merging into an existing line is likewise capped at live
    /// stock. The unit price is captured here, discount applied.
    pub async fn add(&self, session_id: &str, slug: &str, requested: u32) -> Result<CartUpdate> {
        let product = self
            .catalog
            .get_by_slug(slug)
            .await?
            .ok_or_else(|| StoreError::NotFound(slug.to_string()))?;

        if product.stock == 0 {
            return Err(StoreError::OutOfStock { name: product.name });
        }

        let requested = requested.max(1);
        let mut notice = None;
        let clamped = if requested > product.stock {
            notice = Some(Notice::QuantityAdjusted {
                available: product.stock,
            });
            product.stock
        } else {
            requested
        };

        let mut record = self.load(session_id).await?;
        let quantity = match record.lines.entry(product.id) {
            Entry::Occupied(mut entry) => {
                let line = entry.get_mut();
                line.quantity = (line.quantity + clamped).min(product.stock);
                line.quantity
            }
            Entry::Vacant(entry) => {
                entry.insert(CartLine {
                    quantity: clamped,
                    unit_price: product.discounted_price(),
                });
                clamped
            }
        };
        self.store(session_id, &record).await?;

        tracing::info!(product = %product.name, quantity, "added to cart");
        Ok(CartUpdate {
            product_id: product.id,
            quantity,
            notice,
        })
    }

    /// Sets a line's quantity exactly.
    ///
    /// A product not present in the cart is a silent no-op. Quantity 0
    /// removes the line; a quantity above live stock is clamped down with a
    /// notice. If stock has meanwhile dropped to 0 the line is removed
    /// rather than kept at an unorderable quantity.
    pub async fn set_quantity(
        &self,
        session_id: &str,
        product_id: Uuid,
        quantity: u32,
    ) -> Result<CartUpdate> {
        let mut record = self.load(session_id).await?;
        if !record.lines.contains_key(&product_id) {
            return Ok(CartUpdate {
                product_id,
                quantity: 0,
                notice: None,
            });
        }

        if quantity == 0 {
            record.lines.remove(&product_id);
            self.store(session_id, &record).await?;
            return Ok(CartUpdate {
                product_id,
                quantity: 0,
                notice: None,
            });
        }

        let product = self
            .catalog
            .get_by_id(product_id)
            .await?
            .ok_or_else(|| StoreError::NotFound(product_id.to_string()))?;

        let mut notice = None;
        let clamped = if quantity > product.stock {
            notice = Some(Notice::QuantityAdjusted {
                available: product.stock,
            });
            product.stock
        } else {
            quantity
        };

        if clamped == 0 {
            record.lines.remove(&product_id);
        } else if let Some(line) = record.lines.get_mut(&product_id) {
            line.quantity = clamped;
        }
        self.store(session_id, &record).await?;

        Ok(CartUpdate {
            product_id,
            quantity: clamped,
            notice,
        })
    }

    /// Joins the stored cart against the live catalog.
    ///
    /// Products that have vanished from the catalog are skipped without
    /// error. Each surviving line keeps its captured unit price; subtotals
    /// are quantized per line and the total is the sum of those already
    /// quantized subtotals. Pure read, safe to repeat.
    pub async fn materialize(&self, session_id: &str) -> Result<MaterializedCart> {
        let record = self.load(session_id).await?;
        let ids: Vec<Uuid> = record.lines.keys().copied().collect();
        let products = self.catalog.bulk_get(&ids).await?;

        let mut lines = Vec::with_capacity(record.lines.len());
        for (product_id, line) in &record.lines {
            let Some(product) = products.get(product_id) else {
                continue; // stale reference, product no longer sold
            };
            lines.push(MaterializedLine {
                product: product.clone(),
                quantity: line.quantity,
                unit_price: line.unit_price,
                subtotal: line.unit_price.times(line.quantity),
            });
        }
        lines.sort_by(|a, b| {
            (a.product.name.as_str(), a.product.id).cmp(&(b.product.name.as_str(), b.product.id))
        });

        let total = lines
            .iter()
            .fold(Price::zero(), |acc, l| acc.add(l.subtotal));
        Ok(MaterializedCart { lines, total })
    }

    /// Empties the cart unconditionally.
    pub async fn clear(&self, session_id: &str) -> Result<()> {
        self.store(session_id, &CartRecord::empty()).await
    }

    async fn load(&self, session_id: &str) -> Result<CartRecord> {
        Ok(session::load_record(self.sessions.as_ref(), session_id, CART_KEY)
            .await?
            .unwrap_or_else(CartRecord::empty))
    }

    async fn store(&self, session_id: &str, record: &CartRecord) -> Result<()> {
        session::store_record(self.sessions.as_ref(), session_id, CART_KEY, record).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{InMemoryCatalog, NewProduct};
    use crate::domain::value_objects::{DiscountPercent, Price};
    use crate::session::InMemorySessionStore;
    use rust_decimal::Decimal;

    const SESSION: &str = "test-session";

    async fn setup() -> (InMemoryCatalog, CartEngine) {
        let catalog = InMemoryCatalog::new();
        let engine = CartEngine::new(
            Arc::new(catalog.clone()),
            Arc::new(InMemorySessionStore::new()),
        );
        (catalog, engine)
    }

    fn product(name: &str, cents: i64, discount: u8, stock: u32) -> NewProduct {
        NewProduct {
            name: name.into(),
            brief: String::new(),
            price: Price::new(Decimal::new(cents, 2)).unwrap(),
            discount_percent: DiscountPercent::new(discount).unwrap(),
            stock,
        }
    }

    #[tokio::test]
    async fn add_unknown_slug_is_not_found() {
        let (_, engine) = setup().await;
        let err = engine.add(SESSION, "nope", 1).await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn add_out_of_stock_rejects_without_mutation() {
        let (catalog, engine) = setup().await;
        catalog.insert(product("Gas Stove", 250_00, 0, 0)).await;

        let err = engine.add(SESSION, "gas-stove", 1).await.unwrap_err();
        assert!(matches!(err, StoreError::OutOfStock { .. }));
        assert!(engine.materialize(SESSION).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn add_clamps_to_stock_with_notice() {
        let (catalog, engine) = setup().await;
        catalog.insert(product("Filter", 120_00, 0, 2)).await;

        let update = engine.add(SESSION, "filter", 5).await.unwrap();
        assert_eq!(update.quantity, 2);
        assert_eq!(update.notice, Some(Notice::QuantityAdjusted { available: 2 }));
    }

    #[tokio::test]
    async fn repeated_adds_never_exceed_stock() {
        let (catalog, engine) = setup().await;
        catalog.insert(product("Filter", 120_00, 0, 3)).await;

        engine.add(SESSION, "filter", 2).await.unwrap();
        let update = engine.add(SESSION, "filter", 2).await.unwrap();
        assert_eq!(update.quantity, 3); // merged, capped at stock
        assert_eq!(update.notice, None);
    }

    #[tokio::test]
    async fn zero_requested_quantity_is_treated_as_one() {
        let (catalog, engine) = setup().await;
        catalog.insert(product("Filter", 120_00, 0, 3)).await;

        let update = engine.add(SESSION, "filter", 0).await.unwrap();
        assert_eq!(update.quantity, 1);
    }

    #[tokio::test]
    async fn set_quantity_for_absent_line_is_a_noop() {
        let (catalog, engine) = setup().await;
        let p = catalog.insert(product("Filter", 120_00, 0, 3)).await;

        let update = engine.set_quantity(SESSION, p.id, 2).await.unwrap();
        assert_eq!(update.quantity, 0);
        assert!(engine.materialize(SESSION).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn set_quantity_zero_removes_the_line() {
        let (catalog, engine) = setup().await;
        let p = catalog.insert(product("Filter", 120_00, 0, 3)).await;

        engine.add(SESSION, "filter", 2).await.unwrap();
        engine.set_quantity(SESSION, p.id, 0).await.unwrap();
        assert!(engine.materialize(SESSION).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn set_quantity_clamps_to_stock() {
        let (catalog, engine) = setup().await;
        let p = catalog.insert(product("Filter", 120_00, 0, 3)).await;

        engine.add(SESSION, "filter", 1).await.unwrap();
        let update = engine.set_quantity(SESSION, p.id, 10).await.unwrap();
        assert_eq!(update.quantity, 3);
        assert_eq!(update.notice, Some(Notice::QuantityAdjusted { available: 3 }));
    }

    #[tokio::test]
    async fn materialize_uses_captured_price_after_catalog_change() {
        let (catalog, engine) = setup().await;
        let p = catalog.insert(product("Filter", 100_00, 10, 5)).await;

        engine.add(SESSION, "filter", 1).await.unwrap();
        catalog
            .set_price(p.id, Price::new(Decimal::new(200_00, 2)).unwrap())
            .await;

        let cart = engine.materialize(SESSION).await.unwrap();
        assert_eq!(cart.lines[0].unit_price.amount(), Decimal::new(90_00, 2));
    }

    #[tokio::test]
    async fn materialize_drops_vanished_products() {
        let (catalog, engine) = setup().await;
        let p = catalog.insert(product("Filter", 120_00, 0, 3)).await;
        catalog.insert(product("Bowl", 45_00, 0, 3)).await;

        engine.add(SESSION, "filter", 1).await.unwrap();
        engine.add(SESSION, "bowl", 2).await.unwrap();
        catalog.remove(p.id).await;

        let cart = engine.materialize(SESSION).await.unwrap();
        assert_eq!(cart.lines.len(), 1);
        assert_eq!(cart.lines[0].product.name, "Bowl");
        assert_eq!(cart.total.amount(), Decimal::new(90_00, 2));
    }

    #[tokio::test]
    async fn materialize_is_idempotent() {
        let (catalog, engine) = setup().await;
        catalog.insert(product("Filter", 120_00, 25, 3)).await;
        catalog.insert(product("Bowl", 45_00, 0, 3)).await;

        engine.add(SESSION, "filter", 2).await.unwrap();
        engine.add(SESSION, "bowl", 1).await.unwrap();

        let first = engine.materialize(SESSION).await.unwrap();
        let second = engine.materialize(SESSION).await.unwrap();
        assert_eq!(first.total, second.total);
        assert_eq!(
            first.lines.iter().map(|l| (l.product.id, l.quantity)).collect::<Vec<_>>(),
            second.lines.iter().map(|l| (l.product.id, l.quantity)).collect::<Vec<_>>()
        );
    }

    #[tokio::test]
    async fn subtotals_are_rounded_per_line_before_summing() {
        let (catalog, engine) = setup().await;
        // 0.03 at 50% -> unit 0.02 (half-up); 3 units -> 0.06
        catalog.insert(product("Penny Sweet", 3, 50, 10)).await;

        engine.add(SESSION, "penny-sweet", 3).await.unwrap();
        let cart = engine.materialize(SESSION).await.unwrap();
        assert_eq!(cart.lines[0].unit_price.amount(), Decimal::new(2, 2));
        assert_eq!(cart.total.amount(), Decimal::new(6, 2));
    }

    #[tokio::test]
    async fn clear_empties_the_cart() {
        let (catalog, engine) = setup().await;
        catalog.insert(product("Filter", 120_00, 0, 3)).await;

        engine.add(SESSION, "filter", 1).await.unwrap();
        engine.clear(SESSION).await.unwrap();
        assert!(engine.materialize(SESSION).await.unwrap().is_empty());
    }
}
