//! Checkout: the atomic transition from cart to committed stock decrement.
//!
//! Single pass, no retries: materialize, commit the stock decrement as one
//! atomic catalog operation, snapshot the order, clear the cart. Stock
//! validation is folded into the decrement itself so there is no
//! check-then-act window between seeing a count and committing against it.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::{Catalog, StockDecrement};
use crate::domain::cart::{CartEngine, MaterializedCart};
use crate::domain::value_objects::Price;
use crate::error::{Result, StoreError};
use crate::session::{self, SessionStore, LAST_ORDER_KEY, SCHEMA_VERSION};

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OrderItem {
    pub product_id: Uuid,
    pub name: String,
    pub unit_price: Price,
    pub quantity: u32,
    pub subtotal: Price,
}

/// Immutable record of one successful checkout. Held in the session's
/// `last_order` slot until the next order overwrites it; not a ledger.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OrderSnapshot {
    pub schema_version: u32,
    pub items: Vec<OrderItem>,
    pub total: Price,
    pub placed_at: DateTime<Utc>,
}

impl OrderSnapshot {
    fn from_cart(cart: &MaterializedCart) -> Self {
        Self {
            schema_version: SCHEMA_VERSION,
            items: cart
                .lines
                .iter()
                .map(|line| OrderItem {
                    product_id: line.product.id,
                    name: line.product.name.clone(),
                    unit_price: line.unit_price,
                    quantity: line.quantity,
                    subtotal: line.subtotal,
                })
                .collect(),
            total: cart.total,
            placed_at: Utc::now(),
        }
    }
}

#[derive(Clone)]
pub struct Checkout {
    catalog: Arc<dyn Catalog>,
    sessions: Arc<dyn SessionStore>,
    cart: CartEngine,
}

impl Checkout {
    pub fn new(catalog: Arc<dyn Catalog>, sessions: Arc<dyn SessionStore>) -> Self {
        let cart = CartEngine::new(catalog.clone(), sessions.clone());
        Self {
            catalog,
            sessions,
            cart,
        }
    }

    /// Places the order staged in the session's cart.
    ///
    /// An empty cart fails with `EmptyCart` before anything is touched. The
    /// stock decrement for every line is one atomic catalog call: if any
    /// line exceeds live stock the whole checkout aborts with
    /// `InsufficientStock` and no count changes. Only after the commit
    /// succeeds is the snapshot stored and the cart cleared.
    pub async fn place_order(&self, session_id: &str) -> Result<OrderSnapshot> {
        let cart = self.cart.materialize(session_id).await?;
        if cart.is_empty() {
            return Err(StoreError::EmptyCart);
        }

        let decrements: Vec<StockDecrement> = cart
            .lines
            .iter()
            .map(|line| StockDecrement {
                product_id: line.product.id,
                quantity: line.quantity,
            })
            .collect();
        self.catalog.decrement_stock(&decrements).await?;

        let snapshot = OrderSnapshot::from_cart(&cart);
        session::store_record(self.sessions.as_ref(), session_id, LAST_ORDER_KEY, &snapshot)
            .await?;
        self.cart.clear(session_id).await?;

        tracing::info!(
            items = snapshot.items.len(),
            total = %snapshot.total,
            "order placed"
        );
        Ok(snapshot)
    }

    /// The snapshot of the session's most recent order, if any.
    pub async fn last_order(&self, session_id: &str) -> Result<Option<OrderSnapshot>> {
        session::load_record(self.sessions.as_ref(), session_id, LAST_ORDER_KEY).await
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

    struct Fixture {
        catalog: InMemoryCatalog,
        cart: CartEngine,
        checkout: Checkout,
    }

    async fn setup() -> Fixture {
        let catalog = InMemoryCatalog::new();
        let sessions = InMemorySessionStore::new();
        let catalog_arc: Arc<dyn Catalog> = Arc::new(catalog.clone());
        let sessions_arc: Arc<dyn SessionStore> = Arc::new(sessions);
        Fixture {
            catalog,
            cart: CartEngine::new(catalog_arc.clone(), sessions_arc.clone()),
            checkout: Checkout::new(catalog_arc, sessions_arc),
        }
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
    async fn empty_cart_cannot_check_out() {
        let fx = setup().await;
        assert!(matches!(
            fx.checkout.place_order(SESSION).await.unwrap_err(),
            StoreError::EmptyCart
        ));
    }

    #[tokio::test]
    async fn shortfall_aborts_whole_checkout() {
        let fx = setup().await;
        let a = fx.catalog.insert(product("A", 10_00, 0, 5)).await;
        let b = fx.catalog.insert(product("B", 20_00, 0, 2)).await;

        fx.cart.add(SESSION, "a", 2).await.unwrap();
        fx.cart.add(SESSION, "b", 2).await.unwrap();
        // Another shopper drains B between add and checkout.
        fx.catalog
            .decrement_stock(&[StockDecrement { product_id: b.id, quantity: 2 }])
            .await
            .unwrap();

        let err = fx.checkout.place_order(SESSION).await.unwrap_err();
        assert!(matches!(err, StoreError::InsufficientStock { .. }));

        // No stock changed beyond the simulated other shopper, cart intact.
        assert_eq!(fx.catalog.stock_of(a.id).await, Some(5));
        assert_eq!(fx.cart.materialize(SESSION).await.unwrap().lines.len(), 2);
        assert!(fx.checkout.last_order(SESSION).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn successful_checkout_commits_snapshot_and_clears_cart() {
        let fx = setup().await;
        let a = fx.catalog.insert(product("A", 100_00, 10, 2)).await;

        fx.cart.add(SESSION, "a", 2).await.unwrap();
        let staged_total = fx.cart.materialize(SESSION).await.unwrap().total;

        let snapshot = fx.checkout.place_order(SESSION).await.unwrap();
        assert_eq!(snapshot.total, staged_total);
        assert_eq!(snapshot.items.len(), 1);
        assert_eq!(snapshot.items[0].quantity, 2);
        assert_eq!(fx.catalog.stock_of(a.id).await, Some(0));
        assert!(fx.cart.materialize(SESSION).await.unwrap().is_empty());

        let last = fx.checkout.last_order(SESSION).await.unwrap().unwrap();
        assert_eq!(last.total, snapshot.total);
    }

    #[tokio::test]
    async fn next_order_overwrites_the_snapshot() {
        let fx = setup().await;
        fx.catalog.insert(product("A", 10_00, 0, 5)).await;

        fx.cart.add(SESSION, "a", 1).await.unwrap();
        fx.checkout.place_order(SESSION).await.unwrap();
        fx.cart.add(SESSION, "a", 3).await.unwrap();
        fx.checkout.place_order(SESSION).await.unwrap();

        let last = fx.checkout.last_order(SESSION).await.unwrap().unwrap();
        assert_eq!(last.items[0].quantity, 3);
    }
}
