//! Storefront order-staging core.
//!
//! Maintains a per-session shopping cart and wishlist against a shared,
//! finite product inventory, computes discounted prices, and commits orders
//! with an atomic, all-or-nothing stock decrement.
//!
//! ## Layout
//! - [`catalog`]: products and the [`catalog::Catalog`] inventory seam
//! - [`session`]: per-visitor key-value storage ([`session::SessionStore`])
//! - [`domain`]: pricing, cart engine, wishlist engine, checkout
//! - [`http`]: thin axum surface exposing the operations
//!
//! The one protected invariant is stock: it never goes negative, enforced
//! solely by the checkout path through `Catalog::decrement_stock`.

pub mod catalog;
pub mod domain;
pub mod error;
pub mod http;
pub mod session;

pub use catalog::{Catalog, InMemoryCatalog, NewProduct, Product, StockDecrement};
pub use domain::value_objects::{DiscountPercent, Price, Slug};
pub use domain::{
    CartEngine, CartLine, CartUpdate, Checkout, MaterializedCart, MaterializedLine, Notice,
    OrderItem, OrderSnapshot, WishlistEngine, WishlistUpdate,
};
pub use error::{Result, StoreError};
pub use session::{InMemorySessionStore, SessionStore};
