//! Error type shared by every storefront operation.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    /// The referenced product does not exist in the catalog.
    #[error("product not found: {0}")]
    NotFound(String),

    /// The product has no sellable units left; nothing was changed.
    #[error("{name} is out of stock")]
    OutOfStock { name: String },

    /// A checkout line asked for more units than the catalog holds.
    /// The whole checkout aborts; no stock is changed.
    #[error("not enough stock for {name}")]
    InsufficientStock { name: String },

    /// Checkout was attempted with an empty cart.
    #[error("cart is empty")]
    EmptyCart,

    /// The catalog transaction lost a race with a concurrent checkout.
    /// The caller should retry the whole checkout.
    #[error("stock update conflicted, retry checkout")]
    Conflict,

    /// Malformed input (negative price, discount outside 0-100, bad slug).
    #[error("validation failed: {0}")]
    Validation(String),

    /// The session store could not read or write a value.
    #[error("session storage error: {0}")]
    Session(String),
}

pub type Result<T> = std::result::Result<T, StoreError>;
