//! Domain logic: pricing, cart, wishlist, and the checkout transaction.

pub mod cart;
pub mod checkout;
pub mod pricing;
pub mod value_objects;
pub mod wishlist;

use std::fmt;

pub use cart::{CartEngine, CartLine, CartUpdate, MaterializedCart, MaterializedLine};
pub use checkout::{Checkout, OrderItem, OrderSnapshot};
pub use wishlist::{WishlistEngine, WishlistUpdate};

/// Advisory message accompanying a *successful* operation.
///
/// Notices are not errors: the operation went through, possibly in an
/// adjusted form, and the caller decides whether to show the message.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Notice {
    /// The requested quantity exceeded live stock and was clamped.
    QuantityAdjusted { available: u32 },
    /// The product was already on the wishlist; nothing changed.
    AlreadyInWishlist,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::QuantityAdjusted { available } => {
                write!(f, "Only {available} item(s) available; quantity adjusted.")
            }
            Self::AlreadyInWishlist => write!(f, "Item already in wishlist."),
        }
    }
}
