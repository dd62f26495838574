//! Per-visitor session storage.
//!
//! A session holds at most three slots: the cart, the wishlist, and the
//! snapshot of the last placed order. Values are opaque JSON; the typed
//! records that round-trip through them carry a `schema_version` field so
//! the layout can evolve without corrupting live sessions.

pub mod memory;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::{Result, StoreError};

pub use memory::InMemorySessionStore;

pub const CART_KEY: &str = "cart";
pub const WISHLIST_KEY: &str = "wishlist";
pub const LAST_ORDER_KEY: &str = "last_order";

/// Version written into every persisted session record.
pub const SCHEMA_VERSION: u32 = 1;

/// Durable per-session key-value storage. Values written under one session
/// id are never visible to another.
#[async_trait]
pub trait SessionStore: Send + Sync {
    async fn get(&self, session_id: &str, key: &str) -> Result<Option<Value>>;

    async fn set(&self, session_id: &str, key: &str, value: Value) -> Result<()>;
}

/// Reads a typed record out of a session slot.
pub(crate) async fn load_record<T: DeserializeOwned>(
    store: &dyn SessionStore,
    session_id: &str,
    key: &str,
) -> Result<Option<T>> {
    match store.get(session_id, key).await? {
        Some(value) => serde_json::from_value(value)
            .map(Some)
            .map_err(|e| StoreError::Session(format!("corrupt {key} record: {e}"))),
        None => Ok(None),
    }
}

/// Writes a typed record into a session slot.
pub(crate) async fn store_record<T: Serialize>(
    store: &dyn SessionStore,
    session_id: &str,
    key: &str,
    record: &T,
) -> Result<()> {
    let value = serde_json::to_value(record)
        .map_err(|e| StoreError::Session(format!("cannot encode {key} record: {e}")))?;
    store.set(session_id, key, value).await
}
