//! Thin HTTP surface over the storefront core.
//!
//! One route per exposed operation, JSON in and out. No rendering, search,
//! or admin surface lives here; this is just the glue a storefront frontend
//! calls.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::catalog::Product;
use crate::domain::{CartEngine, Checkout, MaterializedCart, OrderSnapshot, WishlistEngine};
use crate::error::StoreError;

#[derive(Clone)]
pub struct AppState {
    pub cart: CartEngine,
    pub wishlist: WishlistEngine,
    pub checkout: Checkout,
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route(
            "/health",
            get(|| async { Json(serde_json::json!({"status": "healthy", "service": "storefront-core"})) }),
        )
        .route("/api/v1/cart/:session", get(get_cart).delete(clear_cart))
        .route("/api/v1/cart/:session/items", post(add_to_cart))
        .route("/api/v1/cart/:session/items/:product_id", put(set_quantity))
        .route("/api/v1/wishlist/:session", get(get_wishlist))
        .route("/api/v1/wishlist/:session/items", post(add_to_wishlist))
        .route(
            "/api/v1/wishlist/:session/items/:slug",
            axum::routing::delete(remove_from_wishlist),
        )
        .route("/api/v1/checkout/:session", post(place_order))
        .route("/api/v1/orders/:session/last", get(last_order))
        .with_state(state)
}

impl IntoResponse for StoreError {
    fn into_response(self) -> Response {
        let status = match &self {
            StoreError::NotFound(_) => StatusCode::NOT_FOUND,
            StoreError::OutOfStock { .. }
            | StoreError::InsufficientStock { .. }
            | StoreError::EmptyCart => StatusCode::CONFLICT,
            StoreError::Conflict => StatusCode::SERVICE_UNAVAILABLE,
            StoreError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            StoreError::Session(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        (status, Json(serde_json::json!({"error": self.to_string()}))).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub slug: String,
    pub quantity: Option<u32>,
}

#[derive(Debug, Deserialize)]
pub struct SetQuantityRequest {
    pub quantity: u32,
}

#[derive(Debug, Serialize)]
pub struct CartUpdateResponse {
    pub product_id: Uuid,
    pub quantity: u32,
    pub notice: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct WishlistAddRequest {
    pub slug: String,
}

#[derive(Debug, Serialize)]
pub struct WishlistUpdateResponse {
    pub product_id: Uuid,
    pub notice: Option<String>,
}

async fn get_cart(
    State(s): State<AppState>,
    Path(session): Path<String>,
) -> Result<Json<MaterializedCart>, StoreError> {
    Ok(Json(s.cart.materialize(&session).await?))
}

async fn add_to_cart(
    State(s): State<AppState>,
    Path(session): Path<String>,
    Json(r): Json<AddToCartRequest>,
) -> Result<(StatusCode, Json<CartUpdateResponse>), StoreError> {
    let update = s.cart.add(&session, &r.slug, r.quantity.unwrap_or(1)).await?;
    Ok((
        StatusCode::CREATED,
        Json(CartUpdateResponse {
            product_id: update.product_id,
            quantity: update.quantity,
            notice: update.notice.map(|n| n.to_string()),
        }),
    ))
}

async fn set_quantity(
    State(s): State<AppState>,
    Path((session, product_id)): Path<(String, Uuid)>,
    Json(r): Json<SetQuantityRequest>,
) -> Result<Json<CartUpdateResponse>, StoreError> {
    let update = s.cart.set_quantity(&session, product_id, r.quantity).await?;
    Ok(Json(CartUpdateResponse {
        product_id: update.product_id,
        quantity: update.quantity,
        notice: update.notice.map(|n| n.to_string()),
    }))
}

async fn clear_cart(
    State(s): State<AppState>,
    Path(session): Path<String>,
) -> Result<StatusCode, StoreError> {
    s.cart.clear(&session).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_wishlist(
    State(s): State<AppState>,
    Path(session): Path<String>,
) -> Result<Json<Vec<Product>>, StoreError> {
    Ok(Json(s.wishlist.list(&session).await?))
}

async fn add_to_wishlist(
    State(s): State<AppState>,
    Path(session): Path<String>,
    Json(r): Json<WishlistAddRequest>,
) -> Result<(StatusCode, Json<WishlistUpdateResponse>), StoreError> {
    let update = s.wishlist.add(&session, &r.slug).await?;
    Ok((
        StatusCode::CREATED,
        Json(WishlistUpdateResponse {
            product_id: update.product_id,
            notice: update.notice.map(|n| n.to_string()),
        }),
    ))
}

async fn remove_from_wishlist(
    State(s): State<AppState>,
    Path((session, slug)): Path<(String, String)>,
) -> Result<StatusCode, StoreError> {
    s.wishlist.remove(&session, &slug).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn place_order(
    State(s): State<AppState>,
    Path(session): Path<String>,
) -> Result<(StatusCode, Json<OrderSnapshot>), StoreError> {
    let snapshot = s.checkout.place_order(&session).await?;
    Ok((StatusCode::CREATED, Json(snapshot)))
}

async fn last_order(
    State(s): State<AppState>,
    Path(session): Path<String>,
) -> Result<Json<OrderSnapshot>, Response> {
    match s.checkout.last_order(&session).await {
        Ok(Some(snapshot)) => Ok(Json(snapshot)),
        Ok(None) => Err((
            StatusCode::NOT_FOUND,
            Json(serde_json::json!({"error": "no order placed yet"})),
        )
            .into_response()),
        Err(e) => Err(e.into_response()),
    }
}
