//! Storefront core service binary.

use std::sync::Arc;

use anyhow::Result;
use rust_decimal::Decimal;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use storefront_core::http::{router, AppState};
use storefront_core::{
    CartEngine, Catalog, Checkout, DiscountPercent, InMemoryCatalog, InMemorySessionStore,
    NewProduct, Price, SessionStore, WishlistEngine,
};

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let catalog = InMemoryCatalog::new();
    seed_demo_catalog(&catalog).await?;

    let catalog: Arc<dyn Catalog> = Arc::new(catalog);
    let sessions: Arc<dyn SessionStore> = Arc::new(InMemorySessionStore::new());
    let state = AppState {
        cart: CartEngine::new(catalog.clone(), sessions.clone()),
        wishlist: WishlistEngine::new(catalog.clone(), sessions.clone()),
        checkout: Checkout::new(catalog, sessions),
    };

    let app = router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let port = std::env::var("PORT").unwrap_or_else(|_| "8083".to_string());
    tracing::info!("storefront-core listening on 0.0.0.0:{}", port);
    axum::serve(
        tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?,
        app,
    )
    .await?;
    Ok(())
}

async fn seed_demo_catalog(catalog: &InMemoryCatalog) -> Result<()> {
    let demo = [
        ("Goldfish Bowl", "Classic glass bowl", 45_000_00i64, 0u8, 12u32),
        ("Aquarium Filter", "Three-stage filtration", 120_000_00, 10, 8),
        ("6kg Gas Cylinder", "Refillable cylinder", 150_000_00, 0, 20),
        ("Gas Stove", "Two-burner tabletop stove", 250_000_00, 15, 5),
    ];
    for (name, brief, cents, discount, stock) in demo {
        catalog
            .insert(NewProduct {
                name: name.into(),
                brief: brief.into(),
                price: Price::new(Decimal::new(cents, 2))?,
                discount_percent: DiscountPercent::new(discount)?,
                stock,
            })
            .await;
    }
    Ok(())
}
