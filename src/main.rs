use std::sync::Arc;

use axum::{routing::get, Router};
use sqlx::postgres::PgPoolOptions;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};

mod config;
mod db;
mod error;
mod handlers;
mod models;
mod serializers;

use crate::config::Config;
use crate::db::{CategoryRepository, MemoryStore, PgStore, ProductRepository};

/// Shared application state. Both repositories usually point at the same store.
#[derive(Clone)]
pub struct AppState {
    pub categories: Arc<dyn CategoryRepository>,
    pub products: Arc<dyn ProductRepository>,
}

impl AppState {
    pub fn postgres(pool: sqlx::PgPool) -> Self {
        let store = Arc::new(PgStore::new(pool));
        Self {
            categories: store.clone(),
            products: store,
        }
    }

    pub fn in_memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            categories: store.clone(),
            products: store,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present (ignored in production where env vars are injected)
    dotenv::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,inventory_api=debug")),
        )
        .with_target(false)
        .compact()
        .init();

    let config = Config::from_env()?;

    let state = match &config.database_url {
        Some(url) => {
            info!("Connecting to PostgreSQL...");
            let pool = PgPoolOptions::new()
                .max_connections(config.db_max_connections)
                .connect(url)
                .await?;
            info!("Database connection pool established.");

            info!("Running migrations...");
            sqlx::migrate!("./migrations").run(&pool).await?;
            info!("Migrations complete.");

            AppState::postgres(pool)
        }
        None => {
            warn!("DATABASE_URL not set, using the in-memory store (data is lost on exit)");
            AppState::in_memory()
        }
    };

    let app = build_router(state);

    let addr = format!("{}:{}", config.host, config.port);
    info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(handlers::index))
        .route("/health", get(handlers::health))

        // ── Categories ──────────────────────────────────────────────────────
        .route(
            "/categories/",
            get(handlers::categories::list_categories)
                .post(handlers::categories::create_category),
        )
        .route(
            "/categories/:id/",
            get(handlers::categories::get_category)
                .put(handlers::categories::update_category)
                .patch(handlers::categories::partial_update_category)
                .delete(handlers::categories::delete_category),
        )

        // ── Products ────────────────────────────────────────────────────────
        .route(
            "/products/",
            get(handlers::products::list_products).post(handlers::products::create_product),
        )
        .route(
            "/products/:id/",
            get(handlers::products::get_product)
                .put(handlers::products::update_product)
                .patch(handlers::products::partial_update_product)
                .delete(handlers::products::delete_product),
        )

        // ── Middleware ──────────────────────────────────────────────────────
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
