use axum::{Router, routing::get};

use crate::{error::AppError, state::AppState};

pub mod auth;
pub mod doc;
pub mod health;
pub mod orders;

/// Every route the service exposes, state attached.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_check))
        .nest("/auth", auth::router())
        .nest("/orders", orders::router())
        .merge(doc::scalar_docs())
        .fallback(not_found)
        .with_state(state)
}

async fn not_found() -> AppError {
    AppError::NotFound
}
