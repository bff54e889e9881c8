//! API route definitions

mod deletion;
mod health;
mod identify;
mod prices;

use axum::Router;

use crate::AppState;

/// Create all API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(identify::routes())
        .merge(prices::routes())
        .merge(deletion::routes())
        .merge(health::routes())
}

/// Full application router under `/api`
pub fn router(state: AppState) -> Router {
    Router::new().nest("/api", api_routes()).with_state(state)
}
