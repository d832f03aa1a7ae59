pub mod health;
pub mod invite;

use axum::Router;

use crate::state::AppState;

/// Create the API router with all routes
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api", api_routes())
        .merge(health::health_routes())
        .with_state(state)
}

fn api_routes() -> Router<AppState> {
    Router::new().merge(invite::invite_routes())
}
