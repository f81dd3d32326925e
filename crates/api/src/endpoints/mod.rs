//! API endpoints.

mod event_management;
mod events;

use axum::Router;

use crate::middleware::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(events::router())
        .merge(event_management::router())
}
