use axum::Router;

use crate::state::SharedState;

/// Static single-page bundle.
pub mod assets;
/// Swagger UI.
pub mod docs;
/// Health check.
pub mod health;
/// Session lifecycle and card activation.
pub mod session;
/// Session event streams.
pub mod sse;

/// Compose all route trees, wiring in shared state, documentation and the static bundle.
pub fn router(state: SharedState) -> Router<()> {
    let api_router = health::router()
        .merge(session::router())
        .merge(sse::router());

    let assets_router = assets::router(&state.config().assets.static_dir);

    api_router
        .merge(docs::router())
        .merge(assets_router)
        .with_state(state)
}
