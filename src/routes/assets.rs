use std::path::Path;

use axum::{
    Router,
    http::{HeaderValue, header},
};
use tower_http::{
    services::{ServeDir, ServeFile},
    set_header::SetResponseHeaderLayer,
};

use crate::state::SharedState;

/// Serve the single-page bundle, falling back to `index.html` for client-side routes.
pub fn router(static_dir: &Path) -> Router<SharedState> {
    let index = ServeFile::new(static_dir.join("index.html"));
    Router::new()
        .fallback_service(ServeDir::new(static_dir).not_found_service(index))
        .layer(SetResponseHeaderLayer::if_not_present(
            header::CACHE_CONTROL,
            HeaderValue::from_static("public, max-age=300"),
        ))
}
