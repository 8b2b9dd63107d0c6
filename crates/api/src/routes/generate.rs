use axum::routing::post;
use axum::Router;

use crate::handlers::{generate, method_not_allowed};
use crate::state::AppState;

/// ```text
/// POST   /generate     -> variants
/// POST   /composite    -> composite
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/generate",
            post(generate::variants).fallback(method_not_allowed),
        )
        .route(
            "/composite",
            post(generate::composite).fallback(method_not_allowed),
        )
}
