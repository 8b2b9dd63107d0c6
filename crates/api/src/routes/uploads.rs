use axum::routing::post;
use axum::Router;

use crate::handlers::{method_not_allowed, uploads};
use crate::state::AppState;

/// ```text
/// POST   /uploads      -> upload_batch
/// ```
pub fn router() -> Router<AppState> {
    Router::new().route(
        "/uploads",
        post(uploads::upload_batch).fallback(method_not_allowed),
    )
}
