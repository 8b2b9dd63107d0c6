use axum::routing::{get, post};
use axum::Router;

use crate::handlers::{flux, method_not_allowed};
use crate::state::AppState;

/// ```text
/// POST   /flux-start    -> start
/// GET    /flux-status   -> status
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/flux-start", post(flux::start).fallback(method_not_allowed))
        .route(
            "/flux-status",
            get(flux::status).fallback(method_not_allowed),
        )
}
