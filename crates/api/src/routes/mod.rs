pub mod flux;
pub mod generate;
pub mod health;
pub mod uploads;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /flux-start                                     submit a Flux job (POST)
/// /flux-status?polling_url=&output_format=        one poll step (GET)
///
/// /generate                                       four angle variants (POST)
/// /composite                                      merge 1-3 images (POST)
///
/// /uploads                                        sequential upload (POST)
/// ```
///
/// Any other method on these paths answers 405 `method_not_allowed`.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .merge(flux::router())
        .merge(generate::router())
        .merge(uploads::router())
}
