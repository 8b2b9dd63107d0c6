pub mod flux;
pub mod generate;
pub mod uploads;

use axum::extract::rejection::JsonRejection;
use axum::Json;

use crate::error::{AppError, AppResult};

/// Fallback for every route: any method other than the one the route
/// serves.
pub async fn method_not_allowed() -> AppError {
    AppError::MethodNotAllowed
}

/// Unwrap a JSON body, reporting malformed input as `bad_request`.
pub(crate) fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> AppResult<T> {
    payload
        .map(|Json(body)| body)
        .map_err(|rejection| AppError::BadRequest(rejection.body_text()))
}
