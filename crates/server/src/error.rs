use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use chess_core::PositionError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    BadRequest(String),

    #[error(transparent)]
    Position(#[from] PositionError),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let message = match &self {
            AppError::BadRequest(msg) => msg.clone(),
            AppError::Position(e) => {
                tracing::debug!("Rejected position: {e}");
                e.to_string()
            }
        };

        (StatusCode::BAD_REQUEST, Json(json!({ "detail": message }))).into_response()
    }
}
