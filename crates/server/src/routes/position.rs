use axum::{extract::Query, Json};
use serde::{Deserialize, Serialize};

use chess_core::PositionState;

use crate::error::AppError;

#[derive(Deserialize)]
pub struct ValidateQuery {
    pub fen: String,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidateResponse {
    pub fen: String,
    pub side_to_move: &'static str,
}

/// Check a FEN without touching any screen's position. Used by the page to
/// flag the FEN field before the edit is submitted.
pub async fn validate_fen(
    Query(query): Query<ValidateQuery>,
) -> Result<Json<ValidateResponse>, AppError> {
    if query.fen.trim().is_empty() {
        return Err(AppError::BadRequest("fen must not be empty".into()));
    }
    let state = PositionState::from_fen(&query.fen)?;
    Ok(Json(ValidateResponse {
        fen: state.fen().to_string(),
        side_to_move: if state.side_to_move().is_white() {
            "white"
        } else {
            "black"
        },
    }))
}
