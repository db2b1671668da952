//! Axum route handlers for the Quality API.

use axum::Json;
use serde::Deserialize;

use crate::errors::AppError;
use crate::quality::scorer::{score, QualityReport, SectionType};

/// Upper bound on `max_length`; anything larger is a client bug.
const MAX_LENGTH_LIMIT: usize = 20_000;

#[derive(Debug, Deserialize)]
pub struct ScoreRequest {
    #[serde(default)]
    pub text: String,
    pub max_length: usize,
    #[serde(default)]
    pub section_type: SectionType,
}

/// POST /api/v1/quality/score
///
/// Scores narrative text. Blank text is valid input and scores 0.
pub async fn handle_score(Json(request): Json<ScoreRequest>) -> Result<Json<QualityReport>, AppError> {
    if request.max_length > MAX_LENGTH_LIMIT {
        return Err(AppError::Validation(format!(
            "max_length must be at most {MAX_LENGTH_LIMIT}"
        )));
    }

    Ok(Json(score(&request.text, request.max_length, request.section_type)))
}
