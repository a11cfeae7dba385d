use axum::{Json, extract::State, http::StatusCode, response::IntoResponse};
use serde::Deserialize;
use uuid::Uuid;

use crate::AppState;
use crate::error::AppError;
use crate::middleware::auth::AuthParty;
use crate::services::ReviewLedger;

#[derive(Debug, Deserialize)]
pub struct SubmitReviewPayload {
    pub transaction_id: Uuid,
    pub rating: i32,
    pub comment: String,
}

pub async fn submit_review(
    State(state): State<AppState>,
    AuthParty(party_id): AuthParty,
    Json(payload): Json<SubmitReviewPayload>,
) -> Result<impl IntoResponse, AppError> {
    let ledger = ReviewLedger::new(state.db.clone());
    let review = ledger
        .submit_review(payload.transaction_id, party_id, payload.rating, payload.comment)
        .await?;
    Ok((StatusCode::CREATED, Json(review)))
}
