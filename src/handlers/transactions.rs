use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use bigdecimal::BigDecimal;
use serde::Deserialize;
use uuid::Uuid;

use crate::AppState;
use crate::db::queries;
use crate::domain::TransactionStatus;
use crate::error::AppError;
use crate::middleware::auth::AuthParty;
use crate::services::{ReviewProjection, TransactionLifecycle};

#[derive(Debug, Deserialize)]
pub struct CreateTransactionPayload {
    pub recipient_id: Uuid,
    pub amount: BigDecimal,
    pub description: String,
}

#[derive(Debug, Deserialize)]
pub struct StatusUpdatePayload {
    pub status: TransactionStatus,
}

#[derive(Debug, Deserialize)]
pub struct ListParams {
    pub status: Option<TransactionStatus>,
}

pub async fn list_transactions(
    State(state): State<AppState>,
    AuthParty(party_id): AuthParty,
    Query(params): Query<ListParams>,
) -> Result<impl IntoResponse, AppError> {
    let transactions =
        queries::list_transactions_for_party(&state.db, party_id, params.status).await?;
    Ok(Json(transactions))
}

pub async fn create_transaction(
    State(state): State<AppState>,
    AuthParty(party_id): AuthParty,
    Json(payload): Json<CreateTransactionPayload>,
) -> Result<impl IntoResponse, AppError> {
    let lifecycle = TransactionLifecycle::new(state.db.clone());
    let tx = lifecycle
        .create(party_id, payload.recipient_id, payload.amount, payload.description)
        .await?;
    Ok((StatusCode::CREATED, Json(tx)))
}

pub async fn get_transaction(
    State(state): State<AppState>,
    AuthParty(party_id): AuthParty,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let tx = queries::get_transaction(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Transaction {} not found", id)))?;

    if tx.role_of(party_id).is_none() {
        return Err(AppError::Forbidden(
            "you are not a party to this transaction".to_string(),
        ));
    }

    Ok(Json(tx))
}

pub async fn update_status(
    State(state): State<AppState>,
    AuthParty(party_id): AuthParty,
    Path(id): Path<Uuid>,
    Json(payload): Json<StatusUpdatePayload>,
) -> Result<impl IntoResponse, AppError> {
    let lifecycle = TransactionLifecycle::new(state.db.clone());
    let tx = lifecycle.apply_transition(id, payload.status, party_id).await?;
    Ok(Json(tx))
}

/// On-demand repair of the review flags from the stored reviews. Idempotent,
/// safe against a healthy transaction.
pub async fn resync_review_flags(
    State(state): State<AppState>,
    AuthParty(_party_id): AuthParty,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let projection = ReviewProjection::new(state.db.clone());
    let tx = projection.resync(id).await?;
    Ok(Json(tx))
}
