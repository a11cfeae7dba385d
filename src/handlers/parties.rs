use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::AppState;
use crate::db::{models::Party, queries};
use crate::error::AppError;
use crate::middleware::auth;
use crate::validation;

#[derive(Debug, Deserialize)]
pub struct RegisterPayload {
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct RegisteredParty {
    pub party: Party,
    pub token: String,
}

pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterPayload>,
) -> Result<impl IntoResponse, AppError> {
    let name = validation::sanitize_string(&payload.name);
    validation::validate_party_name(&name)?;

    let email = validation::sanitize_string(&payload.email).to_lowercase();
    validation::validate_email(&email)?;

    let roles = if payload.roles.is_empty() {
        vec!["supplier".to_string()]
    } else {
        payload.roles
    };
    validation::validate_roles(&roles)?;

    let party = Party::new(name, email, roles);
    let created = queries::insert_party(&state.db, &party)
        .await?
        .ok_or_else(|| AppError::Conflict("email already registered".to_string()))?;

    let token = auth::issue_token(&state.config.auth_token_secret, created.id)?;

    tracing::info!(party_id = %created.id, "party registered");
    Ok((StatusCode::CREATED, Json(RegisteredParty { party: created, token })))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct ReviewerRef {
    pub id: Uuid,
    pub name: String,
}

#[derive(Debug, Serialize)]
pub struct ReviewEntry {
    pub id: Uuid,
    pub rating: i32,
    pub comment: String,
    pub reviewer: ReviewerRef,
    pub amount: BigDecimal,
    pub bracket: &'static str,
    pub transaction_id: Uuid,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct PartyProfile {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub roles: Vec<String>,
    pub average_rating: f64,
    pub reviews: Vec<ReviewEntry>,
}

fn amount_bracket(amount: &BigDecimal) -> &'static str {
    if amount < &BigDecimal::from(1_000) {
        "$0 - $1,000"
    } else if amount < &BigDecimal::from(5_000) {
        "$1,000 - $5,000"
    } else if amount < &BigDecimal::from(20_000) {
        "$5,000 - $20,000"
    } else if amount < &BigDecimal::from(50_000) {
        "$20,000 - $50,000"
    } else {
        "Above $50,000"
    }
}

async fn received_reviews(state: &AppState, party_id: Uuid) -> Result<Vec<ReviewEntry>, AppError> {
    let reviews = queries::list_reviews_for_party(&state.db, party_id).await?;
    Ok(reviews
        .into_iter()
        .map(|r| ReviewEntry {
            id: r.id,
            rating: r.rating,
            comment: r.comment,
            reviewer: ReviewerRef {
                id: r.reviewer_id,
                name: r.reviewer_name,
            },
            bracket: amount_bracket(&r.amount),
            amount: r.amount,
            transaction_id: r.transaction_id,
            created_at: r.created_at,
        })
        .collect())
}

fn average_rating(reviews: &[ReviewEntry]) -> f64 {
    if reviews.is_empty() {
        return 0.0;
    }
    reviews.iter().map(|r| r.rating as f64).sum::<f64>() / reviews.len() as f64
}

/// Party directory: every party (optionally filtered by a name substring),
/// each with its received reviews and average rating.
pub async fn search_parties(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Result<impl IntoResponse, AppError> {
    let parties = queries::search_parties(&state.db, params.q.as_deref()).await?;

    let mut profiles = Vec::with_capacity(parties.len());
    for party in parties {
        let reviews = received_reviews(&state, party.id).await?;
        profiles.push(PartyProfile {
            id: party.id,
            name: party.name,
            email: party.email,
            roles: party.roles,
            average_rating: average_rating(&reviews),
            reviews,
        });
    }

    Ok(Json(profiles))
}

pub async fn list_party_reviews(
    State(state): State<AppState>,
    Path(party_id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    if queries::get_party(&state.db, party_id).await?.is_none() {
        return Err(AppError::NotFound(format!("Party {} not found", party_id)));
    }

    let reviews = received_reviews(&state, party_id).await?;
    Ok(Json(reviews))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn brackets_follow_the_directory_ranges() {
        let cases = [
            ("0.01", "$0 - $1,000"),
            ("999.99", "$0 - $1,000"),
            ("1000", "$1,000 - $5,000"),
            ("4999", "$1,000 - $5,000"),
            ("5000", "$5,000 - $20,000"),
            ("20000", "$20,000 - $50,000"),
            ("50000", "Above $50,000"),
            ("123456.78", "Above $50,000"),
        ];
        for (amount, expected) in cases {
            assert_eq!(amount_bracket(&BigDecimal::from_str(amount).unwrap()), expected);
        }
    }

    #[test]
    fn average_rating_handles_empty_and_mixed() {
        assert_eq!(average_rating(&[]), 0.0);

        let entry = |rating| ReviewEntry {
            id: Uuid::new_v4(),
            rating,
            comment: "fine".to_string(),
            reviewer: ReviewerRef {
                id: Uuid::new_v4(),
                name: "Acme".to_string(),
            },
            amount: BigDecimal::from(100),
            bracket: "$0 - $1,000",
            transaction_id: Uuid::new_v4(),
            created_at: Utc::now(),
        };
        assert_eq!(average_rating(&[entry(5), entry(3)]), 4.0);
    }
}
