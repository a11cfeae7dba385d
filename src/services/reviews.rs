use sqlx::PgPool;
use uuid::Uuid;

use crate::db::models::Review;
use crate::db::queries;
use crate::domain::TransactionStatus;
use crate::error::AppError;
use crate::services::projection;
use crate::validation;

/// Records reviews. The reviews table, with its uniqueness constraint on
/// (reviewer, transaction), is the single source of truth for whether a party
/// has already reviewed; the flags on the transaction are only a projection
/// of it and are never consulted for that decision.
pub struct ReviewLedger {
    pool: PgPool,
}

impl ReviewLedger {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn submit_review(
        &self,
        transaction_id: Uuid,
        reviewer_id: Uuid,
        rating: i32,
        comment: String,
    ) -> Result<Review, AppError> {
        let mut db_tx = self.pool.begin().await?;

        let tx = queries::get_transaction_for_update(&mut db_tx, transaction_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Transaction {} not found", transaction_id)))?;

        let role = tx
            .role_of(reviewer_id)
            .ok_or_else(|| AppError::Forbidden("you are not a party to this transaction".to_string()))?;

        if tx.status != TransactionStatus::Confirmed {
            return Err(AppError::InvalidState(
                "transaction must be confirmed before it can be reviewed".to_string(),
            ));
        }

        validation::validate_rating(rating)?;
        let comment = validation::sanitize_string(&comment);
        validation::validate_required("comment", &comment)?;
        validation::validate_max_len("comment", &comment, validation::COMMENT_MAX_LEN)?;

        if queries::find_review_by_reviewer_and_transaction(&mut db_tx, reviewer_id, transaction_id)
            .await?
            .is_some()
        {
            return Err(AppError::Conflict(
                "you have already reviewed this transaction".to_string(),
            ));
        }

        let review = Review::new(
            reviewer_id,
            tx.counterparty_of(role),
            transaction_id,
            rating,
            comment,
        );
        let inserted = queries::insert_review_if_absent(&mut db_tx, &review)
            .await?
            .ok_or_else(|| {
                AppError::Conflict("you have already reviewed this transaction".to_string())
            })?;

        projection::project(&mut db_tx, &tx, reviewer_id).await?;
        db_tx.commit().await?;

        tracing::info!(
            review_id = %inserted.id,
            transaction_id = %transaction_id,
            reviewer_id = %reviewer_id,
            rating,
            "review recorded"
        );
        Ok(inserted)
    }
}
