use sqlx::{PgPool, Postgres, Transaction as SqlxTransaction};
use uuid::Uuid;

use crate::db::models::Transaction;
use crate::db::queries;
use crate::error::AppError;

/// Marks the reviewer's side of the transaction as reviewed, inside the
/// caller's storage transaction. Idempotent; the counterparty's flag is never
/// touched.
pub async fn project(
    executor: &mut SqlxTransaction<'_, Postgres>,
    tx: &Transaction,
    reviewer_id: Uuid,
) -> Result<Transaction, AppError> {
    let role = tx
        .role_of(reviewer_id)
        .ok_or_else(|| AppError::Forbidden("you are not a party to this transaction".to_string()))?;

    let updated = queries::set_review_flag(executor, tx.id, role).await?;
    Ok(updated)
}

/// On-demand recomputation of the review flags from the reviews table, which
/// is the authoritative record of who has reviewed.
pub struct ReviewProjection {
    pool: PgPool,
}

impl ReviewProjection {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Recomputes both flags strictly from the stored reviews and overwrites
    /// them if they differ. Safe to call at any time, any number of times;
    /// correct flags make it a no-op.
    pub async fn resync(&self, transaction_id: Uuid) -> Result<Transaction, AppError> {
        let mut db_tx = self.pool.begin().await?;

        let tx = queries::get_transaction_for_update(&mut db_tx, transaction_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Transaction {} not found", transaction_id)))?;

        let reviews = queries::list_reviews_by_transaction(&mut db_tx, transaction_id).await?;
        let initiator_reviewed = reviews.iter().any(|r| r.reviewer_id == tx.initiator_id);
        let recipient_reviewed = reviews.iter().any(|r| r.reviewer_id == tx.recipient_id);

        if initiator_reviewed == tx.initiator_reviewed
            && recipient_reviewed == tx.recipient_reviewed
        {
            db_tx.commit().await?;
            return Ok(tx);
        }

        tracing::warn!(
            transaction_id = %transaction_id,
            stored_initiator = tx.initiator_reviewed,
            stored_recipient = tx.recipient_reviewed,
            derived_initiator = initiator_reviewed,
            derived_recipient = recipient_reviewed,
            "review flags drifted from stored reviews, correcting"
        );

        let updated = queries::update_review_flags(
            &mut db_tx,
            transaction_id,
            initiator_reviewed,
            recipient_reviewed,
        )
        .await?;
        db_tx.commit().await?;

        Ok(updated)
    }
}
