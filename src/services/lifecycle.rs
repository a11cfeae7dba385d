use bigdecimal::BigDecimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::db::models::Transaction;
use crate::db::queries;
use crate::domain::TransactionStatus;
use crate::error::AppError;
use crate::validation;

/// Owns transaction creation and the status state machine.
pub struct TransactionLifecycle {
    pool: PgPool,
}

impl TransactionLifecycle {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    pub async fn create(
        &self,
        initiator_id: Uuid,
        recipient_id: Uuid,
        amount: BigDecimal,
        description: String,
    ) -> Result<Transaction, AppError> {
        validation::validate_positive_amount(&amount)?;
        let description = validation::sanitize_string(&description);
        validation::validate_required("description", &description)?;
        validation::validate_max_len("description", &description, validation::DESCRIPTION_MAX_LEN)?;

        if initiator_id == recipient_id {
            return Err(AppError::Validation(
                "recipient_id: a party cannot transact with itself".to_string(),
            ));
        }
        if queries::get_party(&self.pool, recipient_id).await?.is_none() {
            return Err(AppError::NotFound(format!("Party {} not found", recipient_id)));
        }

        let tx = Transaction::new(initiator_id, recipient_id, amount, description);
        let created = queries::insert_transaction(&self.pool, &tx).await?;

        tracing::info!(
            transaction_id = %created.id,
            initiator_id = %initiator_id,
            recipient_id = %recipient_id,
            "payment request created"
        );
        Ok(created)
    }

    /// Validates and applies one status transition on behalf of
    /// `acting_party_id`. Authorization is by the actor's role within this
    /// transaction, never by account-level role labels. Entering `confirmed`
    /// resets both review flags in the same write, which is what re-opens
    /// review eligibility.
    pub async fn apply_transition(
        &self,
        transaction_id: Uuid,
        requested: TransactionStatus,
        acting_party_id: Uuid,
    ) -> Result<Transaction, AppError> {
        let mut db_tx = self.pool.begin().await?;

        let tx = queries::get_transaction_for_update(&mut db_tx, transaction_id)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Transaction {} not found", transaction_id)))?;

        let role = tx
            .role_of(acting_party_id)
            .ok_or_else(|| AppError::Forbidden("you are not a party to this transaction".to_string()))?;

        let required = tx.status.transition_actor(requested).ok_or(AppError::InvalidTransition {
            from: tx.status,
            to: requested,
        })?;

        if role != required {
            return Err(AppError::Forbidden(format!(
                "only the {} of this transaction may mark it {}",
                required, requested
            )));
        }

        let reset_review_flags = requested == TransactionStatus::Confirmed;
        let updated = queries::update_transaction_status(
            &mut db_tx,
            transaction_id,
            tx.status,
            requested,
            reset_review_flags,
        )
        .await?
        .ok_or_else(|| AppError::Conflict("transaction was modified concurrently".to_string()))?;

        db_tx.commit().await?;

        tracing::info!(
            transaction_id = %transaction_id,
            from = %tx.status,
            to = %requested,
            acting_party_id = %acting_party_id,
            "transaction status updated"
        );
        Ok(updated)
    }
}
