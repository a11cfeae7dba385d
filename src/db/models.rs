use bigdecimal::BigDecimal;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::domain::{TransactionRole, TransactionStatus};

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Party {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub roles: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Party {
    pub fn new(name: String, email: String, roles: Vec<String>) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            roles,
            created_at: now,
            updated_at: now,
        }
    }
}

/// One payment-request workflow between two parties. The review flags are a
/// projection of the reviews table, maintained by the projection service; they
/// are never written independently of it.
#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Transaction {
    pub id: Uuid,
    pub initiator_id: Uuid,
    pub recipient_id: Uuid,
    pub amount: BigDecimal,
    pub description: String,
    pub status: TransactionStatus,
    pub initiator_reviewed: bool,
    pub recipient_reviewed: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    pub fn new(
        initiator_id: Uuid,
        recipient_id: Uuid,
        amount: BigDecimal,
        description: String,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            initiator_id,
            recipient_id,
            amount,
            description,
            status: TransactionStatus::Pending,
            initiator_reviewed: false,
            recipient_reviewed: false,
            created_at: now,
            updated_at: now,
        }
    }

    /// The party's role within this transaction, or None for outsiders.
    pub fn role_of(&self, party_id: Uuid) -> Option<TransactionRole> {
        if party_id == self.initiator_id {
            Some(TransactionRole::Initiator)
        } else if party_id == self.recipient_id {
            Some(TransactionRole::Recipient)
        } else {
            None
        }
    }

    pub fn counterparty_of(&self, role: TransactionRole) -> Uuid {
        match role {
            TransactionRole::Initiator => self.recipient_id,
            TransactionRole::Recipient => self.initiator_id,
        }
    }
}

/// A transaction joined with both party names, for listing endpoints.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct TransactionWithParties {
    pub id: Uuid,
    pub initiator_id: Uuid,
    pub initiator_name: String,
    pub recipient_id: Uuid,
    pub recipient_name: String,
    pub amount: BigDecimal,
    pub description: String,
    pub status: TransactionStatus,
    pub initiator_reviewed: bool,
    pub recipient_reviewed: bool,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, FromRow, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    pub reviewer_id: Uuid,
    pub reviewed_party_id: Uuid,
    pub transaction_id: Uuid,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl Review {
    pub fn new(
        reviewer_id: Uuid,
        reviewed_party_id: Uuid,
        transaction_id: Uuid,
        rating: i32,
        comment: String,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            reviewer_id,
            reviewed_party_id,
            transaction_id,
            rating,
            comment,
            created_at: Utc::now(),
        }
    }
}

/// A review joined with the reviewer's name and the transaction amount, as
/// rendered on party profiles.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct ReceivedReview {
    pub id: Uuid,
    pub rating: i32,
    pub comment: String,
    pub reviewer_id: Uuid,
    pub reviewer_name: String,
    pub transaction_id: Uuid,
    pub amount: BigDecimal,
    pub created_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TransactionRole;
    use std::str::FromStr;

    fn transaction() -> Transaction {
        Transaction::new(
            Uuid::new_v4(),
            Uuid::new_v4(),
            BigDecimal::from_str("100.00").unwrap(),
            "consulting services".to_string(),
        )
    }

    #[test]
    fn new_transactions_start_pending_and_unreviewed() {
        let tx = transaction();
        assert_eq!(tx.status, TransactionStatus::Pending);
        assert!(!tx.initiator_reviewed);
        assert!(!tx.recipient_reviewed);
    }

    #[test]
    fn role_of_resolves_both_parties() {
        let tx = transaction();
        assert_eq!(tx.role_of(tx.initiator_id), Some(TransactionRole::Initiator));
        assert_eq!(tx.role_of(tx.recipient_id), Some(TransactionRole::Recipient));
        assert_eq!(tx.role_of(Uuid::new_v4()), None);
    }

    #[test]
    fn counterparty_is_the_other_side() {
        let tx = transaction();
        assert_eq!(tx.counterparty_of(TransactionRole::Initiator), tx.recipient_id);
        assert_eq!(tx.counterparty_of(TransactionRole::Recipient), tx.initiator_id);
    }
}
