use sqlx::{PgPool, Postgres, Result, Transaction as SqlxTransaction};
use uuid::Uuid;

use crate::db::models::{Party, ReceivedReview, Review, Transaction, TransactionWithParties};
use crate::domain::{TransactionRole, TransactionStatus};

// --- Party queries ---

/// Returns None when the email is already registered.
pub async fn insert_party(pool: &PgPool, party: &Party) -> Result<Option<Party>> {
    sqlx::query_as::<_, Party>(
        r#"
        INSERT INTO parties (id, name, email, roles, created_at, updated_at)
        VALUES ($1, $2, $3, $4, $5, $6)
        ON CONFLICT (email) DO NOTHING
        RETURNING *
        "#,
    )
    .bind(party.id)
    .bind(&party.name)
    .bind(&party.email)
    .bind(&party.roles)
    .bind(party.created_at)
    .bind(party.updated_at)
    .fetch_optional(pool)
    .await
}

pub async fn get_party(pool: &PgPool, id: Uuid) -> Result<Option<Party>> {
    sqlx::query_as::<_, Party>("SELECT * FROM parties WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn search_parties(pool: &PgPool, q: Option<&str>) -> Result<Vec<Party>> {
    match q {
        Some(q) => {
            sqlx::query_as::<_, Party>("SELECT * FROM parties WHERE name ILIKE $1 ORDER BY name")
                .bind(format!("%{}%", q))
                .fetch_all(pool)
                .await
        }
        None => {
            sqlx::query_as::<_, Party>("SELECT * FROM parties ORDER BY name")
                .fetch_all(pool)
                .await
        }
    }
}

// --- Transaction queries ---

pub async fn insert_transaction(pool: &PgPool, tx: &Transaction) -> Result<Transaction> {
    sqlx::query_as::<_, Transaction>(
        r#"
        INSERT INTO transactions (
            id, initiator_id, recipient_id, amount, description, status,
            initiator_reviewed, recipient_reviewed, created_at, updated_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
        RETURNING *
        "#,
    )
    .bind(tx.id)
    .bind(tx.initiator_id)
    .bind(tx.recipient_id)
    .bind(&tx.amount)
    .bind(&tx.description)
    .bind(tx.status)
    .bind(tx.initiator_reviewed)
    .bind(tx.recipient_reviewed)
    .bind(tx.created_at)
    .bind(tx.updated_at)
    .fetch_one(pool)
    .await
}

pub async fn get_transaction(pool: &PgPool, id: Uuid) -> Result<Option<Transaction>> {
    sqlx::query_as::<_, Transaction>("SELECT * FROM transactions WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Loads a transaction under a row lock; all status and flag writes happen
/// under this lock so that racing operations on one transaction serialize.
pub async fn get_transaction_for_update(
    executor: &mut SqlxTransaction<'_, Postgres>,
    id: Uuid,
) -> Result<Option<Transaction>> {
    sqlx::query_as::<_, Transaction>("SELECT * FROM transactions WHERE id = $1 FOR UPDATE")
        .bind(id)
        .fetch_optional(&mut **executor)
        .await
}

pub async fn list_transactions_for_party(
    pool: &PgPool,
    party_id: Uuid,
    status: Option<TransactionStatus>,
) -> Result<Vec<TransactionWithParties>> {
    let base = r#"
        SELECT t.id, t.initiator_id, pi.name AS initiator_name,
               t.recipient_id, pr.name AS recipient_name,
               t.amount, t.description, t.status,
               t.initiator_reviewed, t.recipient_reviewed, t.created_at
        FROM transactions t
        JOIN parties pi ON pi.id = t.initiator_id
        JOIN parties pr ON pr.id = t.recipient_id
        WHERE (t.initiator_id = $1 OR t.recipient_id = $1)
    "#;

    match status {
        Some(status) => {
            let sql = format!("{} AND t.status = $2 ORDER BY t.created_at DESC", base);
            sqlx::query_as::<_, TransactionWithParties>(&sql)
                .bind(party_id)
                .bind(status)
                .fetch_all(pool)
                .await
        }
        None => {
            let sql = format!("{} ORDER BY t.created_at DESC", base);
            sqlx::query_as::<_, TransactionWithParties>(&sql)
                .bind(party_id)
                .fetch_all(pool)
                .await
        }
    }
}

/// Conditional status update. The `from` guard makes the write a no-op if the
/// stored status is no longer what the caller validated against; None is
/// returned in that case. Entering `confirmed` clears both review flags in
/// the same statement.
pub async fn update_transaction_status(
    executor: &mut SqlxTransaction<'_, Postgres>,
    id: Uuid,
    from: TransactionStatus,
    to: TransactionStatus,
    reset_review_flags: bool,
) -> Result<Option<Transaction>> {
    let sql = if reset_review_flags {
        r#"
        UPDATE transactions
        SET status = $1, initiator_reviewed = FALSE, recipient_reviewed = FALSE, updated_at = NOW()
        WHERE id = $2 AND status = $3
        RETURNING *
        "#
    } else {
        r#"
        UPDATE transactions
        SET status = $1, updated_at = NOW()
        WHERE id = $2 AND status = $3
        RETURNING *
        "#
    };

    sqlx::query_as::<_, Transaction>(sql)
        .bind(to)
        .bind(id)
        .bind(from)
        .fetch_optional(&mut **executor)
        .await
}

/// Sets one party's review flag. Idempotent; the counterparty's flag is never
/// touched.
pub async fn set_review_flag(
    executor: &mut SqlxTransaction<'_, Postgres>,
    id: Uuid,
    role: TransactionRole,
) -> Result<Transaction> {
    let sql = match role {
        TransactionRole::Initiator => {
            "UPDATE transactions SET initiator_reviewed = TRUE, updated_at = NOW() WHERE id = $1 RETURNING *"
        }
        TransactionRole::Recipient => {
            "UPDATE transactions SET recipient_reviewed = TRUE, updated_at = NOW() WHERE id = $1 RETURNING *"
        }
    };

    sqlx::query_as::<_, Transaction>(sql)
        .bind(id)
        .fetch_one(&mut **executor)
        .await
}

pub async fn update_review_flags(
    executor: &mut SqlxTransaction<'_, Postgres>,
    id: Uuid,
    initiator_reviewed: bool,
    recipient_reviewed: bool,
) -> Result<Transaction> {
    sqlx::query_as::<_, Transaction>(
        r#"
        UPDATE transactions
        SET initiator_reviewed = $1, recipient_reviewed = $2, updated_at = NOW()
        WHERE id = $3
        RETURNING *
        "#,
    )
    .bind(initiator_reviewed)
    .bind(recipient_reviewed)
    .bind(id)
    .fetch_one(&mut **executor)
    .await
}

// --- Review queries ---

/// Inserts a review unless one already exists for (reviewer, transaction).
/// The unique index decides the winner between concurrent submissions;
/// the loser sees None.
pub async fn insert_review_if_absent(
    executor: &mut SqlxTransaction<'_, Postgres>,
    review: &Review,
) -> Result<Option<Review>> {
    sqlx::query_as::<_, Review>(
        r#"
        INSERT INTO reviews (
            id, reviewer_id, reviewed_party_id, transaction_id, rating, comment, created_at
        ) VALUES ($1, $2, $3, $4, $5, $6, $7)
        ON CONFLICT (reviewer_id, transaction_id) DO NOTHING
        RETURNING *
        "#,
    )
    .bind(review.id)
    .bind(review.reviewer_id)
    .bind(review.reviewed_party_id)
    .bind(review.transaction_id)
    .bind(review.rating)
    .bind(&review.comment)
    .bind(review.created_at)
    .fetch_optional(&mut **executor)
    .await
}

pub async fn find_review_by_reviewer_and_transaction(
    executor: &mut SqlxTransaction<'_, Postgres>,
    reviewer_id: Uuid,
    transaction_id: Uuid,
) -> Result<Option<Review>> {
    sqlx::query_as::<_, Review>(
        "SELECT * FROM reviews WHERE reviewer_id = $1 AND transaction_id = $2",
    )
    .bind(reviewer_id)
    .bind(transaction_id)
    .fetch_optional(&mut **executor)
    .await
}

pub async fn list_reviews_by_transaction(
    executor: &mut SqlxTransaction<'_, Postgres>,
    transaction_id: Uuid,
) -> Result<Vec<Review>> {
    sqlx::query_as::<_, Review>("SELECT * FROM reviews WHERE transaction_id = $1")
        .bind(transaction_id)
        .fetch_all(&mut **executor)
        .await
}

pub async fn list_reviews_for_party(pool: &PgPool, party_id: Uuid) -> Result<Vec<ReceivedReview>> {
    sqlx::query_as::<_, ReceivedReview>(
        r#"
        SELECT r.id, r.rating, r.comment, r.reviewer_id, p.name AS reviewer_name,
               r.transaction_id, t.amount, r.created_at
        FROM reviews r
        JOIN parties p ON p.id = r.reviewer_id
        JOIN transactions t ON t.id = r.transaction_id
        WHERE r.reviewed_party_id = $1
        ORDER BY r.created_at DESC
        "#,
    )
    .bind(party_id)
    .fetch_all(pool)
    .await
}
