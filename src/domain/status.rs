//! Transaction status lifecycle.
//! Framework-agnostic transition table for payment requests.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Lifecycle of a payment request.
///
/// `pending` is the initial status. The recipient answers a pending request
/// by marking it `completed` or `rejected`; the initiator then acknowledges a
/// completed payment by marking it `confirmed`. `rejected` and `confirmed`
/// are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "transaction_status", rename_all = "lowercase")]
pub enum TransactionStatus {
    Pending,
    Completed,
    Rejected,
    Confirmed,
}

/// A party's role within one specific transaction. Account-level role labels
/// never participate in authorization; only this does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransactionRole {
    Initiator,
    Recipient,
}

impl TransactionStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, TransactionStatus::Rejected | TransactionStatus::Confirmed)
    }

    /// The role allowed to move a transaction from `self` to `next`, or None
    /// when that edge does not exist in the lifecycle.
    pub fn transition_actor(self, next: TransactionStatus) -> Option<TransactionRole> {
        use TransactionStatus::*;
        match (self, next) {
            (Pending, Completed) => Some(TransactionRole::Recipient),
            (Pending, Rejected) => Some(TransactionRole::Recipient),
            (Completed, Confirmed) => Some(TransactionRole::Initiator),
            _ => None,
        }
    }

    pub fn can_transition_to(self, next: TransactionStatus) -> bool {
        self.transition_actor(next).is_some()
    }
}

impl fmt::Display for TransactionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransactionStatus::Pending => "pending",
            TransactionStatus::Completed => "completed",
            TransactionStatus::Rejected => "rejected",
            TransactionStatus::Confirmed => "confirmed",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for TransactionRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TransactionRole::Initiator => "initiator",
            TransactionRole::Recipient => "recipient",
        };
        write!(f, "{}", s)
    }
}

#[cfg(test)]
mod tests {
    use super::TransactionRole::*;
    use super::TransactionStatus::*;

    #[test]
    fn pending_transitions_belong_to_the_recipient() {
        assert_eq!(Pending.transition_actor(Completed), Some(Recipient));
        assert_eq!(Pending.transition_actor(Rejected), Some(Recipient));
    }

    #[test]
    fn confirmation_belongs_to_the_initiator() {
        assert_eq!(Completed.transition_actor(Confirmed), Some(Initiator));
    }

    #[test]
    fn skipping_completed_is_not_allowed() {
        assert_eq!(Pending.transition_actor(Confirmed), None);
    }

    #[test]
    fn terminal_states_have_no_successors() {
        for status in [Rejected, Confirmed] {
            assert!(status.is_terminal());
            for next in [Pending, Completed, Rejected, Confirmed] {
                assert_eq!(status.transition_actor(next), None);
            }
        }
    }

    #[test]
    fn no_self_or_backward_edges() {
        for status in [Pending, Completed, Rejected, Confirmed] {
            assert!(!status.can_transition_to(status));
            assert!(!status.can_transition_to(Pending));
        }
    }

    #[test]
    fn renders_lowercase() {
        assert_eq!(Pending.to_string(), "pending");
        assert_eq!(Confirmed.to_string(), "confirmed");
    }
}
