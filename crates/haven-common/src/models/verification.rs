//! Seller verification models.
//!
//! Becoming a seller is gated behind an admin-reviewed document submission:
//! a user uploads an ID or business licence, an admin approves or rejects
//! it, and approval promotes the account to the seller role.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;
use validator::Validate;

/// A verification submission — at most one per user.
#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct SellerVerification {
    pub id: Uuid,
    pub user_id: Uuid,

    /// Storage key of the uploaded document
    pub document: Option<String>,

    pub status: VerificationStatus,

    pub submitted_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,

    /// Reviewer notes, shown to the applicant on rejection
    pub admin_notes: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "text", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum VerificationStatus {
    Pending,
    Approved,
    Rejected,
}

impl VerificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationStatus::Pending => "pending",
            VerificationStatus::Approved => "approved",
            VerificationStatus::Rejected => "rejected",
        }
    }
}

/// Admin review decision for a single submission.
#[derive(Debug, Deserialize, Validate)]
pub struct VerificationDecisionRequest {
    pub status: VerificationDecision,

    #[validate(length(max = 2000))]
    pub admin_notes: Option<String>,
}

/// The two terminal review outcomes. `pending` is not a valid decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum VerificationDecision {
    Approved,
    Rejected,
}

impl From<VerificationDecision> for VerificationStatus {
    fn from(d: VerificationDecision) -> Self {
        match d {
            VerificationDecision::Approved => VerificationStatus::Approved,
            VerificationDecision::Rejected => VerificationStatus::Rejected,
        }
    }
}

/// Bulk review over a list of submissions.
#[derive(Debug, Deserialize, Validate)]
pub struct BulkVerificationRequest {
    pub verification_ids: Vec<Uuid>,
    pub action: VerificationDecision,

    #[validate(length(max = 2000))]
    pub admin_notes: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decision_converts_to_status() {
        assert_eq!(
            VerificationStatus::from(VerificationDecision::Approved),
            VerificationStatus::Approved
        );
        assert_eq!(
            VerificationStatus::from(VerificationDecision::Rejected),
            VerificationStatus::Rejected
        );
    }

    #[test]
    fn pending_is_not_a_valid_decision() {
        assert!(serde_json::from_str::<VerificationDecision>("\"pending\"").is_err());
        assert!(serde_json::from_str::<VerificationDecision>("\"approved\"").is_ok());
    }
}
