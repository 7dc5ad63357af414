//! Invitation workflow: dispatching invitation emails, recording RSVP answers
//! and completing registrations.
//!
//! A club moves through
//! `unsolicited -> pending -> (declined | accepted -> registered)`.
//! The state column is the source of truth; every email sent along the way is
//! best-effort and never undoes a transition.

use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;
use uuid::Uuid;

use crate::models::{Club, InvitationState};
use crate::utils::error::AppError;

pub mod pages;
pub mod service;
pub mod token;

pub use service::InvitationService;

/// Longest accepted registration bio, in characters.
pub const MAX_BIO_CHARS: usize = 250;

#[derive(Debug, Error)]
pub enum InvitationError {
    #[error("token is required")]
    MissingToken,

    #[error("response must be 'yes' or 'no', got '{0}'")]
    InvalidResponse(String),

    #[error("bio is required")]
    MissingBio,

    #[error("bio must be at most {} characters", MAX_BIO_CHARS)]
    BioTooLong,

    #[error("invitation link is invalid or has expired")]
    InvalidToken,

    #[error("invitation is {} and cannot be registered", .0.as_str())]
    NotAccepted(InvitationState),

    #[error("event {0} does not exist")]
    EventNotFound(Uuid),

    #[error("PUBLIC_BASE_URL is not configured")]
    MissingBaseUrl,

    #[error("storage error")]
    Store(#[from] sqlx::Error),
}

impl From<InvitationError> for AppError {
    fn from(error: InvitationError) -> Self {
        match error {
            InvitationError::MissingToken
            | InvitationError::InvalidResponse(_)
            | InvitationError::MissingBio
            | InvitationError::BioTooLong => AppError::ValidationError(error.to_string()),
            InvitationError::InvalidToken | InvitationError::EventNotFound(_) => {
                AppError::NotFound(error.to_string())
            }
            InvitationError::NotAccepted(_) => AppError::Conflict(error.to_string()),
            InvitationError::MissingBaseUrl => AppError::ConfigurationError(error.to_string()),
            InvitationError::Store(source) => AppError::DatabaseError(source),
        }
    }
}

/// The `response` query parameter of an RSVP link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RsvpAnswer {
    Yes,
    No,
}

impl FromStr for RsvpAnswer {
    type Err = InvitationError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "yes" => Ok(Self::Yes),
            "no" => Ok(Self::No),
            other => Err(InvitationError::InvalidResponse(other.to_string())),
        }
    }
}

/// What an RSVP click amounted to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RsvpOutcome {
    /// Declined now, or a replay of an earlier decline.
    Declined,
    /// Accepted now, or a replay of an earlier acceptance.
    Accepted { registration_url: String },
    /// Unknown, retired or expired token.
    InvalidLink,
    /// A "no" after the club already said yes. Not applied.
    AlreadyAccepted,
    /// A "yes" after the club already said no. Not applied.
    AlreadyDeclined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DeliveryStatus {
    Sent,
    Failed,
}

/// Per-recipient line of a dispatch report.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DeliveryResult {
    pub club_id: Uuid,
    pub club_name: String,
    pub email: String,
    pub status: DeliveryStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DeliveryResult {
    pub(crate) fn sent(club: &Club) -> Self {
        Self {
            club_id: club.id,
            club_name: club.name.clone(),
            email: club.contact_email.clone(),
            status: DeliveryStatus::Sent,
            error: None,
        }
    }

    pub(crate) fn failed(club: &Club, error: impl Into<String>) -> Self {
        Self {
            club_id: club.id,
            club_name: club.name.clone(),
            email: club.contact_email.clone(),
            status: DeliveryStatus::Failed,
            error: Some(error.into()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DispatchSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DispatchReport {
    pub message: String,
    pub results: Vec<DeliveryResult>,
    pub summary: DispatchSummary,
}

impl DispatchReport {
    pub fn no_clubs() -> Self {
        Self {
            message: "No eligible clubs found for this event".to_string(),
            results: Vec::new(),
            summary: DispatchSummary {
                total: 0,
                successful: 0,
                failed: 0,
            },
        }
    }

    pub fn from_results(mut results: Vec<DeliveryResult>) -> Self {
        results.sort_by(|a, b| a.club_name.cmp(&b.club_name));

        let total = results.len();
        let successful = results
            .iter()
            .filter(|result| result.status == DeliveryStatus::Sent)
            .count();

        Self {
            message: format!("Invitations sent to {successful} of {total} clubs"),
            results,
            summary: DispatchSummary {
                total,
                successful,
                failed: total - successful,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_yes_and_no_are_answers() {
        assert_eq!("yes".parse::<RsvpAnswer>().ok(), Some(RsvpAnswer::Yes));
        assert_eq!("no".parse::<RsvpAnswer>().ok(), Some(RsvpAnswer::No));

        for bad in ["maybe", "YES", " no", ""] {
            assert!(
                matches!(bad.parse::<RsvpAnswer>(), Err(InvitationError::InvalidResponse(_))),
                "'{bad}' should be rejected"
            );
        }
    }

    #[test]
    fn error_mapping_matches_taxonomy() {
        use axum::http::StatusCode;

        let status = |error: InvitationError| AppError::from(error).status_code();

        assert_eq!(status(InvitationError::MissingBio), StatusCode::BAD_REQUEST);
        assert_eq!(status(InvitationError::InvalidToken), StatusCode::NOT_FOUND);
        assert_eq!(
            status(InvitationError::NotAccepted(InvitationState::Pending)),
            StatusCode::CONFLICT
        );
        assert_eq!(
            status(InvitationError::MissingBaseUrl),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn empty_report_is_not_an_error() {
        let report = DispatchReport::no_clubs();
        let json = serde_json::to_value(&report).expect("report serializes");

        assert_eq!(json["summary"]["total"], 0);
        assert_eq!(json["results"], serde_json::json!([]));
        assert_eq!(json["message"], "No eligible clubs found for this event");
    }
}
