use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::utils::error::AppError;

/// Where a club stands in the invitation workflow.
///
/// `Declined` and `Registered` have no outgoing transitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "invitation_state", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum InvitationState {
    Unsolicited,
    Pending,
    Declined,
    Accepted,
    Registered,
}

impl InvitationState {
    pub fn is_confirmed(self) -> bool {
        matches!(self, Self::Accepted | Self::Registered)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Unsolicited => "unsolicited",
            Self::Pending => "pending",
            Self::Declined => "declined",
            Self::Accepted => "accepted",
            Self::Registered => "registered",
        }
    }
}

/// A participant's table at an event.
#[derive(Debug, Clone, PartialEq, FromRow)]
pub struct Club {
    pub id: Uuid,
    pub event_id: Uuid,
    pub name: String,
    pub category: String,
    pub contact_email: String,
    pub description: String,
    pub coordinate_x: Option<f64>,
    pub coordinate_y: Option<f64>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub invitation_state: InvitationState,
    pub invitation_token: Option<String>,
    pub invitation_expires_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Club {
    pub fn is_placed(&self) -> bool {
        self.coordinate_x.is_some() && self.coordinate_y.is_some()
    }

    pub fn is_confirmed(&self) -> bool {
        self.invitation_state.is_confirmed()
    }

    /// An invitation left unanswered past its expiry. Once answered, the
    /// token stays valid until registration retires it.
    pub fn invitation_expired(&self, now: DateTime<Utc>) -> bool {
        self.invitation_state == InvitationState::Pending
            && self
                .invitation_expires_at
                .map(|expires_at| expires_at <= now)
                .unwrap_or(false)
    }

    /// Placed, and either never invited or holding an expired invitation.
    pub fn is_invitable(&self, now: DateTime<Utc>) -> bool {
        self.is_placed()
            && (self.invitation_state == InvitationState::Unsolicited
                || self.invitation_expired(now))
    }
}

/// Public JSON shape of a club. The invitation token never leaves the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClubView {
    pub id: Uuid,
    pub event_id: Uuid,
    pub name: String,
    pub category: String,
    pub contact_email: String,
    pub description: String,
    pub coordinates: Option<[f64; 2]>,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub invitation_state: InvitationState,
    pub confirmed: bool,
}

impl From<Club> for ClubView {
    fn from(club: Club) -> Self {
        let coordinates = match (club.coordinate_x, club.coordinate_y) {
            (Some(x), Some(y)) => Some([x, y]),
            _ => None,
        };

        Self {
            id: club.id,
            event_id: club.event_id,
            confirmed: club.is_confirmed(),
            name: club.name,
            category: club.category,
            contact_email: club.contact_email,
            description: club.description,
            coordinates,
            start_time: club.start_time,
            end_time: club.end_time,
            invitation_state: club.invitation_state,
        }
    }
}

/// One roster row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewClub {
    pub name: String,
    #[serde(default)]
    pub category: String,
    pub contact_email: String,
    #[serde(default)]
    pub description: String,
}

impl NewClub {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Club name is required".to_string(),
            ));
        }

        if !looks_like_email(&self.contact_email) {
            return Err(AppError::ValidationError(format!(
                "Club '{}' has an invalid contact email",
                self.name.trim()
            )));
        }

        Ok(())
    }
}

fn looks_like_email(value: &str) -> bool {
    let value = value.trim();
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty() && domain.contains('.') && !value.contains(char::is_whitespace)
        }
        None => false,
    }
}

/// Table placement set by an organizer on the map.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClubPlacement {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub start_time: Option<NaiveTime>,
    #[serde(default)]
    pub end_time: Option<NaiveTime>,
}

impl ClubPlacement {
    pub fn has_times(&self) -> bool {
        self.start_time.is_some() || self.end_time.is_some()
    }

    pub fn validate(&self) -> Result<(), AppError> {
        if !self.x.is_finite() || !self.y.is_finite() {
            return Err(AppError::ValidationError(
                "Coordinates must be finite numbers".to_string(),
            ));
        }

        match (self.start_time, self.end_time) {
            (Some(start), Some(end)) if end <= start => Err(AppError::ValidationError(
                "Table end time must be after its start time".to_string(),
            )),
            (Some(_), None) | (None, Some(_)) => Err(AppError::ValidationError(
                "Table times need both a start and an end".to_string(),
            )),
            _ => Ok(()),
        }
    }
}

/// Attendee list filters.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ClubFilter {
    pub category: Option<String>,
    pub placed: Option<bool>,
}

impl ClubFilter {
    pub fn matches(&self, club: &Club) -> bool {
        let category_ok = self
            .category
            .as_deref()
            .map(|category| club.category == category)
            .unwrap_or(true);
        let placed_ok = self
            .placed
            .map(|placed| club.is_placed() == placed)
            .unwrap_or(true);

        category_ok && placed_ok
    }
}
