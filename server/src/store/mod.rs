//! Persistence seams. Handlers and the invitation workflow only see these
//! traits; [`PgStore`] is the production implementation.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use mockall::automock;
use uuid::Uuid;

use crate::models::{Club, ClubFilter, ClubPlacement, Event, EventInput, InvitationState, NewClub};

#[cfg(test)]
pub(crate) mod memory;
pub mod postgres;

pub use postgres::PgStore;

#[automock]
#[async_trait]
pub trait EventStore: Send + Sync {
    async fn create_event(&self, input: &EventInput) -> Result<Event, sqlx::Error>;

    async fn list_events(&self) -> Result<Vec<Event>, sqlx::Error>;

    async fn get_event(&self, event_id: Uuid) -> Result<Option<Event>, sqlx::Error>;

    async fn update_event(
        &self,
        event_id: Uuid,
        input: &EventInput,
    ) -> Result<Option<Event>, sqlx::Error>;
}

/// Club rows. Every invitation write is conditional on the state the caller
/// last observed and reports whether a row actually changed.
#[automock]
#[async_trait]
pub trait ClubStore: Send + Sync {
    async fn create_clubs(
        &self,
        event_id: Uuid,
        clubs: Vec<NewClub>,
    ) -> Result<Vec<Club>, sqlx::Error>;

    /// Ordered by category, then name.
    async fn list_clubs(&self, event_id: Uuid, filter: &ClubFilter)
        -> Result<Vec<Club>, sqlx::Error>;

    async fn get_club(&self, club_id: Uuid) -> Result<Option<Club>, sqlx::Error>;

    async fn place_club(
        &self,
        club_id: Uuid,
        placement: &ClubPlacement,
    ) -> Result<Option<Club>, sqlx::Error>;

    /// Placed clubs of the event that were never invited, or whose
    /// invitation expired unanswered as of `now`.
    async fn find_invitable_clubs(
        &self,
        event_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<Club>, sqlx::Error>;

    /// Moves an invitable club to `pending` with a fresh token, replacing any
    /// expired one. `false` when the club is no longer invitable.
    async fn issue_invitation(
        &self,
        club_id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<bool, sqlx::Error>;

    async fn find_by_token(&self, token: &str) -> Result<Option<Club>, sqlx::Error>;

    async fn transition(
        &self,
        club_id: Uuid,
        from: InvitationState,
        to: InvitationState,
    ) -> Result<bool, sqlx::Error>;

    /// `pending -> accepted`. Clears the expiry so the token stays usable
    /// until registration.
    async fn accept_invitation(&self, club_id: Uuid) -> Result<bool, sqlx::Error>;

    /// `accepted -> registered`: stores the bio as the description and retires
    /// the token.
    async fn complete_registration(&self, club_id: Uuid, bio: &str) -> Result<bool, sqlx::Error>;
}
