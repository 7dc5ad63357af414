use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use tracing::{debug, error, info, warn};
use url::Url;
use uuid::Uuid;

use crate::config::InvitationSettings;
use crate::invitations::token::{generate_invitation_token, is_well_formed};
use crate::invitations::{
    DeliveryResult, DispatchReport, InvitationError, RsvpAnswer, RsvpOutcome, MAX_BIO_CHARS,
};
use crate::mail::templates::{self, InvitationLinks};
use crate::mail::{EmailMessage, Mailer};
use crate::models::{Club, InvitationState};
use crate::store::{ClubStore, EventStore};

/// Used in notification emails when the event row cannot be read.
const FALLBACK_EVENT_NAME: &str = "the event";

pub struct InvitationService {
    clubs: Arc<dyn ClubStore>,
    events: Arc<dyn EventStore>,
    mailer: Arc<dyn Mailer>,
    settings: InvitationSettings,
}

impl InvitationService {
    pub fn new(
        clubs: Arc<dyn ClubStore>,
        events: Arc<dyn EventStore>,
        mailer: Arc<dyn Mailer>,
        settings: InvitationSettings,
    ) -> Self {
        Self {
            clubs,
            events,
            mailer,
            settings,
        }
    }

    /// Invites every placed club of the event that was never invited or let
    /// its invitation expire unanswered. Re-inviting replaces the old token.
    ///
    /// Each club is handled on its own: the token is stored first, then the
    /// email is sent, and a failure for one club is recorded in the report
    /// without affecting the others. At most `dispatch_concurrency` sends are
    /// in flight at once.
    pub async fn dispatch(&self, event_id: Uuid) -> Result<DispatchReport, InvitationError> {
        let now = Utc::now();
        let clubs = self.clubs.find_invitable_clubs(event_id, now).await?;

        if clubs.is_empty() {
            info!(%event_id, "No eligible clubs to invite");
            return Ok(DispatchReport::no_clubs());
        }

        let base_url = self.base_url()?;
        let event = self
            .events
            .get_event(event_id)
            .await?
            .ok_or(InvitationError::EventNotFound(event_id))?;

        info!(%event_id, clubs = clubs.len(), "Dispatching invitations");

        let results: Vec<DeliveryResult> = stream::iter(clubs)
            .map(|club| self.invite_club(club, &event.name, base_url, now))
            .buffer_unordered(self.settings.dispatch_concurrency.max(1))
            .collect()
            .await;

        let report = DispatchReport::from_results(results);
        info!(
            %event_id,
            total = report.summary.total,
            successful = report.summary.successful,
            failed = report.summary.failed,
            "Invitation dispatch finished"
        );

        Ok(report)
    }

    async fn invite_club(
        &self,
        club: Club,
        event_name: &str,
        base_url: &Url,
        now: DateTime<Utc>,
    ) -> DeliveryResult {
        let token = generate_invitation_token();
        let expires_at = now + self.settings.token_ttl;

        match self.clubs.issue_invitation(club.id, &token, expires_at, now).await {
            Ok(true) => {}
            Ok(false) => {
                warn!(club_id = %club.id, "Club stopped being invitable before it was invited");
                return DeliveryResult::failed(
                    &club,
                    "Club is no longer eligible for an invitation",
                );
            }
            Err(e) => {
                error!(club_id = %club.id, error = ?e, "Failed to store invitation token");
                return DeliveryResult::failed(&club, "Failed to store invitation token");
            }
        }

        let accept_url = respond_url(base_url, &token, "yes");
        let decline_url = respond_url(base_url, &token, "no");
        let message = templates::invitation(
            &club.contact_email,
            event_name,
            &club.name,
            &InvitationLinks {
                accept_url: &accept_url,
                decline_url: &decline_url,
            },
        );

        match self.mailer.send(&message).await {
            Ok(()) => {
                debug!(club_id = %club.id, "Invitation sent");
                DeliveryResult::sent(&club)
            }
            Err(e) => {
                warn!(club_id = %club.id, error = %e, "Failed to send invitation");
                DeliveryResult::failed(&club, format!("Failed to send email: {e}"))
            }
        }
    }

    /// Applies an RSVP answer. Replays of the same answer settle to the same
    /// outcome; an answer contradicting an earlier one is not applied.
    pub async fn respond(
        &self,
        token: &str,
        answer: RsvpAnswer,
    ) -> Result<RsvpOutcome, InvitationError> {
        let token = token.trim();
        let Some(club) = self.lookup(token).await? else {
            return Ok(RsvpOutcome::InvalidLink);
        };

        if club.invitation_state != InvitationState::Pending {
            return self.settled_outcome(club.invitation_state, answer, token);
        }

        match answer {
            RsvpAnswer::No => {
                let declined = self
                    .clubs
                    .transition(club.id, InvitationState::Pending, InvitationState::Declined)
                    .await?;
                if !declined {
                    return self.after_lost_race(club.id, answer, token).await;
                }

                info!(club_id = %club.id, "Invitation declined");
                self.notify_decline(&club).await;
                Ok(RsvpOutcome::Declined)
            }
            RsvpAnswer::Yes => {
                let registration_url = self.registration_url(token)?;
                let accepted = self.clubs.accept_invitation(club.id).await?;
                if !accepted {
                    return self.after_lost_race(club.id, answer, token).await;
                }

                info!(club_id = %club.id, "Invitation accepted");
                Ok(RsvpOutcome::Accepted { registration_url })
            }
        }
    }

    /// Another request moved the club first; report whatever it settled on.
    async fn after_lost_race(
        &self,
        club_id: Uuid,
        answer: RsvpAnswer,
        token: &str,
    ) -> Result<RsvpOutcome, InvitationError> {
        debug!(%club_id, "Concurrent RSVP won, re-reading club");
        match self.clubs.get_club(club_id).await? {
            Some(club) => self.settled_outcome(club.invitation_state, answer, token),
            None => Ok(RsvpOutcome::InvalidLink),
        }
    }

    fn settled_outcome(
        &self,
        state: InvitationState,
        answer: RsvpAnswer,
        token: &str,
    ) -> Result<RsvpOutcome, InvitationError> {
        match (state, answer) {
            (InvitationState::Declined, RsvpAnswer::No) => Ok(RsvpOutcome::Declined),
            (InvitationState::Declined, RsvpAnswer::Yes) => Ok(RsvpOutcome::AlreadyDeclined),
            (InvitationState::Accepted, RsvpAnswer::Yes) => Ok(RsvpOutcome::Accepted {
                registration_url: self.registration_url(token)?,
            }),
            (InvitationState::Accepted, RsvpAnswer::No) => Ok(RsvpOutcome::AlreadyAccepted),
            (
                InvitationState::Unsolicited | InvitationState::Pending | InvitationState::Registered,
                _,
            ) => Ok(RsvpOutcome::InvalidLink),
        }
    }

    /// Resolves the club behind a registration link for the bio form.
    pub async fn registration_club(&self, token: &str) -> Result<Club, InvitationError> {
        let club = self
            .lookup(token.trim())
            .await?
            .ok_or(InvitationError::InvalidToken)?;

        if club.invitation_state != InvitationState::Accepted {
            return Err(InvitationError::NotAccepted(club.invitation_state));
        }

        Ok(club)
    }

    /// Stores the bio of an accepted club, retiring its token.
    pub async fn complete_registration(
        &self,
        token: &str,
        bio: &str,
    ) -> Result<Club, InvitationError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(InvitationError::MissingToken);
        }

        let bio = bio.trim();
        if bio.is_empty() {
            return Err(InvitationError::MissingBio);
        }
        if bio.chars().count() > MAX_BIO_CHARS {
            return Err(InvitationError::BioTooLong);
        }

        let mut club = self.registration_club(token).await?;

        if !self.clubs.complete_registration(club.id, bio).await? {
            // A concurrent submission retired the token first.
            return Err(InvitationError::InvalidToken);
        }

        info!(club_id = %club.id, "Registration completed");

        club.description = bio.to_string();
        club.invitation_state = InvitationState::Registered;
        club.invitation_token = None;
        club.invitation_expires_at = None;

        self.notify_registration(&club).await;

        Ok(club)
    }

    async fn lookup(&self, token: &str) -> Result<Option<Club>, InvitationError> {
        if token.is_empty() {
            return Err(InvitationError::MissingToken);
        }

        if !is_well_formed(token) {
            debug!("Malformed invitation token");
            return Ok(None);
        }

        let Some(club) = self.clubs.find_by_token(token).await? else {
            debug!("Unknown invitation token");
            return Ok(None);
        };

        if club.invitation_expired(Utc::now()) {
            debug!(club_id = %club.id, "Expired invitation token");
            return Ok(None);
        }

        Ok(Some(club))
    }

    fn base_url(&self) -> Result<&Url, InvitationError> {
        self.settings
            .base_url
            .as_ref()
            .ok_or(InvitationError::MissingBaseUrl)
    }

    fn registration_url(&self, token: &str) -> Result<String, InvitationError> {
        Ok(link(self.base_url()?, "register", &[("token", token)]))
    }

    async fn event_name(&self, event_id: Uuid) -> String {
        match self.events.get_event(event_id).await {
            Ok(Some(event)) => event.name,
            Ok(None) => FALLBACK_EVENT_NAME.to_string(),
            Err(e) => {
                warn!(%event_id, error = ?e, "Could not load event for notification");
                FALLBACK_EVENT_NAME.to_string()
            }
        }
    }

    async fn notify_decline(&self, club: &Club) {
        let event_name = self.event_name(club.event_id).await;
        let submitter =
            templates::decline_confirmation(&club.contact_email, &event_name, &club.name);
        let admin = self.settings.admin_email.as_deref().map(|admin| {
            templates::decline_admin_notice(admin, &event_name, &club.name, &club.contact_email)
        });

        self.notify(club.id, admin, submitter).await;
    }

    async fn notify_registration(&self, club: &Club) {
        let event_name = self.event_name(club.event_id).await;
        let submitter = templates::registration_confirmation(
            &club.contact_email,
            &event_name,
            &club.name,
            &club.description,
        );
        let admin = self.settings.admin_email.as_deref().map(|admin| {
            templates::registration_admin_notice(
                admin,
                &event_name,
                &club.name,
                &club.contact_email,
                &club.description,
            )
        });

        self.notify(club.id, admin, submitter).await;
    }

    /// Sends the admin and submitter emails side by side. Failures are logged
    /// and dropped.
    async fn notify(&self, club_id: Uuid, admin: Option<EmailMessage>, submitter: EmailMessage) {
        let admin_send = async {
            match &admin {
                Some(message) => Some(self.mailer.send(message).await),
                None => None,
            }
        };

        let (admin_result, submitter_result) =
            futures::join!(admin_send, self.mailer.send(&submitter));

        match admin_result {
            Some(Err(e)) => warn!(%club_id, error = %e, "Admin notification failed"),
            None => debug!(%club_id, "ADMIN_EMAIL not set, admin notification skipped"),
            Some(Ok(())) => {}
        }

        if let Err(e) = submitter_result {
            warn!(%club_id, error = %e, "Submitter confirmation failed");
        }
    }
}

fn respond_url(base_url: &Url, token: &str, response: &str) -> String {
    link(
        base_url,
        "api/invitations/respond",
        &[("token", token), ("response", response)],
    )
}

/// `path` is appended below the base URL's own path; query values are
/// percent-encoded.
fn link(base_url: &Url, path: &str, query: &[(&str, &str)]) -> String {
    let mut url = base_url.clone();
    let prefix = url.path().trim_end_matches('/').to_string();
    url.set_path(&format!("{prefix}/{path}"));
    url.set_fragment(None);
    url.query_pairs_mut().clear().extend_pairs(query);
    url.into()
}
