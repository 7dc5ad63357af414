use std::sync::Arc;

use sqlx::PgPool;

use crate::config::InvitationSettings;
use crate::invitations::InvitationService;
use crate::mail::Mailer;
use crate::store::{ClubStore, EventStore, PgStore};

/// Shared handler state. Built once at startup; every collaborator is injected
/// here rather than held in globals.
#[derive(Clone)]
pub struct AppState {
    pub events: Arc<dyn EventStore>,
    pub clubs: Arc<dyn ClubStore>,
    pub invitations: Arc<InvitationService>,
}

impl AppState {
    pub fn new(
        events: Arc<dyn EventStore>,
        clubs: Arc<dyn ClubStore>,
        mailer: Arc<dyn Mailer>,
        settings: InvitationSettings,
    ) -> Self {
        let invitations = Arc::new(InvitationService::new(
            clubs.clone(),
            events.clone(),
            mailer,
            settings,
        ));

        Self {
            events,
            clubs,
            invitations,
        }
    }

    pub fn with_pool(pool: PgPool, mailer: Arc<dyn Mailer>, settings: InvitationSettings) -> Self {
        let store = Arc::new(PgStore::new(pool));
        Self::new(store.clone(), store, mailer, settings)
    }
}
