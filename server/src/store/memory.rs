//! In-memory store used by unit tests to check workflow end states.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use uuid::Uuid;

use crate::models::{Club, ClubFilter, ClubPlacement, Event, EventInput, InvitationState, NewClub};
use crate::store::{ClubStore, EventStore};

#[derive(Debug, Default)]
pub(crate) struct MemoryStore {
    events: Mutex<HashMap<Uuid, Event>>,
    clubs: Mutex<HashMap<Uuid, Club>>,
}

impl MemoryStore {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn insert_event(&self, name: &str) -> Event {
        let now = Utc::now();
        let event = Event {
            id: Uuid::new_v4(),
            name: name.to_string(),
            description: String::new(),
            event_date: NaiveDate::from_ymd_opt(2024, 9, 6).unwrap_or_default(),
            start_time: None,
            end_time: None,
            location_x: 0.0,
            location_y: 0.0,
            map_scale: 1.0,
            organization_name: String::new(),
            representative_name: String::new(),
            contact_email: String::new(),
            contact_phone: String::new(),
            address: String::new(),
            city: String::new(),
            state: String::new(),
            zip: String::new(),
            table_times_enabled: false,
            created_at: now,
            updated_at: now,
        };
        self.events
            .lock()
            .unwrap()
            .insert(event.id, event.clone());
        event
    }

    /// Adds a club with the given coordinates in the `unsolicited` state.
    pub(crate) fn insert_club(
        &self,
        event_id: Uuid,
        name: &str,
        coordinates: Option<(f64, f64)>,
    ) -> Club {
        let now = Utc::now();
        let club = Club {
            id: Uuid::new_v4(),
            event_id,
            name: name.to_string(),
            category: "General".to_string(),
            contact_email: format!("{}@clubs.example.edu", name.to_lowercase().replace(' ', "-")),
            description: String::new(),
            coordinate_x: coordinates.map(|(x, _)| x),
            coordinate_y: coordinates.map(|(_, y)| y),
            start_time: None,
            end_time: None,
            invitation_state: InvitationState::Unsolicited,
            invitation_token: None,
            invitation_expires_at: None,
            created_at: now,
            updated_at: now,
        };
        self.put_club(club.clone());
        club
    }

    pub(crate) fn put_club(&self, club: Club) {
        self.clubs.lock().unwrap().insert(club.id, club);
    }

    pub(crate) fn club(&self, club_id: Uuid) -> Club {
        self.clubs
            .lock()
            .unwrap()
            .get(&club_id)
            .cloned()
            .expect("club should exist")
    }

    fn apply_event(id: Uuid, input: &EventInput, created_at: DateTime<Utc>) -> Event {
        Event {
            id,
            name: input.name.trim().to_string(),
            description: input.description.clone(),
            event_date: input.event_date,
            start_time: input.start_time,
            end_time: input.end_time,
            location_x: input.location_x,
            location_y: input.location_y,
            map_scale: input.map_scale,
            organization_name: input.organization_name.clone(),
            representative_name: input.representative_name.clone(),
            contact_email: input.contact_email.clone(),
            contact_phone: input.contact_phone.clone(),
            address: input.address.clone(),
            city: input.city.clone(),
            state: input.state.clone(),
            zip: input.zip.clone(),
            table_times_enabled: input.table_times_enabled,
            created_at,
            updated_at: Utc::now(),
        }
    }
}

#[async_trait]
impl EventStore for MemoryStore {
    async fn create_event(&self, input: &EventInput) -> Result<Event, sqlx::Error> {
        let event = Self::apply_event(Uuid::new_v4(), input, Utc::now());
        self.events.lock().unwrap().insert(event.id, event.clone());
        Ok(event)
    }

    async fn list_events(&self) -> Result<Vec<Event>, sqlx::Error> {
        let mut events: Vec<Event> = self.events.lock().unwrap().values().cloned().collect();
        events.sort_by(|a, b| b.event_date.cmp(&a.event_date).then(a.name.cmp(&b.name)));
        Ok(events)
    }

    async fn get_event(&self, event_id: Uuid) -> Result<Option<Event>, sqlx::Error> {
        Ok(self.events.lock().unwrap().get(&event_id).cloned())
    }

    async fn update_event(
        &self,
        event_id: Uuid,
        input: &EventInput,
    ) -> Result<Option<Event>, sqlx::Error> {
        let mut events = self.events.lock().unwrap();
        let Some(existing) = events.get(&event_id) else {
            return Ok(None);
        };
        let updated = Self::apply_event(event_id, input, existing.created_at);
        events.insert(event_id, updated.clone());
        Ok(Some(updated))
    }
}

#[async_trait]
impl ClubStore for MemoryStore {
    async fn create_clubs(
        &self,
        event_id: Uuid,
        clubs: Vec<NewClub>,
    ) -> Result<Vec<Club>, sqlx::Error> {
        let created: Vec<Club> = clubs
            .into_iter()
            .map(|new| {
                let mut club = self.insert_club(event_id, new.name.trim(), None);
                club.category = new.category.trim().to_string();
                club.contact_email = new.contact_email.trim().to_string();
                club.description = new.description;
                self.put_club(club.clone());
                club
            })
            .collect();
        Ok(created)
    }

    async fn list_clubs(
        &self,
        event_id: Uuid,
        filter: &ClubFilter,
    ) -> Result<Vec<Club>, sqlx::Error> {
        let mut clubs: Vec<Club> = self
            .clubs
            .lock()
            .unwrap()
            .values()
            .filter(|club| club.event_id == event_id && filter.matches(club))
            .cloned()
            .collect();
        clubs.sort_by(|a, b| a.category.cmp(&b.category).then(a.name.cmp(&b.name)));
        Ok(clubs)
    }

    async fn get_club(&self, club_id: Uuid) -> Result<Option<Club>, sqlx::Error> {
        Ok(self.clubs.lock().unwrap().get(&club_id).cloned())
    }

    async fn place_club(
        &self,
        club_id: Uuid,
        placement: &ClubPlacement,
    ) -> Result<Option<Club>, sqlx::Error> {
        let mut clubs = self.clubs.lock().unwrap();
        Ok(clubs.get_mut(&club_id).map(|club| {
            club.coordinate_x = Some(placement.x);
            club.coordinate_y = Some(placement.y);
            club.start_time = placement.start_time;
            club.end_time = placement.end_time;
            club.clone()
        }))
    }

    async fn find_invitable_clubs(
        &self,
        event_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<Club>, sqlx::Error> {
        let mut clubs: Vec<Club> = self
            .clubs
            .lock()
            .unwrap()
            .values()
            .filter(|club| club.event_id == event_id && club.is_invitable(now))
            .cloned()
            .collect();
        clubs.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(clubs)
    }

    async fn issue_invitation(
        &self,
        club_id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<bool, sqlx::Error> {
        let mut clubs = self.clubs.lock().unwrap();
        match clubs.get_mut(&club_id) {
            Some(club) if club.is_invitable(now) => {
                club.invitation_state = InvitationState::Pending;
                club.invitation_token = Some(token.to_string());
                club.invitation_expires_at = Some(expires_at);
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<Club>, sqlx::Error> {
        Ok(self
            .clubs
            .lock()
            .unwrap()
            .values()
            .find(|club| club.invitation_token.as_deref() == Some(token))
            .cloned())
    }

    async fn transition(
        &self,
        club_id: Uuid,
        from: InvitationState,
        to: InvitationState,
    ) -> Result<bool, sqlx::Error> {
        let mut clubs = self.clubs.lock().unwrap();
        match clubs.get_mut(&club_id) {
            Some(club) if club.invitation_state == from => {
                club.invitation_state = to;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn accept_invitation(&self, club_id: Uuid) -> Result<bool, sqlx::Error> {
        let mut clubs = self.clubs.lock().unwrap();
        match clubs.get_mut(&club_id) {
            Some(club) if club.invitation_state == InvitationState::Pending => {
                club.invitation_state = InvitationState::Accepted;
                club.invitation_expires_at = None;
                Ok(true)
            }
            _ => Ok(false),
        }
    }

    async fn complete_registration(&self, club_id: Uuid, bio: &str) -> Result<bool, sqlx::Error> {
        let mut clubs = self.clubs.lock().unwrap();
        match clubs.get_mut(&club_id) {
            Some(club) if club.invitation_state == InvitationState::Accepted => {
                club.invitation_state = InvitationState::Registered;
                club.description = bio.to_string();
                club.invitation_token = None;
                club.invitation_expires_at = None;
                Ok(true)
            }
            _ => Ok(false),
        }
    }
}
