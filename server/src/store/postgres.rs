use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{query, query_as, PgPool, Postgres, QueryBuilder};
use uuid::Uuid;

use crate::models::{Club, ClubFilter, ClubPlacement, Event, EventInput, InvitationState, NewClub};
use crate::store::{ClubStore, EventStore};

const EVENT_COLUMNS: &str = "id, name, description, event_date, start_time, end_time, \
    location_x, location_y, map_scale, organization_name, representative_name, contact_email, \
    contact_phone, address, city, state, zip, table_times_enabled, created_at, updated_at";

const CLUB_COLUMNS: &str = "id, event_id, name, category, contact_email, description, \
    coordinate_x, coordinate_y, start_time, end_time, invitation_state, invitation_token, \
    invitation_expires_at, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl EventStore for PgStore {
    async fn create_event(&self, input: &EventInput) -> Result<Event, sqlx::Error> {
        let sql = format!(
            "INSERT INTO event (id, name, description, event_date, start_time, end_time, \
             location_x, location_y, map_scale, organization_name, representative_name, \
             contact_email, contact_phone, address, city, state, zip, table_times_enabled) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18) \
             RETURNING {EVENT_COLUMNS}"
        );

        query_as::<Postgres, Event>(&sql)
            .bind(Uuid::new_v4())
            .bind(input.name.trim())
            .bind(&input.description)
            .bind(input.event_date)
            .bind(input.start_time)
            .bind(input.end_time)
            .bind(input.location_x)
            .bind(input.location_y)
            .bind(input.map_scale)
            .bind(&input.organization_name)
            .bind(&input.representative_name)
            .bind(&input.contact_email)
            .bind(&input.contact_phone)
            .bind(&input.address)
            .bind(&input.city)
            .bind(&input.state)
            .bind(&input.zip)
            .bind(input.table_times_enabled)
            .fetch_one(&self.pool)
            .await
    }

    async fn list_events(&self) -> Result<Vec<Event>, sqlx::Error> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM event ORDER BY event_date DESC, name");

        query_as::<Postgres, Event>(&sql).fetch_all(&self.pool).await
    }

    async fn get_event(&self, event_id: Uuid) -> Result<Option<Event>, sqlx::Error> {
        let sql = format!("SELECT {EVENT_COLUMNS} FROM event WHERE id = $1");

        query_as::<Postgres, Event>(&sql)
            .bind(event_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn update_event(
        &self,
        event_id: Uuid,
        input: &EventInput,
    ) -> Result<Option<Event>, sqlx::Error> {
        let sql = format!(
            "UPDATE event SET name = $2, description = $3, event_date = $4, start_time = $5, \
             end_time = $6, location_x = $7, location_y = $8, map_scale = $9, \
             organization_name = $10, representative_name = $11, contact_email = $12, \
             contact_phone = $13, address = $14, city = $15, state = $16, zip = $17, \
             table_times_enabled = $18, updated_at = NOW() \
             WHERE id = $1 RETURNING {EVENT_COLUMNS}"
        );

        query_as::<Postgres, Event>(&sql)
            .bind(event_id)
            .bind(input.name.trim())
            .bind(&input.description)
            .bind(input.event_date)
            .bind(input.start_time)
            .bind(input.end_time)
            .bind(input.location_x)
            .bind(input.location_y)
            .bind(input.map_scale)
            .bind(&input.organization_name)
            .bind(&input.representative_name)
            .bind(&input.contact_email)
            .bind(&input.contact_phone)
            .bind(&input.address)
            .bind(&input.city)
            .bind(&input.state)
            .bind(&input.zip)
            .bind(input.table_times_enabled)
            .fetch_optional(&self.pool)
            .await
    }
}

#[async_trait]
impl ClubStore for PgStore {
    async fn create_clubs(
        &self,
        event_id: Uuid,
        clubs: Vec<NewClub>,
    ) -> Result<Vec<Club>, sqlx::Error> {
        let sql = format!(
            "INSERT INTO club (id, event_id, name, category, contact_email, description) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING {CLUB_COLUMNS}"
        );

        let mut tx = self.pool.begin().await?;
        let mut created = Vec::with_capacity(clubs.len());

        for club in clubs {
            let row = query_as::<Postgres, Club>(&sql)
                .bind(Uuid::new_v4())
                .bind(event_id)
                .bind(club.name.trim())
                .bind(club.category.trim())
                .bind(club.contact_email.trim())
                .bind(&club.description)
                .fetch_one(&mut *tx)
                .await?;
            created.push(row);
        }

        tx.commit().await?;

        Ok(created)
    }

    async fn list_clubs(
        &self,
        event_id: Uuid,
        filter: &ClubFilter,
    ) -> Result<Vec<Club>, sqlx::Error> {
        let mut builder: QueryBuilder<'_, Postgres> =
            QueryBuilder::new(format!("SELECT {CLUB_COLUMNS} FROM club WHERE event_id = "));
        builder.push_bind(event_id);

        if let Some(category) = &filter.category {
            builder.push(" AND category = ").push_bind(category);
        }

        match filter.placed {
            Some(true) => {
                builder.push(" AND coordinate_x IS NOT NULL");
            }
            Some(false) => {
                builder.push(" AND coordinate_x IS NULL");
            }
            None => {}
        }

        builder.push(" ORDER BY category, name");

        builder
            .build_query_as::<Club>()
            .fetch_all(&self.pool)
            .await
    }

    async fn get_club(&self, club_id: Uuid) -> Result<Option<Club>, sqlx::Error> {
        let sql = format!("SELECT {CLUB_COLUMNS} FROM club WHERE id = $1");

        query_as::<Postgres, Club>(&sql)
            .bind(club_id)
            .fetch_optional(&self.pool)
            .await
    }

    async fn place_club(
        &self,
        club_id: Uuid,
        placement: &ClubPlacement,
    ) -> Result<Option<Club>, sqlx::Error> {
        let sql = format!(
            "UPDATE club SET coordinate_x = $2, coordinate_y = $3, start_time = $4, \
             end_time = $5, updated_at = NOW() WHERE id = $1 RETURNING {CLUB_COLUMNS}"
        );

        query_as::<Postgres, Club>(&sql)
            .bind(club_id)
            .bind(placement.x)
            .bind(placement.y)
            .bind(placement.start_time)
            .bind(placement.end_time)
            .fetch_optional(&self.pool)
            .await
    }

    async fn find_invitable_clubs(
        &self,
        event_id: Uuid,
        now: DateTime<Utc>,
    ) -> Result<Vec<Club>, sqlx::Error> {
        let sql = format!(
            "SELECT {CLUB_COLUMNS} FROM club WHERE event_id = $1 \
             AND coordinate_x IS NOT NULL AND coordinate_y IS NOT NULL \
             AND (invitation_state = $2 \
                  OR (invitation_state = $3 AND invitation_expires_at <= $4)) \
             ORDER BY name"
        );

        query_as::<Postgres, Club>(&sql)
            .bind(event_id)
            .bind(InvitationState::Unsolicited)
            .bind(InvitationState::Pending)
            .bind(now)
            .fetch_all(&self.pool)
            .await
    }

    async fn issue_invitation(
        &self,
        club_id: Uuid,
        token: &str,
        expires_at: DateTime<Utc>,
        now: DateTime<Utc>,
    ) -> Result<bool, sqlx::Error> {
        let result = query(
            "UPDATE club SET invitation_state = $2, invitation_token = $3, \
             invitation_expires_at = $4, updated_at = NOW() \
             WHERE id = $1 AND coordinate_x IS NOT NULL AND coordinate_y IS NOT NULL \
             AND (invitation_state = $5 \
                  OR (invitation_state = $2 AND invitation_expires_at <= $6))",
        )
        .bind(club_id)
        .bind(InvitationState::Pending)
        .bind(token)
        .bind(expires_at)
        .bind(InvitationState::Unsolicited)
        .bind(now)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn find_by_token(&self, token: &str) -> Result<Option<Club>, sqlx::Error> {
        let sql = format!("SELECT {CLUB_COLUMNS} FROM club WHERE invitation_token = $1");

        query_as::<Postgres, Club>(&sql)
            .bind(token)
            .fetch_optional(&self.pool)
            .await
    }

    async fn transition(
        &self,
        club_id: Uuid,
        from: InvitationState,
        to: InvitationState,
    ) -> Result<bool, sqlx::Error> {
        let result = query(
            "UPDATE club SET invitation_state = $3, updated_at = NOW() \
             WHERE id = $1 AND invitation_state = $2",
        )
        .bind(club_id)
        .bind(from)
        .bind(to)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn accept_invitation(&self, club_id: Uuid) -> Result<bool, sqlx::Error> {
        let result = query(
            "UPDATE club SET invitation_state = $2, invitation_expires_at = NULL, \
             updated_at = NOW() WHERE id = $1 AND invitation_state = $3",
        )
        .bind(club_id)
        .bind(InvitationState::Accepted)
        .bind(InvitationState::Pending)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }

    async fn complete_registration(&self, club_id: Uuid, bio: &str) -> Result<bool, sqlx::Error> {
        let result = query(
            "UPDATE club SET invitation_state = $2, description = $3, \
             invitation_token = NULL, invitation_expires_at = NULL, updated_at = NOW() \
             WHERE id = $1 AND invitation_state = $4",
        )
        .bind(club_id)
        .bind(InvitationState::Registered)
        .bind(bio)
        .bind(InvitationState::Accepted)
        .execute(&self.pool)
        .await?;

        Ok(result.rows_affected() == 1)
    }
}
