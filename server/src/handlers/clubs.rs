use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::response::Response;
use axum::Json;
use uuid::Uuid;

use crate::models::{ClubFilter, ClubPlacement, ClubView, Event, NewClub};
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, success};

async fn require_event(state: &AppState, event_id: Uuid) -> Result<Event, AppError> {
    state
        .events
        .get_event(event_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Event '{}' was not found", event_id)))
}

/// Roster import. Rows arrive already parsed from the organizer's spreadsheet.
pub async fn import_roster(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    payload: Result<Json<Vec<NewClub>>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(rows) = payload?;
    if rows.is_empty() {
        return Err(AppError::ValidationError(
            "The roster contains no clubs".to_string(),
        ));
    }
    for row in &rows {
        row.validate()?;
    }

    require_event(&state, event_id).await?;

    let clubs = state.clubs.create_clubs(event_id, rows).await?;
    tracing::info!(%event_id, count = clubs.len(), "Roster imported");

    let message = format!("{} clubs imported", clubs.len());
    let views: Vec<ClubView> = clubs.into_iter().map(ClubView::from).collect();

    Ok(created(views, message))
}

/// Attendee list of an event.
pub async fn list_clubs(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    Query(filter): Query<ClubFilter>,
) -> Result<Response, AppError> {
    require_event(&state, event_id).await?;

    let clubs = state.clubs.list_clubs(event_id, &filter).await?;
    let views: Vec<ClubView> = clubs.into_iter().map(ClubView::from).collect();

    Ok(success(views, "Clubs retrieved"))
}

pub async fn place_club(
    State(state): State<AppState>,
    Path(club_id): Path<Uuid>,
    payload: Result<Json<ClubPlacement>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(placement) = payload?;
    placement.validate()?;

    let club = state
        .clubs
        .get_club(club_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Club '{}' was not found", club_id)))?;

    if placement.has_times() {
        let event = require_event(&state, club.event_id).await?;
        if !event.table_times_enabled {
            return Err(AppError::ValidationError(
                "Table times are not enabled for this event".to_string(),
            ));
        }
    }

    let club = state
        .clubs
        .place_club(club_id, &placement)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Club '{}' was not found", club_id)))?;

    Ok(success(ClubView::from(club), "Club placed"))
}
