use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::response::Response;
use axum::Json;
use uuid::Uuid;

use crate::models::EventInput;
use crate::state::AppState;
use crate::utils::error::AppError;
use crate::utils::response::{created, success};

pub async fn create_event(
    State(state): State<AppState>,
    payload: Result<Json<EventInput>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(input) = payload?;
    input.validate()?;

    let event = state.events.create_event(&input).await?;
    tracing::info!(event_id = %event.id, "Event created");

    Ok(created(event, "Event created"))
}

pub async fn list_events(State(state): State<AppState>) -> Result<Response, AppError> {
    let events = state.events.list_events().await?;

    Ok(success(events, "Events retrieved"))
}

pub async fn get_event(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let event = state
        .events
        .get_event(event_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Event '{}' was not found", event_id)))?;

    Ok(success(event, "Event retrieved"))
}

pub async fn update_event(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
    payload: Result<Json<EventInput>, JsonRejection>,
) -> Result<Response, AppError> {
    let Json(input) = payload?;
    input.validate()?;

    let event = state
        .events
        .update_event(event_id, &input)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Event '{}' was not found", event_id)))?;

    Ok(success(event, "Event updated"))
}
