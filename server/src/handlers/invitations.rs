use axum::extract::rejection::{FormRejection, JsonRejection};
use axum::extract::{Path, Query, State};
use axum::response::{Html, IntoResponse, Redirect, Response};
use axum::{Form, Json};
use serde::Deserialize;
use uuid::Uuid;

use crate::invitations::pages::{self, PageError};
use crate::invitations::{InvitationError, RsvpAnswer, RsvpOutcome};
use crate::state::AppState;
use crate::utils::error::AppError;

#[derive(Debug, Deserialize)]
pub struct RespondParams {
    pub token: Option<String>,
    pub response: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct TokenParams {
    pub token: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RegistrationRequest {
    #[serde(default)]
    pub token: String,
    #[serde(default)]
    pub bio: String,
}

/// Sends invitations to every eligible club of the event.
pub async fn dispatch_invitations(
    State(state): State<AppState>,
    Path(event_id): Path<Uuid>,
) -> Result<Response, AppError> {
    let report = state.invitations.dispatch(event_id).await?;

    Ok(Json(report).into_response())
}

/// Target of the yes/no links in invitation emails.
pub async fn respond(
    State(state): State<AppState>,
    Query(params): Query<RespondParams>,
) -> Result<Response, PageError> {
    // Both parameters are checked before any lookup.
    let answer: RsvpAnswer = params.response.as_deref().unwrap_or_default().parse()?;
    let token = params.token.unwrap_or_default();
    if token.trim().is_empty() {
        return Err(InvitationError::MissingToken.into());
    }

    let response = match state.invitations.respond(&token, answer).await? {
        RsvpOutcome::Declined => pages::declined().into_response(),
        RsvpOutcome::Accepted { registration_url } => {
            Redirect::to(&registration_url).into_response()
        }
        RsvpOutcome::InvalidLink => pages::invalid_link().into_response(),
        RsvpOutcome::AlreadyAccepted => pages::already_accepted().into_response(),
        RsvpOutcome::AlreadyDeclined => pages::already_declined().into_response(),
    };

    Ok(response)
}

/// Bio form reached through the redirect after accepting.
pub async fn registration_page(
    State(state): State<AppState>,
    Query(params): Query<TokenParams>,
) -> Result<Html<String>, PageError> {
    let token = params.token.unwrap_or_default();

    match state.invitations.registration_club(&token).await {
        Ok(club) => Ok(pages::registration_form(token.trim(), &club.name)),
        Err(InvitationError::InvalidToken) => Ok(pages::invalid_link()),
        Err(e) => Err(e.into()),
    }
}

/// Form post from the registration page.
pub async fn submit_registration_form(
    State(state): State<AppState>,
    payload: Result<Form<RegistrationRequest>, FormRejection>,
) -> Result<Html<String>, PageError> {
    let Form(request) = payload.map_err(AppError::from)?;
    let club = state
        .invitations
        .complete_registration(&request.token, &request.bio)
        .await?;

    Ok(pages::registration_complete(&club.name))
}

/// JSON variant of the registration submit: HTML on success, the JSON error
/// envelope otherwise.
pub async fn complete_registration(
    State(state): State<AppState>,
    payload: Result<Json<RegistrationRequest>, JsonRejection>,
) -> Result<Html<String>, AppError> {
    let Json(request) = payload?;
    let club = state
        .invitations
        .complete_registration(&request.token, &request.bio)
        .await?;

    Ok(pages::registration_complete(&club.name))
}
