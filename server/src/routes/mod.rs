use axum::{
    routing::{get, post, put},
    Router,
};
use tower_http::trace::TraceLayer;

use crate::config::{create_cors_layer, create_security_headers_layer, Config};
use crate::handlers::{
    clubs::{import_roster, list_clubs, place_club},
    events::{create_event, get_event, list_events, update_event},
    health_check,
    invitations::{
        complete_registration, dispatch_invitations, registration_page, respond,
        submit_registration_form,
    },
};
use crate::state::AppState;

pub fn create_routes(state: AppState, config: &Config) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/api/events", get(list_events).post(create_event))
        .route("/api/events/:event_id", get(get_event).put(update_event))
        .route(
            "/api/events/:event_id/clubs",
            get(list_clubs).post(import_roster),
        )
        .route(
            "/api/events/:event_id/invitations",
            post(dispatch_invitations),
        )
        .route("/api/clubs/:club_id/placement", put(place_club))
        .route("/api/invitations/respond", get(respond))
        .route("/api/invitations/register", post(complete_registration))
        .route(
            "/register",
            get(registration_page).post(submit_registration_form),
        )
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(create_security_headers_layer(config.production))
        .layer(create_cors_layer(&config.cors_allowed_origins))
}
