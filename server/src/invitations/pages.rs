//! Server-rendered pages shown to invitation recipients.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};

use crate::invitations::{InvitationError, MAX_BIO_CHARS};
use crate::utils::error::AppError;
use crate::utils::html::escape;

fn page(title: &str, body: &str) -> Html<String> {
    Html(format!(
        "<!DOCTYPE html><html lang=\"en\"><head><meta charset=\"utf-8\">\
         <meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">\
         <title>{title} | JumboMap</title>\
         <style>body{{font-family:sans-serif;max-width:560px;margin:48px auto;padding:0 16px;}}\
         textarea{{width:100%;}}</style></head>\
         <body><h1>{title}</h1>{body}</body></html>",
        title = escape(title),
        body = body,
    ))
}

pub fn declined() -> Html<String> {
    page(
        "Thank you",
        "<p>Your response has been recorded. We're sorry you can't make it.</p>",
    )
}

pub fn invalid_link() -> Html<String> {
    page(
        "Invalid or expired link",
        "<p>This invitation link is invalid or has expired. \
         Please contact the event organizer if you think this is a mistake.</p>",
    )
}

pub fn already_accepted() -> Html<String> {
    page(
        "Already accepted",
        "<p>Your club has already accepted this invitation, so the response was not changed. \
         Please contact the event organizer if your plans have changed.</p>",
    )
}

pub fn already_declined() -> Html<String> {
    page(
        "Already declined",
        "<p>Your club has already declined this invitation, so the response was not changed. \
         Please contact the event organizer if your plans have changed.</p>",
    )
}

pub fn registration_form(token: &str, club_name: &str) -> Html<String> {
    let body = format!(
        "<p>Thanks for accepting, {club}! Tell visitors about your club in a few sentences.</p>\
         <form method=\"post\" action=\"/register\">\
         <input type=\"hidden\" name=\"token\" value=\"{token}\">\
         <p><textarea name=\"bio\" rows=\"5\" maxlength=\"{max}\" required></textarea></p>\
         <p><button type=\"submit\">Complete registration</button></p></form>",
        club = escape(club_name),
        token = escape(token),
        max = MAX_BIO_CHARS,
    );
    page("Complete your registration", &body)
}

pub fn registration_complete(club_name: &str) -> Html<String> {
    let body = format!(
        "<p>{club} is registered. A confirmation email is on its way.</p>",
        club = escape(club_name),
    );
    page("Registration complete", &body)
}

pub fn error(message: &str) -> Html<String> {
    page("Something went wrong", &format!("<p>{}</p>", escape(message)))
}

/// Failure of an HTML endpoint. Renders the generic error page with the
/// status of the underlying [`AppError`]; only client-facing messages are
/// shown.
#[derive(Debug)]
pub struct PageError(pub AppError);

impl From<AppError> for PageError {
    fn from(error: AppError) -> Self {
        Self(error)
    }
}

impl From<InvitationError> for PageError {
    fn from(error: InvitationError) -> Self {
        Self(error.into())
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        let status: StatusCode = self.0.status_code();
        self.0.log();

        let message = if status.is_server_error() {
            "We could not process your request. Please try again later.".to_string()
        } else {
            self.0.public_message()
        };

        (status, error(&message)).into_response()
    }
}
