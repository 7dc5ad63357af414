//! JumboMap backend: events, club rosters, table placement on the event map
//! and the email RSVP workflow for clubs.

pub mod config;
pub mod handlers;
pub mod invitations;
pub mod mail;
pub mod models;
pub mod routes;
pub mod state;
pub mod store;
pub mod utils;
