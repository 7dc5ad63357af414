//! Outbound email.
//!
//! The workflow only sees the [`Mailer`] trait; the transport is picked once
//! at startup from [`MailSettings`] and injected.

use std::sync::Arc;

use async_trait::async_trait;
use mockall::automock;
use serde::Serialize;
use thiserror::Error;

use crate::config::MailSettings;

pub mod http;
pub mod templates;

pub use http::HttpMailer;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EmailMessage {
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[derive(Debug, Error)]
pub enum MailError {
    #[error("email transport request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("email provider rejected the message with status {status}: {body}")]
    Rejected { status: u16, body: String },
}

#[automock]
#[async_trait]
pub trait Mailer: Send + Sync {
    /// Hands one message to the transport. Success means the transport
    /// accepted it, not that it was delivered.
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError>;
}

/// Transport used when no email API is configured: messages are logged and
/// dropped.
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        tracing::info!(
            to = %message.to,
            subject = %message.subject,
            "Email transport not configured, message logged only"
        );
        Ok(())
    }
}

pub fn create_mailer(settings: &MailSettings) -> Result<Arc<dyn Mailer>, MailError> {
    match settings.api_url.as_deref() {
        Some(url) => {
            tracing::info!("Mail: sending through HTTP API at {}", url);
            Ok(Arc::new(HttpMailer::new(settings, url)?))
        }
        None => {
            tracing::warn!("Mail: MAIL_API_URL is not set, outbound email will only be logged");
            Ok(Arc::new(LogMailer))
        }
    }
}
