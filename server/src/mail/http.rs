use async_trait::async_trait;
use reqwest::Client;
use serde::Serialize;

use crate::config::MailSettings;
use crate::mail::{EmailMessage, MailError, Mailer};

/// Sends mail through a JSON email API (`POST {from, to, subject, html}` with
/// an optional bearer key).
#[derive(Debug, Clone)]
pub struct HttpMailer {
    client: Client,
    endpoint: String,
    api_key: Option<String>,
    from: String,
}

#[derive(Serialize)]
struct SendRequest<'a> {
    from: &'a str,
    to: &'a str,
    subject: &'a str,
    html: &'a str,
}

impl HttpMailer {
    pub fn new(settings: &MailSettings, endpoint: &str) -> Result<Self, MailError> {
        let client = Client::builder().timeout(settings.timeout).build()?;

        Ok(Self {
            client,
            endpoint: endpoint.to_string(),
            api_key: settings.api_key.clone(),
            from: settings.from.clone(),
        })
    }
}

#[async_trait]
impl Mailer for HttpMailer {
    async fn send(&self, message: &EmailMessage) -> Result<(), MailError> {
        let mut request = self.client.post(&self.endpoint).json(&SendRequest {
            from: &self.from,
            to: &message.to,
            subject: &message.subject,
            html: &message.html,
        });

        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }

        let response = request.send().await?;
        let status = response.status();

        if status.is_success() {
            tracing::debug!(to = %message.to, "Email accepted by provider");
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(MailError::Rejected {
            status: status.as_u16(),
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn unreachable_provider_is_a_transport_error() {
        let settings = MailSettings {
            api_url: None,
            api_key: Some("key".to_string()),
            from: "no-reply@example.edu".to_string(),
            timeout: Duration::from_millis(500),
        };
        // Port 9 (discard) is closed on test machines.
        let mailer = HttpMailer::new(&settings, "http://127.0.0.1:9/send").expect("client builds");
        let message = EmailMessage {
            to: "club@example.edu".to_string(),
            subject: "Hello".to_string(),
            html: "<p>Hi</p>".to_string(),
        };

        let result = mailer.send(&message).await;

        assert!(matches!(result, Err(MailError::Transport(_))));
    }
}
