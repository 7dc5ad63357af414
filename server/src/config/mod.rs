use std::env;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use url::Url;

pub mod cors;
pub mod security;

pub use cors::create_cors_layer;
pub use security::create_security_headers_layer;

const DEFAULT_DATABASE_URL: &str = "postgres://localhost/jumbomap";
const DEFAULT_MAIL_FROM: &str = "JumboMap <no-reply@jumbomap.local>";
const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 5;
const DEFAULT_MAIL_TIMEOUT_SECS: u64 = 10;
const DEFAULT_INVITATION_TTL_HOURS: i64 = 14 * 24;
const MAX_INVITATION_TTL_HOURS: i64 = 365 * 24;
const DEFAULT_DISPATCH_CONCURRENCY: usize = 8;

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub bind_addr: SocketAddr,
    pub cors_allowed_origins: String,
    pub production: bool,
    pub invitations: InvitationSettings,
    pub mail: MailSettings,
}

/// Knobs of the invitation workflow.
#[derive(Debug, Clone, PartialEq)]
pub struct InvitationSettings {
    /// Absolute URL that links in emails and redirects are built under.
    /// Checked when a link is built, not at startup.
    pub base_url: Option<Url>,
    pub admin_email: Option<String>,
    pub token_ttl: chrono::Duration,
    pub dispatch_concurrency: usize,
}

impl Default for InvitationSettings {
    fn default() -> Self {
        Self {
            base_url: None,
            admin_email: None,
            token_ttl: chrono::Duration::hours(DEFAULT_INVITATION_TTL_HOURS),
            dispatch_concurrency: DEFAULT_DISPATCH_CONCURRENCY,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MailSettings {
    /// HTTP email API endpoint. `None` selects the logging transport.
    pub api_url: Option<String>,
    pub api_key: Option<String>,
    pub from: String,
    pub timeout: Duration,
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds the config from an arbitrary key lookup so tests do not need to
    /// touch the process environment.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let text = |key: &str| {
            lookup(key)
                .map(|value| value.trim().to_string())
                .filter(|value| !value.is_empty())
        };

        let bind_addr: SocketAddr =
            parse_or(&text, "BIND_ADDR", SocketAddr::from(([0, 0, 0, 0], 3001)));

        let ttl_hours: i64 = parse_or(&text, "INVITATION_TTL_HOURS", DEFAULT_INVITATION_TTL_HOURS);
        let concurrency: usize =
            parse_or(&text, "DISPATCH_CONCURRENCY", DEFAULT_DISPATCH_CONCURRENCY);

        Self {
            database_url: text("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            database_max_connections: parse_or(
                &text,
                "DATABASE_MAX_CONNECTIONS",
                DEFAULT_DATABASE_MAX_CONNECTIONS,
            ),
            bind_addr,
            cors_allowed_origins: lookup("CORS_ALLOWED_ORIGINS")
                .unwrap_or_else(|| cors::DEFAULT_ALLOWED_ORIGINS.to_string()),
            production: text("RUST_ENV")
                .map(|value| value.eq_ignore_ascii_case("production"))
                .unwrap_or(false),
            invitations: InvitationSettings {
                base_url: text("PUBLIC_BASE_URL").and_then(|raw| parse_base_url(&raw)),
                admin_email: text("ADMIN_EMAIL"),
                token_ttl: chrono::Duration::hours(ttl_hours.clamp(1, MAX_INVITATION_TTL_HOURS)),
                dispatch_concurrency: concurrency.max(1),
            },
            mail: MailSettings {
                api_url: text("MAIL_API_URL"),
                api_key: text("MAIL_API_KEY"),
                from: text("MAIL_FROM").unwrap_or_else(|| DEFAULT_MAIL_FROM.to_string()),
                timeout: Duration::from_secs(parse_or(
                    &text,
                    "MAIL_TIMEOUT_SECS",
                    DEFAULT_MAIL_TIMEOUT_SECS,
                )),
            },
        }
    }
}

fn parse_base_url(raw: &str) -> Option<Url> {
    match Url::parse(raw) {
        Ok(url) if matches!(url.scheme(), "http" | "https") => Some(url),
        _ => {
            tracing::warn!("Config: PUBLIC_BASE_URL '{}' is not an http(s) URL, ignoring it", raw);
            None
        }
    }
}

fn parse_or<T, F>(text: &F, key: &str, default: T) -> T
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    match text(key) {
        Some(raw) => match raw.parse::<T>() {
            Ok(value) => value,
            Err(_) => {
                tracing::warn!("Config: {} has an invalid value '{}', using default", key, raw);
                default
            }
        },
        None => default,
    }
}
