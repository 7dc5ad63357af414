use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use crate::utils::error::AppError;

/// An organizer-created gathering. `location_x`/`location_y` are opaque map
/// coordinates and are stored and returned verbatim.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: Uuid,
    pub name: String,
    pub description: String,
    pub event_date: NaiveDate,
    pub start_time: Option<NaiveTime>,
    pub end_time: Option<NaiveTime>,
    pub location_x: f64,
    pub location_y: f64,
    pub map_scale: f64,
    pub organization_name: String,
    pub representative_name: String,
    pub contact_email: String,
    pub contact_phone: String,
    pub address: String,
    pub city: String,
    pub state: String,
    pub zip: String,
    pub table_times_enabled: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Body of the create and update event endpoints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub event_date: NaiveDate,
    #[serde(default)]
    pub start_time: Option<NaiveTime>,
    #[serde(default)]
    pub end_time: Option<NaiveTime>,
    #[serde(default)]
    pub location_x: f64,
    #[serde(default)]
    pub location_y: f64,
    #[serde(default = "default_map_scale")]
    pub map_scale: f64,
    #[serde(default)]
    pub organization_name: String,
    #[serde(default)]
    pub representative_name: String,
    #[serde(default)]
    pub contact_email: String,
    #[serde(default)]
    pub contact_phone: String,
    #[serde(default)]
    pub address: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip: String,
    #[serde(default)]
    pub table_times_enabled: bool,
}

fn default_map_scale() -> f64 {
    1.0
}

impl EventInput {
    pub fn validate(&self) -> Result<(), AppError> {
        if self.name.trim().is_empty() {
            return Err(AppError::ValidationError(
                "Event name is required".to_string(),
            ));
        }

        if let (Some(start), Some(end)) = (self.start_time, self.end_time) {
            if end <= start {
                return Err(AppError::ValidationError(
                    "Event end time must be after its start time".to_string(),
                ));
            }
        }

        if !self.map_scale.is_finite() || self.map_scale <= 0.0 {
            return Err(AppError::ValidationError(
                "Map scale must be a positive number".to_string(),
            ));
        }

        Ok(())
    }
}
