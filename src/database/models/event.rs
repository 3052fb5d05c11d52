use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct Event {
    pub id: Uuid,
    pub pincode: Option<String>,
    pub title: String,
    pub description: String,
    pub location: String,
    pub event_date: NaiveDate,
    pub created_at: DateTime<Utc>,
}

impl Event {
    pub fn belongs_to(&self, pincode: &str) -> bool {
        self.pincode.as_deref() == Some(pincode)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, FromRow)]
pub struct EventReport {
    pub id: Uuid,
    #[serde(rename = "event")]
    pub event_id: Uuid,
    pub pincode: Option<String>,
    pub name: String,
    pub report_description: String,
    #[serde(rename = "atLocation")]
    pub at_location: bool,
    pub attached_report: Option<String>,
    pub date_time: DateTime<Utc>,
}

impl EventReport {
    pub fn belongs_to(&self, pincode: &str) -> bool {
        self.pincode.as_deref() == Some(pincode)
    }
}
