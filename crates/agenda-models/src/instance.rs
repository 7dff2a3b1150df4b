use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Stored status of a single dated occurrence of a weekly event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InstanceStatus {
    Live,
    Scheduled,
    Draft,
    Past,
    Cancelled,
}

impl InstanceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            InstanceStatus::Live => "live",
            InstanceStatus::Scheduled => "scheduled",
            InstanceStatus::Draft => "draft",
            InstanceStatus::Past => "past",
            InstanceStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "live" => Some(InstanceStatus::Live),
            "scheduled" => Some(InstanceStatus::Scheduled),
            "draft" => Some(InstanceStatus::Draft),
            "past" => Some(InstanceStatus::Past),
            "cancelled" => Some(InstanceStatus::Cancelled),
            _ => None,
        }
    }
}

impl std::fmt::Display for InstanceStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventInstance {
    pub id: i64,
    pub event_id: i64,
    pub instance_date: NaiveDate,
    pub status: InstanceStatus,
    pub custom_description: Option<String>,
    pub created_at: DateTime<Utc>,
}
