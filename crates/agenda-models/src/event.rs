use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};

/// Display status of an event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventStatus {
    Draft,
    Scheduled,
    Live,
    Past,
    Archived,
}

impl EventStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            EventStatus::Draft => "draft",
            EventStatus::Scheduled => "scheduled",
            EventStatus::Live => "live",
            EventStatus::Past => "past",
            EventStatus::Archived => "archived",
        }
    }

    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "draft" => Some(EventStatus::Draft),
            "scheduled" => Some(EventStatus::Scheduled),
            "live" => Some(EventStatus::Live),
            "past" => Some(EventStatus::Past),
            "archived" => Some(EventStatus::Archived),
            _ => None,
        }
    }
}

impl std::fmt::Display for EventStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Half-open `[publish_start_at, publish_end_at)` visibility interval.
/// A missing end means the window never closes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PublishWindow {
    #[serde(default)]
    pub publish_start_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub publish_end_at: Option<DateTime<Utc>>,
}

impl PublishWindow {
    pub fn new(start: Option<DateTime<Utc>>, end: Option<DateTime<Utc>>) -> Self {
        Self {
            publish_start_at: start,
            publish_end_at: end,
        }
    }

    /// True when the end bound is set and precedes the start bound.
    pub fn is_inverted(&self) -> bool {
        matches!(
            (self.publish_start_at, self.publish_end_at),
            (Some(start), Some(end)) if end < start
        )
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub tenant_id: i64,
    pub name: String,
    pub description: Option<String>,
    /// Cached status as last stored. Not authoritative for display.
    pub status: EventStatus,
    #[serde(flatten)]
    pub window: PublishWindow,
    pub is_weekly: bool,
    /// Only read for weekly events.
    pub is_live: bool,
    /// 0 = Sunday .. 6 = Saturday.
    pub day_of_week: Option<i64>,
    pub starts_at: Option<DateTime<Utc>>,
    pub ends_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Event {
    /// Time-of-day component of `starts_at`. Weekly events only carry
    /// meaning here; their date part is a placeholder.
    pub fn start_time_of_day(&self) -> Option<NaiveTime> {
        self.starts_at.map(|ts| ts.time())
    }
}
