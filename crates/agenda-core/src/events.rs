use agenda_db::DbPool;
use agenda_models::{Event, EventStatus};
use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

use crate::error::CoreError;
use crate::recurrence::next_occurrence;
use crate::rows::event_from_row;
use crate::status::display_status;

/// Load an event, hiding events that belong to another tenant.
pub async fn load_tenant_event(
    pool: &DbPool,
    tenant_id: i64,
    event_id: i64,
) -> Result<Event, CoreError> {
    let row = agenda_db::events::get_event(pool, event_id)
        .await?
        .ok_or(CoreError::NotFound)?;
    if row.tenant_id != tenant_id {
        return Err(CoreError::NotFound);
    }
    event_from_row(&row)
}

/// An event decorated with everything a list or detail view shows.
#[derive(Debug, Clone, Serialize)]
pub struct EventView {
    #[serde(flatten)]
    pub event: Event,
    pub display_status: EventStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_occurrence: Option<NaiveDate>,
}

pub fn event_view(event: Event, now: DateTime<Utc>) -> EventView {
    let display_status = display_status(&event, now);
    let next_occurrence = match (event.is_weekly, event.day_of_week) {
        (true, Some(day_of_week)) => {
            let start = event.start_time_of_day().unwrap_or(chrono::NaiveTime::MIN);
            match next_occurrence(day_of_week, start, now) {
                Ok(date) => Some(date),
                Err(e) => {
                    tracing::error!(event_id = event.id, "skipping next occurrence: {e}");
                    None
                }
            }
        }
        _ => None,
    };
    EventView {
        event,
        display_status,
        next_occurrence,
    }
}
