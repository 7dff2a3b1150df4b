//! Conversion from stored rows to domain models. Values that fail to parse
//! here were written by something other than this service and are reported
//! as internal errors.

use agenda_db::event_instances::EventInstanceRow;
use agenda_db::events::EventRow;
use agenda_models::{Event, EventInstance, EventStatus, InstanceStatus, PublishWindow};
use chrono::{DateTime, Utc};

use crate::error::CoreError;
use crate::time::{parse_date, parse_timestamp};

fn stored_timestamp(
    column: &str,
    raw: Option<&str>,
) -> Result<Option<DateTime<Utc>>, CoreError> {
    raw.map(|value| {
        parse_timestamp(value)
            .map_err(|_| CoreError::Internal(format!("malformed {column} value {value:?}")))
    })
    .transpose()
}

pub fn event_from_row(row: &EventRow) -> Result<Event, CoreError> {
    let status = EventStatus::parse(&row.status)
        .ok_or_else(|| CoreError::Internal(format!("unknown event status {:?}", row.status)))?;

    Ok(Event {
        id: row.id,
        tenant_id: row.tenant_id,
        name: row.name.clone(),
        description: row.description.clone(),
        status,
        window: PublishWindow::new(
            stored_timestamp("publish_start_at", row.publish_start_at.as_deref())?,
            stored_timestamp("publish_end_at", row.publish_end_at.as_deref())?,
        ),
        is_weekly: row.is_weekly,
        is_live: row.is_live,
        day_of_week: row.day_of_week,
        starts_at: stored_timestamp("starts_at", row.starts_at.as_deref())?,
        ends_at: stored_timestamp("ends_at", row.ends_at.as_deref())?,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

pub fn instance_from_row(row: &EventInstanceRow) -> Result<EventInstance, CoreError> {
    let status = InstanceStatus::parse(&row.status)
        .ok_or_else(|| CoreError::Internal(format!("unknown instance status {:?}", row.status)))?;
    let instance_date = parse_date(&row.instance_date).map_err(|_| {
        CoreError::Internal(format!("malformed instance_date {:?}", row.instance_date))
    })?;

    Ok(EventInstance {
        id: row.id,
        event_id: row.event_id,
        instance_date,
        status,
        custom_description: row.custom_description.clone(),
        created_at: row.created_at,
    })
}
