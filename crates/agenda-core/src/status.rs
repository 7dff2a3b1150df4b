use agenda_models::{Event, EventStatus, InstanceStatus, PublishWindow};
use chrono::{DateTime, NaiveDate, Utc};

/// Derive the display status of a one-time event from its publish window.
///
/// `now == publish_start_at` resolves to `Live`; the window is half-open.
pub fn compute_status(window: &PublishWindow, now: DateTime<Utc>) -> EventStatus {
    let Some(start) = window.publish_start_at else {
        return EventStatus::Draft;
    };
    if now < start {
        return EventStatus::Scheduled;
    }
    match window.publish_end_at {
        Some(end) if now >= end => EventStatus::Past,
        _ => EventStatus::Live,
    }
}

/// Weekly events are toggled by hand and never become scheduled or past.
pub fn weekly_status(is_live: bool) -> EventStatus {
    if is_live {
        EventStatus::Live
    } else {
        EventStatus::Draft
    }
}

/// Status to show for a stored event. An explicit archive wins over
/// everything else.
pub fn display_status(event: &Event, now: DateTime<Utc>) -> EventStatus {
    if event.status == EventStatus::Archived {
        return EventStatus::Archived;
    }
    if event.is_weekly {
        weekly_status(event.is_live)
    } else {
        compute_status(&event.window, now)
    }
}

/// Read-side view of an instance's status: anything dated before `today`
/// reads as past. The stored value is left as is.
pub fn effective_instance_status(
    instance_date: NaiveDate,
    stored: InstanceStatus,
    today: NaiveDate,
) -> InstanceStatus {
    if instance_date < today {
        InstanceStatus::Past
    } else {
        stored
    }
}
