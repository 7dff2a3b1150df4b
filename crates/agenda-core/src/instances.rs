use agenda_db::DbPool;
use agenda_models::{Event, EventInstance, InstanceStatus};
use chrono::NaiveDate;
use serde::Serialize;
use std::collections::HashSet;

use crate::error::CoreError;
use crate::observability;
use crate::recurrence::{count_matching_days, generate_instance_dates};
use crate::rows::instance_from_row;
use crate::status::effective_instance_status;
use crate::time::{format_date, parse_date, validate_day_of_week};

/// Outcome of a generate request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GenerationReport {
    /// Rows actually written.
    pub inserted: u64,
    /// Matching dates in the range that already had an instance.
    pub skipped: u64,
}

/// Materialize instances of a weekly event for every matching date in
/// `[start, end]` that does not have one yet. New instances start as drafts.
///
/// Existing dates are read before generation and enforced again by the
/// unique index at insert time; dates lost to a concurrent request are
/// counted as skipped, never reported as errors.
pub async fn generate_for_event(
    pool: &DbPool,
    event: &Event,
    start: NaiveDate,
    end: NaiveDate,
    max_range_days: i64,
) -> Result<GenerationReport, CoreError> {
    if !event.is_weekly {
        return Err(CoreError::BadRequest(
            "only weekly events have instances".into(),
        ));
    }
    let day_of_week = event
        .day_of_week
        .ok_or_else(|| CoreError::BadRequest("weekly event has no day_of_week".into()))?;
    validate_day_of_week(day_of_week)?;
    if end < start {
        return Err(CoreError::InvalidRange);
    }
    if (end - start).num_days() + 1 > max_range_days {
        return Err(CoreError::BadRequest(format!(
            "date range may span at most {max_range_days} days"
        )));
    }

    let existing = agenda_db::event_instances::get_instance_dates(pool, event.id)
        .await?
        .iter()
        .map(|raw| {
            parse_date(raw)
                .map_err(|_| CoreError::Internal(format!("malformed instance_date {raw:?}")))
        })
        .collect::<Result<HashSet<NaiveDate>, CoreError>>()?;

    let fresh = generate_instance_dates(day_of_week, start, end, &existing)?;
    let rows: Vec<String> = fresh.iter().copied().map(format_date).collect();
    let inserted = agenda_db::event_instances::insert_instances(
        pool,
        event.id,
        &rows,
        InstanceStatus::Draft.as_str(),
    )
    .await?;

    let conflicts = (fresh.len() as u64).saturating_sub(inserted);
    if conflicts > 0 {
        tracing::debug!(
            event_id = event.id,
            conflicts,
            "instance dates inserted concurrently, skipped"
        );
    }
    let matching = count_matching_days(day_of_week, start, end) as u64;
    let skipped = matching.saturating_sub(inserted);

    observability::instances_generated(inserted, skipped, conflicts);
    tracing::info!(event_id = event.id, inserted, skipped, "generated event instances");

    Ok(GenerationReport { inserted, skipped })
}

/// Manual state change on a single instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstanceAction {
    Publish,
    Cancel,
}

impl InstanceAction {
    /// Map a requested status to the action that produces it. Only `live`
    /// and `cancelled` can be requested.
    pub fn from_requested(status: InstanceStatus) -> Option<Self> {
        match status {
            InstanceStatus::Live => Some(InstanceAction::Publish),
            InstanceStatus::Cancelled => Some(InstanceAction::Cancel),
            _ => None,
        }
    }

    pub fn target_status(self) -> InstanceStatus {
        match self {
            InstanceAction::Publish => InstanceStatus::Live,
            InstanceAction::Cancel => InstanceStatus::Cancelled,
        }
    }
}

/// Load an instance, hiding instances that belong to another event.
pub async fn load_instance(
    pool: &DbPool,
    event_id: i64,
    instance_id: i64,
) -> Result<EventInstance, CoreError> {
    let row = agenda_db::event_instances::get_instance(pool, instance_id)
        .await?
        .ok_or(CoreError::NotFound)?;
    if row.event_id != event_id {
        return Err(CoreError::NotFound);
    }
    instance_from_row(&row)
}

pub async fn apply_instance_action(
    pool: &DbPool,
    event_id: i64,
    instance_id: i64,
    action: InstanceAction,
    custom_description: Option<&str>,
) -> Result<EventInstance, CoreError> {
    load_instance(pool, event_id, instance_id).await?;
    let row = agenda_db::event_instances::update_instance(
        pool,
        instance_id,
        action.target_status().as_str(),
        custom_description,
    )
    .await?;
    tracing::info!(event_id, instance_id, status = %action.target_status(), "instance status changed");
    instance_from_row(&row)
}

pub async fn delete_instance(
    pool: &DbPool,
    event_id: i64,
    instance_id: i64,
) -> Result<(), CoreError> {
    load_instance(pool, event_id, instance_id).await?;
    agenda_db::event_instances::delete_instance(pool, instance_id).await?;
    Ok(())
}

/// An instance paired with the status it reads as on a given day.
#[derive(Debug, Clone, Serialize)]
pub struct InstanceView {
    #[serde(flatten)]
    pub instance: EventInstance,
    pub effective_status: InstanceStatus,
}

pub fn instance_view(instance: EventInstance, today: NaiveDate) -> InstanceView {
    let effective_status =
        effective_instance_status(instance.instance_date, instance.status, today);
    InstanceView {
        instance,
        effective_status,
    }
}

/// All instances of an event, ascending by date.
pub async fn list_instances(
    pool: &DbPool,
    event_id: i64,
    today: NaiveDate,
) -> Result<Vec<InstanceView>, CoreError> {
    agenda_db::event_instances::get_event_instances(pool, event_id)
        .await?
        .iter()
        .map(|row| instance_from_row(row).map(|instance| instance_view(instance, today)))
        .collect()
}
