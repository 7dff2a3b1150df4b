use agenda_core::events::{event_view, load_tenant_event, EventView};
use agenda_core::rows::event_from_row;
use agenda_core::status::{compute_status, weekly_status};
use agenda_core::time::{format_timestamp, parse_time_of_day, parse_timestamp, weekly_timestamp};
use agenda_core::AppState;
use agenda_db::events::EventFields;
use agenda_models::{Event, EventStatus, PublishWindow};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

use crate::error::ApiError;
use crate::extract::JsonBody;

const MAX_EVENT_NAME_LEN: usize = 100;
const MAX_EVENT_DESCRIPTION_LEN: usize = 1000;

fn contains_dangerous_markup(value: &str) -> bool {
    let lower = value.to_ascii_lowercase();
    lower.contains("<script")
        || lower.contains("javascript:")
        || lower.contains("onerror=")
        || lower.contains("onload=")
        || lower.contains("<iframe")
}

/// Keeps an explicit `null` apart from an absent field in PATCH bodies.
fn deserialize_some<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    T::deserialize(deserializer).map(Some)
}

#[derive(Deserialize)]
pub struct CreateEventRequest {
    pub name: String,
    pub description: Option<String>,
    /// Only `archived` is honoured; every other status is derived.
    pub status: Option<EventStatus>,
    pub publish_start_at: Option<String>,
    pub publish_end_at: Option<String>,
    #[serde(default)]
    pub is_weekly: bool,
    #[serde(default)]
    pub is_live: bool,
    pub day_of_week: Option<i64>,
    pub starts_at: Option<String>,
    pub ends_at: Option<String>,
}

#[derive(Deserialize)]
pub struct UpdateEventRequest {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub description: Option<Option<String>>,
    pub status: Option<EventStatus>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub publish_start_at: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub publish_end_at: Option<Option<String>>,
    pub is_weekly: Option<bool>,
    pub is_live: Option<bool>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub day_of_week: Option<Option<i64>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub starts_at: Option<Option<String>>,
    #[serde(default, deserialize_with = "deserialize_some")]
    pub ends_at: Option<Option<String>>,
}

/// Weekly events accept a bare time of day; everything else needs a full
/// RFC 3339 timestamp.
fn parse_event_time(
    field: &str,
    raw: Option<&str>,
    is_weekly: bool,
) -> Result<Option<DateTime<Utc>>, ApiError> {
    let Some(raw) = raw else {
        return Ok(None);
    };
    if let Ok(ts) = parse_timestamp(raw) {
        return Ok(Some(ts));
    }
    if is_weekly {
        if let Ok(time) = parse_time_of_day(raw) {
            return Ok(Some(weekly_timestamp(time)));
        }
        return Err(ApiError::BadRequest(format!(
            "{field} must be HH:MM or an RFC 3339 timestamp"
        )));
    }
    Err(ApiError::BadRequest(format!(
        "{field} must be an RFC 3339 timestamp"
    )))
}

fn parse_window_time(field: &str, raw: Option<&str>) -> Result<Option<DateTime<Utc>>, ApiError> {
    raw.map(|value| {
        parse_timestamp(value)
            .map_err(|_| ApiError::BadRequest(format!("{field} must be an RFC 3339 timestamp")))
    })
    .transpose()
}

/// Fully merged event values, ready to validate and store.
struct EventDraft {
    name: String,
    description: Option<String>,
    archived: bool,
    window: PublishWindow,
    is_weekly: bool,
    is_live: bool,
    day_of_week: Option<i64>,
    starts_at: Option<DateTime<Utc>>,
    ends_at: Option<DateTime<Utc>>,
}

impl EventDraft {
    fn from_request(body: CreateEventRequest) -> Result<Self, ApiError> {
        Ok(Self {
            name: body.name,
            description: body.description,
            archived: body.status == Some(EventStatus::Archived),
            window: PublishWindow::new(
                parse_window_time("publish_start_at", body.publish_start_at.as_deref())?,
                parse_window_time("publish_end_at", body.publish_end_at.as_deref())?,
            ),
            is_weekly: body.is_weekly,
            is_live: body.is_live,
            day_of_week: body.day_of_week,
            starts_at: parse_event_time("starts_at", body.starts_at.as_deref(), body.is_weekly)?,
            ends_at: parse_event_time("ends_at", body.ends_at.as_deref(), body.is_weekly)?,
        })
    }

    fn from_event(event: &Event) -> Self {
        Self {
            name: event.name.clone(),
            description: event.description.clone(),
            archived: event.status == EventStatus::Archived,
            window: event.window,
            is_weekly: event.is_weekly,
            is_live: event.is_live,
            day_of_week: event.day_of_week,
            starts_at: event.starts_at,
            ends_at: event.ends_at,
        }
    }

    fn apply(&mut self, patch: UpdateEventRequest) -> Result<(), ApiError> {
        if let Some(is_weekly) = patch.is_weekly {
            if self.is_weekly && !is_weekly {
                // Weekly times sit on a placeholder date; a one-time event
                // needs real timestamps from this request or none at all.
                self.starts_at = None;
                self.ends_at = None;
            }
            self.is_weekly = is_weekly;
        }
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(status) = patch.status {
            self.archived = status == EventStatus::Archived;
        }
        if let Some(raw) = patch.publish_start_at {
            self.window.publish_start_at = parse_window_time("publish_start_at", raw.as_deref())?;
        }
        if let Some(raw) = patch.publish_end_at {
            self.window.publish_end_at = parse_window_time("publish_end_at", raw.as_deref())?;
        }
        if let Some(is_live) = patch.is_live {
            self.is_live = is_live;
        }
        if let Some(day_of_week) = patch.day_of_week {
            self.day_of_week = day_of_week;
        }
        if let Some(raw) = patch.starts_at {
            self.starts_at = parse_event_time("starts_at", raw.as_deref(), self.is_weekly)?;
        }
        if let Some(raw) = patch.ends_at {
            self.ends_at = parse_event_time("ends_at", raw.as_deref(), self.is_weekly)?;
        }
        Ok(())
    }

    fn validate(&mut self) -> Result<(), ApiError> {
        self.name = self.name.trim().to_string();
        if self.name.is_empty() || self.name.chars().count() > MAX_EVENT_NAME_LEN {
            return Err(ApiError::BadRequest(
                "Event name must be 1-100 characters".into(),
            ));
        }
        if contains_dangerous_markup(&self.name) {
            return Err(ApiError::BadRequest(
                "Event name contains unsafe markup".into(),
            ));
        }
        if let Some(ref desc) = self.description {
            if desc.chars().count() > MAX_EVENT_DESCRIPTION_LEN {
                return Err(ApiError::BadRequest("Description too long".into()));
            }
            if contains_dangerous_markup(desc) {
                return Err(ApiError::BadRequest(
                    "Description contains unsafe markup".into(),
                ));
            }
        }
        if self.window.is_inverted() {
            return Err(ApiError::BadRequest(
                "publish_end_at must not precede publish_start_at".into(),
            ));
        }
        if let Some(day) = self.day_of_week {
            if !(0..=6).contains(&day) {
                return Err(ApiError::BadRequest(
                    "day_of_week must be between 0 (Sunday) and 6 (Saturday)".into(),
                ));
            }
        }

        if self.is_weekly {
            if self.day_of_week.is_none() {
                return Err(ApiError::BadRequest(
                    "Weekly events require day_of_week".into(),
                ));
            }
            // Weekly rows keep only the time of day.
            self.starts_at = self.starts_at.map(|ts| weekly_timestamp(ts.time()));
            self.ends_at = self.ends_at.map(|ts| weekly_timestamp(ts.time()));
        } else {
            self.day_of_week = None;
            if let (Some(start), Some(end)) = (self.starts_at, self.ends_at) {
                if end < start {
                    return Err(ApiError::BadRequest(
                        "ends_at must not precede starts_at".into(),
                    ));
                }
            }
        }
        Ok(())
    }

    /// Status cached on the row, resolved against the server clock.
    fn stored_status(&self, now: DateTime<Utc>) -> EventStatus {
        if self.archived {
            EventStatus::Archived
        } else if self.is_weekly {
            weekly_status(self.is_live)
        } else {
            compute_status(&self.window, now)
        }
    }

    /// Persist the draft. Returns the stored event and how many instances
    /// were dropped because they no longer match it.
    async fn save(
        &self,
        state: &AppState,
        tenant_id: i64,
        existing_id: Option<i64>,
    ) -> Result<(Event, u64), ApiError> {
        let status = self.stored_status(Utc::now());
        let publish_start_at = self.window.publish_start_at.map(format_timestamp);
        let publish_end_at = self.window.publish_end_at.map(format_timestamp);
        let starts_at = self.starts_at.map(format_timestamp);
        let ends_at = self.ends_at.map(format_timestamp);

        let fields = EventFields {
            name: &self.name,
            description: self.description.as_deref(),
            status: status.as_str(),
            publish_start_at: publish_start_at.as_deref(),
            publish_end_at: publish_end_at.as_deref(),
            is_weekly: self.is_weekly,
            is_live: self.is_live,
            day_of_week: self.day_of_week,
            starts_at: starts_at.as_deref(),
            ends_at: ends_at.as_deref(),
        };

        let (row, pruned) = match existing_id {
            Some(id) => {
                let update = agenda_db::events::update_event(&state.db, id, &fields).await?;
                (update.row, update.pruned_instances)
            }
            None => (
                agenda_db::events::create_event(&state.db, tenant_id, &fields).await?,
                0,
            ),
        };
        Ok((event_from_row(&row)?, pruned))
    }
}

pub async fn create_event(
    State(state): State<AppState>,
    Path(tenant_id): Path<i64>,
    JsonBody(body): JsonBody<CreateEventRequest>,
) -> Result<(StatusCode, Json<EventView>), ApiError> {
    let mut draft = EventDraft::from_request(body)?;
    draft.validate()?;
    let (event, _) = draft.save(&state, tenant_id, None).await?;

    tracing::info!(tenant_id, event_id = event.id, weekly = event.is_weekly, "event created");
    Ok((StatusCode::CREATED, Json(event_view(event, Utc::now()))))
}

pub async fn list_events(
    State(state): State<AppState>,
    Path(tenant_id): Path<i64>,
) -> Result<Json<Vec<EventView>>, ApiError> {
    let rows = agenda_db::events::get_tenant_events(&state.db, tenant_id).await?;
    let now = Utc::now();

    let mut result = Vec::with_capacity(rows.len());
    for row in &rows {
        result.push(event_view(event_from_row(row)?, now));
    }
    Ok(Json(result))
}

pub async fn get_event(
    State(state): State<AppState>,
    Path((tenant_id, event_id)): Path<(i64, i64)>,
) -> Result<Json<EventView>, ApiError> {
    let event = load_tenant_event(&state.db, tenant_id, event_id).await?;
    Ok(Json(event_view(event, Utc::now())))
}

pub async fn update_event(
    State(state): State<AppState>,
    Path((tenant_id, event_id)): Path<(i64, i64)>,
    JsonBody(body): JsonBody<UpdateEventRequest>,
) -> Result<Json<EventView>, ApiError> {
    let existing = load_tenant_event(&state.db, tenant_id, event_id).await?;

    let mut draft = EventDraft::from_event(&existing);
    draft.apply(body)?;
    draft.validate()?;
    let (event, pruned_instances) = draft.save(&state, tenant_id, Some(event_id)).await?;

    if pruned_instances > 0 {
        tracing::info!(
            tenant_id,
            event_id,
            pruned_instances,
            "removed instances that no longer match the event"
        );
    }
    tracing::info!(tenant_id, event_id, status = %event.status, "event updated");
    Ok(Json(event_view(event, Utc::now())))
}

pub async fn delete_event(
    State(state): State<AppState>,
    Path((tenant_id, event_id)): Path<(i64, i64)>,
) -> Result<StatusCode, ApiError> {
    load_tenant_event(&state.db, tenant_id, event_id).await?;
    agenda_db::events::delete_event(&state.db, event_id).await?;

    tracing::info!(tenant_id, event_id, "event deleted");
    Ok(StatusCode::NO_CONTENT)
}
