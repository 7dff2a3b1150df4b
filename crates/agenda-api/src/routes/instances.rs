use agenda_core::events::load_tenant_event;
use agenda_core::instances::{self, instance_view, InstanceAction, InstanceView};
use agenda_core::time::parse_date;
use agenda_core::AppState;
use agenda_models::InstanceStatus;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::error::ApiError;
use crate::extract::JsonBody;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateInstancesRequest {
    pub start_date: String,
    pub end_date: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerateInstancesResponse {
    pub instances_count: u64,
    pub skipped: u64,
}

#[derive(Deserialize)]
pub struct UpdateInstanceRequest {
    pub status: InstanceStatus,
    pub custom_description: Option<String>,
}

pub async fn generate_instances(
    State(state): State<AppState>,
    Path((tenant_id, event_id)): Path<(i64, i64)>,
    JsonBody(body): JsonBody<GenerateInstancesRequest>,
) -> Result<Json<GenerateInstancesResponse>, ApiError> {
    let event = load_tenant_event(&state.db, tenant_id, event_id).await?;
    let start = parse_date(&body.start_date)?;
    let end = parse_date(&body.end_date)?;

    let report = instances::generate_for_event(
        &state.db,
        &event,
        start,
        end,
        state.config.max_range_days,
    )
    .await?;

    Ok(Json(GenerateInstancesResponse {
        instances_count: report.inserted,
        skipped: report.skipped,
    }))
}

pub async fn list_instances(
    State(state): State<AppState>,
    Path((tenant_id, event_id)): Path<(i64, i64)>,
) -> Result<Json<Vec<InstanceView>>, ApiError> {
    load_tenant_event(&state.db, tenant_id, event_id).await?;
    let today = Utc::now().date_naive();
    let views = instances::list_instances(&state.db, event_id, today).await?;
    Ok(Json(views))
}

pub async fn update_instance(
    State(state): State<AppState>,
    Path((tenant_id, event_id, instance_id)): Path<(i64, i64, i64)>,
    JsonBody(body): JsonBody<UpdateInstanceRequest>,
) -> Result<Json<InstanceView>, ApiError> {
    load_tenant_event(&state.db, tenant_id, event_id).await?;
    let action = InstanceAction::from_requested(body.status).ok_or_else(|| {
        ApiError::BadRequest("status must be \"live\" or \"cancelled\"".into())
    })?;

    let instance = instances::apply_instance_action(
        &state.db,
        event_id,
        instance_id,
        action,
        body.custom_description.as_deref(),
    )
    .await?;
    Ok(Json(instance_view(instance, Utc::now().date_naive())))
}

pub async fn delete_instance(
    State(state): State<AppState>,
    Path((tenant_id, event_id, instance_id)): Path<(i64, i64, i64)>,
) -> Result<StatusCode, ApiError> {
    load_tenant_event(&state.db, tenant_id, event_id).await?;
    instances::delete_instance(&state.db, event_id, instance_id).await?;

    tracing::info!(tenant_id, event_id, instance_id, "instance deleted");
    Ok(StatusCode::NO_CONTENT)
}
