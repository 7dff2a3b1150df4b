//! Drives the router in-process against an in-memory database.

use agenda_core::{AppConfig, AppState};
use axum::{
    body::Body,
    http::{Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

async fn test_app() -> Router {
    let db = agenda_db::create_pool("sqlite::memory:", 1).await.unwrap();
    agenda_db::run_migrations(&db).await.unwrap();
    let state = AppState {
        db,
        config: AppConfig { max_range_days: 366 },
    };
    agenda_api::build_router().with_state(state)
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(json) => {
            builder = builder.header("content-type", "application/json");
            Body::from(json.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn create_weekly(app: &Router, tenant_id: i64, day_of_week: i64) -> i64 {
    let (status, body) = send(
        app,
        Method::POST,
        &format!("/api/v1/tenants/{tenant_id}/events"),
        Some(json!({
            "name": "Monday standup",
            "is_weekly": true,
            "is_live": true,
            "day_of_week": day_of_week,
            "starts_at": "09:00",
            "ends_at": "09:15",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["id"].as_i64().unwrap()
}

#[tokio::test]
async fn health_reports_metrics() {
    let app = test_app().await;
    let (status, body) = send(&app, Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["metrics"]["generation_runs"].is_u64());
}

#[tokio::test]
async fn preview_resolves_window() {
    let app = test_app().await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/status/preview",
        Some(json!({
            "publish_start_at": "2024-06-01T00:00:00Z",
            "publish_end_at": "2024-06-10T00:00:00Z",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "past");

    let (_, body) = send(&app, Method::POST, "/api/v1/status/preview", Some(json!({}))).await;
    assert_eq!(body["status"], "draft");

    let (_, body) = send(
        &app,
        Method::POST,
        "/api/v1/status/preview",
        Some(json!({"publish_start_at": "2999-01-01T00:00:00Z"})),
    )
    .await;
    assert_eq!(body["status"], "scheduled");
}

#[tokio::test]
async fn one_time_event_lifecycle() {
    let app = test_app().await;
    let (status, created) = send(
        &app,
        Method::POST,
        "/api/v1/tenants/1/events",
        Some(json!({
            "name": "  Spring launch  ",
            "publish_start_at": "2024-06-01T00:00:00Z",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(created["name"], "Spring launch");
    assert_eq!(created["display_status"], "live");
    assert_eq!(created["status"], "live");
    assert!(created.get("next_occurrence").is_none());
    let id = created["id"].as_i64().unwrap();

    let (status, updated) = send(
        &app,
        Method::PATCH,
        &format!("/api/v1/tenants/1/events/{id}"),
        Some(json!({"publish_end_at": "2024-06-10T00:00:00Z"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["display_status"], "past");

    let (_, cleared) = send(
        &app,
        Method::PATCH,
        &format!("/api/v1/tenants/1/events/{id}"),
        Some(json!({"publish_end_at": null})),
    )
    .await;
    assert_eq!(cleared["display_status"], "live");
    assert!(cleared["publish_end_at"].is_null());

    let (_, archived) = send(
        &app,
        Method::PATCH,
        &format!("/api/v1/tenants/1/events/{id}"),
        Some(json!({"status": "archived"})),
    )
    .await;
    assert_eq!(archived["display_status"], "archived");

    let (status, list) = send(&app, Method::GET, "/api/v1/tenants/1/events", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(list.as_array().unwrap().len(), 1);

    let (status, _) = send(
        &app,
        Method::DELETE,
        &format!("/api/v1/tenants/1/events/{id}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, body) = send(&app, Method::GET, &format!("/api/v1/tenants/1/events/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "NOT_FOUND");
}

#[tokio::test]
async fn create_rejects_invalid_input() {
    let app = test_app().await;
    let cases = [
        json!({"name": ""}),
        json!({"name": "Yoga", "is_weekly": true}),
        json!({"name": "Yoga", "is_weekly": true, "day_of_week": 7}),
        json!({
            "name": "Launch",
            "publish_start_at": "2024-06-10T00:00:00Z",
            "publish_end_at": "2024-06-01T00:00:00Z",
        }),
        json!({"name": "Launch", "publish_start_at": "June 1st"}),
    ];
    for case in cases {
        let (status, body) =
            send(&app, Method::POST, "/api/v1/tenants/1/events", Some(case.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{case} -> {body}");
        assert_eq!(body["code"], "BAD_REQUEST");
    }
}

#[tokio::test]
async fn weekly_event_shows_next_occurrence() {
    let app = test_app().await;
    let id = create_weekly(&app, 1, 1).await;
    let (status, body) = send(&app, Method::GET, &format!("/api/v1/tenants/1/events/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["display_status"], "live");
    assert_eq!(body["starts_at"], "1970-01-01T09:00:00Z");
    assert!(body["next_occurrence"].is_string());
}

#[tokio::test]
async fn events_are_tenant_scoped() {
    let app = test_app().await;
    let id = create_weekly(&app, 1, 1).await;

    let (status, _) = send(&app, Method::GET, &format!("/api/v1/tenants/2/events/{id}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/api/v1/tenants/2/events/{id}/instances/generate"),
        Some(json!({"startDate": "2024-01-01", "endDate": "2024-01-31"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, list) = send(&app, Method::GET, "/api/v1/tenants/2/events", None).await;
    assert!(list.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn generate_instances_and_skip_existing() {
    let app = test_app().await;
    let id = create_weekly(&app, 1, 1).await;
    let uri = format!("/api/v1/tenants/1/events/{id}/instances/generate");

    let (status, body) = send(
        &app,
        Method::POST,
        &uri,
        Some(json!({"startDate": "2024-01-01", "endDate": "2024-01-31"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"instancesCount": 5, "skipped": 0}));

    let (_, body) = send(
        &app,
        Method::POST,
        &uri,
        Some(json!({"startDate": "2024-01-01", "endDate": "2024-02-29"})),
    )
    .await;
    assert_eq!(body, json!({"instancesCount": 4, "skipped": 5}));

    let (status, list) = send(
        &app,
        Method::GET,
        &format!("/api/v1/tenants/1/events/{id}/instances"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let list = list.as_array().unwrap();
    assert_eq!(list.len(), 9);
    assert_eq!(list[0]["instance_date"], "2024-01-01");
    assert_eq!(list[8]["instance_date"], "2024-02-26");
    // Dates in 2024 are behind the server clock.
    assert!(list.iter().all(|v| v["effective_status"] == "past"));
    assert!(list.iter().all(|v| v["status"] == "draft"));
}

#[tokio::test]
async fn generate_rejects_bad_ranges() {
    let app = test_app().await;
    let id = create_weekly(&app, 1, 1).await;
    let uri = format!("/api/v1/tenants/1/events/{id}/instances/generate");

    let (status, body) = send(
        &app,
        Method::POST,
        &uri,
        Some(json!({"startDate": "2024-01-31", "endDate": "2024-01-01"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_RANGE");

    let (status, body) = send(
        &app,
        Method::POST,
        &uri,
        Some(json!({"startDate": "2024-01-01", "endDate": "2026-01-01"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");

    let (status, _) = send(
        &app,
        Method::POST,
        &uri,
        Some(json!({"startDate": "01/01/2024", "endDate": "2024-01-31"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn generate_rejects_one_time_events() {
    let app = test_app().await;
    let (_, created) = send(
        &app,
        Method::POST,
        "/api/v1/tenants/1/events",
        Some(json!({"name": "Launch"})),
    )
    .await;
    let id = created["id"].as_i64().unwrap();
    let (status, _) = send(
        &app,
        Method::POST,
        &format!("/api/v1/tenants/1/events/{id}/instances/generate"),
        Some(json!({"startDate": "2024-01-01", "endDate": "2024-01-31"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn publish_cancel_and_delete_instance() {
    let app = test_app().await;
    let id = create_weekly(&app, 1, 3).await;
    send(
        &app,
        Method::POST,
        &format!("/api/v1/tenants/1/events/{id}/instances/generate"),
        Some(json!({"startDate": "2999-01-01", "endDate": "2999-01-31"})),
    )
    .await;
    let (_, list) = send(
        &app,
        Method::GET,
        &format!("/api/v1/tenants/1/events/{id}/instances"),
        None,
    )
    .await;
    let instance_id = list[0]["id"].as_i64().unwrap();
    let uri = format!("/api/v1/tenants/1/events/{id}/instances/{instance_id}");

    let (status, body) = send(
        &app,
        Method::PATCH,
        &uri,
        Some(json!({"status": "live", "custom_description": "Guest host"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "live");
    assert_eq!(body["effective_status"], "live");
    assert_eq!(body["custom_description"], "Guest host");

    let (status, body) = send(&app, Method::PATCH, &uri, Some(json!({"status": "cancelled"}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "cancelled");

    let (status, _) = send(&app, Method::PATCH, &uri, Some(json!({"status": "past"}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    let (status, _) = send(&app, Method::DELETE, &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

async fn instance_dates(app: &Router, event_id: i64) -> Vec<String> {
    let (status, list) = send(
        app,
        Method::GET,
        &format!("/api/v1/tenants/1/events/{event_id}/instances"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    list.as_array()
        .unwrap()
        .iter()
        .map(|v| v["instance_date"].as_str().unwrap().to_string())
        .collect()
}

#[tokio::test]
async fn moving_weekday_drops_stale_instances() {
    let app = test_app().await;
    let id = create_weekly(&app, 1, 1).await;
    let generate = format!("/api/v1/tenants/1/events/{id}/instances/generate");
    let range = json!({"startDate": "2999-01-01", "endDate": "2999-01-31"});
    send(&app, Method::POST, &generate, Some(range.clone())).await;
    assert_eq!(
        instance_dates(&app, id).await,
        ["2999-01-07", "2999-01-14", "2999-01-21", "2999-01-28"]
    );

    // Edits that keep the weekday leave instances alone.
    let (status, _) = send(
        &app,
        Method::PATCH,
        &format!("/api/v1/tenants/1/events/{id}"),
        Some(json!({"name": "Team standup"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(instance_dates(&app, id).await.len(), 4);

    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/api/v1/tenants/1/events/{id}"),
        Some(json!({"day_of_week": 3})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["day_of_week"], 3);
    assert!(instance_dates(&app, id).await.is_empty());

    let (_, body) = send(&app, Method::POST, &generate, Some(range)).await;
    assert_eq!(body, json!({"instancesCount": 5, "skipped": 0}));
    assert_eq!(instance_dates(&app, id).await[0], "2999-01-02");
}

#[tokio::test]
async fn leaving_weekly_drops_instances_and_placeholder_times() {
    let app = test_app().await;
    let id = create_weekly(&app, 1, 1).await;
    send(
        &app,
        Method::POST,
        &format!("/api/v1/tenants/1/events/{id}/instances/generate"),
        Some(json!({"startDate": "2999-01-01", "endDate": "2999-01-31"})),
    )
    .await;

    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/api/v1/tenants/1/events/{id}"),
        Some(json!({"is_weekly": false})),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["is_weekly"], false);
    assert!(body["day_of_week"].is_null());
    assert!(body["starts_at"].is_null());
    assert!(body["ends_at"].is_null());
    assert!(instance_dates(&app, id).await.is_empty());

    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/api/v1/tenants/1/events/{id}"),
        Some(json!({"starts_at": "2999-03-01T09:00:00Z"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["starts_at"], "2999-03-01T09:00:00Z");
}

#[tokio::test]
async fn name_length_counts_characters() {
    let app = test_app().await;
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/tenants/1/events",
        Some(json!({"name": "é".repeat(60)})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["name"].as_str().unwrap().chars().count(), 60);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/v1/tenants/1/events",
        Some(json!({"name": "é".repeat(101)})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn malformed_bodies_get_error_json() {
    let app = test_app().await;
    let id = create_weekly(&app, 1, 3).await;
    send(
        &app,
        Method::POST,
        &format!("/api/v1/tenants/1/events/{id}/instances/generate"),
        Some(json!({"startDate": "2999-01-01", "endDate": "2999-01-31"})),
    )
    .await;
    let (_, list) = send(
        &app,
        Method::GET,
        &format!("/api/v1/tenants/1/events/{id}/instances"),
        None,
    )
    .await;
    let instance_id = list[0]["id"].as_i64().unwrap();

    let (status, body) = send(
        &app,
        Method::PATCH,
        &format!("/api/v1/tenants/1/events/{id}/instances/{instance_id}"),
        Some(json!({"status": "bogus"})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");
    assert!(body["message"].is_string());

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/v1/tenants/1/events",
        Some(json!({"is_weekly": true})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "BAD_REQUEST");

    let response = app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/api/v1/status/preview")
                .header("content-type", "application/json")
                .body(Body::from("{not json"))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["code"], "BAD_REQUEST");
}
