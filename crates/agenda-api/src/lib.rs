pub mod error;
pub mod extract;
pub mod routes;

use agenda_core::AppState;
use axum::{
    routing::{get, patch, post},
    Router,
};

pub fn build_router() -> Router<AppState> {
    Router::new()
        .route("/health", get(routes::status::health))
        .route("/api/v1/status/preview", post(routes::status::preview))
        .route(
            "/api/v1/tenants/{tenant_id}/events",
            get(routes::events::list_events).post(routes::events::create_event),
        )
        .route(
            "/api/v1/tenants/{tenant_id}/events/{event_id}",
            get(routes::events::get_event)
                .patch(routes::events::update_event)
                .delete(routes::events::delete_event),
        )
        .route(
            "/api/v1/tenants/{tenant_id}/events/{event_id}/instances",
            get(routes::instances::list_instances),
        )
        .route(
            "/api/v1/tenants/{tenant_id}/events/{event_id}/instances/generate",
            post(routes::instances::generate_instances),
        )
        .route(
            "/api/v1/tenants/{tenant_id}/events/{event_id}/instances/{instance_id}",
            patch(routes::instances::update_instance).delete(routes::instances::delete_instance),
        )
}
