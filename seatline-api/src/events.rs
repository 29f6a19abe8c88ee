use axum::{
    extract::{Path, State},
    routing::get,
    Json, Router,
};
use chrono::Utc;
use seatline_core::models::{Event, EventDetail, EventWithHost};
use seatline_core::validation::EventDraft;
use seatline_shared::redact_email;
use tracing::info;
use uuid::Uuid;

use crate::error::{internal, AppError, AppJson};
use crate::middleware::CurrentUser;
use crate::state::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/events", get(list_events).post(create_event))
        .route("/api/events/{id}", get(get_event))
}

/// GET /api/events
async fn list_events(State(state): State<AppState>) -> Result<Json<Vec<EventWithHost>>, AppError> {
    let events = state
        .events
        .list_events()
        .await
        .map_err(internal("Failed to fetch events"))?;

    Ok(Json(events))
}

/// POST /api/events
/// The caller becomes the host.
async fn create_event(
    State(state): State<AppState>,
    host: CurrentUser,
    AppJson(draft): AppJson<EventDraft>,
) -> Result<Json<Event>, AppError> {
    let new_event = draft
        .validate_at(Utc::now())
        .map_err(internal("Failed to create event"))?;

    let event = state
        .events
        .create_event(host.id, new_event)
        .await
        .map_err(internal("Failed to create event"))?;

    info!(
        event_id = %event.id,
        host = %redact_email(&host.email),
        capacity = event.capacity,
        "Event created"
    );

    Ok(Json(event))
}

/// GET /api/events/{id}
/// Ids that do not parse are reported the same way as unknown ids.
async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<EventDetail>, AppError> {
    let not_found = || AppError::NotFoundError("Event not found".to_string());

    let id = Uuid::parse_str(&id).map_err(|_| not_found())?;

    let event = state
        .events
        .get_event(id)
        .await
        .map_err(internal("Failed to fetch event"))?
        .ok_or_else(not_found)?;

    Ok(Json(event))
}
