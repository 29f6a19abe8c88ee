use axum::{
    extract::State,
    routing::get,
    Json, Router,
};
use seatline_core::models::{Booking, BookingWithEvent};
use serde::Deserialize;
use uuid::Uuid;

use crate::error::{internal, AppError, AppJson};
use crate::middleware::CurrentUser;
use crate::state::AppState;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    pub event_id: String,
    pub quantity: i32,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/api/bookings", get(list_bookings).post(create_booking))
}

/// POST /api/bookings
async fn create_booking(
    State(state): State<AppState>,
    user: CurrentUser,
    AppJson(req): AppJson<CreateBookingRequest>,
) -> Result<Json<Booking>, AppError> {
    let event_id = Uuid::parse_str(&req.event_id)
        .map_err(|_| AppError::NotFoundError("Event not found".to_string()))?;

    let booking = state
        .bookings
        .book(user.id, event_id, req.quantity)
        .await
        .map_err(internal("Failed to create booking"))?;

    Ok(Json(booking))
}

/// GET /api/bookings
/// The caller's bookings, each with its event.
async fn list_bookings(
    State(state): State<AppState>,
    user: CurrentUser,
) -> Result<Json<Vec<BookingWithEvent>>, AppError> {
    let bookings = state
        .booking_repo
        .list_for_user(user.id)
        .await
        .map_err(internal("Failed to fetch bookings"))?;

    Ok(Json(bookings))
}
