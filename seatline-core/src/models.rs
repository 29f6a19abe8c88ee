use chrono::{DateTime, Utc};
use seatline_shared::Masked;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

// ============================================================================
// Users
// ============================================================================

/// A registered account. Never serialized directly; see [`PublicUser`].
#[derive(Debug, Clone)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub password_hash: Masked<String>,
    pub created_at: DateTime<Utc>,
}

impl User {
    pub fn public(&self) -> PublicUser {
        PublicUser {
            id: self.id,
            name: self.name.clone(),
            email: self.email.clone(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password_hash: Masked<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PublicUser {
    pub id: Uuid,
    pub name: String,
    pub email: String,
}

// ============================================================================
// Events
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: Uuid,
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub location: String,
    pub capacity: i32,
    pub price: f64,
    pub image: Option<String>,
    pub host_id: Uuid,
    pub created_at: DateTime<Utc>,
}

/// A validated event ready to be persisted. Produced by
/// [`crate::validation::EventDraft::validate_at`].
#[derive(Debug, Clone, PartialEq)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub location: String,
    pub capacity: i32,
    pub price: f64,
    pub image: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostContact {
    pub name: String,
    pub email: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HostName {
    pub name: String,
}

/// Listing row: the event plus its host's name and e-mail.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventWithHost {
    #[serde(flatten)]
    pub event: Event,
    pub host: HostContact,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookingQuantity {
    pub quantity: i32,
}

/// Detail view: the event, its host's name, and the quantity of every booking.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EventDetail {
    #[serde(flatten)]
    pub event: Event,
    pub host: HostName,
    pub bookings: Vec<BookingQuantity>,
    pub available_seats: i64,
}

impl EventDetail {
    pub fn new(event: Event, host: HostName, bookings: Vec<BookingQuantity>) -> Self {
        let booked = bookings.iter().map(|b| i64::from(b.quantity)).sum();
        let available_seats = crate::SeatAvailability::new(event.capacity, booked).available;
        Self {
            event,
            host,
            bookings,
            available_seats,
        }
    }
}

// ============================================================================
// Bookings
// ============================================================================

/// Booking status. Every booking is created `CONFIRMED`; no flow moves it elsewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingStatus {
    Confirmed,
}

impl BookingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            BookingStatus::Confirmed => "CONFIRMED",
        }
    }
}

impl fmt::Display for BookingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BookingStatus {
    type Err = crate::CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CONFIRMED" => Ok(BookingStatus::Confirmed),
            other => Err(crate::CoreError::StorageError(format!(
                "unknown booking status: {}",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Booking {
    pub id: Uuid,
    pub event_id: Uuid,
    pub user_id: Uuid,
    pub quantity: i32,
    pub status: BookingStatus,
    pub created_at: DateTime<Utc>,
}

impl Booking {
    pub fn confirmed(event_id: Uuid, user_id: Uuid, quantity: i32) -> Self {
        Self {
            id: Uuid::new_v4(),
            event_id,
            user_id,
            quantity,
            status: BookingStatus::Confirmed,
            created_at: Utc::now(),
        }
    }
}

/// A user's booking together with the event it reserves seats for.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BookingWithEvent {
    #[serde(flatten)]
    pub booking: Booking,
    pub event: Event,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_event(capacity: i32) -> Event {
        Event {
            id: Uuid::new_v4(),
            title: "Rust Meetup".to_string(),
            description: "Monthly gathering of local Rustaceans".to_string(),
            date: Utc::now(),
            location: "Oslo".to_string(),
            capacity,
            price: 0.0,
            image: None,
            host_id: Uuid::new_v4(),
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_booking_serializes_camel_case() {
        let booking = Booking::confirmed(Uuid::new_v4(), Uuid::new_v4(), 2);
        let json = serde_json::to_value(&booking).unwrap();
        assert_eq!(json["status"], "CONFIRMED");
        assert_eq!(json["quantity"], 2);
        assert!(json.get("eventId").is_some());
        assert!(json.get("userId").is_some());
    }

    #[test]
    fn test_event_detail_counts_available_seats() {
        let detail = EventDetail::new(
            sample_event(10),
            HostName { name: "Ada".to_string() },
            vec![BookingQuantity { quantity: 3 }, BookingQuantity { quantity: 4 }],
        );
        assert_eq!(detail.available_seats, 3);

        let json = serde_json::to_value(&detail).unwrap();
        assert_eq!(json["availableSeats"], 3);
        assert_eq!(json["host"]["name"], "Ada");
        assert_eq!(json["capacity"], 10);
    }

    #[test]
    fn test_booking_status_parse() {
        assert_eq!("CONFIRMED".parse::<BookingStatus>().unwrap(), BookingStatus::Confirmed);
        assert!("PENDING".parse::<BookingStatus>().is_err());
    }
}
