use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

use crate::models::Booking;
use crate::repository::BookingRepository;
use crate::{CoreError, CoreResult};

/// Seat counts for one event at a point in time.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeatAvailability {
    pub capacity: i64,
    pub booked: i64,
    pub available: i64,
}

impl SeatAvailability {
    pub fn new(capacity: i32, booked: i64) -> Self {
        let capacity = i64::from(capacity);
        Self {
            capacity,
            booked,
            available: (capacity - booked).max(0),
        }
    }
}

pub fn ensure_quantity(quantity: i32) -> CoreResult<()> {
    if quantity < 1 {
        return Err(CoreError::ValidationError(
            "Quantity must be a positive integer".to_string(),
        ));
    }
    Ok(())
}

/// Rejects the request when `taken + requested` would exceed `capacity`.
///
/// Repositories call this inside the same atomic unit that inserts the booking,
/// so the total it checks is the total the insert lands on.
pub fn ensure_seats_available(capacity: i32, taken: i64, requested: i32) -> CoreResult<()> {
    let seats = SeatAvailability::new(capacity, taken);
    if taken + i64::from(requested) > seats.capacity {
        return Err(CoreError::InsufficientSeats {
            requested: i64::from(requested),
            available: seats.available,
        });
    }
    Ok(())
}

/// Entry point for seat reservations.
#[derive(Clone)]
pub struct BookingService {
    bookings: Arc<dyn BookingRepository>,
}

impl BookingService {
    pub fn new(bookings: Arc<dyn BookingRepository>) -> Self {
        Self { bookings }
    }

    pub async fn book(&self, user_id: Uuid, event_id: Uuid, quantity: i32) -> CoreResult<Booking> {
        ensure_quantity(quantity)?;

        match self.bookings.reserve_seats(user_id, event_id, quantity).await {
            Ok(booking) => {
                info!(
                    booking_id = %booking.id,
                    event_id = %event_id,
                    quantity,
                    "Booking confirmed"
                );
                Ok(booking)
            }
            Err(CoreError::InsufficientSeats { requested, available }) => {
                warn!(event_id = %event_id, requested, available, "Booking rejected: not enough seats");
                Err(CoreError::InsufficientSeats { requested, available })
            }
            Err(e) => Err(e),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{BookingStatus, BookingWithEvent};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use tokio::sync::Mutex;

    /// Capacity per event plus the quantities booked so far.
    struct FakeBookings {
        events: Mutex<HashMap<Uuid, (i32, Vec<i32>)>>,
    }

    impl FakeBookings {
        fn with_event(event_id: Uuid, capacity: i32) -> Self {
            let mut events = HashMap::new();
            events.insert(event_id, (capacity, Vec::new()));
            Self {
                events: Mutex::new(events),
            }
        }

        async fn total(&self, event_id: Uuid) -> i32 {
            self.events.lock().await[&event_id].1.iter().sum()
        }
    }

    #[async_trait]
    impl BookingRepository for FakeBookings {
        async fn reserve_seats(&self, user_id: Uuid, event_id: Uuid, quantity: i32) -> CoreResult<Booking> {
            let mut events = self.events.lock().await;
            let (capacity, taken) = events.get_mut(&event_id).ok_or(CoreError::NotFound("Event"))?;
            let total: i64 = taken.iter().map(|q| i64::from(*q)).sum();
            ensure_seats_available(*capacity, total, quantity)?;
            taken.push(quantity);
            Ok(Booking::confirmed(event_id, user_id, quantity))
        }

        async fn list_for_user(&self, _user_id: Uuid) -> CoreResult<Vec<BookingWithEvent>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn test_guard_accepts_exact_fill() {
        assert!(ensure_seats_available(5, 0, 5).is_ok());
        assert!(ensure_seats_available(5, 4, 1).is_ok());
    }

    #[test]
    fn test_guard_rejects_overflow() {
        match ensure_seats_available(5, 5, 1) {
            Err(CoreError::InsufficientSeats { requested, available }) => {
                assert_eq!(requested, 1);
                assert_eq!(available, 0);
            }
            other => panic!("expected InsufficientSeats, got {:?}", other),
        }
    }

    #[test]
    fn test_guard_handles_large_totals() {
        assert!(ensure_seats_available(i32::MAX, i64::from(i32::MAX), 1).is_err());
        assert!(ensure_seats_available(i32::MAX, 0, i32::MAX).is_ok());
    }

    #[test]
    fn test_availability_never_negative() {
        let seats = SeatAvailability::new(3, 7);
        assert_eq!(seats.available, 0);
    }

    #[test]
    fn test_quantity_must_be_positive() {
        assert!(ensure_quantity(1).is_ok());
        assert!(matches!(ensure_quantity(0), Err(CoreError::ValidationError(_))));
        assert!(matches!(ensure_quantity(-3), Err(CoreError::ValidationError(_))));
    }

    #[tokio::test]
    async fn test_full_then_rejected_scenario() {
        let event_id = Uuid::new_v4();
        let repo = Arc::new(FakeBookings::with_event(event_id, 5));
        let service = BookingService::new(repo.clone());
        let user = Uuid::new_v4();

        let booking = service.book(user, event_id, 5).await.unwrap();
        assert_eq!(booking.status, BookingStatus::Confirmed);
        assert_eq!(repo.total(event_id).await, 5);

        let rejected = service.book(user, event_id, 1).await;
        assert!(matches!(rejected, Err(CoreError::InsufficientSeats { .. })));
        assert_eq!(repo.total(event_id).await, 5);
    }

    #[tokio::test]
    async fn test_unknown_event_is_not_found() {
        let repo = Arc::new(FakeBookings::with_event(Uuid::new_v4(), 5));
        let service = BookingService::new(repo);

        let result = service.book(Uuid::new_v4(), Uuid::new_v4(), 1).await;
        assert!(matches!(result, Err(CoreError::NotFound("Event"))));
    }

    #[tokio::test]
    async fn test_invalid_quantity_never_reaches_repository() {
        let event_id = Uuid::new_v4();
        let repo = Arc::new(FakeBookings::with_event(event_id, 5));
        let service = BookingService::new(repo.clone());

        let result = service.book(Uuid::new_v4(), event_id, 0).await;
        assert!(matches!(result, Err(CoreError::ValidationError(_))));
        assert_eq!(repo.total(event_id).await, 0);
    }
}
