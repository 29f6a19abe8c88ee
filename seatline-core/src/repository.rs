use async_trait::async_trait;
use uuid::Uuid;

use crate::models::{Booking, BookingWithEvent, Event, EventDetail, EventWithHost, NewEvent, NewUser, User};
use crate::CoreResult;

/// Repository trait for user accounts
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Fails with [`crate::CoreError::EmailTaken`] when the e-mail is already registered.
    async fn create_user(&self, user: NewUser) -> CoreResult<User>;

    async fn find_by_email(&self, email: &str) -> CoreResult<Option<User>>;

    async fn find_by_id(&self, id: Uuid) -> CoreResult<Option<User>>;
}

/// Repository trait for hosted events
#[async_trait]
pub trait EventRepository: Send + Sync {
    async fn create_event(&self, host_id: Uuid, event: NewEvent) -> CoreResult<Event>;

    /// All events with host contact details, earliest date first.
    async fn list_events(&self) -> CoreResult<Vec<EventWithHost>>;

    async fn get_event(&self, id: Uuid) -> CoreResult<Option<EventDetail>>;
}

/// Repository trait for seat bookings
#[async_trait]
pub trait BookingRepository: Send + Sync {
    /// Reads the event's booked total, applies
    /// [`crate::availability::ensure_seats_available`] and inserts a confirmed
    /// booking, all as one atomic unit. Concurrent calls for the same event
    /// must not both observe the same total.
    async fn reserve_seats(&self, user_id: Uuid, event_id: Uuid, quantity: i32) -> CoreResult<Booking>;

    async fn list_for_user(&self, user_id: Uuid) -> CoreResult<Vec<BookingWithEvent>>;
}
