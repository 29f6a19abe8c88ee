use async_trait::async_trait;
use chrono::Utc;
use std::collections::HashMap;
use tokio::sync::RwLock;
use uuid::Uuid;

use seatline_core::availability::ensure_seats_available;
use seatline_core::models::{
    Booking, BookingQuantity, BookingWithEvent, Event, EventDetail, EventWithHost, HostContact,
    HostName, NewEvent, NewUser, User,
};
use seatline_core::repository::{BookingRepository, EventRepository, UserRepository};
use seatline_core::{CoreError, CoreResult};

#[derive(Default)]
struct Tables {
    users: HashMap<Uuid, User>,
    events: HashMap<Uuid, Event>,
    /// Insertion order doubles as creation order.
    bookings: Vec<Booking>,
}

impl Tables {
    fn host(&self, host_id: Uuid) -> CoreResult<&User> {
        self.users
            .get(&host_id)
            .ok_or_else(|| CoreError::StorageError(format!("event host {} missing", host_id)))
    }
}

/// Process-local store implementing every repository trait.
///
/// A single lock covers all tables, so `reserve_seats` checks and inserts
/// under one write guard. Used for tests and when no database URL is
/// configured.
#[derive(Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl UserRepository for MemoryStore {
    async fn create_user(&self, user: NewUser) -> CoreResult<User> {
        let mut tables = self.tables.write().await;
        if tables.users.values().any(|u| u.email == user.email) {
            return Err(CoreError::EmailTaken);
        }

        let created = User {
            id: Uuid::new_v4(),
            name: user.name,
            email: user.email,
            password_hash: user.password_hash,
            created_at: Utc::now(),
        };
        tables.users.insert(created.id, created.clone());
        Ok(created)
    }

    async fn find_by_email(&self, email: &str) -> CoreResult<Option<User>> {
        let tables = self.tables.read().await;
        Ok(tables.users.values().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: Uuid) -> CoreResult<Option<User>> {
        Ok(self.tables.read().await.users.get(&id).cloned())
    }
}

#[async_trait]
impl EventRepository for MemoryStore {
    async fn create_event(&self, host_id: Uuid, event: NewEvent) -> CoreResult<Event> {
        let mut tables = self.tables.write().await;
        tables.host(host_id)?;

        let created = Event {
            id: Uuid::new_v4(),
            title: event.title,
            description: event.description,
            date: event.date,
            location: event.location,
            capacity: event.capacity,
            price: event.price,
            image: event.image,
            host_id,
            created_at: Utc::now(),
        };
        tables.events.insert(created.id, created.clone());
        Ok(created)
    }

    async fn list_events(&self) -> CoreResult<Vec<EventWithHost>> {
        let tables = self.tables.read().await;

        let mut events: Vec<&Event> = tables.events.values().collect();
        events.sort_by(|a, b| a.date.cmp(&b.date).then(a.created_at.cmp(&b.created_at)));

        events
            .into_iter()
            .map(|event| {
                let host = tables.host(event.host_id)?;
                Ok(EventWithHost {
                    event: event.clone(),
                    host: HostContact {
                        name: host.name.clone(),
                        email: host.email.clone(),
                    },
                })
            })
            .collect()
    }

    async fn get_event(&self, id: Uuid) -> CoreResult<Option<EventDetail>> {
        let tables = self.tables.read().await;
        let Some(event) = tables.events.get(&id) else {
            return Ok(None);
        };

        let host = tables.host(event.host_id)?;
        let bookings = tables
            .bookings
            .iter()
            .filter(|b| b.event_id == id)
            .map(|b| BookingQuantity { quantity: b.quantity })
            .collect();

        Ok(Some(EventDetail::new(
            event.clone(),
            HostName { name: host.name.clone() },
            bookings,
        )))
    }
}

#[async_trait]
impl BookingRepository for MemoryStore {
    async fn reserve_seats(&self, user_id: Uuid, event_id: Uuid, quantity: i32) -> CoreResult<Booking> {
        let mut tables = self.tables.write().await;
        if !tables.users.contains_key(&user_id) {
            return Err(CoreError::StorageError(format!("booking user {} missing", user_id)));
        }

        let capacity = tables
            .events
            .get(&event_id)
            .map(|e| e.capacity)
            .ok_or(CoreError::NotFound("Event"))?;

        let taken: i64 = tables
            .bookings
            .iter()
            .filter(|b| b.event_id == event_id)
            .map(|b| i64::from(b.quantity))
            .sum();

        ensure_seats_available(capacity, taken, quantity)?;

        let booking = Booking::confirmed(event_id, user_id, quantity);
        tables.bookings.push(booking.clone());
        Ok(booking)
    }

    async fn list_for_user(&self, user_id: Uuid) -> CoreResult<Vec<BookingWithEvent>> {
        let tables = self.tables.read().await;

        tables
            .bookings
            .iter()
            .rev()
            .filter(|b| b.user_id == user_id)
            .map(|b| {
                let event = tables
                    .events
                    .get(&b.event_id)
                    .cloned()
                    .ok_or_else(|| CoreError::StorageError(format!("booked event {} missing", b.event_id)))?;
                Ok(BookingWithEvent {
                    booking: b.clone(),
                    event,
                })
            })
            .collect()
    }
}
