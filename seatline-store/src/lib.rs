pub mod app_config;
pub mod booking_repo;
pub mod database;
pub mod event_repo;
pub mod memory;
pub mod user_repo;

use std::sync::Arc;

use seatline_core::repository::{BookingRepository, EventRepository, UserRepository};

pub use booking_repo::PgBookingRepository;
pub use database::DbClient;
pub use event_repo::PgEventRepository;
pub use memory::MemoryStore;
pub use user_repo::PgUserRepository;

/// The three repositories the API needs, backed by one storage engine.
#[derive(Clone)]
pub struct Repositories {
    pub users: Arc<dyn UserRepository>,
    pub events: Arc<dyn EventRepository>,
    pub bookings: Arc<dyn BookingRepository>,
}

impl Repositories {
    pub fn postgres(db: &DbClient) -> Self {
        Self {
            users: Arc::new(PgUserRepository::new(db.pool.clone())),
            events: Arc::new(PgEventRepository::new(db.pool.clone())),
            bookings: Arc::new(PgBookingRepository::new(db.pool.clone())),
        }
    }

    pub fn in_memory() -> Self {
        let store = Arc::new(MemoryStore::new());
        Self {
            users: store.clone(),
            events: store.clone(),
            bookings: store,
        }
    }
}
