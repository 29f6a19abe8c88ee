use std::sync::Arc;

use seatline_core::repository::{BookingRepository, EventRepository, UserRepository};
use seatline_core::{BookingService, CredentialHasher, IdentityService};
use seatline_store::Repositories;

#[derive(Clone)]
pub struct AuthConfig {
    pub secret: String,
    /// Session lifetime in seconds.
    pub expiration: u64,
}

#[derive(Clone)]
pub struct AppState {
    pub users: Arc<dyn UserRepository>,
    pub events: Arc<dyn EventRepository>,
    pub booking_repo: Arc<dyn BookingRepository>,
    pub identity: IdentityService,
    pub bookings: BookingService,
    pub auth: AuthConfig,
}

impl AppState {
    pub fn new(repos: Repositories, hasher: Arc<dyn CredentialHasher>, auth: AuthConfig) -> Self {
        Self {
            identity: IdentityService::new(repos.users.clone(), hasher),
            bookings: BookingService::new(repos.bookings.clone()),
            users: repos.users,
            events: repos.events,
            booking_repo: repos.bookings,
            auth,
        }
    }
}
