pub mod availability;
pub mod identity;
pub mod models;
pub mod repository;
pub mod validation;

pub use availability::{BookingService, SeatAvailability};
pub use identity::{BcryptHasher, CredentialHasher, IdentityService};

#[derive(Debug, thiserror::Error)]
pub enum CoreError {
    #[error("{0}")]
    ValidationError(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Not enough seats available: requested {requested}, available {available}")]
    InsufficientSeats { requested: i64, available: i64 },
    #[error("User with this email already exists")]
    EmailTaken,
    #[error("Invalid email or password")]
    InvalidCredentials,
    #[error("Storage error: {0}")]
    StorageError(String),
    #[error("Internal service error: {0}")]
    InternalError(String),
}

pub type CoreResult<T> = Result<T, CoreError>;
