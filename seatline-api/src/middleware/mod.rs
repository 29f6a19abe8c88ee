pub mod auth;

pub use auth::{CurrentUser, SessionClaims, SESSION_COOKIE};
