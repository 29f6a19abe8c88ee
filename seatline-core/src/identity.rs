use seatline_shared::{redact_email, Masked};
use std::sync::Arc;
use tracing::{info, warn};

use crate::models::{NewUser, User};
use crate::repository::UserRepository;
use crate::validation::{normalize_email, RegistrationDraft};
use crate::{CoreError, CoreResult};

/// Password hashing collaborator. Implementations are CPU-bound and are
/// always invoked from a blocking task.
pub trait CredentialHasher: Send + Sync + 'static {
    fn hash(&self, password: &str) -> CoreResult<String>;

    fn verify(&self, password: &str, hash: &str) -> CoreResult<bool>;
}

pub struct BcryptHasher {
    cost: u32,
}

impl BcryptHasher {
    pub fn new(cost: u32) -> Self {
        Self { cost }
    }
}

impl Default for BcryptHasher {
    fn default() -> Self {
        Self::new(12)
    }
}

impl CredentialHasher for BcryptHasher {
    fn hash(&self, password: &str) -> CoreResult<String> {
        bcrypt::hash(password, self.cost).map_err(|e| CoreError::InternalError(e.to_string()))
    }

    fn verify(&self, password: &str, hash: &str) -> CoreResult<bool> {
        bcrypt::verify(password, hash).map_err(|e| CoreError::InternalError(e.to_string()))
    }
}

/// Registration and credential checks on top of a [`UserRepository`].
#[derive(Clone)]
pub struct IdentityService {
    users: Arc<dyn UserRepository>,
    hasher: Arc<dyn CredentialHasher>,
}

impl IdentityService {
    pub fn new(users: Arc<dyn UserRepository>, hasher: Arc<dyn CredentialHasher>) -> Self {
        Self { users, hasher }
    }

    pub async fn register(&self, draft: RegistrationDraft) -> CoreResult<User> {
        let draft = draft.normalized()?;

        if self.users.find_by_email(&draft.email).await?.is_some() {
            warn!(email = %redact_email(&draft.email), "Registration rejected: email already registered");
            return Err(CoreError::EmailTaken);
        }

        let hasher = self.hasher.clone();
        let password = draft.password;
        let password_hash = tokio::task::spawn_blocking(move || hasher.hash(&password))
            .await
            .map_err(|e| CoreError::InternalError(e.to_string()))??;

        // The unique index still guards against a concurrent registration
        // slipping in between the lookup and the insert.
        let user = self
            .users
            .create_user(NewUser {
                name: draft.name,
                email: draft.email,
                password_hash: Masked(password_hash),
            })
            .await?;

        info!(user_id = %user.id, email = %redact_email(&user.email), "User registered");
        Ok(user)
    }

    /// Any mismatch, including an unknown e-mail, is reported as
    /// [`CoreError::InvalidCredentials`].
    pub async fn authenticate(&self, email: &str, password: &str) -> CoreResult<User> {
        let email = normalize_email(email);
        let user = self
            .users
            .find_by_email(&email)
            .await?
            .ok_or(CoreError::InvalidCredentials)?;

        let hasher = self.hasher.clone();
        let password = password.to_string();
        let hash = user.password_hash.expose().clone();
        let valid = tokio::task::spawn_blocking(move || hasher.verify(&password, &hash))
            .await
            .map_err(|e| CoreError::InternalError(e.to_string()))??;

        if !valid {
            warn!(email = %redact_email(&email), "Login rejected: bad password");
            return Err(CoreError::InvalidCredentials);
        }

        Ok(user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use tokio::sync::Mutex;
    use uuid::Uuid;

    #[derive(Default)]
    struct FakeUsers {
        users: Mutex<Vec<User>>,
    }

    #[async_trait]
    impl UserRepository for FakeUsers {
        async fn create_user(&self, user: NewUser) -> CoreResult<User> {
            let mut users = self.users.lock().await;
            if users.iter().any(|u| u.email == user.email) {
                return Err(CoreError::EmailTaken);
            }
            let created = User {
                id: Uuid::new_v4(),
                name: user.name,
                email: user.email,
                password_hash: user.password_hash,
                created_at: Utc::now(),
            };
            users.push(created.clone());
            Ok(created)
        }

        async fn find_by_email(&self, email: &str) -> CoreResult<Option<User>> {
            Ok(self.users.lock().await.iter().find(|u| u.email == email).cloned())
        }

        async fn find_by_id(&self, id: Uuid) -> CoreResult<Option<User>> {
            Ok(self.users.lock().await.iter().find(|u| u.id == id).cloned())
        }
    }

    fn service() -> (IdentityService, Arc<FakeUsers>) {
        let users = Arc::new(FakeUsers::default());
        // Minimum bcrypt cost keeps the tests fast.
        let service = IdentityService::new(users.clone(), Arc::new(BcryptHasher::new(4)));
        (service, users)
    }

    fn draft(email: &str) -> RegistrationDraft {
        RegistrationDraft {
            name: "Ada".to_string(),
            email: email.to_string(),
            password: "correct horse".to_string(),
        }
    }

    #[tokio::test]
    async fn test_register_hashes_password() {
        let (service, _) = service();
        let user = service.register(draft("a@x.com")).await.unwrap();
        assert_ne!(user.password_hash.expose(), "correct horse");
        assert!(user.password_hash.expose().starts_with("$2"));
    }

    #[tokio::test]
    async fn test_duplicate_email_rejected_without_new_row() {
        let (service, users) = service();
        service.register(draft("a@x.com")).await.unwrap();

        let second = service.register(draft("A@X.com")).await;
        assert!(matches!(second, Err(CoreError::EmailTaken)));
        assert_eq!(users.users.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_authenticate() {
        let (service, _) = service();
        let user = service.register(draft("a@x.com")).await.unwrap();

        let found = service.authenticate("a@x.com", "correct horse").await.unwrap();
        assert_eq!(found.id, user.id);

        assert!(matches!(
            service.authenticate("a@x.com", "wrong").await,
            Err(CoreError::InvalidCredentials)
        ));
        assert!(matches!(
            service.authenticate("nobody@x.com", "correct horse").await,
            Err(CoreError::InvalidCredentials)
        ));
    }
}
