use async_trait::async_trait;
use chrono::{DateTime, Utc};
use seatline_core::models::{NewUser, User};
use seatline_core::repository::UserRepository;
use seatline_core::{CoreError, CoreResult};
use seatline_shared::Masked;
use sqlx::PgPool;
use uuid::Uuid;

use crate::database::{is_unique_violation, storage_error};

pub struct PgUserRepository {
    pool: PgPool,
}

impl PgUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
    created_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        User {
            id: row.id,
            name: row.name,
            email: row.email,
            password_hash: Masked(row.password_hash),
            created_at: row.created_at,
        }
    }
}

#[async_trait]
impl UserRepository for PgUserRepository {
    async fn create_user(&self, user: NewUser) -> CoreResult<User> {
        let row = sqlx::query_as::<_, UserRow>(
            r#"
            INSERT INTO users (id, name, email, password_hash)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, password_hash, created_at
            "#,
        )
        .bind(Uuid::new_v4())
        .bind(&user.name)
        .bind(&user.email)
        .bind(user.password_hash.expose())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if is_unique_violation(&e) {
                CoreError::EmailTaken
            } else {
                storage_error(e)
            }
        })?;

        Ok(row.into())
    }

    async fn find_by_email(&self, email: &str) -> CoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, email, password_hash, created_at FROM users WHERE email = $1",
        )
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(row.map(User::from))
    }

    async fn find_by_id(&self, id: Uuid) -> CoreResult<Option<User>> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, email, password_hash, created_at FROM users WHERE id = $1",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(storage_error)?;

        Ok(row.map(User::from))
    }
}
