use axum::{
    extract::FromRequestParts,
    http::request::Parts,
    RequestPartsExt,
};
use axum_extra::{
    extract::cookie::CookieJar,
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use seatline_core::models::PublicUser;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{internal, AppError};
use crate::state::{AppState, AuthConfig};

pub const SESSION_COOKIE: &str = "seatline_session";

// ============================================================================
// JWT Claims
// ============================================================================

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SessionClaims {
    pub sub: Uuid,
    pub email: String,
    pub name: String,
    pub exp: usize,
}

pub fn issue_token(auth: &AuthConfig, user: &PublicUser) -> Result<String, AppError> {
    let claims = SessionClaims {
        sub: user.id,
        email: user.email.clone(),
        name: user.name.clone(),
        exp: (Utc::now() + Duration::seconds(auth.expiration as i64)).timestamp() as usize,
    };

    encode(&Header::default(), &claims, &EncodingKey::from_secret(auth.secret.as_bytes()))
        .map_err(|e| AppError::Anyhow(anyhow::anyhow!("Token encoding failed: {}", e)))
}

pub fn decode_token(auth: &AuthConfig, token: &str) -> Result<SessionClaims, AppError> {
    decode::<SessionClaims>(
        token,
        &DecodingKey::from_secret(auth.secret.as_bytes()),
        &Validation::default(),
    )
    .map(|data| data.claims)
    .map_err(|e| {
        tracing::debug!("Rejected session token: {}", e);
        AppError::unauthorized()
    })
}

// ============================================================================
// Session Extractor
// ============================================================================

/// The authenticated caller. Reads `Authorization: Bearer <token>` first and
/// falls back to the session cookie. The token's subject must still name a
/// stored user; anything else is a 401.
#[derive(Debug, Clone)]
pub struct CurrentUser {
    pub id: Uuid,
    pub email: String,
    pub name: String,
}

impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = match parts.extract::<TypedHeader<Authorization<Bearer>>>().await {
            Ok(TypedHeader(Authorization(bearer))) => bearer.token().to_string(),
            Err(_) => CookieJar::from_headers(&parts.headers)
                .get(SESSION_COOKIE)
                .map(|cookie| cookie.value().to_string())
                .ok_or_else(AppError::unauthorized)?,
        };

        let claims = decode_token(&state.auth, &token)?;

        let user = state
            .users
            .find_by_id(claims.sub)
            .await
            .map_err(internal("Failed to resolve session"))?
            .ok_or_else(|| {
                tracing::debug!(user_id = %claims.sub, "Session token names an unknown user");
                AppError::unauthorized()
            })?;

        Ok(CurrentUser {
            id: user.id,
            email: user.email,
            name: user.name,
        })
    }
}
