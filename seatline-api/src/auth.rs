use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use axum_extra::extract::cookie::{Cookie, CookieJar, SameSite};
use seatline_core::models::PublicUser;
use seatline_core::validation::RegistrationDraft;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use tracing::info;

use crate::error::{internal, AppError, AppJson};
use crate::middleware::auth::issue_token;
use crate::middleware::{CurrentUser, SESSION_COOKIE};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
struct LoginResponse {
    token: String,
    user: PublicUser,
}

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/auth/register", post(register))
        .route("/api/auth/login", post(login))
        .route("/api/auth/logout", post(logout))
        .route("/api/auth/session", get(session))
}

/// POST /api/auth/register
async fn register(
    State(state): State<AppState>,
    AppJson(req): AppJson<RegistrationDraft>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    state
        .identity
        .register(req)
        .await
        .map_err(internal("Error creating user"))?;

    Ok((
        StatusCode::CREATED,
        Json(json!({ "message": "User created successfully" })),
    ))
}

/// POST /api/auth/login
/// Issues a session token, returned in the body and as an HttpOnly cookie.
async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    AppJson(req): AppJson<LoginRequest>,
) -> Result<(CookieJar, Json<LoginResponse>), AppError> {
    let user = state
        .identity
        .authenticate(&req.email, &req.password)
        .await
        .map_err(internal("Error logging in"))?
        .public();

    let token = issue_token(&state.auth, &user)?;
    info!(user_id = %user.id, "Session issued");

    let cookie = Cookie::build((SESSION_COOKIE, token.clone()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax);

    Ok((jar.add(cookie), Json(LoginResponse { token, user })))
}

/// POST /api/auth/logout
async fn logout(jar: CookieJar) -> (CookieJar, Json<Value>) {
    let jar = jar.remove(Cookie::build(SESSION_COOKIE).path("/"));
    (jar, Json(json!({ "message": "Logged out" })))
}

/// GET /api/auth/session
async fn session(current: CurrentUser) -> Json<PublicUser> {
    Json(PublicUser {
        id: current.id,
        name: current.name,
        email: current.email,
    })
}
