use axum::{
    extract::{rejection::JsonRejection, FromRequest},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use seatline_core::CoreError;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    AuthenticationError(String),
    #[error("{0}")]
    ValidationError(String),
    #[error("{0}")]
    NotFoundError(String),
    #[error("{0}")]
    InternalServerError(String),
    #[error(transparent)]
    Anyhow(#[from] anyhow::Error),
}

impl AppError {
    pub fn unauthorized() -> Self {
        AppError::AuthenticationError("Unauthorized".to_string())
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message) = match self {
            AppError::AuthenticationError(msg) => (StatusCode::UNAUTHORIZED, msg),
            AppError::ValidationError(msg) => (StatusCode::BAD_REQUEST, msg),
            AppError::NotFoundError(msg) => (StatusCode::NOT_FOUND, msg),
            // Already logged where the message was chosen.
            AppError::InternalServerError(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
            AppError::Anyhow(err) => {
                tracing::error!("Internal Server Error: {:#}", err);
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal Server Error".to_string())
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status, body).into_response()
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::ValidationError(rejection.body_text())
    }
}

/// Maps a domain error, replacing storage and internal failures with the
/// given client-facing message after logging the detail.
pub fn internal(public: &'static str) -> impl Fn(CoreError) -> AppError {
    move |err| match err {
        CoreError::ValidationError(msg) => AppError::ValidationError(msg),
        CoreError::NotFound(what) => AppError::NotFoundError(format!("{} not found", what)),
        CoreError::InsufficientSeats { .. } => {
            AppError::ValidationError("Not enough seats available".to_string())
        }
        CoreError::EmailTaken => AppError::ValidationError(err.to_string()),
        CoreError::InvalidCredentials => AppError::AuthenticationError(err.to_string()),
        CoreError::StorageError(_) | CoreError::InternalError(_) => {
            tracing::error!(error = %err, "{}", public);
            AppError::InternalServerError(public.to_string())
        }
    }
}

/// JSON body extractor whose rejections use the `{"error": ...}` body.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct AppJson<T>(pub T);
