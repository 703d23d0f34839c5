pub mod health;
pub mod members;
pub mod session;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde_json::json;
use tracing::error;

use crate::common::AppState;
use crate::domains::auth::AuthError;
use crate::kernel::StoreError;

/// Error responses for the HTTP surface.
///
/// Every collaborator failure propagates here and is surfaced to the
/// caller as a visible message; nothing is retried automatically.
#[derive(Debug)]
pub enum ApiError {
    Unauthenticated,
    Forbidden,
    Auth(AuthError),
    Store(StoreError),
    Internal(anyhow::Error),
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        ApiError::Auth(e)
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        ApiError::Store(e)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match &self {
            ApiError::Unauthenticated => (
                StatusCode::UNAUTHORIZED,
                "Unauthenticated: valid session token required".to_string(),
            ),
            ApiError::Forbidden => (
                StatusCode::FORBIDDEN,
                "Unauthorized: admin access required".to_string(),
            ),
            ApiError::Auth(e) => {
                let status = match e {
                    AuthError::Network(_) => StatusCode::BAD_GATEWAY,
                    AuthError::SignInInProgress => StatusCode::CONFLICT,
                    AuthError::Store(StoreError::Backend(_)) => StatusCode::BAD_GATEWAY,
                    _ => StatusCode::UNAUTHORIZED,
                };
                (status, e.to_string())
            }
            ApiError::Store(e) => {
                let status = match e {
                    StoreError::NotFound(_) => StatusCode::NOT_FOUND,
                    StoreError::Backend(_) => StatusCode::BAD_GATEWAY,
                };
                (status, e.to_string())
            }
            ApiError::Internal(e) => {
                error!("internal error: {:#}", e);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "internal error".to_string(),
                )
            }
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

/// Gate an admin-only route. 401 for anonymous callers, 403 for
/// authenticated non-admins.
pub fn require_admin(state: &AppState) -> Result<(), ApiError> {
    if !state.is_authenticated() {
        return Err(ApiError::Unauthenticated);
    }
    if !state.is_admin() {
        return Err(ApiError::Forbidden);
    }
    Ok(())
}
