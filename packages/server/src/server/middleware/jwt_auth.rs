use std::sync::Arc;

use axum::{middleware::Next, response::Response};
use tracing::debug;

use crate::common::AppState;
use crate::domains::auth::JwtService;

/// Authenticated visitor information from the session JWT
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub subject_id: String,
    pub email: String,
    pub is_admin: bool,
}

/// JWT authentication middleware
///
/// Extracts the token from the Authorization header, verifies it, and
/// adds `AppState` to the request extensions. With no token or an
/// invalid token the request continues anonymously; authorization
/// decisions happen in the route handlers.
pub async fn jwt_auth_middleware(
    jwt_service: Arc<JwtService>,
    mut request: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Response {
    let state = match extract_auth_user(&request, &jwt_service) {
        Some(user) => {
            debug!(
                "Authenticated visitor: {} (admin: {})",
                user.subject_id, user.is_admin
            );
            let state = AppState::authenticated(user.subject_id.clone(), user.is_admin);
            request.extensions_mut().insert(user);
            state
        }
        None => {
            debug!("No valid authentication token");
            AppState::anonymous()
        }
    };

    request.extensions_mut().insert(state);
    next.run(request).await
}

/// Extract and verify the session token from the request
fn extract_auth_user(
    request: &axum::http::Request<axum::body::Body>,
    jwt_service: &JwtService,
) -> Option<AuthUser> {
    // Get Authorization header
    let auth_header = request.headers().get("authorization")?;
    let auth_str = auth_header.to_str().ok()?;

    // Extract token (handle both "Bearer <token>" and raw token)
    let token = auth_str.strip_prefix("Bearer ").unwrap_or(auth_str);

    // Verify token
    let claims = jwt_service.verify_token(token).ok()?;

    let is_admin = claims.is_admin();
    Some(AuthUser {
        subject_id: claims.sub,
        email: claims.email,
        is_admin,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domains::member::models::Role;

    #[test]
    fn test_extract_token_with_bearer() {
        let jwt_service = JwtService::new("test_secret", "test_issuer".to_string());
        let token = jwt_service
            .create_token("uid1", "a@x.com".to_string(), Role::Admin)
            .unwrap();

        let request = axum::http::Request::builder()
            .header("authorization", format!("Bearer {}", token))
            .body(axum::body::Body::empty())
            .unwrap();

        let auth_user = extract_auth_user(&request, &jwt_service);
        assert!(auth_user.is_some());
        let auth_user = auth_user.unwrap();
        assert_eq!(auth_user.subject_id, "uid1");
        assert!(auth_user.is_admin);
    }

    #[test]
    fn test_extract_token_without_bearer() {
        let jwt_service = JwtService::new("test_secret", "test_issuer".to_string());
        let token = jwt_service
            .create_token("uid2", "b@x.com".to_string(), Role::User)
            .unwrap();

        let request = axum::http::Request::builder()
            .header("authorization", token)
            .body(axum::body::Body::empty())
            .unwrap();

        let auth_user = extract_auth_user(&request, &jwt_service);
        assert!(auth_user.is_some());
        assert!(!auth_user.unwrap().is_admin);
    }

    #[test]
    fn test_no_auth_header() {
        let jwt_service = JwtService::new("test_secret", "test_issuer".to_string());
        let request = axum::http::Request::builder()
            .body(axum::body::Body::empty())
            .unwrap();

        let auth_user = extract_auth_user(&request, &jwt_service);
        assert!(auth_user.is_none());
    }

    #[test]
    fn test_invalid_token() {
        let jwt_service = JwtService::new("test_secret", "test_issuer".to_string());
        let request = axum::http::Request::builder()
            .header("authorization", "Bearer invalid_token")
            .body(axum::body::Body::empty())
            .unwrap();

        let auth_user = extract_auth_user(&request, &jwt_service);
        assert!(auth_user.is_none());
    }
}
