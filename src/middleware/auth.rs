use axum::{
    body::Body,
    extract::State,
    http::{header::AUTHORIZATION, Request, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use sqlx::SqlitePool;

use crate::config::Config;
use crate::models::UserRole;
use crate::services::AuthService;

#[derive(Clone, Debug)]
pub struct AuthUser {
    pub user_id: i64,
    pub username: String,
    pub role: UserRole,
}

#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub config: Config,
}

pub fn is_admin(role: &UserRole) -> bool {
    matches!(role, UserRole::Admin)
}

fn parse_role(role_str: &str) -> UserRole {
    match role_str {
        "admin" => UserRole::Admin,
        _ => UserRole::User,
    }
}

// Middleware that makes AppState reachable from extractors via request extensions
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Response {
    request.extensions_mut().insert(state);
    next.run(request).await
}

// Extractor for the authenticated user. A missing or malformed Authorization
// header is 401; a token that fails verification is 403.
#[axum::async_trait]
impl<S> axum::extract::FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut axum::http::request::Parts,
        _state: &S,
    ) -> Result<Self, Self::Rejection> {
        let app_state = parts.extensions.get::<AppState>().cloned().ok_or_else(|| {
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({"error": "Internal server error"})),
            )
                .into_response()
        })?;

        let auth_header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| {
                (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({"error": "Missing authorization header", "code": "UNAUTHORIZED"})),
                )
                    .into_response()
            })?;

        let token = auth_header.strip_prefix("Bearer ").ok_or_else(|| {
            (
                StatusCode::UNAUTHORIZED,
                Json(json!({"error": "Invalid authorization header format", "code": "UNAUTHORIZED"})),
            )
                .into_response()
        })?;

        let auth_service = AuthService::new(app_state.config);
        let claims = auth_service.verify_token(token).map_err(|_| {
            (
                StatusCode::FORBIDDEN,
                Json(json!({"error": "Invalid or expired token", "code": "INVALID_TOKEN"})),
            )
                .into_response()
        })?;

        let user_id: i64 = claims.sub.parse().map_err(|_| {
            (
                StatusCode::FORBIDDEN,
                Json(json!({"error": "Invalid user ID in token", "code": "INVALID_TOKEN"})),
            )
                .into_response()
        })?;

        Ok(AuthUser {
            user_id,
            username: claims.username,
            role: parse_role(&claims.role),
        })
    }
}
