use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use chrono::Utc;
use serde_json::{json, Value};

use crate::error::{AppError, AppResult};
use crate::middleware::AppState;
use crate::models::{LoginRequest, LoginResponse, RegisterRequest, UserPublic, UserRole};
use crate::services::AuthService;
use crate::utils::validators::validate_username;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/register", post(register))
        .route("/login", post(login))
}

/// Register a new account
#[utoipa::path(
    post,
    path = "/api/register",
    tag = "auth",
    request_body = RegisterRequest,
    responses(
        (status = 201, description = "Account created"),
        (status = 400, description = "Invalid payload or username already taken")
    )
)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<Value>)> {
    let username = payload.username.trim();

    if !validate_username(username) {
        return Err(AppError::Validation(
            "Username must be 3-32 characters (letters, digits, _ . -)".to_string(),
        ));
    }

    if payload.password.len() < 4 {
        return Err(AppError::Validation(
            "Password must be at least 4 characters".to_string(),
        ));
    }

    // Username comparison is case-insensitive (COLLATE NOCASE on the column)
    if AuthService::get_user_by_username(&state.pool, username)
        .await?
        .is_some()
    {
        return Err(AppError::BadRequest("Username already taken".to_string()));
    }

    let password_hash = AuthService::hash_password(&payload.password)?;
    let role = payload.role.unwrap_or(UserRole::User);

    let result = sqlx::query(
        r#"
        INSERT INTO users (username, password_hash, role, created_at)
        VALUES (?, ?, ?, ?)
        "#,
    )
    .bind(username)
    .bind(&password_hash)
    .bind(role)
    .bind(Utc::now())
    .execute(&state.pool)
    .await?;

    Ok((
        StatusCode::CREATED,
        Json(json!({
            "message": "Account created",
            "user_id": result.last_insert_rowid()
        })),
    ))
}

/// Log in and receive a bearer token
#[utoipa::path(
    post,
    path = "/api/login",
    tag = "auth",
    request_body = LoginRequest,
    responses(
        (status = 200, description = "Login successful", body = LoginResponse),
        (status = 401, description = "Wrong username or password")
    )
)]
pub async fn login(
    State(state): State<AppState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<LoginResponse>> {
    let user = AuthService::get_user_by_username(&state.pool, payload.username.trim())
        .await?
        .ok_or(AppError::Unauthorized)?;

    if !AuthService::verify_password(&payload.password, &user.password_hash) {
        return Err(AppError::Unauthorized);
    }

    let auth_service = AuthService::new(state.config.clone());
    let token = auth_service.generate_token(&user)?;

    Ok(Json(LoginResponse {
        token,
        user: UserPublic::from(user),
    }))
}
