// src/handlers/auth.rs

use axum::{Json, extract::State, response::IntoResponse};
use chrono::Utc;
use sqlx::SqlitePool;
use uuid::Uuid;
use validator::Validate;

use crate::{
    config::Config,
    error::AppError,
    models::user::{AuthResponse, LoginRequest, RegisterRequest, Role, User},
    utils::{
        hash::{hash_password, verify_password},
        jwt::sign_jwt,
    },
};

/// Registers a new user.
///
/// Hashes the password using Argon2 before storing it. New accounts always
/// get the 'user' role. Returns the same token payload as login, so the
/// client is signed in immediately.
pub async fn register(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Json(payload): Json<RegisterRequest>,
) -> Result<impl IntoResponse, AppError> {
    if let Err(validation_errors) = payload.validate() {
        return Err(AppError::BadRequest(validation_errors.to_string()));
    }

    let taken = sqlx::query_scalar::<_, String>("SELECT id FROM users WHERE email = ?")
        .bind(&payload.email)
        .fetch_optional(&pool)
        .await?;

    if taken.is_some() {
        return Err(AppError::BadRequest("Email already exists".to_string()));
    }

    let user = User {
        id: Uuid::new_v4().to_string(),
        email: payload.email,
        password: hash_password(&payload.password)?,
        name: payload.name,
        role: Role::User,
        created_at: Utc::now(),
    };

    sqlx::query(
        "INSERT INTO users (id, email, password, name, role, created_at) \
         VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(&user.id)
    .bind(&user.email)
    .bind(&user.password)
    .bind(&user.name)
    .bind(user.role)
    .bind(user.created_at)
    .execute(&pool)
    .await
    .map_err(|e| {
        // The UNIQUE index backstops a concurrent duplicate registration.
        if e.to_string().contains("UNIQUE constraint") {
            AppError::BadRequest("Email already exists".to_string())
        } else {
            tracing::error!("Failed to register user: {:?}", e);
            AppError::from(e)
        }
    })?;

    let token = sign_jwt(&user, &config.jwt_secret, config.jwt_expiration)?;

    Ok(Json(AuthResponse {
        token,
        id: user.id,
        email: user.email,
        name: user.name,
        role: user.role,
    }))
}

/// Authenticates a regular user and returns a JWT token.
pub async fn login(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    login_with_role(&pool, &config, payload, Role::User).await
}

/// Authenticates an administrator.
///
/// Separate entry point on purpose: an admin account cannot authenticate
/// through the user login path and vice versa, even with valid credentials.
pub async fn admin_login(
    State(pool): State<SqlitePool>,
    State(config): State<Config>,
    Json(payload): Json<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    login_with_role(&pool, &config, payload, Role::Admin).await
}

/// Looks up the account by email AND expected role, then verifies the
/// password hash. Every rejection takes the same path with the same
/// message, so the response does not reveal whether the email exists.
async fn login_with_role(
    pool: &SqlitePool,
    config: &Config,
    payload: LoginRequest,
    role: Role,
) -> Result<Json<AuthResponse>, AppError> {
    let user = sqlx::query_as::<_, User>(
        "SELECT id, email, password, name, role, created_at \
         FROM users WHERE email = ? AND role = ?",
    )
    .bind(&payload.email)
    .bind(role)
    .fetch_optional(pool)
    .await
    .map_err(|e| {
        tracing::error!("Login DB error: {:?}", e);
        AppError::InternalServerError(e.to_string())
    })?;

    let user = match user {
        Some(user) if verify_password(&payload.password, &user.password)? => user,
        _ => return Err(AppError::AuthError("Invalid email or password".to_string())),
    };

    let token = sign_jwt(&user, &config.jwt_secret, config.jwt_expiration)?;

    Ok(Json(AuthResponse {
        token,
        id: user.id,
        email: user.email,
        name: user.name,
        role: user.role,
    }))
}
