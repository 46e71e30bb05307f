//! Handlers for the `/auth` resource (register, login).

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use backdrop_core::error::CoreError;
use backdrop_core::validation::{normalize_email, validate_name, validate_password_strength};
use backdrop_db::models::profile::{CreateProfile, ProfileResponse};
use backdrop_db::repositories::ProfileRepo;
use chrono::Utc;
use serde::{Deserialize, Serialize};

use crate::auth::jwt::issue_access_token;
use crate::auth::password::{hash_password, verify_password, verify_unknown_profile};
use crate::error::{AppError, AppResult};
use crate::response::DataResponse;
use crate::state::AppState;

// ---------------------------------------------------------------------------
// Request / response types
// ---------------------------------------------------------------------------

/// Request body for `POST /auth/register`.
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    /// Defaults to the local part of the email.
    pub display_name: Option<String>,
}

/// Request body for `POST /auth/login`.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Successful authentication response returned by register and login.
#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub access_token: String,
    /// Access token lifetime in seconds.
    pub expires_in: i64,
    pub profile: ProfileResponse,
}

// ---------------------------------------------------------------------------
// Handlers
// ---------------------------------------------------------------------------

/// POST /api/v1/auth/register
///
/// Create a free-tier profile and sign it in.
pub async fn register(
    State(state): State<AppState>,
    Json(input): Json<RegisterRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<AuthResponse>>)> {
    let email = normalize_email(&input.email)?;
    validate_password_strength(&input.password)?;

    let display_name = match input.display_name.as_deref().map(str::trim) {
        Some(name) if !name.is_empty() => name.to_string(),
        _ => email.split('@').next().unwrap_or_default().to_string(),
    };
    validate_name("display_name", &display_name)?;

    if ProfileRepo::find_by_email(&state.pool, &email).await?.is_some() {
        return Err(AppError::Core(CoreError::Conflict(
            "An account with this email already exists".into(),
        )));
    }

    let password_hash = hash_password(&input.password)
        .map_err(|e| AppError::InternalError(format!("Password hashing error: {e}")))?;

    let profile = ProfileRepo::create(
        &state.pool,
        &CreateProfile {
            email,
            password_hash,
            display_name,
        },
    )
    .await?;

    tracing::info!(profile_id = profile.id, "Profile registered");

    let response = auth_response(&state, profile.into())?;
    Ok((StatusCode::CREATED, Json(DataResponse { data: response })))
}

/// POST /api/v1/auth/login
///
/// Authenticate with email + password. Returns an access token.
pub async fn login(
    State(state): State<AppState>,
    Json(input): Json<LoginRequest>,
) -> AppResult<Json<DataResponse<AuthResponse>>> {
    let invalid = || {
        AppError::Core(CoreError::Unauthorized(
            "Invalid email or password".into(),
        ))
    };

    let email = normalize_email(&input.email).map_err(|_| invalid())?;
    let Some(profile) = ProfileRepo::find_by_email(&state.pool, &email).await? else {
        verify_unknown_profile(&input.password);
        return Err(invalid());
    };

    // Password first: account state is only revealed to its owner.
    let password_valid = verify_password(&input.password, &profile.password_hash)
        .map_err(|e| AppError::InternalError(format!("Password verification error: {e}")))?;
    if !password_valid {
        tracing::info!(profile_id = profile.id, "Login rejected: wrong password");
        return Err(invalid());
    }

    if !profile.is_active {
        tracing::info!(profile_id = profile.id, "Login rejected: profile deactivated");
        return Err(AppError::Core(CoreError::Forbidden(
            "Account is deactivated".into(),
        )));
    }

    tracing::info!(profile_id = profile.id, "Profile signed in");

    let response = auth_response(&state, profile.into())?;
    Ok(Json(DataResponse { data: response }))
}

fn auth_response(state: &AppState, profile: ProfileResponse) -> AppResult<AuthResponse> {
    let access_token =
        issue_access_token(profile.id, &profile.role, &state.config.jwt, Utc::now())
        .map_err(|e| AppError::InternalError(format!("Token generation error: {e}")))?;
    Ok(AuthResponse {
        access_token,
        expires_in: state.config.jwt.expires_in_secs(),
        profile,
    })
}
