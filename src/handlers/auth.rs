//! Account lifecycle: registration, login/logout, session identity, password
//! rotation and recovery, profile updates.

use axum::{extract::State, http::StatusCode, response::Json, Extension};
use axum_extra::extract::CookieJar;
use chrono::{Duration, Utc};
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::app_state::AppState;
use crate::auth::{self, password};
use crate::database::models::Role;
use crate::database::users::{NewUser, UserRepository};
use crate::error::ApiError;
use crate::middleware::response::success_message;
use crate::middleware::CurrentUser;
use crate::validate;

/// Reset tokens stay valid for 15 minutes
const RESET_TOKEN_TTL_MINUTES: i64 = 15;

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterRequest {
    pub full_name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub address: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChangePasswordRequest {
    pub current_password: Option<String>,
    pub new_password: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateProfileRequest {
    pub name: Option<String>,
    pub address: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    pub email: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetPasswordRequest {
    pub token: Option<String>,
    pub new_password: Option<String>,
}

fn user_json(id: i64, email: &str, full_name: &str, address: Option<&str>, role: Role) -> Value {
    json!({
        "id": id,
        "email": email,
        "fullName": full_name,
        "address": address,
        "role": role,
    })
}

/// POST /api/auth/register - create an account and open a session
pub async fn register(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<RegisterRequest>,
) -> Result<(CookieJar, (StatusCode, Json<Value>)), ApiError> {
    let full_name = payload.full_name.as_deref().unwrap_or_default();
    let email = payload.email.as_deref().unwrap_or_default();
    let raw_password = payload.password.as_deref().unwrap_or_default();

    validate::validate_registration_name(full_name)
        .map_err(|msg| ApiError::validation_error(msg, None))?;
    validate::validate_email(email).map_err(|msg| ApiError::validation_error(msg, None))?;
    validate::validate_registration_password(raw_password)
        .map_err(|msg| ApiError::validation_error(msg, None))?;
    validate::validate_address(payload.address.as_deref())
        .map_err(|msg| ApiError::validation_error(msg, None))?;

    // Only exact canonical names select a role; anything else is a normal user
    let role = payload
        .role
        .as_deref()
        .and_then(Role::from_canonical)
        .unwrap_or(Role::NormalUser);

    let users = UserRepository::new(state.pool.clone());
    if users.find_by_email(email).await?.is_some() {
        return Err(ApiError::bad_request("User Already Exist"));
    }

    let password_hash = password::hash_password(raw_password).await?;
    let id = users
        .create(NewUser {
            full_name,
            email,
            password_hash: &password_hash,
            address: payload.address.as_deref(),
            role,
        })
        .await?;

    let token = auth::generate_session_token(id)?;
    let jar = jar.add(auth::session_cookie(token));

    Ok((
        jar,
        (
            StatusCode::CREATED,
            Json(json!({
                "message": "User Registered Successfully",
                "user": user_json(id, email, full_name, payload.address.as_deref(), role),
            })),
        ),
    ))
}

/// POST /api/auth/login - authenticate, optionally filtered by role synonym
pub async fn login(
    State(state): State<AppState>,
    jar: CookieJar,
    Json(payload): Json<LoginRequest>,
) -> Result<(CookieJar, Json<Value>), ApiError> {
    let email = payload.email.as_deref().unwrap_or_default();
    let raw_password = payload.password.as_deref().unwrap_or_default();

    let role_filter = match payload.role.as_deref() {
        Some(raw) => Some(Role::normalize(raw).ok_or_else(|| ApiError::bad_request("Invalid role"))?),
        None => None,
    };

    let users = UserRepository::new(state.pool.clone());
    let user = match role_filter {
        Some(role) => users.find_by_email_and_role(email, role).await?,
        None => users.find_by_email(email).await?,
    }
    .ok_or_else(|| ApiError::bad_request("User Not Found"))?;

    if !password::verify_password(raw_password, &user.password).await? {
        return Err(ApiError::bad_request("Invalid email or Password"));
    }

    let token = auth::generate_session_token(user.id)?;
    let jar = jar.add(auth::session_cookie(token));

    Ok((
        jar,
        Json(json!({
            "message": "User Logged In Successfully",
            "user": user.public(),
        })),
    ))
}

/// GET /api/auth/user/logout - clear the session cookie
pub async fn logout(jar: CookieJar) -> (CookieJar, Json<Value>) {
    let jar = jar.add(auth::clear_session_cookie());
    (jar, Json(json!({ "message": "User Logged Out Successfully" })))
}

/// GET /api/auth/me - resolve the current session to a fresh identity
pub async fn me(Extension(user): Extension<CurrentUser>) -> Json<Value> {
    Json(json!({
        "user": user_json(user.id, &user.email, &user.full_name, user.address.as_deref(), user.role),
    }))
}

/// PUT /api/auth/change-password
pub async fn change_password(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<ChangePasswordRequest>,
) -> Result<Json<Value>, ApiError> {
    let (current_password, new_password) = match (&payload.current_password, &payload.new_password) {
        (Some(current), Some(new)) => (current, new),
        _ => {
            return Err(ApiError::validation_error(
                "Current password and new password are required",
                None,
            ))
        }
    };
    validate::validate_new_password(new_password)
        .map_err(|msg| ApiError::validation_error(msg, None))?;

    let users = UserRepository::new(state.pool.clone());
    let user = users
        .find_by_id(current.id)
        .await?
        .ok_or_else(|| ApiError::not_found("User not found"))?;

    if !password::verify_password(current_password, &user.password).await? {
        return Err(ApiError::bad_request("Current password is incorrect"));
    }

    let password_hash = password::hash_password(new_password).await?;
    users.update_password(user.id, &password_hash).await?;

    Ok(success_message("Password changed successfully"))
}

/// PUT /api/auth/profile - update the session user's name and address
pub async fn update_profile(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Json(payload): Json<UpdateProfileRequest>,
) -> Result<Json<Value>, ApiError> {
    let name = payload.name.as_deref().unwrap_or_default();
    validate::validate_profile_name(name).map_err(|msg| ApiError::validation_error(msg, None))?;
    validate::validate_address(payload.address.as_deref())
        .map_err(|msg| ApiError::validation_error(msg, None))?;

    UserRepository::new(state.pool.clone())
        .update_profile(current.id, name, payload.address.as_deref())
        .await?;

    Ok(success_message("Profile updated successfully"))
}

/// POST /api/auth/forgot-password - issue a reset token.
///
/// The response is identical whether or not the email exists; an unknown
/// address is only logged. The token itself goes to the notification
/// collaborator (here: the log, at debug level) - never into the response.
pub async fn forgot_password(
    State(state): State<AppState>,
    Json(payload): Json<ForgotPasswordRequest>,
) -> Result<Json<Value>, ApiError> {
    let email = payload.email.as_deref().unwrap_or_default();
    validate::validate_email(email)
        .map_err(|_| ApiError::validation_error("Please provide a valid email address", None))?;

    let users = UserRepository::new(state.pool.clone());
    match users.find_by_email(email).await? {
        Some(user) => {
            let token = Uuid::new_v4().simple().to_string();
            let expiry = Utc::now() + Duration::minutes(RESET_TOKEN_TTL_MINUTES);
            users.set_reset_token(user.id, &token, expiry).await?;
            tracing::debug!(user_id = user.id, "Issued password reset token: {}", token);
        }
        None => {
            tracing::warn!("Password reset requested for unknown email");
        }
    }

    Ok(success_message(
        "Password reset instructions have been sent to your email",
    ))
}

/// POST /api/auth/reset-password - consume a reset token
pub async fn reset_password(
    State(state): State<AppState>,
    Json(payload): Json<ResetPasswordRequest>,
) -> Result<Json<Value>, ApiError> {
    let token = match payload.token.as_deref() {
        Some(token) if !token.is_empty() => token,
        _ => return Err(ApiError::validation_error("Reset token is required", None)),
    };
    let new_password = payload.new_password.as_deref().unwrap_or_default();
    validate::validate_new_password(new_password)
        .map_err(|msg| ApiError::validation_error(msg, None))?;

    let users = UserRepository::new(state.pool.clone());
    let user = users
        .find_by_valid_reset_token(token)
        .await?
        .ok_or_else(|| ApiError::bad_request("Invalid or expired reset token"))?;

    let password_hash = password::hash_password(new_password).await?;
    users.reset_password(user.id, &password_hash).await?;

    Ok(success_message("Password has been reset successfully"))
}
