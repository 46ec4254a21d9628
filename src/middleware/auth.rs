use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use axum_extra::extract::CookieJar;

use crate::app_state::AppState;
use crate::auth;
use crate::config;
use crate::database::models::{Role, User};
use crate::database::users::UserRepository;
use crate::error::ApiError;

/// Authenticated user context, re-read from the database on every request.
/// The session token only proves the id; role and profile data are never
/// trusted from token claims.
#[derive(Clone, Debug)]
pub struct CurrentUser {
    pub id: i64,
    pub full_name: String,
    pub email: String,
    pub address: Option<String>,
    pub role: Role,
}

impl From<User> for CurrentUser {
    fn from(user: User) -> Self {
        Self {
            id: user.id,
            full_name: user.full_name,
            email: user.email,
            address: user.address,
            role: user.role,
        }
    }
}

/// Session middleware: resolves the signed cookie to a fresh user record and
/// injects it into the request
pub async fn session_auth_middleware(
    State(state): State<AppState>,
    jar: CookieJar,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let cookie_name = &config::config().security.session_cookie_name;
    let token = jar
        .get(cookie_name)
        .map(|cookie| cookie.value().to_string())
        .ok_or_else(|| ApiError::unauthorized("Access token required"))?;

    let claims = auth::validate_session_token(&token)
        .map_err(|_| ApiError::unauthorized("Invalid token"))?;

    let user = UserRepository::new(state.pool.clone())
        .find_by_id(claims.id)
        .await
        .map_err(|e| {
            tracing::error!("Session user lookup failed: {}", e);
            ApiError::unauthorized("Invalid token")
        })?
        .ok_or_else(|| ApiError::unauthorized("Invalid token"))?;

    request.extensions_mut().insert(CurrentUser::from(user));
    Ok(next.run(request).await)
}

fn authorize(user: &CurrentUser, allowed: &[Role]) -> Result<(), ApiError> {
    if allowed.contains(&user.role) {
        Ok(())
    } else {
        Err(ApiError::forbidden("Access denied. Insufficient permissions"))
    }
}

async fn gate(request: Request, next: Next, allowed: &[Role]) -> Result<Response, ApiError> {
    let user = request
        .extensions()
        .get::<CurrentUser>()
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;
    authorize(user, allowed)?;
    Ok(next.run(request).await)
}

pub async fn require_admin(request: Request, next: Next) -> Result<Response, ApiError> {
    gate(request, next, &[Role::Admin]).await
}

pub async fn require_owner(request: Request, next: Next) -> Result<Response, ApiError> {
    gate(request, next, &[Role::Owner]).await
}

pub async fn require_normal_user(request: Request, next: Next) -> Result<Response, ApiError> {
    gate(request, next, &[Role::NormalUser]).await
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_with_role(role: Role) -> CurrentUser {
        CurrentUser {
            id: 1,
            full_name: "Test Person".to_string(),
            email: "test@example.com".to_string(),
            address: None,
            role,
        }
    }

    #[test]
    fn authorize_checks_role_membership() {
        let admin = user_with_role(Role::Admin);
        let owner = user_with_role(Role::Owner);

        assert!(authorize(&admin, &[Role::Admin]).is_ok());
        assert!(authorize(&owner, &[Role::Admin]).is_err());
        assert!(authorize(&owner, &[Role::Admin, Role::Owner]).is_ok());
    }

    #[test]
    fn forbidden_maps_to_403() {
        let user = user_with_role(Role::NormalUser);
        let err = authorize(&user, &[Role::Admin]).unwrap_err();
        assert_eq!(err.status_code(), 403);
    }
}
