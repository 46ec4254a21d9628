pub mod password;

use axum_extra::extract::cookie::{Cookie, SameSite};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};

use crate::config;

/// Session claims. The token carries only the user id - role, name and
/// everything else authorization-relevant is re-read from the database on
/// every request.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub id: i64,
    pub exp: i64,
    pub iat: i64,
}

impl Claims {
    pub fn new(user_id: i64) -> Self {
        let now = Utc::now();
        let expiry_hours = config::config().security.jwt_expiry_hours;
        let exp = (now + Duration::hours(expiry_hours as i64)).timestamp();

        Self {
            id: user_id,
            exp,
            iat: now.timestamp(),
        }
    }
}

#[derive(Debug)]
pub enum JwtError {
    TokenGeneration(String),
    InvalidToken(String),
    InvalidSecret,
}

impl std::fmt::Display for JwtError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JwtError::TokenGeneration(msg) => write!(f, "JWT generation error: {}", msg),
            JwtError::InvalidToken(msg) => write!(f, "Invalid JWT token: {}", msg),
            JwtError::InvalidSecret => write!(f, "Invalid JWT secret"),
        }
    }
}

impl std::error::Error for JwtError {}

pub fn generate_session_token(user_id: i64) -> Result<String, JwtError> {
    let secret = &config::config().security.jwt_secret;

    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let encoding_key = EncodingKey::from_secret(secret.as_bytes());
    let header = Header::default();

    encode(&header, &Claims::new(user_id), &encoding_key)
        .map_err(|e| JwtError::TokenGeneration(e.to_string()))
}

pub fn validate_session_token(token: &str) -> Result<Claims, JwtError> {
    let secret = &config::config().security.jwt_secret;

    if secret.is_empty() {
        return Err(JwtError::InvalidSecret);
    }

    let decoding_key = DecodingKey::from_secret(secret.as_bytes());
    let validation = Validation::default();

    let token_data = decode::<Claims>(token, &decoding_key, &validation)
        .map_err(|e| JwtError::InvalidToken(e.to_string()))?;

    Ok(token_data.claims)
}

/// HTTP-only session cookie carrying the signed token
pub fn session_cookie(token: String) -> Cookie<'static> {
    let security = &config::config().security;
    Cookie::build((security.session_cookie_name.clone(), token))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(security.cookie_secure)
        .build()
}

/// Expired empty cookie used to clear the session on logout
pub fn clear_session_cookie() -> Cookie<'static> {
    let security = &config::config().security;
    Cookie::build((security.session_cookie_name.clone(), String::new()))
        .path("/")
        .http_only(true)
        .same_site(SameSite::Lax)
        .secure(security.cookie_secure)
        .max_age(time::Duration::seconds(0))
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_round_trips_user_id() {
        let token = generate_session_token(42).expect("token");
        let claims = validate_session_token(&token).expect("claims");
        assert_eq!(claims.id, 42);
        assert!(claims.exp > claims.iat);
    }

    #[test]
    fn tampered_token_is_rejected() {
        let token = generate_session_token(7).expect("token");
        let mut tampered = token.clone();
        tampered.pop();
        assert!(validate_session_token(&tampered).is_err());
        assert!(validate_session_token("not-a-token").is_err());
    }

    #[test]
    fn session_cookie_is_http_only() {
        let cookie = session_cookie("abc".to_string());
        assert_eq!(cookie.http_only(), Some(true));
        assert_eq!(cookie.value(), "abc");
    }
}
