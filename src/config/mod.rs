use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::env;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    pub environment: Environment,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub jwt_expiry_hours: u64,
    pub session_cookie_name: String,
    pub cookie_secure: bool,
    pub cors_origins: Vec<String>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let environment = match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            _ => Environment::Development,
        };

        // Set defaults based on environment, then override with specific env vars
        match environment {
            Environment::Production => Self::production(),
            Environment::Development => Self::development(),
        }
        .with_env_overrides()
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_ACQUIRE_TIMEOUT_SECS") {
            self.database.acquire_timeout_secs = v.parse().unwrap_or(self.database.acquire_timeout_secs);
        }
        if let Ok(v) = env::var("DATABASE_RUN_MIGRATIONS") {
            self.database.run_migrations = v.parse().unwrap_or(self.database.run_migrations);
        }
        if let Ok(v) = env::var("JWT_SECRET") {
            self.security.jwt_secret = v;
        }
        if let Ok(v) = env::var("SECURITY_JWT_EXPIRY_HOURS") {
            self.security.jwt_expiry_hours = v.parse().unwrap_or(self.security.jwt_expiry_hours);
        }
        if let Ok(v) = env::var("SECURITY_SESSION_COOKIE_NAME") {
            self.security.session_cookie_name = v;
        }
        if let Ok(v) = env::var("SECURITY_COOKIE_SECURE") {
            self.security.cookie_secure = v.parse().unwrap_or(self.security.cookie_secure);
        }
        if let Ok(v) = env::var("SECURITY_CORS_ORIGINS") {
            self.security.cors_origins = v.split(',').map(|s| s.trim().to_string()).collect();
        }
        self
    }

    fn development() -> Self {
        Self {
            environment: Environment::Development,
            database: DatabaseConfig {
                max_connections: 10,
                acquire_timeout_secs: 30,
                run_migrations: true,
            },
            security: SecurityConfig {
                // Overridden by JWT_SECRET; a fixed value keeps local setup friction-free
                jwt_secret: "dev-only-secret".to_string(),
                jwt_expiry_hours: 24 * 7,
                session_cookie_name: "token".to_string(),
                cookie_secure: false,
                cors_origins: vec![
                    "http://localhost:5173".to_string(),
                    "http://localhost:5174".to_string(),
                ],
            },
        }
    }

    fn production() -> Self {
        Self {
            environment: Environment::Production,
            database: DatabaseConfig {
                max_connections: 50,
                acquire_timeout_secs: 5,
                run_migrations: false,
            },
            security: SecurityConfig {
                // Must come from JWT_SECRET; token issuance fails on an empty secret
                jwt_secret: String::new(),
                jwt_expiry_hours: 24,
                session_cookie_name: "token".to_string(),
                cookie_secure: true,
                cors_origins: vec![],
            },
        }
    }
}

// Global singleton config - initialized once at startup
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);

// Convenience function for accessing config
pub fn config() -> &'static AppConfig {
    &CONFIG
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn development_defaults() {
        let config = AppConfig::development();
        assert!(config.database.run_migrations);
        assert!(!config.security.cookie_secure);
        assert_eq!(config.security.session_cookie_name, "token");
    }

    #[test]
    fn production_defaults() {
        let config = AppConfig::production();
        assert!(!config.database.run_migrations);
        assert!(config.security.cookie_secure);
        assert!(config.security.jwt_secret.is_empty());
    }
}
