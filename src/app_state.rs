use sqlx::PgPool;

/// Shared application state: the connection pool plus the startup capability
/// probe for the ratings relation. Constructed once in `main` and injected
/// into handlers and middleware - repositories are built from it per request.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
    pub ratings_available: bool,
}

impl AppState {
    pub fn new(pool: PgPool, ratings_available: bool) -> Self {
        Self { pool, ratings_available }
    }
}
