use axum::{
    http::{header, HeaderValue, Method},
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use serde_json::{json, Value};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use store_rating_api::app_state::AppState;
use store_rating_api::config;
use store_rating_api::database::pool;
use store_rating_api::handlers::{admin, auth, owner, ratings, stores};
use store_rating_api::middleware::{
    require_admin, require_normal_user, require_owner, session_auth_middleware,
};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, JWT_SECRET, etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = config::config();
    tracing::info!("Starting store rating API in {:?} mode", config.environment);

    let database_url = std::env::var("DATABASE_URL").expect("DATABASE_URL must be set");
    let pg = pool::create_pool(&database_url)
        .await
        .unwrap_or_else(|e| panic!("failed to connect to database: {}", e));

    if config.database.run_migrations {
        pool::run_migrations(&pg)
            .await
            .unwrap_or_else(|e| panic!("failed to run migrations: {}", e));
    }

    let ratings_available = pool::ratings_relation_available(&pg).await;
    if !ratings_available {
        tracing::warn!("Ratings relation unavailable - aggregates degrade to zero");
    }

    let state = AppState::new(pg, ratings_available);
    let app = app(state);

    // Allow tests or deployments to override port via env
    let port = std::env::var("STORE_API_PORT")
        .ok()
        .or_else(|| std::env::var("PORT").ok())
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("Store rating API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}

fn app(state: AppState) -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        // Feature areas
        .merge(auth_routes(state.clone()))
        .merge(admin_routes(state.clone()))
        .merge(store_routes(state.clone()))
        .merge(rating_routes(state.clone()))
        .merge(owner_routes(state.clone()))
        // Global middleware
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

fn auth_routes(state: AppState) -> Router<AppState> {
    let session = axum_middleware::from_fn_with_state(state, session_auth_middleware);

    Router::new()
        // Session-bound endpoints
        .route("/api/auth/me", get(auth::me))
        .route("/api/auth/change-password", put(auth::change_password))
        .route(
            "/api/auth/profile",
            put(auth::update_profile).post(auth::update_profile),
        )
        .layer(session)
        // Open endpoints
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/auth/user/logout", get(auth::logout))
        .route("/api/auth/forgot-password", post(auth::forgot_password))
        .route("/api/auth/reset-password", post(auth::reset_password))
}

fn admin_routes(state: AppState) -> Router<AppState> {
    let session = axum_middleware::from_fn_with_state(state, session_auth_middleware);

    Router::new()
        .route("/api/admin/dashboard", get(admin::dashboard::stats))
        .route(
            "/api/admin/users",
            get(admin::users::list).post(admin::users::create),
        )
        .route(
            "/api/admin/users/:id",
            get(admin::users::detail)
                .put(admin::users::update)
                .delete(admin::users::remove),
        )
        .route(
            "/api/admin/stores",
            get(admin::stores::list).post(admin::stores::create),
        )
        .route("/api/admin/stores/:id", delete(admin::stores::remove))
        .layer(axum_middleware::from_fn(require_admin))
        .layer(session)
}

fn store_routes(state: AppState) -> Router<AppState> {
    let session = axum_middleware::from_fn_with_state(state.clone(), session_auth_middleware);

    let owner_only = Router::new()
        .route(
            "/api/stores/profile",
            get(stores::get_profile)
                .post(stores::upsert_profile)
                .put(stores::upsert_profile)
                .delete(stores::delete_profile),
        )
        .layer(axum_middleware::from_fn(require_owner))
        .layer(session.clone());

    let admin_only = Router::new()
        .route("/api/stores/all", get(stores::all_stores))
        .layer(axum_middleware::from_fn(require_admin))
        .layer(session.clone());

    let authenticated = Router::new()
        .route(
            "/api/stores/public/authenticated",
            get(stores::public_stores_authenticated),
        )
        .layer(session);

    Router::new()
        .route("/api/stores/public", get(stores::public_stores))
        .merge(owner_only)
        .merge(admin_only)
        .merge(authenticated)
}

fn rating_routes(state: AppState) -> Router<AppState> {
    let session = axum_middleware::from_fn_with_state(state.clone(), session_auth_middleware);

    let own_rating = Router::new()
        .route(
            "/api/ratings/:store_id",
            get(ratings::get_user_rating)
                .post(ratings::create_or_update)
                .delete(ratings::delete_rating),
        )
        .layer(axum_middleware::from_fn(require_normal_user))
        .layer(session.clone());

    let store_ratings = Router::new()
        .route("/api/ratings/store/:store_id", get(ratings::store_ratings))
        .layer(session);

    own_rating.merge(store_ratings)
}

fn owner_routes(state: AppState) -> Router<AppState> {
    let session = axum_middleware::from_fn_with_state(state, session_auth_middleware);

    Router::new()
        .route("/api/owner/my-ratings", get(owner::my_ratings))
        .layer(axum_middleware::from_fn(require_owner))
        .layer(session)
}

fn cors_layer() -> CorsLayer {
    let origins: Vec<HeaderValue> = config::config()
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}

async fn root() -> axum::response::Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    axum::response::Json(json!({
        "success": true,
        "data": {
            "name": "Store Rating API",
            "version": version,
            "description": "Role-based store rating service built with Rust (Axum)",
            "endpoints": {
                "home": "/ (public)",
                "auth": "/api/auth/* (register, login, session, password recovery)",
                "admin": "/api/admin/* (Admin - user/store management, dashboard)",
                "stores": "/api/stores/profile (Owner), /api/stores/public[/authenticated]",
                "ratings": "/api/ratings/:storeId (Normal User), /api/ratings/store/:storeId",
                "owner": "/api/owner/my-ratings (Owner)",
            }
        }
    }))
}

async fn health(
    axum::extract::State(state): axum::extract::State<AppState>,
) -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match pool::health_check(&state.pool).await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            axum::response::Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            axum::response::Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}
