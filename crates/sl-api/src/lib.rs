use anyhow::Result;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::get;
use axum::{Json, Router};
use serde::Serialize;
use sl_core::db::{self, DbPool};
use sl_core::http::HttpLimits;
use sl_core::{config, http, logging, server};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tower_http::services::ServeDir;

mod contact;
mod tracking;


pub const SERVICE_NAME: &str = "sl-api";

#[derive(Clone)]
pub struct AppState {
    pool: DbPool,
}

impl AppState {
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(Debug, Serialize)]
struct ErrorResponse {
    code: &'static str,
    message: String,
}

#[derive(Debug)]
pub(crate) struct ApiError {
    status: StatusCode,
    code: &'static str,
    message: String,
}

impl ApiError {
    fn new(status: StatusCode, code: &'static str, message: impl Into<String>) -> Self {
        Self {
            status,
            code,
            message: message.into(),
        }
    }

    fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "BAD_REQUEST", message)
    }

    fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, "SERVER_ERROR", message)
    }
}

impl From<sqlx::Error> for ApiError {
    fn from(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db_err) = &err {
            if db_err.is_unique_violation() {
                return ApiError::new(StatusCode::CONFLICT, "CONFLICT", "Duplicate number");
            }
        }
        tracing::error!(error = %err, "database error");
        ApiError::internal("Server error")
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(err: serde_json::Error) -> Self {
        tracing::error!(error = %err, "stored document is not valid json");
        ApiError::internal("Server error")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let payload = ErrorResponse {
            code: self.code,
            message: self.message,
        };
        (self.status, Json(payload)).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

#[derive(Serialize)]
struct HealthStatus {
    status: String,
}

pub struct ApiConfig {
    pub addr: SocketAddr,
    pub database_url: String,
    pub static_dir: Option<PathBuf>,
    pub http: HttpLimits,
}

pub fn load_config() -> Result<ApiConfig> {
    let addr = config::socket_addr_from_env("SL_API_ADDR", "0.0.0.0:4000")?;
    let database_url = config::env_or("DATABASE_URL", "sqlite://data/swiftlogistics.db?mode=rwc");
    let static_dir = config::optional_env("SL_STATIC_DIR").map(PathBuf::from);

    let defaults = HttpLimits::default();
    let http = HttpLimits {
        request_timeout: Duration::from_secs(config::u64_from_env(
            "SL_API_REQUEST_TIMEOUT_SECS",
            defaults.request_timeout.as_secs(),
        )?),
        body_limit: usize::try_from(config::u64_from_env(
            "SL_API_BODY_LIMIT_BYTES",
            defaults.body_limit as u64,
        )?)?,
        cors_origins: config::optional_env("SL_API_CORS_ORIGINS")
            .map(|raw| HttpLimits::parse_origins(&raw))
            .transpose()?
            .unwrap_or_default(),
    };

    Ok(ApiConfig {
        addr,
        database_url,
        static_dir,
        http,
    })
}

pub async fn migrate(pool: &DbPool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    Ok(())
}

/// Migrates the store and returns the fully layered application router.
pub async fn app(
    pool: DbPool,
    static_dir: Option<PathBuf>,
    limits: &HttpLimits,
) -> Result<Router> {
    migrate(&pool).await?;
    let router = build_router(AppState::new(pool), static_dir);
    Ok(http::apply_standard_layers(router, SERVICE_NAME, limits))
}

pub async fn run(config: ApiConfig) -> Result<()> {
    logging::init(SERVICE_NAME);
    let pool = db::connect(&config.database_url).await?;
    let router = app(pool, config.static_dir, &config.http).await?;
    server::serve(config.addr, router).await
}

pub(crate) fn build_router(state: AppState, static_dir: Option<PathBuf>) -> Router {
    let api = Router::new()
        .route(
            "/tracking",
            get(tracking::list_tracking).post(tracking::upsert_tracking),
        )
        .route(
            "/tracking/{number}",
            get(tracking::get_tracking).delete(tracking::delete_tracking),
        )
        .route(
            "/contact",
            get(contact::get_contact).post(contact::save_contact),
        )
        .fallback(route_not_found);

    let router = Router::new()
        .route("/healthz", get(healthz))
        .nest("/api", api);

    let router = match static_dir {
        Some(dir) => router.fallback_service(ServeDir::new(dir)),
        None => router.fallback(route_not_found),
    };

    router.with_state(state)
}

async fn healthz(State(state): State<AppState>) -> impl IntoResponse {
    match db::check_ready(&state.pool).await {
        Ok(_) => (StatusCode::OK, Json(HealthStatus { status: "ok".into() })),
        Err(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(HealthStatus {
                status: "unavailable".into(),
            }),
        ),
    }
}

async fn route_not_found() -> ApiError {
    ApiError::not_found("Route not found")
}
