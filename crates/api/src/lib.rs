//! # Timetable API
//!
//! HTTP adapter for the timetable slot service. Every endpoint goes through
//! [`SlotService`], so validation, conflict detection and error semantics are
//! the same no matter which client calls in.
//!
//! ## Architecture
//!
//! - **Routes**: Define API endpoints and URL structure
//! - **Handlers**: Translate requests into service calls
//! - **Middleware**: Error to status code mapping
//! - **Config**: Environment-driven server settings

/// Configuration module for API settings
pub mod config;
/// Extractors that turn malformed input into validation errors
pub mod extract;
pub mod handlers;
/// Error mapping shared by all handlers
pub mod middleware;
/// Route definitions and API endpoint structure
pub mod routes;

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::http::{HeaderValue, Method, header};
use eyre::{Result, WrapErr};
use timetable_core::service::SlotService;
use timetable_core::store::SlotStore;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

/// Shared application state that is accessible to all request handlers
pub struct ApiState {
    pub slots: SlotService,
}

impl ApiState {
    pub fn new(store: Arc<dyn SlotStore>) -> Self {
        Self {
            slots: SlotService::new(store),
        }
    }
}

/// Installs the global fmt subscriber at the given level.
pub fn init_tracing(level: Level) -> Result<()> {
    let subscriber = FmtSubscriber::builder().with_max_level(level).finish();
    tracing::subscriber::set_global_default(subscriber)
        .wrap_err("Failed to install tracing subscriber")?;
    Ok(())
}

/// Builds the application router with every endpoint attached to `state`.
pub fn router(state: Arc<ApiState>) -> Router {
    Router::new()
        .merge(routes::health::routes())
        .merge(routes::timetable::routes())
        .with_state(state)
}

fn cors_layer(origins: &[String]) -> Result<CorsLayer> {
    let origins = origins
        .iter()
        .map(|origin| {
            origin
                .parse::<HeaderValue>()
                .wrap_err_with(|| format!("Invalid CORS origin: {}", origin))
        })
        .collect::<Result<Vec<_>>>()?;

    Ok(CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .allow_origin(origins))
}

/// Starts the API server on top of the given slot store
///
/// # Example
///
/// ```no_run
/// # async fn run() -> eyre::Result<()> {
/// use std::sync::Arc;
/// use timetable_api::{config::ApiConfig, start_server};
/// use timetable_db::repositories::slot::PgSlotStore;
///
/// let config = ApiConfig::from_env()?;
/// let pool = timetable_db::create_pool(&config.database_url, config.database_max_connections).await?;
/// start_server(config, Arc::new(PgSlotStore::new(pool))).await?;
/// # Ok(())
/// # }
/// ```
pub async fn start_server(config: config::ApiConfig, store: Arc<dyn SlotStore>) -> Result<()> {
    let state = Arc::new(ApiState::new(store));
    let app = router(state);

    // Apply CORS configuration if origins are specified
    let app = match &config.cors_origins {
        Some(origins) => app.layer(cors_layer(origins)?),
        None => app,
    };

    let app = app
        .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout)))
        .layer(TraceLayer::new_for_http());

    let addr = config.server_addr();
    let listener = TcpListener::bind(&addr)
        .await
        .wrap_err_with(|| format!("Failed to bind {}", addr))?;
    info!("Server listening on http://{}", addr);
    axum::serve(listener, app).await?;

    Ok(())
}
