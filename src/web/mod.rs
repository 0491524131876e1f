//! HTTP interface for the calendar service.
//!
//! # Endpoints
//!
//! - `GET /health` - Health check
//! - `GET /{identifier}/contributions` - Recolored calendar. Query parameters
//!   (all optional): `text_color`, `level_0` .. `level_4`, `get_image`.
//!   Returns JSON `{ "svg", "contributions" }`, or an `image/svg+xml`
//!   document when `get_image` is true.

pub mod host;

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Deserializer, Serialize};
use tower_http::cors::{AllowHeaders, AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;
use log::{error, info, warn};

use crate::config::{AllowList, ServerConfig};
use crate::fetch::UpstreamClient;
use crate::pipeline::CalendarService;
use crate::{ColorConfig, Error, RenderMode, RenderOptions, RenderedCalendar};

// ============================================================================
// Application State
// ============================================================================

/// Shared application state for the web API.
#[derive(Clone)]
pub struct AppState {
    /// Calendar pipeline (immutable, shares one connection pool)
    service: CalendarService,
    /// Server configuration
    config: Arc<ServerConfig>,
}

impl AppState {
    pub fn new(config: ServerConfig) -> crate::Result<Self> {
        let upstream = UpstreamClient::new(&config.upstream_url)?;
        Ok(Self {
            service: CalendarService::new(upstream),
            config: Arc::new(config),
        })
    }
}

// ============================================================================
// Request/Response Types
// ============================================================================

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Query parameters for the calendar endpoint. Missing values take the
/// default palette.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CalendarQuery {
    pub text_color: String,
    pub level_0: String,
    pub level_1: String,
    pub level_2: String,
    pub level_3: String,
    pub level_4: String,
    #[serde(deserialize_with = "deserialize_flag")]
    pub get_image: bool,
}

impl Default for CalendarQuery {
    fn default() -> Self {
        let ColorConfig { levels, text } = ColorConfig::default();
        let [level_0, level_1, level_2, level_3, level_4] = levels;
        Self {
            text_color: text,
            level_0,
            level_1,
            level_2,
            level_3,
            level_4,
            get_image: false,
        }
    }
}

impl CalendarQuery {
    pub fn into_options(self) -> RenderOptions {
        RenderOptions {
            colors: ColorConfig {
                levels: [
                    self.level_0,
                    self.level_1,
                    self.level_2,
                    self.level_3,
                    self.level_4,
                ],
                text: self.text_color,
            },
            mode: RenderMode::from_image_flag(self.get_image),
        }
    }
}

/// Accepts `true/false`, `1/0`, `yes/no`, `on/off`, `t/f`, `y/n`, any case.
pub fn parse_flag(raw: &str) -> Option<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" | "1" | "yes" | "on" | "t" | "y" => Some(true),
        "false" | "0" | "no" | "off" | "f" | "n" => Some(false),
        _ => None,
    }
}

fn deserialize_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_flag(&raw)
        .ok_or_else(|| serde::de::Error::custom(format!("invalid boolean value: {:?}", raw)))
}

/// Fragment-mode response body.
#[derive(Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct CalendarResponse {
    /// Transformed calendar markup
    pub svg: String,
    /// Caption text, passed through unmodified
    pub contributions: String,
}

/// API error response.
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiError {
    pub error: String,
}

impl ApiError {
    fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

// ============================================================================
// Handlers
// ============================================================================

async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

async fn get_contributions(
    State(state): State<AppState>,
    Path(identifier): Path<String>,
    Query(query): Query<CalendarQuery>,
) -> Result<Response, (StatusCode, Json<ApiError>)> {
    let options = query.into_options();
    let rendered = state
        .service
        .render(&identifier, &options)
        .await
        .map_err(|e| error_response(&identifier, &e))?;

    Ok(match rendered {
        RenderedCalendar::Fragment { svg, contributions } => {
            Json(CalendarResponse { svg, contributions }).into_response()
        }
        RenderedCalendar::Image(document) => {
            ([(header::CONTENT_TYPE, "image/svg+xml")], document).into_response()
        }
    })
}

/// Map a pipeline failure to a status and a generic body.
fn error_response(identifier: &str, err: &Error) -> (StatusCode, Json<ApiError>) {
    error!("calendar for {} failed: {}", identifier, err);
    let (status, message) = if err.is_upstream() {
        (StatusCode::BAD_GATEWAY, "Upstream unavailable")
    } else if err.is_malformed() {
        (StatusCode::BAD_GATEWAY, "Unexpected upstream markup")
    } else {
        (StatusCode::INTERNAL_SERVER_ERROR, "Internal error")
    };
    (status, Json(ApiError::new(message)))
}

// ============================================================================
// Router Setup
// ============================================================================

/// CORS for read-only cross-origin access.
///
/// Credentials are allowed, so "any origin" mirrors the request's origin
/// instead of answering `*`.
fn cors_layer(origins: &AllowList) -> CorsLayer {
    let allow_origin = match origins {
        AllowList::Any => AllowOrigin::mirror_request(),
        AllowList::Only(list) => AllowOrigin::list(list.iter().filter_map(|origin| {
            HeaderValue::from_str(origin)
                .map_err(|_| warn!("ignoring invalid CORS origin {:?}", origin))
                .ok()
        })),
    };

    CorsLayer::new()
        .allow_origin(allow_origin)
        .allow_methods([Method::GET])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true)
}

/// Creates the router with all endpoints and boundary middleware.
pub fn create_router(state: AppState) -> Router {
    let cors = cors_layer(&state.config.allowed_origins);
    let hosts = state.config.allowed_hosts.clone();

    Router::new()
        .route("/health", get(health_check))
        .route("/{identifier}/contributions", get(get_contributions))
        .layer(cors)
        .layer(middleware::from_fn_with_state(hosts, host::enforce_trusted_host))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Runs the web server until Ctrl-C.
///
/// # Errors
///
/// Returns an error if the listener cannot be bound or the server fails.
pub async fn run_server(config: ServerConfig) -> anyhow::Result<()> {
    let addr: SocketAddr = config.addr;
    let state = AppState::new(config)?;
    let app = create_router(state);

    info!("Starting calendar server on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}
