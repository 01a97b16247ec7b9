//! HTTP surface: one `POST` endpoint per provider, plus a health probe

use crate::{
    config::AppConfig,
    error::{SearchError, SearchResult},
    search_businesses,
    types::{BusinessProvider, ProviderKind, SearchRequest},
};
use axum::{
    body::Bytes,
    extract::State,
    http::{header, Method, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::Serialize;
use std::sync::Arc;
use tower_http::cors::CorsLayer;

/// Message returned for failures whose details stay server-side
pub const INTERNAL_ERROR_MESSAGE: &str = "internal error";

/// Shared state: one long-lived adapter per provider
#[derive(Clone)]
pub struct AppState {
    pub domestic: Arc<dyn BusinessProvider>,
    pub international: Arc<dyn BusinessProvider>,
}

impl AppState {
    /// Build both providers from configuration
    pub fn from_config(config: &AppConfig) -> SearchResult<Self> {
        Ok(Self {
            domestic: Arc::new(config.domestic_provider()?),
            international: Arc::new(config.international_provider()?),
        })
    }

    fn provider(&self, kind: ProviderKind) -> &dyn BusinessProvider {
        match kind {
            ProviderKind::Domestic => self.domestic.as_ref(),
            ProviderKind::International => self.international.as_ref(),
        }
    }
}

/// Error envelope: `{ "error": "..." }`
#[derive(Debug, Serialize)]
pub struct ApiError {
    #[serde(skip)]
    status: StatusCode,
    pub error: String,
}

impl ApiError {
    pub fn new(status: StatusCode, error: impl Into<String>) -> Self {
        Self {
            status,
            error: error.into(),
        }
    }
}

impl From<SearchError> for ApiError {
    fn from(error: SearchError) -> Self {
        match error {
            SearchError::InvalidInput(message) => ApiError::new(StatusCode::BAD_REQUEST, message),
            SearchError::Upstream { .. } => {
                ApiError::new(StatusCode::BAD_REQUEST, error.to_string())
            }
            SearchError::ConfigError(message) => {
                log::error!("search rejected, provider is misconfigured: {message}");
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, message)
            }
            other => {
                log::error!("search failed: {other}");
                ApiError::new(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL_ERROR_MESSAGE)
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(self)).into_response()
    }
}

#[derive(Debug, Serialize)]
struct HealthData {
    status: &'static str,
    providers: ProviderHealth,
}

#[derive(Debug, Serialize)]
struct ProviderHealth {
    domestic: bool,
    international: bool,
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([header::CONTENT_TYPE])
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route(ProviderKind::Domestic.route(), post(search_domestic))
        .route(ProviderKind::International.route(), post(search_international))
        .layer(build_cors())
        .with_state(state)
}

async fn health(State(state): State<AppState>) -> impl IntoResponse {
    Json(HealthData {
        status: "ok",
        providers: ProviderHealth {
            domestic: state.domestic.is_configured(),
            international: state.international.is_configured(),
        },
    })
}

async fn search_domestic(State(state): State<AppState>, body: Bytes) -> Response {
    run_search(&state, ProviderKind::Domestic, &body).await
}

async fn search_international(State(state): State<AppState>, body: Bytes) -> Response {
    run_search(&state, ProviderKind::International, &body).await
}

async fn run_search(state: &AppState, kind: ProviderKind, body: &[u8]) -> Response {
    let request = match SearchRequest::from_slice(body) {
        Ok(request) => request,
        Err(error) => {
            log::debug!("rejected {kind} search: {error}");
            return ApiError::from(error).into_response();
        }
    };

    match search_businesses(state.provider(kind), &request).await {
        Ok(response) => (StatusCode::OK, Json(response)).into_response(),
        Err(error) => ApiError::from(error).into_response(),
    }
}

/// Serve until ctrl-c or SIGTERM
pub async fn serve(config: &AppConfig) -> anyhow::Result<()> {
    let state = AppState::from_config(config)?;
    let app = build_app(state);

    let listener = tokio::net::TcpListener::bind(config.bind_addr).await?;
    log::info!("listening on {}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::error!("failed to listen for ctrl-c: {e}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                log::error!("failed to install SIGTERM handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    log::info!("received shutdown signal, starting graceful shutdown");
}
