//! HTTP surface for page-rendering collaborators.
//!
//! - `GET /health` - liveness, never touches providers
//! - `GET /api/languages[?discover=true]` - language selector table
//! - `POST /api/translate` - one text or a batch of post fields
//! - `GET /api/metrics` - gateway status, guarded by `X-Debug-Key`

use crate::config::Config;
use crate::security::debug_key_matches;
use crate::translation::{translate_fields, GatewayStatus, Translate, TranslationGateway};
use anyhow::{Context, Result};
use axum::{
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

pub const DEBUG_KEY_HEADER: &str = "x-debug-key";

pub struct AppState {
    pub gateway: Arc<TranslationGateway>,
    pub debug_key: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    #[error("Request needs either `text` or `fields`")]
    MissingText,

    #[error("Invalid debug key")]
    Unauthorized,

    #[error("Not found")]
    NotFound,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self {
            ApiError::MissingText => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized => StatusCode::UNAUTHORIZED,
            ApiError::NotFound => StatusCode::NOT_FOUND,
        };

        (status, Json(serde_json::json!({ "error": self.to_string() }))).into_response()
    }
}

#[derive(Debug, Deserialize)]
pub struct TranslateRequest {
    #[serde(default)]
    pub text: Option<String>,
    #[serde(default)]
    pub fields: Option<Vec<String>>,
    #[serde(default)]
    pub source: Option<String>,
    pub target: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct TranslateResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub translated: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<Vec<String>>,
    pub source: String,
    pub target: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct LanguagesQuery {
    #[serde(default)]
    pub discover: bool,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/languages", get(languages))
        .route("/api/translate", post(translate))
        .route("/api/metrics", get(metrics))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn languages(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LanguagesQuery>,
) -> Json<BTreeMap<String, String>> {
    if query.discover {
        Json(state.gateway.discover_languages().await)
    } else {
        Json(state.gateway.get_supported_languages())
    }
}

async fn translate(
    State(state): State<Arc<AppState>>,
    Json(request): Json<TranslateRequest>,
) -> Result<Json<TranslateResponse>, ApiError> {
    let source = request.source.unwrap_or_else(|| "en".to_string());
    let gateway = state.gateway.as_ref();

    let response = match (request.text, request.fields) {
        (_, Some(fields)) => TranslateResponse {
            translated: None,
            fields: Some(
                translate_fields(gateway, fields.as_slice(), &source, &request.target).await,
            ),
            source,
            target: request.target,
        },
        (Some(text), None) => TranslateResponse {
            translated: Some(gateway.translate(&text, &source, &request.target).await),
            fields: None,
            source,
            target: request.target,
        },
        (None, None) => return Err(ApiError::MissingText),
    };

    Ok(Json(response))
}

async fn metrics(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<Json<GatewayStatus>, ApiError> {
    let Some(configured) = state.debug_key.as_deref() else {
        return Err(ApiError::NotFound);
    };

    let presented = headers
        .get(DEBUG_KEY_HEADER)
        .and_then(|value| value.to_str().ok());

    if !debug_key_matches(Some(configured), presented) {
        warn!("Rejected metrics request with invalid debug key");
        return Err(ApiError::Unauthorized);
    }

    Ok(Json(state.gateway.status()))
}

/// Bind the configured port and serve until Ctrl+C or SIGTERM.
pub async fn serve(config: &Config, gateway: Arc<TranslationGateway>) -> Result<()> {
    let state = Arc::new(AppState {
        gateway,
        debug_key: config.debug_key.clone(),
    });

    let address = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    info!("Server running on {}", address);

    axum::serve(listener, router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to install Ctrl+C handler: {}", e);
            std::future::pending::<()>().await;
        }
        info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
