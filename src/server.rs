//! HTTP surface over the enrichment controller
//!
//! - `POST /api/enrich` with `{"url": "...", "force": false}` runs (or joins)
//!   an enrichment and returns the result.
//! - `GET /api/enrich?url=...` returns the cached entry without any network call.
//!
//! Failures are returned as `{"error": message}`.

use std::net::SocketAddr;

use axum::{
    Json, Router,
    extract::{Query, State, rejection::JsonRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use crate::enrichment::{Enricher, EnrichmentError, ErrorKind, Refresh};
use crate::subject::EnrichmentRequest;

#[derive(Debug, Deserialize)]
pub struct EnrichBody {
    #[serde(default)]
    url: String,
    #[serde(default)]
    force: bool,
}

#[derive(Debug, Deserialize)]
pub struct CachedQuery {
    #[serde(default)]
    url: String,
}

/// Error response for the HTTP surface
#[derive(Debug)]
pub enum ApiError {
    Enrichment(EnrichmentError),
    BadRequest(String),
    NotFound(String),
}

impl From<EnrichmentError> for ApiError {
    fn from(err: EnrichmentError) -> Self {
        ApiError::Enrichment(err)
    }
}

fn status_for(kind: ErrorKind) -> StatusCode {
    match kind {
        ErrorKind::InvalidInput => StatusCode::BAD_REQUEST,
        ErrorKind::UpstreamFetch | ErrorKind::Generation => StatusCode::BAD_GATEWAY,
        ErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
        ErrorKind::Configuration | ErrorKind::SchemaValidation | ErrorKind::Internal => {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, message) = match self {
            ApiError::Enrichment(err) => (status_for(err.kind()), err.to_string()),
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message),
        };
        (status, Json(json!({ "error": message }))).into_response()
    }
}

pub fn router(enricher: Enricher) -> Router {
    Router::new()
        .route("/api/enrich", post(enrich).get(cached))
        .with_state(enricher)
}

pub async fn serve(addr: SocketAddr, enricher: Enricher) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(addr = %listener.local_addr()?, "Listening");
    axum::serve(listener, router(enricher)).await
}

async fn enrich(
    State(enricher): State<Enricher>,
    body: Result<Json<EnrichBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError> {
    let Json(body) = body.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let refresh = if body.force { Refresh::Force } else { Refresh::IfMissing };

    let result = enricher
        .enrich_with(&EnrichmentRequest::new(body.url), refresh)
        .await?;
    Ok(Json(result))
}

async fn cached(
    State(enricher): State<Enricher>,
    Query(query): Query<CachedQuery>,
) -> Result<impl IntoResponse, ApiError> {
    match enricher.get_cached(&query.url).await? {
        Some(result) => Ok(Json(result)),
        None => Err(ApiError::NotFound(format!(
            "No enrichment cached for {}",
            query.url.trim()
        ))),
    }
}
