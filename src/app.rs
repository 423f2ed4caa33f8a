// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Application state, route handlers, and router construction.
//!
//! This module is `pub` so that integration tests can build a test router directly
//! without starting the full binary.

use crate::error::IngestError;
use crate::models::queue::JobScheduledResponse;
use crate::models::version::VersionResponse;
use crate::services::ingestor::JobIngestor;
use crate::services::logging::redact_url;
use axum::{
    body::Bytes,
    extract::{rejection::BytesRejection, DefaultBodyLimit, RawQuery, State},
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use tower_http::trace::TraceLayer;
use tracing::warn;

/// Application version extracted from `Cargo.toml` at compile time.
/// The patch segment can be overridden via `INGEST_PATCH_VERSION` (see `build.rs`).
pub const VERSION: &str = env!("INGEST_VERSION");

/// Query parameter that makes crawlers bypass their crawl cache for the job
pub const FORCE_CRAWL_PARAM: &str = "forceCrawl";

/// Largest accepted schedule request body
pub const MAX_BODY_BYTES: usize = 8 * 1024 * 1024;

// ---------------------------------------------------------------------------
// Application state
// ---------------------------------------------------------------------------

/// Shared application state injected into every route handler via `State<AppState>`.
#[derive(Clone)]
pub struct AppState {
    pub ingestor: JobIngestor,
}

// ---------------------------------------------------------------------------
// Route handlers
// ---------------------------------------------------------------------------

pub async fn version_handler() -> Json<VersionResponse> {
    Json(VersionResponse {
        service: "crawl-ingest".to_string(),
        version: VERSION.to_string(),
    })
}

/// Schedule a crawl job from a newline-separated list of URLs.
///
/// ```text
/// curl -X POST --data-binary @- "http://localhost:8080/?forceCrawl" << EOF
/// https://www.example.com
/// example.org
/// EOF
/// ```
///
/// The presence of `forceCrawl` in the query string, with or without a value,
/// makes crawlers ignore previously crawled results for every URL of the job.
pub async fn schedule_job_handler(
    State(state): State<AppState>,
    RawQuery(query): RawQuery,
    body: Result<Bytes, BytesRejection>,
) -> Result<Json<JobScheduledResponse>, IngestError> {
    let force_crawl = query.as_deref().is_some_and(has_force_crawl);

    let body = body.map_err(|rejection| {
        warn!("Schedule job request body rejected: {}", rejection.body_text());
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            IngestError::BodyTooLarge {
                limit: MAX_BODY_BYTES,
            }
        } else {
            IngestError::UnreadableBody
        }
    })?;

    let body = std::str::from_utf8(&body).map_err(|_| {
        warn!("Schedule job request body is not valid UTF-8");
        IngestError::UnreadableBody
    })?;

    match state.ingestor.ingest(body, force_crawl).await {
        Ok(job_id) => Ok(Json(JobScheduledResponse { job_id })),
        Err(e) => {
            match &e {
                IngestError::InvalidUrl { line, source } => {
                    warn!(url = %redact_url(line), "Schedule job request rejected: {}", source)
                }
                IngestError::DependencyFailure(cause) => {
                    warn!("Schedule job failed to create job: {:#}", cause)
                }
                other => warn!("Schedule job request rejected: {}", other),
            }
            Err(e)
        }
    }
}

pub async fn method_not_allowed_handler() -> impl IntoResponse {
    (
        StatusCode::METHOD_NOT_ALLOWED,
        [(header::ALLOW, "POST")],
        "MethodNotAllowed",
    )
}

fn has_force_crawl(query: &str) -> bool {
    url::form_urlencoded::parse(query.as_bytes()).any(|(key, _)| key == FORCE_CRAWL_PARAM)
}

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

/// Build the Axum application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route(
            "/",
            post(schedule_job_handler).fallback(method_not_allowed_handler),
        )
        .route("/version", get(version_handler))
        .layer(DefaultBodyLimit::max(MAX_BODY_BYTES))
        .with_state(state)
        .layer(TraceLayer::new_for_http())
}
