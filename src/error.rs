// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Error types for URL validation and job ingestion.

use crate::models::queue::ErrorResponse;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use thiserror::Error;

/// Why a single URL was rejected by the normalizer.
#[derive(Debug, Error, PartialEq)]
pub enum UrlError {
    #[error("URL does not have a host")]
    MissingHost,
    #[error("URL cannot be parsed: {0}")]
    Unparseable(#[from] url::ParseError),
    #[error("URL scheme '{0}' is not http or https")]
    UnsupportedScheme(String),
}

/// Failure of an ingestion request.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("Invalid URL: {line}")]
    InvalidUrl {
        line: String,
        #[source]
        source: UrlError,
    },
    #[error("No URLs provided")]
    EmptyBatch,
    #[error("Unexpected error in input")]
    UnreadableBody,
    #[error("Request body exceeds {limit} bytes")]
    BodyTooLarge { limit: usize },
    #[error("Create Job Failed")]
    DependencyFailure(#[source] anyhow::Error),
}

impl IngestError {
    /// Error code written to the response body.
    ///
    /// `DependancyFailure` keeps the spelling existing clients match on.
    pub fn code(&self) -> &'static str {
        match self {
            IngestError::InvalidUrl { .. }
            | IngestError::EmptyBatch
            | IngestError::UnreadableBody => "BadRequest",
            IngestError::BodyTooLarge { .. } => "PayloadTooLarge",
            IngestError::DependencyFailure(_) => "DependancyFailure",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            IngestError::DependencyFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
            IngestError::BodyTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for IngestError {
    fn into_response(self) -> Response {
        let body = ErrorResponse {
            code: self.code().to_string(),
            message: self.to_string(),
        };
        (self.status(), Json(body)).into_response()
    }
}
