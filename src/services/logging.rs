// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Tracing setup and redaction of sensitive data in log output.

use crate::models::settings::LogFormat;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_FILTER: &str = "info,crawl_ingest=debug,sqlx=warn,tower_http=info";

/// Install the global tracing subscriber. `RUST_LOG` overrides the default filter.
pub fn init_tracing(format: LogFormat) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| DEFAULT_FILTER.into());
    let registry = tracing_subscriber::registry().with(filter);

    match format {
        LogFormat::Text => registry.with(tracing_subscriber::fmt::layer()).init(),
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json())
            .init(),
    }
}

/// Redact credentials embedded in a URL for logging.
/// Keeps scheme, host, path and query, hides userinfo: "http://***@example.com/"
pub fn redact_url(raw: &str) -> String {
    match url::Url::parse(raw) {
        Ok(mut url) => {
            if url.username().is_empty() && url.password().is_none() {
                return raw.to_string();
            }
            // Setting both fails only for URLs that cannot carry credentials
            let _ = url.set_password(None);
            let _ = url.set_username("***");
            url.to_string()
        }
        // Not a URL we can take apart, so only show where it starts
        Err(_) => match raw.split_once('@') {
            Some((_, rest)) => format!("***@{}", rest),
            None => raw.to_string(),
        },
    }
}
