// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Canonicalization of submitted job URLs.

use crate::error::UrlError;
use crate::models::job::NormalizedUrl;
use url::{ParseError, Url};

/// Scheme assumed for input such as `www.example.com`
const DEFAULT_SCHEME: &str = "http";

/// Validate and canonicalize a single job URL.
///
/// The URL must carry a host, and its scheme, when present, must be `http` or
/// `https`. Input without a scheme gets `http`. The returned string is the URL
/// serialized by the `url` crate with the fragment dropped; a bare root path
/// with no query is written without its trailing slash.
pub fn normalize_url(raw: &str) -> Result<NormalizedUrl, UrlError> {
    if raw.starts_with('/') {
        return Err(UrlError::MissingHost);
    }

    let mut url = match Url::parse(raw) {
        Ok(url) => url,
        Err(ParseError::RelativeUrlWithoutBase) => {
            Url::parse(&format!("{DEFAULT_SCHEME}://{raw}"))?
        }
        Err(e) => return Err(e.into()),
    };

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(UrlError::UnsupportedScheme(url.scheme().to_string()));
    }

    if url.host_str().map_or(true, str::is_empty) {
        return Err(UrlError::MissingHost);
    }

    url.set_fragment(None);

    let bare_root = url.path() == "/" && url.query().is_none();
    let mut canonical = String::from(url);
    if bare_root && canonical.ends_with('/') {
        canonical.pop();
    }

    Ok(NormalizedUrl::new_unchecked(canonical))
}
