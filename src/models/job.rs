// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use crate::models::ids::{JobId, UrlId};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A URL that passed normalization.
///
/// Always has an `http` or `https` scheme and a non-empty host, and re-parses
/// with `url::Url::parse` without error. The string form is the identity used
/// for deduplication and storage.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NormalizedUrl(String);

impl NormalizedUrl {
    /// Only the normalizer constructs these.
    pub(crate) fn new_unchecked(url: String) -> Self {
        Self(url)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for NormalizedUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A stored URL belonging to exactly one job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UrlRecord {
    pub url_id: UrlId,
    pub url: String,
}

/// A crawl job as created by the job store. Member URLs keep submission order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Job {
    pub id: JobId,
    pub urls: Vec<UrlRecord>,
}
