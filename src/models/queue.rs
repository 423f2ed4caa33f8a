// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use crate::models::ids::{JobId, UrlId};
use serde::{Deserialize, Serialize};

/// Work item published to the crawl queue, one per URL to crawl.
///
/// Seed URLs of a job carry `origin_id == url_id` and an invalid `refer_id`.
/// URLs discovered by crawlers reuse the same shape with their origin seed and
/// referring page filled in.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueWorkItem {
    pub job_id: JobId,
    pub origin_id: UrlId,
    pub url_id: UrlId,
    pub refer_id: UrlId,
    /// Tells crawlers to ignore their "already crawled" cache for this URL
    pub force_crawl: bool,
}

impl QueueWorkItem {
    /// Work item for a top-level URL of a job.
    pub fn seed(job_id: JobId, url_id: UrlId, force_crawl: bool) -> Self {
        Self {
            job_id,
            origin_id: url_id,
            url_id,
            refer_id: UrlId::INVALID,
            force_crawl,
        }
    }

    pub fn is_seed(&self) -> bool {
        self.origin_id == self.url_id && !self.refer_id.is_valid()
    }
}

/// Response to a successfully scheduled job
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobScheduledResponse {
    pub job_id: JobId,
}

/// Error body returned by the ingest endpoint
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub code: String,
    pub message: String,
}
