// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Job store interface and the in-memory implementation.
//!
//! The job store owns job and URL identity: it assigns `JobId`s and `UrlId`s
//! and tracks which URLs of a job are still waiting to be crawled.

use crate::models::ids::{JobId, UrlId};
use crate::models::job::{Job, NormalizedUrl, UrlRecord};
use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::{Mutex, MutexGuard};

/// Durable storage for crawl jobs and their URLs.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Create a job whose members are `urls`, in the given order.
    async fn create_job_from_urls(&self, urls: &[NormalizedUrl]) -> Result<Job>;

    /// Mark `url_id` as awaiting crawl for `job_id`, reached from seed `origin_id`.
    async fn add_pending(&self, job_id: JobId, origin_id: UrlId, url_id: UrlId) -> Result<()>;
}

#[derive(Default)]
struct MemoryState {
    last_job_id: i64,
    last_url_id: i64,
    url_ids: HashMap<String, UrlId>,
    jobs: HashMap<JobId, Job>,
    pending: HashSet<(JobId, UrlId, UrlId)>,
}

/// Job store kept in process memory. Nothing survives a restart.
#[derive(Default)]
pub struct InMemoryJobStore {
    state: Mutex<MemoryState>,
}

impl InMemoryJobStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, MemoryState>> {
        self.state
            .lock()
            .map_err(|_| anyhow!("in-memory job store lock poisoned"))
    }

    /// Look up a previously created job.
    pub fn job(&self, id: JobId) -> Option<Job> {
        self.lock().ok()?.jobs.get(&id).cloned()
    }

    /// Number of jobs created so far.
    pub fn job_count(&self) -> usize {
        self.lock().map(|s| s.jobs.len()).unwrap_or(0)
    }

    /// Whether `url_id` is marked pending for `job_id`.
    pub fn is_pending(&self, job_id: JobId, origin_id: UrlId, url_id: UrlId) -> bool {
        self.lock()
            .map(|s| s.pending.contains(&(job_id, origin_id, url_id)))
            .unwrap_or(false)
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn create_job_from_urls(&self, urls: &[NormalizedUrl]) -> Result<Job> {
        let mut state = self.lock()?;

        state.last_job_id += 1;
        let id = JobId(state.last_job_id);

        let mut records = Vec::with_capacity(urls.len());
        for url in urls {
            let url_id = match state.url_ids.get(url.as_str()) {
                Some(existing) => *existing,
                None => {
                    state.last_url_id += 1;
                    let url_id = UrlId(state.last_url_id);
                    state.url_ids.insert(url.as_str().to_string(), url_id);
                    url_id
                }
            };
            records.push(UrlRecord {
                url_id,
                url: url.as_str().to_string(),
            });
        }

        let job = Job { id, urls: records };
        state.jobs.insert(id, job.clone());
        Ok(job)
    }

    async fn add_pending(&self, job_id: JobId, origin_id: UrlId, url_id: UrlId) -> Result<()> {
        let mut state = self.lock()?;
        if !state.jobs.contains_key(&job_id) {
            return Err(anyhow!("job {job_id} does not exist"));
        }
        state.pending.insert((job_id, origin_id, url_id));
        Ok(())
    }
}
