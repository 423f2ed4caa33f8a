// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use crate::error::IngestError;
use crate::models::ids::JobId;
use crate::models::job::NormalizedUrl;
use crate::services::dedup::dedupe_lines;
use crate::services::dispatcher::{DispatchTask, Dispatcher};
use crate::services::job_store::JobStore;
use std::sync::Arc;
use tracing::{error, info};

/// Turns validated URL batches into stored jobs and hands them to dispatch.
///
/// Job creation is the durability boundary: once the store has created the
/// job its id is returned, whatever happens during dispatch.
#[derive(Clone)]
pub struct JobIngestor {
    store: Arc<dyn JobStore>,
    dispatcher: Dispatcher,
}

impl JobIngestor {
    pub fn new(store: Arc<dyn JobStore>, dispatcher: Dispatcher) -> Self {
        Self { store, dispatcher }
    }

    /// Parse a newline-separated request body and schedule its URLs as one job.
    pub async fn ingest(&self, body: &str, force_crawl: bool) -> Result<JobId, IngestError> {
        let urls = dedupe_lines(body.lines())?;
        if urls.is_empty() {
            return Err(IngestError::EmptyBatch);
        }
        self.schedule_job(urls, force_crawl).await
    }

    /// Create a job for `urls` and queue it for dispatch without waiting for it.
    pub async fn schedule_job(
        &self,
        urls: Vec<NormalizedUrl>,
        force_crawl: bool,
    ) -> Result<JobId, IngestError> {
        if urls.is_empty() {
            return Err(IngestError::EmptyBatch);
        }

        let job = self
            .store
            .create_job_from_urls(&urls)
            .await
            .map_err(IngestError::DependencyFailure)?;
        let job_id = job.id;

        info!(
            job_id = %job_id,
            urls = job.urls.len(),
            force_crawl,
            "Job created"
        );

        if let Err(e) = self.dispatcher.enqueue(DispatchTask::new(job, force_crawl)) {
            error!(job_id = %job_id, "Failed to queue job for dispatch: {:#}", e);
        }

        Ok(job_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ids::UrlId;
    use crate::models::job::Job;
    use crate::models::queue::QueueWorkItem;
    use crate::services::dispatcher::DispatcherConfig;
    use crate::services::job_store::InMemoryJobStore;
    use crate::services::queue::{ChannelPublisher, QueuePublisher};
    use anyhow::{anyhow, Result};
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::mpsc::UnboundedReceiver;

    /// Store that refuses to create jobs and counts attempts.
    #[derive(Default)]
    struct UnavailableStore {
        create_calls: AtomicUsize,
    }

    #[async_trait]
    impl JobStore for UnavailableStore {
        async fn create_job_from_urls(&self, _urls: &[NormalizedUrl]) -> Result<Job> {
            self.create_calls.fetch_add(1, Ordering::SeqCst);
            Err(anyhow!("connection refused"))
        }

        async fn add_pending(&self, _job_id: JobId, _origin_id: UrlId, _url_id: UrlId) -> Result<()> {
            Ok(())
        }
    }

    fn ingestor_with(store: Arc<dyn JobStore>) -> (JobIngestor, UnboundedReceiver<QueueWorkItem>) {
        let (publisher, rx) = ChannelPublisher::channel();
        let (dispatcher, _pool) = Dispatcher::start(
            store.clone(),
            Arc::new(publisher),
            DispatcherConfig::default(),
        );
        (JobIngestor::new(store, dispatcher), rx)
    }

    async fn next_item(rx: &mut UnboundedReceiver<QueueWorkItem>) -> QueueWorkItem {
        tokio::time::timeout(Duration::from_secs(5), rx.recv())
            .await
            .expect("timed out waiting for work item")
            .expect("queue closed")
    }

    #[tokio::test]
    async fn test_ingest_creates_job_and_dispatches() {
        let store = Arc::new(InMemoryJobStore::new());
        let (ingestor, mut rx) = ingestor_with(store.clone());

        let job_id = ingestor
            .ingest("https://a.com\nhttp://b.com\nhttps://a.com", false)
            .await
            .unwrap();

        let job = store.job(job_id).unwrap();
        assert_eq!(job.urls.len(), 2);

        let first = next_item(&mut rx).await;
        let second = next_item(&mut rx).await;
        assert_eq!(first.url_id, job.urls[0].url_id);
        assert_eq!(second.url_id, job.urls[1].url_id);
        for item in [first, second] {
            assert_eq!(item.job_id, job_id);
            assert_eq!(item.refer_id, UrlId::INVALID);
            assert!(!item.force_crawl);
        }
    }

    #[tokio::test]
    async fn test_force_crawl_propagates() {
        let store = Arc::new(InMemoryJobStore::new());
        let (ingestor, mut rx) = ingestor_with(store);

        ingestor.ingest("a.com\nb.com", true).await.unwrap();

        assert!(next_item(&mut rx).await.force_crawl);
        assert!(next_item(&mut rx).await.force_crawl);
    }

    #[tokio::test]
    async fn test_blank_body_is_empty_batch() {
        let store = Arc::new(UnavailableStore::default());
        let (ingestor, _rx) = ingestor_with(store.clone());

        let err = ingestor.ingest("\n\n  \n", false).await.unwrap_err();
        assert!(matches!(err, IngestError::EmptyBatch));
        assert_eq!(store.create_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_invalid_line_never_reaches_store() {
        let store = Arc::new(UnavailableStore::default());
        let (ingestor, _rx) = ingestor_with(store.clone());

        let err = ingestor
            .ingest("http://a.com\nftp://b.com\nhttp://c.com", false)
            .await
            .unwrap_err();
        assert!(matches!(err, IngestError::InvalidUrl { .. }));
        assert_eq!(store.create_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_store_failure_is_dependency_failure_without_dispatch() {
        let store = Arc::new(UnavailableStore::default());
        let (ingestor, mut rx) = ingestor_with(store.clone());

        let err = ingestor.ingest("http://a.com", false).await.unwrap_err();
        assert!(matches!(err, IngestError::DependencyFailure(_)));
        assert_eq!(store.create_calls.load(Ordering::SeqCst), 1);

        let nothing = tokio::time::timeout(Duration::from_millis(100), rx.recv()).await;
        assert!(nothing.is_err(), "no work item should be published");
    }

    #[tokio::test]
    async fn test_schedule_job_rejects_empty_list() {
        let store = Arc::new(UnavailableStore::default());
        let (ingestor, _rx) = ingestor_with(store.clone());

        let err = ingestor.schedule_job(Vec::new(), false).await.unwrap_err();
        assert!(matches!(err, IngestError::EmptyBatch));
        assert_eq!(store.create_calls.load(Ordering::SeqCst), 0);
    }

    /// Publisher whose `send` never completes, keeping every worker busy.
    struct StuckPublisher;

    #[async_trait]
    impl QueuePublisher for StuckPublisher {
        async fn send(&self, _item: &QueueWorkItem) -> Result<()> {
            std::future::pending().await
        }
    }

    #[tokio::test]
    async fn test_ingest_returns_while_dispatch_is_saturated() {
        let store = Arc::new(InMemoryJobStore::new());
        let (dispatcher, _pool) = Dispatcher::start(
            store.clone(),
            Arc::new(StuckPublisher),
            DispatcherConfig { workers: 1 },
        );
        let ingestor = JobIngestor::new(store.clone(), dispatcher);

        for n in 0..4 {
            let body = format!("http://saturated{n}.example.com");
            let job_id = tokio::time::timeout(
                Duration::from_millis(500),
                ingestor.ingest(&body, false),
            )
            .await
            .expect("ingest waited on dispatch")
            .unwrap();
            assert!(store.job(job_id).is_some());
        }
        assert_eq!(store.job_count(), 4);
    }
}
