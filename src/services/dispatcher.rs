// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Fan-out of created jobs onto the crawl work queue.
//!
//! Ingestion hands each created job to the [`Dispatcher`] as a [`DispatchTask`]
//! and returns to the caller right away. A fixed pool of workers drains the
//! task channel; a job is always dispatched by a single worker, one URL after
//! the other, so its URLs reach the queue in job order. Jobs handled by
//! different workers interleave freely.
//!
//! Dispatch is best effort. A failed pending-mark or publish is logged and the
//! remaining URLs are still dispatched; nothing is retried or rolled back.

use crate::models::ids::JobId;
use crate::models::job::{Job, UrlRecord};
use crate::models::queue::QueueWorkItem;
use crate::services::job_store::JobStore;
use crate::services::logging::redact_url;
use crate::services::queue::QueuePublisher;
use anyhow::{anyhow, Result};
use std::sync::Arc;
use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

/// A created job waiting to be published
#[derive(Debug, Clone)]
pub struct DispatchTask {
    pub job_id: JobId,
    pub urls: Vec<UrlRecord>,
    pub force_crawl: bool,
}

impl DispatchTask {
    pub fn new(job: Job, force_crawl: bool) -> Self {
        Self {
            job_id: job.id,
            urls: job.urls,
            force_crawl,
        }
    }
}

/// Outcome of dispatching one job
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DispatchReport {
    pub job_id: JobId,
    pub published: usize,
    pub pending_failures: usize,
    pub publish_failures: usize,
}

impl DispatchReport {
    fn new(job_id: JobId) -> Self {
        Self {
            job_id,
            published: 0,
            pending_failures: 0,
            publish_failures: 0,
        }
    }

    pub fn is_complete(&self) -> bool {
        self.pending_failures == 0 && self.publish_failures == 0
    }
}

/// Mark every URL of the job pending and publish a seed work item for it, in job order.
pub async fn dispatch_job(
    store: &dyn JobStore,
    publisher: &dyn QueuePublisher,
    task: DispatchTask,
) -> DispatchReport {
    let mut report = DispatchReport::new(task.job_id);

    for record in &task.urls {
        // Pending tracking is advisory; publish regardless
        if let Err(e) = store
            .add_pending(task.job_id, record.url_id, record.url_id)
            .await
        {
            warn!(
                job_id = %task.job_id,
                url_id = %record.url_id,
                url = %redact_url(&record.url),
                "Failed to add job URL to pending list: {:#}",
                e
            );
            report.pending_failures += 1;
        }

        let item = QueueWorkItem::seed(task.job_id, record.url_id, task.force_crawl);
        match publisher.send(&item).await {
            Ok(()) => {
                debug!(job_id = %task.job_id, url_id = %record.url_id, "Published work item");
                report.published += 1;
            }
            Err(e) => {
                error!(
                    job_id = %task.job_id,
                    url_id = %record.url_id,
                    url = %redact_url(&record.url),
                    "Failed to publish work item: {:#}",
                    e
                );
                report.publish_failures += 1;
            }
        }
    }

    report
}

/// Sizing of the dispatch worker pool
#[derive(Debug, Clone, Copy)]
pub struct DispatcherConfig {
    /// Number of concurrently dispatched jobs
    pub workers: usize,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self { workers: 4 }
    }
}

/// Handle used by ingestion to hand jobs to the dispatch workers
#[derive(Clone)]
pub struct Dispatcher {
    task_tx: mpsc::UnboundedSender<DispatchTask>,
}

impl Dispatcher {
    /// Spawn the worker pool. Must be called from within a Tokio runtime.
    pub fn start(
        store: Arc<dyn JobStore>,
        publisher: Arc<dyn QueuePublisher>,
        config: DispatcherConfig,
    ) -> (Self, DispatchPool) {
        let worker_count = config.workers.max(1);

        let (task_tx, task_rx) = mpsc::unbounded_channel();
        let task_rx = Arc::new(Mutex::new(task_rx));

        let workers = (0..worker_count)
            .map(|id| {
                let worker = DispatchWorker {
                    id,
                    store: store.clone(),
                    publisher: publisher.clone(),
                    task_rx: task_rx.clone(),
                };
                tokio::spawn(worker.run())
            })
            .collect();

        info!(workers = worker_count, "Dispatch pool started");

        (Self { task_tx }, DispatchPool { workers })
    }

    /// Queue a job for dispatch. Never waits: tasks buffer until a worker is free.
    pub fn enqueue(&self, task: DispatchTask) -> Result<()> {
        self.task_tx
            .send(task)
            .map_err(|e| anyhow!("dispatch pool is shut down, job {} not dispatched", e.0.job_id))
    }
}

/// The running dispatch workers
pub struct DispatchPool {
    workers: Vec<JoinHandle<()>>,
}

impl DispatchPool {
    /// Wait for the workers to finish.
    ///
    /// Workers exit once every [`Dispatcher`] handle has been dropped and the
    /// buffered tasks are dispatched.
    pub async fn shutdown(self) {
        for handle in self.workers {
            if let Err(e) = handle.await {
                error!("Dispatch worker terminated abnormally: {}", e);
            }
        }
        info!("Dispatch pool stopped");
    }
}

struct DispatchWorker {
    id: usize,
    store: Arc<dyn JobStore>,
    publisher: Arc<dyn QueuePublisher>,
    task_rx: Arc<Mutex<mpsc::UnboundedReceiver<DispatchTask>>>,
}

impl DispatchWorker {
    async fn run(self) {
        debug!(worker = self.id, "Dispatch worker started");

        loop {
            let next = self.task_rx.lock().await.recv().await;
            let Some(task) = next else {
                break;
            };

            let job_id = task.job_id;
            let url_count = task.urls.len();
            let store = self.store.clone();
            let publisher = self.publisher.clone();

            // A panicking collaborator takes down this job only, not the worker
            let outcome = tokio::spawn(async move {
                dispatch_job(store.as_ref(), publisher.as_ref(), task).await
            })
            .await;

            match outcome {
                Ok(report) if report.is_complete() => {
                    info!(
                        worker = self.id,
                        job_id = %job_id,
                        published = report.published,
                        "Job dispatched"
                    );
                }
                Ok(report) => {
                    warn!(
                        worker = self.id,
                        job_id = %job_id,
                        urls = url_count,
                        published = report.published,
                        pending_failures = report.pending_failures,
                        publish_failures = report.publish_failures,
                        "Job partially dispatched"
                    );
                }
                Err(e) => {
                    error!(worker = self.id, job_id = %job_id, "Job dispatch aborted: {}", e);
                }
            }
        }

        debug!(worker = self.id, "Dispatch worker stopped");
    }
}
