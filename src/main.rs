// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use anyhow::{Context, Result};
use clap::Parser;
use crawl_ingest::app::{create_router, AppState, VERSION};
use crawl_ingest::models::queue::QueueWorkItem;
use crawl_ingest::models::settings::Settings;
use crawl_ingest::services::db::PgJobStore;
use crawl_ingest::services::dispatcher::{Dispatcher, DispatcherConfig};
use crawl_ingest::services::ingestor::JobIngestor;
use crawl_ingest::services::job_store::{InMemoryJobStore, JobStore};
use crawl_ingest::services::logging::init_tracing;
use crawl_ingest::services::queue::{ChannelPublisher, HttpPublisher, QueuePublisher};
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<()> {
    let settings = Settings::parse();
    init_tracing(settings.log_format);

    info!("crawl-ingest v{} starting", VERSION);

    let store = build_store(&settings).await?;
    let publisher = build_publisher(&settings)?;

    let (dispatcher, pool) = Dispatcher::start(
        store.clone(),
        publisher,
        DispatcherConfig {
            workers: usize::from(settings.dispatch_workers),
        },
    );

    let state = AppState {
        ingestor: JobIngestor::new(store, dispatcher),
    };
    let app = create_router(state);

    let listener = tokio::net::TcpListener::bind(settings.listen_addr)
        .await
        .with_context(|| format!("Failed to bind to {}", settings.listen_addr))?;

    info!("crawl-ingest v{} listening on {}", VERSION, settings.listen_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("HTTP server error")?;

    // The router, and with it the last dispatcher handle, is gone once serve returns
    info!("HTTP server stopped, draining dispatch queue");
    pool.shutdown().await;

    Ok(())
}

async fn build_store(settings: &Settings) -> Result<Arc<dyn JobStore>> {
    match &settings.database_url {
        Some(database_url) => {
            let store =
                PgJobStore::connect(database_url, settings.database_max_connections).await?;
            store.migrate().await?;
            info!("Connected to Postgres job store");
            Ok(Arc::new(store))
        }
        None => {
            warn!("DATABASE_URL not set, jobs are kept in memory and lost on restart");
            Ok(Arc::new(InMemoryJobStore::new()))
        }
    }
}

fn build_publisher(settings: &Settings) -> Result<Arc<dyn QueuePublisher>> {
    match &settings.queue_url {
        Some(queue_url) => {
            info!("Publishing work items to {}", queue_url);
            Ok(Arc::new(HttpPublisher::new(queue_url.as_str())?))
        }
        None => {
            warn!("QUEUE_URL not set, work items are only logged");
            let (publisher, rx) = ChannelPublisher::channel();
            tokio::spawn(log_work_items(rx));
            Ok(Arc::new(publisher))
        }
    }
}

async fn log_work_items(mut rx: UnboundedReceiver<QueueWorkItem>) {
    while let Some(item) = rx.recv().await {
        match serde_json::to_string(&item) {
            Ok(json) => info!(target: "crawl_ingest::work_queue", "{}", json),
            Err(e) => warn!("Failed to serialize work item: {}", e),
        }
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
