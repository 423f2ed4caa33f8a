// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Publishers for the crawl work queue.

use crate::models::queue::QueueWorkItem;
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use tokio::sync::mpsc;

/// Destination of crawl work items.
///
/// Delivery and retry guarantees belong to the queue behind the publisher.
#[async_trait]
pub trait QueuePublisher: Send + Sync {
    async fn send(&self, item: &QueueWorkItem) -> Result<()>;
}

/// Publishes into an in-process channel
#[derive(Clone)]
pub struct ChannelPublisher {
    tx: mpsc::UnboundedSender<QueueWorkItem>,
}

impl ChannelPublisher {
    /// Create a publisher and the receiving end consumers read work items from
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<QueueWorkItem>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self { tx }, rx)
    }
}

#[async_trait]
impl QueuePublisher for ChannelPublisher {
    async fn send(&self, item: &QueueWorkItem) -> Result<()> {
        self.tx
            .send(item.clone())
            .map_err(|_| anyhow!("work queue receiver closed"))
    }
}

/// Publishes each work item as a JSON `POST` to a queue endpoint
#[derive(Clone)]
pub struct HttpPublisher {
    client: reqwest::Client,
    endpoint: String,
}

impl HttpPublisher {
    pub fn new(endpoint: impl Into<String>) -> Result<Self> {
        let endpoint = endpoint.into();
        url::Url::parse(&endpoint).with_context(|| format!("Invalid queue URL: {endpoint}"))?;
        Ok(Self {
            client: reqwest::Client::new(),
            endpoint,
        })
    }
}

#[async_trait]
impl QueuePublisher for HttpPublisher {
    async fn send(&self, item: &QueueWorkItem) -> Result<()> {
        let body = serde_json::to_vec(item)?;

        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .body(body)
            .send()
            .await
            .context("Failed to reach work queue")?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("work queue rejected item with status {status}"));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ids::{JobId, UrlId};

    #[tokio::test]
    async fn test_channel_publisher_delivers_in_order() {
        let (publisher, mut rx) = ChannelPublisher::channel();
        for id in 1..=3 {
            publisher
                .send(&QueueWorkItem::seed(JobId(1), UrlId(id), false))
                .await
                .unwrap();
        }

        for id in 1..=3 {
            let item = rx.recv().await.unwrap();
            assert_eq!(item.url_id, UrlId(id));
        }
    }

    #[tokio::test]
    async fn test_channel_publisher_fails_when_receiver_dropped() {
        let (publisher, rx) = ChannelPublisher::channel();
        drop(rx);

        let result = publisher
            .send(&QueueWorkItem::seed(JobId(1), UrlId(1), false))
            .await;
        assert!(result.is_err());
    }

    #[test]
    fn test_http_publisher_rejects_invalid_endpoint() {
        assert!(HttpPublisher::new("not a url").is_err());
        assert!(HttpPublisher::new("http://queue.local/items").is_ok());
    }

    #[tokio::test]
    async fn test_http_publisher_posts_json() {
        use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
        use std::sync::{Arc, Mutex};

        let received: Arc<Mutex<Vec<QueueWorkItem>>> = Arc::default();
        let app = Router::new()
            .route(
                "/items",
                post(
                    |State(received): State<Arc<Mutex<Vec<QueueWorkItem>>>>,
                     Json(item): Json<QueueWorkItem>| async move {
                        received.lock().unwrap().push(item);
                        StatusCode::ACCEPTED
                    },
                ),
            )
            .with_state(received.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let publisher = HttpPublisher::new(format!("http://{addr}/items")).unwrap();
        let item = QueueWorkItem::seed(JobId(5), UrlId(8), true);
        publisher.send(&item).await.unwrap();

        assert_eq!(received.lock().unwrap().as_slice(), &[item]);
    }

    #[tokio::test]
    async fn test_http_publisher_fails_on_error_status() {
        use axum::{http::StatusCode, routing::post, Router};

        let app = Router::new().route("/items", post(|| async { StatusCode::SERVICE_UNAVAILABLE }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let publisher = HttpPublisher::new(format!("http://{addr}/items")).unwrap();
        let result = publisher
            .send(&QueueWorkItem::seed(JobId(1), UrlId(1), false))
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_http_publisher_reports_unreachable_queue() {
        // Port 9 (discard) is not expected to run an HTTP server
        let publisher = HttpPublisher::new("http://127.0.0.1:9/items").unwrap();
        let result = publisher
            .send(&QueueWorkItem::seed(JobId(1), UrlId(1), false))
            .await;
        assert!(result.is_err());
    }
}
