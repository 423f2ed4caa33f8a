// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Postgres-backed job store.

use crate::models::ids::{JobId, UrlId};
use crate::models::job::{Job, NormalizedUrl, UrlRecord};
use crate::services::job_store::JobStore;
use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::postgres::{PgPool, PgPoolOptions};

/// Job store persisting jobs, URLs and pending markers in Postgres
#[derive(Clone)]
pub struct PgJobStore {
    pool: PgPool,
}

impl PgJobStore {
    /// Connect to Postgres with a pool of at most `max_connections` connections
    pub async fn connect(database_url: &str, max_connections: u32) -> Result<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(max_connections)
            .connect(database_url)
            .await
            .context("Failed to connect to database")?;
        Ok(Self { pool })
    }

    /// Create or update the job tables
    pub async fn migrate(&self) -> Result<()> {
        sqlx::migrate!("./migrations")
            .run(&self.pool)
            .await
            .context("Failed to run migrations")?;
        Ok(())
    }

    /// Load a job and its URLs in member order
    pub async fn get_job(&self, id: JobId) -> Result<Option<Job>> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM job WHERE id = $1)")
            .bind(id.0)
            .fetch_one(&self.pool)
            .await?;
        if !exists {
            return Ok(None);
        }

        let rows: Vec<(i64, String)> = sqlx::query_as(
            "SELECT u.id, u.url
             FROM job_url ju
             JOIN url u ON u.id = ju.url_id
             WHERE ju.job_id = $1
             ORDER BY ju.position",
        )
        .bind(id.0)
        .fetch_all(&self.pool)
        .await?;

        let urls = rows
            .into_iter()
            .map(|(url_id, url)| UrlRecord {
                url_id: UrlId(url_id),
                url,
            })
            .collect();

        Ok(Some(Job { id, urls }))
    }

    /// Number of URLs of a job still marked pending
    pub async fn count_pending(&self, job_id: JobId) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM url_pending WHERE job_id = $1")
            .bind(job_id.0)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

#[async_trait]
impl JobStore for PgJobStore {
    async fn create_job_from_urls(&self, urls: &[NormalizedUrl]) -> Result<Job> {
        let mut tx = self.pool.begin().await?;

        let job_id: i64 = sqlx::query_scalar("INSERT INTO job DEFAULT VALUES RETURNING id")
            .fetch_one(&mut *tx)
            .await
            .context("Failed to insert job")?;

        // Upserts lock existing url rows until commit; taking them in url order
        // keeps concurrent jobs sharing urls from deadlocking
        let mut by_url: Vec<(usize, &NormalizedUrl)> = urls.iter().enumerate().collect();
        by_url.sort_by(|a, b| a.1.as_str().cmp(b.1.as_str()));

        let mut records = Vec::with_capacity(urls.len());
        for (position, url) in by_url {
            // The no-op update makes RETURNING yield the id of an existing row
            let url_id: i64 = sqlx::query_scalar(
                "INSERT INTO url (url) VALUES ($1)
                 ON CONFLICT (url) DO UPDATE SET url = EXCLUDED.url
                 RETURNING id",
            )
            .bind(url.as_str())
            .fetch_one(&mut *tx)
            .await
            .with_context(|| format!("Failed to upsert url {url}"))?;

            let position = i32::try_from(position).context("Too many urls in one job")?;
            sqlx::query("INSERT INTO job_url (job_id, url_id, position) VALUES ($1, $2, $3)")
                .bind(job_id)
                .bind(url_id)
                .bind(position)
                .execute(&mut *tx)
                .await
                .context("Failed to link url to job")?;

            records.push((
                position,
                UrlRecord {
                    url_id: UrlId(url_id),
                    url: url.as_str().to_string(),
                },
            ));
        }

        tx.commit().await.context("Failed to commit job")?;

        records.sort_by_key(|(position, _)| *position);
        Ok(Job {
            id: JobId(job_id),
            urls: records.into_iter().map(|(_, record)| record).collect(),
        })
    }

    async fn add_pending(&self, job_id: JobId, origin_id: UrlId, url_id: UrlId) -> Result<()> {
        sqlx::query(
            "INSERT INTO url_pending (job_id, origin_id, url_id) VALUES ($1, $2, $3)
             ON CONFLICT DO NOTHING",
        )
        .bind(job_id.0)
        .bind(origin_id.0)
        .bind(url_id.0)
        .execute(&self.pool)
        .await
        .context("Failed to add pending url")?;
        Ok(())
    }
}
