// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

//! Ingestion front-end of the crawl pipeline.
//!
//! Accepts batches of seed URLs over HTTP, normalizes and deduplicates them,
//! registers a crawl job in the job store, and fans the job's URLs out to the
//! crawl work queue on a pool of background dispatch workers.

pub mod app;
pub mod error;
pub mod models;
pub mod services;
