// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use clap::{Parser, ValueEnum};
use std::net::SocketAddr;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

impl std::fmt::Display for LogFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogFormat::Text => write!(f, "text"),
            LogFormat::Json => write!(f, "json"),
        }
    }
}

/// Service settings. Every flag can also be supplied through its environment variable.
#[derive(Debug, Clone, Parser)]
#[command(name = "crawl-ingest", about = "Crawl job ingestion service", version = env!("INGEST_VERSION"))]
pub struct Settings {
    /// Address the HTTP API binds to
    #[arg(long, env = "INGEST_LISTEN_ADDR", default_value = "0.0.0.0:8080")]
    pub listen_addr: SocketAddr,

    /// Postgres connection string. Jobs are kept in memory when unset.
    #[arg(long, env = "DATABASE_URL")]
    pub database_url: Option<String>,

    #[arg(long, env = "DATABASE_MAX_CONNECTIONS", default_value_t = 10)]
    pub database_max_connections: u32,

    /// HTTP endpoint work items are POSTed to. Items are logged locally when unset.
    #[arg(long, env = "QUEUE_URL")]
    pub queue_url: Option<String>,

    /// Number of background dispatch workers
    #[arg(long, env = "DISPATCH_WORKERS", default_value_t = 4, value_parser = clap::value_parser!(u16).range(1..))]
    pub dispatch_workers: u16,

    #[arg(long, env = "LOG_FORMAT", value_enum, default_value_t = LogFormat::Text)]
    pub log_format: LogFormat,
}
