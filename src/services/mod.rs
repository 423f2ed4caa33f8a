// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

pub mod db;
pub mod dedup;
pub mod dispatcher;
pub mod ingestor;
pub mod job_store;
pub mod logging;
pub mod normalizer;
pub mod queue;
