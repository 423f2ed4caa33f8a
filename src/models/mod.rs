// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

pub mod ids;
pub mod job;
pub mod queue;
pub mod settings;
pub mod version;
