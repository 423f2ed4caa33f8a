// SPDX-License-Identifier: BSD-3-Clause
// Copyright (c) 2026 Aleksandr Ptakhin

use crate::error::IngestError;
use crate::models::job::NormalizedUrl;
use crate::services::normalizer::normalize_url;
use std::collections::HashSet;

/// Normalize a batch of submitted lines into an ordered, duplicate-free URL list.
///
/// Blank lines are skipped. The first line that fails normalization rejects
/// the whole batch. Duplicates keep their first position. An empty result is
/// returned as-is; deciding whether that is an error is up to the caller.
pub fn dedupe_lines<'a, I>(lines: I) -> Result<Vec<NormalizedUrl>, IngestError>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut seen: HashSet<NormalizedUrl> = HashSet::new();
    let mut urls = Vec::new();

    for line in lines {
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let url = normalize_url(line).map_err(|source| IngestError::InvalidUrl {
            line: line.to_string(),
            source,
        })?;

        if seen.insert(url.clone()) {
            urls.push(url);
        }
    }

    Ok(urls)
}
