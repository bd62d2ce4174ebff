//! Pull readings from an upstream sensor API.
//!
//! The API is cursor-paginated: each page is
//! `{ "results": [SensorReading, ...], "next_cursor": "..." | null }`.
//! A batch is all-or-nothing: one malformed item fails the whole fetch.

use anyhow::{anyhow, Context, Result};
use serde_json::Value;

use crate::models::SensorReading;

// ---

/// Fetch every page (up to `max_pages`) starting at `base_url`.
pub async fn fetch_readings(
    client: &reqwest::Client,
    base_url: &str,
    max_pages: u32,
) -> Result<Vec<SensorReading>> {
    // ---
    let mut all_data = Vec::new();
    let mut cursor: Option<String> = None;
    let mut page_count = 0;

    loop {
        if page_count >= max_pages {
            tracing::debug!(
                "Hit page limit of {}, stopping pagination. Fetched {} records so far.",
                max_pages,
                all_data.len()
            );
            break;
        }
        page_count += 1;

        let url = match &cursor {
            Some(cursor) => format!("{}?cursor={}", base_url, cursor),
            None => base_url.to_string(),
        };

        tracing::debug!("Fetching page {} from: {}", page_count, url);

        let response: Value = client
            .get(&url)
            .send()
            .await
            .with_context(|| format!("request to {} failed", url))?
            .error_for_status()?
            .json()
            .await
            .with_context(|| format!("page {} is not valid JSON", page_count))?;

        let (readings, next) = parse_page(&response)
            .with_context(|| format!("page {} from {} rejected", page_count, url))?;

        tracing::debug!("Page {} yielded {} readings", page_count, readings.len());
        all_data.extend(readings);
        cursor = next;

        if cursor.is_none() {
            break;
        }
    }

    tracing::info!(
        "Finished fetching {} total records from {} pages",
        all_data.len(),
        page_count
    );
    Ok(all_data)
}

/// Split one page into its readings and the next cursor.
fn parse_page(page: &Value) -> Result<(Vec<SensorReading>, Option<String>)> {
    // ---
    let results = page
        .get("results")
        .and_then(|d| d.as_array())
        .ok_or_else(|| anyhow!("response missing 'results' array"))?;

    let readings = results
        .iter()
        .enumerate()
        .map(|(i, item)| {
            serde_json::from_value::<SensorReading>(item.clone())
                .with_context(|| format!("malformed item {}: {}", i, item))
        })
        .collect::<Result<Vec<_>>>()?;

    let next = page
        .get("next_cursor")
        .and_then(|c| c.as_str())
        .map(String::from);

    Ok((readings, next))
}
