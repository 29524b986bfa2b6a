//! Analytics service — marketing event ingestion and summary counts.
//!
//! DESIGN
//! ======
//! Public pages fire-and-forget flat events (type, path, locale, device,
//! timestamp). Summaries are a pure fold over the fetched events grouped by
//! event type, device, and locale; only the time window is pushed into SQL.

use std::collections::BTreeMap;

use sqlx::{PgPool, Row};
use uuid::Uuid;

// =============================================================================
// TYPES
// =============================================================================

/// Incoming event payload. Timestamps are epoch milliseconds; absent means now.
#[derive(Debug, serde::Deserialize)]
pub struct EventInput {
    pub event_type: String,
    #[serde(default)]
    pub path: String,
    #[serde(default)]
    pub locale: String,
    #[serde(default)]
    pub device: String,
    pub occurred_at_ms: Option<i64>,
}

/// Row returned from event queries.
#[derive(Debug, Clone, serde::Serialize)]
pub struct EventRow {
    pub event_type: String,
    pub path: String,
    pub locale: String,
    pub device: String,
    pub occurred_at_ms: i64,
}

/// One grouped count in a summary.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct GroupCount {
    pub key: String,
    pub count: u64,
}

/// Summary of events over a window.
#[derive(Debug, serde::Serialize)]
pub struct Summary {
    pub total: u64,
    pub by_event_type: Vec<GroupCount>,
    pub by_device: Vec<GroupCount>,
    pub by_locale: Vec<GroupCount>,
}

// =============================================================================
// RECORD & FETCH
// =============================================================================

/// Record one event.
///
/// # Errors
///
/// Returns a database error if the insert fails.
pub async fn record_event(pool: &PgPool, event: &EventInput) -> Result<Uuid, sqlx::Error> {
    let id = Uuid::new_v4();
    sqlx::query(
        "INSERT INTO analytics_events (id, event_type, path, locale, device, occurred_at) \
         VALUES ($1, $2, $3, $4, $5, \
                 CASE WHEN $6::BIGINT IS NULL THEN now() ELSE to_timestamp($6::BIGINT / 1000.0) END)",
    )
    .bind(id)
    .bind(&event.event_type)
    .bind(&event.path)
    .bind(&event.locale)
    .bind(&event.device)
    .bind(event.occurred_at_ms)
    .execute(pool)
    .await?;
    Ok(id)
}

/// Fetch events inside an optional `[since, until)` window (epoch ms).
///
/// # Errors
///
/// Returns a database error if the query fails.
pub async fn fetch_events(
    pool: &PgPool,
    since_ms: Option<i64>,
    until_ms: Option<i64>,
) -> Result<Vec<EventRow>, sqlx::Error> {
    let rows = sqlx::query(
        "SELECT event_type, path, locale, device, \
                (EXTRACT(EPOCH FROM occurred_at) * 1000)::BIGINT AS occurred_at_ms \
         FROM analytics_events \
         WHERE ($1::BIGINT IS NULL OR occurred_at >= to_timestamp($1::BIGINT / 1000.0)) \
           AND ($2::BIGINT IS NULL OR occurred_at < to_timestamp($2::BIGINT / 1000.0)) \
         ORDER BY occurred_at",
    )
    .bind(since_ms)
    .bind(until_ms)
    .fetch_all(pool)
    .await?;

    Ok(rows
        .iter()
        .map(|row| EventRow {
            event_type: row.get("event_type"),
            path: row.get("path"),
            locale: row.get("locale"),
            device: row.get("device"),
            occurred_at_ms: row.get("occurred_at_ms"),
        })
        .collect())
}

// =============================================================================
// AGGREGATION
// =============================================================================

fn bucket(value: &str) -> &str {
    if value.trim().is_empty() { "unknown" } else { value }
}

fn counts_by<F>(events: &[EventRow], key_of: F) -> Vec<GroupCount>
where
    F: Fn(&EventRow) -> &str,
{
    let mut counts: BTreeMap<String, u64> = BTreeMap::new();
    for event in events {
        *counts.entry(bucket(key_of(event)).to_owned()).or_default() += 1;
    }
    let mut grouped: Vec<GroupCount> = counts
        .into_iter()
        .map(|(key, count)| GroupCount { key, count })
        .collect();
    // Highest volume first; ties stay alphabetical from the BTreeMap.
    grouped.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.key.cmp(&b.key)));
    grouped
}

/// Pure summary over fetched events.
#[must_use]
pub fn summarize(events: &[EventRow]) -> Summary {
    Summary {
        total: events.len() as u64,
        by_event_type: counts_by(events, |e: &EventRow| e.event_type.as_str()),
        by_device: counts_by(events, |e: &EventRow| e.device.as_str()),
        by_locale: counts_by(events, |e: &EventRow| e.locale.as_str()),
    }
}

#[cfg(test)]
#[path = "analytics_test.rs"]
mod tests;
