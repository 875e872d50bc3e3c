//! Database layer: migrations, queries, and cursor management.

use std::collections::BTreeMap;

use serde::Serialize;
use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tracing::{info, warn};

use crate::errors::Result;
use crate::events::{CrowdfundingEvent, EventRecord};

/// Establish a SQLite connection pool and run pending migrations.
pub async fn init_pool(database_url: &str) -> Result<SqlitePool> {
    // Make sure the file is created if it doesn't exist yet.
    let url = if database_url.starts_with("sqlite:") {
        database_url.to_string()
    } else {
        format!("sqlite:{database_url}")
    };
    let url = if url.contains(":memory:") || url.contains('?') {
        url
    } else {
        format!("{url}?mode=rwc")
    };

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await?;

    sqlx::migrate!("./migrations").run(&pool).await?;
    info!("Database migrations applied successfully");
    Ok(pool)
}

// ─────────────────────────────────────────────────────────
// Cursor helpers
// ─────────────────────────────────────────────────────────

/// Read the last-seen ledger from the cursor row.
/// Returns `0` when no cursor has been persisted yet.
pub async fn get_last_ledger(pool: &SqlitePool) -> Result<i64> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT last_ledger FROM indexer_cursor WHERE id = 1")
        .fetch_optional(pool)
        .await?;
    Ok(row.map(|(v,)| v).unwrap_or(0))
}

/// Persist the last-seen ledger and the RPC pagination cursor.
pub async fn save_cursor(
    pool: &SqlitePool,
    last_ledger: i64,
    last_cursor: Option<&str>,
) -> Result<()> {
    sqlx::query("UPDATE indexer_cursor SET last_ledger = ?1, last_cursor = ?2 WHERE id = 1")
        .bind(last_ledger)
        .bind(last_cursor)
        .execute(pool)
        .await?;
    Ok(())
}

/// Read back the raw cursor string (used to resume pagination mid-ledger).
pub async fn get_cursor_string(pool: &SqlitePool) -> Result<Option<String>> {
    let row: Option<(Option<String>,)> =
        sqlx::query_as("SELECT last_cursor FROM indexer_cursor WHERE id = 1")
            .fetch_optional(pool)
            .await?;
    Ok(row.and_then(|(v,)| v))
}

// ─────────────────────────────────────────────────────────
// Event writes
// ─────────────────────────────────────────────────────────

/// Persist a batch of decoded events. Events already stored under the same
/// RPC event id are ignored, so replaying a page is harmless.
pub async fn insert_events(pool: &SqlitePool, events: &[CrowdfundingEvent]) -> Result<usize> {
    let mut tx = pool.begin().await?;
    let mut count = 0usize;
    for ev in events {
        let rows_affected = sqlx::query(
            r#"
            INSERT OR IGNORE INTO events
                (event_id, event_type, project_id, actor, amount, threshold, approve,
                 payload, ledger, timestamp, contract_id, tx_hash)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(&ev.event_id)
        .bind(&ev.event_type)
        .bind(&ev.project_id)
        .bind(&ev.actor)
        .bind(&ev.amount)
        .bind(ev.threshold)
        .bind(ev.approve)
        .bind(&ev.payload)
        .bind(ev.ledger)
        .bind(ev.timestamp)
        .bind(&ev.contract_id)
        .bind(&ev.tx_hash)
        .execute(&mut *tx)
        .await?
        .rows_affected();

        count += rows_affected as usize;
    }
    tx.commit().await?;
    Ok(count)
}

// ─────────────────────────────────────────────────────────
// Event reads
// ─────────────────────────────────────────────────────────

const EVENT_COLUMNS: &str = "id, event_id, event_type, project_id, actor, amount, threshold, \
                             approve, payload, ledger, timestamp, contract_id, tx_hash";

/// Fetch all events for a given project, ordered by ledger ascending.
pub async fn get_events_for_project(
    pool: &SqlitePool,
    project_id: &str,
) -> Result<Vec<EventRecord>> {
    let sql = format!(
        "SELECT {EVENT_COLUMNS} FROM events WHERE project_id = ?1 ORDER BY ledger ASC, id ASC"
    );
    let rows = sqlx::query_as::<_, EventRecord>(&sql)
        .bind(project_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Fetch all events, ordered by ledger ascending.
pub async fn get_all_events(pool: &SqlitePool) -> Result<Vec<EventRecord>> {
    let sql = format!("SELECT {EVENT_COLUMNS} FROM events ORDER BY ledger ASC, id ASC");
    let rows = sqlx::query_as::<_, EventRecord>(&sql)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

// ─────────────────────────────────────────────────────────
// Aggregates
// ─────────────────────────────────────────────────────────

#[derive(Debug, Serialize, PartialEq)]
pub struct DonorTotal {
    pub donor: String,
    /// Sum of gross donations, fee included, as a decimal `i128` string.
    /// The contract's `get_user_donations` reports the net amount instead.
    pub gross_total: String,
    pub donations: u32,
}

/// Per-donor gross totals for a project, largest first.
///
/// Amounts are stored as text since they can exceed SQLite's 64-bit
/// integers, so the sum happens here.
pub async fn get_donor_totals(pool: &SqlitePool, project_id: &str) -> Result<Vec<DonorTotal>> {
    let rows: Vec<(Option<String>, Option<String>)> = sqlx::query_as(
        "SELECT actor, amount FROM events WHERE project_id = ?1 AND event_type = 'donated'",
    )
    .bind(project_id)
    .fetch_all(pool)
    .await?;

    let mut totals: BTreeMap<String, (i128, u32)> = BTreeMap::new();
    for (actor, amount) in rows {
        let (Some(actor), Some(amount)) = (actor, amount) else {
            continue;
        };
        let Ok(amount) = amount.parse::<i128>() else {
            warn!(%actor, %amount, "skipping unparsable donation amount");
            continue;
        };
        let entry = totals.entry(actor).or_insert((0, 0));
        entry.0 = entry.0.saturating_add(amount);
        entry.1 += 1;
    }

    let mut sorted: Vec<(String, (i128, u32))> = totals.into_iter().collect();
    sorted.sort_by(|(a_donor, (a_total, _)), (b_donor, (b_total, _))| {
        b_total.cmp(a_total).then_with(|| a_donor.cmp(b_donor))
    });

    Ok(sorted
        .into_iter()
        .map(|(donor, (total, donations))| DonorTotal {
            donor,
            gross_total: total.to_string(),
            donations,
        })
        .collect())
}

#[derive(Debug, Serialize, PartialEq)]
pub struct ThresholdVotes {
    pub project_id: String,
    pub threshold: i64,
    pub positive: u32,
    pub negative: u32,
    /// `None` while the latest session is still open.
    pub approved: Option<bool>,
}

/// Ballot tallies of one threshold, plus the latest deliberation outcome.
pub async fn get_threshold_votes(
    pool: &SqlitePool,
    project_id: &str,
    threshold: i64,
) -> Result<ThresholdVotes> {
    let (positive, negative): (i64, i64) = sqlx::query_as(
        r#"
        SELECT COALESCE(SUM(CASE WHEN approve THEN 1 ELSE 0 END), 0),
               COALESCE(SUM(CASE WHEN approve THEN 0 ELSE 1 END), 0)
        FROM   events
        WHERE  project_id = ?1 AND threshold = ?2 AND event_type = 'voted'
        "#,
    )
    .bind(project_id)
    .bind(threshold)
    .fetch_one(pool)
    .await?;

    // A deliberation only counts if no session reopened after it.
    let last: Option<(String, Option<bool>)> = sqlx::query_as(
        r#"
        SELECT event_type, approve
        FROM   events
        WHERE  project_id = ?1 AND threshold = ?2 AND event_type IN ('decided', 'vote_open')
        ORDER  BY ledger DESC, id DESC
        LIMIT  1
        "#,
    )
    .bind(project_id)
    .bind(threshold)
    .fetch_optional(pool)
    .await?;

    let approved = match last {
        Some((kind, approve)) if kind == "decided" => approve,
        _ => None,
    };

    Ok(ThresholdVotes {
        project_id: project_id.to_string(),
        threshold,
        positive: positive as u32,
        negative: negative as u32,
        approved,
    })
}
