//! Event poller: pulls contract events from RPC into SQLite.

use std::time::Duration;

use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::config::Config;
use crate::db;
use crate::errors::Result;
use crate::events::{decode_rows, CrowdfundingEvent};
use crate::rpc::{EventsStart, RpcClient, PAGE_LIMIT};

/// Poll until `cancel` fires. Errors are logged and retried on the next tick.
pub async fn run(pool: SqlitePool, rpc: RpcClient, config: Config, cancel: CancellationToken) {
    let interval = Duration::from_secs(config.poll_interval_secs);
    info!(
        contract = %config.contract_id,
        interval_secs = config.poll_interval_secs,
        "Event poller started"
    );

    loop {
        // Drain full pages back to back, then wait.
        let outcome = poll_once(&pool, &rpc, config.start_ledger).await;
        let full_page = match outcome {
            Ok(fetched) => fetched >= PAGE_LIMIT as usize,
            Err(e) => {
                error!("Poll failed: {e}");
                false
            }
        };

        if full_page {
            if cancel.is_cancelled() {
                break;
            }
            continue;
        }

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(interval) => {}
        }
    }
    info!("Event poller stopped");
}

/// Fetch one page of events and store it. Returns the number of events fetched.
pub async fn poll_once(pool: &SqlitePool, rpc: &RpcClient, start_ledger: i64) -> Result<usize> {
    let last_ledger = db::get_last_ledger(pool).await?;
    let start = match db::get_cursor_string(pool).await? {
        Some(cursor) => EventsStart::Cursor(cursor),
        None if last_ledger > 0 => EventsStart::Ledger(last_ledger),
        None if start_ledger > 0 => EventsStart::Ledger(start_ledger),
        None => EventsStart::Ledger(rpc.latest_ledger().await?),
    };
    debug!(?start, "Requesting events");

    let page = rpc.get_events(&start).await?;
    let fetched = page.events.len();

    let decoded: Vec<CrowdfundingEvent> = page
        .events
        .iter()
        .flat_map(|raw| match decode_rows(raw) {
            Ok(rows) => rows,
            Err(e) => {
                warn!(event_id = %raw.id, "Skipping undecodable event: {e}");
                Vec::new()
            }
        })
        .collect();

    let inserted = db::insert_events(pool, &decoded).await?;

    let newest = page
        .events
        .iter()
        .map(|e| e.ledger)
        .max()
        .unwrap_or(last_ledger)
        .max(last_ledger);
    let cursor = page.cursor.as_deref().or(match &start {
        EventsStart::Cursor(c) => Some(c.as_str()),
        EventsStart::Ledger(_) => None,
    });
    db::save_cursor(pool, newest, cursor).await?;

    if inserted > 0 {
        info!(inserted, latest_ledger = page.latest_ledger, "Indexed new events");
    }
    Ok(fetched)
}
