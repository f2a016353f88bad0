//! Long-running background task that polls the Soroban RPC and writes
//! decoded sale events to the database.

use std::sync::Arc;
use std::time::Duration;

use reqwest::Client;
use sqlx::SqlitePool;
use tokio_util::sync::CancellationToken;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::db;
use crate::rpc;

pub struct IndexerState {
    pub pool: SqlitePool,
    pub config: Config,
    pub client: Client,
}

/// Run the indexer loop until `cancel` fires.
pub async fn run(state: Arc<IndexerState>, cancel: CancellationToken) {
    info!(contract = %state.config.contract_id, "Indexer starting");

    let (mut current_ledger, mut cursor) =
        resume_point(&state.pool, state.config.start_ledger).await;

    info!("Resuming from ledger {current_ledger}");

    loop {
        let polled = tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            polled = poll_once(
                &state.pool,
                &state.client,
                &state.config,
                current_ledger,
                cursor.as_deref(),
            ) => polled,
        };

        match polled {
            Ok((next_ledger, next_cursor)) => {
                current_ledger = next_ledger;
                cursor = next_cursor;
            }
            Err(e) => {
                error!("Indexer poll error: {e}");
            }
        }

        tokio::select! {
            biased;
            _ = cancel.cancelled() => break,
            _ = tokio::time::sleep(Duration::from_secs(state.config.poll_interval_secs)) => {}
        }
    }

    info!(ledger = current_ledger, "Indexer stopped");
}

/// Load the saved cursor; fall back to `start_ledger` when none is stored
/// or it cannot be read.
async fn resume_point(pool: &SqlitePool, start_ledger: u32) -> (u32, Option<String>) {
    let last_ledger = match db::get_last_ledger(pool).await {
        Ok(ledger) => ledger,
        Err(e) => {
            warn!("Could not read saved ledger, starting from {start_ledger}: {e}");
            0
        }
    };
    let cursor = match db::get_cursor_string(pool).await {
        Ok(cursor) => cursor,
        Err(e) => {
            warn!("Could not read saved cursor, paging from the start: {e}");
            None
        }
    };

    if last_ledger > 0 {
        (last_ledger as u32, cursor)
    } else {
        (start_ledger, cursor)
    }
}

/// Perform a single poll iteration.
///
/// Returns `(next_start_ledger, next_cursor)`.
async fn poll_once(
    pool: &SqlitePool,
    client: &Client,
    config: &Config,
    start_ledger: u32,
    cursor: Option<&str>,
) -> crate::errors::Result<(u32, Option<String>)> {
    let (raw_events, next_cursor, latest_ledger) = rpc::fetch_events(
        client,
        &config.rpc_url,
        &config.contract_id,
        start_ledger,
        cursor,
        config.events_per_page,
    )
    .await?;

    if !raw_events.is_empty() {
        let decoded = rpc::decode_events(&raw_events, &config.contract_id);
        let inserted = db::insert_events(pool, &decoded).await?;
        info!(
            raw = raw_events.len(),
            stored = inserted,
            "Polled sale events"
        );
    }

    let next_ledger = advance_ledger(start_ledger, latest_ledger);

    // Persist cursor so restarts are deterministic.
    db::save_cursor(pool, next_ledger as i64, next_cursor.as_deref()).await?;

    Ok((next_ledger, next_cursor))
}

/// The next start ledger never moves backwards, even if the RPC node
/// reports an older latest ledger than we have already seen.
fn advance_ledger(start_ledger: u32, latest_ledger: Option<u64>) -> u32 {
    latest_ledger
        .map(|l| u32::try_from(l).unwrap_or(u32::MAX).max(start_ledger))
        .unwrap_or(start_ledger)
}
