//! Database layer — migrations, queries, and cursor management.

use sqlx::{sqlite::SqlitePoolOptions, SqlitePool};
use tracing::info;

use crate::errors::{IndexerError, Result};
use crate::events::{EventKind, EventRecord, SaleEvent, SaleSummary};

/// Establish a SQLite connection pool and run pending migrations.
pub async fn init_pool(database_url: &str) -> Result<SqlitePool> {
    let url = if database_url.starts_with("sqlite:") {
        database_url.to_string()
    } else {
        format!("sqlite:{database_url}")
    };
    // Make sure the file is created if it doesn't exist yet.
    let url = if url.contains(":memory:") || url.contains('?') {
        url
    } else {
        format!("{url}?mode=rwc")
    };

    let pool = SqlitePoolOptions::new()
        .max_connections(5)
        .connect(&url)
        .await?;

    migrate(&pool).await?;
    Ok(pool)
}

pub async fn migrate(pool: &SqlitePool) -> Result<()> {
    sqlx::migrate!("./migrations").run(pool).await?;
    info!("Database migrations applied successfully");
    Ok(())
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

/// Persist the last-seen ledger (and optionally a pagination cursor string).
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

/// Persist a batch of decoded events. Events whose RPC id was already stored
/// are silently ignored to make the indexer idempotent.
pub async fn insert_events(pool: &SqlitePool, events: &[SaleEvent]) -> Result<usize> {
    let mut tx = pool.begin().await?;
    let mut count = 0usize;
    for ev in events {
        let rows_affected = sqlx::query(
            r#"
            INSERT OR IGNORE INTO events
                (event_id, event_type, actor, beneficiary, value, amount, end_time,
                 ledger, timestamp, contract_id, tx_hash)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
            "#,
        )
        .bind(&ev.event_id)
        .bind(&ev.event_type)
        .bind(&ev.actor)
        .bind(&ev.beneficiary)
        .bind(&ev.value)
        .bind(&ev.amount)
        .bind(ev.end_time)
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

const SELECT_EVENTS: &str = r#"
    SELECT id, event_id, event_type, actor, beneficiary, value, amount, end_time,
           ledger, timestamp, contract_id, tx_hash, created_at
    FROM   events
"#;

/// Fetch all events, ordered by ledger ascending.
pub async fn get_all_events(pool: &SqlitePool) -> Result<Vec<EventRecord>> {
    let sql = format!("{SELECT_EVENTS} ORDER BY ledger ASC, id ASC");
    let rows = sqlx::query_as::<_, EventRecord>(&sql)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Fetch every purchase credited to `beneficiary`, ordered by ledger ascending.
pub async fn get_purchases_for_beneficiary(
    pool: &SqlitePool,
    beneficiary: &str,
) -> Result<Vec<EventRecord>> {
    let sql = format!(
        "{SELECT_EVENTS} WHERE event_type = ?1 AND beneficiary = ?2 ORDER BY ledger ASC, id ASC"
    );
    let rows = sqlx::query_as::<_, EventRecord>(&sql)
        .bind(EventKind::TokensPurchased.as_str())
        .bind(beneficiary)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

/// Rebuild the sale totals from the indexed purchases.
///
/// The current end time is taken from the latest `init` or `extended` event.
pub async fn get_sale_summary(pool: &SqlitePool) -> Result<SaleSummary> {
    let purchases: Vec<(Option<String>, Option<String>)> =
        sqlx::query_as("SELECT value, amount FROM events WHERE event_type = ?1")
            .bind(EventKind::TokensPurchased.as_str())
            .fetch_all(pool)
            .await?;

    let end_time: Option<(Option<i64>,)> = sqlx::query_as(
        r#"
        SELECT end_time FROM events
        WHERE  event_type IN (?1, ?2) AND end_time IS NOT NULL
        ORDER  BY ledger DESC, id DESC
        LIMIT  1
        "#,
    )
    .bind(EventKind::SaleInitialized.as_str())
    .bind(EventKind::SaleExtended.as_str())
    .fetch_optional(pool)
    .await?;

    let finalized: (i64,) = sqlx::query_as("SELECT COUNT(*) FROM events WHERE event_type = ?1")
        .bind(EventKind::SaleFinalized.as_str())
        .fetch_one(pool)
        .await?;

    let total_value = sum_amounts(purchases.iter().map(|(v, _)| v.as_deref()))?;
    let total_units = sum_amounts(purchases.iter().map(|(_, a)| a.as_deref()))?;

    Ok(SaleSummary {
        purchase_count: purchases.len() as i64,
        total_value: total_value.to_string(),
        total_units: total_units.to_string(),
        end_time: end_time.and_then(|(t,)| t),
        finalized: finalized.0 > 0,
    })
}

/// Sum decimal `i128` strings. Missing values count as zero; unparsable
/// values and overflow are errors.
pub fn sum_amounts<'a, I>(amounts: I) -> Result<i128>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    amounts.into_iter().flatten().try_fold(0i128, |acc, raw| {
        let n: i128 = raw
            .parse()
            .map_err(|_| IndexerError::Amount(format!("not an integer: {raw:?}")))?;
        acc.checked_add(n)
            .ok_or_else(|| IndexerError::Amount("total overflows i128".to_string()))
    })
}
