//! Soroban RPC client — polls `getEvents` and decodes token sale events.
//!
//! ## Resilience
//!
//! * Exponential back-off is applied when the RPC returns an error or rate-limit
//!   response, up to [`MAX_BACKOFF_SECS`] seconds.
//! * Transient network errors (connection reset, timeout) are retried silently.

use std::time::Duration;

use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use crate::errors::{IndexerError, Result};
use crate::events::{EventKind, SaleEvent};

const MAX_BACKOFF_SECS: u64 = 60;
const INITIAL_BACKOFF_SECS: u64 = 2;

// ─────────────────────────────────────────────────────────
// JSON-RPC response shapes
// ─────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct RpcResponse {
    pub result: Option<EventsResult>,
    pub error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
pub struct RpcError {
    pub code: i64,
    pub message: String,
}

#[derive(Debug, Deserialize)]
pub struct EventsResult {
    pub events: Vec<RawEvent>,
    pub cursor: Option<String>,
    #[serde(rename = "latestLedger")]
    pub latest_ledger: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
#[allow(dead_code)]
pub struct RawEvent {
    /// XDR-decoded topic list
    pub topic: Vec<String>,
    /// XDR-decoded event value / data
    pub value: Value,
    #[serde(rename = "contractId")]
    pub contract_id: Option<String>,
    #[serde(rename = "txHash")]
    pub tx_hash: Option<String>,
    pub id: Option<String>,
    pub ledger: Option<u64>,
    #[serde(rename = "ledgerClosedAt")]
    pub ledger_closed_at: Option<String>,
    #[serde(rename = "inSuccessfulContractCall")]
    pub in_successful_contract_call: Option<bool>,
    #[serde(rename = "pagingToken")]
    pub paging_token: Option<String>,
}

/// JSON-RPC codes that will not succeed on retry.
fn is_hard_rpc_error(code: i64) -> bool {
    code == -32600 || code == -32601
}

// ─────────────────────────────────────────────────────────
// Public API
// ─────────────────────────────────────────────────────────

/// Fetch a page of events from the RPC.
///
/// * `start_ledger` — the ledger sequence to scan from (inclusive).
/// * `cursor`       — optional opaque pagination cursor from a previous response.
/// * `limit`        — maximum number of events to return.
///
/// Returns `(events, next_cursor, latest_ledger)`.
pub async fn fetch_events(
    client: &Client,
    rpc_url: &str,
    contract_id: &str,
    start_ledger: u32,
    cursor: Option<&str>,
    limit: u32,
) -> Result<(Vec<RawEvent>, Option<String>, Option<u64>)> {
    let mut backoff = INITIAL_BACKOFF_SECS;

    loop {
        let params = build_params(contract_id, start_ledger, cursor, limit);

        let response = client
            .post(rpc_url)
            .json(&json!({
                "jsonrpc": "2.0",
                "id": 1,
                "method": "getEvents",
                "params": params,
            }))
            .send()
            .await;

        match response {
            Err(e) => {
                warn!("RPC request failed (will retry in {backoff}s): {e}");
            }
            Ok(resp) if resp.status() == reqwest::StatusCode::TOO_MANY_REQUESTS => {
                warn!("Rate-limited by RPC (will retry in {backoff}s)");
            }
            Ok(resp) => {
                let body: RpcResponse = resp.json().await?;

                match body.error {
                    Some(err) if is_hard_rpc_error(err.code) => {
                        return Err(IndexerError::EventParse(format!(
                            "RPC hard error {}: {}",
                            err.code, err.message
                        )));
                    }
                    Some(err) => {
                        warn!(
                            "RPC soft error (will retry in {backoff}s): {} {}",
                            err.code, err.message
                        );
                    }
                    None => {
                        let result = body.result.ok_or_else(|| {
                            IndexerError::EventParse("Empty result from getEvents".to_string())
                        })?;

                        debug!(
                            "Fetched {} events (latest_ledger={:?})",
                            result.events.len(),
                            result.latest_ledger
                        );

                        return Ok((result.events, result.cursor, result.latest_ledger));
                    }
                }
            }
        }

        tokio::time::sleep(Duration::from_secs(backoff)).await;
        backoff = next_backoff(backoff);
    }
}

fn next_backoff(current: u64) -> u64 {
    (current * 2).min(MAX_BACKOFF_SECS)
}

fn build_params(contract_id: &str, start_ledger: u32, cursor: Option<&str>, limit: u32) -> Value {
    let mut params = json!({
        "filters": [
            {
                "type": "contract",
                "contractIds": [contract_id]
            }
        ],
        "pagination": {
            "limit": limit
        }
    });

    if let Some(cur) = cursor {
        params["pagination"]["cursor"] = json!(cur);
    } else {
        params["startLedger"] = json!(start_ledger);
    }

    params
}

// ─────────────────────────────────────────────────────────
// Event decoding
// ─────────────────────────────────────────────────────────

/// Decode a list of raw RPC events into [`SaleEvent`] structs.
///
/// Events from failed contract calls are dropped: their effects were rolled
/// back on-chain.
pub fn decode_events(raw: &[RawEvent], contract_id: &str) -> Vec<SaleEvent> {
    raw.iter()
        .filter(|e| e.in_successful_contract_call != Some(false))
        .filter_map(|e| decode_single(e, contract_id))
        .collect()
}

fn decode_single(raw: &RawEvent, contract_id: &str) -> Option<SaleEvent> {
    // Extract leading topic symbol to determine event type.
    let first_topic = raw.topic.first()?;
    let kind = EventKind::from_topic(&extract_symbol(first_topic));

    let ledger = raw.ledger.unwrap_or(0) as i64;
    let timestamp = raw
        .ledger_closed_at
        .as_deref()
        .and_then(parse_iso_to_unix)
        .unwrap_or(0);

    let tx_hash = raw.tx_hash.as_deref().and_then(|h| {
        let normalized = normalize_tx_hash(h);
        if normalized.is_none() {
            warn!("Dropping malformed tx hash {h:?} at ledger {ledger}");
        }
        normalized
    });

    let event_id = raw.id.clone().unwrap_or_else(|| {
        format!(
            "{ledger}-{}-{}",
            tx_hash.as_deref().unwrap_or("notx"),
            kind.as_str()
        )
    });

    let decoded = decode_data(&raw.value, &kind);

    // `purchased` also carries the beneficiary as its second topic.
    let beneficiary = decoded.beneficiary.or_else(|| match kind {
        EventKind::TokensPurchased => raw.topic.get(1).map(|t| extract_topic_value(t)),
        _ => None,
    });

    Some(SaleEvent {
        event_id,
        event_type: kind.as_str().to_string(),
        actor: decoded.actor,
        beneficiary,
        value: decoded.value,
        amount: decoded.amount,
        end_time: decoded.end_time,
        ledger,
        timestamp,
        contract_id: raw
            .contract_id
            .clone()
            .unwrap_or_else(|| contract_id.to_string()),
        tx_hash,
    })
}

#[derive(Default)]
struct DecodedData {
    actor: Option<String>,
    beneficiary: Option<String>,
    value: Option<String>,
    amount: Option<String>,
    end_time: Option<i64>,
}

/// Pull apart the JSON `value` blob that Soroban returns for event data.
/// The XDR is decoded by the RPC into a `{"type":…, …}` JSON object.
fn decode_data(value: &Value, kind: &EventKind) -> DecodedData {
    match kind {
        EventKind::SaleInitialized => DecodedData {
            actor: extract_field(value, &["controller"]).or_else(|| find_nested(value, "controller")),
            value: extract_field(value, &["unit_price"]),
            amount: extract_field(value, &["cap"]),
            end_time: extract_field(value, &["end_time"]).and_then(|s| s.parse().ok()),
            ..Default::default()
        },
        EventKind::TokensPurchased => DecodedData {
            actor: extract_field(value, &["purchaser"]),
            beneficiary: extract_field(value, &["beneficiary"]),
            value: extract_field(value, &["value"]),
            amount: extract_field(value, &["amount"]),
            ..Default::default()
        },
        EventKind::SaleExtended => DecodedData {
            end_time: extract_field(value, &["new_end_time"]).and_then(|s| s.parse().ok()),
            ..Default::default()
        },
        EventKind::SaleFinalized => DecodedData {
            actor: extract_field(value, &["wallet"]).or_else(|| find_nested(value, "wallet")),
            ..Default::default()
        },
        EventKind::Unknown => DecodedData::default(),
    }
}

fn extract_field(value: &Value, keys: &[&str]) -> Option<String> {
    for key in keys {
        if let Some(v) = value.get(key) {
            let s = match v {
                Value::String(s) => Some(s.clone()),
                Value::Number(n) => Some(n.to_string()),
                _ => v.as_str().map(String::from),
            };
            if s.is_some() {
                return s;
            }
        }
    }
    None
}

fn find_nested(value: &Value, key: &str) -> Option<String> {
    if let Value::Object(map) = value {
        for (k, v) in map {
            if k == key {
                return v.as_str().map(String::from);
            }
            if let Some(found) = find_nested(v, key) {
                return Some(found);
            }
        }
    }
    None
}

/// Extract a Soroban Symbol from the XDR-decoded topic string.
/// The RPC may return `{"type":"symbol","value":"purchased"}` or just the raw string.
fn extract_symbol(raw: &str) -> String {
    if let Ok(v) = serde_json::from_str::<Value>(raw) {
        if let Some(s) = v.get("value").and_then(|x| x.as_str()) {
            return s.to_string();
        }
    }
    // Fallback: treat the raw string as the symbol
    raw.to_string()
}

/// Extract the payload of a non-symbol topic (an address or a number).
fn extract_topic_value(raw: &str) -> String {
    if let Ok(v) = serde_json::from_str::<Value>(raw) {
        if let Some(n) = v.get("value").and_then(|x| x.as_u64()) {
            return n.to_string();
        }
        if let Some(s) = v.get("value").and_then(|x| x.as_str()) {
            return s.to_string();
        }
    }
    raw.to_string()
}

/// Lower-case a transaction hash, rejecting anything that is not 32 bytes of hex.
fn normalize_tx_hash(raw: &str) -> Option<String> {
    let bytes = hex::decode(raw.trim()).ok()?;
    if bytes.len() != 32 {
        return None;
    }
    Some(hex::encode(bytes))
}

/// Parse an ISO-8601 timestamp string into a Unix epoch (seconds).
fn parse_iso_to_unix(s: &str) -> Option<i64> {
    use chrono::DateTime;
    DateTime::parse_from_rfc3339(s)
        .ok()
        .map(|dt| dt.timestamp())
}

// ─────────────────────────────────────────────────────────
// Unit tests
// ─────────────────────────────────────────────────────────
