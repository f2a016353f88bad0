//! Canonical event types emitted by the token sale contract.
//!
//! These mirror the Soroban contract events defined in
//! `contracts/token_sale/src/events.rs`.

use serde::{Deserialize, Serialize};

/// All recognised event kinds from the token sale contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// The sale was configured (`init` topic).
    SaleInitialized,
    /// Units were bought and minted (`purchased` topic).
    TokensPurchased,
    /// The controller moved the end of the window (`extended` topic).
    SaleExtended,
    /// The sale was finalized and the token admin handed over (`finalized` topic).
    SaleFinalized,
    /// An event from this contract that we don't recognise yet.
    Unknown,
}

impl EventKind {
    /// Parse the leading topic symbol string produced by Soroban into an [`EventKind`].
    pub fn from_topic(topic: &str) -> Self {
        match topic {
            "init" => Self::SaleInitialized,
            "purchased" => Self::TokensPurchased,
            "extended" => Self::SaleExtended,
            "finalized" => Self::SaleFinalized,
            _ => Self::Unknown,
        }
    }

    /// Return a short identifier string suitable for storage in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SaleInitialized => "sale_initialized",
            Self::TokensPurchased => "tokens_purchased",
            Self::SaleExtended => "sale_extended",
            Self::SaleFinalized => "sale_finalized",
            Self::Unknown => "unknown",
        }
    }
}

/// A fully decoded sale event, ready to be stored in the database.
///
/// `actor` is the purchaser for purchases, the controller for `init` and the
/// wallet for `finalized`. `end_time` is set by `init` and `extended`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleEvent {
    pub event_id: String,
    pub event_type: String,
    pub actor: Option<String>,
    pub beneficiary: Option<String>,
    pub value: Option<String>,
    pub amount: Option<String>,
    pub end_time: Option<i64>,
    pub ledger: i64,
    pub timestamp: i64,
    pub contract_id: String,
    pub tx_hash: Option<String>,
}

/// A raw event record as stored in / read from the database.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EventRecord {
    pub id: i64,
    pub event_id: String,
    pub event_type: String,
    pub actor: Option<String>,
    pub beneficiary: Option<String>,
    pub value: Option<String>,
    pub amount: Option<String>,
    pub end_time: Option<i64>,
    pub ledger: i64,
    pub timestamp: i64,
    pub contract_id: String,
    pub tx_hash: Option<String>,
    pub created_at: i64,
}

/// Aggregate view of the sale rebuilt from indexed events.
///
/// `i128` totals are serialised as decimal strings, the same way the
/// contract amounts are stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SaleSummary {
    pub purchase_count: i64,
    pub total_value: String,
    pub total_units: String,
    pub end_time: Option<i64>,
    pub finalized: bool,
}
