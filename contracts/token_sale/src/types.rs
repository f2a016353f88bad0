//! # Types
//!
//! Shared data structures used across all modules of the token sale.
//!
//! ## Config / Window / State split
//!
//! The sale is stored as three separate instance entries:
//!
//! - [`SaleConfig`]: written once at deployment; never mutated.
//! - [`SaleWindow`]: written at deployment; `end_time` is rewritten by `extend_duration`.
//! - [`SaleState`]: written on every purchase and on finalization.
//!
//! The public API exposes the reconstructed [`SaleInfo`] view for convenience.
//!
//! ## Status as a Finite-State Machine
//!
//! ```text
//! Open ──► Finalized
//! ```
//!
//! `Finalized` is terminal: there is no transition back to `Open`.

use soroban_sdk::{contracttype, Address};

/// Lifecycle status of the sale.
#[contracttype]
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum SaleStatus {
    /// Accepting purchases while the window is open.
    Open,
    /// Token admin handed to the wallet; no further changes.
    Finalized,
}

/// Immutable sale configuration, written once at initialisation.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SaleConfig {
    /// Token sold by this sale. The sale contract must be its admin.
    pub token: Address,
    /// Asset buyers pay with (the native asset contract on mainnet).
    pub payment_token: Address,
    /// Receives every payment and, on finalization, the token admin.
    pub wallet: Address,
    /// Payment amount per one token unit.
    pub unit_price: i128,
    /// Maximum number of units this sale may ever deliver.
    pub cap: i128,
}

/// Purchase window, inclusive on both ends.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SaleWindow {
    pub start_time: u64,
    pub end_time: u64,
}

/// Mutable running totals.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SaleState {
    pub units_sold: i128,
    pub payment_received: i128,
    pub status: SaleStatus,
}

impl Default for SaleState {
    fn default() -> Self {
        SaleState {
            units_sold: 0,
            payment_received: 0,
            status: SaleStatus::Open,
        }
    }
}

impl SaleState {
    pub fn is_finalized(&self) -> bool {
        self.status == SaleStatus::Finalized
    }
}

/// Full view of the sale returned by `get_sale`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SaleInfo {
    pub controller: Address,
    pub token: Address,
    pub payment_token: Address,
    pub wallet: Address,
    pub unit_price: i128,
    pub cap: i128,
    pub start_time: u64,
    pub end_time: u64,
    pub units_sold: i128,
    pub payment_received: i128,
    pub status: SaleStatus,
}
