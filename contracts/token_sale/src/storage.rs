//! # Storage
//!
//! Typed helpers over Soroban instance storage. The sale is a single record
//! that lives as long as the contract, so every key is instance-tier.
//!
//! | Key          | Type         | Description                          |
//! |--------------|--------------|--------------------------------------|
//! | `Controller` | `Address`    | Address allowed to extend / finalize |
//! | `Config`     | `SaleConfig` | Immutable sale configuration         |
//! | `Window`     | `SaleWindow` | Start and (extendable) end time      |
//! | `State`      | `SaleState`  | Running totals and lifecycle status  |
//!
//! Instance TTL is bumped by **7 days** whenever it falls below 1 day remaining.

use soroban_sdk::{contracttype, Address, Env};

use crate::types::{SaleConfig, SaleState, SaleWindow};
use crate::Error;

// ── TTL Constants ────────────────────────────────────────────────────

/// Approximate ledgers per day (~5 seconds per ledger).
const DAY_IN_LEDGERS: u32 = 17_280;

const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
const INSTANCE_LIFETIME_THRESHOLD: u32 = DAY_IN_LEDGERS;

// ── Storage Keys ─────────────────────────────────────────────────────

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    Controller,
    Config,
    Window,
    State,
}

fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

/// Write every sale record in one go. Only the constructor calls this.
pub fn save_sale(
    env: &Env,
    controller: &Address,
    config: &SaleConfig,
    window: &SaleWindow,
    state: &SaleState,
) {
    let storage = env.storage().instance();
    storage.set(&DataKey::Controller, controller);
    storage.set(&DataKey::Config, config);
    storage.set(&DataKey::Window, window);
    storage.set(&DataKey::State, state);
    bump_instance(env);
}

pub fn load_controller(env: &Env) -> Result<Address, Error> {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::Controller)
        .ok_or(Error::NotInitialized)
}

pub fn load_config(env: &Env) -> Result<SaleConfig, Error> {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::Config)
        .ok_or(Error::NotInitialized)
}

pub fn load_window(env: &Env) -> Result<SaleWindow, Error> {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::Window)
        .ok_or(Error::NotInitialized)
}

pub fn save_window(env: &Env, window: &SaleWindow) {
    env.storage().instance().set(&DataKey::Window, window);
    bump_instance(env);
}

pub fn load_state(env: &Env) -> Result<SaleState, Error> {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::State)
        .ok_or(Error::NotInitialized)
}

/// Save only the mutable totals (the hot path on every purchase).
pub fn save_state(env: &Env, state: &SaleState) {
    env.storage().instance().set(&DataKey::State, state);
    bump_instance(env);
}

