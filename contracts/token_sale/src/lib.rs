//! # Token Sale Contract
//!
//! A timed, capped sale of a Stellar asset at a fixed unit price. Payments
//! are forwarded to the sale wallet as they arrive; once the window has closed
//! the controller finalizes the sale, handing the token's admin role to the
//! wallet.
//!
//! | Phase        | Entry Point(s)                                        |
//! |--------------|-------------------------------------------------------|
//! | Bootstrap    | `__constructor` (deployment arguments)                |
//! | Purchase     | [`TokenSale::buy`], [`TokenSale::buy_tokens`]         |
//! | Admin        | [`TokenSale::extend_duration`], [`TokenSale::finalize`] |
//! | Queries      | `is_open`, `has_ended`, `time_remaining`, `units_for_payment`, `remaining_units`, `is_finalized`, `is_controller`, `get_sale` |
//!
//! ## Architecture
//!
//! Window checks live in [`window`], purchases in [`purchase`], the
//! controller check in [`guard`] and the one-shot transition in [`finalize`].
//! Storage access is delegated to `storage`. This file contains the public
//! entry points and the deployment-time configuration check.

#![no_std]

use soroban_sdk::{contract, contracterror, contractimpl, panic_with_error, Address, Env};

pub mod events;
pub mod finalize;
pub mod guard;
pub mod purchase;
mod storage;
mod types;
pub mod window;

#[cfg(test)]
mod invariants;
#[cfg(test)]
mod test_events;
#[cfg(test)]
mod test_finalize;

use finalize::HandOverTokenAdmin;
pub use types::{SaleConfig, SaleInfo, SaleState, SaleStatus, SaleWindow};

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    InvalidConfiguration = 1,
    Unauthorized = 2,
    NotYetOpen = 3,
    WindowClosed = 4,
    ZeroPayment = 5,
    AllocationExceeded = 6,
    AlreadyFinalized = 7,
    NotYetEnded = 8,
    InvalidExtension = 9,
    NotInitialized = 10,
    InvalidBeneficiary = 11,
}

#[contract]
pub struct TokenSale;

#[contractimpl]
impl TokenSale {
    // ─────────────────────────────────────────────────────────
    // Construction
    // ─────────────────────────────────────────────────────────

    /// Configure the sale as part of its deployment.
    ///
    /// - `controller` becomes the only address able to extend or finalize.
    /// - `start_time` may not be in the past, `end_time` may not precede it,
    ///   `unit_price` and `cap` must be positive and `wallet` may not be the
    ///   sale itself. Any violation aborts the deployment.
    /// - Hand the admin role of `token` to the deployed sale afterwards;
    ///   until then every purchase fails at the mint and is rolled back.
    #[allow(clippy::too_many_arguments)]
    pub fn __constructor(
        env: Env,
        controller: Address,
        token: Address,
        payment_token: Address,
        wallet: Address,
        start_time: u64,
        end_time: u64,
        unit_price: i128,
        cap: i128,
    ) {
        let config = SaleConfig {
            token,
            payment_token,
            wallet,
            unit_price,
            cap,
        };
        let window = SaleWindow {
            start_time,
            end_time,
        };
        if let Err(e) = check_configuration(&env, &config, &window) {
            panic_with_error!(&env, e);
        }

        storage::save_sale(&env, &controller, &config, &window, &SaleState::default());
        events::emit_sale_initialized(&env, controller, start_time, end_time, unit_price, cap);
    }

    // ─────────────────────────────────────────────────────────
    // Purchases
    // ─────────────────────────────────────────────────────────

    /// Default action: buy with `buyer` as both payer and beneficiary.
    pub fn buy(env: Env, buyer: Address, amount: i128) -> Result<i128, Error> {
        purchase::buy_tokens(&env, &buyer, &buyer, amount)
    }

    /// Pay `amount` of the payment token from `purchaser` and mint the units
    /// it buys to `beneficiary`. Returns the units delivered.
    ///
    /// Any remainder of `amount / unit_price` is kept by the wallet.
    pub fn buy_tokens(
        env: Env,
        purchaser: Address,
        beneficiary: Address,
        amount: i128,
    ) -> Result<i128, Error> {
        purchase::buy_tokens(&env, &purchaser, &beneficiary, amount)
    }

    // ─────────────────────────────────────────────────────────
    // Controller operations
    // ─────────────────────────────────────────────────────────

    /// Push the end of the window out to `new_end_time`.
    pub fn extend_duration(env: Env, caller: Address, new_end_time: u64) -> Result<(), Error> {
        window::extend(&env, &caller, new_end_time)
    }

    /// Close the sale for good and hand the token admin to the wallet.
    pub fn finalize(env: Env, caller: Address) -> Result<(), Error> {
        finalize::finalize(&env, &caller, &HandOverTokenAdmin)
    }

    // ─────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────

    pub fn is_open(env: Env) -> Result<bool, Error> {
        Ok(storage::load_window(&env)?.is_open(env.ledger().timestamp()))
    }

    pub fn has_ended(env: Env) -> Result<bool, Error> {
        Ok(storage::load_window(&env)?.has_ended(env.ledger().timestamp()))
    }

    /// Seconds left in the window; 0 once it has ended.
    pub fn time_remaining(env: Env) -> Result<u64, Error> {
        Ok(storage::load_window(&env)?.time_remaining(env.ledger().timestamp()))
    }

    /// Units `amount` would buy at the configured price, ignoring the cap.
    pub fn units_for_payment(env: Env, amount: i128) -> Result<i128, Error> {
        let config = storage::load_config(&env)?;
        Ok(purchase::units_for_payment(amount, config.unit_price))
    }

    /// Units still available before the cap is reached.
    pub fn remaining_units(env: Env) -> Result<i128, Error> {
        let config = storage::load_config(&env)?;
        let state = storage::load_state(&env)?;
        Ok(config.cap - state.units_sold)
    }

    pub fn is_finalized(env: Env) -> Result<bool, Error> {
        Ok(storage::load_state(&env)?.is_finalized())
    }

    pub fn is_controller(env: Env, address: Address) -> bool {
        guard::is_controller(&env, &address)
    }

    /// Full snapshot of configuration, window and totals.
    pub fn get_sale(env: Env) -> Result<SaleInfo, Error> {
        let controller = storage::load_controller(&env)?;
        let config = storage::load_config(&env)?;
        let window = storage::load_window(&env)?;
        let state = storage::load_state(&env)?;
        Ok(SaleInfo {
            controller,
            token: config.token,
            payment_token: config.payment_token,
            wallet: config.wallet,
            unit_price: config.unit_price,
            cap: config.cap,
            start_time: window.start_time,
            end_time: window.end_time,
            units_sold: state.units_sold,
            payment_received: state.payment_received,
            status: state.status,
        })
    }
}

/// Validate deployment arguments against the current ledger time.
fn check_configuration(env: &Env, config: &SaleConfig, window: &SaleWindow) -> Result<(), Error> {
    if window.start_time < env.ledger().timestamp()
        || window.end_time < window.start_time
        || config.unit_price <= 0
        || config.cap <= 0
        || config.wallet == env.current_contract_address()
    {
        return Err(Error::InvalidConfiguration);
    }
    Ok(())
}
