//! # Purchase processing
//!
//! Converts a payment into token units at the fixed unit price, enforces the
//! cap and records the totals, then delivers.
//!
//! Ordering inside [`buy_tokens`]:
//!
//! 1. validate beneficiary, window and amount (no writes)
//! 2. compute units and check the cap
//! 3. commit `units_sold` / `payment_received`
//! 4. mint to the beneficiary
//! 5. emit `purchased`
//! 6. forward the payment to the wallet
//!
//! Totals are committed in step 3, before either external call, so any
//! nested invocation observes the already-counted sale.

use soroban_sdk::{token, Address, Env};

use crate::types::{SaleConfig, SaleState};
use crate::{events, storage, Error};

/// Units bought by `payment` at `unit_price`, rounded down.
///
/// Non-positive payments buy nothing.
pub fn units_for_payment(payment: i128, unit_price: i128) -> i128 {
    if payment <= 0 || unit_price <= 0 {
        return 0;
    }
    payment / unit_price
}

/// Apply a purchase of `units` for `payment` to the running totals.
///
/// Fails with `AllocationExceeded` when no whole unit is bought, when the cap
/// would be passed, or when either total would overflow.
pub fn record_purchase(
    state: &SaleState,
    config: &SaleConfig,
    payment: i128,
    units: i128,
) -> Result<SaleState, Error> {
    if units <= 0 {
        return Err(Error::AllocationExceeded);
    }
    let units_sold = state
        .units_sold
        .checked_add(units)
        .ok_or(Error::AllocationExceeded)?;
    if units_sold > config.cap {
        return Err(Error::AllocationExceeded);
    }
    let payment_received = state
        .payment_received
        .checked_add(payment)
        .ok_or(Error::AllocationExceeded)?;

    Ok(SaleState {
        units_sold,
        payment_received,
        status: state.status,
    })
}

/// Buy units for `beneficiary`, paid by `purchaser`.
///
/// Returns the number of units delivered.
pub fn buy_tokens(
    env: &Env,
    purchaser: &Address,
    beneficiary: &Address,
    payment: i128,
) -> Result<i128, Error> {
    purchaser.require_auth();

    if *beneficiary == env.current_contract_address() {
        return Err(Error::InvalidBeneficiary);
    }

    let window = storage::load_window(env)?;
    window.check_open(env.ledger().timestamp())?;

    if payment <= 0 {
        return Err(Error::ZeroPayment);
    }

    let config = storage::load_config(env)?;
    let state = storage::load_state(env)?;

    // Any remainder of `payment / unit_price` stays with the wallet.
    let units = units_for_payment(payment, config.unit_price);
    let next = record_purchase(&state, &config, payment, units)?;
    storage::save_state(env, &next);

    token::StellarAssetClient::new(env, &config.token).mint(beneficiary, &units);

    events::emit_purchase_completed(env, purchaser.clone(), beneficiary.clone(), payment, units);

    token::Client::new(env, &config.payment_token).transfer(purchaser, &config.wallet, &payment);

    Ok(units)
}
