//! # Finalization
//!
//! One-shot `Open → Finalized` transition, allowed to the controller once the
//! window has ended. What finalization *does* is a [`FinalizationHook`]; the
//! guard logic in [`finalize`] is shared by every hook.

use soroban_sdk::{token, Address, Env};

use crate::types::{SaleConfig, SaleStatus};
use crate::{events, guard, storage, Error};

/// Work performed exactly once when the sale is finalized.
pub trait FinalizationHook {
    fn on_finalize(&self, env: &Env, config: &SaleConfig);
}

/// Hands the sold token's admin role to the sale wallet.
pub struct HandOverTokenAdmin;

impl FinalizationHook for HandOverTokenAdmin {
    fn on_finalize(&self, env: &Env, config: &SaleConfig) {
        token::StellarAssetClient::new(env, &config.token).set_admin(&config.wallet);
    }
}

/// Finalize the sale, running `hook` once.
///
/// Guard order: controller, then still open, then window ended.
pub fn finalize<H: FinalizationHook>(env: &Env, caller: &Address, hook: &H) -> Result<(), Error> {
    guard::require_controller(env, caller)?;

    let mut state = storage::load_state(env)?;
    if state.is_finalized() {
        return Err(Error::AlreadyFinalized);
    }

    let window = storage::load_window(env)?;
    if !window.has_ended(env.ledger().timestamp()) {
        return Err(Error::NotYetEnded);
    }

    let config = storage::load_config(env)?;

    state.status = SaleStatus::Finalized;
    storage::save_state(env, &state);

    hook.on_finalize(env, &config);
    events::emit_finalized(env, config.wallet);
    Ok(())
}
