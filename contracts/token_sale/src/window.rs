//! # Sale window
//!
//! The window is the inclusive interval `[start_time, end_time]` of ledger
//! timestamps during which purchases are accepted. Only its end can move, and
//! only forward.

use soroban_sdk::{Address, Env};

use crate::types::SaleWindow;
use crate::{events, guard, storage, Error};

impl SaleWindow {
    /// `true` iff `start_time <= now <= end_time`.
    pub fn is_open(&self, now: u64) -> bool {
        self.start_time <= now && now <= self.end_time
    }

    /// `true` iff `now` is past `end_time`.
    pub fn has_ended(&self, now: u64) -> bool {
        now > self.end_time
    }

    /// Seconds until the window closes, 0 once it has.
    pub fn time_remaining(&self, now: u64) -> u64 {
        self.end_time.saturating_sub(now)
    }

    /// Classify `now` for a purchase: `Ok` inside the window, otherwise the
    /// side of the window it falls on.
    pub fn check_open(&self, now: u64) -> Result<(), Error> {
        if now < self.start_time {
            return Err(Error::NotYetOpen);
        }
        if self.has_ended(now) {
            return Err(Error::WindowClosed);
        }
        Ok(())
    }
}

/// Move the end of the window to `new_end_time`.
///
/// Guard order: controller, then not finalized, then strictly later end.
pub fn extend(env: &Env, caller: &Address, new_end_time: u64) -> Result<(), Error> {
    guard::require_controller(env, caller)?;

    if storage::load_state(env)?.is_finalized() {
        return Err(Error::AlreadyFinalized);
    }

    let mut window = storage::load_window(env)?;
    if new_end_time <= window.end_time {
        return Err(Error::InvalidExtension);
    }

    window.end_time = new_end_time;
    storage::save_window(env, &window);
    events::emit_sale_extended(env, new_end_time);
    Ok(())
}
