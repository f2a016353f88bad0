//! # Ownership guard
//!
//! The sale recognises exactly one controller, fixed at deployment. There is no
//! transfer operation. Privileged entry points call [`require_controller`]
//! before touching any state.

use soroban_sdk::{Address, Env};

use crate::storage;
use crate::Error;

/// Require `caller` to have signed the invocation and to be the controller.
///
/// Returns `Error::Unauthorized` for any other address. Nothing is written
/// on either path.
pub fn require_controller(env: &Env, caller: &Address) -> Result<(), Error> {
    caller.require_auth();
    let controller = storage::load_controller(env)?;
    if *caller != controller {
        return Err(Error::Unauthorized);
    }
    Ok(())
}

pub fn is_controller(env: &Env, address: &Address) -> bool {
    storage::load_controller(env)
        .map(|controller| controller == *address)
        .unwrap_or(false)
}
