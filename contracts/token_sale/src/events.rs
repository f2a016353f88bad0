//! # Events
//!
//! Every record the sale appends to the ledger's event log. Topics lead with a
//! short symbol so that off-chain consumers (see `backend/indexer`) can filter
//! on it without decoding the data payload.
//!
//! | Topic(s)                   | Data                  |
//! |----------------------------|-----------------------|
//! | `("init",)`                | [`SaleInitialized`]   |
//! | `("purchased", beneficiary)` | [`PurchaseCompleted`] |
//! | `("extended",)`            | [`SaleExtended`]      |
//! | `("finalized",)`           | [`Finalized`]         |

use soroban_sdk::{contracttype, symbol_short, Address, Env};

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SaleInitialized {
    pub controller: Address,
    pub start_time: u64,
    pub end_time: u64,
    pub unit_price: i128,
    pub cap: i128,
}

/// One per successful purchase.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PurchaseCompleted {
    /// Address that paid.
    pub purchaser: Address,
    /// Address the units were minted to.
    pub beneficiary: Address,
    /// Full payment amount, remainder included.
    pub value: i128,
    /// Units delivered.
    pub amount: i128,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SaleExtended {
    pub new_end_time: u64,
}

#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Finalized {
    /// New admin of the sold token.
    pub wallet: Address,
}

pub fn emit_sale_initialized(
    env: &Env,
    controller: Address,
    start_time: u64,
    end_time: u64,
    unit_price: i128,
    cap: i128,
) {
    let data = SaleInitialized {
        controller,
        start_time,
        end_time,
        unit_price,
        cap,
    };
    env.events().publish((symbol_short!("init"),), data);
}

pub fn emit_purchase_completed(
    env: &Env,
    purchaser: Address,
    beneficiary: Address,
    value: i128,
    amount: i128,
) {
    let topics = (symbol_short!("purchased"), beneficiary.clone());
    let data = PurchaseCompleted {
        purchaser,
        beneficiary,
        value,
        amount,
    };
    env.events().publish(topics, data);
}

pub fn emit_sale_extended(env: &Env, new_end_time: u64) {
    env.events()
        .publish((symbol_short!("extended"),), SaleExtended { new_end_time });
}

pub fn emit_finalized(env: &Env, wallet: Address) {
    env.events()
        .publish((symbol_short!("finalized"),), Finalized { wallet });
}
