extern crate std;

use core::cell::Cell;

use soroban_sdk::{testutils::Address as _, token, Address, Env};

use crate::finalize::{finalize, FinalizationHook};
use crate::invariants::assert_valid_status_transition;
use crate::test::{set_time, Fixture, END, START};
use crate::types::SaleConfig;
use crate::{Error, SaleStatus};

/// Counts invocations instead of touching the token.
struct CountingHook {
    calls: Cell<u32>,
}

impl FinalizationHook for CountingHook {
    fn on_finalize(&self, _env: &Env, _config: &SaleConfig) {
        self.calls.set(self.calls.get() + 1);
    }
}

#[test]
fn test_finalize_hands_token_admin_to_wallet() {
    let f = Fixture::new();
    let token_sac = token::StellarAssetClient::new(&f.env, &f.token.address);
    assert_eq!(token_sac.admin(), f.client.address);

    set_time(&f.env, END + 1);
    f.client.finalize(&f.controller);

    assert_eq!(token_sac.admin(), f.wallet);
    assert!(f.client.is_finalized());
    assert_valid_status_transition(&SaleStatus::Open, &f.client.get_sale().status);
}

#[test]
fn test_finalize_twice_fails() {
    let f = Fixture::new();
    set_time(&f.env, END + 1);

    f.client.finalize(&f.controller);
    assert_eq!(
        f.client.try_finalize(&f.controller),
        Err(Ok(Error::AlreadyFinalized))
    );
    assert_eq!(f.client.get_sale().status, SaleStatus::Finalized);
}

#[test]
fn test_finalize_before_end_fails() {
    let f = Fixture::new();

    set_time(&f.env, START - 1);
    assert_eq!(f.client.try_finalize(&f.controller), Err(Ok(Error::NotYetEnded)));

    // Still inside the window at exactly end_time.
    set_time(&f.env, END);
    assert_eq!(f.client.try_finalize(&f.controller), Err(Ok(Error::NotYetEnded)));

    assert!(!f.client.is_finalized());
}

#[test]
fn test_finalize_by_non_controller_fails_regardless_of_time() {
    let f = Fixture::new();
    let stranger = Address::generate(&f.env);

    for now in [START - 1, START, END, END + 1, END + 1_000_000] {
        set_time(&f.env, now);
        assert_eq!(f.client.try_finalize(&stranger), Err(Ok(Error::Unauthorized)));
    }

    // The wallet is not the controller either.
    assert_eq!(f.client.try_finalize(&f.wallet), Err(Ok(Error::Unauthorized)));
    assert!(!f.client.is_finalized());
}

#[test]
fn test_extension_postpones_finalization() {
    let f = Fixture::new();
    f.client.extend_duration(&f.controller, &(END + 100));

    set_time(&f.env, END + 1);
    assert_eq!(f.client.try_finalize(&f.controller), Err(Ok(Error::NotYetEnded)));

    set_time(&f.env, END + 101);
    f.client.finalize(&f.controller);
    assert!(f.client.is_finalized());
}

#[test]
fn test_no_purchase_after_finalize() {
    let f = Fixture::new();
    let buyer = f.funded_buyer(1_000);
    set_time(&f.env, END + 1);
    f.client.finalize(&f.controller);

    assert_eq!(f.client.try_buy(&buyer, &100), Err(Ok(Error::WindowClosed)));
}

#[test]
fn test_finalization_hook_runs_exactly_once() {
    let f = Fixture::new();
    f.env.mock_all_auths_allowing_non_root_auth();
    let hook = CountingHook {
        calls: Cell::new(0),
    };
    set_time(&f.env, END + 1);

    // One frame per call: a frame authorizes an address only once.
    f.env.as_contract(&f.client.address, || {
        assert_eq!(finalize(&f.env, &f.controller, &hook), Ok(()));
    });
    f.env.as_contract(&f.client.address, || {
        assert_eq!(
            finalize(&f.env, &f.controller, &hook),
            Err(Error::AlreadyFinalized)
        );
    });

    assert_eq!(hook.calls.get(), 1);

    // The counting hook left the token admin with the sale.
    let token_sac = token::StellarAssetClient::new(&f.env, &f.token.address);
    assert_eq!(token_sac.admin(), f.client.address);
    assert!(f.client.is_finalized());
}

#[test]
fn test_finalization_hook_runs_only_after_guards_pass() {
    let f = Fixture::new();
    f.env.mock_all_auths_allowing_non_root_auth();
    let hook = CountingHook {
        calls: Cell::new(0),
    };
    let stranger = Address::generate(&f.env);

    f.env.as_contract(&f.client.address, || {
        assert_eq!(finalize(&f.env, &f.controller, &hook), Err(Error::NotYetEnded));
    });
    set_time(&f.env, END + 1);
    f.env.as_contract(&f.client.address, || {
        assert_eq!(finalize(&f.env, &stranger, &hook), Err(Error::Unauthorized));
    });
    f.env.as_contract(&f.client.address, || {
        assert_eq!(finalize(&f.env, &f.controller, &hook), Ok(()));
    });
    f.env.as_contract(&f.client.address, || {
        assert_eq!(finalize(&f.env, &f.controller, &hook), Err(Error::AlreadyFinalized));
    });

    // Only the one successful call reached the hook.
    assert_eq!(hook.calls.get(), 1);
}
