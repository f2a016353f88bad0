#![allow(dead_code)]

extern crate std;

use crate::types::{SaleInfo, SaleStatus};

/// INV-1: The cap is never exceeded.
pub fn assert_within_cap(sale: &SaleInfo) {
    assert!(
        sale.units_sold <= sale.cap,
        "INV-1 violated: {} units sold against a cap of {}",
        sale.units_sold,
        sale.cap
    );
}

/// INV-2: Totals are never negative.
pub fn assert_totals_non_negative(sale: &SaleInfo) {
    assert!(
        sale.units_sold >= 0,
        "INV-2 violated: negative units_sold ({})",
        sale.units_sold
    );
    assert!(
        sale.payment_received >= 0,
        "INV-2 violated: negative payment_received ({})",
        sale.payment_received
    );
}

/// INV-3: The window never ends before it starts.
pub fn assert_window_ordered(sale: &SaleInfo) {
    assert!(
        sale.start_time <= sale.end_time,
        "INV-3 violated: start {} after end {}",
        sale.start_time,
        sale.end_time
    );
}

/// INV-4: Totals equal the sum over every successful purchase.
pub fn assert_totals_match(sale: &SaleInfo, units_delivered: i128, payments: i128) {
    assert_eq!(
        sale.units_sold, units_delivered,
        "INV-4 violated: units_sold {} != delivered {}",
        sale.units_sold, units_delivered
    );
    assert_eq!(
        sale.payment_received, payments,
        "INV-4 violated: payment_received {} != paid {}",
        sale.payment_received, payments
    );
}

/// INV-5: payment_received never decreases.
pub fn assert_payment_monotonic(before: i128, after: i128) {
    assert!(
        after >= before,
        "INV-5 violated: payment_received decreased from {} to {}",
        before,
        after
    );
}

/// INV-6: Status only moves forward, Open -> Finalized.
pub fn assert_valid_status_transition(from: &SaleStatus, to: &SaleStatus) {
    let valid = matches!(
        (from, to),
        (SaleStatus::Open, SaleStatus::Open)
            | (SaleStatus::Open, SaleStatus::Finalized)
            | (SaleStatus::Finalized, SaleStatus::Finalized)
    );
    assert!(
        valid,
        "INV-6 violated: invalid status transition from {:?} to {:?}",
        from, to
    );
}

/// INV-7: Configuration fields never change after deployment.
pub fn assert_config_immutable(original: &SaleInfo, current: &SaleInfo) {
    assert_eq!(original.controller, current.controller, "INV-7 violated: controller changed");
    assert_eq!(original.token, current.token, "INV-7 violated: token changed");
    assert_eq!(
        original.payment_token, current.payment_token,
        "INV-7 violated: payment_token changed"
    );
    assert_eq!(original.wallet, current.wallet, "INV-7 violated: wallet changed");
    assert_eq!(original.unit_price, current.unit_price, "INV-7 violated: unit_price changed");
    assert_eq!(original.cap, current.cap, "INV-7 violated: cap changed");
    assert_eq!(original.start_time, current.start_time, "INV-7 violated: start_time changed");
}

/// Run all stateless sale invariants.
pub fn assert_all_sale_invariants(sale: &SaleInfo) {
    assert_within_cap(sale);
    assert_totals_non_negative(sale);
    assert_window_ordered(sale);
}
