extern crate std;

use soroban_sdk::{
    symbol_short, testutils::Address as _, testutils::Events, vec, Address, Env, IntoVal,
    TryIntoVal, Val, Vec,
};

use crate::events::{Finalized, PurchaseCompleted, SaleExtended, SaleInitialized};
use crate::test::{set_time, Fixture, CAP, END, START, UNIT_PRICE};
use crate::TokenSale;

/// Events published by `contract`, oldest first. Token contracts called by
/// the sale publish their own events in between, so filter on the emitter.
fn events_from(env: &Env, contract: &Address) -> std::vec::Vec<(Vec<Val>, Val)> {
    env.events()
        .all()
        .iter()
        .filter(|(emitter, _, _)| emitter == contract)
        .map(|(_, topics, data)| (topics, data))
        .collect()
}

#[test]
fn test_sale_initialized_event() {
    let env = Env::default();
    env.mock_all_auths();
    set_time(&env, 500);
    let controller = Address::generate(&env);
    let token = Address::generate(&env);
    let payment_token = Address::generate(&env);
    let wallet = Address::generate(&env);

    // The constructor publishes the event as part of the deployment.
    let sale = env.register(
        TokenSale,
        (
            controller.clone(),
            token,
            payment_token,
            wallet,
            START,
            END,
            UNIT_PRICE,
            CAP,
        ),
    );

    let events = events_from(&env, &sale);
    let (topics, data) = events.last().expect("No events found");

    let expected_topics: Vec<Val> = vec![&env, symbol_short!("init").into_val(&env)];
    assert_eq!(*topics, expected_topics);

    let event_data: SaleInitialized = data.try_into_val(&env).unwrap();
    assert_eq!(
        event_data,
        SaleInitialized {
            controller,
            start_time: START,
            end_time: END,
            unit_price: UNIT_PRICE,
            cap: CAP,
        }
    );
}

#[test]
fn test_purchase_completed_event() {
    let f = Fixture::new();
    let purchaser = f.funded_buyer(1_000);
    let beneficiary = Address::generate(&f.env);
    set_time(&f.env, START);

    f.client.buy_tokens(&purchaser, &beneficiary, &250);

    let events = events_from(&f.env, &f.client.address);
    let (topics, data) = events.last().expect("No events found");

    // Topic: (symbol_short!("purchased"), beneficiary)
    let expected_topics: Vec<Val> = vec![
        &f.env,
        symbol_short!("purchased").into_val(&f.env),
        beneficiary.into_val(&f.env),
    ];
    assert_eq!(*topics, expected_topics);

    // The value carries the full payment, remainder included.
    let event_data: PurchaseCompleted = data.try_into_val(&f.env).unwrap();
    assert_eq!(
        event_data,
        PurchaseCompleted {
            purchaser: purchaser.clone(),
            beneficiary: beneficiary.clone(),
            value: 250,
            amount: 2,
        }
    );
}

#[test]
fn test_default_buy_names_buyer_as_beneficiary() {
    let f = Fixture::new();
    let buyer = f.funded_buyer(1_000);
    set_time(&f.env, START);

    f.client.buy(&buyer, &300);

    let events = events_from(&f.env, &f.client.address);
    let (_, data) = events.last().expect("No events found");
    let event_data: PurchaseCompleted = data.try_into_val(&f.env).unwrap();
    assert_eq!(event_data.purchaser, buyer);
    assert_eq!(event_data.beneficiary, buyer);
    assert_eq!(event_data.amount, 3);
}

#[test]
fn test_sale_extended_event() {
    let f = Fixture::new();

    f.client.extend_duration(&f.controller, &(END + 3_600));

    let events = events_from(&f.env, &f.client.address);
    let (topics, data) = events.last().expect("No events found");

    let expected_topics: Vec<Val> = vec![&f.env, symbol_short!("extended").into_val(&f.env)];
    assert_eq!(*topics, expected_topics);

    let event_data: SaleExtended = data.try_into_val(&f.env).unwrap();
    assert_eq!(
        event_data,
        SaleExtended {
            new_end_time: END + 3_600
        }
    );
}

#[test]
fn test_finalized_event() {
    let f = Fixture::new();
    set_time(&f.env, END + 1);

    f.client.finalize(&f.controller);

    let events = events_from(&f.env, &f.client.address);
    let (topics, data) = events.last().expect("No events found");

    let expected_topics: Vec<Val> = vec![&f.env, symbol_short!("finalized").into_val(&f.env)];
    assert_eq!(*topics, expected_topics);

    let event_data: Finalized = data.try_into_val(&f.env).unwrap();
    assert_eq!(
        event_data,
        Finalized {
            wallet: f.wallet.clone()
        }
    );
}
