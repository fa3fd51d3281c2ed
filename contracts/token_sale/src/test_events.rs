extern crate std;

use soroban_sdk::{
    symbol_short,
    testutils::{Address as _, Events, Ledger},
    token, vec, Address, Env, IntoVal, TryIntoVal,
};

use crate::events::{GoalReached, RefundIssued, SaleFinalized, TokensPurchased};
use crate::{TokenSale, TokenSaleClient};

const OPENING: u64 = 1_000;
const CLOSING: u64 = 2_000;

struct EventFixture {
    env: Env,
    client: TokenSaleClient<'static>,
    payment_sac: token::StellarAssetClient<'static>,
}

fn setup(rate: i128, goal: i128) -> EventFixture {
    let env = Env::default();
    env.mock_all_auths();

    let owner = Address::generate(&env);
    let wallet = Address::generate(&env);
    let token_admin = Address::generate(&env);

    let asset = env.register_stellar_asset_contract_v2(token_admin.clone());
    let payment = env.register_stellar_asset_contract_v2(token_admin.clone());
    let payment_sac = token::StellarAssetClient::new(&env, &payment.address());

    let contract_id = env.register(TokenSale, ());
    let client = TokenSaleClient::new(&env, &contract_id);
    client.init(
        &owner,
        &asset.address(),
        &payment.address(),
        &wallet,
        &rate,
        &goal,
        &OPENING,
        &CLOSING,
    );
    token::StellarAssetClient::new(&env, &asset.address()).mint(&contract_id, &(goal * rate));

    env.ledger().with_mut(|li| li.timestamp = OPENING);

    EventFixture {
        env,
        client,
        payment_sac,
    }
}

#[test]
fn test_purchase_event() {
    let f = setup(2, 1_000);
    let payer = Address::generate(&f.env);
    let beneficiary = Address::generate(&f.env);
    f.payment_sac.mint(&payer, &500);

    f.client.contribute(&payer, &beneficiary, &250);

    let all_events = f.env.events().all();
    let last_event = all_events.last().expect("No events found");

    // Topic: ("purchase", beneficiary)
    assert_eq!(last_event.0, f.client.address);
    let expected_topics = vec![
        &f.env,
        symbol_short!("purchase").into_val(&f.env),
        beneficiary.clone().into_val(&f.env),
    ];
    assert_eq!(last_event.1, expected_topics);

    // Data: TokensPurchased struct
    let event_data: TokensPurchased = last_event.2.try_into_val(&f.env).unwrap();
    assert_eq!(
        event_data,
        TokensPurchased {
            payer: payer.clone(),
            beneficiary: beneficiary.clone(),
            amount: 250,
            token_amount: 500,
        }
    );
}

#[test]
fn test_goal_reached_event_fires_on_crossing_contribution() {
    let f = setup(1, 100);
    let alice = Address::generate(&f.env);
    f.payment_sac.mint(&alice, &200);

    f.client.contribute(&alice, &alice, &100);

    // The goal event precedes the purchase event of the crossing contribution.
    let goal_topics = vec![&f.env, symbol_short!("goal").into_val(&f.env)];
    let all_events = f.env.events().all();
    let goal_event = all_events
        .iter()
        .find(|e| e.1 == goal_topics)
        .expect("goal event not emitted");

    let event_data: GoalReached = goal_event.2.try_into_val(&f.env).unwrap();
    assert_eq!(
        event_data,
        GoalReached {
            total_raised: 100,
            goal: 100,
        }
    );
}

#[test]
fn test_finalized_event_distribution_branch() {
    let f = setup(1, 100);
    let alice = Address::generate(&f.env);
    f.payment_sac.mint(&alice, &100);
    f.client.contribute(&alice, &alice, &100);

    f.env.ledger().with_mut(|li| li.timestamp = CLOSING + 1);
    f.client.finalize();

    let all_events = f.env.events().all();
    let last_event = all_events.last().expect("No events found");

    assert_eq!(last_event.0, f.client.address);
    let expected_topics = vec![&f.env, symbol_short!("finalized").into_val(&f.env)];
    assert_eq!(last_event.1, expected_topics);

    let event_data: SaleFinalized = last_event.2.try_into_val(&f.env).unwrap();
    assert_eq!(
        event_data,
        SaleFinalized {
            total_raised: 100,
            distributed: true,
        }
    );
}

#[test]
fn test_finalized_event_refund_branch() {
    let f = setup(1, 100);
    let alice = Address::generate(&f.env);
    f.payment_sac.mint(&alice, &100);
    f.client.contribute(&alice, &alice, &60);

    f.env.ledger().with_mut(|li| li.timestamp = CLOSING + 1);
    f.client.finalize();

    let all_events = f.env.events().all();
    let last_event = all_events.last().expect("No events found");

    let event_data: SaleFinalized = last_event.2.try_into_val(&f.env).unwrap();
    assert_eq!(
        event_data,
        SaleFinalized {
            total_raised: 60,
            distributed: false,
        }
    );
}

#[test]
fn test_refund_event() {
    let f = setup(1, 100);
    let alice = Address::generate(&f.env);
    f.payment_sac.mint(&alice, &100);
    f.client.contribute(&alice, &alice, &60);

    f.env.ledger().with_mut(|li| li.timestamp = CLOSING + 1);
    f.client.finalize();
    f.client.claim_refund(&alice);

    let all_events = f.env.events().all();
    let last_event = all_events.last().expect("No events found");

    // Topic: ("refund", contributor)
    assert_eq!(last_event.0, f.client.address);
    let expected_topics = vec![
        &f.env,
        symbol_short!("refund").into_val(&f.env),
        alice.clone().into_val(&f.env),
    ];
    assert_eq!(last_event.1, expected_topics);

    let event_data: RefundIssued = last_event.2.try_into_val(&f.env).unwrap();
    assert_eq!(
        event_data,
        RefundIssued {
            contributor: alice.clone(),
            amount: 60,
        }
    );
}
