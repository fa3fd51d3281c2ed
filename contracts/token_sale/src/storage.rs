//! # Storage
//!
//! Typed helpers over Soroban's two storage tiers used by the sale:
//!
//! ## Instance storage (contract-lifetime TTL)
//!
//! | Key       | Type         | Description                                 |
//! |-----------|--------------|---------------------------------------------|
//! | `Config`  | `SaleConfig` | Immutable sale configuration                |
//! | `State`   | `SaleState`  | Mutable totals, window and outcome latches  |
//! | `Paused`  | `bool`       | Owner-controlled contribution gate          |
//! | `Guard`   | `bool`       | Reentrancy flag, set around external calls  |
//!
//! Instance TTL is bumped by **7 days** whenever it falls below 1 day remaining.
//!
//! ## Persistent storage (per-entry TTL)
//!
//! | Key                     | Type           | Description                   |
//! |-------------------------|----------------|-------------------------------|
//! | `Contribution(Address)` | `i128`         | Cumulative contributed amount |
//! | `Participants`          | `Vec<Address>` | Duplicate-free registry       |
//!
//! Persistent TTL is bumped by **30 days** whenever it falls below 7 days
//! remaining.
//!
//! ## Ledger / registry invariant
//!
//! An address has a `Contribution` entry iff it appears in `Participants`.
//! `record_contribution` is the only growth path (appends on the first
//! nonzero balance); `clear_contribution` + `remove_participant` is the only
//! shrink path (full refund). Callers must use them together.

use soroban_sdk::{contracttype, Address, Env, Vec};

use crate::types::{Sale, SaleConfig, SaleState};

// ── TTL Constants ────────────────────────────────────────────────────

/// Approximate ledgers per day (~5 seconds per ledger).
const DAY_IN_LEDGERS: u32 = 17_280;

/// Instance storage: bump by 7 days when below 1 day remaining.
const INSTANCE_BUMP_AMOUNT: u32 = 7 * DAY_IN_LEDGERS;
const INSTANCE_LIFETIME_THRESHOLD: u32 = DAY_IN_LEDGERS;

/// Persistent storage: bump by 30 days when below 7 days remaining.
const PERSISTENT_BUMP_AMOUNT: u32 = 30 * DAY_IN_LEDGERS;
const PERSISTENT_LIFETIME_THRESHOLD: u32 = 7 * DAY_IN_LEDGERS;

// ── Storage Keys ─────────────────────────────────────────────────────

/// All contract storage keys.
///
/// Instance-tier keys (`Config`, `State`, `Paused`, `Guard`) live as long as
/// the contract and are extended together. Persistent-tier keys
/// (`Contribution`, `Participants`) hold per-contributor data with
/// independent TTLs.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum DataKey {
    /// Immutable sale configuration (Instance).
    Config,
    /// Mutable sale state (Instance).
    State,
    /// Contribution pause flag (Instance).
    Paused,
    /// Reentrancy guard flag (Instance).
    Guard,
    /// Cumulative contribution keyed by address (Persistent).
    Contribution(Address),
    /// Ordered, duplicate-free contributor registry (Persistent).
    Participants,
}

// ── Instance Storage Helpers ─────────────────────────────────────────

/// Extend instance storage TTL if it falls below the threshold.
fn bump_instance(env: &Env) {
    env.storage()
        .instance()
        .extend_ttl(INSTANCE_LIFETIME_THRESHOLD, INSTANCE_BUMP_AMOUNT);
}

pub fn has_config(env: &Env) -> bool {
    env.storage().instance().has(&DataKey::Config)
}

pub fn set_config(env: &Env, config: &SaleConfig) {
    env.storage().instance().set(&DataKey::Config, config);
    bump_instance(env);
}

/// Load the immutable sale configuration.
/// Panics if `init` has not been called.
pub fn get_config(env: &Env) -> SaleConfig {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::Config)
        .expect("sale not initialized")
}

pub fn set_state(env: &Env, state: &SaleState) {
    env.storage().instance().set(&DataKey::State, state);
    bump_instance(env);
}

/// Load the mutable sale state.
/// Panics if `init` has not been called.
pub fn get_state(env: &Env) -> SaleState {
    bump_instance(env);
    env.storage()
        .instance()
        .get(&DataKey::State)
        .expect("sale not initialized")
}

/// Load the full [`Sale`] view by combining config and state.
pub fn load_sale(env: &Env) -> Sale {
    let config = get_config(env);
    let state = get_state(env);
    Sale {
        owner: config.owner,
        token: config.token,
        payment_token: config.payment_token,
        wallet: config.wallet,
        rate: config.rate,
        goal: config.goal,
        opening_time: config.opening_time,
        closing_time: state.closing_time,
        total_raised: state.total_raised,
        goal_reached: state.goal_reached,
        finalized: state.finalized,
        tokens_distributed: state.tokens_distributed,
        refunds_enabled: state.refunds_enabled,
    }
}

pub fn set_paused(env: &Env, paused: bool) {
    env.storage().instance().set(&DataKey::Paused, &paused);
    bump_instance(env);
}

pub fn is_paused(env: &Env) -> bool {
    env.storage()
        .instance()
        .get(&DataKey::Paused)
        .unwrap_or(false)
}

/// Whether an operation that calls out to a token contract is in flight.
pub fn guard_engaged(env: &Env) -> bool {
    env.storage()
        .instance()
        .get(&DataKey::Guard)
        .unwrap_or(false)
}

pub fn set_guard(env: &Env, engaged: bool) {
    env.storage().instance().set(&DataKey::Guard, &engaged);
}

// ── Persistent Storage Helpers ───────────────────────────────────────

/// Extend the TTL for a persistent storage key.
fn bump_persistent(env: &Env, key: &DataKey) {
    env.storage()
        .persistent()
        .extend_ttl(key, PERSISTENT_LIFETIME_THRESHOLD, PERSISTENT_BUMP_AMOUNT);
}

/// Cumulative amount contributed on behalf of `contributor`.
/// Zero for addresses that never contributed or were fully refunded.
pub fn get_contribution(env: &Env, contributor: &Address) -> i128 {
    let key = DataKey::Contribution(contributor.clone());
    match env.storage().persistent().get(&key) {
        Some(amount) => {
            bump_persistent(env, &key);
            amount
        }
        None => 0,
    }
}

pub fn set_contribution(env: &Env, contributor: &Address, amount: i128) {
    let key = DataKey::Contribution(contributor.clone());
    env.storage().persistent().set(&key, &amount);
    bump_persistent(env, &key);
}

/// Drop the ledger entry entirely, used by the refund path.
pub fn clear_contribution(env: &Env, contributor: &Address) {
    env.storage()
        .persistent()
        .remove(&DataKey::Contribution(contributor.clone()));
}

/// The contributor registry, in insertion order.
pub fn get_participants(env: &Env) -> Vec<Address> {
    let key = DataKey::Participants;
    match env.storage().persistent().get(&key) {
        Some(list) => {
            bump_persistent(env, &key);
            list
        }
        None => Vec::new(env),
    }
}

fn set_participants(env: &Env, participants: &Vec<Address>) {
    let key = DataKey::Participants;
    env.storage().persistent().set(&key, participants);
    bump_persistent(env, &key);
}

/// Append a first-time contributor to the registry.
///
/// Callers guarantee the address is not already present (prior ledger
/// balance was zero).
pub fn push_participant(env: &Env, contributor: &Address) {
    let mut participants = get_participants(env);
    participants.push_back(contributor.clone());
    set_participants(env, &participants);
}

/// Remove a contributor from the registry by swap-with-last-and-pop.
///
/// O(1) in writes but does not preserve registry ordering; the last entry
/// takes the vacated slot. Returns `true` if the address was present.
pub fn remove_participant(env: &Env, contributor: &Address) -> bool {
    let mut participants = get_participants(env);
    let index = match participants.first_index_of(contributor.clone()) {
        Some(index) => index,
        None => return false,
    };
    let last = participants.len() - 1;
    if index != last {
        let tail = participants.get_unchecked(last);
        participants.set(index, tail);
    }
    participants.pop_back();
    set_participants(env, &participants);
    true
}
