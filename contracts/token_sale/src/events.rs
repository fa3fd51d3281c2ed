//! # Events
//!
//! Typed contract events published for off-chain observability (the backend
//! indexer consumes these). Events carry no authority: none of the core
//! invariants depend on them.
//!
//! Topic layout: a short symbol identifying the kind, plus the affected
//! address where one exists. The data payload is a `#[contracttype]` struct
//! so indexers get named fields instead of positional tuples.

use soroban_sdk::{contracttype, symbol_short, Address, Env};

/// Emitted once by `init`. Topic: `("init",)`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SaleInitialized {
    pub token: Address,
    pub wallet: Address,
    pub rate: i128,
    pub goal: i128,
    pub opening_time: u64,
    pub closing_time: u64,
}

/// Emitted on every accepted contribution. Topic: `("purchase", beneficiary)`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct TokensPurchased {
    /// Address that paid and authorized the contribution.
    pub payer: Address,
    /// Address credited in the ledger and owed the asset allocation.
    pub beneficiary: Address,
    /// Contributed amount in payment-token units.
    pub amount: i128,
    /// Asset quantity owed for this contribution (`amount * rate`).
    pub token_amount: i128,
}

/// Emitted the instant the goal latch is set. Topic: `("goal",)`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct GoalReached {
    pub total_raised: i128,
    pub goal: i128,
}

/// Emitted once by `finalize`. Topic: `("finalized",)`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SaleFinalized {
    pub total_raised: i128,
    /// `true` → assets distributed and funds forwarded;
    /// `false` → refunds enabled.
    pub distributed: bool,
}

/// Emitted per refund payout. Topic: `("refund", contributor)`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RefundIssued {
    pub contributor: Address,
    pub amount: i128,
}

/// Emitted when the owner moves the closing time. Topic: `("extended",)`.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ClosingExtended {
    pub previous_closing: u64,
    pub new_closing: u64,
}

pub fn sale_initialized(env: &Env, event: SaleInitialized) {
    env.events().publish((symbol_short!("init"),), event);
}

pub fn tokens_purchased(env: &Env, event: TokensPurchased) {
    env.events()
        .publish((symbol_short!("purchase"), event.beneficiary.clone()), event);
}

pub fn goal_reached(env: &Env, event: GoalReached) {
    env.events().publish((symbol_short!("goal"),), event);
}

pub fn sale_finalized(env: &Env, event: SaleFinalized) {
    env.events().publish((symbol_short!("finalized"),), event);
}

pub fn refund_issued(env: &Env, event: RefundIssued) {
    env.events()
        .publish((symbol_short!("refund"), event.contributor.clone()), event);
}

pub fn closing_extended(env: &Env, event: ClosingExtended) {
    env.events().publish((symbol_short!("extended"),), event);
}

pub fn sale_paused(env: &Env, owner: &Address) {
    env.events().publish((symbol_short!("paused"),), owner.clone());
}

pub fn sale_unpaused(env: &Env, owner: &Address) {
    env.events()
        .publish((symbol_short!("unpaused"),), owner.clone());
}
