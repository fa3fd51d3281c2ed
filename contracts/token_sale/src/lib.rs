//! # Token Sale Contract
//!
//! This is the root crate of a **goal-gated, time-bounded token sale**.
//! It exposes the single Soroban contract `TokenSale` whose entry points
//! cover the full sale lifecycle:
//!
//! | Phase        | Entry Point(s)                                  |
//! |--------------|-------------------------------------------------|
//! | Bootstrap    | [`TokenSale::init`]                             |
//! | Window admin | `extend_closing`, `pause`, `unpause`            |
//! | Contribution | [`TokenSale::contribute`]                       |
//! | Settlement   | [`TokenSale::finalize`], [`TokenSale::claim_refund`] |
//! | Queries      | `total_raised`, `contribution_of`, `participant_count`, `participant_at`, `goal_reached`, `tokens_distributed`, `refunds_enabled`, `is_open`, `has_closed`, `is_paused`, `status`, `get_sale` |
//!
//! ## Settlement model
//!
//! Contributions are accepted only inside the `[opening_time, closing_time]`
//! window and only while the running total stays at or below the goal; a
//! contribution that would overshoot is rejected whole, never split. Payment
//! tokens sit in escrow inside the contract until `finalize` picks exactly
//! one terminal branch:
//!
//! - goal reached → deliver `balance * rate` asset units to every registered
//!   contributor, then forward the raised funds to the configured wallet;
//! - goal missed → enable per-contributor refunds of the full escrowed
//!   balance.
//!
//! The two branches are mutually exclusive, each idempotent, and no fund
//! that was forwarded can ever need to be refunded: nothing leaves escrow
//! before the outcome is decided.
//!
//! ## Architecture
//!
//! Storage access is fully delegated to [`storage`]; event shapes live in
//! [`events`]. This file contains only the entry points: the contribution
//! pipeline (validate → record → evaluate goal → escrow → emit) and the
//! finalization state machine.

#![no_std]

use soroban_sdk::{
    contract, contracterror, contractimpl, contractmeta, panic_with_error, token, Address, Env,
};

mod events;
mod storage;
mod types;

#[cfg(test)]
mod invariants;
#[cfg(test)]
mod test_events;

use storage::{
    clear_contribution, get_config, get_contribution, get_participants, get_state, guard_engaged,
    has_config, is_paused, load_sale, push_participant, remove_participant, set_config,
    set_contribution, set_guard, set_paused, set_state,
};
pub use types::{Sale, SaleConfig, SaleState, SaleStatus};

contractmeta!(key = "Description", val = "Goal-gated time-bounded token sale");

#[contracterror]
#[derive(Copy, Clone, Debug, Eq, PartialEq, PartialOrd, Ord)]
#[repr(u32)]
pub enum Error {
    AlreadyInitialized = 1,
    /// Bad construction parameters: window inverted, or goal/rate not positive.
    InvalidConfig      = 2,
    /// Contribution attempted before the opening time.
    SaleNotOpen        = 3,
    /// Mutation attempted after the closing time (or after settlement).
    SaleAlreadyClosed  = 4,
    /// Finalization attempted while the window is still open.
    SaleNotClosed      = 5,
    SalePaused         = 6,
    ZeroAmount         = 7,
    /// The contribution would push the total past the funding goal.
    GoalExceeded       = 8,
    /// Closing-time extension that does not move the window forward.
    InvalidWindow      = 9,
    IndexOutOfRange    = 10,
    RefundsNotEnabled  = 11,
    NothingToRefund    = 12,
    /// Nested entry into an operation that calls an external token contract.
    ReentrantCall      = 13,
    Overflow           = 14,
}

#[contract]
pub struct TokenSale;

#[contractimpl]
impl TokenSale {
    // ─────────────────────────────────────────────────────────
    // Initialisation
    // ─────────────────────────────────────────────────────────

    /// Initialise the sale. Must be called exactly once after deployment;
    /// subsequent calls fail with `Error::AlreadyInitialized`.
    ///
    /// - `owner` administrates the window and the pause gate, and must sign.
    /// - `token` is the asset distributed on success; the contract must be
    ///   funded with at least `goal * rate` units of it before finalization.
    /// - `payment_token` is the base currency contributions are made in.
    /// - `wallet` receives the raised funds when the goal is met.
    /// - `rate`, `goal` must be positive; `opening_time < closing_time`.
    #[allow(clippy::too_many_arguments)]
    pub fn init(
        env: Env,
        owner: Address,
        token: Address,
        payment_token: Address,
        wallet: Address,
        rate: i128,
        goal: i128,
        opening_time: u64,
        closing_time: u64,
    ) {
        if has_config(&env) {
            panic_with_error!(&env, Error::AlreadyInitialized);
        }
        owner.require_auth();

        if rate <= 0 || goal <= 0 || opening_time >= closing_time {
            panic_with_error!(&env, Error::InvalidConfig);
        }

        let config = SaleConfig {
            owner,
            token: token.clone(),
            payment_token,
            wallet: wallet.clone(),
            rate,
            goal,
            opening_time,
        };
        let state = SaleState {
            closing_time,
            total_raised: 0,
            goal_reached: false,
            finalized: false,
            tokens_distributed: false,
            refunds_enabled: false,
        };

        set_config(&env, &config);
        set_state(&env, &state);
        set_paused(&env, false);

        events::sale_initialized(
            &env,
            events::SaleInitialized {
                token,
                wallet,
                rate,
                goal,
                opening_time,
                closing_time,
            },
        );
    }

    // ─────────────────────────────────────────────────────────
    // Contribution
    // ─────────────────────────────────────────────────────────

    /// Contribute `amount` of the payment token on behalf of `beneficiary`.
    ///
    /// `payer` signs and pays; `beneficiary` is credited in the ledger and
    /// later receives the asset allocation (or the refund). Returns the asset
    /// quantity owed for this contribution, `amount * rate`.
    ///
    /// Preconditions, all checked before any state is touched:
    /// - the sale is open (`opening_time <= now <= closing_time`), not paused,
    ///   not finalized;
    /// - `amount > 0`;
    /// - `total_raised + amount <= goal` — an overshooting contribution is
    ///   rejected whole (`GoalExceeded`), never partially accepted.
    ///
    /// The payment sits in contract escrow until settlement, so it remains
    /// refundable if the goal is missed.
    pub fn contribute(env: Env, payer: Address, beneficiary: Address, amount: i128) -> i128 {
        payer.require_auth();

        if guard_engaged(&env) {
            panic_with_error!(&env, Error::ReentrantCall);
        }
        if is_paused(&env) {
            panic_with_error!(&env, Error::SalePaused);
        }

        let config = get_config(&env);
        let mut state = get_state(&env);
        let now = env.ledger().timestamp();

        if state.finalized || now > state.closing_time {
            panic_with_error!(&env, Error::SaleAlreadyClosed);
        }
        if now < config.opening_time {
            panic_with_error!(&env, Error::SaleNotOpen);
        }
        if amount <= 0 {
            panic_with_error!(&env, Error::ZeroAmount);
        }

        let new_total = state
            .total_raised
            .checked_add(amount)
            .unwrap_or_else(|| panic_with_error!(&env, Error::Overflow));
        if new_total > config.goal {
            panic_with_error!(&env, Error::GoalExceeded);
        }
        let token_amount = amount
            .checked_mul(config.rate)
            .unwrap_or_else(|| panic_with_error!(&env, Error::Overflow));

        // Escrow the payment inside the contract. The guard rejects any
        // nested call back into the sale while the token client runs.
        set_guard(&env, true);
        token::Client::new(&env, &config.payment_token).transfer(
            &payer,
            &env.current_contract_address(),
            &amount,
        );
        set_guard(&env, false);

        // Record: ledger entry, registry membership, running total.
        let prior = get_contribution(&env, &beneficiary);
        set_contribution(&env, &beneficiary, prior + amount);
        if prior == 0 {
            push_participant(&env, &beneficiary);
        }
        state.total_raised = new_total;

        // Evaluate the goal latch; one-way, set at most once.
        if !state.goal_reached && state.total_raised >= config.goal {
            state.goal_reached = true;
            events::goal_reached(
                &env,
                events::GoalReached {
                    total_raised: state.total_raised,
                    goal: config.goal,
                },
            );
        }

        set_state(&env, &state);

        events::tokens_purchased(
            &env,
            events::TokensPurchased {
                payer,
                beneficiary,
                amount,
                token_amount,
            },
        );

        token_amount
    }

    // ─────────────────────────────────────────────────────────
    // Settlement
    // ─────────────────────────────────────────────────────────

    /// Settle the sale into exactly one terminal outcome. Callable by anyone
    /// once the closing time has passed; fails `SaleNotClosed` before that.
    ///
    /// - Goal reached: deliver the full asset allocation to every registered
    ///   contributor, then forward the escrowed funds to the wallet.
    /// - Goal missed: enable the refund path.
    ///
    /// Idempotent: a repeat call on a settled sale is a no-op.
    pub fn finalize(env: Env) {
        if guard_engaged(&env) {
            panic_with_error!(&env, Error::ReentrantCall);
        }

        let config = get_config(&env);
        let mut state = get_state(&env);

        if env.ledger().timestamp() <= state.closing_time {
            panic_with_error!(&env, Error::SaleNotClosed);
        }
        if state.finalized {
            return;
        }

        if state.goal_reached {
            set_guard(&env, true);
            let asset = token::Client::new(&env, &config.token);
            let contract = env.current_contract_address();
            for participant in get_participants(&env).iter() {
                let balance = get_contribution(&env, &participant);
                let allocation = balance
                    .checked_mul(config.rate)
                    .unwrap_or_else(|| panic_with_error!(&env, Error::Overflow));
                asset.transfer(&contract, &participant, &allocation);
            }
            state.tokens_distributed = true;

            // Fund router: raised funds leave escrow only on this branch,
            // where they can no longer need refunding.
            token::Client::new(&env, &config.payment_token).transfer(
                &contract,
                &config.wallet,
                &state.total_raised,
            );
            set_guard(&env, false);
        } else {
            state.refunds_enabled = true;
        }

        state.finalized = true;
        set_state(&env, &state);

        events::sale_finalized(
            &env,
            events::SaleFinalized {
                total_raised: state.total_raised,
                distributed: state.tokens_distributed,
            },
        );
    }

    /// Pay back the full escrowed balance of `contributor`.
    ///
    /// Only reachable after a finalization that missed the goal. The ledger
    /// entry is cleared and the contributor leaves the registry by
    /// swap-with-last-and-pop (order not preserved). A second call finds a
    /// zero balance and fails `NothingToRefund`.
    pub fn claim_refund(env: Env, contributor: Address) {
        contributor.require_auth();

        if guard_engaged(&env) {
            panic_with_error!(&env, Error::ReentrantCall);
        }

        let state = get_state(&env);
        if !state.refunds_enabled {
            panic_with_error!(&env, Error::RefundsNotEnabled);
        }

        let balance = get_contribution(&env, &contributor);
        if balance == 0 {
            panic_with_error!(&env, Error::NothingToRefund);
        }

        let config = get_config(&env);
        set_guard(&env, true);
        token::Client::new(&env, &config.payment_token).transfer(
            &env.current_contract_address(),
            &contributor,
            &balance,
        );
        set_guard(&env, false);

        clear_contribution(&env, &contributor);
        remove_participant(&env, &contributor);

        events::refund_issued(
            &env,
            events::RefundIssued {
                contributor,
                amount: balance,
            },
        );
    }

    // ─────────────────────────────────────────────────────────
    // Window & pause administration
    // ─────────────────────────────────────────────────────────

    /// Move the closing time forward. Owner only.
    ///
    /// Fails `SaleAlreadyClosed` once the current window has elapsed and
    /// `InvalidWindow` unless `new_closing` is strictly later than the
    /// current closing time.
    pub fn extend_closing(env: Env, new_closing: u64) {
        let config = get_config(&env);
        config.owner.require_auth();

        let mut state = get_state(&env);
        if state.finalized || env.ledger().timestamp() > state.closing_time {
            panic_with_error!(&env, Error::SaleAlreadyClosed);
        }
        if new_closing <= state.closing_time {
            panic_with_error!(&env, Error::InvalidWindow);
        }

        let previous_closing = state.closing_time;
        state.closing_time = new_closing;
        set_state(&env, &state);

        events::closing_extended(
            &env,
            events::ClosingExtended {
                previous_closing,
                new_closing,
            },
        );
    }

    /// Block new contributions. Owner only. Settlement of funds already
    /// recorded is unaffected.
    pub fn pause(env: Env) {
        let config = get_config(&env);
        config.owner.require_auth();
        set_paused(&env, true);
        events::sale_paused(&env, &config.owner);
    }

    /// Re-open the contribution gate. Owner only.
    pub fn unpause(env: Env) {
        let config = get_config(&env);
        config.owner.require_auth();
        set_paused(&env, false);
        events::sale_unpaused(&env, &config.owner);
    }

    // ─────────────────────────────────────────────────────────
    // Queries
    // ─────────────────────────────────────────────────────────

    /// Sum of all accepted contributions. Refunds do not subtract from this
    /// figure; it records what the sale raised, not what remains in escrow.
    pub fn total_raised(env: Env) -> i128 {
        get_state(&env).total_raised
    }

    /// Current ledger balance of `contributor` (zero after a full refund).
    pub fn contribution_of(env: Env, contributor: Address) -> i128 {
        get_contribution(&env, &contributor)
    }

    pub fn participant_count(env: Env) -> u32 {
        get_participants(&env).len()
    }

    /// Registry entry at `index`; fails `IndexOutOfRange` past the end.
    /// Ordering is insertion order until the first refund-driven removal.
    pub fn participant_at(env: Env, index: u32) -> Address {
        let participants = get_participants(&env);
        match participants.get(index) {
            Some(address) => address,
            None => panic_with_error!(&env, Error::IndexOutOfRange),
        }
    }

    pub fn goal_reached(env: Env) -> bool {
        get_state(&env).goal_reached
    }

    pub fn tokens_distributed(env: Env) -> bool {
        get_state(&env).tokens_distributed
    }

    pub fn refunds_enabled(env: Env) -> bool {
        get_state(&env).refunds_enabled
    }

    /// True iff the current ledger time is inside the contribution window.
    pub fn is_open(env: Env) -> bool {
        let config = get_config(&env);
        let state = get_state(&env);
        let now = env.ledger().timestamp();
        !state.finalized && now >= config.opening_time && now <= state.closing_time
    }

    /// True iff the contribution window has elapsed.
    pub fn has_closed(env: Env) -> bool {
        let state = get_state(&env);
        env.ledger().timestamp() > state.closing_time
    }

    pub fn is_paused(env: Env) -> bool {
        is_paused(&env)
    }

    /// Lifecycle position of the sale.
    pub fn status(env: Env) -> SaleStatus {
        let config = get_config(&env);
        let state = get_state(&env);
        let now = env.ledger().timestamp();
        if state.finalized {
            SaleStatus::Settled
        } else if now > state.closing_time {
            SaleStatus::ClosedPending
        } else if now >= config.opening_time {
            SaleStatus::Open
        } else {
            SaleStatus::Pending
        }
    }

    /// Combined configuration + state view.
    pub fn get_sale(env: Env) -> Sale {
        load_sale(&env)
    }
}
