//! # Types
//!
//! Shared data structures of the token sale contract.
//!
//! ## Design decisions
//!
//! ### Config / State split
//!
//! A sale is internally stored as two separate instance entries:
//!
//! - [`SaleConfig`] — written once by `init`; never mutated.
//! - [`SaleState`] — written on every contribution, extension, refund and
//!   at finalization.
//!
//! The public API exposes the reconstructed [`Sale`] struct for convenience.
//!
//! ### Status as a Finite-State Machine
//!
//! [`SaleStatus`] enforces a strict forward-only lifecycle:
//!
//! ```text
//! Pending ──► Open ──► ClosedPending ──► Settled
//! ```
//!
//! `Pending`/`Open`/`ClosedPending` are derived from the ledger clock against
//! the sale window; `Settled` is entered by `finalize` and is terminal.
//!
//! ### Write-once latches
//!
//! `goal_reached`, `finalized`, `tokens_distributed` and `refunds_enabled`
//! only ever move false → true. No entry point clears them; every write path
//! checks the latch before setting it.

use soroban_sdk::{contracttype, Address};

/// Lifecycle status of the sale, derived from state + ledger time.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SaleStatus {
    /// Before the opening time; contributions rejected.
    Pending,
    /// Inside the contribution window.
    Open,
    /// Past the closing time, finalization not yet executed.
    ClosedPending,
    /// Finalized into exactly one of the two terminal outcomes.
    Settled,
}

/// Immutable sale configuration, written once by `init`.
///
/// Stored separately from mutable state so the hot contribution path only
/// rewrites the small [`SaleState`] entry.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SaleConfig {
    /// Administrative address; may extend the window and pause the sale.
    pub owner: Address,
    /// The asset being sold, delivered to contributors on success.
    pub token: Address,
    /// The base currency contributions are denominated in.
    pub payment_token: Address,
    /// Destination for raised funds once the goal outcome is confirmed.
    pub wallet: Address,
    /// Payment-to-asset conversion rate (asset units per payment unit).
    pub rate: i128,
    /// Funding goal in payment-token units.
    pub goal: i128,
    /// Ledger timestamp at which contributions open.
    pub opening_time: u64,
}

/// Mutable sale state, updated on contributions and settlement.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SaleState {
    /// Ledger timestamp at which contributions close. The only field the
    /// owner can move, and only forward, via `extend_closing`.
    pub closing_time: u64,
    /// Running sum of all accepted contributions. Maintained incrementally;
    /// never recomputed by scanning the ledger entries.
    pub total_raised: i128,
    /// Latch: set the instant `total_raised` first reaches the goal.
    pub goal_reached: bool,
    /// Latch: set once `finalize` has executed a terminal branch.
    pub finalized: bool,
    /// Latch: set once the asset allocation has been delivered.
    pub tokens_distributed: bool,
    /// Latch: set at finalization when the goal was missed.
    pub refunds_enabled: bool,
}

/// Full view of the sale, reconstructed from the split
/// `SaleConfig` + `SaleState` storage entries for the query surface.
#[contracttype]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Sale {
    pub owner: Address,
    pub token: Address,
    pub payment_token: Address,
    pub wallet: Address,
    pub rate: i128,
    pub goal: i128,
    pub opening_time: u64,
    pub closing_time: u64,
    pub total_raised: i128,
    pub goal_reached: bool,
    pub finalized: bool,
    pub tokens_distributed: bool,
    pub refunds_enabled: bool,
}
