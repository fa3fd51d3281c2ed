//! Canonical event types emitted by the token sale contract.
//!
//! These mirror the Soroban contract events defined in
//! `contracts/token_sale/src/events.rs`.

use serde::{Deserialize, Serialize};

/// All recognised event kinds from the sale contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// The sale was initialised (`init` topic).
    SaleInitialized,
    /// A contribution was accepted (`purchase` topic).
    TokensPurchased,
    /// The funding goal latch was set (`goal` topic).
    GoalReached,
    /// The sale settled into a terminal outcome (`finalized` topic).
    SaleFinalized,
    /// An escrowed contribution was paid back (`refund` topic).
    RefundIssued,
    /// The owner moved the closing time forward (`extended` topic).
    ClosingExtended,
    /// Contributions were paused (`paused` topic).
    SalePaused,
    /// Contributions were re-enabled (`unpaused` topic).
    SaleUnpaused,
    /// An event from this contract that we don't recognise yet.
    Unknown,
}

impl EventKind {
    /// Parse the leading topic symbol string produced by Soroban into an [`EventKind`].
    pub fn from_topic(topic: &str) -> Self {
        match topic {
            "init" => Self::SaleInitialized,
            "purchase" => Self::TokensPurchased,
            "goal" => Self::GoalReached,
            "finalized" => Self::SaleFinalized,
            "refund" => Self::RefundIssued,
            "extended" => Self::ClosingExtended,
            "paused" => Self::SalePaused,
            "unpaused" => Self::SaleUnpaused,
            _ => Self::Unknown,
        }
    }

    /// Return a short identifier string suitable for storage in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::SaleInitialized => "sale_initialized",
            Self::TokensPurchased => "tokens_purchased",
            Self::GoalReached => "goal_reached",
            Self::SaleFinalized => "sale_finalized",
            Self::RefundIssued => "refund_issued",
            Self::ClosingExtended => "closing_extended",
            Self::SalePaused => "sale_paused",
            Self::SaleUnpaused => "sale_unpaused",
            Self::Unknown => "unknown",
        }
    }
}

/// A fully decoded sale event, ready to be stored in the database.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleEvent {
    pub event_type: String,
    /// Beneficiary / contributor address from the event topic, when present.
    pub contributor: Option<String>,
    /// Paying or acting address from the event data, when present.
    pub payer: Option<String>,
    /// Payment-token amount (contribution, refund, total raised) as a string.
    pub amount: Option<String>,
    /// Asset quantity for purchase events, as a string.
    pub token_amount: Option<String>,
    pub ledger: i64,
    pub timestamp: i64,
    pub contract_id: String,
    pub tx_hash: Option<String>,
}

/// A raw event record as stored in / read from the database.
#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct EventRecord {
    pub id: i64,
    pub event_type: String,
    pub contributor: Option<String>,
    pub payer: Option<String>,
    pub amount: Option<String>,
    pub token_amount: Option<String>,
    pub ledger: i64,
    pub timestamp: i64,
    pub contract_id: String,
    pub tx_hash: Option<String>,
    pub created_at: i64,
}
