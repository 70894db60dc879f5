//! Engine module: operations, receipts and events.
//!
//! This module contains the operational surface:
//! - The debt engine orchestrating all state changes
//! - Liquidation receipts
//! - Event types and the append-only event log

pub mod engine;
pub mod events;

pub use engine::{DscEngine, LiquidationReceipt};
pub use events::{
    CollateralDepositedEvent, CollateralRedeemedEvent, DebtBurnedEvent, EngineEvent, EventLog,
};
