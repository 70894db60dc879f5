//! Core modules of the debt engine.
//!
//! This module contains the fundamental building blocks:
//! - Account ledger with collateral and debt positions
//! - Registry of supported collateral assets
//! - Valuation of positions and health factors

pub mod account;
pub mod registry;
pub mod valuation;

pub use account::{AccountLedger, AccountPosition, LedgerSnapshot};
pub use registry::{CollateralAsset, CollateralRegistry, RegisteredCollateral};
pub use valuation::{health_factor, HealthFactor, UsdValue, ValuationEngine};
