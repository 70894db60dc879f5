//! # DSC Engine
//!
//! A collateralized-debt engine for a USD-pegged synthetic token. Accounts
//! deposit exogenous collateral, mint DSC against it at a minimum of 200%
//! collateralization, and are liquidated at a fixed bonus when their health
//! factor falls below 1.0.
//!
//! ## Architecture
//!
//! The engine consists of several core modules:
//!
//! - **Core**: Account ledger, collateral registry, and valuation
//! - **Oracle**: Per-asset price sources behind a staleness-checked adapter
//! - **Token**: Collateral and debt token capabilities with in-memory
//!   implementations
//! - **Engine**: The operational surface, receipts, and the event log
//!
//! ## Design Principles
//!
//! - **Ledger-authoritative**: the engine's books are the source of truth;
//!   external token calls either succeed or the books roll back
//! - **Exact arithmetic**: 256-bit intermediates, no silent truncation
//! - **Explicit time**: every valuation takes its clock reading as input
//!
//! ## Example
//!
//! ```rust,ignore
//! use dsc_engine::prelude::*;
//!
//! let mut engine = DscEngine::new(custody, tokens, sources, dsc, clock)?;
//!
//! engine.deposit_collateral(alice, weth, amount)?;
//! engine.mint_dsc(alice, debt)?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    missing_docs,
    rust_2018_idioms,
    trivial_casts,
    unused_lifetimes,
    unused_qualifications
)]

pub mod core;
pub mod engine;
pub mod error;
pub mod oracle;
pub mod token;
pub mod utils;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::core::{
        account::{AccountLedger, AccountPosition},
        registry::{CollateralAsset, CollateralRegistry},
        valuation::{HealthFactor, UsdValue},
    };
    pub use crate::engine::{
        engine::{DscEngine, LiquidationReceipt},
        events::{EngineEvent, EventLog},
    };
    pub use crate::error::{Error, Result};
    pub use crate::oracle::{
        adapter::PriceOracleAdapter,
        clock::{Clock, ManualClock, SharedClock, SystemClock},
        source::{InMemoryPriceSource, PriceSource, SharedPriceSource},
    };
    pub use crate::token::{
        collateral::{CollateralAmount, CollateralToken, InMemoryCollateralToken, SharedCollateralToken},
        debt::{DebtAmount, DebtToken, InMemoryDebtToken, SharedDebtToken},
    };
    pub use crate::utils::ids::{AccountId, AssetId};
}

/// Engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine name
pub const ENGINE_NAME: &str = "DSC Engine";
