//! Error types for the DSC engine.
//!
//! This module defines all error types used throughout the engine,
//! providing clear and actionable error messages.

use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the DSC engine
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    // ═══════════════════════════════════════════════════════════════════
    // Validation Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Amount must be strictly positive
    #[error("Amount must be greater than zero")]
    InvalidAmount,

    /// Collateral asset is not registered with the engine
    #[error("Unsupported collateral asset: {asset}")]
    UnsupportedAsset {
        /// Asset identifier (hex)
        asset: String,
    },

    /// Constructor received asset and price-source lists of different lengths
    #[error("Asset and price source lists differ in length: {assets} assets, {sources} sources")]
    LengthMismatch {
        /// Number of collateral assets supplied
        assets: usize,
        /// Number of price sources supplied
        sources: usize,
    },

    /// The same collateral asset was registered twice
    #[error("Duplicate collateral asset: {symbol}")]
    DuplicateAsset {
        /// Symbol of the duplicated asset
        symbol: String,
    },

    // ═══════════════════════════════════════════════════════════════════
    // Ledger Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Redeeming or seizing more collateral than the account holds
    #[error("Insufficient collateral in {asset}: requested {requested}, available {available}")]
    InsufficientCollateral {
        /// Asset identifier (hex)
        asset: String,
        /// Requested amount in raw units
        requested: u128,
        /// Available amount in raw units
        available: u128,
    },

    /// Repaying more debt than the account owes
    #[error("Debt underflow: requested {requested}, owed {available}")]
    DebtUnderflow {
        /// Amount the caller tried to repay
        requested: u128,
        /// Amount actually owed
        available: u128,
    },

    // ═══════════════════════════════════════════════════════════════════
    // Health Factor Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Operation would leave the account below the minimum health factor
    #[error("Health factor broken: {factor} below minimum")]
    HealthFactorBroken {
        /// Computed health factor, 18-decimal fixed point
        factor: u128,
    },

    /// Attempted to liquidate an account that is still healthy
    #[error("Health factor ok: {factor} at or above minimum, nothing to liquidate")]
    HealthFactorOk {
        /// Computed health factor, 18-decimal fixed point
        factor: u128,
    },

    /// Liquidation did not strictly improve the target's health factor
    #[error("Health factor not improved: {before} -> {after}")]
    HealthFactorNotImproved {
        /// Health factor before the liquidation
        before: u128,
        /// Health factor after the liquidation
        after: u128,
    },

    // ═══════════════════════════════════════════════════════════════════
    // Oracle Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Price quote is older than the staleness timeout
    #[error("Price is stale: {age}s old, max allowed {max_age}s")]
    StalePrice {
        /// Seconds since the quote was updated
        age: u64,
        /// Maximum allowed age in seconds
        max_age: u64,
    },

    // ═══════════════════════════════════════════════════════════════════
    // External Token Errors
    // ═══════════════════════════════════════════════════════════════════

    /// An external token transfer returned false
    #[error("Token transfer failed: {token} from {from} to {to}")]
    TransferFailed {
        /// Token involved
        token: String,
        /// Sending account (hex)
        from: String,
        /// Receiving account (hex)
        to: String,
    },

    /// The debt token refused to mint
    #[error("Debt token mint failed for {to}")]
    MintFailed {
        /// Intended recipient (hex)
        to: String,
    },

    /// The debt token refused to burn from engine custody
    #[error("Debt token burn failed from {from}")]
    BurnFailed {
        /// Custody account the burn debits (hex)
        from: String,
    },

    // ═══════════════════════════════════════════════════════════════════
    // Arithmetic Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Overflow in calculation
    #[error("Arithmetic overflow in {operation}")]
    Overflow {
        /// Operation that overflowed
        operation: String,
    },

    /// Division by zero in calculation
    #[error("Division by zero in {operation}")]
    DivisionByZero {
        /// Operation that divided by zero
        operation: String,
    },

    // ═══════════════════════════════════════════════════════════════════
    // Concurrency Errors
    // ═══════════════════════════════════════════════════════════════════

    /// An engine operation re-entered while another was in flight
    #[error("Reentrant engine call rejected")]
    ReentrantCall,

    // ═══════════════════════════════════════════════════════════════════
    // Serialization Errors
    // ═══════════════════════════════════════════════════════════════════

    /// Serialization failed
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Deserialization failed
    #[error("Deserialization error: {0}")]
    Deserialization(String),
}

impl Error {
    /// Returns true if this error is recoverable by the caller
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Error::InsufficientCollateral { .. }
                | Error::DebtUnderflow { .. }
                | Error::HealthFactorBroken { .. }
                | Error::HealthFactorOk { .. }
                | Error::StalePrice { .. }
        )
    }

    /// Returns true if this is a critical error requiring immediate attention
    pub fn is_critical(&self) -> bool {
        matches!(
            self,
            Error::Overflow { .. }
                | Error::DivisionByZero { .. }
                | Error::ReentrantCall
        )
    }

    /// Returns the error code for external systems
    pub fn code(&self) -> u32 {
        match self {
            // Validation errors: 1xxx
            Error::InvalidAmount => 1001,
            Error::UnsupportedAsset { .. } => 1002,
            Error::LengthMismatch { .. } => 1003,
            Error::DuplicateAsset { .. } => 1004,

            // Ledger errors: 2xxx
            Error::InsufficientCollateral { .. } => 2001,
            Error::DebtUnderflow { .. } => 2002,

            // Health factor errors: 3xxx
            Error::HealthFactorBroken { .. } => 3001,
            Error::HealthFactorOk { .. } => 3002,
            Error::HealthFactorNotImproved { .. } => 3003,

            // Oracle errors: 4xxx
            Error::StalePrice { .. } => 4001,

            // External token errors: 5xxx
            Error::TransferFailed { .. } => 5001,
            Error::MintFailed { .. } => 5002,
            Error::BurnFailed { .. } => 5003,

            // Arithmetic errors: 6xxx
            Error::Overflow { .. } => 6001,
            Error::DivisionByZero { .. } => 6002,

            // Concurrency errors: 7xxx
            Error::ReentrantCall => 7001,

            // Serialization errors: 8xxx
            Error::Serialization(_) => 8001,
            Error::Deserialization(_) => 8002,
        }
    }
}
