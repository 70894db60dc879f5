//! Engine constants and magic numbers.
//!
//! All engine-wide constants are defined here for easy auditing and modification.

// ═══════════════════════════════════════════════════════════════════════════════
// FIXED-POINT SCALES
// ═══════════════════════════════════════════════════════════════════════════════

/// Canonical 18-decimal scale for USD values, debt amounts and health factors
pub const PRECISION: u128 = 1_000_000_000_000_000_000;

/// Scale of raw oracle price readings (8 decimals)
pub const FEED_PRECISION: u128 = 100_000_000;

/// Multiplier lifting a raw oracle price to the canonical 18-decimal scale
pub const ADDITIONAL_FEED_PRECISION: u128 = 10_000_000_000;

/// Decimal places of the canonical scale
pub const ENGINE_DECIMALS: u8 = 18;

// ═══════════════════════════════════════════════════════════════════════════════
// COLLATERALIZATION CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Percent of collateral USD value counted toward debt coverage.
/// At 50 the system requires 200% overcollateralization.
pub const LIQUIDATION_THRESHOLD: u128 = 50;

/// Divisor paired with the liquidation threshold and bonus percentages
pub const LIQUIDATION_PRECISION: u128 = 100;

/// Percent bonus paid to liquidators on seized collateral
pub const LIQUIDATION_BONUS: u128 = 10;

/// Minimum healthy factor (1.0 at 18 decimals).
/// Exactly this value is healthy; strictly below is liquidatable.
pub const MIN_HEALTH_FACTOR: u128 = PRECISION;

// ═══════════════════════════════════════════════════════════════════════════════
// ORACLE CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Maximum accepted age of a price quote in seconds (3 hours)
pub const PRICE_STALENESS_TIMEOUT_SECS: u64 = 3 * 3600;

// ═══════════════════════════════════════════════════════════════════════════════
// IDENTIFIER CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════════

/// Length of an account identifier in bytes
pub const ACCOUNT_ID_LENGTH: usize = 32;

/// Length of a collateral asset identifier in bytes
pub const ASSET_ID_LENGTH: usize = 32;
