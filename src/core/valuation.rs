//! Position valuation: USD values and health factors.
//!
//! All valuation flows through here. Prices arrive at 8-decimal feed
//! precision, amounts in native token units; this module normalizes both to
//! the engine's 18-decimal fixed point and derives the health factor that
//! gates every debt-bearing operation. Intermediate products are computed
//! at 256 bits, so results are exact wherever they fit in a `u128`.

use serde::{Deserialize, Serialize};

use crate::core::account::AccountLedger;
use crate::core::registry::CollateralRegistry;
use crate::error::{Error, Result};
use crate::token::collateral::CollateralAmount;
use crate::token::debt::DebtAmount;
use crate::utils::constants::{
    FEED_PRECISION, LIQUIDATION_PRECISION, LIQUIDATION_THRESHOLD, MIN_HEALTH_FACTOR, PRECISION,
};
use crate::utils::ids::{AccountId, AssetId};
use crate::utils::math::{mul_div, safe_mul};

// ═══════════════════════════════════════════════════════════════════════════════
// USD VALUE
// ═══════════════════════════════════════════════════════════════════════════════

/// Strongly-typed USD value at 18-decimal precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct UsdValue(u128);

impl UsdValue {
    /// Zero value
    pub const ZERO: Self = Self(0);

    /// Create from a raw 18-decimal fixed-point value
    pub const fn from_raw(raw: u128) -> Self {
        Self(raw)
    }

    /// Create from whole dollars
    pub fn from_dollars(dollars: u128) -> Self {
        Self(dollars.saturating_mul(PRECISION))
    }

    /// Get the raw 18-decimal fixed-point value
    pub fn raw(&self) -> u128 {
        self.0
    }

    /// Check if zero
    pub fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Saturating addition
    pub fn saturating_add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }

    /// Checked addition
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    /// Checked subtraction
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }
}

impl std::fmt::Display for UsdValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let whole = self.0 / PRECISION;
        let cents = (self.0 % PRECISION) / (PRECISION / 100);
        write!(f, "${}.{:02}", whole, cents)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// HEALTH FACTOR
// ═══════════════════════════════════════════════════════════════════════════════

/// Ratio of threshold-adjusted collateral to debt, at 18-decimal precision.
///
/// A factor of exactly `PRECISION` means the position sits right on the
/// minimum: still healthy, one price tick away from liquidation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct HealthFactor(u128);

impl HealthFactor {
    /// The minimum healthy factor (1.0)
    pub const MIN: Self = Self(MIN_HEALTH_FACTOR);

    /// The factor of a debt-free position
    pub const INFINITY: Self = Self(u128::MAX);

    /// Create from a raw 18-decimal fixed-point value
    pub const fn from_raw(raw: u128) -> Self {
        Self(raw)
    }

    /// Get the raw 18-decimal fixed-point value
    pub fn raw(&self) -> u128 {
        self.0
    }

    /// Whether the position may stay as it is
    pub fn is_healthy(&self) -> bool {
        self.0 >= MIN_HEALTH_FACTOR
    }
}

impl std::fmt::Display for HealthFactor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if *self == Self::INFINITY {
            return write!(f, "inf");
        }
        let whole = self.0 / PRECISION;
        let hundredths = (self.0 % PRECISION) / (PRECISION / 100);
        write!(f, "{}.{:02}", whole, hundredths)
    }
}

/// Health factor of a position with the given collateral value and debt.
///
/// Debt-free positions are infinitely healthy. Otherwise the collateral
/// value is first scaled down by the liquidation threshold, so a factor of
/// 1.0 corresponds to 200% collateralization at the default threshold.
/// Ratios too large for the fixed-point range saturate to infinity.
pub fn health_factor(collateral_usd: UsdValue, debt: DebtAmount) -> Result<HealthFactor> {
    if debt.is_zero() {
        return Ok(HealthFactor::INFINITY);
    }
    let adjusted = mul_div(
        collateral_usd.raw(),
        LIQUIDATION_THRESHOLD,
        LIQUIDATION_PRECISION,
    )?;
    // Dust debt can push the ratio past u128::MAX. Such a position is far
    // above the minimum, so the factor saturates rather than erroring.
    match mul_div(adjusted, PRECISION, debt.raw()) {
        Ok(raw) => Ok(HealthFactor::from_raw(raw)),
        Err(Error::Overflow { .. }) => Ok(HealthFactor::INFINITY),
        Err(e) => Err(e),
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// VALUATION ENGINE
// ═══════════════════════════════════════════════════════════════════════════════

/// Values collateral through the registry's price adapters
pub struct ValuationEngine<'a> {
    registry: &'a CollateralRegistry,
}

impl<'a> ValuationEngine<'a> {
    /// Create a valuation engine over a registry
    pub fn new(registry: &'a CollateralRegistry) -> Self {
        Self { registry }
    }

    /// USD value of `amount` of `asset` at the current quote.
    ///
    /// Fails for unsupported assets and stale quotes.
    pub fn usd_value(
        &self,
        asset: AssetId,
        amount: CollateralAmount,
        now: u64,
    ) -> Result<UsdValue> {
        let entry = self.registry.entry(asset)?;
        let quote = entry.adapter.quote(now)?;
        let normalized = safe_mul(amount.raw(), entry.normalization_factor)?;
        let raw = mul_div(quote.price as u128, normalized, FEED_PRECISION)?;
        Ok(UsdValue::from_raw(raw))
    }

    /// Native token amount of `asset` worth `usd` at the current quote.
    ///
    /// A zero quote yields a zero amount rather than a division error.
    pub fn token_amount_for_usd(
        &self,
        asset: AssetId,
        usd: UsdValue,
        now: u64,
    ) -> Result<CollateralAmount> {
        let entry = self.registry.entry(asset)?;
        let quote = entry.adapter.quote(now)?;
        if quote.price == 0 {
            return Ok(CollateralAmount::ZERO);
        }
        let denominator = safe_mul(quote.price as u128, entry.normalization_factor)?;
        let raw = mul_div(usd.raw(), FEED_PRECISION, denominator)?;
        Ok(CollateralAmount::from_raw(raw))
    }

    /// Total USD value of an account's collateral, summed in registration
    /// order. Assets with a zero balance never touch their price source, so
    /// a dead feed only freezes operations that actually depend on it.
    pub fn account_collateral_usd(
        &self,
        ledger: &AccountLedger,
        account: AccountId,
        now: u64,
    ) -> Result<UsdValue> {
        let mut total = UsdValue::ZERO;
        for entry in self.registry.assets() {
            let balance = ledger.collateral(account, entry.asset.id);
            if balance.is_zero() {
                continue;
            }
            let value = self.usd_value(entry.asset.id, balance, now)?;
            total = total.checked_add(value).ok_or(Error::Overflow {
                operation: "total collateral value".into(),
            })?;
        }
        Ok(total)
    }

    /// Health factor of an account's live position
    pub fn account_health_factor(
        &self,
        ledger: &AccountLedger,
        account: AccountId,
        now: u64,
    ) -> Result<HealthFactor> {
        let collateral_usd = self.account_collateral_usd(ledger, account, now)?;
        health_factor(collateral_usd, ledger.debt(account))
    }
}
