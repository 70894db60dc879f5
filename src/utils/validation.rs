//! Input validation guards for engine operations.
//!
//! Every state-changing operation runs these checks before touching the
//! ledger, so invalid calls fail without side effects.

use crate::core::registry::CollateralRegistry;
use crate::error::{Error, Result};
use crate::token::collateral::CollateralAmount;
use crate::token::debt::DebtAmount;
use crate::utils::ids::AssetId;

// ═══════════════════════════════════════════════════════════════════════════════
// AMOUNT GUARDS
// ═══════════════════════════════════════════════════════════════════════════════

/// Require a strictly positive collateral amount
pub fn validate_nonzero_collateral(amount: CollateralAmount) -> Result<()> {
    if amount.is_zero() {
        return Err(Error::InvalidAmount);
    }
    Ok(())
}

/// Require a strictly positive debt amount
pub fn validate_nonzero_debt(amount: DebtAmount) -> Result<()> {
    if amount.is_zero() {
        return Err(Error::InvalidAmount);
    }
    Ok(())
}

// ═══════════════════════════════════════════════════════════════════════════════
// ASSET GUARDS
// ═══════════════════════════════════════════════════════════════════════════════

/// Require the asset to be registered with the engine
pub fn validate_supported(registry: &CollateralRegistry, asset: AssetId) -> Result<()> {
    if !registry.is_supported(asset) {
        return Err(Error::UnsupportedAsset {
            asset: asset.to_hex(),
        });
    }
    Ok(())
}
