//! Collateral registry: the set of assets the engine accepts.
//!
//! Each supported asset is registered once, at construction, together with
//! the price source that quotes it. Registration order is preserved and used
//! whenever positions are valued, so sweeps are deterministic. Assets with
//! fewer than 18 decimals carry a normalization factor that scales their
//! native units up to engine precision.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::oracle::adapter::PriceOracleAdapter;
use crate::oracle::source::SharedPriceSource;
use crate::utils::constants::ENGINE_DECIMALS;
use crate::utils::ids::AssetId;

// ═══════════════════════════════════════════════════════════════════════════════
// COLLATERAL ASSET
// ═══════════════════════════════════════════════════════════════════════════════

/// Static description of one collateral asset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollateralAsset {
    /// Asset identifier, derived from the symbol
    pub id: AssetId,
    /// Ticker symbol, e.g. "WETH"
    pub symbol: String,
    /// Native decimals of the token
    pub decimals: u8,
}

impl CollateralAsset {
    /// Describe an asset by symbol and native decimals
    pub fn new(symbol: &str, decimals: u8) -> Self {
        Self {
            id: AssetId::from_symbol(symbol),
            symbol: symbol.to_string(),
            decimals,
        }
    }
}

/// A registered asset together with its valuation inputs
#[derive(Debug, Clone)]
pub struct RegisteredCollateral {
    /// The asset description
    pub asset: CollateralAsset,
    /// Multiplier that brings native units up to 18-decimal precision
    pub normalization_factor: u128,
    /// Staleness-checked price adapter for this asset
    pub adapter: PriceOracleAdapter,
}

fn normalization_factor(decimals: u8) -> u128 {
    if decimals < ENGINE_DECIMALS {
        10u128.pow((ENGINE_DECIMALS - decimals) as u32)
    } else {
        1
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// COLLATERAL REGISTRY
// ═══════════════════════════════════════════════════════════════════════════════

/// Immutable table of supported collateral assets
#[derive(Debug)]
pub struct CollateralRegistry {
    order: Vec<AssetId>,
    entries: HashMap<AssetId, RegisteredCollateral>,
}

impl CollateralRegistry {
    /// Build the registry from parallel asset and price source lists.
    ///
    /// The lists must have equal length and must not repeat a symbol.
    pub fn new(
        assets: Vec<CollateralAsset>,
        sources: Vec<SharedPriceSource>,
    ) -> Result<Self> {
        if assets.len() != sources.len() {
            return Err(Error::LengthMismatch {
                assets: assets.len(),
                sources: sources.len(),
            });
        }

        let mut order = Vec::with_capacity(assets.len());
        let mut entries = HashMap::with_capacity(assets.len());

        for (asset, source) in assets.into_iter().zip(sources) {
            if entries.contains_key(&asset.id) {
                return Err(Error::DuplicateAsset {
                    symbol: asset.symbol,
                });
            }
            order.push(asset.id);
            entries.insert(
                asset.id,
                RegisteredCollateral {
                    normalization_factor: normalization_factor(asset.decimals),
                    adapter: PriceOracleAdapter::new(source),
                    asset,
                },
            );
        }

        Ok(Self { order, entries })
    }

    /// Whether the asset is accepted as collateral
    pub fn is_supported(&self, asset: AssetId) -> bool {
        self.entries.contains_key(&asset)
    }

    /// Look up a registered asset
    pub fn get(&self, asset: AssetId) -> Option<&RegisteredCollateral> {
        self.entries.get(&asset)
    }

    /// Look up a registered asset, failing for unsupported ids
    pub fn entry(&self, asset: AssetId) -> Result<&RegisteredCollateral> {
        self.entries.get(&asset).ok_or(Error::UnsupportedAsset {
            asset: asset.to_hex(),
        })
    }

    /// Normalization factor of a supported asset
    pub fn normalization_factor(&self, asset: AssetId) -> Result<u128> {
        Ok(self.entry(asset)?.normalization_factor)
    }

    /// Price adapter of a supported asset
    pub fn adapter(&self, asset: AssetId) -> Result<&PriceOracleAdapter> {
        Ok(&self.entry(asset)?.adapter)
    }

    /// Registered assets in registration order
    pub fn assets(&self) -> impl Iterator<Item = &RegisteredCollateral> {
        self.order.iter().filter_map(|id| self.entries.get(id))
    }

    /// Number of registered assets
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether no assets are registered
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}
