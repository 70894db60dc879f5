//! Oracle adapter with staleness protection.
//!
//! One adapter wraps one price source. Every read goes straight through to
//! the source (no caching) and is rejected if older than the configured
//! timeout. This is the single place in the engine where staleness is
//! checked, so a dead feed freezes valuation of its asset and nothing else.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::oracle::source::SharedPriceSource;
use crate::utils::constants::PRICE_STALENESS_TIMEOUT_SECS;

// ═══════════════════════════════════════════════════════════════════════════════
// PRICE QUOTE
// ═══════════════════════════════════════════════════════════════════════════════

/// A validated price reading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceQuote {
    /// Price at 8-decimal scale
    pub price: u64,
    /// Unix timestamp of the last feed update
    pub updated_at: u64,
}

impl PriceQuote {
    /// Age of the quote in seconds; saturates to zero under clock skew
    pub fn age(&self, now: u64) -> u64 {
        now.saturating_sub(self.updated_at)
    }

    /// Check the quote against a maximum age
    pub fn is_fresh(&self, now: u64, max_age: u64) -> bool {
        self.age(now) <= max_age
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ORACLE ADAPTER
// ═══════════════════════════════════════════════════════════════════════════════

/// Staleness-checking wrapper around a single price source.
///
/// Clones are cheap handles onto the same source.
#[derive(Clone)]
pub struct PriceOracleAdapter {
    source: SharedPriceSource,
    max_age_secs: u64,
}

impl PriceOracleAdapter {
    /// Wrap a source with the default staleness timeout
    pub fn new(source: SharedPriceSource) -> Self {
        Self::with_max_age(source, PRICE_STALENESS_TIMEOUT_SECS)
    }

    /// Wrap a source with a custom staleness timeout
    pub fn with_max_age(source: SharedPriceSource, max_age_secs: u64) -> Self {
        Self { source, max_age_secs }
    }

    /// Read and validate the latest quote
    pub fn quote(&self, now: u64) -> Result<PriceQuote> {
        let (price, updated_at) = self.source.latest_quote();
        let quote = PriceQuote { price, updated_at };
        let age = quote.age(now);
        if age > self.max_age_secs {
            return Err(Error::StalePrice {
                age,
                max_age: self.max_age_secs,
            });
        }
        Ok(quote)
    }

    /// Handle to the underlying source
    pub fn source(&self) -> SharedPriceSource {
        Arc::clone(&self.source)
    }

    /// Configured staleness timeout in seconds
    pub fn max_age_secs(&self) -> u64 {
        self.max_age_secs
    }
}

impl fmt::Debug for PriceOracleAdapter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PriceOracleAdapter")
            .field("max_age_secs", &self.max_age_secs)
            .finish_non_exhaustive()
    }
}
