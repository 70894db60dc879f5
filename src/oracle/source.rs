//! Price source capability.
//!
//! A price source is the external feed behind one collateral asset. The
//! engine only ever sees its latest raw reading; freshness policy lives in
//! the adapter, not here.

use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

// ═══════════════════════════════════════════════════════════════════════════════
// PRICE SOURCE CAPABILITY
// ═══════════════════════════════════════════════════════════════════════════════

/// Narrow interface to an external price feed.
///
/// Returns the latest raw reading as `(price, updated_at)`: the price is
/// unsigned at 8 decimals, `updated_at` is unix seconds of the last update.
pub trait PriceSource: Send + Sync {
    /// Latest raw reading from the feed
    fn latest_quote(&self) -> (u64, u64);
}

/// Shared handle to a price source
pub type SharedPriceSource = Arc<dyn PriceSource>;

// ═══════════════════════════════════════════════════════════════════════════════
// IN-MEMORY PRICE SOURCE
// ═══════════════════════════════════════════════════════════════════════════════

/// Settable price source for tests and simulations
#[derive(Debug)]
pub struct InMemoryPriceSource {
    reading: RwLock<(u64, u64)>,
}

impl InMemoryPriceSource {
    /// Price scale of the raw reading (8 decimals)
    const PRICE_SCALE: u64 = 100_000_000;

    /// Create a source with an initial raw reading
    pub fn new(price: u64, updated_at: u64) -> Self {
        Self {
            reading: RwLock::new((price, updated_at)),
        }
    }

    /// Create a source quoting a whole-dollar price
    pub fn with_usd_price(dollars: u64, updated_at: u64) -> Self {
        Self::new(dollars.saturating_mul(Self::PRICE_SCALE), updated_at)
    }

    /// Replace the raw reading
    pub fn set(&self, price: u64, updated_at: u64) {
        *self.write() = (price, updated_at);
    }

    /// Replace the reading with a whole-dollar price
    pub fn set_usd_price(&self, dollars: u64, updated_at: u64) {
        self.set(dollars.saturating_mul(Self::PRICE_SCALE), updated_at);
    }

    fn read(&self) -> RwLockReadGuard<'_, (u64, u64)> {
        match self.reading.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, (u64, u64)> {
        match self.reading.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl PriceSource for InMemoryPriceSource {
    fn latest_quote(&self) -> (u64, u64) {
        *self.read()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_usd_price_scaling() {
        let source = InMemoryPriceSource::with_usd_price(2000, 100);
        assert_eq!(source.latest_quote(), (200_000_000_000, 100));
    }

    #[test]
    fn test_set_replaces_reading() {
        let source = InMemoryPriceSource::new(5, 10);
        source.set(7, 20);
        assert_eq!(source.latest_quote(), (7, 20));

        source.set_usd_price(1, 30);
        assert_eq!(source.latest_quote(), (100_000_000, 30));
    }
}
