//! Oracle module for price feeds.
//!
//! This module provides price feed functionality:
//! - Per-asset price source capability
//! - Staleness-checked oracle adapter
//! - Clock capability for explicit time

pub mod adapter;
pub mod clock;
pub mod source;

pub use adapter::{PriceOracleAdapter, PriceQuote};
pub use clock::{Clock, ManualClock, SharedClock, SystemClock};
pub use source::{InMemoryPriceSource, PriceSource, SharedPriceSource};
