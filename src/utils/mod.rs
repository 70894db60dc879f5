//! Utility modules for the DSC engine.
//!
//! This module contains shared utilities used across the engine:
//! - Identifiers for accounts and assets
//! - Checked and wide arithmetic
//! - Validation guards
//! - Constants

pub mod constants;
pub mod ids;
pub mod math;
pub mod validation;

pub use constants::*;
pub use ids::*;
pub use math::*;
pub use validation::*;
