//! External token capabilities.
//!
//! The engine moves value through two token interfaces it does not own:
//! - Collateral tokens, held in engine custody while deposited
//! - The debt token (DSC), minted and burned under engine authority
//!
//! Both are narrow traits with boolean outcomes; in-memory implementations
//! back the tests and the CLI simulation.

pub mod collateral;
pub mod debt;

pub use collateral::{
    CollateralAmount, CollateralToken, InMemoryCollateralToken, SharedCollateralToken,
};
pub use debt::{DebtAmount, DebtToken, InMemoryDebtToken, SharedDebtToken};
