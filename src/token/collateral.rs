//! Collateral token capability and amounts.
//!
//! Collateral tokens are external to the engine: the engine never holds
//! balances for them itself, it only instructs transfers through a narrow
//! trait and trusts the boolean outcome. Amounts are raw token units in the
//! asset's native decimals.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::utils::ids::{AccountId, AssetId};

// ═══════════════════════════════════════════════════════════════════════════════
// COLLATERAL AMOUNT
// ═══════════════════════════════════════════════════════════════════════════════

/// Strongly-typed collateral amount in raw token units
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct CollateralAmount(u128);

impl CollateralAmount {
    /// Zero amount
    pub const ZERO: Self = Self(0);

    /// Create from raw token units
    pub const fn from_raw(raw: u128) -> Self {
        Self(raw)
    }

    /// Create from whole tokens given the asset's decimals
    pub fn from_units(whole: u128, decimals: u8) -> Self {
        Self(whole.saturating_mul(10u128.pow(decimals as u32)))
    }

    /// Get raw token units
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

    /// Saturating subtraction
    pub fn saturating_sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }

    /// Checked addition
    pub fn checked_add(self, other: Self) -> Option<Self> {
        self.0.checked_add(other.0).map(Self)
    }

    /// Checked subtraction
    pub fn checked_sub(self, other: Self) -> Option<Self> {
        self.0.checked_sub(other.0).map(Self)
    }

    /// Minimum of two amounts
    pub fn min(self, other: Self) -> Self {
        Self(self.0.min(other.0))
    }
}

impl std::fmt::Display for CollateralAmount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u128> for CollateralAmount {
    fn from(raw: u128) -> Self {
        Self(raw)
    }
}

impl From<CollateralAmount> for u128 {
    fn from(amount: CollateralAmount) -> Self {
        amount.0
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// COLLATERAL TOKEN CAPABILITY
// ═══════════════════════════════════════════════════════════════════════════════

/// Narrow interface to an external collateral token.
///
/// `transfer` pushes from the engine's custody balance; `transfer_from`
/// moves between arbitrary accounts under the engine's authority. Both
/// report success as a plain boolean, exactly as the engine observes it.
pub trait CollateralToken: Send + Sync {
    /// Asset identifier (stable across the token's lifetime)
    fn id(&self) -> AssetId;

    /// Token symbol
    fn symbol(&self) -> String;

    /// Native decimal places of the token
    fn decimals(&self) -> u8;

    /// Push `amount` from the engine's custody to `to`
    fn transfer(&self, to: AccountId, amount: CollateralAmount) -> bool;

    /// Move `amount` from `from` to `to`
    fn transfer_from(&self, from: AccountId, to: AccountId, amount: CollateralAmount) -> bool;

    /// Current balance of `account`
    fn balance_of(&self, account: AccountId) -> CollateralAmount;
}

/// Shared handle to a collateral token
pub type SharedCollateralToken = Arc<dyn CollateralToken>;

// ═══════════════════════════════════════════════════════════════════════════════
// IN-MEMORY COLLATERAL TOKEN
// ═══════════════════════════════════════════════════════════════════════════════

/// In-memory collateral token for tests and simulations
#[derive(Debug)]
pub struct InMemoryCollateralToken {
    id: AssetId,
    symbol: String,
    decimals: u8,
    /// The engine's custody account, debited by `transfer`
    custody: AccountId,
    balances: RwLock<HashMap<AccountId, CollateralAmount>>,
}

impl InMemoryCollateralToken {
    /// Create a new token with its id derived from the symbol
    pub fn new(symbol: &str, decimals: u8, custody: AccountId) -> Self {
        Self {
            id: AssetId::from_symbol(symbol),
            symbol: symbol.to_string(),
            decimals,
            custody,
            balances: RwLock::new(HashMap::new()),
        }
    }

    /// Seed an account with tokens (wiring helper, not part of the capability)
    pub fn fund(&self, account: AccountId, amount: CollateralAmount) {
        let mut balances = self.write();
        let entry = balances.entry(account).or_insert(CollateralAmount::ZERO);
        *entry = entry.saturating_add(amount);
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<AccountId, CollateralAmount>> {
        match self.balances.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<AccountId, CollateralAmount>> {
        match self.balances.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn move_balance(&self, from: AccountId, to: AccountId, amount: CollateralAmount) -> bool {
        if amount.is_zero() {
            return true;
        }
        let mut balances = self.write();
        let from_balance = balances.get(&from).copied().unwrap_or(CollateralAmount::ZERO);
        let new_from = match from_balance.checked_sub(amount) {
            Some(value) => value,
            None => return false,
        };
        let to_balance = balances.get(&to).copied().unwrap_or(CollateralAmount::ZERO);
        let new_to = match to_balance.checked_add(amount) {
            Some(value) => value,
            None => return false,
        };
        balances.insert(from, new_from);
        balances.insert(to, new_to);
        true
    }
}

impl CollateralToken for InMemoryCollateralToken {
    fn id(&self) -> AssetId {
        self.id
    }

    fn symbol(&self) -> String {
        self.symbol.clone()
    }

    fn decimals(&self) -> u8 {
        self.decimals
    }

    fn transfer(&self, to: AccountId, amount: CollateralAmount) -> bool {
        self.move_balance(self.custody, to, amount)
    }

    fn transfer_from(&self, from: AccountId, to: AccountId, amount: CollateralAmount) -> bool {
        self.move_balance(from, to, amount)
    }

    fn balance_of(&self, account: AccountId) -> CollateralAmount {
        self.read().get(&account).copied().unwrap_or(CollateralAmount::ZERO)
    }
}
