//! Debt token capability and amounts.
//!
//! The debt token (DSC) is the USD-pegged synthetic the engine mints against
//! collateral. The engine is its sole mint and burn authority; like the
//! collateral tokens it is driven through a narrow boolean interface.
//! Amounts carry 18 decimals and convert 1:1 to USD value.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::{Arc, RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::core::valuation::UsdValue;
use crate::utils::constants::{ENGINE_DECIMALS, PRECISION};
use crate::utils::ids::AccountId;

// ═══════════════════════════════════════════════════════════════════════════════
// DEBT AMOUNT
// ═══════════════════════════════════════════════════════════════════════════════

/// Strongly-typed debt token amount, 18 decimals
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
pub struct DebtAmount(u128);

impl DebtAmount {
    /// Zero amount
    pub const ZERO: Self = Self(0);

    /// Create from a raw 18-decimal value
    pub const fn from_raw(raw: u128) -> Self {
        Self(raw)
    }

    /// Create from whole tokens
    pub fn from_whole(whole: u128) -> Self {
        Self(whole.saturating_mul(PRECISION))
    }

    /// Get the raw 18-decimal value
    pub fn raw(&self) -> u128 {
        self.0
    }

    /// USD value of this debt under the 1:1 peg
    pub fn as_usd(&self) -> UsdValue {
        UsdValue::from_raw(self.0)
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
}

impl std::fmt::Display for DebtAmount {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let whole = self.0 / PRECISION;
        let hundredths = (self.0 % PRECISION) / (PRECISION / 100);
        write!(f, "{}.{:02}", whole, hundredths)
    }
}

impl From<u128> for DebtAmount {
    fn from(raw: u128) -> Self {
        Self(raw)
    }
}

impl From<DebtAmount> for u128 {
    fn from(amount: DebtAmount) -> Self {
        amount.0
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// DEBT TOKEN CAPABILITY
// ═══════════════════════════════════════════════════════════════════════════════

/// Narrow interface to the external debt token.
///
/// `burn` consumes tokens already pulled into the engine's custody;
/// `transfer_from` is how the engine pulls them there.
pub trait DebtToken: Send + Sync {
    /// Mint `amount` new tokens to `to`
    fn mint(&self, to: AccountId, amount: DebtAmount) -> bool;

    /// Burn `amount` tokens from the engine's custody balance
    fn burn(&self, amount: DebtAmount) -> bool;

    /// Move `amount` from `from` to `to`
    fn transfer_from(&self, from: AccountId, to: AccountId, amount: DebtAmount) -> bool;

    /// Current balance of `account`
    fn balance_of(&self, account: AccountId) -> DebtAmount;

    /// Total outstanding supply
    fn total_supply(&self) -> DebtAmount;
}

/// Shared handle to the debt token
pub type SharedDebtToken = Arc<dyn DebtToken>;

// ═══════════════════════════════════════════════════════════════════════════════
// IN-MEMORY DEBT TOKEN
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Default)]
struct DebtBook {
    balances: HashMap<AccountId, DebtAmount>,
    total_supply: DebtAmount,
}

/// In-memory debt token for tests and simulations
#[derive(Debug)]
pub struct InMemoryDebtToken {
    /// Token name
    pub name: String,
    /// Token symbol
    pub symbol: String,
    /// Decimal places
    pub decimals: u8,
    /// The engine's custody account, debited by `burn`
    custody: AccountId,
    /// Optional supply cap; mints beyond it are refused
    max_supply: Option<DebtAmount>,
    book: RwLock<DebtBook>,
}

impl InMemoryDebtToken {
    /// Create a new debt token with unlimited supply
    pub fn new(custody: AccountId) -> Self {
        Self {
            name: "Decentralized Stable Coin".to_string(),
            symbol: "DSC".to_string(),
            decimals: ENGINE_DECIMALS,
            custody,
            max_supply: None,
            book: RwLock::new(DebtBook::default()),
        }
    }

    /// Create a debt token that refuses to mint beyond `cap`
    pub fn with_max_supply(custody: AccountId, cap: DebtAmount) -> Self {
        Self {
            max_supply: Some(cap),
            ..Self::new(custody)
        }
    }

    fn read(&self) -> RwLockReadGuard<'_, DebtBook> {
        match self.book.read() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    fn write(&self) -> RwLockWriteGuard<'_, DebtBook> {
        match self.book.write() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl DebtToken for InMemoryDebtToken {
    fn mint(&self, to: AccountId, amount: DebtAmount) -> bool {
        if amount.is_zero() {
            return true;
        }
        let mut book = self.write();
        let new_supply = match book.total_supply.checked_add(amount) {
            Some(value) => value,
            None => return false,
        };
        if let Some(cap) = self.max_supply {
            if new_supply > cap {
                return false;
            }
        }
        let balance = book.balances.get(&to).copied().unwrap_or(DebtAmount::ZERO);
        let new_balance = match balance.checked_add(amount) {
            Some(value) => value,
            None => return false,
        };
        book.balances.insert(to, new_balance);
        book.total_supply = new_supply;
        true
    }

    fn burn(&self, amount: DebtAmount) -> bool {
        if amount.is_zero() {
            return true;
        }
        let mut book = self.write();
        let balance = book
            .balances
            .get(&self.custody)
            .copied()
            .unwrap_or(DebtAmount::ZERO);
        let new_balance = match balance.checked_sub(amount) {
            Some(value) => value,
            None => return false,
        };
        book.balances.insert(self.custody, new_balance);
        book.total_supply = book.total_supply.saturating_sub(amount);
        true
    }

    fn transfer_from(&self, from: AccountId, to: AccountId, amount: DebtAmount) -> bool {
        if amount.is_zero() {
            return true;
        }
        let mut book = self.write();
        let from_balance = book.balances.get(&from).copied().unwrap_or(DebtAmount::ZERO);
        let new_from = match from_balance.checked_sub(amount) {
            Some(value) => value,
            None => return false,
        };
        let to_balance = book.balances.get(&to).copied().unwrap_or(DebtAmount::ZERO);
        let new_to = match to_balance.checked_add(amount) {
            Some(value) => value,
            None => return false,
        };
        book.balances.insert(from, new_from);
        book.balances.insert(to, new_to);
        true
    }

    fn balance_of(&self, account: AccountId) -> DebtAmount {
        self.read()
            .balances
            .get(&account)
            .copied()
            .unwrap_or(DebtAmount::ZERO)
    }

    fn total_supply(&self) -> DebtAmount {
        self.read().total_supply
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn custody() -> AccountId {
        AccountId::from_label("engine")
    }

    #[test]
    fn test_debt_amount_display() {
        assert_eq!(DebtAmount::from_whole(100).to_string(), "100.00");
        assert_eq!(DebtAmount::from_raw(PRECISION / 2).to_string(), "0.50");
        assert_eq!(DebtAmount::ZERO.to_string(), "0.00");
    }

    #[test]
    fn test_debt_amount_as_usd() {
        let debt = DebtAmount::from_whole(250);
        assert_eq!(debt.as_usd().raw(), 250 * PRECISION);
    }

    #[test]
    fn test_mint_and_supply() {
        let token = InMemoryDebtToken::new(custody());
        let alice = AccountId::from_label("alice");

        assert!(token.mint(alice, DebtAmount::from_whole(1000)));
        assert_eq!(token.balance_of(alice), DebtAmount::from_whole(1000));
        assert_eq!(token.total_supply(), DebtAmount::from_whole(1000));
    }

    #[test]
    fn test_mint_respects_cap() {
        let token = InMemoryDebtToken::with_max_supply(custody(), DebtAmount::from_whole(100));
        let alice = AccountId::from_label("alice");

        assert!(token.mint(alice, DebtAmount::from_whole(100)));
        assert!(!token.mint(alice, DebtAmount::from_whole(1)));
        assert_eq!(token.total_supply(), DebtAmount::from_whole(100));
    }

    #[test]
    fn test_burn_from_custody() {
        let token = InMemoryDebtToken::new(custody());
        let alice = AccountId::from_label("alice");

        assert!(token.mint(alice, DebtAmount::from_whole(50)));
        assert!(token.transfer_from(alice, custody(), DebtAmount::from_whole(50)));
        assert!(token.burn(DebtAmount::from_whole(30)));

        assert_eq!(token.balance_of(custody()), DebtAmount::from_whole(20));
        assert_eq!(token.total_supply(), DebtAmount::from_whole(20));
    }

    #[test]
    fn test_burn_insufficient_custody_fails() {
        let token = InMemoryDebtToken::new(custody());
        assert!(!token.burn(DebtAmount::from_whole(1)));
    }

    #[test]
    fn test_transfer_from_insufficient_fails() {
        let token = InMemoryDebtToken::new(custody());
        let alice = AccountId::from_label("alice");
        let bob = AccountId::from_label("bob");

        assert!(token.mint(alice, DebtAmount::from_whole(10)));
        assert!(!token.transfer_from(alice, bob, DebtAmount::from_whole(11)));
        assert_eq!(token.balance_of(alice), DebtAmount::from_whole(10));
        assert_eq!(token.balance_of(bob), DebtAmount::ZERO);
    }
}
