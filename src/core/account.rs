//! Account ledger: authoritative collateral and debt bookkeeping.
//!
//! The ledger records, per account, how much of each collateral asset is
//! deposited and how much debt is outstanding. Accounts come into existence
//! on first credit and vanish again when emptied, so a zeroed account is
//! indistinguishable from one that never existed. All mutation goes through
//! the engine; failed operations restore a snapshot taken up front.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{Error, Result};
use crate::token::collateral::CollateralAmount;
use crate::token::debt::DebtAmount;
use crate::utils::ids::{AccountId, AssetId};

// ═══════════════════════════════════════════════════════════════════════════════
// ACCOUNT POSITION
// ═══════════════════════════════════════════════════════════════════════════════

/// One account's collateral balances and outstanding debt
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountPosition {
    collateral: HashMap<AssetId, CollateralAmount>,
    debt: DebtAmount,
}

impl AccountPosition {
    /// Create an empty position
    pub fn new() -> Self {
        Self::default()
    }

    /// Deposited balance of one asset (zero when absent)
    pub fn collateral(&self, asset: AssetId) -> CollateralAmount {
        self.collateral
            .get(&asset)
            .copied()
            .unwrap_or(CollateralAmount::ZERO)
    }

    /// Outstanding debt
    pub fn debt(&self) -> DebtAmount {
        self.debt
    }

    /// Whether any debt is outstanding
    pub fn has_debt(&self) -> bool {
        !self.debt.is_zero()
    }

    /// Whether the position holds nothing at all
    pub fn is_empty(&self) -> bool {
        self.collateral.is_empty() && self.debt.is_zero()
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// LEDGER SNAPSHOT
// ═══════════════════════════════════════════════════════════════════════════════

/// Captured positions of the accounts an operation may touch.
///
/// `None` records that the account did not exist at capture time, so a
/// restore removes any entry the failed operation created.
#[derive(Debug, Clone)]
pub struct LedgerSnapshot {
    entries: Vec<(AccountId, Option<AccountPosition>)>,
}

// ═══════════════════════════════════════════════════════════════════════════════
// ACCOUNT LEDGER
// ═══════════════════════════════════════════════════════════════════════════════

/// All account positions, keyed by account id
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AccountLedger {
    accounts: HashMap<AccountId, AccountPosition>,
}

impl AccountLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // MUTATION
    // ═══════════════════════════════════════════════════════════════════════════

    /// Add collateral to an account, creating the account if needed.
    /// Returns the new balance.
    pub fn credit(
        &mut self,
        account: AccountId,
        asset: AssetId,
        amount: CollateralAmount,
    ) -> Result<CollateralAmount> {
        let position = self.accounts.entry(account).or_default();
        let balance = position.collateral(asset);
        let new_balance = balance.checked_add(amount).ok_or(Error::Overflow {
            operation: "credit collateral".into(),
        })?;
        position.collateral.insert(asset, new_balance);
        Ok(new_balance)
    }

    /// Remove collateral from an account. Returns the new balance.
    pub fn debit(
        &mut self,
        account: AccountId,
        asset: AssetId,
        amount: CollateralAmount,
    ) -> Result<CollateralAmount> {
        let available = self.collateral(account, asset);
        let new_balance = available
            .checked_sub(amount)
            .ok_or(Error::InsufficientCollateral {
                asset: asset.to_hex(),
                requested: amount.raw(),
                available: available.raw(),
            })?;
        // The account must exist here, or the subtraction above would have
        // failed against a zero balance.
        if let Some(position) = self.accounts.get_mut(&account) {
            if new_balance.is_zero() {
                position.collateral.remove(&asset);
            } else {
                position.collateral.insert(asset, new_balance);
            }
        }
        self.prune(account);
        Ok(new_balance)
    }

    /// Add debt to an account, creating the account if needed.
    /// Returns the new debt.
    pub fn increase_debt(&mut self, account: AccountId, amount: DebtAmount) -> Result<DebtAmount> {
        let position = self.accounts.entry(account).or_default();
        let new_debt = position.debt.checked_add(amount).ok_or(Error::Overflow {
            operation: "increase debt".into(),
        })?;
        position.debt = new_debt;
        Ok(new_debt)
    }

    /// Remove debt from an account. Returns the remaining debt.
    pub fn decrease_debt(&mut self, account: AccountId, amount: DebtAmount) -> Result<DebtAmount> {
        let owed = self.debt(account);
        let new_debt = owed.checked_sub(amount).ok_or(Error::DebtUnderflow {
            requested: amount.raw(),
            available: owed.raw(),
        })?;
        if let Some(position) = self.accounts.get_mut(&account) {
            position.debt = new_debt;
        }
        self.prune(account);
        Ok(new_debt)
    }

    fn prune(&mut self, account: AccountId) {
        if self
            .accounts
            .get(&account)
            .map(AccountPosition::is_empty)
            .unwrap_or(false)
        {
            self.accounts.remove(&account);
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // QUERIES
    // ═══════════════════════════════════════════════════════════════════════════

    /// Deposited balance of one asset (zero for unknown accounts)
    pub fn collateral(&self, account: AccountId, asset: AssetId) -> CollateralAmount {
        self.accounts
            .get(&account)
            .map(|p| p.collateral(asset))
            .unwrap_or(CollateralAmount::ZERO)
    }

    /// Outstanding debt (zero for unknown accounts)
    pub fn debt(&self, account: AccountId) -> DebtAmount {
        self.accounts
            .get(&account)
            .map(AccountPosition::debt)
            .unwrap_or(DebtAmount::ZERO)
    }

    /// The full position of an account, if it exists
    pub fn position(&self, account: AccountId) -> Option<&AccountPosition> {
        self.accounts.get(&account)
    }

    /// Iterate over all live accounts
    pub fn accounts(&self) -> impl Iterator<Item = (&AccountId, &AccountPosition)> {
        self.accounts.iter()
    }

    /// Number of live accounts
    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    /// Sum of all outstanding debt
    pub fn total_debt(&self) -> DebtAmount {
        self.accounts
            .values()
            .fold(DebtAmount::ZERO, |acc, p| acc.saturating_add(p.debt))
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // SNAPSHOT / RESTORE
    // ═══════════════════════════════════════════════════════════════════════════

    /// Capture the current positions of the given accounts
    pub fn snapshot(&self, accounts: &[AccountId]) -> LedgerSnapshot {
        LedgerSnapshot {
            entries: accounts
                .iter()
                .map(|id| (*id, self.accounts.get(id).cloned()))
                .collect(),
        }
    }

    /// Reinstate the captured positions exactly
    pub fn restore(&mut self, snapshot: LedgerSnapshot) {
        for (id, position) in snapshot.entries {
            match position {
                Some(p) => {
                    self.accounts.insert(id, p);
                }
                None => {
                    self.accounts.remove(&id);
                }
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // SERIALIZATION
    // ═══════════════════════════════════════════════════════════════════════════

    /// Serialize to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Deserialize from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes).map_err(|e| Error::Deserialization(e.to_string()))
    }
}
