//! The debt engine: deposits, minting, redemption and liquidation.
//!
//! This module orchestrates every state-changing operation:
//! - Collateral deposits and redemptions against external tokens
//! - Minting and burning of the USD-pegged debt token
//! - Liquidation of undercollateralized accounts at a fixed bonus
//!
//! Every operation is staged the same way: validate inputs, mutate the
//! ledger, run health-factor checks, make the external token calls, emit
//! events. A failure at any stage restores the ledger snapshot taken up
//! front. External calls are ordered so that the realistic failure, the
//! first call returning false, leaves no external side effects at all; a
//! later call failing still restores the ledger and logs a reconciliation
//! warning.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::core::account::AccountLedger;
use crate::core::registry::{CollateralAsset, CollateralRegistry};
use crate::core::valuation::{HealthFactor, UsdValue, ValuationEngine};
use crate::engine::events::{
    CollateralDepositedEvent, CollateralRedeemedEvent, DebtBurnedEvent, EngineEvent, EventLog,
};
use crate::error::{Error, Result};
use crate::oracle::clock::SharedClock;
use crate::oracle::source::SharedPriceSource;
use crate::token::collateral::{CollateralAmount, SharedCollateralToken};
use crate::token::debt::{DebtAmount, SharedDebtToken};
use crate::utils::constants::{
    LIQUIDATION_BONUS, LIQUIDATION_PRECISION, LIQUIDATION_THRESHOLD, MIN_HEALTH_FACTOR, PRECISION,
    PRICE_STALENESS_TIMEOUT_SECS,
};
use crate::utils::ids::{AccountId, AssetId};
use crate::utils::math::mul_div;
use crate::utils::validation::{
    validate_nonzero_collateral, validate_nonzero_debt, validate_supported,
};

// ═══════════════════════════════════════════════════════════════════════════════
// LIQUIDATION RECEIPT
// ═══════════════════════════════════════════════════════════════════════════════

/// Record of a completed liquidation
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LiquidationReceipt {
    /// Debt repaid on the target's behalf
    pub debt_covered: DebtAmount,
    /// Collateral paid out to the liquidator, bonus included
    pub collateral_seized: CollateralAmount,
    /// Portion of the seizure above the debt's plain conversion value.
    /// Zero when the clamp to the target's balance ate the bonus.
    pub bonus_paid: CollateralAmount,
    /// Target's health factor before the liquidation
    pub starting_health_factor: HealthFactor,
    /// Target's health factor after the liquidation
    pub ending_health_factor: HealthFactor,
}

// ═══════════════════════════════════════════════════════════════════════════════
// DSC ENGINE
// ═══════════════════════════════════════════════════════════════════════════════

/// Collateralized-debt engine over external token and price capabilities.
///
/// The engine's ledger is the authoritative record of who deposited what
/// and who owes what. Collateral tokens themselves live in wallets outside
/// the engine; deposits pull them into the engine's custody account and
/// redemptions push them back out.
pub struct DscEngine {
    registry: CollateralRegistry,
    ledger: AccountLedger,
    collateral_tokens: HashMap<AssetId, SharedCollateralToken>,
    debt_token: SharedDebtToken,
    clock: SharedClock,
    custody: AccountId,
    event_log: EventLog,
    entered: bool,
}

impl std::fmt::Debug for DscEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DscEngine")
            .field("registry", &self.registry)
            .field("ledger", &self.ledger)
            .field("custody", &self.custody)
            .field("events", &self.event_log.len())
            .finish_non_exhaustive()
    }
}

impl DscEngine {
    /// Build an engine over the given capabilities.
    ///
    /// `collateral_tokens` and `price_sources` are parallel lists; the
    /// registry rejects mismatched lengths and duplicate symbols. `custody`
    /// is the account the collateral tokens recognize as the engine's own
    /// wallet and the debt token burns from.
    pub fn new(
        custody: AccountId,
        collateral_tokens: Vec<SharedCollateralToken>,
        price_sources: Vec<SharedPriceSource>,
        debt_token: SharedDebtToken,
        clock: SharedClock,
    ) -> Result<Self> {
        let assets: Vec<CollateralAsset> = collateral_tokens
            .iter()
            .map(|t| CollateralAsset::new(&t.symbol(), t.decimals()))
            .collect();
        let registry = CollateralRegistry::new(assets, price_sources)?;

        let tokens = collateral_tokens
            .into_iter()
            .map(|t| (t.id(), t))
            .collect();

        Ok(Self {
            registry,
            ledger: AccountLedger::new(),
            collateral_tokens: tokens,
            debt_token,
            clock,
            custody,
            event_log: EventLog::new(),
            entered: false,
        })
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // GUARDS
    // ═══════════════════════════════════════════════════════════════════════════

    fn non_reentrant<T>(&mut self, f: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        if self.entered {
            return Err(Error::ReentrantCall);
        }
        self.entered = true;
        let result = f(self);
        self.entered = false;
        result
    }

    /// Run `f` with the named accounts' positions captured; restore them on
    /// any error.
    fn with_rollback<T>(
        &mut self,
        accounts: &[AccountId],
        f: impl FnOnce(&mut Self) -> Result<T>,
    ) -> Result<T> {
        let snapshot = self.ledger.snapshot(accounts);
        match f(self) {
            Ok(value) => Ok(value),
            Err(e) => {
                self.ledger.restore(snapshot);
                Err(e)
            }
        }
    }

    fn revert_if_health_factor_broken(&self, account: AccountId, now: u64) -> Result<()> {
        let factor = self.valuation().account_health_factor(&self.ledger, account, now)?;
        if !factor.is_healthy() {
            return Err(Error::HealthFactorBroken { factor: factor.raw() });
        }
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // OPERATIONS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Deposit collateral into the engine.
    ///
    /// Credits the caller's ledger balance and pulls the tokens from the
    /// caller's wallet into engine custody. Deposits cannot harm a position,
    /// so no health check runs.
    pub fn deposit_collateral(
        &mut self,
        caller: AccountId,
        asset: AssetId,
        amount: CollateralAmount,
    ) -> Result<()> {
        self.non_reentrant(|engine| {
            validate_nonzero_collateral(amount)?;
            validate_supported(&engine.registry, asset)?;
            let now = engine.clock.now();

            engine.with_rollback(&[caller], |engine| {
                engine.ledger.credit(caller, asset, amount)?;
                engine.pull_collateral(asset, caller, amount)?;

                engine
                    .event_log
                    .push(EngineEvent::CollateralDeposited(CollateralDepositedEvent {
                        account: caller,
                        asset,
                        amount,
                        timestamp: now,
                    }));
                Ok(())
            })
        })
    }

    /// Mint debt tokens against the caller's collateral.
    ///
    /// Fails `HealthFactorBroken` if the resulting position would be
    /// undercollateralized; nothing is minted in that case.
    pub fn mint_dsc(&mut self, caller: AccountId, amount: DebtAmount) -> Result<()> {
        self.non_reentrant(|engine| {
            validate_nonzero_debt(amount)?;
            let now = engine.clock.now();

            engine.with_rollback(&[caller], |engine| {
                engine.ledger.increase_debt(caller, amount)?;
                engine.revert_if_health_factor_broken(caller, now)?;

                if !engine.debt_token.mint(caller, amount) {
                    return Err(Error::MintFailed { to: caller.to_hex() });
                }
                Ok(())
            })
        })
    }

    /// Deposit collateral and mint debt as one unit.
    ///
    /// The health check sees the combined result, so collateral deposited
    /// here counts toward the mint.
    pub fn deposit_collateral_and_mint_dsc(
        &mut self,
        caller: AccountId,
        asset: AssetId,
        amount: CollateralAmount,
        debt: DebtAmount,
    ) -> Result<()> {
        self.non_reentrant(|engine| {
            validate_nonzero_collateral(amount)?;
            validate_nonzero_debt(debt)?;
            validate_supported(&engine.registry, asset)?;
            let now = engine.clock.now();

            engine.with_rollback(&[caller], |engine| {
                engine.ledger.credit(caller, asset, amount)?;
                engine.ledger.increase_debt(caller, debt)?;
                engine.revert_if_health_factor_broken(caller, now)?;

                engine.pull_collateral(asset, caller, amount)?;
                if !engine.debt_token.mint(caller, debt) {
                    tracing::warn!(
                        account = %caller.short(),
                        "debt mint failed after collateral pull; ledger restored, custody holds the deposit"
                    );
                    return Err(Error::MintFailed { to: caller.to_hex() });
                }

                engine
                    .event_log
                    .push(EngineEvent::CollateralDeposited(CollateralDepositedEvent {
                        account: caller,
                        asset,
                        amount,
                        timestamp: now,
                    }));
                Ok(())
            })
        })
    }

    /// Redeem collateral back to the caller's wallet.
    ///
    /// Fails `HealthFactorBroken` if the remaining collateral would no
    /// longer cover the caller's debt.
    pub fn redeem_collateral(
        &mut self,
        caller: AccountId,
        asset: AssetId,
        amount: CollateralAmount,
    ) -> Result<()> {
        self.non_reentrant(|engine| {
            validate_nonzero_collateral(amount)?;
            validate_supported(&engine.registry, asset)?;
            let now = engine.clock.now();

            engine.with_rollback(&[caller], |engine| {
                engine.ledger.debit(caller, asset, amount)?;
                engine.revert_if_health_factor_broken(caller, now)?;
                engine.push_collateral(asset, caller, amount)?;

                engine
                    .event_log
                    .push(EngineEvent::CollateralRedeemed(CollateralRedeemedEvent {
                        from: caller,
                        to: caller,
                        asset,
                        amount,
                        timestamp: now,
                    }));
                Ok(())
            })
        })
    }

    /// Burn debt tokens to reduce the caller's debt.
    ///
    /// Pulls the tokens from the caller's wallet and burns them from
    /// custody. Burning cannot harm a position; the post-check is kept for
    /// uniformity.
    pub fn burn_dsc(&mut self, caller: AccountId, amount: DebtAmount) -> Result<()> {
        self.non_reentrant(|engine| {
            validate_nonzero_debt(amount)?;
            let now = engine.clock.now();

            engine.with_rollback(&[caller], |engine| {
                engine.ledger.decrease_debt(caller, amount)?;
                engine.revert_if_health_factor_broken(caller, now)?;
                engine.pull_and_burn_debt(caller, amount)?;

                engine.event_log.push(EngineEvent::DebtBurned(DebtBurnedEvent {
                    account: caller,
                    paid_by: caller,
                    amount,
                    timestamp: now,
                }));
                Ok(())
            })
        })
    }

    /// Burn debt and redeem collateral as one unit.
    ///
    /// The single health check sees the combined result, so collateral can
    /// be withdrawn that the burned debt no longer encumbers.
    pub fn redeem_collateral_for_dsc(
        &mut self,
        caller: AccountId,
        asset: AssetId,
        amount: CollateralAmount,
        debt: DebtAmount,
    ) -> Result<()> {
        self.non_reentrant(|engine| {
            validate_nonzero_collateral(amount)?;
            validate_nonzero_debt(debt)?;
            validate_supported(&engine.registry, asset)?;
            let now = engine.clock.now();

            engine.with_rollback(&[caller], |engine| {
                engine.ledger.decrease_debt(caller, debt)?;
                engine.ledger.debit(caller, asset, amount)?;
                engine.revert_if_health_factor_broken(caller, now)?;

                engine.pull_and_burn_debt(caller, debt)?;
                if let Err(e) = engine.push_collateral(asset, caller, amount) {
                    tracing::warn!(
                        account = %caller.short(),
                        "collateral payout failed after debt burn; ledger restored"
                    );
                    return Err(e);
                }

                engine.event_log.push(EngineEvent::DebtBurned(DebtBurnedEvent {
                    account: caller,
                    paid_by: caller,
                    amount: debt,
                    timestamp: now,
                }));
                engine
                    .event_log
                    .push(EngineEvent::CollateralRedeemed(CollateralRedeemedEvent {
                        from: caller,
                        to: caller,
                        asset,
                        amount,
                        timestamp: now,
                    }));
                Ok(())
            })
        })
    }

    /// Liquidate an undercollateralized account.
    ///
    /// The liquidator repays `debt_to_cover` of the target's debt and
    /// receives the equivalent collateral plus a bonus, clamped to what the
    /// target actually holds of `asset`. Positions at or very near 100%
    /// collateralization therefore pay a reduced or zero bonus; that
    /// limitation is inherited and intentional. Self-liquidation is not
    /// prohibited.
    pub fn liquidate(
        &mut self,
        liquidator: AccountId,
        asset: AssetId,
        target: AccountId,
        debt_to_cover: DebtAmount,
    ) -> Result<LiquidationReceipt> {
        self.non_reentrant(|engine| {
            validate_nonzero_debt(debt_to_cover)?;
            validate_supported(&engine.registry, asset)?;
            let now = engine.clock.now();

            let starting = engine
                .valuation()
                .account_health_factor(&engine.ledger, target, now)?;
            if starting.is_healthy() {
                return Err(Error::HealthFactorOk { factor: starting.raw() });
            }

            // Debt is USD 1:1, so the conversion prices the repayment in
            // collateral units. A zero-priced asset converts to zero units;
            // the debt reduction below still applies.
            let base = engine
                .valuation()
                .token_amount_for_usd(asset, debt_to_cover.as_usd(), now)?;
            let bonus = CollateralAmount::from_raw(mul_div(
                base.raw(),
                LIQUIDATION_BONUS,
                LIQUIDATION_PRECISION,
            )?);
            let total = base.checked_add(bonus).ok_or(Error::Overflow {
                operation: "liquidation seizure".into(),
            })?;

            // Clamp to the target's balance so thin positions cannot be
            // over-seized.
            let seized = total.min(engine.ledger.collateral(target, asset));
            let bonus_paid = seized.saturating_sub(base);

            engine.with_rollback(&[target, liquidator], |engine| {
                engine.ledger.debit(target, asset, seized)?;
                engine.ledger.decrease_debt(target, debt_to_cover)?;

                let ending = engine
                    .valuation()
                    .account_health_factor(&engine.ledger, target, now)?;
                if ending <= starting {
                    return Err(Error::HealthFactorNotImproved {
                        before: starting.raw(),
                        after: ending.raw(),
                    });
                }
                engine.revert_if_health_factor_broken(liquidator, now)?;

                engine.pull_and_burn_debt(liquidator, debt_to_cover)?;
                if let Err(e) = engine.push_collateral(asset, liquidator, seized) {
                    tracing::warn!(
                        liquidator = %liquidator.short(),
                        target = %target.short(),
                        "seizure payout failed after debt burn; ledger restored"
                    );
                    return Err(e);
                }

                engine
                    .event_log
                    .push(EngineEvent::CollateralRedeemed(CollateralRedeemedEvent {
                        from: target,
                        to: liquidator,
                        asset,
                        amount: seized,
                        timestamp: now,
                    }));
                engine.event_log.push(EngineEvent::DebtBurned(DebtBurnedEvent {
                    account: target,
                    paid_by: liquidator,
                    amount: debt_to_cover,
                    timestamp: now,
                }));

                Ok(LiquidationReceipt {
                    debt_covered: debt_to_cover,
                    collateral_seized: seized,
                    bonus_paid,
                    starting_health_factor: starting,
                    ending_health_factor: ending,
                })
            })
        })
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // EXTERNAL CALLS
    // ═══════════════════════════════════════════════════════════════════════════

    fn collateral_token(&self, asset: AssetId) -> Result<&SharedCollateralToken> {
        self.collateral_tokens
            .get(&asset)
            .ok_or(Error::UnsupportedAsset { asset: asset.to_hex() })
    }

    fn pull_collateral(
        &self,
        asset: AssetId,
        from: AccountId,
        amount: CollateralAmount,
    ) -> Result<()> {
        let token = self.collateral_token(asset)?;
        if !token.transfer_from(from, self.custody, amount) {
            return Err(Error::TransferFailed {
                token: token.symbol(),
                from: from.to_hex(),
                to: self.custody.to_hex(),
            });
        }
        Ok(())
    }

    fn push_collateral(&self, asset: AssetId, to: AccountId, amount: CollateralAmount) -> Result<()> {
        let token = self.collateral_token(asset)?;
        if !token.transfer(to, amount) {
            return Err(Error::TransferFailed {
                token: token.symbol(),
                from: self.custody.to_hex(),
                to: to.to_hex(),
            });
        }
        Ok(())
    }

    fn pull_and_burn_debt(&self, payer: AccountId, amount: DebtAmount) -> Result<()> {
        if !self.debt_token.transfer_from(payer, self.custody, amount) {
            return Err(Error::TransferFailed {
                token: "DSC".into(),
                from: payer.to_hex(),
                to: self.custody.to_hex(),
            });
        }
        if !self.debt_token.burn(amount) {
            tracing::warn!(
                payer = %payer.short(),
                amount = %amount,
                "debt burn failed after transfer; custody holds unburned tokens"
            );
            return Err(Error::BurnFailed { from: self.custody.to_hex() });
        }
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // ACCOUNT QUERIES
    // ═══════════════════════════════════════════════════════════════════════════

    fn valuation(&self) -> ValuationEngine<'_> {
        ValuationEngine::new(&self.registry)
    }

    /// Ledger collateral balance of an account
    pub fn collateral_balance(&self, account: AccountId, asset: AssetId) -> CollateralAmount {
        self.ledger.collateral(account, asset)
    }

    /// Total USD value of an account's collateral at fresh prices
    pub fn account_collateral_usd(&self, account: AccountId) -> Result<UsdValue> {
        self.valuation()
            .account_collateral_usd(&self.ledger, account, self.clock.now())
    }

    /// Outstanding debt of an account
    pub fn debt_of(&self, account: AccountId) -> DebtAmount {
        self.ledger.debt(account)
    }

    /// Health factor of an account
    pub fn health_factor_of(&self, account: AccountId) -> Result<HealthFactor> {
        self.valuation()
            .account_health_factor(&self.ledger, account, self.clock.now())
    }

    /// Debt and total collateral value of an account in one call
    pub fn account_information(&self, account: AccountId) -> Result<(DebtAmount, UsdValue)> {
        Ok((self.debt_of(account), self.account_collateral_usd(account)?))
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // GLOBAL QUERIES
    // ═══════════════════════════════════════════════════════════════════════════

    /// Supported collateral assets in registration order
    pub fn supported_assets(&self) -> Vec<CollateralAsset> {
        self.registry.assets().map(|r| r.asset.clone()).collect()
    }

    /// Price source backing a supported asset
    pub fn price_source(&self, asset: AssetId) -> Result<SharedPriceSource> {
        Ok(self.registry.adapter(asset)?.source())
    }

    /// The engine's custody account
    pub fn custody(&self) -> AccountId {
        self.custody
    }

    /// Sum of all outstanding ledger debt
    pub fn total_debt(&self) -> DebtAmount {
        self.ledger.total_debt()
    }

    /// Total USD value of all held collateral at fresh prices.
    /// With the debt token supply this answers the solvency question.
    pub fn total_collateral_usd(&self) -> Result<UsdValue> {
        let now = self.clock.now();
        let valuation = self.valuation();
        let mut total = UsdValue::ZERO;
        for (account, _) in self.ledger.accounts() {
            let value = valuation.account_collateral_usd(&self.ledger, *account, now)?;
            total = total.checked_add(value).ok_or(Error::Overflow {
                operation: "total collateral sweep".into(),
            })?;
        }
        Ok(total)
    }

    /// USD value of a given amount of a supported asset
    pub fn usd_value_of(&self, asset: AssetId, amount: CollateralAmount) -> Result<UsdValue> {
        self.valuation().usd_value(asset, amount, self.clock.now())
    }

    /// Native token amount of a supported asset worth the given USD value
    pub fn token_amount_from_usd(&self, asset: AssetId, usd: UsdValue) -> Result<CollateralAmount> {
        self.valuation()
            .token_amount_for_usd(asset, usd, self.clock.now())
    }

    /// Events emitted so far
    pub fn events(&self) -> &EventLog {
        &self.event_log
    }

    /// Take the event log, leaving an empty one behind
    pub fn take_events(&mut self) -> EventLog {
        std::mem::take(&mut self.event_log)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // ENGINE CONSTANTS
    // ═══════════════════════════════════════════════════════════════════════════

    /// Canonical 18-decimal fixed-point scale
    pub const fn precision(&self) -> u128 {
        PRECISION
    }

    /// Percent of collateral value counted toward debt coverage
    pub const fn liquidation_threshold(&self) -> u128 {
        LIQUIDATION_THRESHOLD
    }

    /// Percent bonus paid on liquidation seizures
    pub const fn liquidation_bonus(&self) -> u128 {
        LIQUIDATION_BONUS
    }

    /// Minimum healthy factor at the canonical scale
    pub const fn min_health_factor(&self) -> u128 {
        MIN_HEALTH_FACTOR
    }

    /// Maximum accepted price quote age in seconds
    pub const fn price_staleness_timeout(&self) -> u64 {
        PRICE_STALENESS_TIMEOUT_SECS
    }
}
