//! Engine events for state change notifications.
//!
//! Events record observable facts about completed operations. They are
//! appended only after an operation has fully succeeded, so the log never
//! mentions a deposit that was rolled back or a burn that failed half way.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::token::collateral::CollateralAmount;
use crate::token::debt::DebtAmount;
use crate::utils::ids::{AccountId, AssetId};

// ═══════════════════════════════════════════════════════════════════════════════
// EVENT TYPES
// ═══════════════════════════════════════════════════════════════════════════════

/// All engine event types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EngineEvent {
    /// Collateral was deposited
    CollateralDeposited(CollateralDepositedEvent),
    /// Collateral left the engine, by redemption or liquidation seizure
    CollateralRedeemed(CollateralRedeemedEvent),
    /// Debt was burned
    DebtBurned(DebtBurnedEvent),
}

impl EngineEvent {
    /// Get the event type as a string
    pub fn event_type(&self) -> &'static str {
        match self {
            Self::CollateralDeposited(_) => "CollateralDeposited",
            Self::CollateralRedeemed(_) => "CollateralRedeemed",
            Self::DebtBurned(_) => "DebtBurned",
        }
    }

    /// Get the timestamp of the event
    pub fn timestamp(&self) -> u64 {
        match self {
            Self::CollateralDeposited(e) => e.timestamp,
            Self::CollateralRedeemed(e) => e.timestamp,
            Self::DebtBurned(e) => e.timestamp,
        }
    }
}

/// Event emitted when collateral is deposited
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollateralDepositedEvent {
    /// Account that deposited
    pub account: AccountId,
    /// Asset deposited
    pub asset: AssetId,
    /// Amount in native token units
    pub amount: CollateralAmount,
    /// Timestamp
    pub timestamp: u64,
}

/// Event emitted when collateral leaves the engine.
///
/// Plain redemptions have `from == to`; liquidation seizures record the
/// liquidated account as `from` and the liquidator as `to`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CollateralRedeemedEvent {
    /// Account the collateral was debited from
    pub from: AccountId,
    /// Account the tokens were paid to
    pub to: AccountId,
    /// Asset redeemed
    pub asset: AssetId,
    /// Amount in native token units
    pub amount: CollateralAmount,
    /// Timestamp
    pub timestamp: u64,
}

/// Event emitted when debt is burned
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DebtBurnedEvent {
    /// Account whose debt decreased
    pub account: AccountId,
    /// Account that supplied the burned tokens
    pub paid_by: AccountId,
    /// Amount burned
    pub amount: DebtAmount,
    /// Timestamp
    pub timestamp: u64,
}

// ═══════════════════════════════════════════════════════════════════════════════
// EVENT LOG
// ═══════════════════════════════════════════════════════════════════════════════

/// Append-only record of completed operations
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventLog {
    events: Vec<EngineEvent>,
}

impl EventLog {
    /// Create a new empty event log
    pub fn new() -> Self {
        Self { events: Vec::new() }
    }

    /// Add an event to the log
    pub fn push(&mut self, event: EngineEvent) {
        self.events.push(event);
    }

    /// Get all events
    pub fn events(&self) -> &[EngineEvent] {
        &self.events
    }

    /// Get events of a specific type
    pub fn filter_by_type(&self, event_type: &str) -> Vec<&EngineEvent> {
        self.events
            .iter()
            .filter(|e| e.event_type() == event_type)
            .collect()
    }

    /// Get the number of events
    pub fn len(&self) -> usize {
        self.events.len()
    }

    /// Check if empty
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Clear all events
    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Serialize to bytes
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        bincode::serialize(self).map_err(|e| Error::Serialization(e.to_string()))
    }

    /// Deserialize from bytes
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        bincode::deserialize(bytes).map_err(|e| Error::Deserialization(e.to_string()))
    }
}
