//! Stock quantity arithmetic
//!
//! Every stock mutation in the backend computes its new quantity here before
//! writing, so the quantity rules live in one place:
//!
//! - a stock quantity never drops below zero
//! - `after == before + change` for every recorded change
//! - consecutive ledger rows for a pair chain `before` to the previous `after`

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::StockLedgerEntry;

/// One applied quantity change, as it is recorded in the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuantityChange {
    pub before: i32,
    pub change: i32,
    pub after: i32,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StockError {
    #[error("Insufficient stock: available {available}, requested {requested}")]
    Insufficient { available: i32, requested: i32 },

    #[error("Quantity must be greater than zero")]
    NonPositiveQuantity,

    #[error("Adjustment must not be zero")]
    ZeroAdjustment,

    #[error("Quantity out of range")]
    Overflow,

    #[error("Source and destination warehouses must differ")]
    SameWarehouse,

    #[error("Quantity must not be negative")]
    NegativeQuantity,
}

/// Apply a signed delta to a quantity
pub fn apply_delta(before: i32, delta: i32) -> Result<QuantityChange, StockError> {
    if delta == 0 {
        return Err(StockError::ZeroAdjustment);
    }
    if before < 0 {
        return Err(StockError::NegativeQuantity);
    }

    let after = before.checked_add(delta).ok_or(StockError::Overflow)?;
    if after < 0 {
        return Err(StockError::Insufficient {
            available: before,
            requested: delta.saturating_neg(),
        });
    }

    Ok(QuantityChange {
        before,
        change: delta,
        after,
    })
}

/// Add incoming units (receipts, transfer destination)
pub fn receive(before: i32, qty: i32) -> Result<QuantityChange, StockError> {
    if qty <= 0 {
        return Err(StockError::NonPositiveQuantity);
    }
    apply_delta(before, qty)
}

/// Remove outgoing units (deliveries, transfer source)
pub fn issue(before: i32, qty: i32) -> Result<QuantityChange, StockError> {
    if qty <= 0 {
        return Err(StockError::NonPositiveQuantity);
    }
    apply_delta(before, -qty)
}

/// The change needed to move a quantity to an absolute target.
///
/// Returns `Ok(None)` when the quantity is already at the target.
pub fn set_quantity(before: i32, target: i32) -> Result<Option<QuantityChange>, StockError> {
    if target < 0 {
        return Err(StockError::NegativeQuantity);
    }
    if before == target {
        return Ok(None);
    }
    let delta = target.checked_sub(before).ok_or(StockError::Overflow)?;
    apply_delta(before, delta).map(Some)
}

/// Both sides of a completed transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransferPlan {
    pub outgoing: QuantityChange,
    pub incoming: QuantityChange,
}

impl TransferPlan {
    /// Net effect on the total across both warehouses (always zero)
    pub fn net_change(&self) -> i64 {
        i64::from(self.outgoing.change) + i64::from(self.incoming.change)
    }
}

/// Plan moving `qty` units from a source holding `source_before` to a
/// destination holding `dest_before`
pub fn plan_transfer(
    source_before: i32,
    dest_before: i32,
    qty: i32,
) -> Result<TransferPlan, StockError> {
    let outgoing = issue(source_before, qty)?;
    let incoming = receive(dest_before, qty)?;
    Ok(TransferPlan { outgoing, incoming })
}

/// Anything carrying the before/change/after triple of a ledger row
pub trait LedgerRow {
    fn quantity_before(&self) -> i32;
    fn quantity_change(&self) -> i32;
    fn quantity_after(&self) -> i32;
}

impl LedgerRow for QuantityChange {
    fn quantity_before(&self) -> i32 {
        self.before
    }
    fn quantity_change(&self) -> i32 {
        self.change
    }
    fn quantity_after(&self) -> i32 {
        self.after
    }
}

impl LedgerRow for StockLedgerEntry {
    fn quantity_before(&self) -> i32 {
        self.quantity_before
    }
    fn quantity_change(&self) -> i32 {
        self.quantity_change
    }
    fn quantity_after(&self) -> i32 {
        self.quantity_after
    }
}

/// First inconsistency found in a pair's ledger
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ChainBreak {
    #[error("entry {index}: {before} + {change} does not equal {after}")]
    Arithmetic {
        index: usize,
        before: i32,
        change: i32,
        after: i32,
    },

    #[error("entry {index}: quantity after {after} is negative")]
    Negative { index: usize, after: i32 },

    #[error("entry {index}: starts at {before} but previous entry ended at {previous_after}")]
    Gap {
        index: usize,
        previous_after: i32,
        before: i32,
    },
}

/// Check the ledger rows of one pair, oldest first
pub fn verify_chain<R: LedgerRow>(entries: &[R]) -> Result<(), ChainBreak> {
    let mut previous_after: Option<i32> = None;

    for (index, entry) in entries.iter().enumerate() {
        let before = entry.quantity_before();
        let change = entry.quantity_change();
        let after = entry.quantity_after();

        if before.checked_add(change) != Some(after) {
            return Err(ChainBreak::Arithmetic {
                index,
                before,
                change,
                after,
            });
        }
        if after < 0 {
            return Err(ChainBreak::Negative { index, after });
        }
        if let Some(previous_after) = previous_after {
            if previous_after != before {
                return Err(ChainBreak::Gap {
                    index,
                    previous_after,
                    before,
                });
            }
        }

        previous_after = Some(after);
    }

    Ok(())
}

/// Quantity after the last row, if there is one
pub fn closing_quantity<R: LedgerRow>(entries: &[R]) -> Option<i32> {
    entries.last().map(LedgerRow::quantity_after)
}
