//! Stock ledger tests
//!
//! Tests for ledger chain verification and ledger filtering:
//! - Chains built from accepted changes always verify
//! - Tampered rows are located by index
//! - Query filters and the recent-activity window

use chrono::{DateTime, Duration, TimeZone, Utc};
use proptest::prelude::*;
use shared::filters::{entries_in_last_days, Filter, LedgerFilter};
use shared::models::{ChangeType, StockLedgerEntry};
use shared::stock::{apply_delta, closing_quantity, verify_chain, ChainBreak, QuantityChange};
use uuid::Uuid;

fn entry(
    product_id: Uuid,
    warehouse_id: Uuid,
    change_type: ChangeType,
    change: QuantityChange,
    created_at: DateTime<Utc>,
) -> StockLedgerEntry {
    StockLedgerEntry {
        id: Uuid::new_v4(),
        product_id,
        product_name: "Hex Bolt".into(),
        product_sku: "BLT-001".into(),
        warehouse_id,
        warehouse_name: "Main".into(),
        change_type,
        quantity_before: change.before,
        quantity_change: change.change,
        quantity_after: change.after,
        reference_id: None,
        reference_type: change_type.reference_type(),
        user_id: Uuid::nil(),
        user_email: "ops@depot.io".into(),
        notes: None,
        created_at,
    }
}

/// Replay deltas from zero, skipping the ones the stock rules refuse
fn replay(deltas: &[i32]) -> Vec<QuantityChange> {
    let mut quantity = 0;
    let mut chain = Vec::new();
    for &delta in deltas {
        if let Ok(change) = apply_delta(quantity, delta) {
            quantity = change.after;
            chain.push(change);
        }
    }
    chain
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Any sequence of accepted changes forms a valid chain whose closing
    /// quantity equals the running total
    #[test]
    fn prop_accepted_changes_form_valid_chain(
        deltas in prop::collection::vec(prop_oneof![-500i32..0, 1i32..500], 0..60)
    ) {
        let chain = replay(&deltas);
        prop_assert!(verify_chain(&chain).is_ok());

        let total: i32 = chain.iter().map(|c| c.change).sum();
        prop_assert_eq!(closing_quantity(&chain).unwrap_or(0), total);
    }

    /// Skipping a row in the middle of a chain is always detected as a gap
    #[test]
    fn prop_missing_row_breaks_chain(
        deltas in prop::collection::vec(1i32..500, 3..30),
        skip in 1usize..29,
    ) {
        let mut chain = replay(&deltas);
        let skip = skip % (chain.len() - 1) + 1;
        chain.remove(skip);
        if skip < chain.len() {
            let is_gap = matches!(verify_chain(&chain), Err(ChainBreak::Gap { index, .. }) if index == skip);
            prop_assert!(is_gap);
        }
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_empty_chain_is_valid() {
        let chain: Vec<QuantityChange> = Vec::new();
        assert!(verify_chain(&chain).is_ok());
        assert_eq!(closing_quantity(&chain), None);
    }

    #[test]
    fn test_bad_arithmetic_detected() {
        let chain = [
            QuantityChange { before: 0, change: 5, after: 5 },
            QuantityChange { before: 5, change: 2, after: 8 },
        ];
        assert!(matches!(
            verify_chain(&chain),
            Err(ChainBreak::Arithmetic { index: 1, .. })
        ));
    }

    #[test]
    fn test_negative_after_detected() {
        let chain = [QuantityChange { before: 2, change: -3, after: -1 }];
        assert_eq!(
            verify_chain(&chain),
            Err(ChainBreak::Negative { index: 0, after: -1 })
        );
    }

    #[test]
    fn test_ledger_entries_verify() {
        let (p, w) = (Uuid::new_v4(), Uuid::new_v4());
        let now = Utc::now();
        let received = apply_delta(0, 10).unwrap();
        let delivered = apply_delta(received.after, -4).unwrap();
        let entries = vec![
            entry(p, w, ChangeType::Receipt, received, now),
            entry(p, w, ChangeType::Delivery, delivered, now),
        ];
        assert!(verify_chain(&entries).is_ok());
        assert_eq!(closing_quantity(&entries), Some(6));
    }

    #[test]
    fn test_filter_by_pair_and_change_type() {
        let (p1, p2, w) = (Uuid::new_v4(), Uuid::new_v4(), Uuid::new_v4());
        let now = Utc::now();
        let change = apply_delta(0, 1).unwrap();
        let entries = vec![
            entry(p1, w, ChangeType::Receipt, change, now),
            entry(p1, w, ChangeType::Adjustment, change, now),
            entry(p2, w, ChangeType::Receipt, change, now),
        ];

        let filter = LedgerFilter {
            product_id: Some(p1),
            change_type: Some(ChangeType::Receipt),
            ..Default::default()
        };
        let found = filter.apply(&entries);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].product_id, p1);

        let by_warehouse = LedgerFilter {
            warehouse_id: Some(w),
            ..Default::default()
        };
        assert_eq!(by_warehouse.apply(&entries).len(), 3);
    }

    #[test]
    fn test_filter_by_date_range() {
        let (p, w) = (Uuid::new_v4(), Uuid::new_v4());
        let change = apply_delta(0, 1).unwrap();
        let jan = Utc.with_ymd_and_hms(2024, 1, 15, 9, 0, 0).unwrap();
        let mar = Utc.with_ymd_and_hms(2024, 3, 15, 9, 0, 0).unwrap();
        let entries = vec![
            entry(p, w, ChangeType::Receipt, change, jan),
            entry(p, w, ChangeType::Receipt, change, mar),
        ];

        let filter = LedgerFilter {
            from: Some(Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap()),
            to: Some(Utc.with_ymd_and_hms(2024, 1, 31, 0, 0, 0).unwrap()),
            ..Default::default()
        };
        assert!(filter.has_valid_range());
        assert_eq!(filter.apply(&entries).len(), 1);

        let inverted = LedgerFilter {
            from: filter.to,
            to: filter.from,
            ..Default::default()
        };
        assert!(!inverted.has_valid_range());
    }

    #[test]
    fn test_entries_in_last_days() {
        let (p, w) = (Uuid::new_v4(), Uuid::new_v4());
        let change = apply_delta(0, 1).unwrap();
        let now = Utc::now();
        let entries = vec![
            entry(p, w, ChangeType::Receipt, change, now - Duration::days(2)),
            entry(p, w, ChangeType::Receipt, change, now - Duration::days(8)),
            entry(p, w, ChangeType::Receipt, change, now - Duration::days(40)),
        ];
        assert_eq!(entries_in_last_days(&entries, now, 7).len(), 1);
        assert_eq!(entries_in_last_days(&entries, now, 30).len(), 2);
    }

    #[test]
    fn test_oversized_window_keeps_all_history() {
        let (p, w) = (Uuid::new_v4(), Uuid::new_v4());
        let change = apply_delta(0, 1).unwrap();
        let now = Utc::now();
        let entries = vec![
            entry(p, w, ChangeType::Receipt, change, now - Duration::days(2)),
            entry(p, w, ChangeType::Receipt, change, now - Duration::days(3650)),
        ];
        assert_eq!(entries_in_last_days(&entries, now, 100_000_000).len(), 2);
        assert_eq!(entries_in_last_days(&entries, now, i64::from(i32::MAX)).len(), 2);
        assert_eq!(entries_in_last_days(&entries, now, i64::MAX).len(), 2);
        assert!(entries_in_last_days(&entries, now, -5).is_empty());
    }

    #[test]
    fn test_change_type_parsing() {
        assert_eq!(ChangeType::parse("transfer-in"), Some(ChangeType::TransferIn));
        assert_eq!(ChangeType::parse("RECEIPT"), Some(ChangeType::Receipt));
        assert_eq!(ChangeType::parse("sale"), None);
    }
}
