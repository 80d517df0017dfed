//! Dashboard aggregation tests
//!
//! Tests for KPIs, low stock detection, category breakdown and warehouse
//! statistics over in-memory lists.

use chrono::Utc;
use proptest::prelude::*;
use shared::dashboard::{category_breakdown, low_stock_items, stock_value, summarize};
use shared::models::{Product, Stock, Warehouse};
use uuid::Uuid;

fn product(name: &str, category: &str, reorder_level: i32, active: bool) -> Product {
    let now = Utc::now();
    Product {
        id: Uuid::new_v4(),
        name: name.into(),
        sku: name.to_uppercase().replace(' ', "-"),
        category: category.into(),
        unit: "pcs".into(),
        reorder_level,
        initial_stock: 0,
        active,
        created_at: now,
        updated_at: now,
    }
}

fn warehouse(name: &str, active: bool) -> Warehouse {
    let now = Utc::now();
    Warehouse {
        id: Uuid::new_v4(),
        name: name.into(),
        location: format!("{} district", name),
        description: None,
        active,
        created_at: now,
        updated_at: now,
    }
}

fn stock(product: &Product, warehouse: &Warehouse, quantity: i32) -> Stock {
    Stock {
        id: Uuid::new_v4(),
        product_id: product.id,
        product_name: product.name.clone(),
        product_sku: product.sku.clone(),
        warehouse_id: warehouse.id,
        warehouse_name: warehouse.name.clone(),
        quantity,
        location_rack: None,
        last_updated: Utc::now(),
    }
}

// ============================================================================
// Property Tests
// ============================================================================

proptest! {
    /// Total stock KPI equals the sum of every row
    #[test]
    fn prop_total_stock_matches_rows(quantities in prop::collection::vec(0i32..10_000, 0..40)) {
        let p = product("Hex Bolt", "Fasteners", 5, true);
        let w = warehouse("Main", true);
        let rows: Vec<Stock> = quantities.iter().map(|q| stock(&p, &w, *q)).collect();

        let data = summarize(&[p.clone()], &[w], &rows);
        let expected: i64 = quantities.iter().map(|q| i64::from(*q)).sum();
        prop_assert_eq!(data.kpis.total_stock, expected);
        prop_assert_eq!(
            data.kpis.low_stock_count,
            quantities.iter().filter(|q| **q < 5).count() as i64
        );
    }
}

// ============================================================================
// Unit Tests
// ============================================================================

#[cfg(test)]
mod unit_tests {
    use super::*;

    #[test]
    fn test_low_stock_is_strictly_below_reorder_level() {
        let bolt = product("Hex Bolt", "Fasteners", 10, true);
        let main = warehouse("Main", true);
        let rows = vec![stock(&bolt, &main, 9), stock(&bolt, &main, 10)];

        let low = low_stock_items(&[bolt.clone()], &rows);
        assert_eq!(low.len(), 1);
        assert_eq!(low[0].current_stock, 9);
        assert_eq!(low[0].reorder_level, 10);
        assert_eq!(low[0].warehouse_name, "Main");
    }

    #[test]
    fn test_inactive_products_excluded_from_low_stock() {
        let retired = product("Old Nut", "Fasteners", 10, false);
        let main = warehouse("Main", true);
        assert!(low_stock_items(&[retired.clone()], &[stock(&retired, &main, 0)]).is_empty());
    }

    #[test]
    fn test_category_breakdown_sorted_and_active_only() {
        let main = warehouse("Main", true);
        let bolt = product("Hex Bolt", "Fasteners", 1, true);
        let nut = product("Hex Nut", "Fasteners", 1, true);
        let drill = product("Drill", "Tools", 1, true);
        let saw = product("Saw", "Tools", 1, false);
        let rows = vec![
            stock(&bolt, &main, 5),
            stock(&nut, &main, 7),
            stock(&drill, &main, 2),
            stock(&saw, &main, 100),
        ];

        let breakdown = category_breakdown(&[drill, bolt, nut, saw], &rows);
        assert_eq!(breakdown.len(), 2);
        assert_eq!(breakdown[0].category, "Fasteners");
        assert_eq!(breakdown[0].product_count, 2);
        assert_eq!(breakdown[0].total_stock, 12);
        assert_eq!(breakdown[1].category, "Tools");
        assert_eq!(breakdown[1].total_stock, 2);
    }

    #[test]
    fn test_summary_kpis_and_warehouse_stats() {
        let main = warehouse("Main", true);
        let annex = warehouse("Annex", true);
        let closed = warehouse("Closed", false);
        let bolt = product("Hex Bolt", "Fasteners", 3, true);
        let nut = product("Hex Nut", "Fasteners", 3, false);
        let rows = vec![
            stock(&bolt, &main, 10),
            stock(&bolt, &annex, 1),
            stock(&nut, &main, 4),
        ];

        let data = summarize(
            &[bolt, nut],
            &[main.clone(), annex, closed],
            &rows,
        );
        assert_eq!(data.kpis.total_products, 2);
        assert_eq!(data.kpis.active_products, 1);
        assert_eq!(data.kpis.total_stock, 15);
        assert_eq!(data.kpis.low_stock_count, 1);
        assert_eq!(data.kpis.total_warehouses, 3);
        assert_eq!(data.kpis.active_warehouses, 2);

        assert_eq!(data.warehouse_stats.len(), 2);
        let main_stats = &data.warehouse_stats[0];
        assert_eq!(main_stats.warehouse_id, main.id);
        assert_eq!(main_stats.total_items, 2);
        assert_eq!(main_stats.total_quantity, 14);
    }

    #[test]
    fn test_stock_value_counts_active_products_only() {
        let main = warehouse("Main", true);
        let bolt = product("Hex Bolt", "Fasteners", 3, true);
        let nut = product("Hex Nut", "Fasteners", 3, false);
        let rows = vec![stock(&bolt, &main, 10), stock(&nut, &main, 4)];

        let value = stock_value(&[bolt, nut], &rows);
        assert_eq!(value.total_stock_value, 10);
        assert_eq!(value.product_count, 1);
    }

    #[test]
    fn test_empty_dashboard() {
        let data = summarize(&[], &[], &[]);
        assert_eq!(data.kpis.total_stock, 0);
        assert!(data.low_stock_items.is_empty());
        assert!(data.category_breakdown.is_empty());
    }

    #[test]
    fn test_dashboard_serializes_camel_case() {
        let json = serde_json::to_value(summarize(&[], &[], &[])).unwrap();
        assert!(json.get("lowStockItems").is_some());
        assert!(json["kpis"].get("activeWarehouses").is_some());
    }
}
