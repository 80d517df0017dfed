//! Dashboard aggregation over loaded product, warehouse and stock lists

use std::collections::{BTreeMap, HashMap};

use uuid::Uuid;

use crate::models::{
    CategoryStats, DashboardData, Kpis, LowStockItem, Product, Stock, StockValueAnalysis,
    Warehouse, WarehouseStats,
};

/// One entry per stock row of an active product whose quantity is below the
/// product's reorder level
pub fn low_stock_items(products: &[Product], stock: &[Stock]) -> Vec<LowStockItem> {
    let active: HashMap<Uuid, &Product> = products
        .iter()
        .filter(|p| p.active)
        .map(|p| (p.id, p))
        .collect();

    stock
        .iter()
        .filter_map(|s| {
            let product = active.get(&s.product_id)?;
            (s.quantity < product.reorder_level).then(|| LowStockItem {
                product_id: product.id,
                product_name: product.name.clone(),
                sku: product.sku.clone(),
                category: product.category.clone(),
                current_stock: s.quantity,
                reorder_level: product.reorder_level,
                warehouse_id: s.warehouse_id,
                warehouse_name: s.warehouse_name.clone(),
            })
        })
        .collect()
}

fn totals_by_product(stock: &[Stock]) -> HashMap<Uuid, i64> {
    let mut totals = HashMap::new();
    for s in stock {
        *totals.entry(s.product_id).or_insert(0) += i64::from(s.quantity);
    }
    totals
}

/// Active products grouped by category, sorted by category name
pub fn category_breakdown(products: &[Product], stock: &[Stock]) -> Vec<CategoryStats> {
    let totals = totals_by_product(stock);
    let mut groups: BTreeMap<&str, CategoryStats> = BTreeMap::new();

    for p in products.iter().filter(|p| p.active) {
        let stats = groups.entry(p.category.as_str()).or_insert_with(|| CategoryStats {
            category: p.category.clone(),
            product_count: 0,
            total_stock: 0,
        });
        stats.product_count += 1;
        stats.total_stock += totals.get(&p.id).copied().unwrap_or(0);
    }

    groups.into_values().collect()
}

/// Stock held by each active warehouse, in input order
pub fn warehouse_stats(warehouses: &[Warehouse], stock: &[Stock]) -> Vec<WarehouseStats> {
    warehouses
        .iter()
        .filter(|w| w.active)
        .map(|w| {
            let rows = stock.iter().filter(|s| s.warehouse_id == w.id);
            let (items, quantity) =
                rows.fold((0i64, 0i64), |(n, q), s| (n + 1, q + i64::from(s.quantity)));
            WarehouseStats {
                warehouse_id: w.id,
                warehouse_name: w.name.clone(),
                location: w.location.clone(),
                total_items: items,
                total_quantity: quantity,
            }
        })
        .collect()
}

pub fn summarize(products: &[Product], warehouses: &[Warehouse], stock: &[Stock]) -> DashboardData {
    let low_stock_items = low_stock_items(products, stock);

    let kpis = Kpis {
        total_products: products.len() as i64,
        active_products: products.iter().filter(|p| p.active).count() as i64,
        total_stock: stock.iter().map(|s| i64::from(s.quantity)).sum(),
        low_stock_count: low_stock_items.len() as i64,
        total_warehouses: warehouses.len() as i64,
        active_warehouses: warehouses.iter().filter(|w| w.active).count() as i64,
    };

    DashboardData {
        kpis,
        low_stock_items,
        category_breakdown: category_breakdown(products, stock),
        warehouse_stats: warehouse_stats(warehouses, stock),
    }
}

/// Total units held for active products
pub fn stock_value(products: &[Product], stock: &[Stock]) -> StockValueAnalysis {
    let totals = totals_by_product(stock);
    let active: Vec<&Product> = products.iter().filter(|p| p.active).collect();

    StockValueAnalysis {
        total_stock_value: active
            .iter()
            .map(|p| totals.get(&p.id).copied().unwrap_or(0))
            .sum(),
        product_count: active.len() as i64,
    }
}
