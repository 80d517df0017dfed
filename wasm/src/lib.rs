//! WebAssembly module for the Depot inventory client
//!
//! Provides client-side computation for:
//! - List filtering (products, stock, ledger, receipts, deliveries)
//! - Stock adjustment previews before submitting to the server
//! - Document totals
//!
//! Everything crosses the JS boundary as JSON strings in the same camelCase
//! shape the REST API returns.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::de::DeserializeOwned;
use serde::Serialize;
use shared::filters::{
    entries_in_last_days, DocumentFilter, Filter, LedgerFilter, ProductFilter, StockFilter,
};
use shared::stock::apply_delta;
use wasm_bindgen::prelude::*;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::types::*;
pub use shared::validation::*;

/// Initialize the WASM module
#[wasm_bindgen(start)]
pub fn init() {
    web_sys::console::debug_1(&JsValue::from_str("depot-wasm loaded"));
}

fn parse<T: DeserializeOwned>(what: &str, json: &str) -> Result<T, String> {
    serde_json::from_str(json).map_err(|e| format!("Invalid {} JSON: {}", what, e))
}

fn to_json<T: Serialize>(value: &T) -> Result<String, String> {
    serde_json::to_string(value).map_err(|e| format!("Serialization failed: {}", e))
}

fn apply_filter<T, F>(what: &str, items_json: &str, filter_json: &str) -> Result<String, String>
where
    T: DeserializeOwned + Serialize + Clone,
    F: Filter<T> + DeserializeOwned,
{
    let items: Vec<T> = parse(what, items_json)?;
    let filter: F = parse("filter", filter_json)?;
    to_json(&filter.apply(&items))
}

fn into_js(result: Result<String, String>) -> Result<String, JsValue> {
    result.map_err(|msg| {
        web_sys::console::warn_1(&JsValue::from_str(&msg));
        JsValue::from_str(&msg)
    })
}

fn filter_documents_json(
    kind: &str,
    documents_json: &str,
    filter_json: &str,
) -> Result<String, String> {
    match kind {
        "receipt" | "receipts" => {
            apply_filter::<Receipt, DocumentFilter>("receipts", documents_json, filter_json)
        }
        "delivery" | "deliveries" => {
            apply_filter::<Delivery, DocumentFilter>("deliveries", documents_json, filter_json)
        }
        other => Err(format!("Unknown document kind '{}'", other)),
    }
}

fn last_days_json(entries_json: &str, now: DateTime<Utc>, days: i64) -> Result<String, String> {
    let entries: Vec<StockLedgerEntry> = parse("ledger", entries_json)?;
    to_json(&entries_in_last_days(&entries, now, days))
}

fn document_total_json(items_json: &str) -> Result<String, String> {
    let items: Vec<DocumentItemInput> = parse("items", items_json)?;
    let total: Decimal = items
        .iter()
        .filter_map(|item| item.unit_price.map(|price| price * Decimal::from(item.quantity)))
        .sum();
    Ok(total.to_string())
}

/// Filter a product list: `{search?, category?, activeOnly?}`
#[wasm_bindgen]
pub fn filter_products(products_json: &str, filter_json: &str) -> Result<String, JsValue> {
    into_js(apply_filter::<Product, ProductFilter>(
        "products",
        products_json,
        filter_json,
    ))
}

/// Filter stock rows: `{productId?, warehouseId?, search?, below?}`
#[wasm_bindgen]
pub fn filter_stock(stock_json: &str, filter_json: &str) -> Result<String, JsValue> {
    into_js(apply_filter::<Stock, StockFilter>(
        "stock",
        stock_json,
        filter_json,
    ))
}

/// Filter ledger rows with the same fields `GET /ledger` accepts
#[wasm_bindgen]
pub fn filter_ledger(entries_json: &str, filter_json: &str) -> Result<String, JsValue> {
    into_js(apply_filter::<StockLedgerEntry, LedgerFilter>(
        "ledger",
        entries_json,
        filter_json,
    ))
}

/// Filter receipts or deliveries; `kind` is `"receipt"` or `"delivery"`
#[wasm_bindgen]
pub fn filter_documents(
    kind: &str,
    documents_json: &str,
    filter_json: &str,
) -> Result<String, JsValue> {
    into_js(filter_documents_json(kind, documents_json, filter_json))
}

/// Ledger rows recorded within the last `days` days
#[wasm_bindgen]
pub fn ledger_entries_in_last_days(entries_json: &str, days: i32) -> Result<String, JsValue> {
    let now = DateTime::<Utc>::from_timestamp_millis(js_sys::Date::now() as i64)
        .unwrap_or_else(Utc::now);
    into_js(last_days_json(entries_json, now, i64::from(days)))
}

/// Quantity that `delta` would leave, or the reason the server would refuse it
#[wasm_bindgen]
pub fn preview_adjustment(current: i32, delta: i32) -> Result<i32, JsValue> {
    apply_delta(current, delta)
        .map(|change| change.after)
        .map_err(|e| JsValue::from_str(&e.to_string()))
}

/// Sum of quantity times unit price over a document's item list, as a decimal string
#[wasm_bindgen]
pub fn document_total(items_json: &str) -> Result<String, JsValue> {
    into_js(document_total_json(items_json))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use serde_json::{json, Value};
    use uuid::Uuid;

    fn product(name: &str, sku: &str, category: &str, active: bool) -> Value {
        json!({
            "id": Uuid::new_v4(),
            "name": name,
            "sku": sku,
            "category": category,
            "unit": "pcs",
            "reorderLevel": 5,
            "initialStock": 0,
            "active": active,
            "createdAt": Utc::now(),
            "updatedAt": Utc::now(),
        })
    }

    fn ledger_entry(created_at: DateTime<Utc>) -> Value {
        json!({
            "id": Uuid::new_v4(),
            "productId": Uuid::new_v4(),
            "productName": "Bolt",
            "productSku": "BLT-1",
            "warehouseId": Uuid::new_v4(),
            "warehouseName": "Main",
            "changeType": "ADJUSTMENT",
            "quantityBefore": 0,
            "quantityChange": 4,
            "quantityAfter": 4,
            "referenceId": null,
            "referenceType": "ADJUSTMENT",
            "userId": Uuid::new_v4(),
            "userEmail": "ops@depot.io",
            "notes": null,
            "createdAt": created_at,
        })
    }

    #[test]
    fn test_filter_products_by_search_and_active() {
        let products = json!([
            product("Hex Bolt", "BLT-1", "Fasteners", true),
            product("Hex Nut", "NUT-1", "Fasteners", false),
            product("Drill", "DRL-1", "Tools", true),
        ])
        .to_string();

        let out = apply_filter::<Product, ProductFilter>(
            "products",
            &products,
            r#"{"search":"hex","activeOnly":true}"#,
        )
        .unwrap();
        let filtered: Vec<Product> = serde_json::from_str(&out).unwrap();
        assert_eq!(filtered.len(), 1);
        assert_eq!(filtered[0].sku, "BLT-1");
    }

    #[test]
    fn test_empty_filter_keeps_everything() {
        let products = json!([
            product("Hex Bolt", "BLT-1", "Fasteners", true),
            product("Drill", "DRL-1", "Tools", false),
        ])
        .to_string();

        let out = apply_filter::<Product, ProductFilter>("products", &products, "{}").unwrap();
        let filtered: Vec<Product> = serde_json::from_str(&out).unwrap();
        assert_eq!(filtered.len(), 2);
    }

    #[test]
    fn test_malformed_json_is_reported() {
        let err = apply_filter::<Product, ProductFilter>("products", "not json", "{}")
            .unwrap_err();
        assert!(err.starts_with("Invalid products JSON"));
    }

    #[test]
    fn test_unknown_document_kind() {
        assert!(filter_documents_json("invoice", "[]", "{}").is_err());
        assert_eq!(filter_documents_json("receipt", "[]", "{}").unwrap(), "[]");
    }

    #[test]
    fn test_last_days_window() {
        let now = Utc::now();
        let entries = json!([
            ledger_entry(now - Duration::days(1)),
            ledger_entry(now - Duration::days(10)),
        ])
        .to_string();

        let out = last_days_json(&entries, now, 7).unwrap();
        let recent: Vec<StockLedgerEntry> = serde_json::from_str(&out).unwrap();
        assert_eq!(recent.len(), 1);

        let all = last_days_json(&entries, now, i64::from(i32::MAX)).unwrap();
        let all: Vec<StockLedgerEntry> = serde_json::from_str(&all).unwrap();
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn test_document_total_skips_unpriced_lines() {
        let items = json!([
            {"productId": Uuid::new_v4(), "quantity": 3, "unitPrice": "2.50"},
            {"productId": Uuid::new_v4(), "quantity": 4, "unitPrice": null},
            {"productId": Uuid::new_v4(), "quantity": 1, "unitPrice": "10"},
        ])
        .to_string();

        assert_eq!(document_total_json(&items).unwrap(), "17.50");
    }
}
