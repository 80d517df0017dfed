//! List filters shared by the backend query layer and the browser client
//!
//! Each filter is a plain linear scan over an in-memory list. Unset fields
//! match everything.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{
    ChangeType, DocumentStatus, Product, Stock, StockDocument, StockLedgerEntry,
};

pub trait Filter<T> {
    fn matches(&self, item: &T) -> bool;

    fn apply(&self, items: &[T]) -> Vec<T>
    where
        T: Clone,
    {
        items.iter().filter(|i| self.matches(i)).cloned().collect()
    }
}

fn contains_ignore_case(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

fn normalized(search: &Option<String>) -> Option<String> {
    search
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
}

fn within(at: DateTime<Utc>, from: Option<DateTime<Utc>>, to: Option<DateTime<Utc>>) -> bool {
    from.map_or(true, |f| at >= f) && to.map_or(true, |t| at <= t)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductFilter {
    /// Case-insensitive match on name, SKU or category
    pub search: Option<String>,
    pub category: Option<String>,
    pub active_only: Option<bool>,
}

impl Filter<Product> for ProductFilter {
    fn matches(&self, p: &Product) -> bool {
        if let Some(q) = normalized(&self.search) {
            if !(contains_ignore_case(&p.name, &q)
                || contains_ignore_case(&p.sku, &q)
                || contains_ignore_case(&p.category, &q))
            {
                return false;
            }
        }
        if let Some(category) = self.category.as_deref().filter(|c| !c.is_empty()) {
            if p.category != category {
                return false;
            }
        }
        !(self.active_only.unwrap_or(false) && !p.active)
    }
}

/// Distinct categories in first-seen order
pub fn categories(products: &[Product]) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for p in products {
        if !seen.iter().any(|c| c == &p.category) {
            seen.push(p.category.clone());
        }
    }
    seen
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StockFilter {
    pub product_id: Option<Uuid>,
    pub warehouse_id: Option<Uuid>,
    /// Case-insensitive match on product name, SKU or warehouse name
    pub search: Option<String>,
    /// Only rows with quantity strictly below this value
    pub below: Option<i32>,
}

impl Filter<Stock> for StockFilter {
    fn matches(&self, s: &Stock) -> bool {
        if self.product_id.is_some_and(|id| id != s.product_id) {
            return false;
        }
        if self.warehouse_id.is_some_and(|id| id != s.warehouse_id) {
            return false;
        }
        if self.below.is_some_and(|limit| s.quantity >= limit) {
            return false;
        }
        match normalized(&self.search) {
            Some(q) => {
                contains_ignore_case(&s.product_name, &q)
                    || contains_ignore_case(&s.product_sku, &q)
                    || contains_ignore_case(&s.warehouse_name, &q)
            }
            None => true,
        }
    }
}

/// Ledger query. Used both as the `GET /ledger` query string and client side.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerFilter {
    pub product_id: Option<Uuid>,
    pub warehouse_id: Option<Uuid>,
    pub change_type: Option<ChangeType>,
    pub user_id: Option<Uuid>,
    pub reference_id: Option<Uuid>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl LedgerFilter {
    pub fn has_valid_range(&self) -> bool {
        match (self.from, self.to) {
            (Some(from), Some(to)) => from <= to,
            _ => true,
        }
    }
}

impl Filter<StockLedgerEntry> for LedgerFilter {
    fn matches(&self, e: &StockLedgerEntry) -> bool {
        self.product_id.map_or(true, |id| id == e.product_id)
            && self.warehouse_id.map_or(true, |id| id == e.warehouse_id)
            && self.change_type.map_or(true, |ct| ct == e.change_type)
            && self.user_id.map_or(true, |id| id == e.user_id)
            && self.reference_id.map_or(true, |id| Some(id) == e.reference_id)
            && within(e.created_at, self.from, self.to)
    }
}

/// Entries recorded within the last `days` days before `now`.
/// A window reaching past the representable range has no lower bound.
pub fn entries_in_last_days(
    entries: &[StockLedgerEntry],
    now: DateTime<Utc>,
    days: i64,
) -> Vec<StockLedgerEntry> {
    let filter = LedgerFilter {
        from: Duration::try_days(days.max(0)).and_then(|window| now.checked_sub_signed(window)),
        to: Some(now),
        ..Default::default()
    };
    filter.apply(entries)
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentFilter {
    pub status: Option<DocumentStatus>,
    pub warehouse_id: Option<Uuid>,
    /// Case-insensitive match on document number or counterparty
    pub search: Option<String>,
    pub from: Option<DateTime<Utc>>,
    pub to: Option<DateTime<Utc>>,
}

impl<D: StockDocument> Filter<D> for DocumentFilter {
    fn matches(&self, d: &D) -> bool {
        if self.status.is_some_and(|s| s != d.status()) {
            return false;
        }
        if self.warehouse_id.is_some_and(|id| id != d.warehouse_id()) {
            return false;
        }
        if !within(d.document_date(), self.from, self.to) {
            return false;
        }
        match normalized(&self.search) {
            Some(q) => {
                contains_ignore_case(d.number(), &q) || contains_ignore_case(d.counterparty(), &q)
            }
            None => true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn product(name: &str, sku: &str, category: &str, active: bool) -> Product {
        let now = Utc::now();
        Product {
            id: Uuid::new_v4(),
            name: name.into(),
            sku: sku.into(),
            category: category.into(),
            unit: "pcs".into(),
            reorder_level: 5,
            initial_stock: 0,
            active,
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_product_search_covers_name_sku_category() {
        let products = vec![
            product("Steel Bolt", "BLT-001", "Hardware", true),
            product("Desk Lamp", "LMP-010", "Lighting", true),
            product("Copper Wire", "WIR-7", "Electrical", false),
        ];

        let by_sku = ProductFilter { search: Some("lmp".into()), ..Default::default() };
        assert_eq!(by_sku.apply(&products).len(), 1);

        let by_category = ProductFilter { search: Some("ELECTR".into()), ..Default::default() };
        assert_eq!(by_category.apply(&products)[0].name, "Copper Wire");

        let active = ProductFilter { active_only: Some(true), ..Default::default() };
        assert_eq!(active.apply(&products).len(), 2);
    }

    #[test]
    fn test_blank_search_matches_everything() {
        let products = vec![product("A", "A-1", "X", true)];
        let filter = ProductFilter { search: Some("   ".into()), ..Default::default() };
        assert_eq!(filter.apply(&products).len(), 1);
    }

    #[test]
    fn test_categories_are_distinct_in_order() {
        let products = vec![
            product("A", "A-1", "Tools", true),
            product("B", "B-1", "Paint", true),
            product("C", "C-1", "Tools", true),
        ];
        assert_eq!(categories(&products), vec!["Tools", "Paint"]);
    }

    #[test]
    fn test_date_window_is_inclusive() {
        let at = Utc.with_ymd_and_hms(2024, 3, 1, 12, 0, 0).unwrap();
        assert!(within(at, Some(at), Some(at)));
        assert!(!within(at, Some(at + Duration::seconds(1)), None));
    }
}
