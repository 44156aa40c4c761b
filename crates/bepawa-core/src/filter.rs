//! # Product Filter Pipeline
//!
//! Narrows and orders an already-fetched product list by what the user typed
//! into the catalog filter bar.
//!
//! ## Pipeline
//! ```text
//! query string ──► RawProductFilters ──► ProductFilters::from(raw)
//!                  (all Option<String>)   (total: bad input = no constraint)
//!                                                │
//! &[Product] ────────────────────────────────────┤
//!                                                ▼
//!                                  apply() ← THIS MODULE
//!                                                │
//!                  search → category → price → stock bucket → stable sort
//!                                                │
//!                                                ▼
//!                                          Vec<Product>
//! ```
//!
//! Stock buckets use fixed thresholds (see [`crate::LOW_STOCK_THRESHOLD`]),
//! not each product's own `min_stock`.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use crate::types::Product;
use crate::validation::validate_search_query;
use crate::LOW_STOCK_THRESHOLD;

// =============================================================================
// Filter Inputs
// =============================================================================

/// Filters as they arrive from the query string, unparsed.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RawProductFilters {
    pub search: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
    pub stock: Option<String>,
    pub sort: Option<String>,
}

/// Stock-level bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StockBucket {
    /// `stock > 10`
    InStock,
    /// `1 <= stock <= 10`
    LowStock,
    /// `stock == 0`
    OutOfStock,
}

impl StockBucket {
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "in-stock" => Some(StockBucket::InStock),
            "low-stock" => Some(StockBucket::LowStock),
            "out-of-stock" => Some(StockBucket::OutOfStock),
            _ => None,
        }
    }

    pub fn contains(&self, stock: i64) -> bool {
        match self {
            StockBucket::InStock => stock > LOW_STOCK_THRESHOLD,
            StockBucket::LowStock => (1..=LOW_STOCK_THRESHOLD).contains(&stock),
            StockBucket::OutOfStock => stock == 0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortField {
    Name,
    Price,
    Stock,
}

/// Sort key: `name`, `price`, `stock`, optionally suffixed with `-desc`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub field: SortField,
    pub descending: bool,
}

impl SortKey {
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        let (field, descending) = match s.strip_suffix("-desc") {
            Some(field) => (field, true),
            None => (s.strip_suffix("-asc").unwrap_or(s), false),
        };
        let field = match field {
            "name" => SortField::Name,
            "price" => SortField::Price,
            "stock" => SortField::Stock,
            _ => return None,
        };
        Some(SortKey { field, descending })
    }

    fn compare(&self, a: &Product, b: &Product) -> Ordering {
        let ordering = match self.field {
            SortField::Name => a.name.to_lowercase().cmp(&b.name.to_lowercase()),
            SortField::Price => a.price.cmp(&b.price),
            SortField::Stock => a.stock.cmp(&b.stock),
        };
        if self.descending {
            ordering.reverse()
        } else {
            ordering
        }
    }
}

/// Parsed filters. `None` means no constraint.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductFilters {
    /// Lower-cased search term. Terms over `MAX_SEARCH_LENGTH` are dropped.
    pub search: Option<String>,
    pub category: Option<String>,
    pub min_price: Option<i64>,
    pub max_price: Option<i64>,
    pub stock: Option<StockBucket>,
    pub sort: Option<SortKey>,
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

fn parse_price(value: Option<String>) -> Option<i64> {
    let value = non_empty(value)?;
    value
        .parse::<i64>()
        .ok()
        .or_else(|| value.parse::<f64>().ok().filter(|f| f.is_finite()).map(|f| f.round() as i64))
}

impl From<RawProductFilters> for ProductFilters {
    fn from(raw: RawProductFilters) -> Self {
        ProductFilters {
            search: non_empty(raw.search)
                .and_then(|s| validate_search_query(&s).ok())
                .map(|s| s.to_lowercase()),
            category: non_empty(raw.category).filter(|c| !c.eq_ignore_ascii_case("all")),
            min_price: parse_price(raw.min_price),
            max_price: parse_price(raw.max_price),
            stock: non_empty(raw.stock).and_then(|s| StockBucket::parse(&s)),
            sort: non_empty(raw.sort).and_then(|s| SortKey::parse(&s)),
        }
    }
}

impl ProductFilters {
    /// Whether a single product passes every constraint.
    pub fn admits(&self, product: &Product) -> bool {
        if let Some(term) = &self.search {
            let hit = [&product.name, &product.description, &product.manufacturer]
                .iter()
                .any(|field| field.to_lowercase().contains(term.as_str()));
            if !hit {
                return false;
            }
        }

        if let Some(category) = &self.category {
            if product.category != *category {
                return false;
            }
        }

        if self.min_price.is_some_and(|lo| product.price < lo) {
            return false;
        }
        if self.max_price.is_some_and(|hi| product.price > hi) {
            return false;
        }

        self.stock.map_or(true, |bucket| bucket.contains(product.stock))
    }

    /// Applies the filters and sort, returning a new list.
    ///
    /// The input is left untouched; equal sort keys keep their input order.
    pub fn apply(&self, products: &[Product]) -> Vec<Product> {
        let mut out: Vec<Product> = products.iter().filter(|p| self.admits(p)).cloned().collect();
        if let Some(key) = self.sort {
            out.sort_by(|a, b| key.compare(a, b));
        }
        out
    }
}
