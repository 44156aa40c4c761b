//! # Dashboard Analytics
//!
//! Reductions over already-fetched orders and products for the dashboard
//! cards. No querying happens here; the db layer fetches the caller's
//! visible rows and hands them over.

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::money::Money;
use crate::types::{Order, OrderStatus, Product, ProductStatus};

/// Products expiring within this many days count as "expiring soon".
pub const EXPIRY_WARNING_DAYS: i64 = 30;

/// Order dashboard card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderSummary {
    pub total_orders: usize,
    /// Count per status name.
    pub by_status: BTreeMap<String, usize>,
    /// Sum of delivered order totals, in minor units.
    pub revenue: i64,
    /// Mean delivered order total, in minor units (0 when none).
    pub average_order_value: i64,
}

/// Inventory dashboard card.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct InventorySummary {
    pub total_products: usize,
    pub total_units: i64,
    /// Stock on hand at selling price, in minor units.
    pub stock_value: i64,
    pub low_stock: usize,
    pub out_of_stock: usize,
    pub expired: usize,
    pub expiring_soon: usize,
}

/// Summarises orders. Open carts are ignored.
pub fn summarize_orders(orders: &[Order]) -> OrderSummary {
    let mut summary = OrderSummary::default();
    let mut delivered = 0usize;
    let mut revenue = Money::zero();

    for order in orders.iter().filter(|o| o.status != OrderStatus::Cart) {
        summary.total_orders += 1;
        *summary
            .by_status
            .entry(order.status.as_str().to_string())
            .or_default() += 1;

        if order.status.is_fulfilled() {
            delivered += 1;
            revenue += order.total();
        }
    }

    summary.revenue = revenue.minor();
    if delivered > 0 {
        summary.average_order_value = revenue.minor() / delivered as i64;
    }
    summary
}

/// Summarises a product list as of `today`.
pub fn summarize_inventory(products: &[Product], today: NaiveDate) -> InventorySummary {
    let warn_until = today + chrono::Duration::days(EXPIRY_WARNING_DAYS);

    products.iter().fold(InventorySummary::default(), |mut acc, p| {
        acc.total_products += 1;
        acc.total_units = acc.total_units.saturating_add(p.stock.max(0));
        acc.stock_value = acc.stock_value.saturating_add(p.stock_value().minor());

        match p.status {
            ProductStatus::LowStock => acc.low_stock += 1,
            ProductStatus::OutOfStock => acc.out_of_stock += 1,
            ProductStatus::Expired => acc.expired += 1,
            ProductStatus::InStock => {}
        }

        if let Some(expiry) = p.expiry_date {
            if expiry >= today && expiry <= warn_until {
                acc.expiring_soon += 1;
            }
        }
        acc
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mapping::ProductRow;

    fn order(status: OrderStatus, total: i64) -> Order {
        Order {
            id: uuid::Uuid::new_v4().to_string(),
            user_id: "u1".to_string(),
            pharmacy_id: None,
            wholesaler_id: None,
            status,
            items: vec![],
            total_amount: total,
            delivery_address: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_order_summary() {
        let orders = vec![
            order(OrderStatus::Delivered, 3000),
            order(OrderStatus::Delivered, 1000),
            order(OrderStatus::Pending, 9999),
            order(OrderStatus::Cart, 5000),
        ];
        let summary = summarize_orders(&orders);

        assert_eq!(summary.total_orders, 3);
        assert_eq!(summary.revenue, 4000);
        assert_eq!(summary.average_order_value, 2000);
        assert_eq!(summary.by_status.get("pending"), Some(&1));
        assert!(!summary.by_status.contains_key("cart"));
    }

    #[test]
    fn test_revenue_saturates() {
        let orders = vec![
            order(OrderStatus::Delivered, i64::MAX),
            order(OrderStatus::Delivered, i64::MAX),
        ];
        let summary = summarize_orders(&orders);
        assert_eq!(summary.revenue, i64::MAX);
        assert_eq!(summary.average_order_value, i64::MAX / 2);
    }

    #[test]
    fn test_empty_order_summary() {
        assert_eq!(summarize_orders(&[]), OrderSummary::default());
    }

    #[test]
    fn test_inventory_summary() {
        let today = NaiveDate::from_ymd_opt(2026, 10, 19).unwrap();
        let row = |id: &str, stock: i64, expiry: Option<NaiveDate>| ProductRow {
            id: id.to_string(),
            sell_price: Some(100),
            stock: Some(stock),
            min_stock: Some(5),
            expiry_date: expiry,
            ..Default::default()
        };
        let products: Vec<Product> = vec![
            row("ok", 50, None),
            row("low", 3, None),
            row("out", 0, None),
            row("expired", 20, NaiveDate::from_ymd_opt(2026, 1, 1)),
            row("soon", 20, NaiveDate::from_ymd_opt(2026, 11, 1)),
        ]
        .into_iter()
        .map(|r| r.into_product(today))
        .collect();

        let summary = summarize_inventory(&products, today);
        assert_eq!(summary.total_products, 5);
        assert_eq!(summary.total_units, 93);
        assert_eq!(summary.stock_value, 9300);
        assert_eq!(summary.low_stock, 1);
        assert_eq!(summary.out_of_stock, 1);
        assert_eq!(summary.expired, 1);
        assert_eq!(summary.expiring_soon, 1);
    }
}
