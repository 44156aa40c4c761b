//! # Row Mapping
//!
//! Raw persisted rows and the one shared mapper per entity that turns them
//! into the shapes the frontend consumes.
//!
//! ## Contract
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Row (nullable columns, JSON as text)                                   │
//! │       │                                                                 │
//! │       ▼  into_*() ← total: never panics, never errors                   │
//! │                                                                         │
//! │  View (every field populated)                                           │
//! │    sell_price      → price                                              │
//! │    supplier        → manufacturer                                       │
//! │    NULL image      → PLACEHOLDER_IMAGE_URL                              │
//! │    NULL text/num   → "" / 0 / false                                     │
//! │    bad JSON        → [] / null                                          │
//! │    unknown enum    → safe default                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::cart::Cart;
use crate::types::{
    Appointment, AppointmentStatus, AuditCategory, AuditLog, Notification, NotificationType,
    Order, OrderItem, OrderStatus, Product, ProductStatus, Role,
};
use crate::{DEFAULT_MIN_STOCK, PLACEHOLDER_IMAGE_URL};

// =============================================================================
// Product
// =============================================================================

/// A `products` row as persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct ProductRow {
    pub id: String,
    pub user_id: Option<String>,
    pub wholesaler_id: Option<String>,
    pub pharmacy_id: Option<String>,
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub supplier: Option<String>,
    pub sku: Option<String>,
    pub sell_price: Option<i64>,
    pub buy_price: Option<i64>,
    pub stock: Option<i64>,
    pub min_stock: Option<i64>,
    pub max_stock: Option<i64>,
    pub expiry_date: Option<NaiveDate>,
    pub image_url: Option<String>,
    pub is_public_product: Option<bool>,
    pub is_retail_product: Option<bool>,
    pub is_wholesale_product: Option<bool>,
    pub created_at: Option<DateTime<Utc>>,
}

impl ProductRow {
    /// Maps the row to a [`Product`], deriving status as of `today`.
    pub fn into_product(self, today: NaiveDate) -> Product {
        let stock = self.stock.unwrap_or(0);
        let min_stock = self.min_stock.unwrap_or(DEFAULT_MIN_STOCK);
        let status = ProductStatus::derive(stock, min_stock, self.expiry_date, today);

        Product {
            id: self.id,
            owner_id: self.user_id.unwrap_or_default(),
            wholesaler_id: self.wholesaler_id,
            pharmacy_id: self.pharmacy_id,
            name: self.name.unwrap_or_default(),
            description: self.description.unwrap_or_default(),
            category: self.category.unwrap_or_default(),
            manufacturer: self.supplier.unwrap_or_default(),
            sku: self.sku.unwrap_or_default(),
            price: self.sell_price.unwrap_or(0),
            buy_price: self.buy_price.unwrap_or(0),
            stock,
            min_stock,
            max_stock: self.max_stock.unwrap_or(0),
            expiry_date: self.expiry_date,
            image_url: self
                .image_url
                .filter(|url| !url.trim().is_empty())
                .unwrap_or_else(|| PLACEHOLDER_IMAGE_URL.to_string()),
            status,
            is_public_product: self.is_public_product.unwrap_or(false),
            is_retail_product: self.is_retail_product.unwrap_or(false),
            is_wholesale_product: self.is_wholesale_product.unwrap_or(false),
            created_at: self.created_at,
        }
    }
}

/// Maps a batch of product rows.
pub fn map_products(rows: Vec<ProductRow>, today: NaiveDate) -> Vec<Product> {
    rows.into_iter().map(|row| row.into_product(today)).collect()
}

// =============================================================================
// Order
// =============================================================================

/// An `orders` row as persisted. `items` is JSON text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct OrderRow {
    pub id: String,
    pub user_id: String,
    pub pharmacy_id: Option<String>,
    pub wholesaler_id: Option<String>,
    pub status: Option<String>,
    pub items: Option<String>,
    pub total_amount: Option<i64>,
    pub delivery_address: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}

/// Parses an order's `items` column. Malformed JSON yields no items.
pub fn parse_order_items(raw: Option<&str>) -> Vec<OrderItem> {
    raw.and_then(|text| serde_json::from_str(text).ok())
        .unwrap_or_default()
}

impl OrderRow {
    pub fn into_order(self) -> Order {
        let items = parse_order_items(self.items.as_deref());
        let total_amount = self
            .total_amount
            .unwrap_or_else(|| Cart::total_of(&items).minor());
        let status = self
            .status
            .as_deref()
            .and_then(|s| s.parse().ok())
            .unwrap_or(OrderStatus::Pending);

        Order {
            id: self.id,
            user_id: self.user_id,
            pharmacy_id: self.pharmacy_id,
            wholesaler_id: self.wholesaler_id,
            status,
            items,
            total_amount,
            delivery_address: self.delivery_address,
            created_at: self.created_at,
            updated_at: self.updated_at,
        }
    }
}

// =============================================================================
// Notification
// =============================================================================

/// A `notifications` row as persisted. `metadata` is JSON text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct NotificationRow {
    pub id: String,
    pub user_id: String,
    #[cfg_attr(feature = "sqlx", sqlx(rename = "type"))]
    pub notification_type: Option<String>,
    pub title: Option<String>,
    pub message: Option<String>,
    pub is_read: Option<bool>,
    pub metadata: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

fn parse_json(raw: Option<&str>) -> Option<serde_json::Value> {
    raw.and_then(|text| serde_json::from_str(text).ok())
}

impl NotificationRow {
    pub fn into_notification(self) -> Notification {
        Notification {
            id: self.id,
            user_id: self.user_id,
            notification_type: self
                .notification_type
                .as_deref()
                .and_then(|t| t.parse().ok())
                .unwrap_or(NotificationType::System),
            title: self.title.unwrap_or_default(),
            message: self.message.unwrap_or_default(),
            is_read: self.is_read.unwrap_or(false),
            metadata: parse_json(self.metadata.as_deref()).unwrap_or(serde_json::Value::Null),
            created_at: self.created_at,
        }
    }
}

// =============================================================================
// Appointment
// =============================================================================

/// An `appointments` row as persisted. `results` is JSON text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct AppointmentRow {
    pub id: String,
    pub provider_id: String,
    pub provider_type: Option<String>,
    pub user_id: String,
    pub appointment_date: NaiveDate,
    pub appointment_time: Option<String>,
    pub service: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
    pub results: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl AppointmentRow {
    pub fn into_appointment(self) -> Appointment {
        Appointment {
            id: self.id,
            provider_id: self.provider_id,
            provider_type: self
                .provider_type
                .as_deref()
                .and_then(Role::parse)
                .unwrap_or(Role::Lab),
            user_id: self.user_id,
            appointment_date: self.appointment_date,
            appointment_time: self.appointment_time.unwrap_or_default(),
            service: self.service.unwrap_or_default(),
            status: self
                .status
                .as_deref()
                .and_then(|s| s.parse().ok())
                .unwrap_or(AppointmentStatus::Scheduled),
            notes: self.notes,
            results: parse_json(self.results.as_deref()),
            created_at: self.created_at,
        }
    }
}

// =============================================================================
// Audit Log
// =============================================================================

/// An `audit_logs` row as persisted.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct AuditLogRow {
    pub id: String,
    pub user_id: String,
    pub action: String,
    pub resource_type: String,
    pub resource_id: String,
    pub old_values: Option<String>,
    pub new_values: Option<String>,
    pub category: Option<String>,
    pub created_at: Option<DateTime<Utc>>,
}

impl AuditLogRow {
    pub fn into_audit_log(self) -> AuditLog {
        AuditLog {
            id: self.id,
            user_id: self.user_id,
            action: self.action,
            resource_type: self.resource_type,
            resource_id: self.resource_id,
            old_values: parse_json(self.old_values.as_deref()),
            new_values: parse_json(self.new_values.as_deref()),
            category: self
                .category
                .as_deref()
                .and_then(|c| c.parse().ok())
                .unwrap_or(AuditCategory::DataChange),
            created_at: self.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2026, 10, 19).unwrap()
    }

    #[test]
    fn test_product_row_with_all_nulls_maps_to_defaults() {
        let row = ProductRow {
            id: "p1".to_string(),
            ..Default::default()
        };
        let product = row.into_product(today());

        assert_eq!(product.id, "p1");
        assert_eq!(product.name, "");
        assert_eq!(product.manufacturer, "");
        assert_eq!(product.price, 0);
        assert_eq!(product.stock, 0);
        assert_eq!(product.min_stock, DEFAULT_MIN_STOCK);
        assert_eq!(product.image_url, PLACEHOLDER_IMAGE_URL);
        assert_eq!(product.status, ProductStatus::OutOfStock);
        assert!(!product.is_public_product);
    }

    #[test]
    fn test_product_row_renames_columns() {
        let row = ProductRow {
            id: "p2".to_string(),
            user_id: Some("w1".to_string()),
            name: Some("Amoxicillin 250mg".to_string()),
            supplier: Some("Shelys".to_string()),
            sell_price: Some(4000),
            stock: Some(3),
            min_stock: Some(5),
            image_url: Some("   ".to_string()),
            ..Default::default()
        };
        let product = row.into_product(today());

        assert_eq!(product.owner_id, "w1");
        assert_eq!(product.manufacturer, "Shelys");
        assert_eq!(product.price, 4000);
        assert_eq!(product.status, ProductStatus::LowStock);
        assert_eq!(product.image_url, PLACEHOLDER_IMAGE_URL);
    }

    #[test]
    fn test_expired_product_status() {
        let row = ProductRow {
            id: "p3".to_string(),
            stock: Some(100),
            expiry_date: NaiveDate::from_ymd_opt(2025, 1, 1),
            ..Default::default()
        };
        assert_eq!(row.into_product(today()).status, ProductStatus::Expired);
    }

    #[test]
    fn test_order_row_with_bad_json() {
        let row = OrderRow {
            id: "o1".to_string(),
            user_id: "u1".to_string(),
            status: Some("mystery".to_string()),
            items: Some("{not json".to_string()),
            ..Default::default()
        };
        let order = row.into_order();
        assert!(order.items.is_empty());
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total_amount, 0);
    }

    #[test]
    fn test_order_row_parses_items() {
        let row = OrderRow {
            id: "o2".to_string(),
            user_id: "u1".to_string(),
            status: Some("cart".to_string()),
            items: Some(
                r#"[{"product_id":"a","name":"Panadol","price":1000,"quantity":2}]"#.to_string(),
            ),
            ..Default::default()
        };
        let order = row.into_order();
        assert_eq!(order.status, OrderStatus::Cart);
        assert_eq!(order.items.len(), 1);
        assert_eq!(order.total_amount, 2000);
    }

    #[test]
    fn test_order_row_with_huge_lines_saturates() {
        let row = OrderRow {
            id: "o3".to_string(),
            user_id: "u1".to_string(),
            items: Some(format!(
                r#"[{{"product_id":"a","name":"A","price":{},"quantity":2}},{{"product_id":"b","name":"B","price":5,"quantity":1}}]"#,
                i64::MAX
            )),
            ..Default::default()
        };
        let order = row.into_order();
        assert_eq!(order.items.len(), 2);
        assert_eq!(order.total_amount, i64::MAX);
    }

    #[test]
    fn test_notification_row_defaults() {
        let row = NotificationRow {
            id: "n1".to_string(),
            user_id: "u1".to_string(),
            notification_type: Some("carrier_pigeon".to_string()),
            metadata: Some("not json".to_string()),
            ..Default::default()
        };
        let n = row.into_notification();
        assert_eq!(n.notification_type, NotificationType::System);
        assert_eq!(n.metadata, serde_json::Value::Null);
        assert!(!n.is_read);
    }

    #[test]
    fn test_appointment_row_parses_results() {
        let row = AppointmentRow {
            id: "a1".to_string(),
            provider_id: "lab-1".to_string(),
            user_id: "u1".to_string(),
            appointment_date: today(),
            status: Some("completed".to_string()),
            results: Some(r#"{"hb": 13.5}"#.to_string()),
            ..Default::default()
        };
        let appt = row.into_appointment();
        assert_eq!(appt.status, AppointmentStatus::Completed);
        assert_eq!(appt.provider_type, Role::Lab);
        assert_eq!(appt.results.unwrap()["hb"], 13.5);
    }
}
