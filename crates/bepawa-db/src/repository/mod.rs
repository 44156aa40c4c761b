//! # Repository Module
//!
//! One repository per marketplace entity.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  HTTP handler                                                           │
//! │       │  db.products().list_visible(&caller, policy)                    │
//! │       ▼                                                                 │
//! │  ProductRepository                                                      │
//! │  ├── visible_products_predicate(role, id)   (bepawa-core, pure)         │
//! │  ├── push_predicate(builder, &predicate)    (this module)               │
//! │  └── rows ──► ProductRow::into_product      (bepawa-core, total)        │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`product::ProductRepository`] - catalog CRUD, stock, visibility
//! - [`order::OrderRepository`] - carts, checkout, order status
//! - [`notification::NotificationRepository`] - per-user notifications
//! - [`profile::ProfileRepository`] - signup and approval
//! - [`procurement::ProcurementRepository`] - suppliers and purchase orders
//! - [`appointment::AppointmentRepository`] - bookings and results
//! - [`audit::AuditRepository`] - append-only audit trail
//! - [`sale::SaleRepository`] - point-of-sale records

pub mod appointment;
pub mod audit;
pub mod notification;
pub mod order;
pub mod procurement;
pub mod product;
pub mod profile;
pub mod sale;

use bepawa_core::visibility::{Predicate, Value};
use chrono::{NaiveDate, Utc};
use sqlx::{QueryBuilder, Sqlite};

/// Generates a new UUID v4 string for a primary key.
pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Today's date in UTC, used to derive product status.
pub(crate) fn today() -> NaiveDate {
    Utc::now().date_naive()
}

/// Appends `predicate` to `builder` as a parenthesised SQL condition.
///
/// Column names come from [`Predicate`] constructors in bepawa-core and are
/// pushed verbatim; every value is bound.
///
/// ```text
/// Or[And[Eq(is_public_product, true), Eq(is_wholesale_product, true)],
///    Eq(user_id, "p1")]
///   ──►
/// ((is_public_product = ? AND is_wholesale_product = ?) OR user_id = ?)
/// ```
pub(crate) fn push_predicate(builder: &mut QueryBuilder<'_, Sqlite>, predicate: &Predicate) {
    match predicate {
        Predicate::All => {
            builder.push("1 = 1");
        }
        Predicate::Nothing => {
            builder.push("1 = 0");
        }
        Predicate::Eq(column, value) => {
            builder.push(*column).push(" = ");
            push_value(builder, value);
        }
        Predicate::Ne(column, value) => {
            builder.push(*column).push(" <> ");
            push_value(builder, value);
        }
        Predicate::NotNull(column) => {
            builder.push(*column).push(" IS NOT NULL");
        }
        Predicate::And(parts) => push_joined(builder, parts, " AND ", "1 = 1"),
        Predicate::Or(parts) => push_joined(builder, parts, " OR ", "1 = 0"),
    }
}

fn push_joined(
    builder: &mut QueryBuilder<'_, Sqlite>,
    parts: &[Predicate],
    separator: &str,
    empty: &str,
) {
    if parts.is_empty() {
        builder.push(empty);
        return;
    }
    builder.push("(");
    for (i, part) in parts.iter().enumerate() {
        if i > 0 {
            builder.push(separator);
        }
        push_predicate(builder, part);
    }
    builder.push(")");
}

fn push_value(builder: &mut QueryBuilder<'_, Sqlite>, value: &Value) {
    match value {
        Value::Bool(b) => {
            builder.push_bind(*b);
        }
        Value::Text(s) => {
            builder.push_bind(s.clone());
        }
    }
}
