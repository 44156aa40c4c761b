//! # Domain Types
//!
//! Core domain types used throughout the BEPAWA backend.
//!
//! ## Type Map
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Profile      │   │    Product      │   │     Order       │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id, owner_id   │   │  id, user_id    │       │
//! │  │  role           │   │  price, stock   │   │  status (cart?) │       │
//! │  │  is_approved    │   │  visibility     │   │  items (JSON)   │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │  Notification   │   │  PurchaseOrder  │   │  Appointment    │       │
//! │  │  Supplier       │   │  + items        │   │  AuditLog       │       │
//! │  │                 │   │                 │   │  Sale + items   │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! Every entity is keyed by a UUID v4 string. Entities whose persisted
//! columns are nullable or JSON-encoded have a raw row type in
//! [`crate::mapping`]; the types here are the shapes the frontend consumes.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::{CoreError, CoreResult};
use crate::money::Money;

// =============================================================================
// Lifecycle (status transitions)
// =============================================================================

/// A status enum with a fixed set of allowed transitions.
pub trait Lifecycle: Copy + PartialEq + fmt::Display {
    /// Entity name used in error messages.
    const ENTITY: &'static str;

    /// Whether moving from `self` to `next` is allowed.
    fn can_transition_to(&self, next: Self) -> bool;

    /// Returns an error unless the transition is allowed.
    fn ensure_transition(&self, next: Self) -> CoreResult<()> {
        if self.can_transition_to(next) {
            Ok(())
        } else {
            Err(CoreError::InvalidStatusTransition {
                entity: Self::ENTITY,
                from: self.to_string(),
                to: next.to_string(),
            })
        }
    }
}

/// Implements `Display` and `FromStr` from an enum's `as_str` table.
macro_rules! string_enum {
    ($ty:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl $ty {
            /// All variants, in declaration order.
            pub const ALL: &'static [$ty] = &[$($ty::$variant),+];

            /// Returns the persisted/wire representation.
            pub const fn as_str(&self) -> &'static str {
                match self {
                    $($ty::$variant => $text),+
                }
            }
        }

        impl fmt::Display for $ty {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $ty {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim() {
                    $($text => Ok($ty::$variant),)+
                    other => Err(CoreError::Validation(
                        crate::error::ValidationError::NotAllowed {
                            field: format!("{} '{}'", stringify!($ty), other),
                            allowed: $ty::ALL.iter().map(|v| v.as_str().to_string()).collect(),
                        },
                    )),
                }
            }
        }
    };
}

// =============================================================================
// Role
// =============================================================================

/// Account role. Determines which rows a caller may see.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum Role {
    /// Member of the public buying from retail pharmacies.
    Individual,
    /// Retail pharmacy: sells to individuals, buys from wholesalers.
    Retail,
    /// Wholesaler: sells to retail pharmacies.
    Wholesale,
    /// Laboratory: runs tests and publishes results.
    Lab,
    /// Platform administrator.
    Admin,
}

string_enum!(Role {
    Individual => "individual",
    Retail => "retail",
    Wholesale => "wholesale",
    Lab => "lab",
    Admin => "admin",
});

impl Role {
    /// Parses a role, returning `None` for anything unrecognised.
    pub fn parse(s: &str) -> Option<Role> {
        s.parse().ok()
    }

    /// Roles that run a business and need admin approval before selling.
    pub const fn requires_approval(&self) -> bool {
        matches!(self, Role::Retail | Role::Wholesale | Role::Lab)
    }
}

/// The authenticated identity a request runs as.
///
/// `role` is `None` when the token carries a role this build doesn't know;
/// such a caller is authenticated but sees nothing role-scoped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Caller {
    pub id: String,
    pub role: Option<Role>,
}

impl Caller {
    pub fn new(id: impl Into<String>, role: Option<Role>) -> Self {
        Caller {
            id: id.into(),
            role,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Some(Role::Admin)
    }

    /// Role name for logs and error messages.
    pub fn role_name(&self) -> &'static str {
        self.role.as_ref().map_or("unknown", Role::as_str)
    }

    /// Returns a Forbidden error unless the caller has one of `roles`.
    pub fn require_role(&self, roles: &[Role], action: &str) -> CoreResult<()> {
        match self.role {
            Some(role) if roles.contains(&role) => Ok(()),
            _ => Err(CoreError::forbidden(self.role_name(), action)),
        }
    }
}

// =============================================================================
// Profile
// =============================================================================

/// An account profile.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Profile {
    pub id: String,
    pub role: Role,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub region: Option<String>,
    /// Registered business name (pharmacies, wholesalers, labs).
    pub business_name: Option<String>,
    /// Pharmacy/lab licence number.
    pub license_number: Option<String>,
    /// Set by an admin. Individuals and admins are approved at signup.
    pub is_approved: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// Signup payload.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewProfile {
    pub role: Role,
    pub full_name: String,
    pub email: String,
    pub phone: Option<String>,
    pub region: Option<String>,
    pub business_name: Option<String>,
    pub license_number: Option<String>,
}

// =============================================================================
// Product
// =============================================================================

/// Derived product status.
///
/// ## Derivation Order
/// ```text
/// expiry_date < today ──► Expired
///        │ no
///        ▼
/// stock <= 0 ───────────► OutOfStock
///        │ no
///        ▼
/// stock <= min_stock ───► LowStock
///        │ no
///        ▼
///     InStock
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "kebab-case"))]
#[serde(rename_all = "kebab-case")]
#[ts(export)]
pub enum ProductStatus {
    InStock,
    LowStock,
    OutOfStock,
    Expired,
}

string_enum!(ProductStatus {
    InStock => "in-stock",
    LowStock => "low-stock",
    OutOfStock => "out-of-stock",
    Expired => "expired",
});

impl ProductStatus {
    /// Derives the status from stock levels and expiry.
    pub fn derive(stock: i64, min_stock: i64, expiry_date: Option<NaiveDate>, today: NaiveDate) -> Self {
        match expiry_date {
            Some(expiry) if expiry < today => ProductStatus::Expired,
            _ if stock <= 0 => ProductStatus::OutOfStock,
            _ if stock <= min_stock => ProductStatus::LowStock,
            _ => ProductStatus::InStock,
        }
    }
}

/// A product as the frontend consumes it.
///
/// Built from a nullable `ProductRow` by [`crate::mapping`]; every field
/// here is populated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Product {
    pub id: String,
    /// The account that created the listing.
    pub owner_id: String,
    pub wholesaler_id: Option<String>,
    pub pharmacy_id: Option<String>,
    pub name: String,
    pub description: String,
    pub category: String,
    /// Persisted as `supplier`.
    pub manufacturer: String,
    pub sku: String,
    /// Selling price in minor units (persisted as `sell_price`).
    pub price: i64,
    pub buy_price: i64,
    pub stock: i64,
    pub min_stock: i64,
    pub max_stock: i64,
    #[ts(as = "Option<String>")]
    pub expiry_date: Option<NaiveDate>,
    pub image_url: String,
    pub status: ProductStatus,
    pub is_public_product: bool,
    pub is_retail_product: bool,
    pub is_wholesale_product: bool,
    #[ts(as = "Option<String>")]
    pub created_at: Option<DateTime<Utc>>,
}

impl Product {
    /// Returns the selling price as Money.
    #[inline]
    pub fn price(&self) -> Money {
        Money::from_minor(self.price)
    }

    /// Value of the stock on hand at selling price.
    pub fn stock_value(&self) -> Money {
        self.price().multiply_quantity(self.stock.max(0))
    }

    /// Checks whether `quantity` units can be sold now.
    pub fn can_sell(&self, quantity: i64) -> bool {
        self.status != ProductStatus::Expired && self.stock >= quantity
    }
}

/// Payload for creating a product listing.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub manufacturer: Option<String>,
    pub sku: Option<String>,
    pub price: i64,
    pub buy_price: Option<i64>,
    pub stock: i64,
    pub min_stock: Option<i64>,
    pub max_stock: Option<i64>,
    #[ts(as = "Option<String>")]
    pub expiry_date: Option<NaiveDate>,
    pub image_url: Option<String>,
    pub is_public_product: bool,
    pub is_retail_product: bool,
    pub is_wholesale_product: bool,
    /// Supplying wholesaler when a pharmacy lists restocked goods.
    pub wholesaler_id: Option<String>,
}

/// Partial product update. `None` leaves a column unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize, TS)]
#[serde(default)]
#[ts(export)]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub manufacturer: Option<String>,
    pub price: Option<i64>,
    pub buy_price: Option<i64>,
    pub stock: Option<i64>,
    pub min_stock: Option<i64>,
    pub max_stock: Option<i64>,
    #[ts(as = "Option<String>")]
    pub expiry_date: Option<NaiveDate>,
    pub image_url: Option<String>,
    pub is_public_product: Option<bool>,
    pub is_retail_product: Option<bool>,
    pub is_wholesale_product: Option<bool>,
}

// =============================================================================
// Order
// =============================================================================

/// Order status, including the `cart` pseudo-status for open carts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum OrderStatus {
    Cart,
    Pending,
    Confirmed,
    Processing,
    Shipped,
    Delivered,
    Cancelled,
}

string_enum!(OrderStatus {
    Cart => "cart",
    Pending => "pending",
    Confirmed => "confirmed",
    Processing => "processing",
    Shipped => "shipped",
    Delivered => "delivered",
    Cancelled => "cancelled",
});

impl Lifecycle for OrderStatus {
    const ENTITY: &'static str = "Order";

    fn can_transition_to(&self, next: Self) -> bool {
        use OrderStatus::*;
        matches!(
            (self, next),
            (Cart, Pending)
                | (Pending, Confirmed)
                | (Confirmed, Processing)
                | (Processing, Shipped)
                | (Shipped, Delivered)
                | (Pending | Confirmed | Processing, Cancelled)
        )
    }
}

impl OrderStatus {
    /// Orders whose revenue counts as earned.
    pub const fn is_fulfilled(&self) -> bool {
        matches!(self, OrderStatus::Delivered)
    }
}

/// A line in an order's `items` JSON array.
///
/// Uses the snapshot pattern: name and price are frozen when the line is
/// added so later catalog edits don't rewrite order history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct OrderItem {
    pub product_id: String,
    pub name: String,
    /// Unit price in minor units at time of adding.
    pub price: i64,
    pub quantity: i64,
    /// Listing owner, used to route the order to its seller.
    #[serde(default)]
    pub seller_id: Option<String>,
    #[serde(default)]
    pub image_url: Option<String>,
}

impl OrderItem {
    /// Unit price × quantity.
    pub fn line_total(&self) -> Money {
        Money::from_minor(self.price).multiply_quantity(self.quantity)
    }
}

/// An order (or an open cart when `status == Cart`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Order {
    pub id: String,
    /// Buyer.
    pub user_id: String,
    /// Selling pharmacy, when the seller is a retail pharmacy.
    pub pharmacy_id: Option<String>,
    /// Selling wholesaler, when the seller is a wholesaler.
    pub wholesaler_id: Option<String>,
    pub status: OrderStatus,
    pub items: Vec<OrderItem>,
    /// Always the sum of item line totals.
    pub total_amount: i64,
    pub delivery_address: Option<String>,
    #[ts(as = "Option<String>")]
    pub created_at: Option<DateTime<Utc>>,
    #[ts(as = "Option<String>")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Order {
    /// Returns the total as Money.
    pub fn total(&self) -> Money {
        Money::from_minor(self.total_amount)
    }
}

// =============================================================================
// Notification
// =============================================================================

/// Kind of notification, used by the frontend to pick an icon and route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum NotificationType {
    OrderPlaced,
    OrderStatus,
    LowStock,
    Approval,
    Appointment,
    LabResult,
    System,
}

string_enum!(NotificationType {
    OrderPlaced => "order_placed",
    OrderStatus => "order_status",
    LowStock => "low_stock",
    Approval => "approval",
    Appointment => "appointment",
    LabResult => "lab_result",
    System => "system",
});

/// A notification delivered to one user.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Notification {
    pub id: String,
    pub user_id: String,
    #[serde(rename = "type")]
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub is_read: bool,
    #[ts(type = "unknown")]
    pub metadata: serde_json::Value,
    #[ts(as = "Option<String>")]
    pub created_at: Option<DateTime<Utc>>,
}

/// A notification to be created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewNotification {
    pub user_id: String,
    pub notification_type: NotificationType,
    pub title: String,
    pub message: String,
    pub metadata: serde_json::Value,
}

impl NewNotification {
    /// Creates a notification without metadata.
    pub fn new(
        user_id: impl Into<String>,
        notification_type: NotificationType,
        title: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        NewNotification {
            user_id: user_id.into(),
            notification_type,
            title: title.into(),
            message: message.into(),
            metadata: serde_json::Value::Null,
        }
    }

    /// Attaches metadata.
    pub fn with_metadata(mut self, metadata: serde_json::Value) -> Self {
        self.metadata = metadata;
        self
    }
}

// =============================================================================
// Procurement
// =============================================================================

/// A supplier a pharmacy or wholesaler buys from.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Supplier {
    pub id: String,
    pub owner_id: String,
    pub name: String,
    pub contact_person: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
    pub is_active: bool,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a supplier.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewSupplier {
    pub name: String,
    pub contact_person: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub address: Option<String>,
}

/// Purchase order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "lowercase")]
#[ts(export)]
pub enum PurchaseOrderStatus {
    Draft,
    Sent,
    Received,
    Cancelled,
}

string_enum!(PurchaseOrderStatus {
    Draft => "draft",
    Sent => "sent",
    Received => "received",
    Cancelled => "cancelled",
});

impl Lifecycle for PurchaseOrderStatus {
    const ENTITY: &'static str = "Purchase order";

    fn can_transition_to(&self, next: Self) -> bool {
        use PurchaseOrderStatus::*;
        matches!(
            (self, next),
            (Draft, Sent) | (Sent, Received) | (Draft | Sent, Cancelled)
        )
    }
}

/// A purchase order header.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PurchaseOrder {
    pub id: String,
    pub owner_id: String,
    pub supplier_id: String,
    pub order_number: String,
    pub status: PurchaseOrderStatus,
    pub total_amount: i64,
    pub notes: Option<String>,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
    #[ts(as = "String")]
    pub updated_at: DateTime<Utc>,
}

/// A purchase order line.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct PurchaseOrderItem {
    pub id: String,
    pub purchase_order_id: String,
    pub product_id: String,
    pub quantity: i64,
    pub unit_cost: i64,
    pub line_total: i64,
}

/// Line of a purchase order to be created.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewPurchaseOrderItem {
    pub product_id: String,
    pub quantity: i64,
    pub unit_cost: i64,
}

impl NewPurchaseOrderItem {
    pub fn line_total(&self) -> Money {
        Money::from_minor(self.unit_cost).multiply_quantity(self.quantity)
    }
}

/// Payload for creating a purchase order.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewPurchaseOrder {
    pub supplier_id: String,
    pub items: Vec<NewPurchaseOrderItem>,
    pub notes: Option<String>,
}

impl NewPurchaseOrder {
    /// Sum of `quantity × unit_cost` over all lines.
    pub fn total(&self) -> Money {
        self.items.iter().map(NewPurchaseOrderItem::line_total).sum()
    }

    /// Like [`total`](Self::total), failing instead of saturating.
    pub fn checked_total(&self) -> CoreResult<Money> {
        let lines = self
            .items
            .iter()
            .map(|i| Money::from_minor(i.unit_cost).checked_multiply_quantity(i.quantity))
            .collect::<CoreResult<Vec<_>>>()?;
        Money::checked_sum(lines)
    }
}

// =============================================================================
// Appointment
// =============================================================================

/// Appointment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum AppointmentStatus {
    Scheduled,
    Confirmed,
    InProgress,
    Completed,
    Cancelled,
    NoShow,
}

string_enum!(AppointmentStatus {
    Scheduled => "scheduled",
    Confirmed => "confirmed",
    InProgress => "in_progress",
    Completed => "completed",
    Cancelled => "cancelled",
    NoShow => "no_show",
});

impl Lifecycle for AppointmentStatus {
    const ENTITY: &'static str = "Appointment";

    fn can_transition_to(&self, next: Self) -> bool {
        use AppointmentStatus::*;
        matches!(
            (self, next),
            (Scheduled, Confirmed)
                | (Confirmed, InProgress)
                | (InProgress, Completed)
                | (Scheduled | Confirmed, Cancelled | NoShow)
        )
    }
}

/// A booking with a lab or pharmacy.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Appointment {
    pub id: String,
    pub provider_id: String,
    pub provider_type: Role,
    /// Patient.
    pub user_id: String,
    #[ts(as = "String")]
    pub appointment_date: NaiveDate,
    /// Free-form slot label, e.g. "09:30".
    pub appointment_time: String,
    pub service: String,
    pub status: AppointmentStatus,
    pub notes: Option<String>,
    /// Structured results published by the provider.
    #[ts(type = "unknown")]
    pub results: Option<serde_json::Value>,
    #[ts(as = "Option<String>")]
    pub created_at: Option<DateTime<Utc>>,
}

/// Booking payload.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewAppointment {
    pub provider_id: String,
    #[ts(as = "String")]
    pub appointment_date: NaiveDate,
    pub appointment_time: String,
    pub service: String,
    pub notes: Option<String>,
}

// =============================================================================
// Audit Log
// =============================================================================

/// Audit entry category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum AuditCategory {
    DataChange,
    Approval,
    Financial,
    Security,
}

string_enum!(AuditCategory {
    DataChange => "data_change",
    Approval => "approval",
    Financial => "financial",
    Security => "security",
});

/// An append-only record of an action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AuditLog {
    pub id: String,
    pub user_id: String,
    pub action: String,
    pub resource_type: String,
    pub resource_id: String,
    #[ts(type = "unknown")]
    pub old_values: Option<serde_json::Value>,
    #[ts(type = "unknown")]
    pub new_values: Option<serde_json::Value>,
    pub category: AuditCategory,
    #[ts(as = "Option<String>")]
    pub created_at: Option<DateTime<Utc>>,
}

/// An audit entry to append.
#[derive(Debug, Clone)]
pub struct NewAuditLog {
    pub user_id: String,
    pub action: String,
    pub resource_type: String,
    pub resource_id: String,
    pub old_values: Option<serde_json::Value>,
    pub new_values: Option<serde_json::Value>,
    pub category: AuditCategory,
}

impl NewAuditLog {
    /// Creates an entry with no before/after values.
    pub fn new(
        user_id: impl Into<String>,
        action: impl Into<String>,
        resource_type: impl Into<String>,
        resource_id: impl Into<String>,
        category: AuditCategory,
    ) -> Self {
        NewAuditLog {
            user_id: user_id.into(),
            action: action.into(),
            resource_type: resource_type.into(),
            resource_id: resource_id.into(),
            old_values: None,
            new_values: None,
            category,
        }
    }

    /// Records the before/after values of a change.
    pub fn with_values(
        mut self,
        old_values: Option<serde_json::Value>,
        new_values: Option<serde_json::Value>,
    ) -> Self {
        self.old_values = old_values;
        self.new_values = new_values;
        self
    }
}

// =============================================================================
// Point of Sale
// =============================================================================

/// How an over-the-counter sale was paid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum PaymentMethod {
    Cash,
    MobileMoney,
    Card,
    Insurance,
}

string_enum!(PaymentMethod {
    Cash => "cash",
    MobileMoney => "mobile_money",
    Card => "card",
    Insurance => "insurance",
});

/// A completed over-the-counter sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct Sale {
    pub id: String,
    pub pharmacy_id: String,
    pub receipt_number: String,
    pub customer_name: Option<String>,
    pub payment_method: PaymentMethod,
    pub total_amount: i64,
    #[ts(as = "String")]
    pub created_at: DateTime<Utc>,
}

/// A sale line, with product name and price frozen at time of sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
#[ts(export)]
pub struct SaleItem {
    pub id: String,
    pub sale_id: String,
    pub product_id: String,
    pub name_snapshot: String,
    pub unit_price: i64,
    pub quantity: i64,
    pub line_total: i64,
}

/// Line of a sale to be recorded.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewSaleItem {
    pub product_id: String,
    pub quantity: i64,
}

/// Payload for recording a sale.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewSale {
    pub items: Vec<NewSaleItem>,
    pub payment_method: PaymentMethod,
    pub customer_name: Option<String>,
}

// =============================================================================
// Unit Tests
// =============================================================================
