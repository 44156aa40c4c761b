//! # bepawa-core: Pure Business Logic for the BEPAWA Marketplace
//!
//! This crate holds every rule of the marketplace that can be expressed
//! without touching a database or the network.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                      BEPAWA Backend Architecture                        │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                    Frontend (React)                             │   │
//! │  │   Products ──► Cart ──► Orders ──► Notifications ──► Admin     │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ HTTP + bearer token                    │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                    apps/api (axum)                              │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │               ★ bepawa-core (THIS CRATE) ★                      │   │
//! │  │                                                                 │   │
//! │  │  ┌────────────┐ ┌──────────┐ ┌──────────┐ ┌──────────────────┐ │   │
//! │  │  │ visibility │ │  filter  │ │ mapping  │ │ cart / status    │ │   │
//! │  │  │ Predicate  │ │ search   │ │ Row→View │ │ totals, limits   │ │   │
//! │  │  │ per role   │ │ sort     │ │ defaults │ │ transitions      │ │   │
//! │  │  └────────────┘ └──────────┘ └──────────┘ └──────────────────┘ │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │                 bepawa-db (Database Layer)                      │   │
//! │  │        SQLite queries, migrations, repositories                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Role, Product, Order, Notification, ...)
//! - [`money`] - Money type with integer arithmetic
//! - [`visibility`] - Role-scoped row predicates
//! - [`filter`] - Product search/filter/sort pipeline
//! - [`mapping`] - Raw row → UI shape mappers
//! - [`cart`] - Cart-as-order-row math
//! - [`analytics`] - Dashboard reductions
//! - [`validation`] - Input validation
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use bepawa_core::visibility::{visible_products_predicate, ProductVisibility};
//! use bepawa_core::Role;
//!
//! let predicate = visible_products_predicate(
//!     Some(Role::Wholesale),
//!     "wholesaler-1",
//!     ProductVisibility::Marketplace,
//! );
//! assert!(!predicate.is_nothing());
//! ```

pub mod analytics;
pub mod cart;
pub mod error;
pub mod filter;
pub mod mapping;
pub mod money;
pub mod types;
pub mod validation;
pub mod visibility;

pub use cart::Cart;
pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

/// Maximum distinct lines in a single cart.
pub const MAX_CART_ITEMS: usize = 100;

/// Maximum quantity of a single line in a cart or sale.
pub const MAX_ITEM_QUANTITY: i64 = 999;

/// Highest unit price or unit cost accepted, in minor units (1 billion TZS).
pub const MAX_PRICE: i64 = 100_000_000_000;

/// Maximum quantity of a single purchase-order line.
pub const MAX_PURCHASE_QUANTITY: i64 = 1_000_000;

/// Stock above this counts as "in stock" in the generic filter UI.
///
/// This threshold is independent of each product's own `min_stock`; the
/// derived product status uses `min_stock` instead.
pub const LOW_STOCK_THRESHOLD: i64 = 10;

/// Reorder level applied when a listing doesn't set its own `min_stock`.
pub const DEFAULT_MIN_STOCK: i64 = 10;

/// Image shown for products without an uploaded picture.
pub const PLACEHOLDER_IMAGE_URL: &str = "/placeholder.svg";

/// Default currency for checkout sessions.
pub const DEFAULT_CURRENCY: &str = "TZS";
