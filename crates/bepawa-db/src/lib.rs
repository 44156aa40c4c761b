//! # bepawa-db: Database Layer for the BEPAWA Marketplace
//!
//! Database access for the marketplace backend: SQLite through sqlx.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        BEPAWA Data Flow                                 │
//! │                                                                         │
//! │  HTTP handler (GET /products)                                           │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                     bepawa-db (THIS CRATE)                      │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌────────────────┐   ┌──────────────┐   │   │
//! │  │   │   Database    │    │  Repositories  │   │  Migrations  │   │   │
//! │  │   │   (pool.rs)   │◄───│  product order │   │  (embedded)  │   │   │
//! │  │   │  SqlitePool   │    │  notification  │   │ 001_initial  │   │   │
//! │  │   │               │    │  profile sale  │   │              │   │   │
//! │  │   └───────────────┘    └───────┬────────┘   └──────────────┘   │   │
//! │  │                                │                                │   │
//! │  │              Predicate (bepawa-core) ──► push_predicate ──► SQL │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  SQLite database (./data/bepawa.db)                                     │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bepawa_core::visibility::ProductVisibility;
//! use bepawa_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("./data/bepawa.db")).await?;
//! let products = db
//!     .products()
//!     .list_visible(&caller, ProductVisibility::Marketplace)
//!     .await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::appointment::AppointmentRepository;
pub use repository::audit::AuditRepository;
pub use repository::notification::NotificationRepository;
pub use repository::order::OrderRepository;
pub use repository::procurement::ProcurementRepository;
pub use repository::product::{ProductList, ProductRepository};
pub use repository::profile::ProfileRepository;
pub use repository::sale::SaleRepository;
