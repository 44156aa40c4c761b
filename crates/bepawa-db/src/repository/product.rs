//! # Product Repository
//!
//! The shared `products` table: every seller's listings live here and the
//! caller's role decides which rows come back.
//!
//! ## Listing Flow
//! ```text
//! list_visible(caller, policy)
//!      │
//!      ▼
//! visible_products_predicate(role, id, policy)
//!      │
//!      ├── Nothing ──► ProductList::empty()  (no query)
//!      │
//!      ▼
//! SELECT ... FROM products WHERE <predicate> ORDER BY name
//!      │
//!      ├── Err(TableMissing) ──► propagate ("contact support")
//!      ├── Err(other) ─────────► log, ProductList { [], error: Some(msg) }
//!      │
//!      ▼
//! ProductRow::into_product(today) per row
//! ```
//!
//! ## Status Column
//! `status` is rewritten from stock/min_stock/expiry on every write through
//! [`ProductStatus::derive`]; nothing else sets it.

use bepawa_core::mapping::{map_products, ProductRow};
use bepawa_core::validation::{validate_new_product, validate_price, validate_stock_levels};
use bepawa_core::visibility::{visible_products_predicate, ProductVisibility};
use bepawa_core::{Caller, CoreError, NewProduct, Product, ProductStatus, ProductUpdate, Role};
use chrono::Utc;
use serde::Serialize;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::{debug, error, info};

use super::{new_id, push_predicate, today};
use crate::error::{DbError, DbResult};

const PRODUCT_COLUMNS: &str = "id, user_id, wholesaler_id, pharmacy_id, name, description, \
     category, supplier, sku, sell_price, buy_price, stock, min_stock, max_stock, expiry_date, \
     image_url, is_public_product, is_retail_product, is_wholesale_product, created_at";

/// A product listing plus the error the frontend should toast, if any.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ProductList {
    pub products: Vec<Product>,
    pub error: Option<String>,
}

impl ProductList {
    pub fn empty() -> Self {
        ProductList::default()
    }
}

/// Repository for product database operations.
///
/// ## Usage
/// ```rust,ignore
/// let repo = db.products();
///
/// let listing = repo.list_visible(&caller, ProductVisibility::Marketplace).await?;
/// let product = repo.create(&caller, new_product).await?;
/// repo.adjust_stock(&caller, &product.id, -3).await?;
/// ```
#[derive(Debug, Clone)]
pub struct ProductRepository {
    pool: SqlitePool,
}

impl ProductRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProductRepository { pool }
    }

    // =========================================================================
    // Reads
    // =========================================================================

    /// Lists the products the caller may see.
    ///
    /// Store errors are logged and returned as an empty listing with an
    /// error message. A missing table is returned as an error.
    pub async fn list_visible(
        &self,
        caller: &Caller,
        policy: ProductVisibility,
    ) -> DbResult<ProductList> {
        match self.visible(caller, policy).await {
            Ok(products) => Ok(ProductList {
                products,
                error: None,
            }),
            Err(err) if err.is_table_missing() => Err(err),
            Err(err) => {
                error!(caller = %caller.id, error = %err, "Failed to load products");
                Ok(ProductList {
                    products: Vec::new(),
                    error: Some("Failed to load products".to_string()),
                })
            }
        }
    }

    /// Fetches the products the caller may see, propagating errors.
    pub async fn visible(&self, caller: &Caller, policy: ProductVisibility) -> DbResult<Vec<Product>> {
        let predicate = visible_products_predicate(caller.role, &caller.id, policy);
        if predicate.is_nothing() {
            debug!(caller = %caller.id, role = caller.role_name(), "Role sees no products");
            return Ok(Vec::new());
        }

        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE "));
        push_predicate(&mut builder, &predicate);
        builder.push(" ORDER BY name COLLATE NOCASE, id");

        let rows: Vec<ProductRow> = builder.build_query_as().fetch_all(&self.pool).await?;
        debug!(count = rows.len(), role = caller.role_name(), "Loaded visible products");

        Ok(map_products(rows, today()))
    }

    /// Gets a product by ID, regardless of visibility.
    pub async fn get(&self, id: &str) -> DbResult<Product> {
        let mut conn = self.pool.acquire().await?;
        fetch_product(&mut conn, id).await
    }

    /// Gets a product by ID if the caller may see it.
    pub async fn get_visible(
        &self,
        caller: &Caller,
        id: &str,
        policy: ProductVisibility,
    ) -> DbResult<Product> {
        let product = self.get(id).await?;
        let predicate = visible_products_predicate(caller.role, &caller.id, policy);
        if predicate.matches(&product) {
            Ok(product)
        } else {
            Err(DbError::not_found("Product", id))
        }
    }

    /// Lists an owner's products at or below their own reorder level.
    pub async fn low_stock(&self, owner_id: &str) -> DbResult<Vec<Product>> {
        let sql = format!(
            "SELECT {PRODUCT_COLUMNS} FROM products \
             WHERE user_id = ? AND stock <= COALESCE(min_stock, ?) \
             ORDER BY stock, name"
        );
        let rows: Vec<ProductRow> = sqlx::query_as(&sql)
            .bind(owner_id)
            .bind(bepawa_core::DEFAULT_MIN_STOCK)
            .fetch_all(&self.pool)
            .await?;
        Ok(map_products(rows, today()))
    }

    /// Lists every product owned by `owner_id`.
    pub async fn list_for_owner(&self, owner_id: &str) -> DbResult<Vec<Product>> {
        let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE user_id = ? ORDER BY name");
        let rows: Vec<ProductRow> = sqlx::query_as(&sql)
            .bind(owner_id)
            .fetch_all(&self.pool)
            .await?;
        Ok(map_products(rows, today()))
    }

    // =========================================================================
    // Writes
    // =========================================================================

    /// Creates a listing owned by the caller.
    ///
    /// Retail listings record the caller as `pharmacy_id`, wholesale listings
    /// as `wholesaler_id`.
    pub async fn create(&self, caller: &Caller, new: NewProduct) -> DbResult<Product> {
        caller.require_role(&[Role::Retail, Role::Wholesale, Role::Admin], "create products")?;
        validate_new_product(&new).map_err(CoreError::from)?;

        let id = new_id();
        let (pharmacy_id, wholesaler_id) = match caller.role {
            Some(Role::Retail) => (Some(caller.id.clone()), new.wholesaler_id.clone()),
            Some(Role::Wholesale) => (None, Some(caller.id.clone())),
            _ => (None, new.wholesaler_id.clone()),
        };
        let min_stock = new.min_stock.unwrap_or(bepawa_core::DEFAULT_MIN_STOCK);
        let status = ProductStatus::derive(new.stock, min_stock, new.expiry_date, today());
        let now = Utc::now();

        debug!(id = %id, owner = %caller.id, name = %new.name, "Inserting product");

        sqlx::query(
            r#"
            INSERT INTO products (
                id, user_id, wholesaler_id, pharmacy_id, name, description, category,
                supplier, sku, sell_price, buy_price, stock, min_stock, max_stock,
                expiry_date, image_url, status,
                is_public_product, is_retail_product, is_wholesale_product,
                created_at, updated_at
            ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
            "#,
        )
        .bind(&id)
        .bind(&caller.id)
        .bind(wholesaler_id)
        .bind(pharmacy_id)
        .bind(new.name.trim())
        .bind(new.description)
        .bind(new.category)
        .bind(new.manufacturer)
        .bind(new.sku)
        .bind(new.price)
        .bind(new.buy_price)
        .bind(new.stock)
        .bind(min_stock)
        .bind(new.max_stock)
        .bind(new.expiry_date)
        .bind(new.image_url)
        .bind(status.as_str())
        .bind(new.is_public_product)
        .bind(new.is_retail_product)
        .bind(new.is_wholesale_product)
        .bind(now)
        .bind(now)
        .execute(&self.pool)
        .await?;

        info!(id = %id, owner = %caller.id, "Product created");
        self.get(&id).await
    }

    /// Applies a partial update. Only the owner or an admin may edit.
    pub async fn update(&self, caller: &Caller, id: &str, update: ProductUpdate) -> DbResult<Product> {
        let mut tx = self.pool.begin().await?;
        let current = fetch_product(&mut tx, id).await?;
        ensure_owner(caller, &current, "edit this product")?;

        let price = update.price.unwrap_or(current.price);
        let buy_price = update.buy_price.unwrap_or(current.buy_price);
        let stock = update.stock.unwrap_or(current.stock);
        let min_stock = update.min_stock.unwrap_or(current.min_stock);
        let max_stock = update.max_stock.unwrap_or(current.max_stock);
        validate_price(price).map_err(CoreError::from)?;
        validate_price(buy_price).map_err(CoreError::from)?;
        validate_stock_levels(stock, min_stock, Some(max_stock)).map_err(CoreError::from)?;

        debug!(id = %id, "Updating product");

        sqlx::query(
            r#"
            UPDATE products SET
                name = COALESCE(?, name),
                description = COALESCE(?, description),
                category = COALESCE(?, category),
                supplier = COALESCE(?, supplier),
                sell_price = ?,
                buy_price = ?,
                stock = ?,
                min_stock = ?,
                max_stock = ?,
                expiry_date = COALESCE(?, expiry_date),
                image_url = COALESCE(?, image_url),
                is_public_product = COALESCE(?, is_public_product),
                is_retail_product = COALESCE(?, is_retail_product),
                is_wholesale_product = COALESCE(?, is_wholesale_product),
                updated_at = ?
            WHERE id = ?
            "#,
        )
        .bind(update.name)
        .bind(update.description)
        .bind(update.category)
        .bind(update.manufacturer)
        .bind(price)
        .bind(buy_price)
        .bind(stock)
        .bind(min_stock)
        .bind(max_stock)
        .bind(update.expiry_date)
        .bind(update.image_url)
        .bind(update.is_public_product)
        .bind(update.is_retail_product)
        .bind(update.is_wholesale_product)
        .bind(Utc::now())
        .bind(id)
        .execute(&mut *tx)
        .await?;

        let product = refresh_status(&mut tx, id).await?;
        tx.commit().await?;
        Ok(product)
    }

    /// Adds `delta` to stock (negative to remove). Stock never goes below 0.
    pub async fn adjust_stock(&self, caller: &Caller, id: &str, delta: i64) -> DbResult<Product> {
        let mut tx = self.pool.begin().await?;
        let current = fetch_product(&mut tx, id).await?;
        ensure_owner(caller, &current, "adjust stock")?;

        debug!(id = %id, delta = %delta, "Adjusting stock");

        if !apply_stock_delta(&mut tx, id, delta).await? {
            return Err(CoreError::InsufficientStock {
                product: current.name,
                available: current.stock,
                requested: -delta,
            }
            .into());
        }

        let product = refresh_status(&mut tx, id).await?;
        tx.commit().await?;
        Ok(product)
    }

    /// Deletes a listing. Only the owner or an admin may delete.
    pub async fn delete(&self, caller: &Caller, id: &str) -> DbResult<()> {
        let current = self.get(id).await?;
        ensure_owner(caller, &current, "delete this product")?;

        sqlx::query("DELETE FROM products WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        info!(id = %id, by = %caller.id, "Product deleted");
        Ok(())
    }

    /// Counts all products (diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

// =============================================================================
// Connection-level helpers (shared with order, sale and procurement repos)
// =============================================================================

fn ensure_owner(caller: &Caller, product: &Product, action: &str) -> DbResult<()> {
    if caller.is_admin() || product.owner_id == caller.id {
        Ok(())
    } else {
        Err(CoreError::forbidden(caller.role_name(), action).into())
    }
}

pub(crate) async fn fetch_product(conn: &mut SqliteConnection, id: &str) -> DbResult<Product> {
    let sql = format!("SELECT {PRODUCT_COLUMNS} FROM products WHERE id = ?");
    let row: Option<ProductRow> = sqlx::query_as(&sql).bind(id).fetch_optional(&mut *conn).await?;
    row.map(|r| r.into_product(today()))
        .ok_or_else(|| DbError::not_found("Product", id))
}

/// Adds `delta` to stock unless the result would be negative.
///
/// Returns `false` when the guard rejected the change (or the row is gone).
pub(crate) async fn apply_stock_delta(
    conn: &mut SqliteConnection,
    id: &str,
    delta: i64,
) -> DbResult<bool> {
    let result = sqlx::query(
        "UPDATE products SET stock = stock + ?, updated_at = ? WHERE id = ? AND stock + ? >= 0",
    )
    .bind(delta)
    .bind(Utc::now())
    .bind(id)
    .bind(delta)
    .execute(&mut *conn)
    .await?;
    Ok(result.rows_affected() == 1)
}

/// Re-derives and stores `status` for one product, returning the fresh row.
pub(crate) async fn refresh_status(conn: &mut SqliteConnection, id: &str) -> DbResult<Product> {
    let product = fetch_product(conn, id).await?;
    sqlx::query("UPDATE products SET status = ? WHERE id = ?")
        .bind(product.status.as_str())
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(product)
}

// =============================================================================
// Unit Tests
// =============================================================================
