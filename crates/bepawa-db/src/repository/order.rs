//! # Order Repository
//!
//! Orders and open carts. A cart is the buyer's single `orders` row with
//! `status = 'cart'`; checkout turns it into a `pending` order.
//!
//! ## Checkout (one transaction)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  BEGIN                                                                  │
//! │    1. load cart row              (empty? → EmptyCart)                   │
//! │    2. check stock of every line  (short? → InsufficientStock)           │
//! │    3. route to seller            (first line's listing owner)           │
//! │    4. UPDATE status cart → pending, seller ids, total                   │
//! │    5. INSERT notification for seller                                    │
//! │    6. INSERT audit entry                                                │
//! │  COMMIT   (any error or dropped future before this → ROLLBACK)          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use bepawa_core::mapping::OrderRow;
use bepawa_core::visibility::{visible_orders_predicate, ProductVisibility};
use bepawa_core::{
    AuditCategory, Caller, Cart, CoreError, Lifecycle, NewAuditLog, NewNotification,
    NotificationType, Order, OrderStatus,
};
use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use tracing::{debug, info};

use super::audit::insert_audit;
use super::notification::insert_notification;
use super::product::fetch_product;
use super::{new_id, push_predicate};
use crate::error::{DbError, DbResult};
use crate::repository::product::ProductRepository;

const ORDER_COLUMNS: &str = "id, user_id, pharmacy_id, wholesaler_id, status, items, \
     total_amount, delivery_address, created_at, updated_at";

#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    // =========================================================================
    // Cart
    // =========================================================================

    /// Returns the user's open cart, creating an empty one if needed.
    pub async fn get_cart(&self, user_id: &str) -> DbResult<Order> {
        let mut conn = self.pool.acquire().await?;
        load_or_create_cart(&mut conn, user_id).await
    }

    /// Adds a visible product to the caller's cart.
    pub async fn add_to_cart(
        &self,
        caller: &Caller,
        product_id: &str,
        quantity: i64,
        policy: ProductVisibility,
    ) -> DbResult<Order> {
        let product = ProductRepository::new(self.pool.clone())
            .get_visible(caller, product_id, policy)
            .await
            .map_err(|err| match err {
                DbError::NotFound { .. } => CoreError::ProductNotFound(product_id.to_string()).into(),
                other => other,
            })?;

        debug!(user = %caller.id, product = %product_id, quantity, "Adding to cart");
        self.mutate_cart(&caller.id, |cart| cart.add_item(&product, quantity))
            .await
    }

    /// Sets a line's quantity; zero removes it.
    pub async fn update_cart_item(&self, user_id: &str, product_id: &str, quantity: i64) -> DbResult<Order> {
        if quantity > 0 {
            let product = ProductRepository::new(self.pool.clone())
                .get(product_id)
                .await
                .map_err(|err| match err {
                    DbError::NotFound { .. } => CoreError::ProductNotFound(product_id.to_string()).into(),
                    other => other,
                })?;
            if !product.can_sell(quantity) {
                return Err(CoreError::InsufficientStock {
                    product: product.name,
                    available: product.stock,
                    requested: quantity,
                }
                .into());
            }
        }
        self.mutate_cart(user_id, |cart| cart.update_quantity(product_id, quantity))
            .await
    }

    pub async fn remove_cart_item(&self, user_id: &str, product_id: &str) -> DbResult<Order> {
        self.mutate_cart(user_id, |cart| cart.remove_item(product_id)).await
    }

    pub async fn clear_cart(&self, user_id: &str) -> DbResult<Order> {
        self.mutate_cart(user_id, |cart| {
            cart.clear();
            Ok(())
        })
        .await
    }

    /// Loads the cart, applies `change`, and writes items and total back.
    async fn mutate_cart<F>(&self, user_id: &str, change: F) -> DbResult<Order>
    where
        F: FnOnce(&mut Cart) -> Result<(), CoreError>,
    {
        let mut tx = self.pool.begin().await?;
        let order = load_or_create_cart(&mut tx, user_id).await?;

        let mut cart = Cart::from_items(order.items);
        change(&mut cart)?;

        sqlx::query("UPDATE orders SET items = ?, total_amount = ?, updated_at = ? WHERE id = ?")
            .bind(cart.items_json())
            .bind(cart.total_amount().minor())
            .bind(Utc::now())
            .bind(&order.id)
            .execute(&mut *tx)
            .await?;

        let order = fetch_order(&mut tx, &order.id).await?;
        tx.commit().await?;
        Ok(order)
    }

    /// Converts the caller's cart into a pending order.
    pub async fn checkout(&self, caller: &Caller, delivery_address: Option<String>) -> DbResult<Order> {
        let mut tx = self.pool.begin().await?;
        let cart_row = load_or_create_cart(&mut tx, &caller.id).await?;
        cart_row.status.ensure_transition(OrderStatus::Pending)?;

        let cart = Cart::from_items(cart_row.items.clone());
        if cart.is_empty() {
            return Err(CoreError::EmptyCart.into());
        }

        for item in cart.items() {
            let product = fetch_product(&mut tx, &item.product_id)
                .await
                .map_err(|_| CoreError::ProductNotFound(item.product_id.clone()))?;
            if !product.can_sell(item.quantity) {
                return Err(CoreError::InsufficientStock {
                    product: product.name,
                    available: product.stock,
                    requested: item.quantity,
                }
                .into());
            }
        }

        let (pharmacy_id, wholesaler_id) = route_to_seller(&mut tx, &cart).await?;
        let total = cart.total_amount();

        sqlx::query(
            "UPDATE orders SET status = ?, pharmacy_id = ?, wholesaler_id = ?, items = ?, \
             total_amount = ?, delivery_address = ?, updated_at = ? WHERE id = ?",
        )
        .bind(OrderStatus::Pending.as_str())
        .bind(&pharmacy_id)
        .bind(&wholesaler_id)
        .bind(cart.items_json())
        .bind(total.minor())
        .bind(delivery_address)
        .bind(Utc::now())
        .bind(&cart_row.id)
        .execute(&mut *tx)
        .await?;

        if let Some(seller) = pharmacy_id.as_deref().or(wholesaler_id.as_deref()) {
            insert_notification(
                &mut tx,
                &NewNotification::new(
                    seller,
                    NotificationType::OrderPlaced,
                    "New order",
                    format!("New order of {} item(s) worth {}", cart.total_quantity(), total),
                )
                .with_metadata(serde_json::json!({ "order_id": cart_row.id })),
            )
            .await?;
        }

        insert_audit(
            &mut tx,
            &NewAuditLog::new(&caller.id, "checkout", "order", &cart_row.id, AuditCategory::Financial)
                .with_values(
                    Some(serde_json::json!({ "status": OrderStatus::Cart.as_str() })),
                    Some(serde_json::json!({
                        "status": OrderStatus::Pending.as_str(),
                        "total_amount": total.minor(),
                    })),
                ),
        )
        .await?;

        let order = fetch_order(&mut tx, &cart_row.id).await?;
        tx.commit().await?;

        info!(order = %order.id, buyer = %caller.id, total = %total, "Checkout complete");
        Ok(order)
    }

    // =========================================================================
    // Orders
    // =========================================================================

    /// Lists orders the caller may see, newest first. Carts are excluded.
    pub async fn list_visible(&self, caller: &Caller) -> DbResult<Vec<Order>> {
        let predicate = visible_orders_predicate(caller.role, &caller.id);
        if predicate.is_nothing() {
            return Ok(Vec::new());
        }

        let mut builder: QueryBuilder<Sqlite> =
            QueryBuilder::new(format!("SELECT {ORDER_COLUMNS} FROM orders WHERE "));
        push_predicate(&mut builder, &predicate);
        builder.push(" ORDER BY created_at DESC, rowid DESC");

        let rows: Vec<OrderRow> = builder.build_query_as().fetch_all(&self.pool).await?;
        Ok(rows.into_iter().map(OrderRow::into_order).collect())
    }

    /// Gets one order if the caller may see it.
    pub async fn get_visible(&self, caller: &Caller, id: &str) -> DbResult<Order> {
        let mut conn = self.pool.acquire().await?;
        let order = fetch_order(&mut conn, id).await?;
        if visible_orders_predicate(caller.role, &caller.id).matches(&order) {
            Ok(order)
        } else {
            Err(DbError::not_found("Order", id))
        }
    }

    /// Moves an order to `next`, notifying the buyer.
    ///
    /// The seller (or an admin) drives fulfilment; the buyer may only cancel.
    pub async fn update_status(&self, caller: &Caller, id: &str, next: OrderStatus) -> DbResult<Order> {
        let mut tx = self.pool.begin().await?;
        let order = fetch_order(&mut tx, id).await?;

        let is_seller = order.pharmacy_id.as_deref() == Some(caller.id.as_str())
            || order.wholesaler_id.as_deref() == Some(caller.id.as_str());
        let is_buyer = order.user_id == caller.id;
        let allowed = caller.is_admin() || is_seller || (is_buyer && next == OrderStatus::Cancelled);
        if !allowed {
            return Err(CoreError::forbidden(caller.role_name(), "change this order's status").into());
        }
        order.status.ensure_transition(next)?;

        sqlx::query("UPDATE orders SET status = ?, updated_at = ? WHERE id = ?")
            .bind(next.as_str())
            .bind(Utc::now())
            .bind(id)
            .execute(&mut *tx)
            .await?;

        if !is_buyer {
            insert_notification(
                &mut tx,
                &NewNotification::new(
                    &order.user_id,
                    NotificationType::OrderStatus,
                    "Order update",
                    format!("Your order is now {next}"),
                )
                .with_metadata(serde_json::json!({ "order_id": id, "status": next.as_str() })),
            )
            .await?;
        }

        insert_audit(
            &mut tx,
            &NewAuditLog::new(&caller.id, "update_status", "order", id, AuditCategory::DataChange)
                .with_values(
                    Some(serde_json::json!({ "status": order.status.as_str() })),
                    Some(serde_json::json!({ "status": next.as_str() })),
                ),
        )
        .await?;

        let updated = fetch_order(&mut tx, id).await?;
        tx.commit().await?;

        info!(order = %id, from = %order.status, to = %next, by = %caller.id, "Order status changed");
        Ok(updated)
    }
}

// =============================================================================
// Helpers
// =============================================================================

async fn fetch_order(conn: &mut SqliteConnection, id: &str) -> DbResult<Order> {
    let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = ?");
    let row: Option<OrderRow> = sqlx::query_as(&sql).bind(id).fetch_optional(&mut *conn).await?;
    row.map(OrderRow::into_order)
        .ok_or_else(|| DbError::not_found("Order", id))
}

async fn load_or_create_cart(conn: &mut SqliteConnection, user_id: &str) -> DbResult<Order> {
    let now = Utc::now();
    // The partial unique index keeps this to one cart per user
    sqlx::query(
        "INSERT OR IGNORE INTO orders (id, user_id, status, items, total_amount, created_at, updated_at) \
         VALUES (?, ?, 'cart', '[]', 0, ?, ?)",
    )
    .bind(new_id())
    .bind(user_id)
    .bind(now)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    let sql = format!("SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = ? AND status = 'cart'");
    let row: OrderRow = sqlx::query_as(&sql).bind(user_id).fetch_one(&mut *conn).await?;
    Ok(row.into_order())
}

/// Decides `(pharmacy_id, wholesaler_id)` from the first line's listing.
async fn route_to_seller(
    conn: &mut SqliteConnection,
    cart: &Cart,
) -> DbResult<(Option<String>, Option<String>)> {
    let Some(first) = cart.items().first() else {
        return Ok((None, None));
    };
    let product = fetch_product(conn, &first.product_id).await?;
    let seller = cart.seller_id().unwrap_or(&product.owner_id).to_string();

    if product.wholesaler_id.as_deref() == Some(seller.as_str()) {
        Ok((None, Some(seller)))
    } else {
        Ok((Some(seller), None))
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
