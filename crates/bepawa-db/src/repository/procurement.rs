//! # Procurement Repository
//!
//! Suppliers and purchase orders for pharmacies and wholesalers restocking
//! their own listings.
//!
//! ## Purchase Order Lifecycle
//! ```text
//! draft ──► sent ──► received   (stock += quantity for every line)
//!   │         │
//!   └─────────┴────► cancelled
//! ```
//!
//! Receiving is a single transaction: either every line's stock moves and
//! the status flips, or nothing does.

use bepawa_core::validation::{validate_new_purchase_order, validate_new_supplier};
use bepawa_core::{
    AuditCategory, Caller, CoreError, Lifecycle, NewAuditLog, NewPurchaseOrder, NewSupplier,
    PurchaseOrder, PurchaseOrderItem, PurchaseOrderStatus, Role, Supplier,
};
use chrono::Utc;
use sqlx::{SqliteConnection, SqlitePool};
use tracing::{debug, info};

use super::audit::insert_audit;
use super::new_id;
use super::product::{apply_stock_delta, fetch_product, refresh_status};
use crate::error::{DbError, DbResult};

const SUPPLIER_COLUMNS: &str =
    "id, owner_id, name, contact_person, email, phone, address, is_active, created_at";
const PURCHASE_ORDER_COLUMNS: &str =
    "id, owner_id, supplier_id, order_number, status, total_amount, notes, created_at, updated_at";

/// Roles that keep inventory and so buy from suppliers.
const PROCUREMENT_ROLES: &[Role] = &[Role::Retail, Role::Wholesale, Role::Admin];

#[derive(Debug, Clone)]
pub struct ProcurementRepository {
    pool: SqlitePool,
}

impl ProcurementRepository {
    pub fn new(pool: SqlitePool) -> Self {
        ProcurementRepository { pool }
    }

    // =========================================================================
    // Suppliers
    // =========================================================================

    pub async fn create_supplier(&self, caller: &Caller, new: NewSupplier) -> DbResult<Supplier> {
        caller.require_role(PROCUREMENT_ROLES, "manage suppliers")?;
        validate_new_supplier(&new).map_err(CoreError::from)?;

        let id = new_id();
        sqlx::query(
            "INSERT INTO suppliers (id, owner_id, name, contact_person, email, phone, address, is_active, created_at) \
             VALUES (?, ?, ?, ?, ?, ?, ?, 1, ?)",
        )
        .bind(&id)
        .bind(&caller.id)
        .bind(new.name.trim())
        .bind(new.contact_person)
        .bind(new.email)
        .bind(new.phone)
        .bind(new.address)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        info!(id = %id, owner = %caller.id, "Supplier created");
        let mut conn = self.pool.acquire().await?;
        fetch_supplier(&mut conn, &id).await
    }

    pub async fn list_suppliers(&self, owner_id: &str) -> DbResult<Vec<Supplier>> {
        let sql = format!("SELECT {SUPPLIER_COLUMNS} FROM suppliers WHERE owner_id = ? ORDER BY name");
        Ok(sqlx::query_as(&sql).bind(owner_id).fetch_all(&self.pool).await?)
    }

    // =========================================================================
    // Purchase Orders
    // =========================================================================

    /// Creates a draft purchase order with its lines.
    ///
    /// The supplier and every product must belong to the caller.
    pub async fn create_purchase_order(
        &self,
        caller: &Caller,
        new: NewPurchaseOrder,
    ) -> DbResult<PurchaseOrder> {
        caller.require_role(PROCUREMENT_ROLES, "create purchase orders")?;
        validate_new_purchase_order(&new).map_err(CoreError::from)?;

        let mut tx = self.pool.begin().await?;

        let supplier = fetch_supplier(&mut tx, &new.supplier_id).await?;
        if supplier.owner_id != caller.id && !caller.is_admin() {
            return Err(DbError::not_found("Supplier", &new.supplier_id));
        }

        let id = new_id();
        let order_number = format!("PO-{}", &id[..8].to_uppercase());
        let total = new.checked_total()?;
        let now = Utc::now();

        sqlx::query(
            "INSERT INTO purchase_orders \
             (id, owner_id, supplier_id, order_number, status, total_amount, notes, created_at, updated_at) \
             VALUES (?, ?, ?, ?, 'draft', ?, ?, ?, ?)",
        )
        .bind(&id)
        .bind(&caller.id)
        .bind(&new.supplier_id)
        .bind(&order_number)
        .bind(total.minor())
        .bind(&new.notes)
        .bind(now)
        .bind(now)
        .execute(&mut *tx)
        .await?;

        for item in &new.items {
            let product = fetch_product(&mut tx, &item.product_id).await?;
            if product.owner_id != caller.id && !caller.is_admin() {
                return Err(CoreError::forbidden(caller.role_name(), "restock another seller's product").into());
            }

            sqlx::query(
                "INSERT INTO purchase_order_items (id, purchase_order_id, product_id, quantity, unit_cost, line_total) \
                 VALUES (?, ?, ?, ?, ?, ?)",
            )
            .bind(new_id())
            .bind(&id)
            .bind(&item.product_id)
            .bind(item.quantity)
            .bind(item.unit_cost)
            .bind(item.line_total().minor())
            .execute(&mut *tx)
            .await?;
        }

        let po = fetch_purchase_order(&mut tx, &id).await?;
        tx.commit().await?;

        info!(id = %id, number = %order_number, lines = new.items.len(), total = %total, "Purchase order created");
        Ok(po)
    }

    pub async fn list_purchase_orders(&self, owner_id: &str) -> DbResult<Vec<PurchaseOrder>> {
        let sql = format!(
            "SELECT {PURCHASE_ORDER_COLUMNS} FROM purchase_orders \
             WHERE owner_id = ? ORDER BY created_at DESC, rowid DESC"
        );
        Ok(sqlx::query_as(&sql).bind(owner_id).fetch_all(&self.pool).await?)
    }

    pub async fn get_purchase_order(&self, caller: &Caller, id: &str) -> DbResult<PurchaseOrder> {
        let mut conn = self.pool.acquire().await?;
        let po = fetch_purchase_order(&mut conn, id).await?;
        if po.owner_id != caller.id && !caller.is_admin() {
            return Err(DbError::not_found("PurchaseOrder", id));
        }
        Ok(po)
    }

    pub async fn items(&self, purchase_order_id: &str) -> DbResult<Vec<PurchaseOrderItem>> {
        let mut conn = self.pool.acquire().await?;
        fetch_items(&mut conn, purchase_order_id).await
    }

    /// Moves a purchase order along its lifecycle.
    ///
    /// `received` adds every line's quantity to stock in the same
    /// transaction as the status change.
    pub async fn update_status(
        &self,
        caller: &Caller,
        id: &str,
        next: PurchaseOrderStatus,
    ) -> DbResult<PurchaseOrder> {
        let mut tx = self.pool.begin().await?;
        let po = fetch_purchase_order(&mut tx, id).await?;
        if po.owner_id != caller.id && !caller.is_admin() {
            return Err(DbError::not_found("PurchaseOrder", id));
        }
        po.status.ensure_transition(next)?;

        if next == PurchaseOrderStatus::Received {
            for item in fetch_items(&mut tx, id).await? {
                debug!(po = %id, product = %item.product_id, quantity = item.quantity, "Receiving stock");
                if !apply_stock_delta(&mut tx, &item.product_id, item.quantity).await? {
                    return Err(DbError::not_found("Product", &item.product_id));
                }
                refresh_status(&mut tx, &item.product_id).await?;
            }
        }

        sqlx::query("UPDATE purchase_orders SET status = ?, updated_at = ? WHERE id = ?")
            .bind(next.as_str())
            .bind(Utc::now())
            .bind(id)
            .execute(&mut *tx)
            .await?;

        let category = if next == PurchaseOrderStatus::Received {
            AuditCategory::Financial
        } else {
            AuditCategory::DataChange
        };
        insert_audit(
            &mut tx,
            &NewAuditLog::new(&caller.id, "update_status", "purchase_order", id, category).with_values(
                Some(serde_json::json!({ "status": po.status.as_str() })),
                Some(serde_json::json!({ "status": next.as_str() })),
            ),
        )
        .await?;

        let updated = fetch_purchase_order(&mut tx, id).await?;
        tx.commit().await?;

        info!(po = %id, from = %po.status, to = %next, "Purchase order status changed");
        Ok(updated)
    }
}

async fn fetch_supplier(conn: &mut SqliteConnection, id: &str) -> DbResult<Supplier> {
    let sql = format!("SELECT {SUPPLIER_COLUMNS} FROM suppliers WHERE id = ?");
    sqlx::query_as(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| DbError::not_found("Supplier", id))
}

async fn fetch_purchase_order(conn: &mut SqliteConnection, id: &str) -> DbResult<PurchaseOrder> {
    let sql = format!("SELECT {PURCHASE_ORDER_COLUMNS} FROM purchase_orders WHERE id = ?");
    sqlx::query_as(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?
        .ok_or_else(|| DbError::not_found("PurchaseOrder", id))
}

async fn fetch_items(conn: &mut SqliteConnection, purchase_order_id: &str) -> DbResult<Vec<PurchaseOrderItem>> {
    Ok(sqlx::query_as(
        "SELECT id, purchase_order_id, product_id, quantity, unit_cost, line_total \
         FROM purchase_order_items WHERE purchase_order_id = ? ORDER BY rowid",
    )
    .bind(purchase_order_id)
    .fetch_all(&mut *conn)
    .await?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use bepawa_core::{NewProduct, NewPurchaseOrderItem, ProductStatus};

    async fn setup() -> (Database, Caller, String, String) {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let pharmacy = Caller::new("p1", Some(Role::Retail));

        let product = db
            .products()
            .create(
                &pharmacy,
                NewProduct {
                    name: "Amoxicillin 500mg".to_string(),
                    price: 500,
                    stock: 2,
                    min_stock: Some(10),
                    ..Default::default()
                },
            )
            .await
            .unwrap();
        let supplier = db
            .procurement()
            .create_supplier(
                &pharmacy,
                NewSupplier {
                    name: "Medisel Ltd".to_string(),
                    contact_person: None,
                    email: Some("orders@medisel.co.tz".to_string()),
                    phone: None,
                    address: None,
                },
            )
            .await
            .unwrap();

        (db, pharmacy, supplier.id, product.id)
    }

    fn order(supplier_id: &str, product_id: &str, quantity: i64) -> NewPurchaseOrder {
        NewPurchaseOrder {
            supplier_id: supplier_id.to_string(),
            items: vec![NewPurchaseOrderItem {
                product_id: product_id.to_string(),
                quantity,
                unit_cost: 300,
            }],
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_receiving_restocks_products() {
        let (db, pharmacy, supplier_id, product_id) = setup().await;
        let repo = db.procurement();

        let po = repo.create_purchase_order(&pharmacy, order(&supplier_id, &product_id, 50)).await.unwrap();
        assert_eq!(po.status, PurchaseOrderStatus::Draft);
        assert_eq!(po.total_amount, 15_000);
        assert!(po.order_number.starts_with("PO-"));
        assert_eq!(repo.items(&po.id).await.unwrap()[0].line_total, 15_000);

        // Can't receive a draft
        let err = repo.update_status(&pharmacy, &po.id, PurchaseOrderStatus::Received).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::InvalidStatusTransition { .. })));

        repo.update_status(&pharmacy, &po.id, PurchaseOrderStatus::Sent).await.unwrap();
        let received = repo.update_status(&pharmacy, &po.id, PurchaseOrderStatus::Received).await.unwrap();
        assert_eq!(received.status, PurchaseOrderStatus::Received);

        let product = db.products().get(&product_id).await.unwrap();
        assert_eq!(product.stock, 52);
        assert_eq!(product.status, ProductStatus::InStock);
    }

    #[tokio::test]
    async fn test_purchase_orders_are_private() {
        let (db, pharmacy, supplier_id, product_id) = setup().await;
        let repo = db.procurement();
        let po = repo.create_purchase_order(&pharmacy, order(&supplier_id, &product_id, 5)).await.unwrap();

        let other = Caller::new("p2", Some(Role::Retail));
        assert!(repo.get_purchase_order(&other, &po.id).await.is_err());
        assert!(repo.update_status(&other, &po.id, PurchaseOrderStatus::Cancelled).await.is_err());
        assert!(repo.create_purchase_order(&other, order(&supplier_id, &product_id, 5)).await.is_err());
        assert!(repo.list_purchase_orders("p2").await.unwrap().is_empty());
        assert_eq!(repo.list_suppliers("p1").await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_oversized_purchase_order_is_rejected() {
        let (db, pharmacy, supplier_id, product_id) = setup().await;
        let repo = db.procurement();

        let mut huge = order(&supplier_id, &product_id, 1 << 62);
        huge.items[0].unit_cost = 4;
        let err = repo.create_purchase_order(&pharmacy, huge).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::Validation(_))));
        assert!(repo.list_purchase_orders("p1").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_individuals_cannot_procure() {
        let (db, _, _, _) = setup().await;
        let individual = Caller::new("u1", Some(Role::Individual));
        let err = db
            .procurement()
            .create_supplier(
                &individual,
                NewSupplier {
                    name: "X".to_string(),
                    contact_person: None,
                    email: None,
                    phone: None,
                    address: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::Forbidden { .. })));
    }
}
