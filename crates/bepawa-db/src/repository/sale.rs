//! # Sale Repository
//!
//! Over-the-counter sales recorded by a pharmacy against its own stock.
//!
//! ## Sale Flow (one transaction)
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  for each line:                                                         │
//! │    fetch product (must be the caller's)                                 │
//! │    UPDATE stock = stock - qty WHERE stock - qty >= 0                    │
//! │        └── 0 rows? → InsufficientStock, whole sale rolls back           │
//! │    INSERT sale_items (name and price snapshot)                          │
//! │    refresh status → low/out? notify owner                               │
//! │  INSERT sales                                                           │
//! │  INSERT audit_logs (financial)                                          │
//! │  COMMIT                                                                 │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use bepawa_core::validation::validate_new_sale;
use bepawa_core::{
    AuditCategory, Caller, CoreError, Money, NewAuditLog, NewNotification, NewSale,
    NotificationType, ProductStatus, Role, Sale, SaleItem,
};
use chrono::Utc;
use sqlx::SqlitePool;
use tracing::{debug, info, warn};

use super::audit::insert_audit;
use super::new_id;
use super::notification::insert_notification;
use super::product::{apply_stock_delta, fetch_product, refresh_status};
use crate::error::{DbError, DbResult};

const SALE_COLUMNS: &str =
    "id, pharmacy_id, receipt_number, customer_name, payment_method, total_amount, created_at";

#[derive(Debug, Clone)]
pub struct SaleRepository {
    pool: SqlitePool,
}

impl SaleRepository {
    pub fn new(pool: SqlitePool) -> Self {
        SaleRepository { pool }
    }

    /// Records a sale and takes its lines out of stock atomically.
    pub async fn record_sale(&self, caller: &Caller, new: NewSale) -> DbResult<Sale> {
        caller.require_role(&[Role::Retail, Role::Admin], "record sales")?;
        validate_new_sale(&new).map_err(CoreError::from)?;

        let sale_id = new_id();
        let now = Utc::now();
        let receipt_number = format!("RCP-{}-{}", now.format("%Y%m%d"), &sale_id[..8].to_uppercase());

        let mut tx = self.pool.begin().await?;

        // The header goes first so line items can reference it
        sqlx::query(
            "INSERT INTO sales (id, pharmacy_id, receipt_number, customer_name, payment_method, total_amount, created_at) \
             VALUES (?, ?, ?, ?, ?, 0, ?)",
        )
        .bind(&sale_id)
        .bind(&caller.id)
        .bind(&receipt_number)
        .bind(&new.customer_name)
        .bind(new.payment_method.as_str())
        .bind(now)
        .execute(&mut *tx)
        .await?;

        let mut total = Money::zero();
        for line in &new.items {
            let product = fetch_product(&mut tx, &line.product_id).await?;
            if product.owner_id != caller.id && !caller.is_admin() {
                return Err(CoreError::forbidden(caller.role_name(), "sell another seller's product").into());
            }

            if !apply_stock_delta(&mut tx, &product.id, -line.quantity).await? {
                warn!(product = %product.id, available = product.stock, requested = line.quantity, "Sale exceeds stock");
                return Err(CoreError::InsufficientStock {
                    product: product.name,
                    available: product.stock,
                    requested: line.quantity,
                }
                .into());
            }

            let line_total = product.price().checked_multiply_quantity(line.quantity)?;
            total = total.checked_add(line_total)?;

            sqlx::query(
                "INSERT INTO sale_items (id, sale_id, product_id, name_snapshot, unit_price, quantity, line_total) \
                 VALUES (?, ?, ?, ?, ?, ?, ?)",
            )
            .bind(new_id())
            .bind(&sale_id)
            .bind(&product.id)
            .bind(&product.name)
            .bind(product.price)
            .bind(line.quantity)
            .bind(line_total.minor())
            .execute(&mut *tx)
            .await?;

            let refreshed = refresh_status(&mut tx, &product.id).await?;
            debug!(product = %product.id, stock = refreshed.stock, status = %refreshed.status, "Stock after sale");

            if refreshed.status != product.status
                && matches!(refreshed.status, ProductStatus::LowStock | ProductStatus::OutOfStock)
            {
                insert_notification(
                    &mut tx,
                    &NewNotification::new(
                        &product.owner_id,
                        NotificationType::LowStock,
                        "Low stock",
                        format!("{}: {} left", refreshed.name, refreshed.stock),
                    )
                    .with_metadata(serde_json::json!({ "product_id": product.id, "stock": refreshed.stock })),
                )
                .await?;
            }
        }

        sqlx::query("UPDATE sales SET total_amount = ? WHERE id = ?")
            .bind(total.minor())
            .bind(&sale_id)
            .execute(&mut *tx)
            .await?;

        insert_audit(
            &mut tx,
            &NewAuditLog::new(&caller.id, "record_sale", "sale", &sale_id, AuditCategory::Financial)
                .with_values(
                    None,
                    Some(serde_json::json!({
                        "receipt_number": receipt_number,
                        "total_amount": total.minor(),
                        "payment_method": new.payment_method.as_str(),
                    })),
                ),
        )
        .await?;

        let sql = format!("SELECT {SALE_COLUMNS} FROM sales WHERE id = ?");
        let sale: Sale = sqlx::query_as(&sql).bind(&sale_id).fetch_one(&mut *tx).await?;
        tx.commit().await?;

        info!(sale = %sale_id, receipt = %receipt_number, total = %total, lines = new.items.len(), "Sale recorded");
        Ok(sale)
    }

    /// A pharmacy's sales, newest first.
    pub async fn list_sales(&self, pharmacy_id: &str, limit: i64) -> DbResult<Vec<Sale>> {
        let sql = format!(
            "SELECT {SALE_COLUMNS} FROM sales WHERE pharmacy_id = ? \
             ORDER BY created_at DESC, rowid DESC LIMIT ?"
        );
        Ok(sqlx::query_as(&sql)
            .bind(pharmacy_id)
            .bind(limit)
            .fetch_all(&self.pool)
            .await?)
    }

    /// Lines of one of the caller's sales.
    pub async fn sale_items(&self, caller: &Caller, sale_id: &str) -> DbResult<Vec<SaleItem>> {
        let owner: Option<String> = sqlx::query_scalar("SELECT pharmacy_id FROM sales WHERE id = ?")
            .bind(sale_id)
            .fetch_optional(&self.pool)
            .await?;
        match owner {
            Some(owner) if owner == caller.id || caller.is_admin() => {}
            _ => return Err(DbError::not_found("Sale", sale_id)),
        }

        Ok(sqlx::query_as(
            "SELECT id, sale_id, product_id, name_snapshot, unit_price, quantity, line_total \
             FROM sale_items WHERE sale_id = ? ORDER BY rowid",
        )
        .bind(sale_id)
        .fetch_all(&self.pool)
        .await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};
    use bepawa_core::{NewProduct, NewSaleItem, PaymentMethod};

    async fn stocked(db: &Database, owner: &Caller, name: &str, stock: i64) -> String {
        db.products()
            .create(
                owner,
                NewProduct {
                    name: name.to_string(),
                    price: 1500,
                    stock,
                    min_stock: Some(5),
                    is_retail_product: true,
                    is_public_product: true,
                    ..Default::default()
                },
            )
            .await
            .unwrap()
            .id
    }

    fn sale(lines: &[(&str, i64)]) -> NewSale {
        NewSale {
            items: lines
                .iter()
                .map(|(id, qty)| NewSaleItem {
                    product_id: id.to_string(),
                    quantity: *qty,
                })
                .collect(),
            payment_method: PaymentMethod::MobileMoney,
            customer_name: None,
        }
    }

    #[tokio::test]
    async fn test_sale_decrements_stock_and_alerts() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let pharmacy = Caller::new("p1", Some(Role::Retail));
        let panadol = stocked(&db, &pharmacy, "Panadol", 8).await;

        let recorded = db.sales().record_sale(&pharmacy, sale(&[(&panadol, 4)])).await.unwrap();
        assert_eq!(recorded.total_amount, 6000);
        assert_eq!(recorded.payment_method, PaymentMethod::MobileMoney);
        assert!(recorded.receipt_number.starts_with("RCP-"));

        let product = db.products().get(&panadol).await.unwrap();
        assert_eq!(product.stock, 4);
        assert_eq!(product.status, ProductStatus::LowStock);
        assert_eq!(db.notifications().unread_count("p1").await.unwrap(), 1);

        let items = db.sales().sale_items(&pharmacy, &recorded.id).await.unwrap();
        assert_eq!(items[0].name_snapshot, "Panadol");
        assert_eq!(db.sales().list_sales("p1", 10).await.unwrap().len(), 1);

        let other = Caller::new("p2", Some(Role::Retail));
        assert!(db.sales().sale_items(&other, &recorded.id).await.is_err());
    }

    #[tokio::test]
    async fn test_short_line_rolls_back_whole_sale() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let pharmacy = Caller::new("p1", Some(Role::Retail));
        let panadol = stocked(&db, &pharmacy, "Panadol", 20).await;
        let zinc = stocked(&db, &pharmacy, "Zinc", 1).await;

        let err = db
            .sales()
            .record_sale(&pharmacy, sale(&[(&panadol, 5), (&zinc, 3)]))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::InsufficientStock { .. })));

        assert_eq!(db.products().get(&panadol).await.unwrap().stock, 20);
        assert_eq!(db.products().get(&zinc).await.unwrap().stock, 1);
        assert!(db.sales().list_sales("p1", 10).await.unwrap().is_empty());
        assert!(db.audit().recent(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_cannot_sell_others_stock() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let owner = Caller::new("p1", Some(Role::Retail));
        let panadol = stocked(&db, &owner, "Panadol", 20).await;

        let other = Caller::new("p2", Some(Role::Retail));
        let err = db.sales().record_sale(&other, sale(&[(&panadol, 1)])).await.unwrap_err();
        assert!(matches!(err, DbError::Domain(CoreError::Forbidden { .. })));
    }
}
