//! # Point of Sale Routes
//!
//! Over-the-counter sales recorded by a pharmacy. A sale takes every line
//! out of stock in one transaction; a short line rejects the whole sale.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::routing::get;
use axum::{Json, Router};
use bepawa_core::{NewSale, Sale, SaleItem};
use tracing::debug;

use super::LimitQuery;
use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/sales", get(list_sales).post(record_sale))
        .route("/sales/{id}/items", get(sale_items))
}

async fn record_sale(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Json(new): Json<NewSale>,
) -> ApiResult<(StatusCode, Json<Sale>)> {
    debug!(pharmacy = %caller.id, lines = new.items.len(), "record_sale");
    let sale = state.db.sales().record_sale(&caller, new).await?;
    Ok((StatusCode::CREATED, Json(sale)))
}

async fn list_sales(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Query(limit): Query<LimitQuery>,
) -> ApiResult<Json<Vec<Sale>>> {
    Ok(Json(state.db.sales().list_sales(&caller.id, limit.value()).await?))
}

async fn sale_items(
    State(state): State<AppState>,
    AuthUser(caller): AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<Vec<SaleItem>>> {
    Ok(Json(state.db.sales().sale_items(&caller, &id).await?))
}

#[cfg(test)]
mod tests {
    use crate::test_support::TestApp;
    use axum::http::StatusCode;
    use bepawa_core::Role;
    use serde_json::json;

    #[tokio::test]
    async fn test_counter_sale() {
        let app = TestApp::new().await;
        let pharmacy = app.token("p1", Role::Retail);
        let (_, product) = app
            .post(
                "/products",
                &pharmacy,
                json!({ "name": "Amoxicillin", "price": 3500, "stock": 12, "min_stock": 10 }),
            )
            .await;
        let product_id = product["id"].as_str().unwrap().to_string();

        let (status, sale) = app
            .post(
                "/sales",
                &pharmacy,
                json!({
                    "items": [{ "product_id": product_id, "quantity": 3 }],
                    "payment_method": "mobile_money",
                    "customer_name": "Juma"
                }),
            )
            .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(sale["total_amount"], 10500);
        assert!(sale["receipt_number"].as_str().unwrap().starts_with("RCP-"));
        let sale_id = sale["id"].as_str().unwrap().to_string();

        let (_, items) = app.get(&format!("/sales/{sale_id}/items"), &pharmacy).await;
        assert_eq!(items[0]["name_snapshot"], "Amoxicillin");
        assert_eq!(items[0]["line_total"], 10500);

        let (_, product) = app.get(&format!("/products/{product_id}"), &pharmacy).await;
        assert_eq!(product["stock"], 9);
        assert_eq!(product["status"], "low-stock");

        let (status, body) = app
            .post(
                "/sales",
                &pharmacy,
                json!({ "items": [{ "product_id": product_id, "quantity": 10 }], "payment_method": "cash" }),
            )
            .await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(body["code"], "INSUFFICIENT_STOCK");

        let (_, sales) = app.get("/sales", &pharmacy).await;
        assert_eq!(sales.as_array().unwrap().len(), 1);

        let other = app.token("p2", Role::Retail);
        let (status, _) = app.get(&format!("/sales/{sale_id}/items"), &other).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
