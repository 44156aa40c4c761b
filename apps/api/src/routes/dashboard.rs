use axum::extract::State;
use axum::routing::get;
use axum::{Json, Router};
use bepawa_core::analytics::{summarize_inventory, summarize_orders, InventorySummary, OrderSummary};
use chrono::Utc;
use serde::Serialize;

use crate::auth::AuthUser;
use crate::error::ApiResult;
use crate::AppState;

pub fn routes() -> Router<AppState> {
    Router::new().route("/dashboard", get(dashboard))
}

#[derive(Debug, Serialize)]
struct Dashboard {
    orders: OrderSummary,
    /// Covers only the caller's own listings.
    inventory: InventorySummary,
}

async fn dashboard(State(state): State<AppState>, AuthUser(caller): AuthUser) -> ApiResult<Json<Dashboard>> {
    let orders = state.db.orders().list_visible(&caller).await?;
    let products = state.db.products().list_for_owner(&caller.id).await?;
    Ok(Json(Dashboard {
        orders: summarize_orders(&orders),
        inventory: summarize_inventory(&products, Utc::now().date_naive()),
    }))
}

#[cfg(test)]
mod tests {
    use crate::test_support::TestApp;
    use axum::http::StatusCode;
    use bepawa_core::Role;
    use serde_json::json;

    #[tokio::test]
    async fn test_pharmacy_dashboard() {
        let app = TestApp::new().await;
        let pharmacy = app.token("p1", Role::Retail);
        let buyer = app.token("u1", Role::Individual);

        let (_, product) = app
            .post(
                "/products",
                &pharmacy,
                json!({ "name": "ORS", "price": 500, "stock": 20, "is_public_product": true, "is_retail_product": true }),
            )
            .await;
        app.post("/products", &pharmacy, json!({ "name": "Zinc", "price": 2000, "stock": 0 }))
            .await;

        app.post("/cart/items", &buyer, json!({ "product_id": product["id"], "quantity": 2 }))
            .await;
        let (_, order) = app.post("/cart/checkout", &buyer, json!({})).await;
        let id = order["id"].as_str().unwrap();
        for next in ["confirmed", "processing", "shipped", "delivered"] {
            let (status, _) = app
                .patch(&format!("/orders/{id}/status"), &pharmacy, json!({ "status": next }))
                .await;
            assert_eq!(status, StatusCode::OK);
        }

        let (status, body) = app.get("/dashboard", &pharmacy).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["orders"]["total_orders"], 1);
        assert_eq!(body["orders"]["by_status"]["delivered"], 1);
        assert_eq!(body["orders"]["revenue"], 1000);
        assert_eq!(body["inventory"]["total_products"], 2);
        assert_eq!(body["inventory"]["out_of_stock"], 1);
        assert_eq!(body["inventory"]["stock_value"], 10000);

        let (_, body) = app.get("/dashboard", &buyer).await;
        assert_eq!(body["orders"]["total_orders"], 1);
        assert_eq!(body["inventory"]["total_products"], 0);
    }
}
