//! Product endpoints.
//!
//! `POST /products` is a stock receipt, not a plain insert: posting a
//! product whose (supplier_id, supplier_code) already exists adds the
//! incoming quantity to the stored one and takes the incoming price.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use stockroom_core::Product;
use tracing::info;

use crate::dto::{CreateProductRequest, ProductQuery, UpdateProductRequest};
use crate::error::ApiError;
use crate::extract::{AppJson, AppPath, AppQuery, Pagination};
use crate::state::AppState;

/// `POST /products`
pub async fn receive_product(
    State(state): State<AppState>,
    AppJson(body): AppJson<CreateProductRequest>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let incoming = body.into_product()?;
    let stored = state.db.products().save(&incoming).await?;

    info!(
        id = stored.id(),
        supplier_id = stored.supplier().id,
        supplier_code = %stored.supplier_code(),
        received = incoming.stock_quantity(),
        on_hand = stored.stock_quantity(),
        "Stock received"
    );

    Ok((StatusCode::CREATED, Json(stored)))
}

/// `GET /products?name&supplier_id&supplier_code&min_price&max_price&page&limit`
pub async fn list_products(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<ProductQuery>,
    Pagination(page): Pagination,
) -> Result<Json<Vec<Product>>, ApiError> {
    let filter = query.into_filter()?;
    let products = state.db.products().find(&filter, page).await?;
    Ok(Json(products))
}

/// `GET /products/{id}`
pub async fn get_product(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<Product>, ApiError> {
    state
        .db
        .products()
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Product", id))
}

/// `PATCH /products/{id}`
pub async fn update_product(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
    AppJson(patch): AppJson<UpdateProductRequest>,
) -> Result<Json<Product>, ApiError> {
    let repo = state.db.products();
    let mut product = repo
        .get_by_id(id)
        .await?
        .ok_or_else(|| ApiError::not_found("Product", id))?;

    patch.apply(&mut product)?;
    repo.update(&product).await?;

    Ok(Json(product))
}

/// `DELETE /products/{id}`
pub async fn delete_product(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<StatusCode, ApiError> {
    state.db.products().delete(id).await?;
    info!(id, "Product deleted");
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use crate::handlers::test_support::{app, send};
    use axum::http::{Method, StatusCode};
    use serde_json::{json, Value};
    use stockroom_core::Money;

    fn price(value: &Value) -> Money {
        Money::parse(value.as_str().unwrap()).unwrap()
    }

    fn receipt(name: &str, supplier_id: i64, code: &str, quantity: i64, price: &str) -> Value {
        json!({
            "name": name,
            "supplier_id": supplier_id,
            "supplier_code": code,
            "stock_quantity": quantity,
            "price": price,
        })
    }

    #[tokio::test]
    async fn test_receiving_merges_stock() {
        let app = app().await;

        let (status, first) = send(
            &app,
            Method::POST,
            "/products",
            Some(receipt("Arroz 5kg", 1, "ARZ-5", 5, "10.00")),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(first["stock_quantity"], 5);

        let (status, second) = send(
            &app,
            Method::POST,
            "/products",
            Some(receipt("Renamed", 1, "ARZ-5", 3, "12.50")),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(second["id"], first["id"]);
        assert_eq!(second["stock_quantity"], 8);
        assert_eq!(second["name"], "Arroz 5kg");
        assert_eq!(price(&second["price"]), Money::parse("12.5").unwrap());

        let (_, all) = send(&app, Method::GET, "/products", None).await;
        assert_eq!(all.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_receiving_rejects_invalid_product() {
        let app = app().await;

        let (status, body) = send(
            &app,
            Method::POST,
            "/products",
            Some(receipt("Arroz", 1, "ARZ", 1, "-1")),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");

        let (status, _) = send(
            &app,
            Method::POST,
            "/products",
            Some(receipt("Arroz", 0, "ARZ", 1, "1")),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, body) = send(
            &app,
            Method::POST,
            "/products",
            Some(receipt("Arroz", 1, "ARZ", 1, "one")),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "BAD_REQUEST");

        let (status, body) = send(
            &app,
            Method::POST,
            "/products",
            Some(receipt("Arroz", 1, "ARZ", 1, "1_000")),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "BAD_REQUEST");
    }

    #[tokio::test]
    async fn test_receiving_past_max_stock_is_rejected() {
        let app = app().await;

        let (status, full) = send(
            &app,
            Method::POST,
            "/products",
            Some(receipt("Arroz 5kg", 1, "ARZ-5", i64::MAX, "10.00")),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, body) = send(
            &app,
            Method::POST,
            "/products",
            Some(receipt("Arroz 5kg", 1, "ARZ-5", 1, "10.00")),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_ERROR");
        assert!(body["message"].as_str().unwrap().contains("stock_quantity"));

        let id = full["id"].as_i64().unwrap();
        let (_, stored) = send(&app, Method::GET, &format!("/products/{id}"), None).await;
        assert_eq!(stored["stock_quantity"], i64::MAX);
    }

    #[tokio::test]
    async fn test_list_products_by_decimal_price_range() {
        let app = app().await;
        for (code, p) in [("A", "9.5"), ("B", "10"), ("C", "100"), ("D", "9.49")] {
            send(&app, Method::POST, "/products", Some(receipt("Item", 1, code, 1, p))).await;
        }

        let (status, hits) = send(
            &app,
            Method::GET,
            "/products?min_price=9.50&max_price=10.00",
            None,
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        let codes: Vec<&str> = hits
            .as_array()
            .unwrap()
            .iter()
            .map(|p| p["supplier_code"].as_str().unwrap())
            .collect();
        assert_eq!(codes, vec!["A", "B"]);

        let (status, _) = send(&app, Method::GET, "/products?min_price=lots", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_patch_and_delete_product() {
        let app = app().await;
        let (_, created) = send(
            &app,
            Method::POST,
            "/products",
            Some(receipt("Feijão", 2, "FJ-1", 40, "8.49")),
        )
        .await;
        let id = created["id"].as_i64().unwrap();

        let (status, patched) = send(
            &app,
            Method::PATCH,
            &format!("/products/{id}"),
            Some(json!({"stock_quantity": 35, "price": "8.99"})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(patched["stock_quantity"], 35);

        let (_, fetched) = send(&app, Method::GET, &format!("/products/{id}"), None).await;
        assert_eq!(fetched["stock_quantity"], 35);
        assert_eq!(price(&fetched["price"]), Money::parse("8.99").unwrap());

        let (status, _) = send(
            &app,
            Method::PATCH,
            &format!("/products/{id}"),
            Some(json!({"name": ""})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = send(&app, Method::PATCH, "/products/9999", Some(json!({"name": "X"}))).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, _) = send(&app, Method::DELETE, &format!("/products/{id}"), None).await;
        assert_eq!(status, StatusCode::NO_CONTENT);
        let (status, _) = send(&app, Method::DELETE, &format!("/products/{id}"), None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }
}
