//! Sale endpoints.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use stockroom_core::Sale;
use tracing::info;

use crate::dto::{CreateSaleRequest, SaleQuery};
use crate::error::ApiError;
use crate::extract::{AppJson, AppPath, AppQuery, Pagination};
use crate::state::AppState;

/// `POST /sales`
///
/// The header and every item are written in one transaction; the response
/// carries the store-assigned ids.
pub async fn create_sale(
    State(state): State<AppState>,
    AppJson(body): AppJson<CreateSaleRequest>,
) -> Result<(StatusCode, Json<Sale>), ApiError> {
    let mut sale = body.into_sale(Utc::now().date_naive())?;
    state.db.sales().save(&mut sale).await?;

    info!(
        id = sale.id,
        client_id = sale.client_id,
        items = sale.items.len(),
        total = %sale.total,
        "Sale recorded"
    );

    Ok((StatusCode::CREATED, Json(sale)))
}

/// `GET /sales?client_name&product_name&total&sale_date&payment_date&payment_status&page&limit`
pub async fn list_sales(
    State(state): State<AppState>,
    AppQuery(query): AppQuery<SaleQuery>,
    Pagination(page): Pagination,
) -> Result<Json<Vec<Sale>>, ApiError> {
    let filter = query.into_filter()?;
    let sales = state.db.sales().find(&filter, page).await?;
    Ok(Json(sales))
}

/// `GET /sales/{id}`
pub async fn get_sale(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<Json<Sale>, ApiError> {
    state
        .db
        .sales()
        .get_by_id(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::not_found("Sale", id))
}

/// `DELETE /sales/{id}`
pub async fn delete_sale(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> Result<StatusCode, ApiError> {
    state.db.sales().delete(id).await?;
    info!(id, "Sale deleted");
    Ok(StatusCode::NO_CONTENT)
}
