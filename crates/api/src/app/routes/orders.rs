use std::sync::Arc;

use axum::{
    extract::{Extension, Path, Query},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};

use ordergate_core::EntityId;
use ordergate_sales::OrderId;

use crate::app::services::AppServices;
use crate::app::{dto, errors, validate};

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_order).get(list_orders))
        .route("/fulfill", post(fulfill_order))
        .route("/:id", get(get_order).put(update_order).delete(delete_order))
}

pub async fn list_orders(
    Extension(services): Extension<Arc<AppServices>>,
    Query(query): Query<dto::ListQuery>,
) -> axum::response::Response {
    let page = query.page.unwrap_or(1).max(1);
    let per_page = query.per_page.unwrap_or(10).max(1);

    let result = match services.orders_list(page, per_page) {
        Ok(result) => result,
        Err(e) => return errors::domain_error_to_response(e),
    };

    let data = result
        .orders
        .iter()
        .map(dto::order_to_json)
        .collect::<Vec<_>>();
    let total_pages = result.total.div_ceil(per_page as u64);

    (
        StatusCode::OK,
        Json(serde_json::json!({
            "total_result": result.total,
            "current_count": data.len(),
            "total_pages": total_pages,
            "current_page": page,
            "per_page": per_page,
            "data": data,
        })),
    )
        .into_response()
}

pub async fn get_order(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: EntityId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid order id"),
    };

    match services.orders_get(OrderId::new(id)) {
        Ok(order) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "status": "success",
                "data": dto::order_to_json(&order),
            })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn create_order(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateOrderRequest>,
) -> axum::response::Response {
    let request = match validate::validate_create_order(&body) {
        Ok(request) => request,
        Err(field_errors) => return errors::validation_error(field_errors),
    };

    match services.create_order(&request) {
        Ok(order) => (
            StatusCode::CREATED,
            Json(serde_json::json!({ "order_id": order.id_typed().to_string() })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

/// The full flow: create → confirm → deliver → (return) → invoice.
pub async fn fulfill_order(
    Extension(services): Extension<Arc<AppServices>>,
    Json(body): Json<dto::CreateOrderRequest>,
) -> axum::response::Response {
    let request = match validate::validate_create_order(&body) {
        Ok(request) => request,
        Err(field_errors) => return errors::validation_error(field_errors),
    };

    match services.fulfill(&request) {
        Ok(outcome) => (StatusCode::OK, Json(dto::outcome_to_json(&outcome))).into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn update_order(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
    Json(body): Json<dto::UpdateOrderRequest>,
) -> axum::response::Response {
    let id: EntityId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid order id"),
    };

    let patch = match validate::validate_update_order(&body) {
        Ok(patch) => patch,
        Err(field_errors) => return errors::validation_error(field_errors),
    };

    match services.orders_update(OrderId::new(id), patch) {
        Ok(order) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "status": "success",
                "order_id": order.id_typed().to_string(),
            })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}

pub async fn delete_order(
    Extension(services): Extension<Arc<AppServices>>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id: EntityId = match id.parse() {
        Ok(v) => v,
        Err(_) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid order id"),
    };

    match services.orders_delete(OrderId::new(id)) {
        Ok(()) => (
            StatusCode::OK,
            Json(serde_json::json!({
                "status": "success",
                "message": "Order deleted successfully.",
            })),
        )
            .into_response(),
        Err(e) => errors::domain_error_to_response(e),
    }
}
