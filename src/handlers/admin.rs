use crate::handlers::common::{created_response, map_service_error, success_response, validate_input};
use crate::handlers::orders::parse_status_filter;
use crate::{
    entities::{delivery::DeliveryStatus, order::OrderStatus},
    errors::ApiError,
    services::catalog::CreateCategoryInput,
    AppState,
};
use axum::{
    extract::{Json, Path, Query, State},
    routing::{delete, get, post, put},
    Router,
};
use serde::Deserialize;
use serde_json::json;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// Routes for the admin console. Role gating happens where these are mounted.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_orders))
        .route("/orders/pending", get(list_pending_orders))
        .route("/orders/{id}", get(get_order))
        .route("/orders/{id}/status", put(update_order_status))
        .route("/deliveries/{id}/status", put(update_delivery_status))
        .route("/categories", post(create_category))
        .route("/categories/{id}/price", put(update_category_price))
        .route("/categories/{id}/image", put(update_category_image))
        .route("/categories/{id}", delete(delete_category))
        .route("/users", get(list_users))
        .route("/users/{id}", get(get_user).delete(delete_user))
}

/// All orders across users, optionally filtered by `?status=`
async fn list_orders(
    State(state): State<AppState>,
    Query(params): Query<AdminOrdersQuery>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let status = parse_status_filter(params.status.as_deref())?;

    let orders = state
        .services
        .orders
        .list_all(status)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(json!({
        "message": "Filtered order history retrieved successfully",
        "orders": orders,
    })))
}

/// Orders still awaiting payment
async fn list_pending_orders(
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let orders = state
        .services
        .orders
        .list_pending()
        .await
        .map_err(map_service_error)?;

    Ok(success_response(json!({
        "message": "Pending orders retrieved successfully",
        "orders": orders,
    })))
}

/// One order with its lines and delivery
async fn get_order(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let detail = state
        .services
        .orders
        .get_order_detail(order_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(detail))
}

/// Move an order along its lifecycle
async fn update_order_status(
    State(state): State<AppState>,
    Path(order_id): Path<Uuid>,
    Json(payload): Json<UpdateOrderStatusRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let status = OrderStatus::from_str(&payload.status)
        .ok()
        .filter(|s| *s != OrderStatus::Cancelled)
        .ok_or_else(|| {
            ApiError::ValidationError(
                "status must be one of pending, processed, delivered".to_string(),
            )
        })?;

    let order = state
        .services
        .orders
        .update_status(order_id, status)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(json!({
        "message": "Order status updated successfully",
        "order": order,
    })))
}

/// Move a delivery along its status track
async fn update_delivery_status(
    State(state): State<AppState>,
    Path(delivery_id): Path<Uuid>,
    Json(payload): Json<UpdateDeliveryStatusRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let status = DeliveryStatus::from_str(&payload.status).map_err(|_| {
        ApiError::ValidationError(
            "status must be one of pending, in_transit, delivered".to_string(),
        )
    })?;

    let delivery = state
        .services
        .deliveries
        .update_status(delivery_id, status)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(json!({
        "message": "Delivery status updated successfully",
        "delivery": delivery,
    })))
}

/// Add a category to the catalog
async fn create_category(
    State(state): State<AppState>,
    Json(payload): Json<CreateCategoryRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let input = CreateCategoryInput {
        name: payload.name,
        price_cents: payload.price_cents,
        image: payload.image,
    };

    let category = state
        .services
        .catalog
        .create_category(input)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(json!({
        "message": "Category created successfully",
        "category": category,
    })))
}

async fn update_category_price(
    State(state): State<AppState>,
    Path(category_id): Path<Uuid>,
    Json(payload): Json<UpdatePriceRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let category = state
        .services
        .catalog
        .update_price(category_id, payload.price_cents)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(json!({
        "message": "Price updated successfully",
        "category": category,
    })))
}

async fn update_category_image(
    State(state): State<AppState>,
    Path(category_id): Path<Uuid>,
    Json(payload): Json<UpdateImageRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let category = state
        .services
        .catalog
        .update_image(category_id, payload.image)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(json!({
        "message": "Category image updated successfully",
        "category": category,
    })))
}

async fn delete_category(
    State(state): State<AppState>,
    Path(category_id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    state
        .services
        .catalog
        .delete_category(category_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(json!({
        "message": "Category deleted successfully"
    })))
}

async fn list_users(
    State(state): State<AppState>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let users = state
        .services
        .users
        .list_users()
        .await
        .map_err(map_service_error)?;

    Ok(success_response(json!({ "users": users })))
}

async fn get_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let user_with_orders = state
        .services
        .users
        .get_user_with_orders(user_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(user_with_orders))
}

async fn delete_user(
    State(state): State<AppState>,
    Path(user_id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    state
        .services
        .users
        .delete_user(user_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(json!({
        "message": "User has been deleted successfully"
    })))
}

// Request DTOs

#[derive(Debug, Deserialize)]
pub struct AdminOrdersQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateOrderStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize)]
pub struct UpdateDeliveryStatusRequest {
    pub status: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct CreateCategoryRequest {
    #[validate(length(min = 1))]
    pub name: String,
    #[validate(range(min = 0))]
    pub price_cents: i64,
    #[validate(length(min = 1, max = 255))]
    pub image: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdatePriceRequest {
    #[validate(range(min = 0))]
    pub price_cents: i64,
}

#[derive(Debug, Deserialize, Validate)]
pub struct UpdateImageRequest {
    #[validate(length(min = 1, max = 255))]
    pub image: String,
}
