use crate::handlers::common::{map_service_error, success_response, validate_input};
use crate::{auth::AuthUser, errors::ApiError, services::cart::AddToCartInput, AppState};
use axum::{
    extract::{Json, Path, State},
    Extension,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

/// Get the caller's cart (the pending order) with its lines
pub async fn get_cart(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let cart = state
        .services
        .cart
        .get_cart(user.user_id)
        .await
        .map_err(map_service_error)?;

    match cart {
        Some(cart) => Ok(success_response(json!({ "cart": cart }))),
        None => Err(ApiError::NotFound(
            "You have not added anything to your cart yet".to_string(),
        )),
    }
}

/// Add an item to the caller's cart
pub async fn add_to_cart(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Json(payload): Json<AddItemRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let input = AddToCartInput {
        category_id: payload.category_id,
        quantity: payload.quantity,
    };

    let order = state
        .services
        .cart
        .add_item(user.user_id, input)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(json!({
        "message": "Item added to cart",
        "order": order,
    })))
}

/// Remove one line from the caller's cart
pub async fn remove_from_cart(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(order_item_id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let order = state
        .services
        .cart
        .remove_item(user.user_id, order_item_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(json!({
        "message": "Item removed from cart",
        "order": order,
    })))
}

/// Empty the caller's cart
pub async fn clear_cart(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    state
        .services
        .cart
        .clear_cart(user.user_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(json!({
        "message": "Cart cleared successfully"
    })))
}

// Request DTOs

#[derive(Debug, Deserialize, Validate)]
pub struct AddItemRequest {
    pub category_id: Uuid,
    #[validate(range(min = 1))]
    pub quantity: i32,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn add_item_request_rejects_zero_quantity() {
        let request = AddItemRequest {
            category_id: Uuid::new_v4(),
            quantity: 0,
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn add_item_request_accepts_positive_quantity() {
        let request = AddItemRequest {
            category_id: Uuid::new_v4(),
            quantity: 2,
        };
        assert!(request.validate().is_ok());
    }
}
