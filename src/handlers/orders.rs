use crate::handlers::common::{created_response, map_service_error, success_response, validate_input};
use crate::{
    auth::AuthUser,
    entities::order::OrderStatus,
    errors::ApiError,
    services::{payments::PaymentInput, ratings::RateOrderInput},
    AppState,
};
use axum::{
    extract::{Json, Path, Query, State},
    Extension,
};
use serde::Deserialize;
use serde_json::json;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// The caller's order history, optionally filtered by `?status=`
pub async fn order_history(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Query(params): Query<HistoryQuery>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let status = parse_status_filter(params.status.as_deref())?;

    let orders = state
        .services
        .orders
        .history_for_user(user.user_id, status)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(json!({
        "message": "Filtered order history retrieved successfully",
        "orders": orders,
    })))
}

/// Cancel the caller's pending order
pub async fn cancel_order(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(order_id): Path<Uuid>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    let order = state
        .services
        .orders
        .cancel_order(user.user_id, order_id)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(json!({
        "message": "Order cancelled",
        "order": order,
    })))
}

/// Pay the caller's pending order
pub async fn pay_order(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(order_id): Path<Uuid>,
    Json(payload): Json<PayOrderRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let input = PaymentInput {
        amount_cents: payload.amount_cents,
        card_number: payload.card_number,
        card_holder: payload.card_holder,
        security_code: payload.security_code,
        payment_method: payload.payment_method,
    };

    let outcome = state
        .services
        .payments
        .process_payment(user.user_id, order_id, input)
        .await
        .map_err(map_service_error)?;

    Ok(success_response(json!({
        "message": "Payment successful",
        "payment": outcome.payment,
        "order": outcome.order,
        "delivery": outcome.delivery,
    })))
}

/// Rate the caller's delivered order
pub async fn rate_order(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(order_id): Path<Uuid>,
    Json(payload): Json<RateOrderRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let input = RateOrderInput {
        score: payload.score,
        comment: payload.comment,
    };

    let rating = state
        .services
        .ratings
        .rate_order(user.user_id, order_id, input)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(json!({
        "message": "Rating successfully created",
        "rating": rating,
    })))
}

pub(crate) fn parse_status_filter(raw: Option<&str>) -> Result<Option<OrderStatus>, ApiError> {
    match raw {
        None => Ok(None),
        Some(value) => OrderStatus::from_str(value).map(Some).map_err(|_| {
            ApiError::ValidationError(format!("Unknown order status '{}'", value))
        }),
    }
}

// Request DTOs

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub status: Option<String>,
}

#[derive(Debug, Deserialize, Validate)]
pub struct PayOrderRequest {
    #[validate(range(min = 1))]
    pub amount_cents: i64,
    #[validate(length(min = 4, max = 32))]
    pub card_number: String,
    #[validate(length(min = 1))]
    pub card_holder: String,
    #[validate(length(min = 3, max = 4))]
    pub security_code: String,
    #[validate(length(min = 1))]
    pub payment_method: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct RateOrderRequest {
    #[validate(range(min = 1, max = 5))]
    pub score: i32,
    pub comment: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_filter_parses_known_values() {
        assert_eq!(
            parse_status_filter(Some("pending")).unwrap(),
            Some(OrderStatus::Pending)
        );
        assert_eq!(parse_status_filter(None).unwrap(), None);
    }

    #[test]
    fn status_filter_rejects_unknown_values() {
        assert!(parse_status_filter(Some("shipped")).is_err());
    }

    #[test]
    fn rate_request_bounds_are_validated() {
        let bad = RateOrderRequest {
            score: 6,
            comment: None,
        };
        assert!(bad.validate().is_err());

        let good = RateOrderRequest {
            score: 4,
            comment: Some("ok".into()),
        };
        assert!(good.validate().is_ok());
    }

    #[test]
    fn pay_request_requires_positive_amount() {
        let request = PayOrderRequest {
            amount_cents: 0,
            card_number: "4242424242424242".into(),
            card_holder: "Ana".into(),
            security_code: "123".into(),
            payment_method: "credit_card".into(),
        };
        assert!(request.validate().is_err());
    }
}
