use crate::handlers::common::{created_response, map_service_error, validate_input};
use crate::{
    auth::AuthUser, errors::ApiError, services::deliveries::CreateDeliveryInput, AppState,
};
use axum::{
    extract::{Json, Path, State},
    Extension,
};
use serde::Deserialize;
use serde_json::json;
use uuid::Uuid;
use validator::Validate;

/// Attach delivery details to the caller's pending order
pub async fn create_delivery(
    State(state): State<AppState>,
    Extension(user): Extension<AuthUser>,
    Path(order_id): Path<Uuid>,
    Json(payload): Json<CreateDeliveryRequest>,
) -> Result<impl axum::response::IntoResponse, ApiError> {
    validate_input(&payload)?;

    let input = CreateDeliveryInput {
        address: payload.address,
        pickup_branch: payload.pickup_branch,
    };

    let delivery = state
        .services
        .deliveries
        .create_delivery(user.user_id, order_id, input)
        .await
        .map_err(map_service_error)?;

    Ok(created_response(json!({
        "message": "Delivery details successfully created",
        "delivery": delivery,
    })))
}

// Request DTOs

#[derive(Debug, Deserialize, Validate)]
pub struct CreateDeliveryRequest {
    #[validate(length(min = 1))]
    pub address: String,
    pub pickup_branch: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_address_fails_validation() {
        let request = CreateDeliveryRequest {
            address: String::new(),
            pickup_branch: None,
        };
        assert!(request.validate().is_err());
    }
}
