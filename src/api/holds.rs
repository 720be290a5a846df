use super::AppState;
use crate::{
    error::{AppError, Result},
    models::ApiResponse,
    services::HoldService,
};
use axum::{extract::State, http::StatusCode, Json};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Deserialize)]
pub struct CreateHoldRequest {
    pub product_id: Option<i64>,
    pub quantity: Option<i64>,
}

#[derive(Debug, Serialize)]
pub struct HoldCreatedResponse {
    pub hold_id: i64,
    pub expires_at: DateTime<Utc>,
}

// Internal helper that checks conditions for `validate_create_hold`.
fn validate_create_hold(req: &CreateHoldRequest) -> Result<(i64, i32)> {
    let Some(product_id) = req.product_id else {
        return Err(AppError::Validation("product_id is required".to_string()));
    };
    let Some(quantity) = req.quantity else {
        return Err(AppError::Validation("quantity is required".to_string()));
    };
    if quantity < 1 {
        return Err(AppError::Validation(
            "quantity must be at least 1".to_string(),
        ));
    }
    if quantity > i32::MAX as i64 {
        return Err(AppError::Validation("quantity is out of range".to_string()));
    }
    Ok((product_id, quantity as i32))
}

/// POST /holds
pub async fn create_hold(
    State(state): State<AppState>,
    Json(req): Json<CreateHoldRequest>,
) -> Result<(StatusCode, Json<ApiResponse<HoldCreatedResponse>>)> {
    let (product_id, quantity) = validate_create_hold(&req)?;

    if !state.db.product_exists(product_id).await? {
        return Err(AppError::Validation(
            "The selected product_id is invalid".to_string(),
        ));
    }

    let service = HoldService::new(state.db.clone(), state.product_cache(), state.config.clone());
    let created = service.create_hold(product_id, quantity).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::success(HoldCreatedResponse {
            hold_id: created.hold_id,
            expires_at: created.expires_at,
        })),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validates_a_wellformed_request() {
        let req = CreateHoldRequest {
            product_id: Some(1),
            quantity: Some(3),
        };
        assert_eq!(validate_create_hold(&req).unwrap(), (1, 3));
    }

    #[test]
    fn rejects_missing_product_id() {
        let req = CreateHoldRequest {
            product_id: None,
            quantity: Some(1),
        };
        let err = validate_create_hold(&req).unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }

    #[test]
    fn rejects_zero_and_negative_quantity() {
        for quantity in [0, -1, -100] {
            let req = CreateHoldRequest {
                product_id: Some(1),
                quantity: Some(quantity),
            };
            let err = validate_create_hold(&req).unwrap_err();
            assert!(matches!(err, AppError::Validation(_)), "quantity {}", quantity);
        }
    }

    #[test]
    fn rejects_quantity_beyond_i32() {
        let req = CreateHoldRequest {
            product_id: Some(1),
            quantity: Some(i64::from(i32::MAX) + 1),
        };
        assert!(validate_create_hold(&req).is_err());
    }
}
