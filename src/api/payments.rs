use super::AppState;
use crate::{
    constants::MAX_IDEMPOTENCY_KEY_LEN,
    error::{AppError, Result},
    models::PaymentStatus,
    services::{webhook_processor::WebhookAck, WebhookProcessor},
};
use axum::{extract::State, Json};
use serde_json::Value;

#[derive(Debug)]
struct WebhookInput {
    idempotency_key: String,
    order_id: i64,
    payment_status: PaymentStatus,
}

// Internal helper that parses or transforms values for `validate_webhook_payload`.
// The body is kept as raw JSON because the whole delivery, known fields or
// not, is persisted verbatim in the webhook log.
fn validate_webhook_payload(payload: &Value) -> Result<WebhookInput> {
    let Some(body) = payload.as_object() else {
        return Err(AppError::Validation(
            "request body must be a JSON object".to_string(),
        ));
    };

    let idempotency_key = body
        .get("idempotency_key")
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|key| !key.is_empty())
        .ok_or_else(|| AppError::Validation("idempotency_key is required".to_string()))?;
    if idempotency_key.chars().count() > MAX_IDEMPOTENCY_KEY_LEN {
        return Err(AppError::Validation(format!(
            "idempotency_key must not exceed {} characters",
            MAX_IDEMPOTENCY_KEY_LEN
        )));
    }

    let order_id = body
        .get("order_id")
        .and_then(Value::as_i64)
        .ok_or_else(|| {
            AppError::Validation("order_id is required and must be an integer".to_string())
        })?;

    let payment_status = body
        .get("payment_status")
        .and_then(Value::as_str)
        .and_then(PaymentStatus::parse)
        .ok_or_else(|| {
            AppError::Validation("payment_status must be one of: success, failure".to_string())
        })?;

    Ok(WebhookInput {
        idempotency_key: idempotency_key.to_string(),
        order_id,
        payment_status,
    })
}

/// POST /payments/webhook
pub async fn process_webhook(
    State(state): State<AppState>,
    Json(payload): Json<Value>,
) -> Result<Json<WebhookAck>> {
    let input = validate_webhook_payload(&payload)?;

    let processor = WebhookProcessor::new(state.db.clone(), state.product_cache());
    let ack = processor
        .process_webhook(
            &input.idempotency_key,
            input.order_id,
            input.payment_status,
            &payload,
        )
        .await?;

    Ok(Json(ack))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn accepts_a_wellformed_delivery() {
        let payload = json!({
            "idempotency_key": "k1",
            "order_id": 42,
            "payment_status": "success",
            "provider_ref": "psp_123"
        });
        let input = validate_webhook_payload(&payload).unwrap();
        assert_eq!(input.idempotency_key, "k1");
        assert_eq!(input.order_id, 42);
        assert_eq!(input.payment_status, PaymentStatus::Success);
    }

    #[test]
    fn rejects_missing_or_empty_key() {
        for payload in [
            json!({ "order_id": 1, "payment_status": "success" }),
            json!({ "idempotency_key": "", "order_id": 1, "payment_status": "success" }),
            json!({ "idempotency_key": "   ", "order_id": 1, "payment_status": "success" }),
        ] {
            assert!(validate_webhook_payload(&payload).is_err());
        }
    }

    #[test]
    fn enforces_key_length_cap() {
        let at_cap = json!({
            "idempotency_key": "k".repeat(255),
            "order_id": 1,
            "payment_status": "failure"
        });
        assert!(validate_webhook_payload(&at_cap).is_ok());

        let over_cap = json!({
            "idempotency_key": "k".repeat(256),
            "order_id": 1,
            "payment_status": "failure"
        });
        assert!(validate_webhook_payload(&over_cap).is_err());
    }

    #[test]
    fn rejects_non_integer_order_id() {
        let payload = json!({
            "idempotency_key": "k1",
            "order_id": "42",
            "payment_status": "success"
        });
        assert!(validate_webhook_payload(&payload).is_err());
    }

    #[test]
    fn rejects_unknown_payment_status() {
        for status in ["refunded", "SUCCESS", ""] {
            let payload = json!({
                "idempotency_key": "k1",
                "order_id": 1,
                "payment_status": status
            });
            assert!(validate_webhook_payload(&payload).is_err(), "status {:?}", status);
        }
    }

    #[test]
    fn rejects_non_object_body() {
        assert!(validate_webhook_payload(&json!([1, 2, 3])).is_err());
        assert!(validate_webhook_payload(&json!("payload")).is_err());
    }
}
