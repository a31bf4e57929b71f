use std::sync::Arc;

use axum::{extract::State, Extension, Json};
use shared_config::AppConfig;
use shared_models::{auth::User, error::AppError};
use uuid::Uuid;

use crate::models::{Buyer, CheckoutError, CheckoutRequest, CheckoutResponse, PurchaseRecord};
use crate::services::checkout::{CheckoutService, PurchaseLedger};

fn map_checkout_error(err: CheckoutError) -> AppError {
    match err {
        CheckoutError::NotConfigured => {
            AppError::ExternalService("Payments are not configured".to_string())
        }
        CheckoutError::UnknownPurchaseType(t) => {
            AppError::BadRequest(format!("Unknown purchase type: {}", t))
        }
        CheckoutError::EmptyItems => AppError::BadRequest("No items to check out".to_string()),
        CheckoutError::MalformedItem(field) => {
            AppError::BadRequest(format!("Missing field: {}", field))
        }
        CheckoutError::DoctorNotFound => AppError::BadRequest("Doctor not found".to_string()),
        CheckoutError::Stripe(msg) => {
            tracing::error!(error = %msg, "Checkout session creation failed");
            AppError::ExternalService("Payment provider error".to_string())
        }
        CheckoutError::Database(msg) => AppError::Database(msg),
    }
}

fn buyer_from(user: &User) -> Result<Buyer, AppError> {
    let id = Uuid::parse_str(&user.id)
        .map_err(|_| AppError::BadRequest("Invalid user id".to_string()))?;
    let email = user
        .email
        .clone()
        .ok_or_else(|| AppError::BadRequest("Account has no email address".to_string()))?;
    let name = user.username.clone().unwrap_or_else(|| email.clone());

    Ok(Buyer { id, email, name })
}

#[axum::debug_handler]
pub async fn create_checkout_session(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Json(payload): Json<CheckoutRequest>,
) -> Result<Json<CheckoutResponse>, AppError> {
    let buyer = buyer_from(&user)?;
    let purchase_type = payload
        .purchase_type
        .ok_or_else(|| AppError::BadRequest("Missing field: purchase_type".to_string()))?;

    let service = CheckoutService::new(&state).map_err(map_checkout_error)?;
    let session_id = service
        .create_session(&buyer, &purchase_type, &payload.items)
        .await
        .map_err(map_checkout_error)?;

    Ok(Json(CheckoutResponse { session_id }))
}

#[axum::debug_handler]
pub async fn list_purchases(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
) -> Result<Json<Vec<PurchaseRecord>>, AppError> {
    let user_id = Uuid::parse_str(&user.id)
        .map_err(|_| AppError::BadRequest("Invalid user id".to_string()))?;

    let ledger = PurchaseLedger::new(&state);
    let purchases = ledger
        .list_for_user(user_id)
        .await
        .map_err(map_checkout_error)?;
    Ok(Json(purchases))
}
