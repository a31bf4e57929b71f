use std::sync::Arc;

use axum::{extract::State, Extension, Json};
use serde_json::{json, Value};
use shared_config::AppConfig;
use shared_models::{auth::User, error::AppError};

use crate::models::{ContactRequest, NotificationError};
use crate::services::contact::ContactService;

fn map_notification_error(err: NotificationError) -> AppError {
    match err {
        NotificationError::MissingFields => {
            AppError::BadRequest("All fields are required.".to_string())
        }
        NotificationError::NotConfigured | NotificationError::Mail(_) => {
            AppError::ExternalService("Mail delivery failed".to_string())
        }
        NotificationError::Database(msg) => AppError::Database(msg),
    }
}

#[axum::debug_handler]
pub async fn contact(
    State(config): State<Arc<AppConfig>>,
    Extension(_user): Extension<User>,
    Json(payload): Json<ContactRequest>,
) -> Result<Json<Value>, AppError> {
    let name = payload.name.unwrap_or_default();
    let email = payload.email.unwrap_or_default();
    let message = payload.message.unwrap_or_default();

    let service = ContactService::new(&config);
    service
        .submit(&name, &email, &message)
        .await
        .map_err(map_notification_error)?;

    Ok(Json(json!({ "message": "Message sent successfully" })))
}
