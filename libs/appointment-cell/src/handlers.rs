use std::sync::Arc;

use axum::{
    extract::{Extension, State},
    http::StatusCode,
    Json,
};
use serde_json::{json, Value};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;
use shared_models::error::AppError;

use crate::models::{BookAppointmentRequest, BookingError};
use crate::services::booking::{parse_appointment_date, BookingService};

fn map_booking_error(err: BookingError) -> AppError {
    match err {
        BookingError::InvalidDate => AppError::BadRequest(err.to_string()),
        BookingError::DoctorNotFound => AppError::NotFound("Doctor not found".to_string()),
        BookingError::AlreadyBooked => {
            AppError::BadRequest("Doctor is already booked for this date.".to_string())
        }
        BookingError::Database(msg) => AppError::Database(msg),
    }
}

#[axum::debug_handler]
pub async fn book_appointment(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
    Json(request): Json<BookAppointmentRequest>,
) -> Result<(StatusCode, Json<Value>), AppError> {
    let user_id = Uuid::parse_str(&user.id)
        .map_err(|_| AppError::BadRequest("Invalid user id".to_string()))?;

    let doctor_id = request
        .doctor_id
        .ok_or_else(|| AppError::BadRequest("doctor_id is required".to_string()))?;

    let date = parse_appointment_date(request.date.as_deref()).map_err(map_booking_error)?;

    let service = BookingService::new(&state);
    let appointment = service
        .book_appointment(user_id, doctor_id, date)
        .await
        .map_err(map_booking_error)?;

    Ok((StatusCode::CREATED, Json(json!(appointment))))
}

#[axum::debug_handler]
pub async fn list_appointments(
    State(state): State<Arc<AppConfig>>,
    Extension(user): Extension<User>,
) -> Result<Json<Value>, AppError> {
    let user_id = Uuid::parse_str(&user.id)
        .map_err(|_| AppError::BadRequest("Invalid user id".to_string()))?;

    let service = BookingService::new(&state);
    let appointments = service.list_for_user(user_id).await.map_err(map_booking_error)?;

    Ok(Json(json!(appointments)))
}
