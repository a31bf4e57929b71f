use std::sync::Arc;

use axum::{
    extract::{Query, State},
    Json,
};
use chrono::NaiveDate;
use serde_json::{json, Value};

use shared_config::AppConfig;
use shared_models::error::AppError;

use crate::models::{AvailabilityFilter, AvailableDoctorsQuery, DoctorError};
use crate::services::availability::{parse_specialization_ids, AvailabilityService};

fn map_doctor_error(err: DoctorError) -> AppError {
    match err {
        DoctorError::InvalidDate => AppError::BadRequest(err.to_string()),
        DoctorError::InvalidQuery(msg) => AppError::BadRequest(msg),
        DoctorError::NotFound => AppError::NotFound("Doctor not found".to_string()),
        DoctorError::Database(msg) => AppError::Database(msg),
    }
}

#[axum::debug_handler]
pub async fn list_specializations(
    State(state): State<Arc<AppConfig>>,
) -> Result<Json<Value>, AppError> {
    let service = AvailabilityService::new(&state);
    let specializations = service
        .list_specializations()
        .await
        .map_err(map_doctor_error)?;

    Ok(Json(json!(specializations)))
}

/// Doctors filtered by location and specializations, with anyone already
/// booked on the requested date removed.
#[axum::debug_handler]
pub async fn available_doctors(
    State(state): State<Arc<AppConfig>>,
    Query(params): Query<AvailableDoctorsQuery>,
) -> Result<Json<Value>, AppError> {
    let date = params
        .date
        .as_deref()
        .and_then(|raw| NaiveDate::parse_from_str(raw, "%Y-%m-%d").ok())
        .ok_or_else(|| AppError::BadRequest("Invalid date format. Use YYYY-MM-DD.".to_string()))?;

    let specialization_ids = parse_specialization_ids(params.specializations.as_deref())
        .map_err(map_doctor_error)?;

    let service = AvailabilityService::new(&state);
    let doctors = service
        .find_available_doctors(AvailabilityFilter {
            location: params.location,
            specialization_ids,
            date,
        })
        .await
        .map_err(map_doctor_error)?;

    Ok(Json(json!(doctors)))
}
