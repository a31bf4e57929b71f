use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Row in the `appointments` table. (doctor_id, date) is unique; rows are
/// created at booking time and never mutated.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppointmentRecord {
    pub id: i64,
    pub user_id: Uuid,
    pub doctor_id: i64,
    pub date: NaiveDate,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BookAppointmentRequest {
    pub doctor_id: Option<i64>,
    pub date: Option<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum BookingError {
    #[error("Invalid date format. Use YYYY-MM-DD.")]
    InvalidDate,

    #[error("Doctor not found")]
    DoctorNotFound,

    #[error("Doctor is already booked for this date.")]
    AlreadyBooked,

    #[error("Database error: {0}")]
    Database(String),
}
