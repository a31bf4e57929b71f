use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Specialization {
    pub id: i64,
    pub name: String,
}

/// Row in the `doctors` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorRecord {
    pub id: i64,
    pub name: String,
    pub location: String,
    pub qualification: Option<String>,
    pub fees: Option<f64>,
    pub description: Option<String>,
}

/// Join row in `doctor_specialties`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorSpecialtyRow {
    pub doctor_id: i64,
    pub specialization_id: i64,
}

/// Doctor as served to clients, with specialties embedded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DoctorResponse {
    pub id: i64,
    pub name: String,
    pub specialties: Vec<Specialization>,
    pub location: String,
    pub fees: Option<f64>,
    pub qualification: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct AvailableDoctorsQuery {
    pub location: Option<String>,
    /// Comma-separated specialization ids, e.g. "1,3".
    pub specializations: Option<String>,
    pub date: Option<String>,
}

#[derive(Debug, Clone)]
pub struct AvailabilityFilter {
    pub location: Option<String>,
    pub specialization_ids: Vec<i64>,
    pub date: NaiveDate,
}

#[derive(Debug, thiserror::Error)]
pub enum DoctorError {
    #[error("Invalid date format. Use YYYY-MM-DD.")]
    InvalidDate,

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Doctor not found")]
    NotFound,

    #[error("Database error: {0}")]
    Database(String),
}
