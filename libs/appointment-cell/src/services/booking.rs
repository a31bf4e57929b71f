use std::sync::Arc;

use chrono::NaiveDate;
use reqwest::Method;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use doctor_cell::models::DoctorError;
use doctor_cell::services::availability::AvailabilityService;

use crate::models::{AppointmentRecord, BookingError};
use crate::services::conflict::ConflictDetectionService;

pub struct BookingService {
    supabase: Arc<SupabaseClient>,
    conflict_service: ConflictDetectionService,
    doctor_service: AvailabilityService,
}

impl BookingService {
    pub fn new(config: &AppConfig) -> Self {
        let supabase = Arc::new(SupabaseClient::new(config));
        let conflict_service = ConflictDetectionService::new(Arc::clone(&supabase));
        let doctor_service = AvailabilityService::new(config);

        Self {
            supabase,
            conflict_service,
            doctor_service,
        }
    }

    /// Book `doctor_id` for `user_id` on `date`. One appointment per
    /// (doctor, date); a taken slot is rejected before the insert, and a
    /// concurrent duplicate surfaces as the same error via the unique
    /// constraint.
    pub async fn book_appointment(
        &self,
        user_id: Uuid,
        doctor_id: i64,
        date: NaiveDate,
    ) -> Result<AppointmentRecord, BookingError> {
        self.doctor_service
            .get_doctor(doctor_id)
            .await
            .map_err(|e| match e {
                DoctorError::NotFound => BookingError::DoctorNotFound,
                other => BookingError::Database(other.to_string()),
            })?;

        if self.conflict_service.is_booked(doctor_id, date).await? {
            return Err(BookingError::AlreadyBooked);
        }

        let appointment_data = json!({
            "user_id": user_id,
            "doctor_id": doctor_id,
            "date": date.to_string(),
        });

        let created: Vec<AppointmentRecord> = self
            .supabase
            .insert_returning("/rest/v1/appointments", appointment_data)
            .await
            .map_err(|e| {
                if SupabaseClient::is_conflict(&e) {
                    BookingError::AlreadyBooked
                } else {
                    BookingError::Database(e.to_string())
                }
            })?;

        let appointment = created
            .into_iter()
            .next()
            .ok_or_else(|| BookingError::Database("Failed to create appointment".to_string()))?;

        info!(
            "Appointment {} booked: doctor {} on {}",
            appointment.id, doctor_id, date
        );
        Ok(appointment)
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<AppointmentRecord>, BookingError> {
        let path = format!(
            "/rest/v1/appointments?user_id=eq.{}&order=date.desc",
            user_id
        );

        self.supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| BookingError::Database(e.to_string()))
    }
}

/// Strict YYYY-MM-DD parsing; anything else is a client error.
pub fn parse_appointment_date(raw: Option<&str>) -> Result<NaiveDate, BookingError> {
    raw.and_then(|value| NaiveDate::parse_from_str(value, "%Y-%m-%d").ok())
        .ok_or(BookingError::InvalidDate)
}
