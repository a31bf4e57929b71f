use std::sync::Arc;

use chrono::NaiveDate;
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, warn};

use shared_database::supabase::SupabaseClient;

use crate::models::BookingError;

/// Availability is a row-existence check over (doctor_id, date). The check
/// is not atomic with the subsequent insert; the table's uniqueness
/// constraint is the backstop for concurrent bookings of the same slot.
pub struct ConflictDetectionService {
    supabase: Arc<SupabaseClient>,
}

impl ConflictDetectionService {
    pub fn new(supabase: Arc<SupabaseClient>) -> Self {
        Self { supabase }
    }

    pub async fn is_booked(&self, doctor_id: i64, date: NaiveDate) -> Result<bool, BookingError> {
        debug!("Checking availability for doctor {} on {}", doctor_id, date);

        let path = format!(
            "/rest/v1/appointments?doctor_id=eq.{}&date=eq.{}&select=id",
            doctor_id, date
        );

        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| BookingError::Database(e.to_string()))?;

        let booked = !rows.is_empty();
        if booked {
            warn!("Doctor {} already booked on {}", doctor_id, date);
        }

        Ok(booked)
    }
}
