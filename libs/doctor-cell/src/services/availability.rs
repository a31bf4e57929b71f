use std::collections::{HashMap, HashSet};
use std::sync::Arc;

use chrono::NaiveDate;
use reqwest::Method;
use serde_json::Value;
use tracing::debug;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{
    AvailabilityFilter, DoctorError, DoctorRecord, DoctorResponse, DoctorSpecialtyRow,
    Specialization,
};

pub struct AvailabilityService {
    supabase: Arc<SupabaseClient>,
}

impl AvailabilityService {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: Arc::new(SupabaseClient::new(config)),
        }
    }

    pub async fn list_specializations(&self) -> Result<Vec<Specialization>, DoctorError> {
        self.supabase
            .request(Method::GET, "/rest/v1/specializations?order=id.asc", None)
            .await
            .map_err(|e| DoctorError::Database(e.to_string()))
    }

    pub async fn get_doctor(&self, doctor_id: i64) -> Result<DoctorRecord, DoctorError> {
        let path = format!("/rest/v1/doctors?id=eq.{}", doctor_id);
        let result: Vec<DoctorRecord> = self
            .supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| DoctorError::Database(e.to_string()))?;

        result.into_iter().next().ok_or(DoctorError::NotFound)
    }

    /// Doctors matching location and specializations that have no
    /// appointment on the given date.
    pub async fn find_available_doctors(
        &self,
        filter: AvailabilityFilter,
    ) -> Result<Vec<DoctorResponse>, DoctorError> {
        let doctors = self.fetch_doctors(filter.location.as_deref()).await?;
        let specialty_rows = self.fetch_specialty_rows(&filter.specialization_ids).await?;

        // Restrict to doctors holding at least one requested specialization.
        let matching_ids: HashSet<i64> = specialty_rows.iter().map(|r| r.doctor_id).collect();
        let mut candidates: Vec<DoctorRecord> = doctors
            .into_iter()
            .filter(|d| filter.specialization_ids.is_empty() || matching_ids.contains(&d.id))
            .collect();

        if candidates.is_empty() {
            return Ok(vec![]);
        }

        let booked = self
            .booked_doctor_ids(&candidates.iter().map(|d| d.id).collect::<Vec<_>>(), filter.date)
            .await?;

        candidates.retain(|d| !booked.contains(&d.id));

        debug!(
            "{} doctors available on {} after conflict filtering",
            candidates.len(),
            filter.date
        );

        self.embed_specialties(candidates).await
    }

    /// Doctor ids among `doctor_ids` that already hold an appointment on `date`.
    pub async fn booked_doctor_ids(
        &self,
        doctor_ids: &[i64],
        date: NaiveDate,
    ) -> Result<HashSet<i64>, DoctorError> {
        if doctor_ids.is_empty() {
            return Ok(HashSet::new());
        }

        let id_list = doctor_ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let path = format!(
            "/rest/v1/appointments?doctor_id=in.({})&date=eq.{}&select=doctor_id",
            id_list, date
        );

        let rows: Vec<Value> = self
            .supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| DoctorError::Database(e.to_string()))?;

        Ok(rows
            .iter()
            .filter_map(|row| row["doctor_id"].as_i64())
            .collect())
    }

    async fn fetch_doctors(&self, location: Option<&str>) -> Result<Vec<DoctorRecord>, DoctorError> {
        let path = match location {
            Some(location) => format!(
                "/rest/v1/doctors?location=eq.{}&order=id.asc",
                urlencoding::encode(location)
            ),
            None => "/rest/v1/doctors?order=id.asc".to_string(),
        };

        self.supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| DoctorError::Database(e.to_string()))
    }

    async fn fetch_specialty_rows(
        &self,
        specialization_ids: &[i64],
    ) -> Result<Vec<DoctorSpecialtyRow>, DoctorError> {
        if specialization_ids.is_empty() {
            return Ok(vec![]);
        }

        let id_list = specialization_ids
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let path = format!("/rest/v1/doctor_specialties?specialization_id=in.({})", id_list);

        self.supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| DoctorError::Database(e.to_string()))
    }

    async fn embed_specialties(
        &self,
        doctors: Vec<DoctorRecord>,
    ) -> Result<Vec<DoctorResponse>, DoctorError> {
        if doctors.is_empty() {
            return Ok(vec![]);
        }

        let specializations = self.list_specializations().await?;
        let spec_by_id: HashMap<i64, Specialization> =
            specializations.into_iter().map(|s| (s.id, s)).collect();

        let id_list = doctors
            .iter()
            .map(|d| d.id.to_string())
            .collect::<Vec<_>>()
            .join(",");
        let path = format!("/rest/v1/doctor_specialties?doctor_id=in.({})", id_list);
        let rows: Vec<DoctorSpecialtyRow> = self
            .supabase
            .request(Method::GET, &path, None)
            .await
            .map_err(|e| DoctorError::Database(e.to_string()))?;

        let mut specs_by_doctor: HashMap<i64, Vec<Specialization>> = HashMap::new();
        for row in rows {
            if let Some(spec) = spec_by_id.get(&row.specialization_id) {
                specs_by_doctor
                    .entry(row.doctor_id)
                    .or_default()
                    .push(spec.clone());
            }
        }

        Ok(doctors
            .into_iter()
            .map(|d| DoctorResponse {
                specialties: specs_by_doctor.remove(&d.id).unwrap_or_default(),
                id: d.id,
                name: d.name,
                location: d.location,
                fees: d.fees,
                qualification: d.qualification,
                description: d.description,
            })
            .collect())
    }
}

/// Parse "1,3,7" into ids. Garbage anywhere in the list is a client error.
pub fn parse_specialization_ids(raw: Option<&str>) -> Result<Vec<i64>, DoctorError> {
    match raw {
        None | Some("") => Ok(vec![]),
        Some(raw) => raw
            .split(',')
            .map(|part| {
                part.trim().parse::<i64>().map_err(|_| {
                    DoctorError::InvalidQuery(format!("Invalid specialization id: {}", part))
                })
            })
            .collect(),
    }
}
