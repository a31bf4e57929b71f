use std::sync::Arc;

use serde_json::json;
use tracing::warn;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use crate::models::{ContactMessageRecord, NotificationError};
use crate::services::mailer::Mailer;
use crate::services::templates;

/// Stores contact-form submissions and acknowledges them by email.
pub struct ContactService {
    supabase: Arc<SupabaseClient>,
    mailer: Option<Mailer>,
}

impl ContactService {
    pub fn new(config: &AppConfig) -> Self {
        let mailer = match Mailer::new(config) {
            Ok(mailer) => Some(mailer),
            Err(_) => {
                warn!("Mail delivery not configured, contact acknowledgements disabled");
                None
            }
        };

        Self {
            supabase: Arc::new(SupabaseClient::new(config)),
            mailer,
        }
    }

    /// Records the message, then acknowledges the sender. A failed
    /// acknowledgement does not lose the stored message.
    pub async fn submit(
        &self,
        name: &str,
        email: &str,
        message: &str,
    ) -> Result<ContactMessageRecord, NotificationError> {
        if name.trim().is_empty() || email.trim().is_empty() || message.trim().is_empty() {
            return Err(NotificationError::MissingFields);
        }

        let created: Vec<ContactMessageRecord> = self
            .supabase
            .insert_returning(
                "/rest/v1/contact_messages",
                json!({ "name": name, "email": email, "message": message }),
            )
            .await
            .map_err(|e| NotificationError::Database(e.to_string()))?;

        let record = created
            .into_iter()
            .next()
            .ok_or_else(|| NotificationError::Database("Insert returned no rows".to_string()))?;

        if let Some(mailer) = &self.mailer {
            let html = templates::contact_acknowledgement(name);
            if let Err(e) = mailer
                .send(email, "Confirmation: Your message has been received", html)
                .await
            {
                warn!(error = %e, "Contact acknowledgement email failed");
            }
        }

        Ok(record)
    }
}
