use reqwest::Client;
use tracing::{debug, error, info};

use shared_config::AppConfig;

use crate::models::{NotificationError, OutgoingEmail};

/// Transactional mail client speaking the provider's HTTP API.
pub struct Mailer {
    client: Client,
    base_url: String,
    api_token: String,
    from_address: String,
}

impl Mailer {
    pub fn new(config: &AppConfig) -> Result<Self, NotificationError> {
        if !config.is_mail_configured() {
            return Err(NotificationError::NotConfigured);
        }

        Ok(Self {
            client: Client::new(),
            base_url: config.mail_base_url.clone(),
            api_token: config.mail_api_token.clone(),
            from_address: config.mail_from_address.clone(),
        })
    }

    /// Delivers one HTML email.
    /// POST {base_url}/emails
    pub async fn send(
        &self,
        to: &str,
        subject: &str,
        html: String,
    ) -> Result<(), NotificationError> {
        let url = format!("{}/emails", self.base_url);
        let email = OutgoingEmail {
            from: self.from_address.clone(),
            to: to.to_string(),
            subject: subject.to_string(),
            html,
        };

        debug!("Sending email request to: {}", url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.api_token))
            .json(&email)
            .send()
            .await
            .map_err(|e| NotificationError::Mail(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            error!("Mail delivery failed: {} - {}", status, body);
            return Err(NotificationError::Mail(format!("HTTP {}: {}", status, body)));
        }

        info!(to = %to, subject = %subject, "Email delivered");
        Ok(())
    }
}
