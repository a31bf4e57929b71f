use std::env;
use tracing::warn;

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub supabase_url: String,
    pub supabase_service_key: String,
    pub app_jwt_secret: String,
    pub stripe_secret_key: String,
    pub stripe_base_url: String,
    pub checkout_success_url: String,
    pub checkout_cancel_url: String,
    pub mail_base_url: String,
    pub mail_api_token: String,
    pub mail_from_address: String,
}

impl AppConfig {
    pub fn from_env() -> Self {
        let config = Self {
            supabase_url: env::var("SUPABASE_URL")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_URL not set, using empty value");
                    String::new()
                }),
            supabase_service_key: env::var("SUPABASE_SERVICE_KEY")
                .unwrap_or_else(|_| {
                    warn!("SUPABASE_SERVICE_KEY not set, using empty value");
                    String::new()
                }),
            app_jwt_secret: env::var("APP_JWT_SECRET")
                .unwrap_or_else(|_| {
                    warn!("APP_JWT_SECRET not set, using empty value");
                    String::new()
                }),
            stripe_secret_key: env::var("STRIPE_SECRET_KEY")
                .unwrap_or_else(|_| {
                    warn!("STRIPE_SECRET_KEY not set, using empty value");
                    String::new()
                }),
            stripe_base_url: env::var("STRIPE_BASE_URL")
                .unwrap_or_else(|_| "https://api.stripe.com".to_string()),
            checkout_success_url: env::var("CHECKOUT_SUCCESS_URL")
                .unwrap_or_else(|_| {
                    warn!("CHECKOUT_SUCCESS_URL not set, using empty value");
                    String::new()
                }),
            checkout_cancel_url: env::var("CHECKOUT_CANCEL_URL")
                .unwrap_or_else(|_| {
                    warn!("CHECKOUT_CANCEL_URL not set, using empty value");
                    String::new()
                }),
            mail_base_url: env::var("MAIL_BASE_URL")
                .unwrap_or_else(|_| {
                    warn!("MAIL_BASE_URL not set, using empty value");
                    String::new()
                }),
            mail_api_token: env::var("MAIL_API_TOKEN")
                .unwrap_or_else(|_| {
                    warn!("MAIL_API_TOKEN not set, using empty value");
                    String::new()
                }),
            mail_from_address: env::var("MAIL_FROM_ADDRESS")
                .unwrap_or_else(|_| "no-reply@pharmacare.example".to_string()),
        };

        if !config.is_configured() {
            warn!("Application not fully configured - missing environment variables");
        }

        config
    }

    pub fn is_configured(&self) -> bool {
        !self.supabase_url.is_empty()
            && !self.supabase_service_key.is_empty()
            && !self.app_jwt_secret.is_empty()
    }

    pub fn is_payments_configured(&self) -> bool {
        !self.stripe_secret_key.is_empty()
            && !self.stripe_base_url.is_empty()
            && !self.checkout_success_url.is_empty()
            && !self.checkout_cancel_url.is_empty()
    }

    pub fn is_mail_configured(&self) -> bool {
        !self.mail_base_url.is_empty() && !self.mail_api_token.is_empty()
    }
}
