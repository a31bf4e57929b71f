use reqwest::Client;
use tracing::{debug, error, info};

use shared_config::AppConfig;

use crate::models::{CheckoutError, LineItem, StripeSession};

/// Stripe Checkout client. Sessions are created with the form-encoded
/// REST API, not an SDK.
pub struct StripeClient {
    client: Client,
    secret_key: String,
    base_url: String,
    success_url: String,
    cancel_url: String,
}

/// Stripe wants amounts in the currency's minor unit. Fractional paise
/// are truncated, not rounded.
pub fn to_minor_units(price: f64) -> i64 {
    (price * 100.0) as i64
}

impl StripeClient {
    pub fn new(config: &AppConfig) -> Result<Self, CheckoutError> {
        if !config.is_payments_configured() {
            return Err(CheckoutError::NotConfigured);
        }

        Ok(Self {
            client: Client::new(),
            secret_key: config.stripe_secret_key.clone(),
            base_url: config.stripe_base_url.clone(),
            success_url: config.checkout_success_url.clone(),
            cancel_url: config.checkout_cancel_url.clone(),
        })
    }

    /// Creates a card-payment Checkout Session and returns its id.
    /// POST {base_url}/v1/checkout/sessions
    pub async fn create_checkout_session(
        &self,
        customer_email: &str,
        line_items: &[LineItem],
    ) -> Result<String, CheckoutError> {
        let url = format!("{}/v1/checkout/sessions", self.base_url);
        let form = self.session_form(customer_email, line_items);

        debug!("Sending checkout session request to: {}", url);

        let response = self
            .client
            .post(&url)
            .header("Authorization", format!("Bearer {}", self.secret_key))
            .form(&form)
            .send()
            .await
            .map_err(|e| CheckoutError::Stripe(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| CheckoutError::Stripe(e.to_string()))?;

        if !status.is_success() {
            error!("Checkout session creation failed: {} - {}", status, body);
            return Err(CheckoutError::Stripe(format!("HTTP {}: {}", status, body)));
        }

        let session: StripeSession = serde_json::from_str(&body)
            .map_err(|e| CheckoutError::Stripe(format!("Failed to parse session: {}", e)))?;

        info!("Created checkout session: {}", session.id);
        Ok(session.id)
    }

    fn session_form(&self, customer_email: &str, line_items: &[LineItem]) -> Vec<(String, String)> {
        let mut form = vec![
            ("mode".to_string(), "payment".to_string()),
            ("payment_method_types[0]".to_string(), "card".to_string()),
            ("success_url".to_string(), self.success_url.clone()),
            ("cancel_url".to_string(), self.cancel_url.clone()),
            ("customer_email".to_string(), customer_email.to_string()),
            (
                "shipping_address_collection[allowed_countries][0]".to_string(),
                "IN".to_string(),
            ),
        ];

        for (i, item) in line_items.iter().enumerate() {
            form.push((
                format!("line_items[{}][price_data][currency]", i),
                "inr".to_string(),
            ));
            form.push((
                format!("line_items[{}][price_data][product_data][name]", i),
                item.name.clone(),
            ));
            form.push((
                format!("line_items[{}][price_data][unit_amount]", i),
                item.unit_amount.to_string(),
            ));
            form.push((format!("line_items[{}][quantity]", i), item.quantity.to_string()));
        }

        form
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared_config::AppConfig;

    fn test_config() -> AppConfig {
        AppConfig {
            supabase_url: "http://localhost".to_string(),
            supabase_service_key: "key".to_string(),
            app_jwt_secret: "secret".to_string(),
            stripe_secret_key: "sk_test_123".to_string(),
            stripe_base_url: "http://localhost".to_string(),
            checkout_success_url: "http://shop.example/success".to_string(),
            checkout_cancel_url: "http://shop.example/cancel".to_string(),
            mail_base_url: String::new(),
            mail_api_token: String::new(),
            mail_from_address: String::new(),
        }
    }

    #[test]
    fn minor_units_truncate_fractional_paise() {
        assert_eq!(to_minor_units(25.0), 2500);
        assert_eq!(to_minor_units(110.5), 11050);
        assert_eq!(to_minor_units(19.999), 1999);
    }

    #[test]
    fn session_form_indexes_line_items() {
        let client = StripeClient::new(&test_config()).unwrap();
        let items = vec![
            LineItem {
                name: "Paracetamol".to_string(),
                unit_amount: 2500,
                quantity: 2,
            },
            LineItem {
                name: "Vitamin C".to_string(),
                unit_amount: 11050,
                quantity: 1,
            },
        ];

        let form = client.session_form("asha@example.com", &items);

        assert!(form.contains(&("mode".to_string(), "payment".to_string())));
        assert!(form.contains(&(
            "line_items[0][price_data][product_data][name]".to_string(),
            "Paracetamol".to_string()
        )));
        assert!(form.contains(&(
            "line_items[1][price_data][unit_amount]".to_string(),
            "11050".to_string()
        )));
        assert!(form.contains(&("line_items[1][quantity]".to_string(), "1".to_string())));
    }

    #[test]
    fn missing_secret_key_is_rejected() {
        let mut config = test_config();
        config.stripe_secret_key = String::new();
        assert!(StripeClient::new(&config).is_err());
    }
}
