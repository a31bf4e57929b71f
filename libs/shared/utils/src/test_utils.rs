use std::sync::Arc;

use chrono::Utc;
use serde_json::json;
use uuid::Uuid;

use shared_config::AppConfig;
use shared_models::auth::User;

use crate::jwt::issue_token;

pub struct TestConfig {
    pub jwt_secret: String,
    pub supabase_url: String,
    pub supabase_service_key: String,
    pub stripe_base_url: String,
    pub mail_base_url: String,
}

impl Default for TestConfig {
    fn default() -> Self {
        Self {
            jwt_secret: "test-secret-key-for-jwt-validation-must-be-long-enough".to_string(),
            supabase_url: "http://localhost:54321".to_string(),
            supabase_service_key: "test-service-key".to_string(),
            stripe_base_url: "http://localhost:12111".to_string(),
            mail_base_url: "http://localhost:8025".to_string(),
        }
    }
}

impl TestConfig {
    /// Config with every external base URL pointed at one mock server.
    pub fn with_mock_server(url: &str) -> Self {
        Self {
            supabase_url: url.to_string(),
            stripe_base_url: url.to_string(),
            mail_base_url: url.to_string(),
            ..Self::default()
        }
    }

    pub fn to_app_config(&self) -> AppConfig {
        AppConfig {
            supabase_url: self.supabase_url.clone(),
            supabase_service_key: self.supabase_service_key.clone(),
            app_jwt_secret: self.jwt_secret.clone(),
            stripe_secret_key: "sk_test_123".to_string(),
            stripe_base_url: self.stripe_base_url.clone(),
            checkout_success_url: "https://shop.example/success".to_string(),
            checkout_cancel_url: "https://shop.example/cancel".to_string(),
            mail_base_url: self.mail_base_url.clone(),
            mail_api_token: "test-mail-token".to_string(),
            mail_from_address: "no-reply@pharmacare.example".to_string(),
        }
    }

    pub fn to_arc(&self) -> Arc<AppConfig> {
        Arc::new(self.to_app_config())
    }
}

pub struct TestUser {
    pub id: String,
    pub username: String,
    pub email: String,
}

impl Default for TestUser {
    fn default() -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            username: "testuser".to_string(),
            email: "test@example.com".to_string(),
        }
    }
}

impl TestUser {
    pub fn new(username: &str, email: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            email: email.to_string(),
        }
    }

    pub fn to_user(&self) -> User {
        User {
            id: self.id.clone(),
            username: Some(self.username.clone()),
            email: Some(self.email.clone()),
            created_at: Some(Utc::now()),
        }
    }

    pub fn token(&self, secret: &str) -> String {
        issue_token(&self.id, &self.username, &self.email, secret)
            .expect("test token issuance")
    }
}

pub struct MockSupabaseResponses;

impl MockSupabaseResponses {
    pub fn user_row(user: &TestUser, password_hash: &str) -> serde_json::Value {
        json!({
            "id": user.id,
            "username": user.username,
            "email": user.email,
            "password_hash": password_hash,
            "first_name": "Test",
            "last_name": "User",
            "created_at": "2024-01-01T00:00:00Z"
        })
    }

    pub fn doctor_row(id: i64, name: &str, location: &str, fees: f64) -> serde_json::Value {
        json!({
            "id": id,
            "name": name,
            "location": location,
            "qualification": "MBBS",
            "fees": fees,
            "description": "Experienced physician"
        })
    }

    pub fn product_row(id: i64, item_id: &str, name: &str, price: f64) -> serde_json::Value {
        json!({
            "id": id,
            "item_id": item_id,
            "category_id": 1,
            "name": name,
            "description": "A product",
            "price": price,
            "image": null,
            "all_image_urls": [],
            "item_specifications": {}
        })
    }

    pub fn cart_row(id: i64, user_id: &str) -> serde_json::Value {
        json!({
            "id": id,
            "user_id": user_id
        })
    }

    pub fn cart_item_row(id: i64, cart_id: i64, product_id: i64, quantity: i64) -> serde_json::Value {
        json!({
            "id": id,
            "cart_id": cart_id,
            "product_id": product_id,
            "quantity": quantity
        })
    }

    pub fn appointment_row(id: i64, user_id: &str, doctor_id: i64, date: &str) -> serde_json::Value {
        json!({
            "id": id,
            "user_id": user_id,
            "doctor_id": doctor_id,
            "date": date
        })
    }

    pub fn stripe_session(id: &str) -> serde_json::Value {
        json!({
            "id": id,
            "object": "checkout.session",
            "url": format!("https://checkout.stripe.com/pay/{}", id)
        })
    }
}
