use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// The paying caller, resolved from the authenticated user by the handler.
#[derive(Debug, Clone)]
pub struct Buyer {
    pub id: Uuid,
    pub email: String,
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutRequest {
    pub purchase_type: Option<String>,
    #[serde(default)]
    pub items: Vec<CheckoutItem>,
}

/// One entry of a checkout payload. Which fields are read depends on the
/// purchase type: medicine items carry an embedded product, appointment
/// items a doctor id and date, package items a name and price.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutItem {
    pub product: Option<CheckoutProduct>,
    pub quantity: Option<i64>,
    pub doctor_id: Option<i64>,
    pub date: Option<String>,
    pub package_name: Option<String>,
    pub price: Option<f64>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutProduct {
    pub name: String,
    pub price: f64,
}

/// Stripe line item before form encoding. Amounts are minor units.
#[derive(Debug, Clone, PartialEq)]
pub struct LineItem {
    pub name: String,
    pub unit_amount: i64,
    pub quantity: i64,
}

/// Row in the `purchases` table, the payment ledger.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PurchaseRecord {
    pub id: i64,
    pub user_id: Uuid,
    pub product_name: String,
    pub amount: f64,
    pub purchase_type: String,
    pub purchase_date: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CheckoutResponse {
    #[serde(rename = "sessionId")]
    pub session_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StripeSession {
    pub id: String,
}

#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    #[error("Payments are not configured")]
    NotConfigured,

    #[error("Unknown purchase type: {0}")]
    UnknownPurchaseType(String),

    #[error("No items to check out")]
    EmptyItems,

    #[error("Missing field: {0}")]
    MalformedItem(&'static str),

    #[error("Doctor not found")]
    DoctorNotFound,

    #[error("Payment provider error: {0}")]
    Stripe(String),

    #[error("Database error: {0}")]
    Database(String),
}
