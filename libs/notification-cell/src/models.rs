use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct ContactRequest {
    pub name: Option<String>,
    pub email: Option<String>,
    pub message: Option<String>,
}

/// Row in the `contact_messages` table.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContactMessageRecord {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub message: String,
}

/// One line of a medicine receipt, already priced.
#[derive(Debug, Clone, PartialEq)]
pub struct ReceiptLine {
    pub name: String,
    pub price: f64,
    pub quantity: i64,
    pub total: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct OutgoingEmail {
    pub from: String,
    pub to: String,
    pub subject: String,
    pub html: String,
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("Mail delivery is not configured")]
    NotConfigured,

    #[error("All fields are required.")]
    MissingFields,

    #[error("Mail error: {0}")]
    Mail(String),

    #[error("Database error: {0}")]
    Database(String),
}
