pub mod contact;
pub mod mailer;
pub mod templates;
