pub mod checkout;
pub mod stripe;
