use std::sync::Arc;

use serde_json::json;
use tracing::{info, warn};
use uuid::Uuid;

use shared_config::AppConfig;
use shared_database::supabase::SupabaseClient;

use auth_cell::services::account::AccountService;
use cart_cell::services::cart::CartService;
use doctor_cell::models::DoctorError;
use doctor_cell::services::availability::AvailabilityService;
use notification_cell::models::ReceiptLine;
use notification_cell::services::mailer::Mailer;
use notification_cell::services::templates;

use crate::models::{Buyer, CheckoutError, CheckoutItem, LineItem, PurchaseRecord};
use crate::services::stripe::{to_minor_units, StripeClient};

/// The `purchases` table, one row per paid item. Readable without any
/// payment configuration.
pub struct PurchaseLedger {
    supabase: Arc<SupabaseClient>,
}

impl PurchaseLedger {
    pub fn new(config: &AppConfig) -> Self {
        Self {
            supabase: Arc::new(SupabaseClient::new(config)),
        }
    }

    pub async fn list_for_user(&self, user_id: Uuid) -> Result<Vec<PurchaseRecord>, CheckoutError> {
        self.supabase
            .request(
                reqwest::Method::GET,
                &format!(
                    "/rest/v1/purchases?user_id=eq.{}&order=purchase_date.desc",
                    user_id
                ),
                None,
            )
            .await
            .map_err(|e| CheckoutError::Database(e.to_string()))
    }

    pub async fn record(
        &self,
        user_id: Uuid,
        product_name: &str,
        amount: f64,
        purchase_type: &str,
    ) -> Result<(), CheckoutError> {
        let _: Vec<PurchaseRecord> = self
            .supabase
            .insert_returning(
                "/rest/v1/purchases",
                json!({
                    "user_id": user_id,
                    "product_name": product_name,
                    "amount": amount,
                    "purchase_type": purchase_type,
                }),
            )
            .await
            .map_err(|e| CheckoutError::Database(e.to_string()))?;
        Ok(())
    }
}

/// Builds Stripe Checkout Sessions for the three purchase flows and
/// records each paid item in the `purchases` ledger.
pub struct CheckoutService {
    ledger: PurchaseLedger,
    stripe: StripeClient,
    accounts: AccountService,
    doctors: AvailabilityService,
    cart: CartService,
    mailer: Option<Mailer>,
}

impl CheckoutService {
    pub fn new(config: &AppConfig) -> Result<Self, CheckoutError> {
        let mailer = match Mailer::new(config) {
            Ok(mailer) => Some(mailer),
            Err(_) => {
                warn!("Mail delivery not configured, purchase emails disabled");
                None
            }
        };

        Ok(Self {
            ledger: PurchaseLedger::new(config),
            stripe: StripeClient::new(config)?,
            accounts: AccountService::new(config),
            doctors: AvailabilityService::new(config),
            cart: CartService::new(config),
            mailer,
        })
    }

    /// Creates a Checkout Session for `items`. The ledger rows, receipt
    /// email and cart cleanup only happen once Stripe has accepted the
    /// session; a declined session leaves no trace.
    pub async fn create_session(
        &self,
        buyer: &Buyer,
        purchase_type: &str,
        items: &[CheckoutItem],
    ) -> Result<String, CheckoutError> {
        if items.is_empty() {
            return Err(CheckoutError::EmptyItems);
        }

        let buyer = self.named_buyer(buyer).await;

        match purchase_type {
            "Medicine" => self.checkout_medicine(&buyer, items).await,
            "appointment" => self.checkout_appointments(&buyer, items).await,
            "package" => self.checkout_packages(&buyer, items).await,
            other => Err(CheckoutError::UnknownPurchaseType(other.to_string())),
        }
    }

    /// Emails greet by the stored first and last name. When the profile
    /// row cannot be read the token username stands in.
    async fn named_buyer(&self, buyer: &Buyer) -> Buyer {
        let name = match self.accounts.get_profile(&buyer.id.to_string()).await {
            Ok(profile) => format!("{} {}", profile.first_name, profile.last_name),
            Err(e) => {
                warn!("Falling back to username for receipt greeting: {e}");
                buyer.name.clone()
            }
        };
        Buyer {
            name,
            ..buyer.clone()
        }
    }

    async fn checkout_medicine(
        &self,
        buyer: &Buyer,
        items: &[CheckoutItem],
    ) -> Result<String, CheckoutError> {
        let mut line_items = Vec::with_capacity(items.len());
        let mut receipt = Vec::with_capacity(items.len());

        for item in items {
            let product = item
                .product
                .as_ref()
                .ok_or(CheckoutError::MalformedItem("product"))?;
            let quantity = item.quantity.unwrap_or(1);

            line_items.push(LineItem {
                name: product.name.clone(),
                unit_amount: to_minor_units(product.price),
                quantity,
            });
            receipt.push(ReceiptLine {
                name: product.name.clone(),
                price: product.price,
                quantity,
                total: product.price * quantity as f64,
            });
        }

        let session_id = self
            .stripe
            .create_checkout_session(&buyer.email, &line_items)
            .await?;

        for line in &receipt {
            self.ledger.record(buyer.id, &line.name, line.total, "Medicine")
                .await?;
        }

        let total: f64 = receipt.iter().map(|l| l.total).sum();
        self.send_email(
            &buyer.email,
            "Your Medicine Purchase Confirmation",
            templates::medicine_receipt(&buyer.name, &receipt, total),
        )
        .await;

        self.cart
            .clear_cart(buyer.id)
            .await
            .map_err(|e| CheckoutError::Database(e.to_string()))?;

        info!(user_id = %buyer.id, "Medicine checkout complete");
        Ok(session_id)
    }

    async fn checkout_appointments(
        &self,
        buyer: &Buyer,
        items: &[CheckoutItem],
    ) -> Result<String, CheckoutError> {
        // Fees come from the doctors table, never from the payload.
        let mut booked = Vec::with_capacity(items.len());
        for item in items {
            let doctor_id = item
                .doctor_id
                .ok_or(CheckoutError::MalformedItem("doctor_id"))?;
            let date = item
                .date
                .clone()
                .ok_or(CheckoutError::MalformedItem("date"))?;
            let doctor = self
                .doctors
                .get_doctor(doctor_id)
                .await
                .map_err(|e| match e {
                    DoctorError::NotFound => CheckoutError::DoctorNotFound,
                    other => CheckoutError::Database(other.to_string()),
                })?;
            booked.push((doctor, date));
        }

        let line_items: Vec<LineItem> = booked
            .iter()
            .map(|(doctor, _)| LineItem {
                name: format!("Appointment with Dr. {}", doctor.name),
                unit_amount: to_minor_units(doctor.fees.unwrap_or_default()),
                quantity: 1,
            })
            .collect();

        let session_id = self
            .stripe
            .create_checkout_session(&buyer.email, &line_items)
            .await?;

        for (doctor, date) in &booked {
            let fees = doctor.fees.unwrap_or_default();
            self.ledger.record(
                buyer.id,
                &format!("Appointment with Dr. {}", doctor.name),
                fees,
                "appointment",
            )
            .await?;
            self.send_email(
                &buyer.email,
                "Your Appointment Confirmation",
                templates::appointment_confirmation(&buyer.name, &doctor.name, date, fees),
            )
            .await;
        }

        info!(user_id = %buyer.id, "Appointment checkout complete");
        Ok(session_id)
    }

    async fn checkout_packages(
        &self,
        buyer: &Buyer,
        items: &[CheckoutItem],
    ) -> Result<String, CheckoutError> {
        let mut packages = Vec::with_capacity(items.len());
        for item in items {
            let name = item
                .package_name
                .clone()
                .ok_or(CheckoutError::MalformedItem("package_name"))?;
            let price = item.price.ok_or(CheckoutError::MalformedItem("price"))?;
            packages.push((name, price));
        }

        let line_items: Vec<LineItem> = packages
            .iter()
            .map(|(name, price)| LineItem {
                name: name.clone(),
                unit_amount: to_minor_units(*price),
                quantity: 1,
            })
            .collect();

        let session_id = self
            .stripe
            .create_checkout_session(&buyer.email, &line_items)
            .await?;

        for (name, price) in &packages {
            self.ledger.record(buyer.id, name, *price, "package").await?;
            self.send_email(
                &buyer.email,
                "Your Health Care Package Purchase Confirmation",
                templates::package_receipt(&buyer.name, name, *price),
            )
            .await;
        }

        info!(user_id = %buyer.id, "Package checkout complete");
        Ok(session_id)
    }

    // Receipts are best effort. The payment already went through, so a
    // mail outage must not fail the request.
    async fn send_email(&self, to: &str, subject: &str, html: String) {
        if let Some(mailer) = &self.mailer {
            if let Err(e) = mailer.send(to, subject, html).await {
                warn!(error = %e, "Purchase email failed");
            }
        }
    }
}
