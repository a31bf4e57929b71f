//! HTML bodies for the transactional emails. Kept as plain string
//! builders so they can be unit tested without a mail server.

use crate::models::ReceiptLine;

pub fn medicine_receipt(user_name: &str, items: &[ReceiptLine], total: f64) -> String {
    let mut rows = String::new();
    for item in items {
        rows.push_str(&format!(
            "<tr><td>{}</td><td>{:.2}</td><td>{}</td><td>{:.2}</td></tr>",
            item.name, item.price, item.quantity, item.total
        ));
    }

    format!(
        "<html><body>\
         <p>Hi {},</p>\
         <p>Thank you for your purchase. Here is your receipt:</p>\
         <table border=\"1\" cellpadding=\"4\">\
         <tr><th>Item</th><th>Price</th><th>Quantity</th><th>Total</th></tr>\
         {}\
         </table>\
         <p><strong>Total amount: {:.2}</strong></p>\
         </body></html>",
        user_name, rows, total
    )
}

pub fn appointment_confirmation(
    user_name: &str,
    doctor_name: &str,
    appointment_date: &str,
    fees: f64,
) -> String {
    format!(
        "<html><body>\
         <p>Hi {},</p>\
         <p>Your appointment with Dr. {} on {} is confirmed.</p>\
         <p>Consultation fees: {:.2}</p>\
         </body></html>",
        user_name, doctor_name, appointment_date, fees
    )
}

pub fn package_receipt(user_name: &str, package_name: &str, total: f64) -> String {
    format!(
        "<html><body>\
         <p>Hi {},</p>\
         <p>Thank you for purchasing the {} package.</p>\
         <p><strong>Total amount: {:.2}</strong></p>\
         </body></html>",
        user_name, package_name, total
    )
}

pub fn contact_acknowledgement(name: &str) -> String {
    format!(
        "<html><body>\
         <p>Hi {},</p>\
         <p>We have received your message and will get back to you shortly.</p>\
         </body></html>",
        name
    )
}
