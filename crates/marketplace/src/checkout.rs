//! WhatsApp-relayed checkout.
//!
//! Orders are relayed to the vendor as a pre-filled WhatsApp message; the
//! order document written to the backend is the tracking record. Customer
//! input is validated before any backend call, and a failed order write
//! does not invalidate the already-built WhatsApp link; the relay is the
//! primary channel, the document is bookkeeping.

use std::cmp::Reverse;
use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use uuid::Uuid;

use sokocamp_core::{Email, EmailError, OrderId, OrderStatus, Price};

use crate::backend::{Backend, BackendError};
use crate::cart::{CartContainer, CartLineItem};
use crate::i18n::MessageKey;
use crate::notify::{NoticeLevel, Notifier};

/// Checkout failures. All are rejected before the WhatsApp link opens.
#[derive(Debug, thiserror::Error)]
pub enum CheckoutError {
    /// A required form field is empty.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// The email address is malformed.
    #[error("invalid email: {0}")]
    InvalidEmail(#[from] EmailError),

    /// The cart holds no items.
    #[error("cart is empty")]
    EmptyCart,
}

/// Customer details collected by the checkout form.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CustomerInfo {
    pub name: String,
    pub phone: String,
    pub email: String,
    pub address: String,
    #[serde(default)]
    pub details: Option<String>,
}

impl CustomerInfo {
    /// Validate required fields and email shape.
    ///
    /// # Errors
    ///
    /// Returns the first missing field, or the email parse failure.
    pub fn validate(&self) -> Result<(), CheckoutError> {
        if self.name.trim().is_empty() {
            return Err(CheckoutError::MissingField("name"));
        }
        if self.phone.trim().is_empty() {
            return Err(CheckoutError::MissingField("phone"));
        }
        if self.email.trim().is_empty() {
            return Err(CheckoutError::MissingField("email"));
        }
        if self.address.trim().is_empty() {
            return Err(CheckoutError::MissingField("address"));
        }
        Email::parse(self.email.trim())?;
        Ok(())
    }
}

/// The order document written to the backend at checkout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    pub customer: CustomerInfo,
    pub items: Vec<CartLineItem>,
    pub total: Price,
    pub status: OrderStatus,
    pub created_at: DateTime<Utc>,
}

/// Result of a successful checkout.
#[derive(Debug, Clone)]
pub struct PlacedOrder {
    pub order: Order,
    /// Pre-filled `wa.me` link to open.
    pub whatsapp_url: String,
    /// Whether the backend accepted the order document. A `false` here was
    /// already surfaced to the user; the WhatsApp relay still went out.
    pub recorded: bool,
}

/// Build the WhatsApp order message text.
#[must_use]
pub fn order_message(items: &[CartLineItem], total: Price, customer: &CustomerInfo) -> String {
    let now = Utc::now();
    let mut message = String::from("*NEW ORDER REQUEST*\n\n");

    message.push_str("*Order Summary*\n");
    message.push_str(&format!("Date: {}\n", now.format("%d/%m/%Y")));
    message.push_str(&format!("Time: {}\n\n", now.format("%H:%M")));

    message.push_str("*Customer Information*\n");
    message.push_str(&format!("Name: {}\n", customer.name));
    message.push_str(&format!("Phone: {}\n", customer.phone));
    message.push_str(&format!("Email: {}\n", customer.email));
    message.push_str(&format!("Address: {}\n", customer.address));
    if let Some(details) = customer.details.as_deref().filter(|d| !d.trim().is_empty()) {
        message.push_str(&format!("Details: {details}\n"));
    }
    message.push('\n');

    message.push_str("*Items Ordered*\n");
    for (index, item) in items.iter().enumerate() {
        message.push_str(&format!("{}. {}\n", index + 1, item.name));
        message.push_str(&format!("   Qty: {}\n", item.quantity));
        message.push_str(&format!("   Price: {}\n", item.price));
        message.push_str(&format!("   Subtotal: {}\n\n", item.subtotal()));
    }

    message.push_str(&format!("*TOTAL AMOUNT: {total}*\n\n"));
    message.push_str("Please confirm this order.");
    message
}

/// Build the `wa.me` link carrying the order message.
#[must_use]
pub fn whatsapp_url(phone: &str, message: &str) -> String {
    let digits: String = phone.chars().filter(char::is_ascii_digit).collect();
    format!("https://wa.me/{digits}?text={}", urlencoding::encode(message))
}

/// Checkout flow: validate, build the relay message, record the order,
/// clear the cart.
#[derive(Clone)]
pub struct CheckoutService<B> {
    inner: Arc<CheckoutInner<B>>,
}

struct CheckoutInner<B> {
    backend: Arc<B>,
    cart: CartContainer,
    notifier: Arc<dyn Notifier>,
    /// Number the order relay is sent to.
    vendor_phone: String,
}

impl<B: Backend> CheckoutService<B> {
    /// Create a checkout service relaying orders to `vendor_phone`.
    #[must_use]
    pub fn new(
        backend: Arc<B>,
        cart: CartContainer,
        notifier: Arc<dyn Notifier>,
        vendor_phone: impl Into<String>,
    ) -> Self {
        Self {
            inner: Arc::new(CheckoutInner {
                backend,
                cart,
                notifier,
                vendor_phone: vendor_phone.into(),
            }),
        }
    }

    /// Place the current cart as an order.
    ///
    /// Validates the customer input before any backend call, then builds
    /// the WhatsApp link, writes the order document, and clears the cart on
    /// a recorded order. A failed order write is surfaced as a notice but
    /// still returns the link (`recorded: false`), and the cart is kept so
    /// the customer can retry.
    ///
    /// # Errors
    ///
    /// Returns [`CheckoutError`] for an empty cart or invalid input.
    #[instrument(skip(self, customer))]
    pub async fn place_order(&self, customer: CustomerInfo) -> Result<PlacedOrder, CheckoutError> {
        let items = self.inner.cart.items();
        if items.is_empty() {
            return Err(CheckoutError::EmptyCart);
        }
        customer.validate()?;

        let total = self.inner.cart.total_price();
        let message = order_message(&items, total, &customer);
        let url = whatsapp_url(&self.inner.vendor_phone, &message);

        let order = Order {
            id: OrderId::new(Uuid::new_v4().to_string()),
            customer,
            items,
            total,
            status: OrderStatus::Pending,
            created_at: Utc::now(),
        };

        let recorded = match self.inner.backend.submit_order(&order).await {
            Ok(()) => {
                self.inner.cart.clear();
                self.inner
                    .notifier
                    .notify(NoticeLevel::Success, MessageKey::OrderPlaced);
                true
            }
            Err(e) => {
                tracing::warn!(order = %order.id, "failed to record order: {e}");
                self.inner
                    .notifier
                    .notify(NoticeLevel::Error, MessageKey::OrderFailed);
                false
            }
        };

        Ok(PlacedOrder {
            order,
            whatsapp_url: url,
            recorded,
        })
    }

    /// Fetch the customer's past orders, newest first.
    ///
    /// Orders are matched on the customer's email; the backend compares
    /// case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns the backend failure; callers surface a notice and keep
    /// whatever they last showed.
    #[instrument(skip(self))]
    pub async fn order_history(&self, customer_email: &str) -> Result<Vec<Order>, BackendError> {
        let mut orders = self.inner.backend.fetch_orders(customer_email).await?;
        orders.sort_by_key(|order| Reverse(order.created_at));
        Ok(orders)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sokocamp_core::ProductId;

    fn line(name: &str, price: i64, quantity: u32) -> CartLineItem {
        CartLineItem {
            product_id: ProductId::new(name),
            name: name.to_owned(),
            price: Price::from_shillings(price),
            images: Vec::new(),
            category: None,
            vendor_id: None,
            vendor_name: None,
            quantity,
        }
    }

    fn customer() -> CustomerInfo {
        CustomerInfo {
            name: "Neema".to_owned(),
            phone: "+255 712 000 111".to_owned(),
            email: "neema@campus.ac.tz".to_owned(),
            address: "Hall 3, Room 12".to_owned(),
            details: None,
        }
    }

    #[test]
    fn test_validate_rejects_missing_fields() {
        let mut info = customer();
        info.address = "  ".to_owned();
        assert!(matches!(
            info.validate(),
            Err(CheckoutError::MissingField("address"))
        ));
    }

    #[test]
    fn test_validate_rejects_bad_email() {
        let mut info = customer();
        info.email = "not-an-email".to_owned();
        assert!(matches!(
            info.validate(),
            Err(CheckoutError::InvalidEmail(_))
        ));
    }

    #[test]
    fn test_order_message_contents() {
        let items = vec![line("Desk Lamp", 5_000, 2), line("Notebook", 1_500, 1)];
        let total = Price::from_shillings(11_500);

        let message = order_message(&items, total, &customer());

        assert!(message.starts_with("*NEW ORDER REQUEST*"));
        assert!(message.contains("Name: Neema"));
        assert!(message.contains("1. Desk Lamp"));
        assert!(message.contains("   Qty: 2"));
        assert!(message.contains("   Subtotal: 10,000 TSh"));
        assert!(message.contains("2. Notebook"));
        assert!(message.contains("*TOTAL AMOUNT: 11,500 TSh*"));
        assert!(message.ends_with("Please confirm this order."));
    }

    #[test]
    fn test_order_message_includes_optional_details() {
        let mut info = customer();
        info.details = Some("Call before delivery".to_owned());

        let message = order_message(&[line("Lamp", 5_000, 1)], Price::from_shillings(5_000), &info);
        assert!(message.contains("Details: Call before delivery"));
    }

    #[test]
    fn test_whatsapp_url_strips_and_encodes() {
        let url = whatsapp_url("+255 775 769 177", "*NEW ORDER*\nline two");
        assert!(url.starts_with("https://wa.me/255775769177?text="));
        // Newlines and asterisks must be percent-encoded.
        assert!(url.contains("%2ANEW%20ORDER%2A%0Aline%20two"));
    }
}
