//! Order aggregate: line items, shipping details and status lifecycle.
//!
//! Line items snapshot the product name, unit price and image at placement
//! time, so later catalogue edits never rewrite order history. The total is
//! computed exactly once, at creation, with checked arithmetic.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::auth::AccountId;
use crate::domain::money::{Amount, AmountError};

/// Order fulfilment status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderStatus {
    /// Received, awaiting confirmation. Initial state.
    Pending,
    /// Being prepared for dispatch.
    Processing,
    /// Handed to the carrier.
    Shipped,
    /// Confirmed received by the customer.
    Delivered,
    /// Cancelled before fulfilment.
    Cancelled,
}

impl OrderStatus {
    /// The wire form of the status.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Processing => "processing",
            Self::Shipped => "shipped",
            Self::Delivered => "delivered",
            Self::Cancelled => "cancelled",
        }
    }

    /// The canned reply appended to the order thread when the status
    /// changes to this value.
    #[must_use]
    pub fn thread_reply(self, short_id: &str) -> String {
        match self {
            Self::Pending => {
                format!("Your order #{short_id} has been received and is pending confirmation.")
            }
            Self::Processing => format!("Your order #{short_id} is now being prepared."),
            Self::Shipped => format!("Good news! Your order #{short_id} has been shipped."),
            Self::Delivered => format!(
                "Your order #{short_id} has been delivered. Thank you for shopping with us!"
            ),
            Self::Cancelled => format!(
                "Your order #{short_id} has been cancelled. Please reply here if you have any questions."
            ),
        }
    }
}

impl std::fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failures raised when parsing an [`OrderStatus`] from its wire form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown order status {0:?}")]
pub struct OrderStatusParseError(pub String);

impl std::str::FromStr for OrderStatus {
    type Err = OrderStatusParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(Self::Pending),
            "processing" => Ok(Self::Processing),
            "shipped" => Ok(Self::Shipped),
            "delivered" => Ok(Self::Delivered),
            "cancelled" => Ok(Self::Cancelled),
            other => Err(OrderStatusParseError(other.to_owned())),
        }
    }
}

/// Destination details captured at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingInfo {
    /// Recipient full name.
    pub full_name: String,
    /// Contact email for carrier updates.
    pub email: String,
    /// Street address.
    pub address: String,
    /// City.
    pub city: String,
    /// Postal code.
    pub postal_code: String,
    /// Country.
    pub country: String,
}

/// Failures raised when validating [`ShippingInfo`].
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("shipping field {0:?} must not be empty")]
pub struct ShippingValidationError(pub &'static str);

impl ShippingInfo {
    /// Validate that every field is non-blank, trimming whitespace.
    pub fn validated(self) -> Result<Self, ShippingValidationError> {
        let require = |value: String, field: &'static str| {
            let value = value.trim().to_owned();
            if value.is_empty() {
                Err(ShippingValidationError(field))
            } else {
                Ok(value)
            }
        };
        Ok(Self {
            full_name: require(self.full_name, "fullName")?,
            email: require(self.email, "email")?,
            address: require(self.address, "address")?,
            city: require(self.city, "city")?,
            postal_code: require(self.postal_code, "postalCode")?,
            country: require(self.country, "country")?,
        })
    }

    /// Merge a partial update into this shipping record, keeping existing
    /// values for absent fields.
    #[must_use]
    pub fn merged(mut self, update: ShippingInfoUpdate) -> Self {
        if let Some(full_name) = update.full_name {
            self.full_name = full_name;
        }
        if let Some(email) = update.email {
            self.email = email;
        }
        if let Some(address) = update.address {
            self.address = address;
        }
        if let Some(city) = update.city {
            self.city = city;
        }
        if let Some(postal_code) = update.postal_code {
            self.postal_code = postal_code;
        }
        if let Some(country) = update.country {
            self.country = country;
        }
        self
    }

    /// Single-line rendering used in the order thread body.
    #[must_use]
    pub fn summary_line(&self) -> String {
        format!(
            "{}, {}, {}, {}, {}",
            self.full_name, self.address, self.city, self.postal_code, self.country
        )
    }
}

/// Partial shipping edit; `None` fields are untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingInfoUpdate {
    /// Replacement recipient name.
    pub full_name: Option<String>,
    /// Replacement contact email.
    pub email: Option<String>,
    /// Replacement street address.
    pub address: Option<String>,
    /// Replacement city.
    pub city: Option<String>,
    /// Replacement postal code.
    pub postal_code: Option<String>,
    /// Replacement country.
    pub country: Option<String>,
}

/// One requested cart line: a product and a quantity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
    /// Product to purchase.
    pub product_id: Uuid,
    /// Units requested; at least 1.
    pub quantity: u32,
}

/// A priced order line with its catalogue snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    /// The product this line was priced from.
    pub product_id: Uuid,
    /// Product name at placement time.
    pub name: String,
    /// Unit price at placement time.
    pub price: Amount,
    /// Units purchased.
    pub quantity: u32,
    /// Product image reference at placement time.
    pub image: String,
}

impl LineItem {
    /// The line total (`price` x `quantity`).
    pub fn line_total(&self) -> Result<Amount, AmountError> {
        self.price.checked_mul(self.quantity)
    }
}

/// A placed order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Stable identifier.
    pub id: Uuid,
    /// Account that placed the order.
    pub account_id: AccountId,
    /// Priced line items, in request order.
    pub items: Vec<LineItem>,
    /// Destination details.
    pub shipping_info: ShippingInfo,
    /// Exact sum of line totals, fixed at creation.
    pub total_amount: Amount,
    /// Fulfilment status.
    pub status: OrderStatus,
    /// Hidden from default admin listings when true.
    pub archived: bool,
    /// Placement timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

impl Order {
    /// The last 8 hex characters of the id, used in thread subjects and
    /// customer-facing copy.
    #[must_use]
    pub fn short_id(&self) -> String {
        short_id(&self.id)
    }

    /// The order-thread subject for this order.
    #[must_use]
    pub fn thread_subject(&self) -> String {
        format!("Order #{}", self.short_id())
    }

    /// Human-readable order summary used as the first message of the order
    /// thread: one line per item, the total, and the shipping destination.
    pub fn summary_body(&self) -> Result<String, AmountError> {
        let mut lines = Vec::with_capacity(self.items.len() + 2);
        for item in &self.items {
            lines.push(format!(
                "{} x{} - {}",
                item.name,
                item.quantity,
                item.line_total()?
            ));
        }
        lines.push(format!("Total: {}", self.total_amount));
        lines.push(format!("Ship to: {}", self.shipping_info.summary_line()));
        Ok(lines.join("\n"))
    }
}

/// The last 8 hex characters of an id's simple (hyphen-free) form.
#[must_use]
pub fn short_id(id: &Uuid) -> String {
    let simple = id.simple().to_string();
    simple.chars().skip(simple.chars().count() - 8).collect()
}

/// Compute an order total from priced line items with checked arithmetic.
pub fn total_of(items: &[LineItem]) -> Result<Amount, AmountError> {
    items.iter().try_fold(Amount::ZERO, |acc, item| {
        acc.checked_add(item.line_total()?)
    })
}

#[cfg(test)]
mod tests {
    //! Status wire-form, totals and summary rendering coverage.

    use std::str::FromStr;

    use rstest::rstest;

    use super::*;

    fn item(name: &str, cents: i64, quantity: u32) -> LineItem {
        LineItem {
            product_id: Uuid::new_v4(),
            name: name.to_owned(),
            price: Amount::from_cents(cents).expect("non-negative"),
            quantity,
            image: "/uploads/x.jpg".to_owned(),
        }
    }

    fn shipping() -> ShippingInfo {
        ShippingInfo {
            full_name: "Yuki Tanaka".to_owned(),
            email: "yuki@example.com".to_owned(),
            address: "1-2-3 Sakura Dori".to_owned(),
            city: "Kyoto".to_owned(),
            postal_code: "600-8001".to_owned(),
            country: "Japan".to_owned(),
        }
    }

    fn order(items: Vec<LineItem>) -> Order {
        let total = total_of(&items).expect("fits");
        Order {
            id: Uuid::from_u128(0xfeed_beef_1234_5678),
            account_id: AccountId::random(),
            items,
            shipping_info: shipping(),
            total_amount: total,
            status: OrderStatus::Pending,
            archived: false,
            created_at: chrono::Utc::now(),
            updated_at: chrono::Utc::now(),
        }
    }

    #[rstest]
    #[case("pending", OrderStatus::Pending)]
    #[case("processing", OrderStatus::Processing)]
    #[case("shipped", OrderStatus::Shipped)]
    #[case("delivered", OrderStatus::Delivered)]
    #[case("cancelled", OrderStatus::Cancelled)]
    fn status_wire_form_round_trips(#[case] wire: &str, #[case] status: OrderStatus) {
        assert_eq!(OrderStatus::from_str(wire), Ok(status));
        assert_eq!(status.as_str(), wire);
    }

    #[rstest]
    fn status_rejects_unknown_values() {
        assert!(OrderStatus::from_str("returned").is_err());
    }

    #[rstest]
    fn thread_replies_reference_the_short_id() {
        for status in [
            OrderStatus::Pending,
            OrderStatus::Processing,
            OrderStatus::Shipped,
            OrderStatus::Delivered,
            OrderStatus::Cancelled,
        ] {
            assert!(status.thread_reply("abcd1234").contains("#abcd1234"));
        }
    }

    #[rstest]
    fn totals_sum_line_amounts() {
        let items = vec![item("Tea", 1000, 2), item("Bowl", 3499, 1)];
        assert_eq!(total_of(&items).expect("fits").cents(), 5499);
    }

    #[rstest]
    fn short_id_is_the_last_eight_hex_chars() {
        let id = Uuid::from_u128(0xfeed_beef_1234_5678);
        assert_eq!(short_id(&id), "12345678");
    }

    #[rstest]
    fn summary_lists_items_total_and_destination() {
        let subject = order(vec![item("Matcha Kit Kat Box", 1299, 2)]);
        let body = subject.summary_body().expect("renders");
        assert!(body.contains("Matcha Kit Kat Box x2 - $25.98"));
        assert!(body.contains("Total: $25.98"));
        assert!(body.contains("Ship to: Yuki Tanaka, 1-2-3 Sakura Dori, Kyoto, 600-8001, Japan"));
        assert_eq!(subject.thread_subject(), "Order #12345678");
    }

    #[rstest]
    fn shipping_merge_keeps_absent_fields() {
        let merged = shipping().merged(ShippingInfoUpdate {
            city: Some("Osaka".to_owned()),
            ..ShippingInfoUpdate::default()
        });
        assert_eq!(merged.city, "Osaka");
        assert_eq!(merged.country, "Japan");
    }

    #[rstest]
    fn shipping_validation_rejects_blank_fields() {
        let mut subject = shipping();
        subject.postal_code = "   ".to_owned();
        assert_eq!(
            subject.validated(),
            Err(ShippingValidationError("postalCode"))
        );
    }
}
