//! Row structs mirroring the Diesel schema.
//!
//! Rows are dumb carriers; validation into domain types happens in the
//! repository adapters, where a corrupt row surfaces as a query error.

use chrono::{DateTime, Utc};
use diesel::prelude::*;
use uuid::Uuid;

use super::schema::{accounts, messages, orders, products};

/// One `accounts` row.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = accounts)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AccountRow {
    /// Primary key.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Unique, lowercased email.
    pub email: String,
    /// Hex-encoded credential digest.
    pub password_digest: String,
    /// Role wire form.
    pub role: String,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insertable `accounts` row.
#[derive(Debug, Insertable)]
#[diesel(table_name = accounts)]
pub struct NewAccountRow<'a> {
    /// Primary key.
    pub id: Uuid,
    /// Display name.
    pub name: &'a str,
    /// Unique, lowercased email.
    pub email: &'a str,
    /// Hex-encoded credential digest.
    pub password_digest: &'a str,
    /// Role wire form.
    pub role: &'a str,
}

/// One `products` row.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = products)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct ProductRow {
    /// Primary key.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Marketing description.
    pub description: String,
    /// Unit price in minor units.
    pub price_cents: i64,
    /// Image file reference.
    pub image: String,
    /// Display-form category.
    pub category: String,
    /// Units available.
    pub stock: i32,
    /// Featured flag.
    pub featured: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insertable `products` row.
#[derive(Debug, Insertable)]
#[diesel(table_name = products)]
pub struct NewProductRow<'a> {
    /// Primary key.
    pub id: Uuid,
    /// Display name.
    pub name: &'a str,
    /// Marketing description.
    pub description: &'a str,
    /// Unit price in minor units.
    pub price_cents: i64,
    /// Image file reference.
    pub image: &'a str,
    /// Display-form category.
    pub category: &'a str,
    /// Units available.
    pub stock: i32,
    /// Featured flag.
    pub featured: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Full-row `products` update.
#[derive(Debug, AsChangeset)]
#[diesel(table_name = products)]
pub struct ProductChangeset<'a> {
    /// Display name.
    pub name: &'a str,
    /// Marketing description.
    pub description: &'a str,
    /// Unit price in minor units.
    pub price_cents: i64,
    /// Image file reference.
    pub image: &'a str,
    /// Display-form category.
    pub category: &'a str,
    /// Units available.
    pub stock: i32,
    /// Featured flag.
    pub featured: bool,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// One `orders` row.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = orders)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct OrderRow {
    /// Primary key.
    pub id: Uuid,
    /// Buying account.
    pub account_id: Uuid,
    /// Line-item snapshots as JSON.
    pub items: serde_json::Value,
    /// Recipient full name.
    pub full_name: String,
    /// Carrier contact email.
    pub email: String,
    /// Street address.
    pub address: String,
    /// City.
    pub city: String,
    /// Postal code.
    pub postal_code: String,
    /// Country.
    pub country: String,
    /// Order total in minor units.
    pub total_cents: i64,
    /// Status wire form.
    pub status: String,
    /// Archived flag.
    pub archived: bool,
    /// Placement timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insertable `orders` row.
#[derive(Debug, Insertable)]
#[diesel(table_name = orders)]
pub struct NewOrderRow<'a> {
    /// Primary key.
    pub id: Uuid,
    /// Buying account.
    pub account_id: Uuid,
    /// Line-item snapshots as JSON.
    pub items: &'a serde_json::Value,
    /// Recipient full name.
    pub full_name: &'a str,
    /// Carrier contact email.
    pub email: &'a str,
    /// Street address.
    pub address: &'a str,
    /// City.
    pub city: &'a str,
    /// Postal code.
    pub postal_code: &'a str,
    /// Country.
    pub country: &'a str,
    /// Order total in minor units.
    pub total_cents: i64,
    /// Status wire form.
    pub status: &'a str,
    /// Archived flag.
    pub archived: bool,
    /// Placement timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Full-row `orders` update (everything an admin may change).
#[derive(Debug, AsChangeset)]
#[diesel(table_name = orders)]
pub struct OrderChangeset<'a> {
    /// Recipient full name.
    pub full_name: &'a str,
    /// Carrier contact email.
    pub email: &'a str,
    /// Street address.
    pub address: &'a str,
    /// City.
    pub city: &'a str,
    /// Postal code.
    pub postal_code: &'a str,
    /// Country.
    pub country: &'a str,
    /// Status wire form.
    pub status: &'a str,
    /// Archived flag.
    pub archived: bool,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// One `messages` row.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = messages)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct MessageRow {
    /// Primary key.
    pub id: Uuid,
    /// Kind wire form.
    pub kind: String,
    /// Sender display name.
    pub name: String,
    /// Sender email.
    pub email: String,
    /// Subject, where the kind carries one.
    pub subject: Option<String>,
    /// Body, where the kind carries one.
    pub body: Option<String>,
    /// Requested item name.
    pub item_name: Option<String>,
    /// Category hint.
    pub category: Option<String>,
    /// Request description.
    pub description: Option<String>,
    /// Budget hint.
    pub budget: Option<String>,
    /// Reference URL.
    pub reference_url: Option<String>,
    /// Attachment references as JSON.
    pub attachments: serde_json::Value,
    /// Reply history as JSON.
    pub replies: serde_json::Value,
    /// Request status wire form.
    pub status: String,
    /// Admin read flag.
    pub read: bool,
    /// Archived flag.
    pub archived: bool,
    /// Correlated order.
    pub order_id: Option<Uuid>,
    /// Submission timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Insertable `messages` row.
#[derive(Debug, Insertable)]
#[diesel(table_name = messages)]
pub struct NewMessageRow<'a> {
    /// Primary key.
    pub id: Uuid,
    /// Kind wire form.
    pub kind: &'a str,
    /// Sender display name.
    pub name: &'a str,
    /// Sender email.
    pub email: &'a str,
    /// Subject, where the kind carries one.
    pub subject: Option<&'a str>,
    /// Body, where the kind carries one.
    pub body: Option<&'a str>,
    /// Requested item name.
    pub item_name: Option<&'a str>,
    /// Category hint.
    pub category: Option<&'a str>,
    /// Request description.
    pub description: Option<&'a str>,
    /// Budget hint.
    pub budget: Option<&'a str>,
    /// Reference URL.
    pub reference_url: Option<&'a str>,
    /// Attachment references as JSON.
    pub attachments: &'a serde_json::Value,
    /// Reply history as JSON.
    pub replies: &'a serde_json::Value,
    /// Request status wire form.
    pub status: &'a str,
    /// Admin read flag.
    pub read: bool,
    /// Archived flag.
    pub archived: bool,
    /// Correlated order.
    pub order_id: Option<Uuid>,
    /// Submission timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}
