//! Shared validation helpers for inbound HTTP adapters.
//!
//! Every helper produces an `invalid_request` error with a structured
//! details payload naming the offending field, so clients can highlight the
//! right form control instead of parsing prose.

use std::str::FromStr;

use serde_json::json;
use uuid::Uuid;

use crate::domain::Error;
use crate::domain::catalog::Category;
use crate::domain::message::MessageKind;
use crate::domain::message::RequestStatus;
use crate::domain::money::Amount;
use crate::domain::order::OrderStatus;
use crate::domain::ports::MonthWindow;

/// Validation error codes attached to `details.code`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum ErrorCode {
    MissingField,
    InvalidUuid,
    InvalidEnum,
    InvalidAmount,
    InvalidMonth,
}

impl ErrorCode {
    fn as_str(self) -> &'static str {
        match self {
            ErrorCode::MissingField => "missing_field",
            ErrorCode::InvalidUuid => "invalid_uuid",
            ErrorCode::InvalidEnum => "invalid_enum",
            ErrorCode::InvalidAmount => "invalid_amount",
            ErrorCode::InvalidMonth => "invalid_month",
        }
    }
}

/// Newtype wrapper for HTTP field names to provide type safety.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct FieldName(&'static str);

impl FieldName {
    pub(crate) const fn new(name: &'static str) -> Self {
        Self(name)
    }

    fn as_str(&self) -> &str {
        self.0
    }
}

fn field_error(field: FieldName, message: String, code: ErrorCode, value: Option<String>) -> Error {
    let mut details = json!({
        "field": field.as_str(),
        "code": code.as_str(),
    });
    if let (Some(object), Some(value)) = (details.as_object_mut(), value) {
        object.insert("value".to_owned(), json!(value));
    }
    Error::invalid_request(message).with_details(details)
}

pub(crate) fn missing_field_error(field: FieldName) -> Error {
    let name = field.as_str().to_owned();
    field_error(
        field,
        format!("missing required field: {name}"),
        ErrorCode::MissingField,
        None,
    )
}

/// Require a non-blank string field, trimming surrounding whitespace.
pub(crate) fn require_string(value: Option<String>, field: FieldName) -> Result<String, Error> {
    let trimmed = value.map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());
    trimmed.ok_or_else(|| missing_field_error(field))
}

pub(crate) fn parse_uuid(value: &str, field: FieldName) -> Result<Uuid, Error> {
    Uuid::parse_str(value).map_err(|_| {
        let name = field.as_str().to_owned();
        field_error(
            field,
            format!("{name} must be a valid UUID"),
            ErrorCode::InvalidUuid,
            Some(value.to_owned()),
        )
    })
}

fn parse_enum<T: FromStr>(value: &str, field: FieldName, expected: &str) -> Result<T, Error> {
    T::from_str(value).map_err(|_| {
        let name = field.as_str().to_owned();
        field_error(
            field,
            format!("{name} must be one of: {expected}"),
            ErrorCode::InvalidEnum,
            Some(value.to_owned()),
        )
    })
}

pub(crate) fn parse_category(value: &str, field: FieldName) -> Result<Category, Error> {
    parse_enum(
        value,
        field,
        "Snacks & Sweets, Beverages, Stationery, Home & Decor, Fashion & Accessories, \
         Traditional Crafts, Beauty & Skincare, Toys & Figures",
    )
}

pub(crate) fn parse_order_status(value: &str, field: FieldName) -> Result<OrderStatus, Error> {
    parse_enum(value, field, "pending, processing, shipped, delivered, cancelled")
}

pub(crate) fn parse_request_status(value: &str, field: FieldName) -> Result<RequestStatus, Error> {
    parse_enum(
        value,
        field,
        "pending, reviewing, available, unavailable, replied, closed",
    )
}

pub(crate) fn parse_message_kind(value: &str, field: FieldName) -> Result<MessageKind, Error> {
    parse_enum(value, field, "contact, request, order")
}

/// Parse a price given in minor units (cents), rejecting negatives.
pub(crate) fn parse_amount(cents: i64, field: FieldName) -> Result<Amount, Error> {
    Amount::from_cents(cents).map_err(|_| {
        let name = field.as_str().to_owned();
        field_error(
            field,
            format!("{name} must be a non-negative amount in cents"),
            ErrorCode::InvalidAmount,
            Some(cents.to_string()),
        )
    })
}

/// Combine optional month/year query parameters into a window. Both must be
/// present together; the month must be 1 to 12.
pub(crate) fn parse_month_window(
    month: Option<u32>,
    year: Option<i32>,
) -> Result<Option<MonthWindow>, Error> {
    match (month, year) {
        (None, None) => Ok(None),
        (Some(month), Some(year)) if (1..=12).contains(&month) => {
            Ok(Some(MonthWindow { year, month }))
        }
        (Some(month), Some(_)) => Err(field_error(
            FieldName::new("month"),
            "month must be between 1 and 12".to_owned(),
            ErrorCode::InvalidMonth,
            Some(month.to_string()),
        )),
        _ => Err(field_error(
            FieldName::new("month"),
            "month and year must be provided together".to_owned(),
            ErrorCode::InvalidMonth,
            None,
        )),
    }
}
