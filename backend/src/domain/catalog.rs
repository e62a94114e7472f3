//! Product catalogue entities.
//!
//! The catalogue is read-mostly: admins create and edit products, the
//! placement workflow reads prices and decrements stock. Categories are a
//! closed vocabulary so the shop navigation never meets a stray value.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::money::Amount;

/// Maximum length of a product name.
pub const PRODUCT_NAME_MAX: usize = 200;

/// Maximum length of a product description.
pub const PRODUCT_DESCRIPTION_MAX: usize = 2_000;

/// The fixed set of shop categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    /// Confectionery and snack foods.
    #[serde(rename = "Snacks & Sweets")]
    SnacksAndSweets,
    /// Teas, sodas and other drinks.
    #[serde(rename = "Beverages")]
    Beverages,
    /// Pens, paper and desk goods.
    #[serde(rename = "Stationery")]
    Stationery,
    /// Homeware and decorative items.
    #[serde(rename = "Home & Decor")]
    HomeAndDecor,
    /// Clothing and wearable accessories.
    #[serde(rename = "Fashion & Accessories")]
    FashionAndAccessories,
    /// Traditional craft goods and kits.
    #[serde(rename = "Traditional Crafts")]
    TraditionalCrafts,
    /// Cosmetics and skincare.
    #[serde(rename = "Beauty & Skincare")]
    BeautyAndSkincare,
    /// Toys, figures and games.
    #[serde(rename = "Toys & Figures")]
    ToysAndFigures,
}

impl Category {
    /// All categories in display order.
    pub const ALL: [Self; 8] = [
        Self::SnacksAndSweets,
        Self::Beverages,
        Self::Stationery,
        Self::HomeAndDecor,
        Self::FashionAndAccessories,
        Self::TraditionalCrafts,
        Self::BeautyAndSkincare,
        Self::ToysAndFigures,
    ];

    /// The display name, which is also the wire form.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SnacksAndSweets => "Snacks & Sweets",
            Self::Beverages => "Beverages",
            Self::Stationery => "Stationery",
            Self::HomeAndDecor => "Home & Decor",
            Self::FashionAndAccessories => "Fashion & Accessories",
            Self::TraditionalCrafts => "Traditional Crafts",
            Self::BeautyAndSkincare => "Beauty & Skincare",
            Self::ToysAndFigures => "Toys & Figures",
        }
    }
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Failures raised when parsing a [`Category`] from its wire form.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown category {0:?}")]
pub struct CategoryParseError(pub String);

impl std::str::FromStr for Category {
    type Err = CategoryParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|category| category.as_str() == s)
            .ok_or_else(|| CategoryParseError(s.to_owned()))
    }
}

/// A catalogue product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Stable identifier.
    pub id: Uuid,
    /// Display name.
    pub name: String,
    /// Marketing description.
    pub description: String,
    /// Unit price in minor units.
    pub price: Amount,
    /// File-store reference for the product image.
    pub image: String,
    /// Shop category.
    pub category: Category,
    /// Units available for sale; decremented by order placement.
    pub stock: i32,
    /// Whether the product appears in the featured strip.
    pub featured: bool,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
    /// Last modification timestamp.
    pub updated_at: DateTime<Utc>,
}

/// Failures raised when validating product fields.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProductValidationError {
    /// Name empty or too long.
    #[error("product name must be 1 to {PRODUCT_NAME_MAX} characters")]
    InvalidName,
    /// Description empty or too long.
    #[error("product description must be 1 to {PRODUCT_DESCRIPTION_MAX} characters")]
    InvalidDescription,
    /// Image reference empty.
    #[error("product image reference must not be empty")]
    EmptyImage,
    /// Stock negative.
    #[error("product stock must not be negative, got {0}")]
    NegativeStock(i32),
}

fn validate_name(name: &str) -> Result<String, ProductValidationError> {
    let name = name.trim();
    if name.is_empty() || name.chars().count() > PRODUCT_NAME_MAX {
        return Err(ProductValidationError::InvalidName);
    }
    Ok(name.to_owned())
}

fn validate_description(description: &str) -> Result<String, ProductValidationError> {
    let description = description.trim();
    if description.is_empty() || description.chars().count() > PRODUCT_DESCRIPTION_MAX {
        return Err(ProductValidationError::InvalidDescription);
    }
    Ok(description.to_owned())
}

fn validate_image(image: &str) -> Result<String, ProductValidationError> {
    let image = image.trim();
    if image.is_empty() {
        return Err(ProductValidationError::EmptyImage);
    }
    Ok(image.to_owned())
}

fn validate_stock(stock: i32) -> Result<i32, ProductValidationError> {
    if stock < 0 {
        return Err(ProductValidationError::NegativeStock(stock));
    }
    Ok(stock)
}

/// Validated payload for creating a product.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProductDraft {
    /// Display name.
    pub name: String,
    /// Marketing description.
    pub description: String,
    /// Unit price in minor units.
    pub price: Amount,
    /// File-store reference for the product image.
    pub image: String,
    /// Shop category.
    pub category: Category,
    /// Initial stock level.
    pub stock: i32,
    /// Featured flag.
    pub featured: bool,
}

impl ProductDraft {
    /// Validate raw product fields into a draft.
    pub fn new(
        name: &str,
        description: &str,
        price: Amount,
        image: &str,
        category: Category,
        stock: i32,
        featured: bool,
    ) -> Result<Self, ProductValidationError> {
        Ok(Self {
            name: validate_name(name)?,
            description: validate_description(description)?,
            price,
            image: validate_image(image)?,
            category,
            stock: validate_stock(stock)?,
            featured,
        })
    }
}

/// Partial update for an existing product; `None` fields are untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductUpdate {
    /// Replacement name.
    pub name: Option<String>,
    /// Replacement description.
    pub description: Option<String>,
    /// Replacement price.
    pub price: Option<Amount>,
    /// Replacement image reference; the old file is removed best effort.
    pub image: Option<String>,
    /// Replacement category.
    pub category: Option<Category>,
    /// Replacement stock level.
    pub stock: Option<i32>,
    /// Replacement featured flag.
    pub featured: Option<bool>,
}

impl ProductUpdate {
    /// Validate the provided fields, leaving absent ones untouched.
    pub fn validated(self) -> Result<Self, ProductValidationError> {
        Ok(Self {
            name: self.name.as_deref().map(validate_name).transpose()?,
            description: self
                .description
                .as_deref()
                .map(validate_description)
                .transpose()?,
            price: self.price,
            image: self.image.as_deref().map(validate_image).transpose()?,
            category: self.category,
            stock: self.stock.map(validate_stock).transpose()?,
            featured: self.featured,
        })
    }

    /// True when no field is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.image.is_none()
            && self.category.is_none()
            && self.stock.is_none()
            && self.featured.is_none()
    }
}

#[cfg(test)]
mod tests {
    //! Category wire-form and validation coverage.

    use std::str::FromStr;

    use rstest::rstest;

    use super::*;

    #[rstest]
    fn category_wire_form_round_trips() {
        for category in Category::ALL {
            let parsed = Category::from_str(category.as_str()).expect("round trips");
            assert_eq!(parsed, category);
            let json = serde_json::to_string(&category).expect("serialises");
            assert_eq!(json, format!("{:?}", category.as_str()));
        }
    }

    #[rstest]
    fn category_rejects_unknown_values() {
        assert!(Category::from_str("Gadgets").is_err());
    }

    #[rstest]
    fn draft_trims_and_validates() {
        let draft = ProductDraft::new(
            "  Kendama  ",
            "A wooden skill toy.",
            Amount::from_cents(2100).expect("non-negative"),
            "/uploads/kendama.jpg",
            Category::ToysAndFigures,
            10,
            false,
        )
        .expect("valid draft");
        assert_eq!(draft.name, "Kendama");
    }

    #[rstest]
    fn draft_rejects_blank_name() {
        let result = ProductDraft::new(
            "   ",
            "desc",
            Amount::ZERO,
            "/uploads/x.jpg",
            Category::Beverages,
            0,
            false,
        );
        assert_eq!(result, Err(ProductValidationError::InvalidName));
    }

    #[rstest]
    fn draft_rejects_negative_stock() {
        let result = ProductDraft::new(
            "Tea",
            "desc",
            Amount::ZERO,
            "/uploads/x.jpg",
            Category::Beverages,
            -1,
            false,
        );
        assert_eq!(result, Err(ProductValidationError::NegativeStock(-1)));
    }

    #[rstest]
    fn update_validates_only_present_fields() {
        let update = ProductUpdate {
            name: Some("New name".to_owned()),
            ..ProductUpdate::default()
        };
        assert!(update.validated().is_ok());

        let update = ProductUpdate {
            stock: Some(-5),
            ..ProductUpdate::default()
        };
        assert_eq!(
            update.validated(),
            Err(ProductValidationError::NegativeStock(-5))
        );
    }

    #[rstest]
    fn empty_update_is_detectable() {
        assert!(ProductUpdate::default().is_empty());
    }
}
