//! Product entity.
//!
//! Prices are integers in the minor currency unit (cents). Stock is only
//! moved by payment reconciliation; admin edits may set it directly.

use serde::{Deserialize, Serialize};

use crate::domain::foundation::{ProductId, Timestamp, ValidationError};

/// Currency assigned to products created without one.
pub const DEFAULT_CURRENCY: &str = "usd";

/// A product in the catalog.
///
/// # Invariants
///
/// - `name` is never blank
/// - `price >= 1`
/// - `stock >= 0` whenever set through `create` or `apply`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: Option<String>,

    /// Unit price in minor currency units.
    pub price: i64,

    /// Lower-case ISO 4217 code.
    pub currency: String,

    pub stock: i32,

    /// Inactive products are hidden from listings and cannot be bought.
    pub active: bool,

    pub image_url: Option<String>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

/// Input for creating a product.
#[derive(Debug, Clone, Default)]
pub struct NewProduct {
    pub name: String,
    pub description: Option<String>,
    pub price: i64,
    pub currency: Option<String>,
    pub stock: Option<i32>,
    pub image_url: Option<String>,
}

/// Partial update; `None` leaves a field untouched.
///
/// Nullable columns take `Some(None)` to clear the stored value.
#[derive(Debug, Clone, Default)]
pub struct ProductPatch {
    pub name: Option<String>,
    pub description: Option<Option<String>>,
    pub price: Option<i64>,
    pub currency: Option<String>,
    pub stock: Option<i32>,
    pub image_url: Option<Option<String>>,
    pub active: Option<bool>,
}

impl ProductPatch {
    /// True when the patch would change nothing.
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.currency.is_none()
            && self.stock.is_none()
            && self.image_url.is_none()
            && self.active.is_none()
    }

    /// Validates supplied fields with the same rules as `Product::create`,
    /// trimming the name and lower-casing the currency.
    pub fn normalized(self) -> Result<Self, ValidationError> {
        let name = self.name.as_deref().map(validate_name).transpose()?;
        if let Some(price) = self.price {
            validate_price(price)?;
        }
        let currency = self.currency.as_deref().map(normalize_currency).transpose()?;
        if let Some(stock) = self.stock {
            validate_stock(stock)?;
        }
        Ok(Self {
            name,
            currency,
            ..self
        })
    }
}

impl Product {
    /// Creates a new active product, applying currency and stock defaults.
    pub fn create(input: NewProduct) -> Result<Self, ValidationError> {
        let name = validate_name(&input.name)?;
        validate_price(input.price)?;
        let currency = match input.currency {
            Some(c) => normalize_currency(&c)?,
            None => DEFAULT_CURRENCY.to_string(),
        };
        let stock = input.stock.unwrap_or(0);
        validate_stock(stock)?;

        let now = Timestamp::now();
        Ok(Self {
            id: ProductId::new(),
            name,
            description: input.description,
            price: input.price,
            currency,
            stock,
            active: true,
            image_url: input.image_url,
            created_at: now,
            updated_at: now,
        })
    }

    /// Applies a partial update. The product is left untouched on error.
    pub fn apply(&mut self, patch: ProductPatch) -> Result<(), ValidationError> {
        let patch = patch.normalized()?;

        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(price) = patch.price {
            self.price = price;
        }
        if let Some(currency) = patch.currency {
            self.currency = currency;
        }
        if let Some(stock) = patch.stock {
            self.stock = stock;
        }
        if let Some(image_url) = patch.image_url {
            self.image_url = image_url;
        }
        if let Some(active) = patch.active {
            self.active = active;
        }
        self.updated_at = Timestamp::now();
        Ok(())
    }

    /// Returns true if `quantity` units are currently on hand.
    pub fn has_stock_for(&self, quantity: i32) -> bool {
        self.stock >= quantity
    }
}

fn validate_name(name: &str) -> Result<String, ValidationError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::empty_field("name"));
    }
    Ok(trimmed.to_string())
}

fn validate_price(price: i64) -> Result<(), ValidationError> {
    if price < 1 {
        return Err(ValidationError::out_of_range("price", 1, i64::MAX, price));
    }
    Ok(())
}

fn validate_stock(stock: i32) -> Result<(), ValidationError> {
    if stock < 0 {
        return Err(ValidationError::out_of_range(
            "stock",
            0,
            i64::from(i32::MAX),
            i64::from(stock),
        ));
    }
    Ok(())
}

fn normalize_currency(currency: &str) -> Result<String, ValidationError> {
    let code = currency.trim().to_ascii_lowercase();
    if code.len() != 3 || !code.chars().all(|c| c.is_ascii_alphabetic()) {
        return Err(ValidationError::invalid_format(
            "currency",
            "expected a three-letter currency code",
        ));
    }
    Ok(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_product() -> NewProduct {
        NewProduct {
            name: "Field Notebook".to_string(),
            price: 500,
            ..Default::default()
        }
    }

    #[test]
    fn create_applies_currency_and_stock_defaults() {
        let product = Product::create(new_product()).unwrap();

        assert_eq!(product.currency, "usd");
        assert_eq!(product.stock, 0);
        assert!(product.active);
        assert_eq!(product.created_at, product.updated_at);
    }

    #[test]
    fn create_normalizes_currency_case() {
        let product = Product::create(NewProduct {
            currency: Some(" EUR ".to_string()),
            ..new_product()
        })
        .unwrap();
        assert_eq!(product.currency, "eur");
    }

    #[test]
    fn create_rejects_blank_name() {
        let err = Product::create(NewProduct {
            name: "   ".to_string(),
            ..new_product()
        })
        .unwrap_err();
        assert_eq!(err, ValidationError::empty_field("name"));
    }

    #[test]
    fn create_rejects_non_positive_price() {
        for price in [0, -100] {
            let err = Product::create(NewProduct {
                price,
                ..new_product()
            })
            .unwrap_err();
            assert_eq!(err.field(), "price");
        }
    }

    #[test]
    fn create_rejects_negative_stock() {
        let err = Product::create(NewProduct {
            stock: Some(-1),
            ..new_product()
        })
        .unwrap_err();
        assert_eq!(err.field(), "stock");
    }

    #[test]
    fn apply_changes_only_supplied_fields() {
        let mut product = Product::create(new_product()).unwrap();
        let before = product.clone();

        product
            .apply(ProductPatch {
                price: Some(750),
                active: Some(false),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(product.price, 750);
        assert!(!product.active);
        assert_eq!(product.name, before.name);
        assert_eq!(product.stock, before.stock);
        assert_eq!(product.currency, before.currency);
    }

    #[test]
    fn apply_clears_nullable_fields_only_when_asked() {
        let mut product = Product::create(NewProduct {
            description: Some("Dot grid".to_string()),
            image_url: Some("https://cdn.example.com/notebook.png".to_string()),
            ..new_product()
        })
        .unwrap();

        product
            .apply(ProductPatch {
                description: Some(None),
                ..Default::default()
            })
            .unwrap();

        assert_eq!(product.description, None);
        assert_eq!(
            product.image_url.as_deref(),
            Some("https://cdn.example.com/notebook.png")
        );
    }

    #[test]
    fn apply_is_all_or_nothing() {
        let mut product = Product::create(new_product()).unwrap();
        let before = product.clone();

        let result = product.apply(ProductPatch {
            name: Some("Renamed".to_string()),
            stock: Some(-5),
            ..Default::default()
        });

        assert!(result.is_err());
        assert_eq!(product, before);
    }

    #[test]
    fn normalized_patch_trims_and_lowercases() {
        let patch = ProductPatch {
            name: Some("  Mug ".to_string()),
            currency: Some("GBP".to_string()),
            ..Default::default()
        }
        .normalized()
        .unwrap();

        assert_eq!(patch.name.as_deref(), Some("Mug"));
        assert_eq!(patch.currency.as_deref(), Some("gbp"));
    }

    #[test]
    fn normalized_patch_rejects_bad_price() {
        let result = ProductPatch {
            price: Some(0),
            ..Default::default()
        }
        .normalized();
        assert!(result.is_err());
    }

    #[test]
    fn empty_patch_is_detected() {
        assert!(ProductPatch::default().is_empty());
        assert!(!ProductPatch {
            active: Some(true),
            ..Default::default()
        }
        .is_empty());
    }

    #[test]
    fn has_stock_for_compares_against_on_hand() {
        let product = Product::create(NewProduct {
            stock: Some(3),
            ..new_product()
        })
        .unwrap();

        assert!(product.has_stock_for(3));
        assert!(!product.has_stock_for(4));
    }
}
