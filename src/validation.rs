//! Entry form validation
//!
//! Turns raw text typed into the item form into [`ItemFields`]. Every field
//! is checked independently so the caller can show all problems at once.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::ItemFields;

/// Plain decimal, `.` separator, optional sign. Rejects exponents, `inf` and `NaN`.
static DECIMAL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[+-]?(?:\d+(?:\.\d*)?|\.\d+)$").expect("decimal pattern is valid")
});

/// Why a single field was rejected
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum ValidationError {
    #[error("this field is required")]
    EmptyField,
    #[error("not a valid number")]
    InvalidFormat,
    #[error("must be at least 1")]
    NotPositive,
    #[error("must not be negative")]
    Negative,
}

/// Per-field rejections. A field that passed is `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldErrors {
    pub name: Option<ValidationError>,
    pub quantity: Option<ValidationError>,
    pub price: Option<ValidationError>,
    pub category: Option<ValidationError>,
}

impl FieldErrors {
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// `(field name, error)` pairs for every rejected field, in form order
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, ValidationError)> + '_ {
        [
            ("name", self.name),
            ("quantity", self.quantity),
            ("price", self.price),
            ("category", self.category),
        ]
        .into_iter()
        .filter_map(|(field, err)| err.map(|e| (field, e)))
    }
}

impl std::fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut first = true;
        for (field, err) in self.iter() {
            if !first {
                f.write_str("; ")?;
            }
            write!(f, "{}: {}", field, err)?;
            first = false;
        }
        Ok(())
    }
}

impl std::error::Error for FieldErrors {}

/// Validate and normalize the four raw form inputs.
pub fn validate_and_normalize(
    name_raw: &str,
    quantity_raw: &str,
    price_raw: &str,
    category_raw: &str,
) -> Result<ItemFields, FieldErrors> {
    let name = required(name_raw);
    let quantity = parse_quantity(quantity_raw);
    let price = parse_price(price_raw);
    let category = required(category_raw);

    match (name, quantity, price, category) {
        (Ok(name), Ok(quantity), Ok(unit_price), Ok(category)) => Ok(ItemFields {
            name,
            quantity,
            unit_price,
            category,
        }),
        (name, quantity, price, category) => Err(FieldErrors {
            name: name.err(),
            quantity: quantity.err(),
            price: price.err(),
            category: category.err(),
        }),
    }
}

fn required(raw: &str) -> Result<String, ValidationError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        Err(ValidationError::EmptyField)
    } else {
        Ok(trimmed.to_string())
    }
}

/// Parse a positive integer quantity
pub fn parse_quantity(raw: &str) -> Result<u32, ValidationError> {
    let value: i64 = raw
        .trim()
        .parse()
        .map_err(|_| ValidationError::InvalidFormat)?;
    if value <= 0 {
        return Err(ValidationError::NotPositive);
    }
    u32::try_from(value).map_err(|_| ValidationError::InvalidFormat)
}

/// Parse a unit price. Empty means "not tracked" and yields `0.0`.
/// Both `.` and `,` are accepted as the decimal separator.
pub fn parse_price(raw: &str) -> Result<f64, ValidationError> {
    let normalized = raw.trim().replace(',', ".");
    if normalized.is_empty() {
        return Ok(0.0);
    }
    if !DECIMAL.is_match(&normalized) {
        return Err(ValidationError::InvalidFormat);
    }
    let value: f64 = normalized
        .parse()
        .map_err(|_| ValidationError::InvalidFormat)?;
    // long digit runs overflow to infinity
    if !value.is_finite() {
        return Err(ValidationError::InvalidFormat);
    }
    if value < 0.0 {
        return Err(ValidationError::Negative);
    }
    // "-0" parses to negative zero
    Ok(value + 0.0)
}
