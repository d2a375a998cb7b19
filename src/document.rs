//! Stored document form of an [`Item`]
//!
//! The store keeps each item as a JSON object keyed by document id. The id
//! lives outside the body. Decoding is explicit per field: absent fields
//! take the record defaults, present fields of the wrong shape are errors.

use serde_json::{Map, Value};
use thiserror::Error;

use crate::domain::Item;

pub const FIELD_NAME: &str = "name";
pub const FIELD_QUANTITY: &str = "quantity";
pub const FIELD_UNIT_PRICE: &str = "unitPrice";
pub const FIELD_CATEGORY: &str = "category";
pub const FIELD_PURCHASED: &str = "purchased";

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecodeError {
    #[error("document has no id")]
    MissingId,
    #[error("document {id}: body is not an object")]
    NotAnObject { id: String },
    #[error("document {id}: field `{field}` has the wrong type")]
    WrongType { id: String, field: &'static str },
    #[error("document {id}: field `{field}` is out of range")]
    OutOfRange { id: String, field: &'static str },
}

impl Item {
    /// Document body for this item (everything except the id)
    pub fn to_document(&self) -> Map<String, Value> {
        let mut doc = Map::new();
        doc.insert(FIELD_NAME.into(), Value::from(self.name.clone()));
        doc.insert(FIELD_QUANTITY.into(), Value::from(self.quantity));
        doc.insert(FIELD_UNIT_PRICE.into(), Value::from(self.unit_price));
        doc.insert(FIELD_CATEGORY.into(), Value::from(self.category.clone()));
        doc.insert(FIELD_PURCHASED.into(), Value::from(self.purchased));
        doc
    }
}

/// Decode one stored document
pub fn decode_document(id: &str, body: &Value) -> Result<Item, DecodeError> {
    if id.is_empty() {
        return Err(DecodeError::MissingId);
    }
    let fields = body
        .as_object()
        .ok_or_else(|| DecodeError::NotAnObject { id: id.to_string() })?;
    let wrong = |field| DecodeError::WrongType { id: id.to_string(), field };
    let range = |field| DecodeError::OutOfRange { id: id.to_string(), field };

    let name = match fields.get(FIELD_NAME) {
        None | Some(Value::Null) => String::new(),
        Some(v) => v.as_str().ok_or_else(|| wrong(FIELD_NAME))?.to_string(),
    };

    let quantity = match fields.get(FIELD_QUANTITY) {
        None | Some(Value::Null) => 1,
        Some(Value::Number(n)) => {
            let q = n.as_i64().ok_or_else(|| range(FIELD_QUANTITY))?;
            if q < 1 {
                return Err(range(FIELD_QUANTITY));
            }
            u32::try_from(q).map_err(|_| range(FIELD_QUANTITY))?
        }
        Some(_) => return Err(wrong(FIELD_QUANTITY)),
    };

    let unit_price = match fields.get(FIELD_UNIT_PRICE) {
        None | Some(Value::Null) => 0.0,
        Some(Value::Number(n)) => {
            let p = n.as_f64().ok_or_else(|| range(FIELD_UNIT_PRICE))?;
            if !p.is_finite() || p < 0.0 {
                return Err(range(FIELD_UNIT_PRICE));
            }
            p
        }
        Some(_) => return Err(wrong(FIELD_UNIT_PRICE)),
    };

    let category = match fields.get(FIELD_CATEGORY) {
        None | Some(Value::Null) => String::new(),
        Some(v) => v.as_str().ok_or_else(|| wrong(FIELD_CATEGORY))?.to_string(),
    };

    let purchased = match fields.get(FIELD_PURCHASED) {
        None | Some(Value::Null) => false,
        Some(v) => v.as_bool().ok_or_else(|| wrong(FIELD_PURCHASED))?,
    };

    Ok(Item {
        id: id.to_string(),
        name,
        quantity,
        unit_price,
        category,
        purchased,
    })
}

/// Decode a full listing. Good documents are kept even when others fail.
pub fn decode_snapshot<'a, I>(docs: I) -> (Vec<Item>, Vec<DecodeError>)
where
    I: IntoIterator<Item = (&'a str, &'a Value)>,
{
    let mut items = Vec::new();
    let mut errors = Vec::new();
    for (id, body) in docs {
        match decode_document(id, body) {
            Ok(item) => items.push(item),
            Err(e) => errors.push(e),
        }
    }
    (items, errors)
}
