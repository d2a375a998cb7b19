//! Item Entity
//!
//! A single line of the shopping list.

use serde::{Deserialize, Serialize};
use super::entity::Entity;

/// Category names offered as completions when editing an item.
/// Categories are free-form; these are only suggestions.
pub const CATEGORY_SUGGESTIONS: [&str; 7] = [
    "Grocery", "Produce", "Butcher", "Bakery", "Hygiene", "Cleaning", "Other",
];

/// Ordering applied to the list view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SortKey {
    /// Alphabetical by name
    #[default]
    Name,
    /// Alphabetical by category
    Category,
    /// Items still to buy first
    #[serde(rename = "purchased")]
    PurchasedStatus,
}

impl SortKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortKey::Name => "name",
            SortKey::Category => "category",
            SortKey::PurchasedStatus => "purchased",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "category" => SortKey::Category,
            "purchased" => SortKey::PurchasedStatus,
            _ => SortKey::Name,
        }
    }

    /// Document field the upstream store orders by for this key
    pub fn field(&self) -> &'static str {
        match self {
            SortKey::Name => "name",
            SortKey::Category => "category",
            SortKey::PurchasedStatus => "purchased",
        }
    }
}

/// Validated item content without identity or purchase state.
///
/// This is what the entry form produces and what `create` consumes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemFields {
    pub name: String,
    pub quantity: u32,
    pub unit_price: f64,
    pub category: String,
}

/// A shopping list item
///
/// Equality is full structural equality; the projection diff relies on it
/// to detect changed content under the same id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Item {
    /// Store-assigned identifier, empty until first save
    #[serde(default)]
    pub id: String,
    /// Display name
    pub name: String,
    /// Units to buy, at least 1
    pub quantity: u32,
    /// Price per unit, 0 when not tracked
    pub unit_price: f64,
    /// Free-form category
    pub category: String,
    /// Already in the cart
    #[serde(default)]
    pub purchased: bool,
}

impl Item {
    /// Create an item under a known id, not yet purchased
    pub fn new(id: impl Into<String>, fields: ItemFields) -> Self {
        Self {
            id: id.into(),
            name: fields.name,
            quantity: fields.quantity,
            unit_price: fields.unit_price,
            category: fields.category,
            purchased: false,
        }
    }

    /// Create an unsaved item (empty id)
    pub fn draft(fields: ItemFields) -> Self {
        Self::new(String::new(), fields)
    }

    /// Whether the store has assigned an id yet
    pub fn is_saved(&self) -> bool {
        !self.id.is_empty()
    }

    /// `unit_price × quantity`
    pub fn line_total(&self) -> f64 {
        self.unit_price * f64::from(self.quantity)
    }

    pub fn with_purchased(&self, purchased: bool) -> Self {
        Self {
            purchased,
            ..self.clone()
        }
    }

    pub fn fields(&self) -> ItemFields {
        ItemFields {
            name: self.name.clone(),
            quantity: self.quantity,
            unit_price: self.unit_price,
            category: self.category.clone(),
        }
    }
}

impl Entity for Item {
    type Id = String;

    fn id(&self) -> &Self::Id {
        &self.id
    }
}

/// Partial update of an item's fields. `None` leaves a field untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quantity: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub purchased: Option<bool>,
}

impl ItemPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.quantity.is_none()
            && self.unit_price.is_none()
            && self.category.is_none()
            && self.purchased.is_none()
    }

    pub fn purchased(purchased: bool) -> Self {
        Self {
            purchased: Some(purchased),
            ..Self::default()
        }
    }

    /// Apply the present fields onto `item`; the id is never touched
    pub fn apply(&self, item: &mut Item) {
        if let Some(name) = &self.name {
            item.name = name.clone();
        }
        if let Some(quantity) = self.quantity {
            item.quantity = quantity;
        }
        if let Some(unit_price) = self.unit_price {
            item.unit_price = unit_price;
        }
        if let Some(category) = &self.category {
            item.category = category.clone();
        }
        if let Some(purchased) = self.purchased {
            item.purchased = purchased;
        }
    }
}

impl From<ItemFields> for ItemPatch {
    fn from(fields: ItemFields) -> Self {
        Self {
            name: Some(fields.name),
            quantity: Some(fields.quantity),
            unit_price: Some(fields.unit_price),
            category: Some(fields.category),
            purchased: None,
        }
    }
}
