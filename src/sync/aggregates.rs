//! Totals shown under the list

use serde::{Deserialize, Serialize};

use crate::domain::Item;

pub const DEFAULT_CURRENCY_SYMBOL: &str = "€";

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Aggregates {
    /// Σ price × quantity over the view
    pub total_planned: f64,
    /// Same sum over purchased items only
    pub total_spent: f64,
    /// Any item in the view carries a price; totals are hidden otherwise
    pub has_pricing: bool,
}

impl Aggregates {
    pub fn over(view: &[Item]) -> Self {
        view.iter().fold(Self::default(), |mut acc, item| {
            let line = item.line_total();
            acc.total_planned += line;
            if item.purchased {
                acc.total_spent += line;
            }
            acc.has_pricing |= item.unit_price > 0.0;
            acc
        })
    }

    /// Still to spend on the unpurchased part of the view
    pub fn remaining(&self) -> f64 {
        self.total_planned - self.total_spent
    }
}

/// `"€6.00"`-style rendering with a single currency symbol
pub fn format_amount(value: f64, symbol: &str) -> String {
    format!("{}{:.2}", symbol, value)
}
