use std::collections::HashMap;

use crate::model::config::QuantityDisplay;
use crate::model::item::{GRAMS_PER_LB, GRAMS_PER_OZ, Item};

/// Per-item `@qty` text and the number the item-level Quantity sort uses
#[derive(Debug, Clone, Default)]
pub struct Quantities {
    display: HashMap<u32, String>,
    value: HashMap<u32, f64>,
}

impl Quantities {
    /// Compute quantities for every item under the given display mode
    pub fn compute(items: &[Item], mode: QuantityDisplay) -> Self {
        let mut quantities = Quantities::default();
        for item in items {
            let value = item_value(item, mode);
            quantities.insert(item.id, format_display(value, mode), value);
        }
        quantities
    }

    pub fn insert(&mut self, item_id: u32, display: String, value: f64) {
        self.display.insert(item_id, display);
        self.value.insert(item_id, value);
    }

    /// The `@qty` text for an item; empty when unknown
    pub fn display(&self, item_id: u32) -> &str {
        self.display.get(&item_id).map(String::as_str).unwrap_or("")
    }

    /// The sort value for an item; zero when unknown
    pub fn value(&self, item_id: u32) -> f64 {
        self.value.get(&item_id).copied().unwrap_or(0.0)
    }
}

/// Numeric quantity of an item. Finished tins never count.
pub fn item_value(item: &Item, mode: QuantityDisplay) -> f64 {
    let grams = || -> f64 { item.tins.iter().map(|t| t.normalized_grams()).sum() };
    match mode {
        QuantityDisplay::Count => f64::from(item.quantity),
        QuantityDisplay::Tins => item.tins.iter().filter(|t| !t.finished).count() as f64,
        QuantityDisplay::Ounces => grams() / GRAMS_PER_OZ,
        QuantityDisplay::Pounds => grams() / GRAMS_PER_LB,
        QuantityDisplay::Grams => grams(),
    }
}

fn format_display(value: f64, mode: QuantityDisplay) -> String {
    match mode {
        QuantityDisplay::Count => format!("x{}", format_amount(value)),
        QuantityDisplay::Tins => format_amount(value),
        QuantityDisplay::Ounces => format!("{} oz", format_amount(value)),
        QuantityDisplay::Pounds => format!("{} lbs", format_amount(value)),
        QuantityDisplay::Grams => format!("{} g", format_amount(value)),
    }
}

/// Format an amount with at most two decimals and no trailing zeros
/// (`2`, `1.5`, `1.75`)
pub fn format_amount(value: f64) -> String {
    let text = format!("{:.2}", value);
    let text = text.trim_end_matches('0').trim_end_matches('.');
    if text == "-0" {
        "0".to_string()
    } else {
        text.to_string()
    }
}
