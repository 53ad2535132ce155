use serde::{Deserialize, Serialize};

use super::domain::Product;

/// Hard budget constraint. Bounds are independent and closed: a price equal
/// to either bound passes. No tolerance buffer is ever applied; "under $50"
/// must never admit a $50.01 item.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct BudgetBounds {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl BudgetBounds {
    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }

    pub fn admits(&self, price: f64) -> bool {
        self.min.map_or(true, |min| price >= min) && self.max.map_or(true, |max| price <= max)
    }
}

/// Keep only budget-qualifying products. An empty result is not an error
/// here; the pipeline carries it forward and reports the reason at the end.
pub(crate) fn apply(products: Vec<Product>, bounds: &BudgetBounds) -> Vec<Product> {
    if bounds.is_unbounded() {
        return products;
    }

    products
        .into_iter()
        .filter(|product| bounds.admits(product.price))
        .collect()
}
