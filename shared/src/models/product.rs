//! Product Model

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Product entity (Mahsulot)
///
/// Identified by `(group, name)`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    /// Owning group name
    pub group: String,
    pub name: String,
    /// Unit price, > 0
    pub price: Decimal,
    /// Contractor bonus in percent, 0..=100
    pub bonus_percent: Decimal,
    /// Available stock
    pub quantity: u32,
}

impl Product {
    pub fn is_keyed(&self, group: &str, name: &str) -> bool {
        self.group == group && self.name == name
    }
}
