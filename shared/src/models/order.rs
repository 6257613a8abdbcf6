//! Order Model

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::types::{OrderRef, UserId};

/// Timestamp layout used in the orders sheet
pub const ORDER_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Order status
///
/// `Confirmed` and `Rejected` are terminal.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
pub enum OrderStatus {
    #[default]
    Pending,
    Confirmed,
    Rejected,
}

impl OrderStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            OrderStatus::Pending => "Pending",
            OrderStatus::Confirmed => "Confirmed",
            OrderStatus::Rejected => "Rejected",
        }
    }

    pub fn is_terminal(self) -> bool {
        !matches!(self, OrderStatus::Pending)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OrderStatus {
    type Err = String;

    /// An empty cell reads as `Pending` (rows typed into the sheet by hand).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "" | "Pending" => Ok(OrderStatus::Pending),
            "Confirmed" => Ok(OrderStatus::Confirmed),
            "Rejected" => Ok(OrderStatus::Rejected),
            other => Err(format!("unknown order status: {other}")),
        }
    }
}

/// Order entity (Buyurtma)
///
/// Customer fields are a snapshot taken when the order was placed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub customer_id: UserId,
    pub customer_name: String,
    pub phone: String,
    /// Delivery address for this order
    pub address: String,
    pub created_at: NaiveDateTime,
    pub group: String,
    /// Human-readable line items, one per line
    pub items_text: String,
    pub total_sum: Decimal,
    pub bonus_sum: Decimal,
    pub status: OrderStatus,
}

impl Order {
    pub fn created_date(&self) -> chrono::NaiveDate {
        self.created_at.date()
    }
}

/// A stored order together with its sheet reference
#[derive(Debug, Clone, PartialEq)]
pub struct OrderRecord {
    pub reference: OrderRef,
    pub order: Order,
}
