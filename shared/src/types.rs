//! Common types for the shared crate

/// Chat platform user id (Telegram ids are 64-bit signed integers)
pub type UserId = i64;

/// Reference to a stored order: the 1-based row number in the orders sheet
pub type OrderRef = u32;
