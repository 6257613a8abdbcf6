//! Shared types for the order bot
//!
//! Domain records kept in the spreadsheet (customers, products, groups,
//! orders), the chat message contract between the transport and the
//! conversation engine, and small formatting helpers.

pub mod message;
pub mod models;
pub mod types;
pub mod util;

// Re-exports
pub use message::{Button, Inbound, Keyboard, Outbound};
pub use serde::{Deserialize, Serialize};
pub use types::{OrderRef, UserId};
