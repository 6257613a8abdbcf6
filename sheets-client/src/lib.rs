//! # sheets-client
//!
//! Minimal Google Sheets v4 client - low-level row access only.
//!
//! ## Scope
//!
//! This crate handles HOW to talk to a spreadsheet:
//! - Service-account authentication (RS256 JWT grant, cached access token)
//! - Reading a range as rows of strings
//! - Appending, overwriting and deleting rows
//! - A1 range helpers
//!
//! What the rows MEAN (customers, products, orders) stays in the
//! application's record store.
//!
//! ## Example
//!
//! ```ignore
//! use sheets_client::{ServiceAccountKey, SheetsClient};
//!
//! let key = ServiceAccountKey::from_json(&std::env::var("GOOGLE_SHEETS_CREDS")?)?;
//! let client = SheetsClient::new("spreadsheet-id", key, Duration::from_secs(30))?;
//!
//! let rows = client.get_rows("Haridorlar!A2:F").await?;
//! let row = client.append_row("Buyurtmalar!A1", vec!["1".into(), "Aziz".into()]).await?;
//! ```

pub mod a1;
mod auth;
mod client;
mod error;

// Re-exports
pub use auth::{ServiceAccountAuth, ServiceAccountKey};
pub use client::{Cell, SheetsClient};
pub use error::{SheetsError, SheetsResult};
