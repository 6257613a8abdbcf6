//! Data models
//!
//! Records mirrored from the spreadsheet datastore. Each model corresponds
//! to one worksheet; ids are platform user ids or sheet row numbers.

pub mod customer;
pub mod order;
pub mod product;
pub mod role;

// Re-exports
pub use customer::*;
pub use order::*;
pub use product::*;
pub use role::*;
