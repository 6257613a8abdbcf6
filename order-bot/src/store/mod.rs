//! Record Store Module
//!
//! The spreadsheet is the system of record for customers, catalog and
//! orders. The engine only talks to [`RecordStore`]; the backends are:
//!
//! - [`SheetStore`] - Google Sheets worksheets
//! - [`MemoryStore`] - in-process vectors (tests, dry runs)
//! - [`CachedStore`] - read cache for groups and products over either

pub mod cache;
pub mod memory;
pub mod sheets;

pub use cache::CachedStore;
pub use memory::MemoryStore;
pub use sheets::SheetStore;

use async_trait::async_trait;
use rust_decimal::Decimal;
use shared::models::{Customer, Order, OrderRecord, OrderStatus, Product};
use shared::{OrderRef, UserId};
use sheets_client::SheetsError;
use thiserror::Error;

/// Store error types
#[derive(Debug, Error)]
pub enum StoreError {
    /// Retrying later may succeed (network, rate limit, 5xx)
    #[error("Store temporarily unavailable: {0}")]
    Transient(String),

    #[error("Not found: {0}")]
    NotFound(String),

    /// A stored row could not be interpreted
    #[error("Malformed record: {0}")]
    Malformed(String),

    #[error("Backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn is_transient(&self) -> bool {
        matches!(self, StoreError::Transient(_))
    }
}

impl From<SheetsError> for StoreError {
    fn from(err: SheetsError) -> Self {
        if err.is_transient() {
            StoreError::Transient(err.to_string())
        } else {
            StoreError::Backend(err.to_string())
        }
    }
}

/// Result type for store operations
pub type StoreResult<T> = Result<T, StoreError>;

/// Persistent records used by the bot
///
/// Writes are visible to the next read (read-after-write).
#[async_trait]
pub trait RecordStore: Send + Sync {
    // ── Customers ──

    async fn find_customer(&self, id: UserId) -> StoreResult<Option<Customer>>;

    async fn list_customers(&self) -> StoreResult<Vec<Customer>>;

    /// Insert or replace by id; `true` when a new record was created
    async fn upsert_customer(&self, customer: &Customer) -> StoreResult<bool>;

    /// Overwrite the bonus balance; `false` when the customer is gone
    async fn update_customer_bonus(&self, id: UserId, balance: Decimal) -> StoreResult<bool>;

    // ── Catalog ──

    /// All products, or only those of `group`
    async fn list_products(&self, group: Option<&str>) -> StoreResult<Vec<Product>>;

    /// Insert or replace by (group, name); `true` when created
    async fn upsert_product(&self, product: &Product) -> StoreResult<bool>;

    async fn delete_product(&self, group: &str, name: &str) -> StoreResult<bool>;

    async fn list_groups(&self) -> StoreResult<Vec<String>>;

    /// `false` when a group with this name already exists
    async fn add_group(&self, name: &str) -> StoreResult<bool>;

    /// Removes the group and every product in it
    async fn delete_group(&self, name: &str) -> StoreResult<bool>;

    // ── Orders ──

    async fn append_order(&self, order: &Order) -> StoreResult<OrderRef>;

    /// All orders, or only those of one customer
    async fn list_orders(&self, customer_id: Option<UserId>) -> StoreResult<Vec<OrderRecord>>;

    async fn find_order(&self, reference: OrderRef) -> StoreResult<Option<OrderRecord>>;

    async fn set_order_status(&self, reference: OrderRef, status: OrderStatus)
    -> StoreResult<bool>;
}
