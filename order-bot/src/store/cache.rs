//! Catalog read cache
//!
//! Groups and products are read on nearly every customer step but change
//! only when an admin edits the catalog. Reads are served from memory;
//! any write to a collection drops that collection's cache so the next read
//! goes back to the store. Customers and orders are never cached.

use async_trait::async_trait;
use parking_lot::RwLock;
use rust_decimal::Decimal;
use shared::models::{Customer, Order, OrderRecord, OrderStatus, Product};
use shared::{OrderRef, UserId};
use std::collections::HashMap;
use tracing::debug;

use super::{RecordStore, StoreResult};

pub struct CachedStore<S> {
    inner: S,
    /// Group filter (None = all) -> products
    products: RwLock<HashMap<Option<String>, Vec<Product>>>,
    groups: RwLock<Option<Vec<String>>>,
}

impl<S> std::fmt::Debug for CachedStore<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachedStore")
            .field("product_entries", &self.products.read().len())
            .field("groups_cached", &self.groups.read().is_some())
            .finish()
    }
}

impl<S: RecordStore> CachedStore<S> {
    pub fn new(inner: S) -> Self {
        Self {
            inner,
            products: RwLock::new(HashMap::new()),
            groups: RwLock::new(None),
        }
    }

    pub fn inner(&self) -> &S {
        &self.inner
    }

    fn invalidate_products(&self) {
        self.products.write().clear();
        debug!("Product cache invalidated");
    }

    fn invalidate_groups(&self) {
        *self.groups.write() = None;
        debug!("Group cache invalidated");
    }
}

#[async_trait]
impl<S: RecordStore> RecordStore for CachedStore<S> {
    async fn find_customer(&self, id: UserId) -> StoreResult<Option<Customer>> {
        self.inner.find_customer(id).await
    }

    async fn list_customers(&self) -> StoreResult<Vec<Customer>> {
        self.inner.list_customers().await
    }

    async fn upsert_customer(&self, customer: &Customer) -> StoreResult<bool> {
        self.inner.upsert_customer(customer).await
    }

    async fn update_customer_bonus(&self, id: UserId, balance: Decimal) -> StoreResult<bool> {
        self.inner.update_customer_bonus(id, balance).await
    }

    async fn list_products(&self, group: Option<&str>) -> StoreResult<Vec<Product>> {
        let key = group.map(str::to_string);
        let cached = self.products.read().get(&key).cloned();
        if let Some(products) = cached {
            return Ok(products);
        }

        let products = self.inner.list_products(group).await?;
        self.products.write().insert(key, products.clone());
        Ok(products)
    }

    async fn upsert_product(&self, product: &Product) -> StoreResult<bool> {
        let result = self.inner.upsert_product(product).await;
        self.invalidate_products();
        result
    }

    async fn delete_product(&self, group: &str, name: &str) -> StoreResult<bool> {
        let result = self.inner.delete_product(group, name).await;
        self.invalidate_products();
        result
    }

    async fn list_groups(&self) -> StoreResult<Vec<String>> {
        let cached = self.groups.read().clone();
        if let Some(groups) = cached {
            return Ok(groups);
        }

        let groups = self.inner.list_groups().await?;
        *self.groups.write() = Some(groups.clone());
        Ok(groups)
    }

    async fn add_group(&self, name: &str) -> StoreResult<bool> {
        let result = self.inner.add_group(name).await;
        self.invalidate_groups();
        result
    }

    async fn delete_group(&self, name: &str) -> StoreResult<bool> {
        let result = self.inner.delete_group(name).await;
        self.invalidate_groups();
        self.invalidate_products();
        result
    }

    async fn append_order(&self, order: &Order) -> StoreResult<OrderRef> {
        self.inner.append_order(order).await
    }

    async fn list_orders(&self, customer_id: Option<UserId>) -> StoreResult<Vec<OrderRecord>> {
        self.inner.list_orders(customer_id).await
    }

    async fn find_order(&self, reference: OrderRef) -> StoreResult<Option<OrderRecord>> {
        self.inner.find_order(reference).await
    }

    async fn set_order_status(
        &self,
        reference: OrderRef,
        status: OrderStatus,
    ) -> StoreResult<bool> {
        self.inner.set_order_status(reference, status).await
    }
}
