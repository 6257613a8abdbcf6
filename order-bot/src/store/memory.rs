//! In-memory record store
//!
//! Order references mirror sheet rows: the first order is row 2, right
//! below the header, so references behave the same on both backends.

use async_trait::async_trait;
use parking_lot::RwLock;
use rust_decimal::Decimal;
use shared::models::{Customer, Order, OrderRecord, OrderStatus, Product};
use shared::{OrderRef, UserId};
use std::sync::atomic::{AtomicBool, Ordering};

use super::{RecordStore, StoreError, StoreResult};

/// Row number of the first data row
const FIRST_ROW: OrderRef = 2;

#[derive(Debug, Default)]
pub struct MemoryStore {
    customers: RwLock<Vec<Customer>>,
    products: RwLock<Vec<Product>>,
    groups: RwLock<Vec<String>>,
    orders: RwLock<Vec<Order>>,
    /// When set every call fails with [`StoreError::Transient`]
    unavailable: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Simulate an outage of the backing store
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn check(&self) -> StoreResult<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(StoreError::Transient("memory store marked unavailable".into()));
        }
        Ok(())
    }

    fn index_of(reference: OrderRef) -> Option<usize> {
        reference.checked_sub(FIRST_ROW).map(|i| i as usize)
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn find_customer(&self, id: UserId) -> StoreResult<Option<Customer>> {
        self.check()?;
        Ok(self.customers.read().iter().find(|c| c.id == id).cloned())
    }

    async fn list_customers(&self) -> StoreResult<Vec<Customer>> {
        self.check()?;
        Ok(self.customers.read().clone())
    }

    async fn upsert_customer(&self, customer: &Customer) -> StoreResult<bool> {
        self.check()?;
        let mut customers = self.customers.write();
        match customers.iter_mut().find(|c| c.id == customer.id) {
            Some(existing) => {
                *existing = customer.clone();
                Ok(false)
            }
            None => {
                customers.push(customer.clone());
                Ok(true)
            }
        }
    }

    async fn update_customer_bonus(&self, id: UserId, balance: Decimal) -> StoreResult<bool> {
        self.check()?;
        let mut customers = self.customers.write();
        match customers.iter_mut().find(|c| c.id == id) {
            Some(customer) => {
                customer.bonus = balance;
                Ok(true)
            }
            None => Ok(false),
        }
    }

    async fn list_products(&self, group: Option<&str>) -> StoreResult<Vec<Product>> {
        self.check()?;
        Ok(self
            .products
            .read()
            .iter()
            .filter(|p| group.is_none_or(|g| p.group == g))
            .cloned()
            .collect())
    }

    async fn upsert_product(&self, product: &Product) -> StoreResult<bool> {
        self.check()?;
        let mut products = self.products.write();
        match products
            .iter_mut()
            .find(|p| p.is_keyed(&product.group, &product.name))
        {
            Some(existing) => {
                *existing = product.clone();
                Ok(false)
            }
            None => {
                products.push(product.clone());
                Ok(true)
            }
        }
    }

    async fn delete_product(&self, group: &str, name: &str) -> StoreResult<bool> {
        self.check()?;
        let mut products = self.products.write();
        let before = products.len();
        products.retain(|p| !p.is_keyed(group, name));
        Ok(products.len() != before)
    }

    async fn list_groups(&self) -> StoreResult<Vec<String>> {
        self.check()?;
        Ok(self.groups.read().clone())
    }

    async fn add_group(&self, name: &str) -> StoreResult<bool> {
        self.check()?;
        let mut groups = self.groups.write();
        if groups.iter().any(|g| g == name) {
            return Ok(false);
        }
        groups.push(name.to_string());
        Ok(true)
    }

    async fn delete_group(&self, name: &str) -> StoreResult<bool> {
        self.check()?;
        let mut groups = self.groups.write();
        let before = groups.len();
        groups.retain(|g| g != name);
        if groups.len() == before {
            return Ok(false);
        }
        self.products.write().retain(|p| p.group != name);
        Ok(true)
    }

    async fn append_order(&self, order: &Order) -> StoreResult<OrderRef> {
        self.check()?;
        let mut orders = self.orders.write();
        orders.push(order.clone());
        OrderRef::try_from(orders.len() - 1)
            .ok()
            .and_then(|i| i.checked_add(FIRST_ROW))
            .ok_or_else(|| StoreError::Backend("order table is full".into()))
    }

    async fn list_orders(&self, customer_id: Option<UserId>) -> StoreResult<Vec<OrderRecord>> {
        self.check()?;
        Ok(self
            .orders
            .read()
            .iter()
            .zip(FIRST_ROW..)
            .filter(|(order, _)| customer_id.is_none_or(|id| order.customer_id == id))
            .map(|(order, reference)| OrderRecord {
                reference,
                order: order.clone(),
            })
            .collect())
    }

    async fn find_order(&self, reference: OrderRef) -> StoreResult<Option<OrderRecord>> {
        self.check()?;
        let orders = self.orders.read();
        Ok(Self::index_of(reference)
            .and_then(|i| orders.get(i))
            .map(|order| OrderRecord {
                reference,
                order: order.clone(),
            }))
    }

    async fn set_order_status(
        &self,
        reference: OrderRef,
        status: OrderStatus,
    ) -> StoreResult<bool> {
        self.check()?;
        let mut orders = self.orders.write();
        match Self::index_of(reference).and_then(|i| orders.get_mut(i)) {
            Some(order) => {
                order.status = status;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
