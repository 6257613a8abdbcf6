//! Order and bonus settlement
//!
//! Turns a cart into a staged order, and applies administrator decisions
//! to the record store:
//!
//! - [`stage_order`] - price the cart, nothing is written
//! - [`confirm_order`] / [`reject_order`] - persist a staged order
//! - [`confirm_stored_order`] / [`reject_stored_order`] - decide a Pending row
//! - [`update_bonus`] / [`withdraw_bonus`] - balance changes
//!
//! Staged orders live in the customer's session until decided; a
//! Confirmed order credits its bonus exactly once.

pub mod cart;

pub use cart::{Cart, CartItem};

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use shared::models::{Customer, Order, OrderRecord, OrderStatus};
use shared::{OrderRef, UserId};
use tracing::{error, info};
use uuid::Uuid;

use crate::store::{RecordStore, StoreError, StoreResult};

/// An order awaiting the administrator's decision
#[derive(Debug, Clone, PartialEq)]
pub struct StagedOrder {
    /// Correlates log lines of one staged order
    pub id: Uuid,
    pub order: Order,
}

impl StagedOrder {
    pub fn customer_id(&self) -> UserId {
        self.order.customer_id
    }

    pub fn bonus(&self) -> Decimal {
        self.order.bonus_sum
    }
}

/// Price a cart for `customer`; the order snapshot carries status Pending
pub fn stage_order(
    customer: &Customer,
    cart: &Cart,
    address: &str,
    created_at: NaiveDateTime,
) -> StagedOrder {
    StagedOrder {
        id: Uuid::new_v4(),
        order: Order {
            customer_id: customer.id,
            customer_name: customer.name.clone(),
            phone: customer.phone.clone(),
            address: address.to_string(),
            created_at,
            group: cart.group.clone(),
            items_text: cart.summary(),
            total_sum: cart.total_sum(),
            bonus_sum: cart.total_bonus(customer.role),
            status: OrderStatus::Pending,
        },
    }
}

/// Result of confirming a staged order
#[derive(Debug, Clone, PartialEq)]
pub enum Confirmation {
    Confirmed {
        reference: OrderRef,
        customer: Customer,
        /// Balance after the credit; `None` when nothing was credited
        balance: Option<Decimal>,
    },
    /// The customer record is gone; nothing was written
    CustomerMissing,
}

/// Persist a staged order as Confirmed and credit its bonus
pub async fn confirm_order(
    store: &dyn RecordStore,
    staged: &StagedOrder,
) -> StoreResult<Confirmation> {
    let customer_id = staged.customer_id();

    // 1. Customer must still exist
    let Some(customer) = store.find_customer(customer_id).await? else {
        return Ok(Confirmation::CustomerMissing);
    };

    // 2. Audit row
    let order = Order {
        status: OrderStatus::Confirmed,
        ..staged.order.clone()
    };
    let reference = store.append_order(&order).await?;

    // 3. Credit once
    let balance = if staged.bonus() > Decimal::ZERO {
        let balance = update_bonus(store, customer_id, staged.bonus()).await?;
        if balance.is_none() {
            error!(customer_id, stage_id = %staged.id, "Customer vanished before bonus credit");
        }
        balance
    } else {
        None
    };

    info!(
        customer_id,
        stage_id = %staged.id,
        reference,
        total = %staged.order.total_sum,
        bonus = %staged.bonus(),
        "Order confirmed"
    );
    Ok(Confirmation::Confirmed {
        reference,
        customer,
        balance,
    })
}

/// Persist a staged order as Rejected (audit trail only)
pub async fn reject_order(store: &dyn RecordStore, staged: &StagedOrder) -> StoreResult<OrderRef> {
    let order = Order {
        status: OrderStatus::Rejected,
        ..staged.order.clone()
    };
    let reference = store.append_order(&order).await?;
    info!(customer_id = staged.customer_id(), stage_id = %staged.id, reference, "Order rejected");
    Ok(reference)
}

/// Add `delta` to the customer's balance
///
/// Returns the new balance, or `None` when the customer does not exist.
pub async fn update_bonus(
    store: &dyn RecordStore,
    customer_id: UserId,
    delta: Decimal,
) -> StoreResult<Option<Decimal>> {
    let Some(customer) = store.find_customer(customer_id).await? else {
        return Ok(None);
    };
    let balance = customer.bonus.checked_add(delta).ok_or_else(|| {
        StoreError::Malformed(format!(
            "bonus of customer {customer_id} overflows: {} + {delta}",
            customer.bonus
        ))
    })?;
    if !store.update_customer_bonus(customer_id, balance).await? {
        return Ok(None);
    }
    Ok(Some(balance))
}

/// Pay out the whole balance, leaving it at zero
///
/// Bonus credited after the request was made is paid out as well. Returns
/// the balance that was withdrawn, or `None` when the customer does not exist.
pub async fn withdraw_bonus(
    store: &dyn RecordStore,
    customer_id: UserId,
) -> StoreResult<Option<Decimal>> {
    let Some(customer) = store.find_customer(customer_id).await? else {
        return Ok(None);
    };
    if !store.update_customer_bonus(customer_id, Decimal::ZERO).await? {
        return Ok(None);
    }
    info!(customer_id, withdrawn = %customer.bonus, "Bonus withdrawn");
    Ok(Some(customer.bonus))
}

/// Result of deciding an order row that is already in the store
#[derive(Debug, Clone, PartialEq)]
pub enum StoredDecision {
    Applied {
        record: OrderRecord,
        /// Balance after the credit; `None` when nothing was credited
        balance: Option<Decimal>,
    },
    AlreadyProcessed(OrderStatus),
    NotFound,
}

/// Confirm a Pending row and credit its bonus sum
pub async fn confirm_stored_order(
    store: &dyn RecordStore,
    reference: OrderRef,
) -> StoreResult<StoredDecision> {
    let Some(mut record) = store.find_order(reference).await? else {
        return Ok(StoredDecision::NotFound);
    };
    if record.order.status.is_terminal() {
        return Ok(StoredDecision::AlreadyProcessed(record.order.status));
    }

    // Mark Confirmed before crediting; a retry then sees a terminal row
    if !store
        .set_order_status(reference, OrderStatus::Confirmed)
        .await?
    {
        return Ok(StoredDecision::NotFound);
    }
    record.order.status = OrderStatus::Confirmed;

    let bonus = record.order.bonus_sum;
    let balance = if bonus > Decimal::ZERO {
        let balance = update_bonus(store, record.order.customer_id, bonus).await?;
        if balance.is_none() {
            error!(
                customer_id = record.order.customer_id,
                reference, "Bonus not credited, customer not found"
            );
        }
        balance
    } else {
        None
    };

    info!(reference, customer_id = record.order.customer_id, %bonus, "Stored order confirmed");
    Ok(StoredDecision::Applied { record, balance })
}

/// Reject a Pending row
pub async fn reject_stored_order(
    store: &dyn RecordStore,
    reference: OrderRef,
) -> StoreResult<StoredDecision> {
    let Some(mut record) = store.find_order(reference).await? else {
        return Ok(StoredDecision::NotFound);
    };
    if record.order.status.is_terminal() {
        return Ok(StoredDecision::AlreadyProcessed(record.order.status));
    }
    if !store
        .set_order_status(reference, OrderStatus::Rejected)
        .await?
    {
        return Ok(StoredDecision::NotFound);
    }
    record.order.status = OrderStatus::Rejected;

    info!(reference, customer_id = record.order.customer_id, "Stored order rejected");
    Ok(StoredDecision::Applied {
        record,
        balance: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;
    use chrono::NaiveDate;
    use shared::models::Role;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2024, 5, 1)
            .unwrap()
            .and_hms_opt(10, 0, 0)
            .unwrap()
    }

    fn customer(role: Role, bonus: i64) -> Customer {
        Customer {
            id: 7,
            name: "Aziz".to_string(),
            phone: "+998901234567".to_string(),
            address: "Lat:41.3 Lon:69.2".to_string(),
            role,
            bonus: Decimal::new(bonus, 0),
        }
    }

    fn cement_cart() -> Cart {
        let mut cart = Cart::new("Qurilish");
        cart.add(CartItem {
            product: "Cement".to_string(),
            quantity: 2,
            unit_price: Decimal::new(50000, 0),
            bonus_percent: Decimal::new(10, 0),
        })
        .unwrap();
        cart
    }

    #[test]
    fn test_stage_order_prices_cart() {
        let staged = stage_order(
            &customer(Role::Contractor, 0),
            &cement_cart(),
            "Lat:41.3 Lon:69.2",
            now(),
        );
        assert_eq!(staged.order.total_sum, Decimal::new(100000, 0));
        assert_eq!(staged.order.bonus_sum, Decimal::new(10000, 0));
        assert_eq!(staged.order.status, OrderStatus::Pending);
        assert_eq!(staged.order.group, "Qurilish");
        assert_eq!(
            staged.order.items_text,
            "Cement - 2 dona, narxi: 50 000 so'm, jami: 100 000 so'm"
        );
    }

    #[tokio::test]
    async fn test_update_bonus_is_additive() {
        let store = MemoryStore::new();
        store
            .upsert_customer(&customer(Role::Contractor, 500))
            .await
            .unwrap();

        let first = update_bonus(&store, 7, Decimal::new(1000, 0)).await.unwrap();
        let second = update_bonus(&store, 7, Decimal::new(250, 0)).await.unwrap();

        assert_eq!(first, Some(Decimal::new(1500, 0)));
        assert_eq!(second, Some(Decimal::new(1750, 0)));
        let stored = store.find_customer(7).await.unwrap().unwrap();
        assert_eq!(stored.bonus, Decimal::new(1750, 0));
    }

    #[tokio::test]
    async fn test_update_bonus_of_missing_customer() {
        let store = MemoryStore::new();
        assert_eq!(update_bonus(&store, 7, Decimal::ONE).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_confirm_order_appends_and_credits() {
        let store = MemoryStore::new();
        let contractor = customer(Role::Contractor, 0);
        store.upsert_customer(&contractor).await.unwrap();
        let staged = stage_order(&contractor, &cement_cart(), "x", now());

        let outcome = confirm_order(&store, &staged).await.unwrap();

        let Confirmation::Confirmed {
            reference, balance, ..
        } = outcome
        else {
            panic!("expected confirmation");
        };
        assert_eq!(balance, Some(Decimal::new(10000, 0)));
        let record = store.find_order(reference).await.unwrap().unwrap();
        assert_eq!(record.order.status, OrderStatus::Confirmed);
    }

    #[tokio::test]
    async fn test_confirm_order_without_customer_writes_nothing() {
        let store = MemoryStore::new();
        let staged = stage_order(&customer(Role::Contractor, 0), &cement_cart(), "x", now());

        let outcome = confirm_order(&store, &staged).await.unwrap();

        assert_eq!(outcome, Confirmation::CustomerMissing);
        assert!(store.list_orders(None).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_reject_order_keeps_audit_row() {
        let store = MemoryStore::new();
        let staged = stage_order(&customer(Role::Homeowner, 0), &cement_cart(), "x", now());

        let reference = reject_order(&store, &staged).await.unwrap();

        let record = store.find_order(reference).await.unwrap().unwrap();
        assert_eq!(record.order.status, OrderStatus::Rejected);
        assert_eq!(record.order.bonus_sum, Decimal::ZERO);
    }

    #[tokio::test]
    async fn test_withdraw_bonus_zeroes_balance() {
        let store = MemoryStore::new();
        store
            .upsert_customer(&customer(Role::Contractor, 3000))
            .await
            .unwrap();

        // Credited after the request was made, paid out too
        update_bonus(&store, 7, Decimal::new(500, 0)).await.unwrap();

        let withdrawn = withdraw_bonus(&store, 7).await.unwrap();
        assert_eq!(withdrawn, Some(Decimal::new(3500, 0)));
        let stored = store.find_customer(7).await.unwrap().unwrap();
        assert_eq!(stored.bonus, Decimal::ZERO);

        assert_eq!(withdraw_bonus(&store, 7).await.unwrap(), Some(Decimal::ZERO));
        assert_eq!(withdraw_bonus(&store, 8).await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_update_bonus_overflow_is_an_error() {
        let store = MemoryStore::new();
        let mut rich = customer(Role::Contractor, 0);
        rich.bonus = Decimal::MAX;
        store.upsert_customer(&rich).await.unwrap();

        let result = update_bonus(&store, 7, Decimal::ONE).await;

        assert!(matches!(result, Err(StoreError::Malformed(_))));
        let stored = store.find_customer(7).await.unwrap().unwrap();
        assert_eq!(stored.bonus, Decimal::MAX);
    }

    #[tokio::test]
    async fn test_stored_order_credits_once() {
        let store = MemoryStore::new();
        let contractor = customer(Role::Contractor, 0);
        store.upsert_customer(&contractor).await.unwrap();
        let staged = stage_order(&contractor, &cement_cart(), "x", now());
        let reference = store.append_order(&staged.order).await.unwrap();

        let first = confirm_stored_order(&store, reference).await.unwrap();
        let second = confirm_stored_order(&store, reference).await.unwrap();

        assert!(matches!(
            first,
            StoredDecision::Applied {
                balance: Some(b),
                ..
            } if b == Decimal::new(10000, 0)
        ));
        assert_eq!(
            second,
            StoredDecision::AlreadyProcessed(OrderStatus::Confirmed)
        );
        let stored = store.find_customer(7).await.unwrap().unwrap();
        assert_eq!(stored.bonus, Decimal::new(10000, 0));
    }

    #[tokio::test]
    async fn test_rejected_row_cannot_be_confirmed() {
        let store = MemoryStore::new();
        let staged = stage_order(&customer(Role::Contractor, 0), &cement_cart(), "x", now());
        let reference = store.append_order(&staged.order).await.unwrap();

        assert!(matches!(
            reject_stored_order(&store, reference).await.unwrap(),
            StoredDecision::Applied { .. }
        ));
        assert_eq!(
            confirm_stored_order(&store, reference).await.unwrap(),
            StoredDecision::AlreadyProcessed(OrderStatus::Rejected)
        );
        assert_eq!(
            confirm_stored_order(&store, 99).await.unwrap(),
            StoredDecision::NotFound
        );
    }
}
