//! Google Sheets record store
//!
//! One worksheet per collection, a header in row 1 and one record per row
//! below it. Row numbers double as order references.
//!
//! | Sheet | Columns |
//! |-------|---------|
//! | Haridorlar | ID, Ism, Telefon, Manzil, Faoliyat turi, Bonus |
//! | Mahsulotlar | Guruh nomi, Mahsulot nomi, Narx, Bonus foizi, Miqdor |
//! | Guruhlar | Guruh nomi |
//! | Buyurtmalar | Haridor ID, Buyurtmachi ismi, Telefon, Manzil, Sana, Guruh nomi, Mahsulotlar, Umumiy summa, Bonus summasi, Holat |
//!
//! Rows typed by hand are read leniently: blank rows are skipped, rows that
//! cannot be parsed are logged and skipped.

use async_trait::async_trait;
use chrono::{NaiveDate, NaiveDateTime};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use shared::models::{Customer, ORDER_TIME_FORMAT, Order, OrderRecord, OrderStatus, Product};
use shared::{OrderRef, UserId};
use sheets_client::{Cell, SheetsClient, a1};
use std::str::FromStr;
use tracing::{info, warn};

use super::{RecordStore, StoreError, StoreResult};

pub const CUSTOMERS_SHEET: &str = "Haridorlar";
pub const PRODUCTS_SHEET: &str = "Mahsulotlar";
pub const GROUPS_SHEET: &str = "Guruhlar";
pub const ORDERS_SHEET: &str = "Buyurtmalar";

const CUSTOMER_HEADERS: [&str; 6] = ["ID", "Ism", "Telefon", "Manzil", "Faoliyat turi", "Bonus"];
const PRODUCT_HEADERS: [&str; 5] = [
    "Guruh nomi",
    "Mahsulot nomi",
    "Narx",
    "Bonus foizi",
    "Miqdor",
];
const GROUP_HEADERS: [&str; 1] = ["Guruh nomi"];
const ORDER_HEADERS: [&str; 10] = [
    "Haridor ID",
    "Buyurtmachi ismi",
    "Telefon",
    "Manzil",
    "Sana",
    "Guruh nomi",
    "Mahsulotlar",
    "Umumiy summa",
    "Bonus summasi",
    "Holat",
];

const CUSTOMER_BONUS_COL: usize = 5;
const ORDER_STATUS_COL: usize = 9;

/// First row below the header
const FIRST_DATA_ROW: u32 = 2;

pub struct SheetStore {
    client: SheetsClient,
}

impl std::fmt::Debug for SheetStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SheetStore")
            .field("client", &self.client)
            .finish()
    }
}

impl SheetStore {
    pub fn new(client: SheetsClient) -> Self {
        Self { client }
    }

    /// Write the header row of every worksheet whose row 1 is empty
    pub async fn ensure_headers(&self) -> StoreResult<()> {
        for (sheet, headers) in [
            (CUSTOMERS_SHEET, &CUSTOMER_HEADERS[..]),
            (PRODUCTS_SHEET, &PRODUCT_HEADERS[..]),
            (GROUPS_SHEET, &GROUP_HEADERS[..]),
            (ORDERS_SHEET, &ORDER_HEADERS[..]),
        ] {
            let range = a1::row_range(sheet, 1, headers.len());
            let existing = self.client.get_rows(&range).await?;
            if existing.iter().flatten().all(|c| c.trim().is_empty()) {
                let row = headers.iter().map(|h| Cell::from(*h)).collect();
                self.client.update_range(&range, vec![row]).await?;
                info!(sheet, "Wrote header row");
            }
        }
        Ok(())
    }

    /// Data rows of a sheet paired with their 1-based row numbers, blank rows dropped
    async fn rows(&self, sheet: &str, columns: usize) -> StoreResult<Vec<(u32, Vec<String>)>> {
        let rows = self
            .client
            .get_rows(&a1::data_range(sheet, columns))
            .await?;
        Ok(rows
            .into_iter()
            .zip(FIRST_DATA_ROW..)
            .filter(|(cells, _)| cells.iter().any(|c| !c.trim().is_empty()))
            .map(|(cells, row)| (row, cells))
            .collect())
    }

    /// Parse every row, logging and skipping the ones that do not fit
    async fn records<T>(
        &self,
        sheet: &str,
        columns: usize,
        parse: fn(&[String]) -> StoreResult<T>,
    ) -> StoreResult<Vec<(u32, T)>> {
        let rows = self.rows(sheet, columns).await?;
        Ok(rows
            .into_iter()
            .filter_map(|(row, cells)| match parse(&cells) {
                Ok(record) => Some((row, record)),
                Err(e) => {
                    warn!(sheet, row, error = %e, "Skipping unreadable row");
                    None
                }
            })
            .collect())
    }

    async fn customer_rows(&self) -> StoreResult<Vec<(u32, Customer)>> {
        self.records(CUSTOMERS_SHEET, CUSTOMER_HEADERS.len(), parse_customer)
            .await
    }

    async fn product_rows(&self) -> StoreResult<Vec<(u32, Product)>> {
        self.records(PRODUCTS_SHEET, PRODUCT_HEADERS.len(), parse_product)
            .await
    }

    async fn group_rows(&self) -> StoreResult<Vec<(u32, String)>> {
        self.records(GROUPS_SHEET, GROUP_HEADERS.len(), parse_group)
            .await
    }

    async fn order_rows(&self) -> StoreResult<Vec<(u32, Order)>> {
        self.records(ORDERS_SHEET, ORDER_HEADERS.len(), parse_order)
            .await
    }

    /// Upsert a row located by `row`; `true` when appended
    async fn put_row(
        &self,
        sheet: &str,
        columns: usize,
        row: Option<u32>,
        cells: Vec<Cell>,
    ) -> StoreResult<bool> {
        match row {
            Some(row) => {
                self.client
                    .update_range(&a1::row_range(sheet, row, columns), vec![cells])
                    .await?;
                Ok(false)
            }
            None => {
                self.client
                    .append_row(&a1::data_range(sheet, columns), cells)
                    .await?;
                Ok(true)
            }
        }
    }
}

#[async_trait]
impl RecordStore for SheetStore {
    async fn find_customer(&self, id: UserId) -> StoreResult<Option<Customer>> {
        Ok(self
            .customer_rows()
            .await?
            .into_iter()
            .find(|(_, c)| c.id == id)
            .map(|(_, c)| c))
    }

    async fn list_customers(&self) -> StoreResult<Vec<Customer>> {
        Ok(self
            .customer_rows()
            .await?
            .into_iter()
            .map(|(_, c)| c)
            .collect())
    }

    async fn upsert_customer(&self, customer: &Customer) -> StoreResult<bool> {
        let row = self
            .customer_rows()
            .await?
            .into_iter()
            .find(|(_, c)| c.id == customer.id)
            .map(|(row, _)| row);
        self.put_row(
            CUSTOMERS_SHEET,
            CUSTOMER_HEADERS.len(),
            row,
            customer_cells(customer),
        )
        .await
    }

    async fn update_customer_bonus(&self, id: UserId, balance: Decimal) -> StoreResult<bool> {
        let Some((row, _)) = self
            .customer_rows()
            .await?
            .into_iter()
            .find(|(_, c)| c.id == id)
        else {
            return Ok(false);
        };
        self.client
            .update_range(
                &a1::cell(CUSTOMERS_SHEET, row, CUSTOMER_BONUS_COL),
                vec![vec![decimal_cell(balance)]],
            )
            .await?;
        Ok(true)
    }

    async fn list_products(&self, group: Option<&str>) -> StoreResult<Vec<Product>> {
        Ok(self
            .product_rows()
            .await?
            .into_iter()
            .map(|(_, p)| p)
            .filter(|p| group.is_none_or(|g| p.group == g))
            .collect())
    }

    async fn upsert_product(&self, product: &Product) -> StoreResult<bool> {
        let row = self
            .product_rows()
            .await?
            .into_iter()
            .find(|(_, p)| p.is_keyed(&product.group, &product.name))
            .map(|(row, _)| row);
        self.put_row(
            PRODUCTS_SHEET,
            PRODUCT_HEADERS.len(),
            row,
            product_cells(product),
        )
        .await
    }

    async fn delete_product(&self, group: &str, name: &str) -> StoreResult<bool> {
        let Some((row, _)) = self
            .product_rows()
            .await?
            .into_iter()
            .find(|(_, p)| p.is_keyed(group, name))
        else {
            return Ok(false);
        };
        self.client.delete_row(PRODUCTS_SHEET, row).await?;
        Ok(true)
    }

    async fn list_groups(&self) -> StoreResult<Vec<String>> {
        Ok(self
            .group_rows()
            .await?
            .into_iter()
            .map(|(_, g)| g)
            .collect())
    }

    async fn add_group(&self, name: &str) -> StoreResult<bool> {
        if self.group_rows().await?.iter().any(|(_, g)| g == name) {
            return Ok(false);
        }
        self.client
            .append_row(
                &a1::data_range(GROUPS_SHEET, GROUP_HEADERS.len()),
                vec![Cell::from(name)],
            )
            .await?;
        Ok(true)
    }

    async fn delete_group(&self, name: &str) -> StoreResult<bool> {
        let Some((row, _)) = self
            .group_rows()
            .await?
            .into_iter()
            .find(|(_, g)| g == name)
        else {
            return Ok(false);
        };
        self.client.delete_row(GROUPS_SHEET, row).await?;

        // Bottom-up so the remaining row numbers stay valid
        let mut product_rows: Vec<u32> = self
            .product_rows()
            .await?
            .into_iter()
            .filter(|(_, p)| p.group == name)
            .map(|(row, _)| row)
            .collect();
        product_rows.sort_unstable_by(|a, b| b.cmp(a));
        for row in product_rows {
            self.client.delete_row(PRODUCTS_SHEET, row).await?;
        }
        Ok(true)
    }

    async fn append_order(&self, order: &Order) -> StoreResult<OrderRef> {
        let row = self
            .client
            .append_row(
                &a1::data_range(ORDERS_SHEET, ORDER_HEADERS.len()),
                order_cells(order),
            )
            .await?;
        Ok(row)
    }

    async fn list_orders(&self, customer_id: Option<UserId>) -> StoreResult<Vec<OrderRecord>> {
        Ok(self
            .order_rows()
            .await?
            .into_iter()
            .filter(|(_, o)| customer_id.is_none_or(|id| o.customer_id == id))
            .map(|(reference, order)| OrderRecord { reference, order })
            .collect())
    }

    async fn find_order(&self, reference: OrderRef) -> StoreResult<Option<OrderRecord>> {
        if reference < FIRST_DATA_ROW {
            return Ok(None);
        }
        let rows = self
            .client
            .get_rows(&a1::row_range(ORDERS_SHEET, reference, ORDER_HEADERS.len()))
            .await?;
        match rows.first() {
            Some(cells) if cells.iter().any(|c| !c.trim().is_empty()) => Ok(Some(OrderRecord {
                reference,
                order: parse_order(cells)?,
            })),
            _ => Ok(None),
        }
    }

    async fn set_order_status(
        &self,
        reference: OrderRef,
        status: OrderStatus,
    ) -> StoreResult<bool> {
        if self.find_order(reference).await?.is_none() {
            return Ok(false);
        }
        self.client
            .update_range(
                &a1::cell(ORDERS_SHEET, reference, ORDER_STATUS_COL),
                vec![vec![Cell::from(status.as_str())]],
            )
            .await?;
        Ok(true)
    }
}

// ── Row mapping ─────────────────────────────────────────────────────

fn column<'a>(cells: &'a [String], index: usize) -> &'a str {
    cells.get(index).map_or("", |c| c.trim())
}

fn required<'a>(cells: &'a [String], index: usize, field: &str) -> StoreResult<&'a str> {
    let value = column(cells, index);
    if value.is_empty() {
        return Err(StoreError::Malformed(format!("{field} is empty")));
    }
    Ok(value)
}

/// Lenient decimal: `""` is zero, thousands separators are ignored
fn parse_decimal(raw: &str, field: &str) -> StoreResult<Decimal> {
    let cleaned: String = raw
        .chars()
        .filter(|c| !c.is_whitespace() && *c != '\u{a0}')
        .map(|c| if c == ',' { '.' } else { c })
        .collect();
    if cleaned.is_empty() {
        return Ok(Decimal::ZERO);
    }
    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .map_err(|_| StoreError::Malformed(format!("{field}: `{raw}` is not a number")))
}

fn parse_user_id(raw: &str) -> StoreResult<UserId> {
    raw.parse::<UserId>()
        .or_else(|_| {
            parse_decimal(raw, "id")?
                .to_i64()
                .ok_or_else(|| StoreError::Malformed(format!("id out of range: {raw}")))
        })
        .map_err(|_| StoreError::Malformed(format!("`{raw}` is not a user id")))
}

fn parse_timestamp(raw: &str) -> StoreResult<NaiveDateTime> {
    NaiveDateTime::parse_from_str(raw, ORDER_TIME_FORMAT)
        .or_else(|_| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d").map(|d| d.and_time(chrono::NaiveTime::MIN))
        })
        .map_err(|_| StoreError::Malformed(format!("`{raw}` is not a timestamp")))
}

fn decimal_cell(value: Decimal) -> Cell {
    match value.to_f64() {
        Some(n) => Cell::Number(n),
        None => Cell::Text(value.to_string()),
    }
}

fn parse_customer(cells: &[String]) -> StoreResult<Customer> {
    let role = required(cells, 4, "Faoliyat turi")?;
    Ok(Customer {
        id: parse_user_id(required(cells, 0, "ID")?)?,
        name: column(cells, 1).to_string(),
        phone: column(cells, 2).to_string(),
        address: column(cells, 3).to_string(),
        role: role
            .parse()
            .map_err(|e| StoreError::Malformed(format!("Faoliyat turi: {e}")))?,
        bonus: parse_decimal(column(cells, 5), "Bonus")?,
    })
}

fn customer_cells(customer: &Customer) -> Vec<Cell> {
    vec![
        Cell::Number(customer.id as f64),
        Cell::from(customer.name.as_str()),
        Cell::from(customer.phone.as_str()),
        Cell::from(customer.address.as_str()),
        Cell::from(customer.role.label()),
        decimal_cell(customer.bonus),
    ]
}

fn parse_product(cells: &[String]) -> StoreResult<Product> {
    let quantity = parse_decimal(column(cells, 4), "Miqdor")?;
    Ok(Product {
        group: required(cells, 0, "Guruh nomi")?.to_string(),
        name: required(cells, 1, "Mahsulot nomi")?.to_string(),
        price: parse_decimal(required(cells, 2, "Narx")?, "Narx")?,
        bonus_percent: parse_decimal(column(cells, 3), "Bonus foizi")?,
        quantity: quantity.trunc().to_u32().unwrap_or(0),
    })
}

fn product_cells(product: &Product) -> Vec<Cell> {
    vec![
        Cell::from(product.group.as_str()),
        Cell::from(product.name.as_str()),
        decimal_cell(product.price),
        decimal_cell(product.bonus_percent),
        Cell::Number(f64::from(product.quantity)),
    ]
}

fn parse_group(cells: &[String]) -> StoreResult<String> {
    Ok(required(cells, 0, "Guruh nomi")?.to_string())
}

fn parse_order(cells: &[String]) -> StoreResult<Order> {
    Ok(Order {
        customer_id: parse_user_id(required(cells, 0, "Haridor ID")?)?,
        customer_name: column(cells, 1).to_string(),
        phone: column(cells, 2).to_string(),
        address: column(cells, 3).to_string(),
        created_at: parse_timestamp(required(cells, 4, "Sana")?)?,
        group: column(cells, 5).to_string(),
        items_text: column(cells, 6).to_string(),
        total_sum: parse_decimal(column(cells, 7), "Umumiy summa")?,
        bonus_sum: parse_decimal(column(cells, 8), "Bonus summasi")?,
        status: column(cells, 9).parse().map_err(StoreError::Malformed)?,
    })
}

fn order_cells(order: &Order) -> Vec<Cell> {
    vec![
        Cell::Number(order.customer_id as f64),
        Cell::from(order.customer_name.as_str()),
        Cell::from(order.phone.as_str()),
        Cell::from(order.address.as_str()),
        Cell::from(order.created_at.format(ORDER_TIME_FORMAT).to_string()),
        Cell::from(order.group.as_str()),
        Cell::from(order.items_text.as_str()),
        decimal_cell(order.total_sum),
        decimal_cell(order.bonus_sum),
        Cell::from(order.status.as_str()),
    ]
}
