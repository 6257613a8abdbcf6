//! Cart and order totals
//!
//! All arithmetic is exact (`rust_decimal`), so totals do not depend on the
//! order in which lines were added. Every operation is checked: a line whose
//! totals would overflow is refused by [`Cart::add`].

use rust_decimal::Decimal;
use shared::models::Role;
use shared::util::format_currency;
use thiserror::Error;

/// The cart totals would not fit in a `Decimal`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("cart total exceeds the representable range")]
pub struct CartOverflow;

/// One cart line; price and bonus percent are snapshots taken at add time
#[derive(Debug, Clone, PartialEq)]
pub struct CartItem {
    pub product: String,
    pub quantity: u32,
    pub unit_price: Decimal,
    pub bonus_percent: Decimal,
}

impl CartItem {
    /// price × qty, `None` on overflow
    pub fn line_total(&self) -> Option<Decimal> {
        self.unit_price.checked_mul(Decimal::from(self.quantity))
    }

    /// price × qty × percent / 100, `None` on overflow
    pub fn line_bonus(&self) -> Option<Decimal> {
        self.line_total()?
            .checked_mul(self.bonus_percent)?
            .checked_div(Decimal::ONE_HUNDRED)
    }
}

/// An accepted item with its precomputed totals
#[derive(Debug, Clone, PartialEq)]
struct CartLine {
    item: CartItem,
    total: Decimal,
}

impl CartLine {
    /// `Cement - 2 dona, narxi: 50 000 so'm, jami: 100 000 so'm`
    fn summary(&self) -> String {
        format!(
            "{} - {} dona, narxi: {}, jami: {}",
            self.item.product,
            self.item.quantity,
            format_currency(self.item.unit_price),
            format_currency(self.total)
        )
    }
}

/// Items of one product group, collected before the order is placed
#[derive(Debug, Clone, PartialEq)]
pub struct Cart {
    pub group: String,
    lines: Vec<CartLine>,
    total_sum: Decimal,
    /// Bonus as earned by a bonus-earning role
    bonus_sum: Decimal,
}

impl Cart {
    pub fn new(group: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            lines: Vec::new(),
            total_sum: Decimal::ZERO,
            bonus_sum: Decimal::ZERO,
        }
    }

    /// Add a line; the cart is left untouched when a total would overflow
    pub fn add(&mut self, item: CartItem) -> Result<(), CartOverflow> {
        let total = item.line_total().ok_or(CartOverflow)?;
        let bonus = item.line_bonus().ok_or(CartOverflow)?;
        let total_sum = self.total_sum.checked_add(total).ok_or(CartOverflow)?;
        let bonus_sum = self.bonus_sum.checked_add(bonus).ok_or(CartOverflow)?;

        self.lines.push(CartLine { item, total });
        self.total_sum = total_sum;
        self.bonus_sum = bonus_sum;
        Ok(())
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    /// Σ price × qty
    pub fn total_sum(&self) -> Decimal {
        self.total_sum
    }

    /// Σ price × qty × percent / 100 for bonus-earning roles, otherwise zero
    pub fn total_bonus(&self, role: Role) -> Decimal {
        if role.earns_bonus() {
            self.bonus_sum
        } else {
            Decimal::ZERO
        }
    }

    /// One summary line per item
    pub fn summary(&self) -> String {
        self.lines
            .iter()
            .map(CartLine::summary)
            .collect::<Vec<_>>()
            .join("\n")
    }
}
