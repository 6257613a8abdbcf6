//! Input validation helpers
//!
//! Every dialogue step funnels user text through one of these before it is
//! accepted. Limits are chosen based on:
//! - Telegram callback data: 64 bytes, shared with a short token prefix
//! - Reasonable UX limits for customer names

use chrono::NaiveDate;
use regex::Regex;
use rust_decimal::Decimal;
use std::str::FromStr;
use std::sync::LazyLock;
use thiserror::Error;

// ── Text length limits ──────────────────────────────────────────────

/// Group and product names (bytes, they travel inside button tokens)
pub const MAX_CATALOG_NAME_LEN: usize = 40;

/// Customer display names (chars)
pub const MAX_CUSTOMER_NAME_LEN: usize = 100;

// ── Numeric limits ──────────────────────────────────────────────────

/// Product price in so'm
pub const MAX_PRICE: i64 = 1_000_000_000_000;

/// Units of one product in a single cart line
pub const MAX_ORDER_QUANTITY: u32 = 1_000_000;

/// Date format accepted by the order date filter
pub const DATE_INPUT_FORMAT: &str = "%Y-%m-%d";

static PHONE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^\+998\d{9}$").expect("valid phone pattern")
});

/// Why an input was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("value must not be empty")]
    Empty,
    #[error("value is too long (max {max})")]
    TooLong { max: usize },
    #[error("value is not a valid number")]
    NotANumber,
    #[error("value is out of range")]
    OutOfRange,
    #[error("value exceeds the maximum ({max})")]
    TooLarge { max: i64 },
    #[error("value has the wrong format")]
    BadFormat,
}

pub type InputResult<T> = Result<T, InputError>;

// ── Text ────────────────────────────────────────────────────────────

/// Trimmed, non-empty group/product name within [`MAX_CATALOG_NAME_LEN`] bytes
pub fn catalog_name(value: &str) -> InputResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(InputError::Empty);
    }
    if value.len() > MAX_CATALOG_NAME_LEN {
        return Err(InputError::TooLong {
            max: MAX_CATALOG_NAME_LEN,
        });
    }
    Ok(value.to_string())
}

/// Trimmed, non-empty customer name within [`MAX_CUSTOMER_NAME_LEN`] chars
pub fn customer_name(value: &str) -> InputResult<String> {
    let value = value.trim();
    if value.is_empty() {
        return Err(InputError::Empty);
    }
    if value.chars().count() > MAX_CUSTOMER_NAME_LEN {
        return Err(InputError::TooLong {
            max: MAX_CUSTOMER_NAME_LEN,
        });
    }
    Ok(value.to_string())
}

/// Uzbek mobile number: `+998` followed by nine digits
pub fn phone(value: &str) -> InputResult<String> {
    let value = value.trim();
    if PHONE_RE.is_match(value) {
        Ok(value.to_string())
    } else {
        Err(InputError::BadFormat)
    }
}

// ── Numbers ─────────────────────────────────────────────────────────

fn decimal(value: &str) -> InputResult<Decimal> {
    Decimal::from_str(value.trim()).map_err(|_| InputError::NotANumber)
}

/// Product price, strictly positive and at most [`MAX_PRICE`]
pub fn price(value: &str) -> InputResult<Decimal> {
    let price = decimal(value)?;
    if price <= Decimal::ZERO {
        return Err(InputError::OutOfRange);
    }
    if price > Decimal::from(MAX_PRICE) {
        return Err(InputError::TooLarge { max: MAX_PRICE });
    }
    Ok(price)
}

/// Bonus percent in `0..=100`
pub fn bonus_percent(value: &str) -> InputResult<Decimal> {
    let percent = decimal(value)?;
    if percent < Decimal::ZERO || percent > Decimal::ONE_HUNDRED {
        return Err(InputError::OutOfRange);
    }
    Ok(percent)
}

/// Cart quantity, a positive whole number up to [`MAX_ORDER_QUANTITY`]
pub fn order_quantity(value: &str) -> InputResult<u32> {
    let max = i64::from(MAX_ORDER_QUANTITY);
    match value.trim().parse::<i64>() {
        Ok(n) if n > max => Err(InputError::TooLarge { max }),
        Ok(n) if n > 0 => u32::try_from(n).map_err(|_| InputError::OutOfRange),
        Ok(_) => Err(InputError::OutOfRange),
        Err(_) => Err(InputError::NotANumber),
    }
}

/// Stock quantity, zero allowed
pub fn stock_quantity(value: &str) -> InputResult<u32> {
    match value.trim().parse::<i64>() {
        Ok(n) if n >= 0 => u32::try_from(n).map_err(|_| InputError::OutOfRange),
        Ok(_) => Err(InputError::OutOfRange),
        Err(_) => Err(InputError::NotANumber),
    }
}

// ── Dates ───────────────────────────────────────────────────────────

/// `YYYY-MM-DD`
pub fn date(value: &str) -> InputResult<NaiveDate> {
    NaiveDate::parse_from_str(value.trim(), DATE_INPUT_FORMAT).map_err(|_| InputError::BadFormat)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_phone_accepts_only_uzbek_mobile_format() {
        assert_eq!(phone("+998901234567"), Ok("+998901234567".to_string()));
        assert_eq!(phone(" +998901234567 "), Ok("+998901234567".to_string()));
        assert_eq!(phone("998901234567"), Err(InputError::BadFormat));
        assert_eq!(phone("+99890123456"), Err(InputError::BadFormat));
        assert_eq!(phone("+9989012345678"), Err(InputError::BadFormat));
        assert_eq!(phone("+99890123456a"), Err(InputError::BadFormat));
        assert_eq!(phone("+7 901 234 56 78"), Err(InputError::BadFormat));
    }

    #[test]
    fn test_catalog_name_limits_bytes() {
        assert_eq!(catalog_name("  Cement "), Ok("Cement".to_string()));
        assert_eq!(catalog_name("   "), Err(InputError::Empty));
        assert!(catalog_name(&"a".repeat(MAX_CATALOG_NAME_LEN)).is_ok());
        assert_eq!(
            catalog_name(&"a".repeat(MAX_CATALOG_NAME_LEN + 1)),
            Err(InputError::TooLong { max: 40 })
        );
        // 21 two-byte letters exceed 40 bytes
        assert!(catalog_name(&"ў".repeat(21)).is_err());
    }

    #[test]
    fn test_customer_name_limits_chars() {
        assert_eq!(customer_name("Aziz"), Ok("Aziz".to_string()));
        assert_eq!(customer_name(""), Err(InputError::Empty));
        assert!(customer_name(&"ў".repeat(MAX_CUSTOMER_NAME_LEN)).is_ok());
        assert!(customer_name(&"a".repeat(MAX_CUSTOMER_NAME_LEN + 1)).is_err());
    }

    #[test]
    fn test_price_must_be_positive() {
        assert_eq!(price("50000"), Ok(Decimal::new(50000, 0)));
        assert_eq!(price("12.5"), Ok(Decimal::new(125, 1)));
        assert_eq!(price("0"), Err(InputError::OutOfRange));
        assert_eq!(price("-1"), Err(InputError::OutOfRange));
        assert_eq!(price("abc"), Err(InputError::NotANumber));
    }

    #[test]
    fn test_price_is_capped() {
        assert_eq!(price("1000000000000"), Ok(Decimal::new(MAX_PRICE, 0)));
        assert_eq!(
            price("1000000000001"),
            Err(InputError::TooLarge { max: MAX_PRICE })
        );
        assert_eq!(
            price("79228162514264337593543950335"),
            Err(InputError::TooLarge { max: MAX_PRICE })
        );
    }

    #[test]
    fn test_bonus_percent_range() {
        assert_eq!(bonus_percent("0"), Ok(Decimal::ZERO));
        assert_eq!(bonus_percent("100"), Ok(Decimal::ONE_HUNDRED));
        assert_eq!(bonus_percent("10"), Ok(Decimal::new(10, 0)));
        assert_eq!(bonus_percent("100.5"), Err(InputError::OutOfRange));
        assert_eq!(bonus_percent("-0.1"), Err(InputError::OutOfRange));
        assert_eq!(bonus_percent("ten"), Err(InputError::NotANumber));
    }

    #[test]
    fn test_order_quantity() {
        assert_eq!(order_quantity("2"), Ok(2));
        assert_eq!(order_quantity(" 15 "), Ok(15));
        assert_eq!(order_quantity("0"), Err(InputError::OutOfRange));
        assert_eq!(order_quantity("-3"), Err(InputError::OutOfRange));
        assert_eq!(order_quantity("abc"), Err(InputError::NotANumber));
        assert_eq!(order_quantity("2.5"), Err(InputError::NotANumber));
        assert_eq!(order_quantity("1000000"), Ok(MAX_ORDER_QUANTITY));
        assert_eq!(
            order_quantity("1000001"),
            Err(InputError::TooLarge { max: 1_000_000 })
        );
    }

    #[test]
    fn test_stock_quantity_allows_zero() {
        assert_eq!(stock_quantity("0"), Ok(0));
        assert_eq!(stock_quantity("-1"), Err(InputError::OutOfRange));
        assert_eq!(stock_quantity("x"), Err(InputError::NotANumber));
    }

    #[test]
    fn test_date_filter_format() {
        assert_eq!(
            date("2024-05-01"),
            Ok(NaiveDate::from_ymd_opt(2024, 5, 1).unwrap())
        );
        assert_eq!(date("01.05.2024"), Err(InputError::BadFormat));
        assert_eq!(date("2024-13-01"), Err(InputError::BadFormat));
    }
}
