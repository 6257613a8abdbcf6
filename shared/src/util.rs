use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;

/// 货币单位后缀
pub const CURRENCY_SUFFIX: &str = "so'm";

/// 金额格式化: `40000` → `"40 000 so'm"`
///
/// 小数部分直接截断 (so'm 没有辅币)，千位用空格分隔。
pub fn format_currency(amount: Decimal) -> String {
    let whole = amount.trunc().to_i128().unwrap_or_default();
    let digits = whole.unsigned_abs().to_string();

    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(' ');
        }
        grouped.push(ch);
    }

    let sign = if whole < 0 { "-" } else { "" };
    format!("{sign}{grouped} {CURRENCY_SUFFIX}")
}

/// Render a decimal without trailing zeros (`12.50` → `12.5`, `10.0` → `10`)
pub fn format_decimal(value: Decimal) -> String {
    value.normalize().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_currency_groups_thousands() {
        assert_eq!(format_currency(Decimal::new(40000, 0)), "40 000 so'm");
        assert_eq!(format_currency(Decimal::new(1234567, 0)), "1 234 567 so'm");
        assert_eq!(format_currency(Decimal::new(999, 0)), "999 so'm");
    }

    #[test]
    fn test_format_currency_zero() {
        assert_eq!(format_currency(Decimal::ZERO), "0 so'm");
    }

    #[test]
    fn test_format_currency_truncates_fraction() {
        assert_eq!(format_currency(Decimal::new(1000099, 2)), "10 000 so'm");
    }

    #[test]
    fn test_format_decimal_drops_trailing_zeros() {
        assert_eq!(format_decimal(Decimal::new(1250, 2)), "12.5");
        assert_eq!(format_decimal(Decimal::new(100, 1)), "10");
    }
}
