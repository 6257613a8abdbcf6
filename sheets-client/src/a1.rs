//! A1 notation helpers
//!
//! Rows are 1-based, columns 0-based (`0` → `A`).

/// Column index to letters: `0` → `A`, `25` → `Z`, `26` → `AA`
pub fn column_letter(index: usize) -> String {
    let mut n = index + 1;
    let mut letters = Vec::new();
    while n > 0 {
        let rem = (n - 1) % 26;
        letters.push(b'A' + rem as u8);
        n = (n - 1) / 26;
    }
    letters.reverse();
    String::from_utf8(letters).unwrap_or_default()
}

/// Quote a sheet title when it contains anything but letters and digits
pub fn quote_sheet(title: &str) -> String {
    if title.chars().all(|c| c.is_ascii_alphanumeric() || c == '_') {
        title.to_string()
    } else {
        format!("'{}'", title.replace('\'', "''"))
    }
}

/// Whole-sheet data range below the header: `Sheet!A2:F`
pub fn data_range(sheet: &str, columns: usize) -> String {
    format!(
        "{}!A2:{}",
        quote_sheet(sheet),
        column_letter(columns.saturating_sub(1))
    )
}

/// One full row: `Sheet!A5:F5`
pub fn row_range(sheet: &str, row: u32, columns: usize) -> String {
    format!(
        "{}!A{row}:{}{row}",
        quote_sheet(sheet),
        column_letter(columns.saturating_sub(1))
    )
}

/// A single cell: `Sheet!F5`
pub fn cell(sheet: &str, row: u32, column: usize) -> String {
    format!("{}!{}{row}", quote_sheet(sheet), column_letter(column))
}

/// Extract the first row number from a range such as `Orders!A5:J5`
///
/// Used to learn where an append landed.
pub fn first_row(range: &str) -> Option<u32> {
    let cells = range.rsplit_once('!').map_or(range, |(_, cells)| cells);
    let start = cells.split(':').next()?;
    let digits: String = start.chars().skip_while(|c| c.is_ascii_alphabetic()).collect();
    digits.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_letters() {
        assert_eq!(column_letter(0), "A");
        assert_eq!(column_letter(5), "F");
        assert_eq!(column_letter(25), "Z");
        assert_eq!(column_letter(26), "AA");
        assert_eq!(column_letter(27), "AB");
        assert_eq!(column_letter(701), "ZZ");
        assert_eq!(column_letter(702), "AAA");
    }

    #[test]
    fn test_ranges() {
        assert_eq!(data_range("Haridorlar", 6), "Haridorlar!A2:F");
        assert_eq!(row_range("Buyurtmalar", 5, 10), "Buyurtmalar!A5:J5");
        assert_eq!(cell("Haridorlar", 3, 5), "Haridorlar!F3");
    }

    #[test]
    fn test_sheet_titles_with_spaces_are_quoted() {
        assert_eq!(quote_sheet("My Orders"), "'My Orders'");
        assert_eq!(quote_sheet("Bob's"), "'Bob''s'");
        assert_eq!(quote_sheet("Guruhlar"), "Guruhlar");
    }

    #[test]
    fn test_first_row_from_updated_range() {
        assert_eq!(first_row("Buyurtmalar!A5:J5"), Some(5));
        assert_eq!(first_row("'My Orders'!A12:J12"), Some(12));
        assert_eq!(first_row("A7"), Some(7));
        assert_eq!(first_row("Sheet!A:J"), None);
    }
}
