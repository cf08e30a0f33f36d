//! Display formatting for amounts, percentages and dates.

use std::sync::OnceLock;

use numfmt::{Formatter, Precision};
use time::{Date, format_description::BorrowedFormatItem, macros::format_description};

/// Format an amount as a currency string, e.g. `$1,234.50`.
///
/// Negative amounts render with a leading minus, e.g. `-$5.00`.
pub fn currency(number: f64) -> String {
    static POSITIVE_FMT: OnceLock<Formatter> = OnceLock::new();

    let positive_fmt = POSITIVE_FMT.get_or_init(|| {
        Formatter::currency("$")
            .unwrap()
            .precision(Precision::Decimals(2))
    });

    static NEGATIVE_FMT: OnceLock<Formatter> = OnceLock::new();

    let negative_fmt = NEGATIVE_FMT.get_or_init(|| {
        Formatter::currency("-$")
            .unwrap()
            .precision(Precision::Decimals(2))
    });

    let mut formatted_string = if number < 0.0 {
        negative_fmt.fmt_string(number.abs())
    } else if number > 0.0 {
        positive_fmt.fmt_string(number)
    } else {
        // Zero is hardcoded as "0", so we must specify the formatted string for zero
        return "$0.00".to_owned();
    };

    // numfmt omits the last trailing zero, so we must add it ourselves
    // For example, "12.30" is rendered as "12.3" so we append "0".
    let bytes = formatted_string.as_bytes();
    if bytes.len() < 3 || bytes[bytes.len() - 3] != b'.' {
        formatted_string = format!("{formatted_string}0");
    }

    formatted_string
}

/// Format a percentage with one decimal place, e.g. `42.5%`.
pub fn percentage(value: f64) -> String {
    format!("{value:.1}%")
}

const DISPLAY_DATE_FORMAT: &[BorrowedFormatItem] =
    format_description!("[month repr:short] [day], [year]");

const DISPLAY_MONTH_FORMAT: &[BorrowedFormatItem] = format_description!("[month repr:long] [year]");

/// Format a date for display in lists, e.g. `Jun 15, 2025`.
pub fn display_date(date: Date) -> String {
    date.format(DISPLAY_DATE_FORMAT)
        .unwrap_or_else(|_| date.to_string())
}

/// Format a date as its month heading, e.g. `June 2025`.
pub fn display_month(date: Date) -> String {
    date.format(DISPLAY_MONTH_FORMAT)
        .unwrap_or_else(|_| date.to_string())
}

#[cfg(test)]
mod tests {
    use time::macros::date;

    use crate::formatting::{currency, display_date, display_month, percentage};

    #[test]
    fn formats_positive_amounts_with_separators() {
        assert_eq!(currency(1234.5), "$1,234.50");
        assert_eq!(currency(12.3), "$12.30");
        assert_eq!(currency(0.01), "$0.01");
    }

    #[test]
    fn formats_negative_amounts_with_leading_minus() {
        assert_eq!(currency(-5.0), "-$5.00");
        assert_eq!(currency(-1234.56), "-$1,234.56");
    }

    #[test]
    fn formats_zero_with_two_decimals() {
        assert_eq!(currency(0.0), "$0.00");
    }

    #[test]
    fn pads_amounts_that_round_to_a_single_decimal() {
        assert_eq!(currency(0.001), "$0.00");
        assert_eq!(currency(5.1), "$5.10");
        assert_eq!(currency(-0.1), "-$0.10");
    }

    #[test]
    fn formats_percentages_with_one_decimal() {
        assert_eq!(percentage(100.0), "100.0%");
        assert_eq!(percentage(42.55), "42.6%");
        assert_eq!(percentage(0.0), "0.0%");
    }

    #[test]
    fn formats_display_dates() {
        assert_eq!(display_date(date!(2025 - 06 - 15)), "Jun 15, 2025");
        assert_eq!(display_date(date!(2025 - 01 - 05)), "Jan 05, 2025");
    }

    #[test]
    fn formats_month_headings() {
        assert_eq!(display_month(date!(2025 - 06 - 15)), "June 2025");
        assert_eq!(display_month(date!(2024 - 12 - 31)), "December 2024");
    }
}
