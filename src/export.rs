//! CSV export of a transaction list.
//!
//! Produces the `Date,Type,Category,Amount,Note` layout used by the export
//! button on the profile screen. Rows are written in list order; quoting is
//! handled by the `csv` crate.

use std::io::Write;

use crate::{Error, Transaction};

/// Write `transactions` to `writer` as CSV.
///
/// # Errors
/// Returns [Error::Csv] if a record cannot be written.
pub fn write_csv<W: Write>(transactions: &[Transaction], writer: W) -> Result<(), Error> {
    let mut writer = csv::Writer::from_writer(writer);

    writer.write_record(["Date", "Type", "Category", "Amount", "Note"])?;

    for transaction in transactions {
        writer.write_record([
            transaction.date.to_string(),
            transaction.kind.to_string(),
            transaction.category.to_string(),
            transaction.amount.to_string(),
            transaction.note.clone().unwrap_or_default(),
        ])?;
    }

    writer.flush().map_err(|error| Error::Csv(error.to_string()))
}

/// Render `transactions` as a CSV string.
///
/// # Errors
/// Returns [Error::Csv] if a record cannot be written.
pub fn csv_string(transactions: &[Transaction]) -> Result<String, Error> {
    let mut buffer = Vec::new();
    write_csv(transactions, &mut buffer)?;

    String::from_utf8(buffer).map_err(|error| Error::Csv(error.to_string()))
}

#[cfg(test)]
mod tests {
    use time::macros::{date, datetime};

    use crate::{
        Category, Transaction, TransactionType,
        export::csv_string,
    };

    fn create_test_transaction(
        amount: f64,
        kind: TransactionType,
        category: Category,
        note: Option<&str>,
    ) -> Transaction {
        Transaction {
            id: String::new(),
            amount,
            kind,
            category,
            note: note.map(str::to_owned),
            date: date!(2025 - 06 - 15),
            created_at: datetime!(2025-06-15 12:00 UTC),
            user_id: "user-1".to_owned(),
        }
    }

    #[test]
    fn writes_header_and_rows_in_list_order() {
        let transactions = vec![
            create_test_transaction(200.0, TransactionType::Expense, Category::Food, None),
            create_test_transaction(
                1000.5,
                TransactionType::Income,
                Category::Salary,
                Some("June pay"),
            ),
        ];

        let csv = csv_string(&transactions).unwrap();

        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines.len(), 3);
        assert_eq!(lines[0], "Date,Type,Category,Amount,Note");
        assert_eq!(lines[1], "2025-06-15,expense,food,200,");
        assert_eq!(lines[2], "2025-06-15,income,salary,1000.5,June pay");
    }

    #[test]
    fn quotes_notes_containing_commas_and_quotes() {
        let transactions = vec![create_test_transaction(
            12.0,
            TransactionType::Expense,
            Category::Food,
            Some("lunch, \"fancy\" place"),
        )];

        let csv = csv_string(&transactions).unwrap();

        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(
            lines[1],
            "2025-06-15,expense,food,12,\"lunch, \"\"fancy\"\" place\""
        );
    }

    #[test]
    fn empty_list_exports_header_only() {
        let csv = csv_string(&[]).unwrap();

        assert_eq!(csv, "Date,Type,Category,Amount,Note\n");
    }
}
