//! Monthly aggregation over the in-memory transaction list.
//!
//! Everything here is a pure function over a slice of transactions: totals and
//! balance for the calendar month containing a reference date, and per-category
//! sums with percentage shares for one transaction type. Results are computed
//! on demand and never cached.

use std::collections::BTreeMap;

use time::Date;

use crate::{Category, Transaction, TransactionType};

/// Income, expense and balance totals for one calendar month.
#[derive(Debug, Clone, PartialEq)]
pub struct MonthlyData {
    /// Sum of income amounts within the month.
    pub total_income: f64,
    /// Sum of expense amounts within the month.
    pub total_expense: f64,
    /// `total_income - total_expense`.
    pub balance: f64,
    /// First day of the month the totals cover.
    pub start_date: Date,
    /// Last day of the month the totals cover.
    pub end_date: Date,
}

/// One category's share of a month's income or expenses.
#[derive(Debug, Clone, PartialEq)]
pub struct CategorySum {
    /// The category the amounts were summed for.
    pub category: Category,
    /// Sum of amounts in this category.
    pub amount: f64,
    /// This category's share of the filtered total, in percent. Zero when the
    /// filtered total is zero.
    pub percentage: f64,
    /// The category's fixed display color.
    pub color: &'static str,
}

/// The first and last day of the calendar month containing `reference`.
pub fn month_interval(reference: Date) -> (Date, Date) {
    // Day 1 and the month's length are always valid days, so these cannot
    // fail.
    let start = reference.replace_day(1).unwrap();
    let end = reference
        .replace_day(reference.month().length(reference.year()))
        .unwrap();

    (start, end)
}

/// Total income, expenses and balance for the month containing `reference`.
///
/// Transactions dated outside the month are ignored. An empty input yields
/// all-zero totals.
pub fn monthly_data(transactions: &[Transaction], reference: Date) -> MonthlyData {
    let (start_date, end_date) = month_interval(reference);

    let mut total_income = 0.0;
    let mut total_expense = 0.0;

    for transaction in transactions {
        if transaction.date < start_date || transaction.date > end_date {
            continue;
        }

        match transaction.kind {
            TransactionType::Income => total_income += transaction.amount,
            TransactionType::Expense => total_expense += transaction.amount,
        }
    }

    MonthlyData {
        total_income,
        total_expense,
        balance: total_income - total_expense,
        start_date,
        end_date,
    }
}

/// Per-category sums and percentage shares for one transaction type within
/// the month containing `reference`, sorted by amount descending.
///
/// Categories with no matching transactions are omitted rather than
/// zero-filled. Percentages are zero when the filtered total is zero. Equal
/// amounts fall back to category order, so the output is deterministic.
pub fn category_summary(
    transactions: &[Transaction],
    kind: TransactionType,
    reference: Date,
) -> Vec<CategorySum> {
    let (start_date, end_date) = month_interval(reference);

    let mut totals_by_category: BTreeMap<Category, f64> = BTreeMap::new();
    let mut total_amount = 0.0;

    for transaction in transactions {
        if transaction.kind != kind
            || transaction.date < start_date
            || transaction.date > end_date
        {
            continue;
        }

        *totals_by_category.entry(transaction.category).or_insert(0.0) += transaction.amount;
        total_amount += transaction.amount;
    }

    let mut summary: Vec<CategorySum> = totals_by_category
        .into_iter()
        .map(|(category, amount)| CategorySum {
            category,
            amount,
            percentage: if total_amount > 0.0 {
                amount / total_amount * 100.0
            } else {
                0.0
            },
            color: category.color(),
        })
        .collect();

    summary.sort_by(|a, b| b.amount.total_cmp(&a.amount));

    summary
}

#[cfg(test)]
mod tests {
    use time::macros::{date, datetime};

    use crate::{
        Category, Transaction, TransactionType,
        aggregation::{category_summary, month_interval, monthly_data},
    };

    fn create_test_transaction(
        amount: f64,
        kind: TransactionType,
        category: Category,
        date: time::Date,
    ) -> Transaction {
        Transaction {
            id: String::new(),
            amount,
            kind,
            category,
            note: None,
            date,
            created_at: datetime!(2025-01-01 0:00 UTC),
            user_id: "user-1".to_owned(),
        }
    }

    #[test]
    fn month_interval_covers_the_whole_month() {
        assert_eq!(
            month_interval(date!(2025 - 06 - 15)),
            (date!(2025 - 06 - 01), date!(2025 - 06 - 30))
        );
        assert_eq!(
            month_interval(date!(2024 - 02 - 29)),
            (date!(2024 - 02 - 01), date!(2024 - 02 - 29))
        );
        assert_eq!(
            month_interval(date!(2025 - 12 - 01)),
            (date!(2025 - 12 - 01), date!(2025 - 12 - 31))
        );
    }

    #[test]
    fn monthly_data_sums_the_reference_month_only() {
        let transactions = vec![
            create_test_transaction(
                1000.0,
                TransactionType::Income,
                Category::Salary,
                date!(2025 - 06 - 01),
            ),
            create_test_transaction(
                200.0,
                TransactionType::Expense,
                Category::Food,
                date!(2025 - 06 - 15),
            ),
            create_test_transaction(
                50.0,
                TransactionType::Expense,
                Category::Food,
                date!(2025 - 07 - 01),
            ),
        ];

        let data = monthly_data(&transactions, date!(2025 - 06 - 20));

        assert_eq!(data.total_income, 1000.0);
        assert_eq!(data.total_expense, 200.0);
        assert_eq!(data.balance, 800.0);
        assert_eq!(data.start_date, date!(2025 - 06 - 01));
        assert_eq!(data.end_date, date!(2025 - 06 - 30));
    }

    #[test]
    fn monthly_data_includes_the_month_boundaries() {
        let transactions = vec![
            create_test_transaction(
                10.0,
                TransactionType::Expense,
                Category::Food,
                date!(2025 - 06 - 01),
            ),
            create_test_transaction(
                20.0,
                TransactionType::Expense,
                Category::Food,
                date!(2025 - 06 - 30),
            ),
        ];

        let data = monthly_data(&transactions, date!(2025 - 06 - 15));

        assert_eq!(data.total_expense, 30.0);
    }

    #[test]
    fn monthly_data_on_empty_input_is_all_zero() {
        let data = monthly_data(&[], date!(2025 - 06 - 15));

        assert_eq!(data.total_income, 0.0);
        assert_eq!(data.total_expense, 0.0);
        assert_eq!(data.balance, 0.0);
    }

    #[test]
    fn balance_equals_income_minus_expense() {
        let transactions = vec![
            create_test_transaction(
                321.5,
                TransactionType::Income,
                Category::Investments,
                date!(2025 - 03 - 02),
            ),
            create_test_transaction(
                1000.0,
                TransactionType::Income,
                Category::Salary,
                date!(2025 - 03 - 12),
            ),
            create_test_transaction(
                87.25,
                TransactionType::Expense,
                Category::Food,
                date!(2025 - 03 - 20),
            ),
        ];

        let data = monthly_data(&transactions, date!(2025 - 03 - 31));

        assert_eq!(data.balance, data.total_income - data.total_expense);
    }

    #[test]
    fn category_summary_matches_the_worked_example() {
        let transactions = vec![
            create_test_transaction(
                1000.0,
                TransactionType::Income,
                Category::Salary,
                date!(2025 - 06 - 01),
            ),
            create_test_transaction(
                200.0,
                TransactionType::Expense,
                Category::Food,
                date!(2025 - 06 - 15),
            ),
            create_test_transaction(
                50.0,
                TransactionType::Expense,
                Category::Food,
                date!(2025 - 07 - 01),
            ),
        ];

        let summary = category_summary(&transactions, TransactionType::Expense, date!(2025 - 06 - 10));

        assert_eq!(summary.len(), 1);
        assert_eq!(summary[0].category, Category::Food);
        assert_eq!(summary[0].amount, 200.0);
        assert_eq!(summary[0].percentage, 100.0);
        assert_eq!(summary[0].color, Category::Food.color());
    }

    #[test]
    fn category_summary_is_sorted_descending_by_amount() {
        let transactions = vec![
            create_test_transaction(
                30.0,
                TransactionType::Expense,
                Category::Entertainment,
                date!(2025 - 06 - 03),
            ),
            create_test_transaction(
                1450.0,
                TransactionType::Expense,
                Category::Housing,
                date!(2025 - 06 - 01),
            ),
            create_test_transaction(
                120.0,
                TransactionType::Expense,
                Category::Food,
                date!(2025 - 06 - 08),
            ),
            create_test_transaction(
                80.0,
                TransactionType::Expense,
                Category::Food,
                date!(2025 - 06 - 21),
            ),
        ];

        let summary = category_summary(&transactions, TransactionType::Expense, date!(2025 - 06 - 15));

        let amounts: Vec<f64> = summary.iter().map(|entry| entry.amount).collect();
        assert_eq!(amounts, vec![1450.0, 200.0, 30.0]);
        assert_eq!(summary[1].category, Category::Food);
    }

    #[test]
    fn category_summary_amounts_add_up_to_the_monthly_totals() {
        let transactions = vec![
            create_test_transaction(
                1000.0,
                TransactionType::Income,
                Category::Salary,
                date!(2025 - 06 - 01),
            ),
            create_test_transaction(
                55.0,
                TransactionType::Income,
                Category::Gifts,
                date!(2025 - 06 - 11),
            ),
            create_test_transaction(
                200.0,
                TransactionType::Expense,
                Category::Food,
                date!(2025 - 06 - 15),
            ),
            create_test_transaction(
                75.5,
                TransactionType::Expense,
                Category::Transportation,
                date!(2025 - 06 - 18),
            ),
        ];
        let reference = date!(2025 - 06 - 30);

        let data = monthly_data(&transactions, reference);
        let expense_total: f64 = category_summary(&transactions, TransactionType::Expense, reference)
            .iter()
            .map(|entry| entry.amount)
            .sum();
        let income_total: f64 = category_summary(&transactions, TransactionType::Income, reference)
            .iter()
            .map(|entry| entry.amount)
            .sum();

        assert_eq!(expense_total, data.total_expense);
        assert_eq!(income_total, data.total_income);
    }

    #[test]
    fn category_summary_percentages_sum_to_one_hundred() {
        let transactions = vec![
            create_test_transaction(
                3.0,
                TransactionType::Expense,
                Category::Food,
                date!(2025 - 06 - 01),
            ),
            create_test_transaction(
                7.0,
                TransactionType::Expense,
                Category::Debt,
                date!(2025 - 06 - 02),
            ),
            create_test_transaction(
                11.0,
                TransactionType::Expense,
                Category::Personal,
                date!(2025 - 06 - 03),
            ),
        ];

        let summary = category_summary(&transactions, TransactionType::Expense, date!(2025 - 06 - 15));

        let total_percentage: f64 = summary.iter().map(|entry| entry.percentage).sum();
        assert!((total_percentage - 100.0).abs() < 1e-9);
    }

    #[test]
    fn category_summary_percentages_are_zero_when_the_total_is_zero() {
        // Stored records are not re-validated on the way out of the backend,
        // so a zero-amount document can reach aggregation.
        let transactions = vec![
            create_test_transaction(
                0.0,
                TransactionType::Expense,
                Category::Food,
                date!(2025 - 06 - 01),
            ),
            create_test_transaction(
                0.0,
                TransactionType::Expense,
                Category::Utilities,
                date!(2025 - 06 - 02),
            ),
        ];

        let summary = category_summary(&transactions, TransactionType::Expense, date!(2025 - 06 - 15));

        assert_eq!(summary.len(), 2);
        for entry in &summary {
            assert_eq!(entry.percentage, 0.0);
        }
    }

    #[test]
    fn equal_amounts_fall_back_to_category_order() {
        let transactions = vec![
            create_test_transaction(
                50.0,
                TransactionType::Expense,
                Category::Entertainment,
                date!(2025 - 06 - 03),
            ),
            create_test_transaction(
                50.0,
                TransactionType::Expense,
                Category::Food,
                date!(2025 - 06 - 08),
            ),
        ];
        let reference = date!(2025 - 06 - 15);

        let summary = category_summary(&transactions, TransactionType::Expense, reference);

        let categories: Vec<Category> = summary.iter().map(|entry| entry.category).collect();
        assert_eq!(categories, vec![Category::Food, Category::Entertainment]);
        assert_eq!(
            summary,
            category_summary(&transactions, TransactionType::Expense, reference)
        );
    }

    #[test]
    fn category_summary_on_empty_input_is_empty() {
        let summary = category_summary(&[], TransactionType::Expense, date!(2025 - 06 - 15));

        assert!(summary.is_empty());
    }

    #[test]
    fn category_summary_omits_categories_outside_the_filter() {
        let transactions = vec![
            create_test_transaction(
                1000.0,
                TransactionType::Income,
                Category::Salary,
                date!(2025 - 06 - 01),
            ),
            create_test_transaction(
                9.99,
                TransactionType::Expense,
                Category::Entertainment,
                date!(2025 - 05 - 31),
            ),
        ];

        let summary = category_summary(&transactions, TransactionType::Expense, date!(2025 - 06 - 15));

        assert!(summary.is_empty());
    }

    #[test]
    fn aggregation_is_idempotent() {
        let transactions = vec![
            create_test_transaction(
                640.0,
                TransactionType::Income,
                Category::Salary,
                date!(2025 - 06 - 05),
            ),
            create_test_transaction(
                32.0,
                TransactionType::Expense,
                Category::Shopping,
                date!(2025 - 06 - 06),
            ),
        ];
        let reference = date!(2025 - 06 - 15);

        assert_eq!(
            monthly_data(&transactions, reference),
            monthly_data(&transactions, reference)
        );
        assert_eq!(
            category_summary(&transactions, TransactionType::Expense, reference),
            category_summary(&transactions, TransactionType::Expense, reference)
        );
    }
}
