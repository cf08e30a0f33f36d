//! Demo binary: seeds an in-memory backend with an account and a month of
//! transactions, then prints the dashboard and a CSV export to stdout.
//!
//! The account credentials can be overridden with `FINTRACK_DEMO_EMAIL` and
//! `FINTRACK_DEMO_PASSWORD`.

use std::{env, sync::Arc};

use time::OffsetDateTime;

use fintrack::{
    Category, SessionStore, TransactionDraft, TransactionStore, TransactionType,
    auth_error_message, backend::MemoryBackend, category_summary, csv_string, currency,
    display_month, init_logging, monthly_data, percentage,
};

#[tokio::main]
async fn main() {
    init_logging();

    let backend = Arc::new(MemoryBackend::new());
    let session = SessionStore::new(Arc::clone(&backend));
    let store = TransactionStore::new(Arc::clone(&backend), session.subscribe());

    let email = env::var("FINTRACK_DEMO_EMAIL").unwrap_or_else(|_| "demo@example.com".to_owned());
    let password = env::var("FINTRACK_DEMO_PASSWORD")
        .unwrap_or_else(|_| "quartz-lantern-otter-93".to_owned());

    if let Err(error) = session.signup(&email, &password).await {
        tracing::error!(
            "could not create the demo account: {}",
            auth_error_message(&error)
        );
        return;
    }

    // The stores pick the new identity up through the subscription; wait for
    // it before writing.
    let mut auth = session.subscribe();
    while auth.borrow().identity.is_none() {
        if auth.changed().await.is_err() {
            return;
        }
    }
    tracing::info!("signed in as {email}");

    let today = OffsetDateTime::now_utc().date();
    let first_of_month = today.replace_day(1).expect("day 1 is always valid");

    let drafts = [
        TransactionDraft::new(
            4200.0,
            TransactionType::Income,
            Category::Salary,
            first_of_month,
        )
        .with_note("Monthly pay"),
        TransactionDraft::new(
            1450.0,
            TransactionType::Expense,
            Category::Housing,
            first_of_month,
        )
        .with_note("Rent"),
        TransactionDraft::new(132.4, TransactionType::Expense, Category::Food, today),
        TransactionDraft::new(54.0, TransactionType::Expense, Category::Transportation, today)
            .with_note("Fuel"),
        TransactionDraft::new(
            15.99,
            TransactionType::Expense,
            Category::Entertainment,
            today,
        )
        .with_note("Streaming"),
    ];
    let expected = drafts.len();

    for draft in drafts {
        if let Err(error) = store.add(draft).await {
            tracing::error!("could not record a demo transaction: {error}");
        }
    }

    // Writes are acknowledged before the list reflects them; wait for the
    // snapshots to catch up.
    let mut list = store.subscribe();
    while list.borrow().transactions.len() < expected {
        if list.changed().await.is_err() {
            return;
        }
    }
    let state = list.borrow().clone();

    let summary = monthly_data(&state.transactions, today);
    println!("{}", display_month(today));
    println!("  Income:  {}", currency(summary.total_income));
    println!("  Expense: {}", currency(summary.total_expense));
    println!("  Balance: {}", currency(summary.balance));
    println!();

    println!("Spending by category:");
    for entry in category_summary(&state.transactions, TransactionType::Expense, today) {
        println!(
            "  {:<16} {:>12} {:>8}",
            entry.category.label(),
            currency(entry.amount),
            percentage(entry.percentage)
        );
    }
    println!();

    match csv_string(&state.transactions) {
        Ok(csv) => {
            println!("CSV export:");
            print!("{csv}");
        }
        Err(error) => tracing::error!("could not export CSV: {error}"),
    }

    if let Err(error) = session.logout().await {
        tracing::error!("could not sign out: {error}");
    }
}
