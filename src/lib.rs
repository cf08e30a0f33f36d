//! Fintrack is the core of a personal finance tracker: typed transaction
//! records, monthly aggregation, and view-model stores kept live by the
//! backend's push subscriptions.
//!
//! Authentication and persistence are delegated to a hosted backend, modeled
//! by the [backend::IdentityProvider] and [backend::DocumentStore] traits. On
//! top of those sit two stores constructed once at process start and handed
//! to the presentation layer (no ambient singletons):
//!
//! - [SessionStore] mirrors the signed-in identity,
//! - [TransactionStore] mirrors the signed-in user's transactions.
//!
//! Both treat the backend's pushes as the single source of truth: local state
//! is only ever replaced by the latest pushed snapshot, so the list is
//! eventually (not immediately) consistent with the caller's own writes.
//! [monthly_data] and [category_summary] derive the dashboard's numbers from
//! whatever the transaction store currently holds.

#![warn(missing_docs)]

pub mod backend;

mod aggregation;
mod category;
mod export;
mod formatting;
mod logging;
mod session;
mod store;
mod transaction;

pub use aggregation::{CategorySum, MonthlyData, category_summary, month_interval, monthly_data};
pub use category::{ALL_CATEGORIES, Category};
pub use export::{csv_string, write_csv};
pub use formatting::{currency, display_date, display_month, percentage};
pub use logging::init_logging;
pub use session::{Identity, Session, SessionStore, auth_error_message};
pub use store::{TRANSACTIONS_COLLECTION, TransactionListState, TransactionStore};
pub use transaction::{
    Transaction, TransactionDraft, TransactionType, TransactionUpdate, parse_entry_date,
};

/// The errors that may occur in the application.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// The email and password combination did not match an account.
    ///
    /// Deliberately does not distinguish an unknown email from a wrong
    /// password.
    #[error("invalid email or password")]
    InvalidCredentials,

    /// An account is already registered under this email.
    #[error("an account already exists for {0}")]
    EmailTaken(String),

    /// The password is too easy to guess. The message carries the strength
    /// checker's feedback.
    #[error("password is too weak: {0}")]
    WeakPassword(String),

    /// A transaction amount that is not strictly positive. Direction is
    /// carried by the transaction type, so zero and negative amounts are
    /// never valid.
    #[error("transaction amounts must be greater than zero, got {0}")]
    InvalidAmount(f64),

    /// A date string that could not be parsed as a calendar date.
    #[error("could not parse {0:?} as a calendar date")]
    InvalidDate(String),

    /// The record a write referred to does not exist. The client should
    /// refresh; the record may have been deleted elsewhere.
    #[error("the requested record could not be found")]
    NotFound,

    /// The backend rejected or could not service a request.
    ///
    /// The message is for logging; user-facing code shows a generic message
    /// instead.
    #[error("the backend reported an error: {0}")]
    Backend(String),

    /// A record could not be converted to or from its stored form.
    #[error("could not convert a record: {0}")]
    Serialization(String),

    /// A CSV export could not be written.
    #[error("could not write CSV: {0}")]
    Csv(String),
}

impl From<serde_json::Error> for Error {
    fn from(error: serde_json::Error) -> Self {
        Error::Serialization(error.to_string())
    }
}

impl From<csv::Error> for Error {
    fn from(error: csv::Error) -> Self {
        Error::Csv(error.to_string())
    }
}
