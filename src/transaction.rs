//! The core transaction record plus the payload types used to create and edit
//! one.
//!
//! Transactions live in the backend document store as schemaless field maps,
//! so this module also owns the conversion between the typed record and the
//! store's camelCase wire fields.

use std::fmt::Display;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use time::{
    Date, OffsetDateTime, format_description::BorrowedFormatItem, macros::format_description,
};

use crate::{
    Category, Error,
    backend::{Document, Fields},
};

/// Whether money came in or went out.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    /// Money received, e.g. wages or dividends.
    Income,
    /// Money spent.
    Expense,
}

impl TransactionType {
    /// The lowercase tag used when storing this type.
    pub fn as_str(self) -> &'static str {
        match self {
            TransactionType::Income => "income",
            TransactionType::Expense => "expense",
        }
    }
}

impl Display for TransactionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An income or expense recorded by the user.
///
/// The record mirrors what the document store holds: the `id` is assigned by
/// the store and travels next to the fields rather than inside them, `date` is
/// the calendar date the money moved (picked by the user), and `created_at` is
/// when the record was submitted. New transactions are written through
/// [TransactionDraft]; this type is what comes back out of snapshots.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    /// The opaque identifier assigned by the document store.
    #[serde(skip)]
    pub id: String,

    /// The amount of money that changed hands. Always positive; direction is
    /// carried by `kind`.
    pub amount: f64,

    /// Whether this is income or an expense.
    #[serde(rename = "type")]
    pub kind: TransactionType,

    /// What the transaction was for.
    pub category: Category,

    /// An optional free-text note.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    /// The calendar date the money moved, as chosen by the user. Distinct
    /// from `created_at`.
    pub date: Date,

    /// When the record was created. Stamped once, never updated.
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,

    /// The identity that owns this record. Reads are scoped to the owner by
    /// the live query filter, not by client-side checks.
    pub user_id: String,
}

impl Transaction {
    /// Decode a transaction from a stored document.
    ///
    /// # Errors
    /// Returns [Error::Serialization] if the document's fields do not form a
    /// valid transaction record.
    pub fn from_document(document: &Document) -> Result<Self, Error> {
        let mut transaction: Transaction =
            serde_json::from_value(Value::Object(document.fields.clone()))?;
        transaction.id = document.id.clone();

        Ok(transaction)
    }

    pub(crate) fn to_fields(&self) -> Result<Fields, Error> {
        match serde_json::to_value(self)? {
            Value::Object(fields) => Ok(fields),
            value => Err(Error::Serialization(format!(
                "expected a transaction to serialize as an object, got {value}"
            ))),
        }
    }
}

/// The payload for creating a transaction.
///
/// The owner and creation timestamp are not part of the draft; they are
/// stamped when the draft is submitted.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDraft {
    /// The amount of money that changed hands. Must be positive.
    pub amount: f64,
    /// Whether this is income or an expense.
    pub kind: TransactionType,
    /// What the transaction was for.
    pub category: Category,
    /// An optional free-text note.
    pub note: Option<String>,
    /// The calendar date the money moved.
    pub date: Date,
}

impl TransactionDraft {
    /// Create a draft with no note.
    pub fn new(amount: f64, kind: TransactionType, category: Category, date: Date) -> Self {
        Self {
            amount,
            kind,
            category,
            note: None,
            date,
        }
    }

    /// Attach a free-text note to the draft.
    pub fn with_note(mut self, note: &str) -> Self {
        self.note = Some(note.to_owned());
        self
    }

    /// Validate the draft and convert it into the stored field map, stamping
    /// the owner and creation timestamp.
    ///
    /// # Errors
    /// Returns [Error::InvalidAmount] unless the amount is strictly positive.
    pub(crate) fn into_fields(
        self,
        user_id: &str,
        created_at: OffsetDateTime,
    ) -> Result<Fields, Error> {
        if !(self.amount > 0.0) {
            return Err(Error::InvalidAmount(self.amount));
        }

        let record = Transaction {
            id: String::new(),
            amount: self.amount,
            kind: self.kind,
            category: self.category,
            note: self.note,
            date: self.date,
            created_at,
            user_id: user_id.to_owned(),
        };

        record.to_fields()
    }
}

/// A partial edit to an existing transaction.
///
/// Only the fields that are `Some` are written; everything else is left
/// untouched by the store's merge semantics. A present amount is always
/// applied and validated, so an amount of zero fails loudly instead of being
/// silently dropped.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionUpdate {
    /// Replace the amount. Must be positive if present.
    pub amount: Option<f64>,
    /// Replace the transaction type.
    pub kind: Option<TransactionType>,
    /// Replace the category.
    pub category: Option<Category>,
    /// Replace the note.
    pub note: Option<String>,
    /// Replace the transaction date.
    pub date: Option<Date>,
}

impl TransactionUpdate {
    /// An update that changes nothing.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the amount.
    pub fn amount(mut self, amount: f64) -> Self {
        self.amount = Some(amount);
        self
    }

    /// Replace the transaction type.
    pub fn kind(mut self, kind: TransactionType) -> Self {
        self.kind = Some(kind);
        self
    }

    /// Replace the category.
    pub fn category(mut self, category: Category) -> Self {
        self.category = Some(category);
        self
    }

    /// Replace the note.
    pub fn note(mut self, note: &str) -> Self {
        self.note = Some(note.to_owned());
        self
    }

    /// Replace the transaction date.
    pub fn date(mut self, date: Date) -> Self {
        self.date = Some(date);
        self
    }

    /// True if no field is set.
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    /// Validate the update and convert the present fields into a field map
    /// for a partial write.
    ///
    /// # Errors
    /// Returns [Error::InvalidAmount] if an amount is present and not
    /// strictly positive.
    pub(crate) fn into_fields(self) -> Result<Fields, Error> {
        let mut fields = Fields::new();

        if let Some(amount) = self.amount {
            if !(amount > 0.0) {
                return Err(Error::InvalidAmount(amount));
            }

            fields.insert("amount".to_owned(), Value::from(amount));
        }

        if let Some(kind) = self.kind {
            fields.insert("type".to_owned(), serde_json::to_value(kind)?);
        }

        if let Some(category) = self.category {
            fields.insert("category".to_owned(), serde_json::to_value(category)?);
        }

        if let Some(note) = self.note {
            fields.insert("note".to_owned(), Value::String(note));
        }

        if let Some(date) = self.date {
            fields.insert("date".to_owned(), serde_json::to_value(date)?);
        }

        Ok(fields)
    }
}

const ENTRY_DATE_FORMAT: &[BorrowedFormatItem] = format_description!("[year]-[month]-[day]");

/// Parse a transaction date from the `YYYY-MM-DD` form used by date inputs.
///
/// # Errors
/// Returns [Error::InvalidDate] if `value` is not a valid calendar date in
/// that shape.
pub fn parse_entry_date(value: &str) -> Result<Date, Error> {
    Date::parse(value, &ENTRY_DATE_FORMAT).map_err(|_| Error::InvalidDate(value.to_owned()))
}
