//! The transaction list view-model.
//!
//! Mirrors the signed-in user's transactions out of the document store's live
//! query into a watch channel. The store never mutates its own copy of the
//! list: every change, including the caller's own writes, arrives as a full
//! snapshot pushed by the backend. Mutations therefore resolve when the
//! backend acknowledges them, and the visible list catches up separately —
//! callers must treat the list as eventually consistent with recent writes.

use std::sync::Arc;

use time::OffsetDateTime;
use tokio::{sync::watch, task::JoinHandle};

use crate::{
    Error, Session, Transaction, TransactionDraft, TransactionUpdate,
    backend::{Document, DocumentStore, Query, QueryEvent, QuerySubscription, SortOrder},
};

/// The collection transactions are stored in.
pub const TRANSACTIONS_COLLECTION: &str = "transactions";

const LOAD_FAILED_MESSAGE: &str = "Failed to load transactions. Please try again later.";
const ADD_FAILED_MESSAGE: &str = "Failed to add transaction. Please try again.";
const UPDATE_FAILED_MESSAGE: &str = "Failed to update transaction. Please try again.";
const DELETE_FAILED_MESSAGE: &str = "Failed to delete transaction. Please try again.";

/// A snapshot of the transaction list state.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionListState {
    /// The signed-in user's transactions, in the order the backend returned
    /// them (date descending).
    pub transactions: Vec<Transaction>,
    /// True while waiting for the first snapshot after signing in.
    pub loading: bool,
    /// The most recent user-facing error message, if any. Kept until
    /// overwritten; existing data stays visible alongside it.
    pub error: Option<String>,
}

/// Holds the live transaction list and wraps the document store's write API.
pub struct TransactionStore<D: DocumentStore> {
    backend: Arc<D>,
    session: watch::Receiver<Session>,
    state: Arc<watch::Sender<TransactionListState>>,
    driver: JoinHandle<()>,
}

impl<D: DocumentStore> TransactionStore<D> {
    /// Create the store and start following the session.
    ///
    /// While an identity is present a live query scoped to it is held open;
    /// when the identity goes away the query is torn down and the list is
    /// cleared.
    pub fn new(backend: Arc<D>, session: watch::Receiver<Session>) -> Self {
        let (state, _) = watch::channel(TransactionListState {
            transactions: Vec::new(),
            loading: true,
            error: None,
        });
        let state = Arc::new(state);

        let driver = tokio::spawn(drive(
            Arc::clone(&backend),
            session.clone(),
            Arc::clone(&state),
        ));

        Self {
            backend,
            session,
            state,
            driver,
        }
    }

    /// Watch the list state. The receiver's current value is the latest
    /// snapshot.
    pub fn subscribe(&self) -> watch::Receiver<TransactionListState> {
        self.state.subscribe()
    }

    /// The latest list snapshot.
    pub fn current(&self) -> TransactionListState {
        self.state.borrow().clone()
    }

    /// Record a new transaction for the signed-in user.
    ///
    /// Without a signed-in identity this is a no-op. The method resolves once
    /// the backend acknowledges the write; the list update arrives separately
    /// through the subscription.
    ///
    /// # Errors
    /// On failure the store's error message is set and the underlying error
    /// is returned, so callers can keep their own state (e.g. an open form)
    /// consistent.
    pub async fn add(&self, draft: TransactionDraft) -> Result<(), Error> {
        let Some(identity) = self.session.borrow().identity.clone() else {
            return Ok(());
        };

        let result = async {
            let fields = draft.into_fields(&identity.uid, OffsetDateTime::now_utc())?;
            self.backend
                .create(TRANSACTIONS_COLLECTION, fields)
                .await
                .map(|_| ())
        }
        .await;

        self.report_failure(result, "add", ADD_FAILED_MESSAGE)
    }

    /// Apply a partial edit to the transaction identified by `id`.
    ///
    /// Without a signed-in identity this is a no-op. Same acknowledgment and
    /// failure contract as [TransactionStore::add].
    pub async fn update(&self, id: &str, update: TransactionUpdate) -> Result<(), Error> {
        if self.session.borrow().identity.is_none() {
            return Ok(());
        }

        let result = async {
            let fields = update.into_fields()?;
            self.backend.update(TRANSACTIONS_COLLECTION, id, fields).await
        }
        .await;

        self.report_failure(result, "update", UPDATE_FAILED_MESSAGE)
    }

    /// Delete the transaction identified by `id`.
    ///
    /// Without a signed-in identity this is a no-op. Same acknowledgment and
    /// failure contract as [TransactionStore::add].
    pub async fn delete(&self, id: &str) -> Result<(), Error> {
        if self.session.borrow().identity.is_none() {
            return Ok(());
        }

        let result = self.backend.delete(TRANSACTIONS_COLLECTION, id).await;

        self.report_failure(result, "delete", DELETE_FAILED_MESSAGE)
    }

    fn report_failure(
        &self,
        result: Result<(), Error>,
        action: &str,
        message: &str,
    ) -> Result<(), Error> {
        if let Err(error) = &result {
            tracing::error!("failed to {action} transaction: {error}");
            self.state
                .send_modify(|state| state.error = Some(message.to_owned()));
        }

        result
    }
}

impl<D: DocumentStore> Drop for TransactionStore<D> {
    fn drop(&mut self) {
        self.driver.abort();
    }
}

/// Follows the session and the live query, folding both into the list state.
async fn drive<D: DocumentStore>(
    backend: Arc<D>,
    mut session: watch::Receiver<Session>,
    state: Arc<watch::Sender<TransactionListState>>,
) {
    let mut current_uid: Option<String> = None;
    let mut subscription: Option<QuerySubscription> = None;
    let mut started = false;

    loop {
        let uid = session
            .borrow_and_update()
            .identity
            .as_ref()
            .map(|identity| identity.uid.clone());

        if !started || uid != current_uid {
            started = true;

            match &uid {
                None => {
                    // Tear down the query so nothing keeps watching a scope
                    // we are no longer signed in to.
                    subscription = None;
                    state.send_modify(|state| {
                        state.transactions.clear();
                        state.loading = false;
                    });
                }
                Some(uid) => {
                    state.send_modify(|state| state.loading = true);
                    let query = Query::new(TRANSACTIONS_COLLECTION)
                        .field_equals("userId", uid.as_str())
                        .order_by("date", SortOrder::Descending);
                    subscription = Some(backend.live_query(query));
                }
            }

            current_uid = uid;
        }

        tokio::select! {
            changed = session.changed() => {
                if changed.is_err() {
                    break;
                }
            }
            event = next_event(subscription.as_mut()), if subscription.is_some() => {
                match event {
                    Some(QueryEvent::Snapshot(documents)) => {
                        let transactions = decode_snapshot(&documents);
                        state.send_modify(|state| {
                            state.transactions = transactions;
                            state.loading = false;
                        });
                    }
                    Some(QueryEvent::Error(message)) => {
                        tracing::error!("transaction subscription failed: {message}");
                        state.send_modify(|state| {
                            state.error = Some(LOAD_FAILED_MESSAGE.to_owned());
                            state.loading = false;
                        });
                    }
                    None => subscription = None,
                }
            }
        }
    }
}

async fn next_event(subscription: Option<&mut QuerySubscription>) -> Option<QueryEvent> {
    match subscription {
        Some(subscription) => subscription.next().await,
        None => std::future::pending().await,
    }
}

/// Decode a snapshot's documents, skipping any that do not parse as
/// transactions. A malformed document is logged rather than poisoning the
/// whole snapshot.
fn decode_snapshot(documents: &[Document]) -> Vec<Transaction> {
    documents
        .iter()
        .filter_map(|document| match Transaction::from_document(document) {
            Ok(transaction) => Some(transaction),
            Err(error) => {
                tracing::warn!("skipping malformed transaction {}: {error}", document.id);
                None
            }
        })
        .collect()
}
