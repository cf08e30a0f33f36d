//! An in-process implementation of the backend interfaces.
//!
//! Used by tests and the demo binary in place of the hosted service. Accounts
//! hold bcrypt password hashes and new passwords must clear a zxcvbn strength
//! check; documents live in per-collection maps with merge-on-update
//! semantics; live queries get a fresh snapshot pushed after every mutation in
//! their collection. [MemoryBackend::set_offline] and
//! [MemoryBackend::emit_query_error] inject the failure modes the view-model
//! stores have to handle.

use std::{
    cmp::Ordering,
    collections::{BTreeMap, HashMap},
    sync::{
        Mutex,
        atomic::{AtomicBool, AtomicU64, Ordering as AtomicOrdering},
    },
};

use serde_json::Value;
use time::OffsetDateTime;
use tokio::sync::{mpsc, watch};
use zxcvbn::{Score, feedback::Feedback, zxcvbn};

use crate::{
    Error,
    backend::{
        Document, DocumentStore, Fields, Identity, IdentityProvider, Query, QueryEvent,
        QuerySubscription, SortOrder,
    },
};

struct Account {
    password_hash: String,
    identity: Identity,
}

struct Watcher {
    query: Query,
    sender: mpsc::UnboundedSender<QueryEvent>,
}

type Collections = HashMap<String, BTreeMap<String, Fields>>;

/// An in-memory identity provider and document store.
pub struct MemoryBackend {
    accounts: Mutex<HashMap<String, Account>>,
    identity: watch::Sender<Option<Identity>>,
    collections: Mutex<Collections>,
    watchers: Mutex<Vec<Watcher>>,
    next_id: AtomicU64,
    offline: AtomicBool,
    hash_cost: u32,
}

impl MemoryBackend {
    /// Create an empty backend with the default bcrypt cost.
    pub fn new() -> Self {
        Self::with_hash_cost(bcrypt::DEFAULT_COST)
    }

    /// Create an empty backend with a custom bcrypt cost.
    ///
    /// Tests use a low cost so account creation stays fast; production-like
    /// use should stick with [MemoryBackend::new].
    pub fn with_hash_cost(hash_cost: u32) -> Self {
        let (identity, _) = watch::channel(None);

        Self {
            accounts: Mutex::new(HashMap::new()),
            identity,
            collections: Mutex::new(HashMap::new()),
            watchers: Mutex::new(Vec::new()),
            next_id: AtomicU64::new(1),
            offline: AtomicBool::new(false),
            hash_cost,
        }
    }

    /// Make subsequent document writes fail with [Error::Backend], simulating
    /// an unreachable backend. Reads and open subscriptions are unaffected.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, AtomicOrdering::Relaxed);
    }

    /// Push a [QueryEvent::Error] to every live query on `collection`,
    /// simulating a backend-reported subscription failure.
    pub fn emit_query_error(&self, collection: &str, message: &str) {
        let Ok(mut watchers) = self.watchers.lock() else {
            return;
        };

        watchers.retain(|watcher| !watcher.sender.is_closed());

        for watcher in watchers
            .iter()
            .filter(|watcher| watcher.query.collection == collection)
        {
            let _ = watcher
                .sender
                .send(QueryEvent::Error(message.to_owned()));
        }
    }

    fn check_online(&self) -> Result<(), Error> {
        if self.offline.load(AtomicOrdering::Relaxed) {
            Err(Error::Backend("the backend is unreachable".to_owned()))
        } else {
            Ok(())
        }
    }

    fn next_id(&self, prefix: &str) -> String {
        format!(
            "{prefix}-{}",
            self.next_id.fetch_add(1, AtomicOrdering::Relaxed)
        )
    }

    /// Push a fresh snapshot to every live query on `collection`.
    fn notify(&self, collection: &str) {
        let Ok(collections) = self.collections.lock() else {
            return;
        };
        let Ok(mut watchers) = self.watchers.lock() else {
            return;
        };

        watchers.retain(|watcher| !watcher.sender.is_closed());

        for watcher in watchers
            .iter()
            .filter(|watcher| watcher.query.collection == collection)
        {
            let documents = evaluate_query(&collections, &watcher.query);
            let _ = watcher.sender.send(QueryEvent::Snapshot(documents));
        }
    }
}

impl Default for MemoryBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl IdentityProvider for MemoryBackend {
    async fn create_account(&self, email: &str, password: &str) -> Result<Identity, Error> {
        let mut accounts = self
            .accounts
            .lock()
            .map_err(|_| Error::Backend("account state is corrupted".to_owned()))?;

        if accounts.contains_key(email) {
            return Err(Error::EmailTaken(email.to_owned()));
        }

        let password_analysis = zxcvbn(password, &[email]);
        match password_analysis.score() {
            Score::Three | Score::Four => {}
            _ => {
                return Err(Error::WeakPassword(
                    password_analysis
                        .feedback()
                        .unwrap_or(&Feedback::default())
                        .to_string(),
                ));
            }
        }

        let password_hash = bcrypt::hash(password, self.hash_cost)
            .map_err(|error| Error::Backend(error.to_string()))?;
        let identity = Identity {
            uid: self.next_id("user"),
            email: email.to_owned(),
            created_at: OffsetDateTime::now_utc(),
        };

        accounts.insert(
            email.to_owned(),
            Account {
                password_hash,
                identity: identity.clone(),
            },
        );
        drop(accounts);

        // Like the hosted provider, creating an account signs the user in.
        self.identity.send_replace(Some(identity.clone()));
        tracing::debug!("created account {} for {}", identity.uid, identity.email);

        Ok(identity)
    }

    async fn authenticate(&self, email: &str, password: &str) -> Result<Identity, Error> {
        let accounts = self
            .accounts
            .lock()
            .map_err(|_| Error::Backend("account state is corrupted".to_owned()))?;

        let Some(account) = accounts.get(email) else {
            return Err(Error::InvalidCredentials);
        };

        let password_matches = bcrypt::verify(password, &account.password_hash)
            .map_err(|error| Error::Backend(error.to_string()))?;

        if !password_matches {
            return Err(Error::InvalidCredentials);
        }

        let identity = account.identity.clone();
        drop(accounts);

        self.identity.send_replace(Some(identity.clone()));

        Ok(identity)
    }

    async fn sign_out(&self) -> Result<(), Error> {
        self.identity.send_replace(None);

        Ok(())
    }

    fn subscribe_to_identity_changes(&self) -> watch::Receiver<Option<Identity>> {
        self.identity.subscribe()
    }
}

impl DocumentStore for MemoryBackend {
    async fn create(&self, collection: &str, fields: Fields) -> Result<String, Error> {
        self.check_online()?;

        let id = self.next_id("doc");

        {
            let mut collections = self
                .collections
                .lock()
                .map_err(|_| Error::Backend("document state is corrupted".to_owned()))?;
            collections
                .entry(collection.to_owned())
                .or_default()
                .insert(id.clone(), fields);
        }

        self.notify(collection);

        Ok(id)
    }

    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<(), Error> {
        self.check_online()?;

        {
            let mut collections = self
                .collections
                .lock()
                .map_err(|_| Error::Backend("document state is corrupted".to_owned()))?;
            let document = collections
                .get_mut(collection)
                .and_then(|documents| documents.get_mut(id))
                .ok_or(Error::NotFound)?;

            for (field, value) in fields {
                document.insert(field, value);
            }
        }

        self.notify(collection);

        Ok(())
    }

    async fn delete(&self, collection: &str, id: &str) -> Result<(), Error> {
        self.check_online()?;

        {
            let mut collections = self
                .collections
                .lock()
                .map_err(|_| Error::Backend("document state is corrupted".to_owned()))?;
            collections
                .get_mut(collection)
                .and_then(|documents| documents.remove(id))
                .ok_or(Error::NotFound)?;
        }

        self.notify(collection);

        Ok(())
    }

    fn live_query(&self, query: Query) -> QuerySubscription {
        let (sender, receiver) = mpsc::unbounded_channel();

        // The first snapshot arrives immediately with the current documents.
        match self.collections.lock() {
            Ok(collections) => {
                let _ = sender.send(QueryEvent::Snapshot(evaluate_query(&collections, &query)));
            }
            Err(_) => {
                let _ = sender.send(QueryEvent::Error(
                    "document state is corrupted".to_owned(),
                ));
            }
        }

        if let Ok(mut watchers) = self.watchers.lock() {
            watchers.push(Watcher { query, sender });
        }

        QuerySubscription::new(receiver)
    }
}

fn evaluate_query(collections: &Collections, query: &Query) -> Vec<Document> {
    let Some(documents) = collections.get(&query.collection) else {
        return Vec::new();
    };

    let mut matching: Vec<Document> = documents
        .iter()
        .filter(|(_, fields)| match &query.filter {
            Some((field, value)) => fields.get(field) == Some(value),
            None => true,
        })
        .map(|(id, fields)| Document {
            id: id.clone(),
            fields: fields.clone(),
        })
        .collect();

    if let Some((field, order)) = &query.order_by {
        matching.sort_by(|a, b| {
            let ordering = compare_fields(a.fields.get(field), b.fields.get(field));
            match order {
                SortOrder::Ascending => ordering,
                SortOrder::Descending => ordering.reverse(),
            }
        });
    }

    matching
}

/// Compare two field values for ordering. Numbers and strings order
/// naturally; a missing field sorts before a present one; mixed types are
/// treated as equal.
fn compare_fields(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(a)), Some(Value::Number(b))) => a
            .as_f64()
            .unwrap_or(0.0)
            .total_cmp(&b.as_f64().unwrap_or(0.0)),
        (Some(Value::String(a)), Some(Value::String(b))) => a.cmp(b),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        _ => Ordering::Equal,
    }
}
