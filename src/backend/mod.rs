//! Interfaces to the hosted backend: the identity provider and the document
//! store.
//!
//! The application never talks to the backend vendor's API directly. It goes
//! through the [IdentityProvider] and [DocumentStore] traits, which model the
//! two push subscriptions the app relies on (identity changes and live query
//! snapshots) as cancellable channel streams: dropping a receiver tears the
//! subscription down. [MemoryBackend] is the in-process implementation used by
//! tests and the demo binary.

mod memory;

pub use memory::MemoryBackend;

use serde_json::{Map, Value};
use time::OffsetDateTime;
use tokio::sync::{mpsc, watch};

use crate::Error;

/// The schemaless field map a stored document is made of.
pub type Fields = Map<String, Value>;

/// An authenticated identity as reported by the identity provider.
///
/// Treated as read-only by the application; the provider is the only writer.
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    /// The provider-assigned unique id.
    pub uid: String,
    /// The email address the account was registered with.
    pub email: String,
    /// When the account was created.
    pub created_at: OffsetDateTime,
}

/// Credential management and the identity-change subscription.
#[allow(async_fn_in_trait)]
pub trait IdentityProvider: Send + Sync + 'static {
    /// Register a new account and sign it in.
    ///
    /// # Errors
    /// Returns [Error::EmailTaken] if the email is already registered, or
    /// [Error::WeakPassword] if the password is too easy to guess.
    async fn create_account(&self, email: &str, password: &str) -> Result<Identity, Error>;

    /// Sign in with an email and password.
    ///
    /// # Errors
    /// Returns [Error::InvalidCredentials] if the combination is wrong.
    async fn authenticate(&self, email: &str, password: &str) -> Result<Identity, Error>;

    /// Sign the current identity out.
    async fn sign_out(&self) -> Result<(), Error>;

    /// Subscribe to identity changes.
    ///
    /// The receiver's current value is the presently signed-in identity, so
    /// subscribers observe the current state immediately, then every change.
    /// Dropping the receiver unsubscribes.
    fn subscribe_to_identity_changes(&self) -> watch::Receiver<Option<Identity>>;
}

/// A stored document: its store-assigned id plus its fields.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// The opaque id the store assigned on creation.
    pub id: String,
    /// The document's schemaless fields.
    pub fields: Fields,
}

/// The direction a live query orders its results in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortOrder {
    /// Sort in order of increasing value.
    Ascending,
    /// Sort in order of decreasing value.
    Descending,
}

/// Describes which documents a live query watches and how they are ordered.
#[derive(Debug, Clone, PartialEq)]
pub struct Query {
    /// The collection to watch.
    pub collection: String,
    /// Only match documents whose field equals the given value.
    pub filter: Option<(String, Value)>,
    /// Order matching documents by a field.
    pub order_by: Option<(String, SortOrder)>,
}

impl Query {
    /// Watch every document in `collection`, unordered.
    pub fn new(collection: &str) -> Self {
        Self {
            collection: collection.to_owned(),
            filter: None,
            order_by: None,
        }
    }

    /// Only match documents whose `field` equals `value`.
    pub fn field_equals(mut self, field: &str, value: impl Into<Value>) -> Self {
        self.filter = Some((field.to_owned(), value.into()));
        self
    }

    /// Order matching documents by `field` in the given direction.
    pub fn order_by(mut self, field: &str, order: SortOrder) -> Self {
        self.order_by = Some((field.to_owned(), order));
        self
    }
}

/// One event pushed by a live query.
#[derive(Debug, Clone, PartialEq)]
pub enum QueryEvent {
    /// A full replacement of the query's matching documents. The store pushes
    /// one of these on any change; there is no incremental patching.
    Snapshot(Vec<Document>),
    /// The backend reported a problem with the query. Existing data remains
    /// valid.
    Error(String),
}

/// A live query subscription.
///
/// The first [QueryEvent::Snapshot] arrives immediately with the current
/// matching documents. Dropping the subscription unsubscribes.
#[derive(Debug)]
pub struct QuerySubscription {
    receiver: mpsc::UnboundedReceiver<QueryEvent>,
}

impl QuerySubscription {
    /// Wrap a channel of query events. Used by [DocumentStore]
    /// implementations.
    pub fn new(receiver: mpsc::UnboundedReceiver<QueryEvent>) -> Self {
        Self { receiver }
    }

    /// The next pushed event, or `None` once the backend closes the query.
    pub async fn next(&mut self) -> Option<QueryEvent> {
        self.receiver.recv().await
    }
}

/// Document CRUD and live query subscriptions.
#[allow(async_fn_in_trait)]
pub trait DocumentStore: Send + Sync + 'static {
    /// Create a document and return its assigned id.
    async fn create(&self, collection: &str, fields: Fields) -> Result<String, Error>;

    /// Merge `fields` into an existing document. Fields not present in the
    /// payload are left untouched.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if no document has the given id.
    async fn update(&self, collection: &str, id: &str, fields: Fields) -> Result<(), Error>;

    /// Delete a document.
    ///
    /// # Errors
    /// Returns [Error::NotFound] if no document has the given id.
    async fn delete(&self, collection: &str, id: &str) -> Result<(), Error>;

    /// Open a live query. See [QuerySubscription].
    fn live_query(&self, query: Query) -> QuerySubscription;
}
