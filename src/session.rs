//! The session view-model: who is signed in right now.
//!
//! The store subscribes to the identity provider's change events and mirrors
//! them into a watch channel; that subscription is the *only* writer of
//! session state. `login`, `signup` and `logout` just delegate to the provider
//! and report its verdict; the resulting state change arrives through the
//! subscription like any other.

use std::sync::Arc;

use tokio::{sync::watch, task::JoinHandle};

use crate::{Error, backend::IdentityProvider};

pub use crate::backend::Identity;

/// A snapshot of the session state.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    /// The signed-in identity, if any.
    pub identity: Option<Identity>,
    /// True until the first identity event has been observed. While loading,
    /// an absent identity means "unknown", not "signed out".
    pub loading: bool,
}

impl Session {
    /// True once a signed-in identity has been observed.
    pub fn is_authenticated(&self) -> bool {
        self.identity.is_some()
    }
}

/// Holds the current session state and wraps the credential API.
pub struct SessionStore<A: IdentityProvider> {
    provider: Arc<A>,
    state: Arc<watch::Sender<Session>>,
    forwarder: JoinHandle<()>,
}

impl<A: IdentityProvider> SessionStore<A> {
    /// Create the store and start mirroring identity changes.
    ///
    /// The provider's current identity is applied immediately, which clears
    /// the initial loading flag.
    pub fn new(provider: Arc<A>) -> Self {
        let (state, _) = watch::channel(Session {
            identity: None,
            loading: true,
        });
        let state = Arc::new(state);

        let mut events = provider.subscribe_to_identity_changes();
        let forwarder_state = Arc::clone(&state);
        let forwarder = tokio::spawn(async move {
            loop {
                let identity = events.borrow_and_update().clone();
                forwarder_state.send_replace(Session {
                    identity,
                    loading: false,
                });

                if events.changed().await.is_err() {
                    break;
                }
            }
        });

        Self {
            provider,
            state,
            forwarder,
        }
    }

    /// Watch the session state. The receiver's current value is the latest
    /// snapshot.
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    /// The latest session snapshot.
    pub fn current(&self) -> Session {
        self.state.borrow().clone()
    }

    /// Sign in with an email and password.
    ///
    /// On success the new identity arrives through the subscription; this
    /// method does not write session state itself.
    ///
    /// # Errors
    /// Returns the provider's error, typically [Error::InvalidCredentials].
    pub async fn login(&self, email: &str, password: &str) -> Result<(), Error> {
        self.provider.authenticate(email, password).await.map(|_| ())
    }

    /// Register a new account and sign it in.
    ///
    /// # Errors
    /// Returns the provider's error, typically [Error::EmailTaken] or
    /// [Error::WeakPassword].
    pub async fn signup(&self, email: &str, password: &str) -> Result<(), Error> {
        self.provider.create_account(email, password).await.map(|_| ())
    }

    /// Sign the current identity out. The cleared state arrives through the
    /// subscription.
    pub async fn logout(&self) -> Result<(), Error> {
        self.provider.sign_out().await
    }
}

impl<A: IdentityProvider> Drop for SessionStore<A> {
    fn drop(&mut self) {
        self.forwarder.abort();
    }
}

/// The user-facing message for a failed login or signup.
///
/// Classifies provider errors into the handful of cases the auth forms
/// distinguish; anything unexpected collapses into a generic message.
pub fn auth_error_message(error: &Error) -> String {
    match error {
        Error::InvalidCredentials => "Invalid email or password.".to_owned(),
        Error::EmailTaken(_) => "An account with this email already exists.".to_owned(),
        Error::WeakPassword(feedback) => format!("Password is too weak. {feedback}"),
        error => {
            tracing::error!("unexpected auth error: {error}");
            "Something went wrong. Please try again.".to_owned()
        }
    }
}
