//! Auth session state and context. `reduce` is the pure transition function;
//! `AuthContext` is the only place that dispatches actions, talks to the auth
//! endpoints, and writes the persisted session. Views subscribe to state
//! snapshots through a `watch` channel and never mutate them directly.
//!
//! Ordering: every operation that emits `Start` emits exactly one terminal
//! action (`Success` or `Failure`) afterwards. Revalidation, background or
//! explicit, is fenced by a generation counter: `Logout` and every fresh
//! sign-in bump it, and a revalidation that started under an older generation
//! is discarded.

use super::{
    client::AuthClient,
    session::{Restored, SessionStore},
    types::{ApiEnvelope, AuthPayload, Credentials, Registration, Role, UserRecord},
};
use crate::{
    config::AppConfig,
    errors::AppError,
    messages::Messages,
    preferences::language_from,
    storage::Storage,
};
use secrecy::SecretString;
use serde::Serialize;
use serde_json::{Map, Value};
use std::{
    fmt,
    sync::{
        atomic::{AtomicU64, Ordering},
        Arc,
    },
};
use tokio::{sync::watch, task::JoinHandle};
use tracing::{debug, instrument, warn};

/// In-memory authentication state.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct AuthState {
    pub user: Option<UserRecord>,
    pub is_authenticated: bool,
    pub is_loading: bool,
    pub error: Option<String>,
}

impl AuthState {
    #[must_use]
    pub fn initial() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn role(&self) -> Option<Role> {
        self.user.as_ref().map(|user| user.role)
    }
}

/// The only ways `AuthState` changes.
#[derive(Clone, Debug, PartialEq)]
pub enum AuthAction {
    Start,
    Success(UserRecord),
    /// An empty message means "no session", not a user-facing error.
    Failure(String),
    Logout,
    UpdateUser(Map<String, Value>),
}

/// Pure transition function.
#[must_use]
pub fn reduce(state: &AuthState, action: &AuthAction) -> AuthState {
    match action {
        AuthAction::Start => AuthState {
            is_loading: true,
            error: None,
            ..state.clone()
        },
        AuthAction::Success(user) => AuthState {
            user: Some(user.clone()),
            is_authenticated: true,
            is_loading: false,
            error: None,
        },
        AuthAction::Failure(message) => AuthState {
            user: None,
            is_authenticated: false,
            is_loading: false,
            error: Some(message.clone()).filter(|message| !message.is_empty()),
        },
        AuthAction::Logout => AuthState::initial(),
        AuthAction::UpdateUser(partial) => {
            match state.user.as_ref().and_then(|user| user.merged(partial)) {
                Some(user) => AuthState {
                    user: Some(user),
                    ..state.clone()
                },
                None => state.clone(),
            }
        }
    }
}

/// Result of an explicit identity refresh.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The server confirmed the session; the user record was replaced.
    Refreshed,
    /// The server rejected the session. Local state is kept as is.
    SoftRejected(String),
    /// The server could not be reached; nothing changed.
    Unavailable,
    /// No token is persisted, so there was nothing to refresh.
    NoSession,
    /// A sign-in or logout happened while the request was in flight; its
    /// result was discarded.
    Superseded,
}

enum IdentityError {
    Rejected,
    Unavailable(AppError),
}

struct Inner {
    state: watch::Sender<AuthState>,
    session: SessionStore,
    client: AuthClient,
    generation: AtomicU64,
}

/// Cloneable handle to the application's single auth state.
#[derive(Clone)]
pub struct AuthContext {
    inner: Arc<Inner>,
}

impl fmt::Debug for AuthContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthContext")
            .field("state", &*self.inner.state.borrow())
            .field("generation", &self.generation())
            .finish_non_exhaustive()
    }
}

impl AuthContext {
    #[must_use]
    pub fn new(client: AuthClient, storage: Arc<dyn Storage>) -> Self {
        let (state, _) = watch::channel(AuthState::initial());
        Self {
            inner: Arc::new(Inner {
                state,
                session: SessionStore::new(storage),
                client,
                generation: AtomicU64::new(0),
            }),
        }
    }

    /// # Errors
    /// Returns `AppError::Config` if the HTTP client cannot be built.
    pub fn from_config(config: AppConfig, storage: Arc<dyn Storage>) -> Result<Self, AppError> {
        Ok(Self::new(AuthClient::new(config)?, storage))
    }

    /// Current state.
    #[must_use]
    pub fn snapshot(&self) -> AuthState {
        self.inner.state.borrow().clone()
    }

    /// Receiver notified on every transition.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<AuthState> {
        self.inner.state.subscribe()
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner.state.borrow().is_authenticated
    }

    /// Persisted bearer token for feature API calls.
    #[must_use]
    pub fn token(&self) -> Option<SecretString> {
        self.inner.session.token()
    }

    #[must_use]
    pub fn generation(&self) -> u64 {
        self.inner.generation.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn messages(&self) -> Messages {
        Messages::new(language_from(self.inner.session.storage().as_ref()))
    }

    /// Restores the persisted session once at start.
    ///
    /// A valid record is trusted immediately and revalidated in the background;
    /// the returned handle completes when that revalidation settles. Without a
    /// Tokio runtime the revalidation is skipped.
    #[instrument(skip(self))]
    pub fn initialize(&self) -> Option<JoinHandle<()>> {
        self.dispatch(AuthAction::Start);

        match self.inner.session.restore() {
            Restored::Valid { user, .. } => {
                debug!("restored session for user {}", user.id);
                self.dispatch(AuthAction::Success(user));

                let context = self.clone();
                match tokio::runtime::Handle::try_current() {
                    Ok(handle) => Some(handle.spawn(async move {
                        context.silent_refresh_auth().await;
                    })),
                    Err(_) => {
                        debug!("no async runtime, skipping background revalidation");
                        None
                    }
                }
            }
            Restored::Absent => {
                self.dispatch(AuthAction::Failure(String::new()));
                None
            }
            Restored::Malformed => {
                warn!("discarding malformed persisted session");
                if let Err(err) = self.inner.session.clear_all() {
                    warn!("failed to clear persisted session: {err}");
                }
                self.dispatch(AuthAction::Failure(String::new()));
                None
            }
        }
    }

    /// Signs in with credentials. Never returns an error: every failure ends in
    /// `Failure` with the server's message or a localized generic one.
    #[instrument(skip_all)]
    pub async fn login(&self, credentials: &Credentials) -> bool {
        self.dispatch(AuthAction::Start);
        let messages = self.messages();

        if !credentials.is_complete() {
            self.dispatch(AuthAction::Failure(messages.missing_credentials().to_string()));
            return false;
        }

        let response = self.inner.client.login(credentials).await;
        self.complete_sign_in(response, messages.login_failed(), messages)
    }

    /// Creates an account and signs in with the returned session.
    #[instrument(skip_all)]
    pub async fn register(&self, registration: &Registration) -> bool {
        self.dispatch(AuthAction::Start);
        let messages = self.messages();

        if !registration.is_complete() {
            self.dispatch(AuthAction::Failure(messages.missing_credentials().to_string()));
            return false;
        }
        if !registration.has_valid_email() {
            self.dispatch(AuthAction::Failure(messages.invalid_email().to_string()));
            return false;
        }

        let response = self.inner.client.register(registration).await;
        self.complete_sign_in(response, messages.register_failed(), messages)
    }

    /// Notifies the server (best effort) and wipes the local session.
    #[instrument(skip(self))]
    pub async fn logout(&self) {
        let token = self.inner.session.token();
        if let Err(err) = self.inner.client.logout(token.as_ref()).await {
            debug!("logout notification failed: {err}");
        }
        self.dispatch(AuthAction::Logout);
    }

    /// Wipes the local session without contacting the server.
    pub fn clear_session(&self) {
        self.dispatch(AuthAction::Logout);
    }

    /// Shallow-merges profile fields into the current user. Local only.
    pub fn update_user(&self, partial: Map<String, Value>) {
        self.dispatch(AuthAction::UpdateUser(partial));
    }

    /// Replaces the user with the server's view of the session. A rejection is
    /// reported to the caller but does not sign the session out. Like the
    /// background variant, the result is dropped if the generation moved.
    #[instrument(skip(self))]
    pub async fn refresh_auth(&self) -> RefreshOutcome {
        let generation = self.generation();
        let Some(token) = self.inner.session.token() else {
            return RefreshOutcome::NoSession;
        };

        match self.fetch_identity(&token).await {
            Ok(user) => {
                if self.dispatch_fenced(AuthAction::Success(user), Some(generation)) {
                    RefreshOutcome::Refreshed
                } else {
                    debug!("discarding refresh started before a sign-in or logout");
                    RefreshOutcome::Superseded
                }
            }
            Err(IdentityError::Rejected) => {
                warn!("session rejected by the server, keeping local state");
                RefreshOutcome::SoftRejected(self.messages().session_rejected().to_string())
            }
            Err(IdentityError::Unavailable(err)) => {
                warn!("identity refresh failed: {err}");
                RefreshOutcome::Unavailable
            }
        }
    }

    /// Background variant of `refresh_auth`: failures are swallowed and state
    /// is only touched on success, and only if no sign-in or logout happened
    /// while the request was in flight.
    #[instrument(skip(self))]
    pub async fn silent_refresh_auth(&self) {
        let generation = self.generation();
        let Some(token) = self.inner.session.token() else {
            return;
        };

        match self.fetch_identity(&token).await {
            Ok(user) => {
                if !self.dispatch_fenced(AuthAction::Success(user), Some(generation)) {
                    debug!("discarding stale background revalidation");
                }
            }
            Err(IdentityError::Rejected) => debug!("background revalidation rejected"),
            Err(IdentityError::Unavailable(err)) => debug!("background revalidation failed: {err}"),
        }
    }

    async fn fetch_identity(&self, token: &SecretString) -> Result<UserRecord, IdentityError> {
        match self.inner.client.me(token).await {
            Ok(envelope) if envelope.success => envelope
                .data
                .and_then(UserRecord::from_value)
                .ok_or(IdentityError::Rejected),
            Ok(_) => Err(IdentityError::Rejected),
            Err(err) if err.is_rejection() => Err(IdentityError::Rejected),
            Err(err) => Err(IdentityError::Unavailable(err)),
        }
    }

    fn complete_sign_in(
        &self,
        response: Result<ApiEnvelope<Value>, AppError>,
        fallback: &str,
        messages: Messages,
    ) -> bool {
        let envelope = match response {
            Ok(envelope) => envelope,
            Err(err) => {
                warn!("sign-in request failed: {err}");
                let message = match err {
                    AppError::Network(_) | AppError::Timeout(_) => messages.network_failed(),
                    _ => fallback,
                };
                self.dispatch(AuthAction::Failure(message.to_string()));
                return false;
            }
        };

        let rejection = envelope.rejection_message().map(str::to_string);
        let payload = if envelope.success {
            envelope.data.and_then(AuthPayload::from_data)
        } else {
            None
        };

        let Some(payload) = payload else {
            self.dispatch(AuthAction::Failure(
                rejection.unwrap_or_else(|| fallback.to_string()),
            ));
            return false;
        };

        if let Err(err) = self
            .inner
            .session
            .write_tokens(&payload.token, payload.refresh_token.as_ref())
        {
            warn!("failed to persist session token: {err}");
        }
        self.inner.generation.fetch_add(1, Ordering::SeqCst);
        self.dispatch(AuthAction::Success(payload.user));
        true
    }

    fn dispatch(&self, action: AuthAction) {
        self.dispatch_fenced(action, None);
    }

    /// Applies `action` and its persistence side effect as one step. With
    /// `expected_generation` set, the action is dropped if the generation moved.
    fn dispatch_fenced(&self, action: AuthAction, expected_generation: Option<u64>) -> bool {
        let mut applied = false;
        self.inner.state.send_if_modified(|state| {
            if expected_generation.is_some_and(|expected| expected != self.generation()) {
                return false;
            }

            let next = reduce(state, &action);
            self.write_through(&action, &next);
            if action == AuthAction::Logout {
                self.inner.generation.fetch_add(1, Ordering::SeqCst);
            }

            debug!(
                authenticated = next.is_authenticated,
                loading = next.is_loading,
                "auth transition"
            );
            *state = next;
            applied = true;
            true
        });
        applied
    }

    fn write_through(&self, action: &AuthAction, next: &AuthState) {
        let result = match action {
            AuthAction::Success(_) | AuthAction::UpdateUser(_) => match &next.user {
                Some(user) => self.inner.session.write_user(user),
                None => Ok(()),
            },
            AuthAction::Logout => self.inner.session.clear_all(),
            AuthAction::Start | AuthAction::Failure(_) => Ok(()),
        };

        if let Err(err) = result {
            warn!("failed to persist session change: {err}");
        }
    }
}
