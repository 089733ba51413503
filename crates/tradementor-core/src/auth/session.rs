use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::Value;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use crate::api::ApiClient;
use crate::models::AuthResponse;

use super::{AuthError, CredentialStore, SecureStore, Token};

/// Key the bearer token is persisted under in the secure store
pub const TOKEN_KEY: &str = "userToken";

/// What consumers see of the authentication state.
#[derive(Debug, Clone, PartialEq)]
pub enum Session {
    /// Initial state while the stored token is looked up and validated
    Loading,
    /// Signed in; `profile` is the server's user record, passed through as-is
    Authenticated { profile: Value },
    Anonymous,
}

impl Session {
    pub fn is_loading(&self) -> bool {
        matches!(self, Session::Loading)
    }

    pub fn is_authenticated(&self) -> bool {
        matches!(self, Session::Authenticated { .. })
    }

    pub fn profile(&self) -> Option<&Value> {
        match self {
            Session::Authenticated { profile } => Some(profile),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Session::Loading => "loading",
            Session::Authenticated { .. } => "authenticated",
            Session::Anonymous => "anonymous",
        }
    }
}

/// Owns the session state machine.
///
/// `Loading` → `Authenticated` | `Anonymous` on [`restore`](Self::restore),
/// then `Anonymous` → `Authenticated` on sign-in/sign-up and back on
/// sign-out. Every transition is published on a watch channel.
///
/// The in-memory [`CredentialStore`] (shared with the gateway) and the
/// durable [`SecureStore`] are only ever written here, and always together.
///
/// Sign-in, sign-up and sign-out are accepted while still `Loading` and win
/// over a startup validation that is still in flight.
pub struct SessionManager {
    api: ApiClient,
    credentials: Arc<CredentialStore>,
    store: Arc<dyn SecureStore>,
    state: watch::Sender<Session>,
    restore_started: AtomicBool,
    // Serializes token writes with their state transition
    writes: Mutex<()>,
}

impl SessionManager {
    /// The manager uses the gateway's own credential store, so the token it
    /// sets is the one the gateway sends.
    pub fn new(api: ApiClient, store: Arc<dyn SecureStore>) -> Self {
        let credentials = Arc::clone(api.credentials());
        let (state, _) = watch::channel(Session::Loading);
        Self {
            api,
            credentials,
            store,
            state,
            restore_started: AtomicBool::new(false),
            writes: Mutex::new(()),
        }
    }

    pub fn api(&self) -> &ApiClient {
        &self.api
    }

    /// Snapshot of the current state
    pub fn current(&self) -> Session {
        self.state.borrow().clone()
    }

    /// Receiver that wakes on every transition
    pub fn subscribe(&self) -> watch::Receiver<Session> {
        self.state.subscribe()
    }

    pub fn is_authenticated(&self) -> bool {
        self.state.borrow().is_authenticated()
    }

    pub fn profile(&self) -> Option<Value> {
        self.state.borrow().profile().cloned()
    }

    /// Startup: load the persisted token and validate it with a profile fetch.
    ///
    /// Never fails. A missing, unreadable or rejected token all end in
    /// `Anonymous`. A rejected token is left in both stores. Runs at most
    /// once; a concurrent call waits for the first to settle and later calls
    /// return the current state untouched. If the session leaves `Loading`
    /// while the profile fetch is pending, that newer state is kept.
    pub async fn restore(&self) -> Session {
        if self.restore_started.swap(true, Ordering::SeqCst) {
            debug!("Session restore already started");
            return self.settled().await;
        }

        let stored = match self.store.load(TOKEN_KEY) {
            Ok(stored) => stored,
            Err(e) => {
                warn!(error = %e, "Failed to read stored token");
                None
            }
        };

        let Some(token) = stored.filter(|t| !t.is_empty()) else {
            debug!("No stored token");
            return self.finish_restore(Session::Anonymous);
        };

        {
            let _writes = self.lock_writes();
            if !self.state.borrow().is_loading() {
                debug!("Session changed before the stored token was applied");
                return self.current();
            }
            self.credentials.set(Token::new(token));
        }

        let next = match self.api.get_profile().await {
            Ok(profile) => Session::Authenticated { profile },
            Err(e) => {
                info!(status = ?e.status(), error = %e, "Stored token not accepted, continuing signed out");
                Session::Anonymous
            }
        };
        self.finish_restore(next)
    }

    /// Sign in and return the user profile from the response.
    ///
    /// On any failure the session, credential store and secure store are
    /// left exactly as they were.
    pub async fn sign_in(&self, email: &str, password: &str) -> Result<Value, AuthError> {
        let response = self.api.sign_in(email, password).await?;
        self.establish(response)
    }

    /// Create an account and sign straight into it. Same contract as
    /// [`sign_in`](Self::sign_in).
    pub async fn sign_up(&self, name: &str, email: &str, password: &str) -> Result<Value, AuthError> {
        let response = self.api.sign_up(name, email, password).await?;
        self.establish(response)
    }

    /// Sign out. Always ends `Anonymous` with an empty credential store.
    ///
    /// If the durable delete fails the error is returned, but only after the
    /// in-memory state has been cleared.
    pub fn sign_out(&self) -> Result<(), AuthError> {
        let _writes = self.lock_writes();
        let deleted = self.store.delete(TOKEN_KEY);
        if let Err(ref e) = deleted {
            warn!(error = %e, "Failed to delete stored token");
        }

        self.credentials.clear();
        self.transition(Session::Anonymous);

        deleted.map_err(AuthError::from)
    }

    /// Re-fetch the profile and publish it, e.g. after `update_profile`.
    pub async fn refresh_profile(&self) -> Result<Value, AuthError> {
        if !self.is_authenticated() {
            return Err(AuthError::NotAuthenticated);
        }
        let profile = self.api.get_profile().await?;

        let _writes = self.lock_writes();
        // A sign-out during the fetch stands
        if !self.is_authenticated() {
            return Err(AuthError::NotAuthenticated);
        }
        self.transition(Session::Authenticated {
            profile: profile.clone(),
        });
        Ok(profile)
    }

    fn establish(&self, response: Value) -> Result<Value, AuthError> {
        // Never keep serde's message here: it can echo the token
        let auth: AuthResponse = serde_json::from_value(response).map_err(|_| {
            AuthError::InvalidResponse("expected a token and user in the response".to_string())
        })?;

        if auth.token.is_empty() {
            return Err(AuthError::InvalidResponse("response token is empty".to_string()));
        }
        if auth.user.is_null() {
            return Err(AuthError::InvalidResponse("response user is missing".to_string()));
        }

        let _writes = self.lock_writes();
        self.store.save(TOKEN_KEY, &auth.token)?;
        self.credentials.set(Token::new(auth.token));
        self.transition(Session::Authenticated {
            profile: auth.user.clone(),
        });
        Ok(auth.user)
    }

    /// Publish the startup result only if nothing else has moved the
    /// session out of `Loading` in the meantime.
    fn finish_restore(&self, next: Session) -> Session {
        let _writes = self.lock_writes();
        let label = next.label();
        let published = self.state.send_if_modified(|current| {
            if current.is_loading() {
                *current = next;
                true
            } else {
                false
            }
        });
        if published {
            info!(state = label, "Session state changed");
        } else {
            debug!(discarded = label, "Session changed during restore, keeping it");
        }
        self.current()
    }

    /// Wait for another `restore` to leave `Loading`.
    async fn settled(&self) -> Session {
        let mut updates = self.state.subscribe();
        let settled = match updates.wait_for(|s| !s.is_loading()).await {
            Ok(state) => (*state).clone(),
            Err(_) => self.current(),
        };
        settled
    }

    fn lock_writes(&self) -> MutexGuard<'_, ()> {
        self.writes
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn transition(&self, next: Session) -> Session {
        info!(state = next.label(), "Session state changed");
        self.state.send_replace(next.clone());
        next
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("api", &self.api)
            .field("state", &self.state.borrow().label())
            .finish_non_exhaustive()
    }
}
