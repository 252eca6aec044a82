//! Session guard.
//!
//! `SessionContext` owns the single live credential of a client instance and
//! the preferences loaded for it. Views receive it explicitly and call
//! `require()` on entry; a request rejected by the server ends the session
//! through `invalidate()`, which clears the credential and routes to login
//! exactly once no matter how many requests fail together.

use parking_lot::Mutex;
use skycast_core::{AppError, AuthError, UserPreferences};
use std::sync::Arc;

use crate::storage::CredentialStore;

/// Key under which the session token is persisted.
pub const SESSION_KEY: &str = "session_token";

/// Navigation targets the session logic can send the user to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Login,
    Dashboard,
}

/// Front-end hook invoked when the session logic needs to change screens.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// Navigator that records every route it was sent to.
///
/// Front-ends that render on their own schedule can poll `last()`.
#[derive(Debug, Default)]
pub struct RouteLog {
    routes: Mutex<Vec<Route>>,
}

impl RouteLog {
    pub fn routes(&self) -> Vec<Route> {
        self.routes.lock().clone()
    }

    pub fn last(&self) -> Option<Route> {
        self.routes.lock().last().copied()
    }

    pub fn count(&self, route: Route) -> usize {
        self.routes.lock().iter().filter(|r| **r == route).count()
    }
}

impl Navigator for RouteLog {
    fn navigate(&self, route: Route) {
        self.routes.lock().push(route);
    }
}

#[derive(Debug, Default)]
struct SessionState {
    token: Option<String>,
    preferences: Option<UserPreferences>,
}

pub struct SessionContext {
    store: Arc<dyn CredentialStore>,
    navigator: Arc<dyn Navigator>,
    state: Mutex<SessionState>,
}

impl SessionContext {
    /// Create an empty session (nobody signed in).
    pub fn new(store: Arc<dyn CredentialStore>, navigator: Arc<dyn Navigator>) -> Self {
        Self {
            store,
            navigator,
            state: Mutex::new(SessionState::default()),
        }
    }

    /// Create a session from the persisted credential, if there is one.
    ///
    /// The credential is not checked here; the first data request does that.
    pub fn restore(
        store: Arc<dyn CredentialStore>,
        navigator: Arc<dyn Navigator>,
    ) -> Result<Self, AuthError> {
        let token = store.load(SESSION_KEY)?;
        if token.is_some() {
            tracing::debug!("Restored persisted session");
        }

        Ok(Self {
            store,
            navigator,
            state: Mutex::new(SessionState {
                token,
                preferences: None,
            }),
        })
    }

    pub fn is_active(&self) -> bool {
        self.state.lock().token.is_some()
    }

    /// Gate for protected views: the current token, or a redirect to login.
    pub fn require(&self) -> Result<String, AuthError> {
        let token = self.state.lock().token.clone();
        match token {
            Some(token) => Ok(token),
            None => {
                tracing::info!("No session, routing to login");
                self.navigator.navigate(Route::Login);
                Err(AuthError::NotAuthenticated)
            }
        }
    }

    /// Persist and activate a freshly issued token.
    pub fn establish(&self, token: String) -> Result<(), AuthError> {
        let mut state = self.state.lock();
        self.store.store(SESSION_KEY, &token)?;
        state.token = Some(token);
        state.preferences = None;
        tracing::info!("Session established");
        Ok(())
    }

    /// End the session because the server rejected `token`.
    ///
    /// Only the first caller holding the live token clears it and navigates;
    /// later callers (or callers holding an older token) do nothing.
    /// Returns whether this call ended the session.
    pub fn invalidate(&self, token: &str) -> bool {
        {
            let mut state = self.state.lock();
            if state.token.as_deref() != Some(token) {
                return false;
            }
            state.token = None;
            state.preferences = None;
            if let Err(e) = self.store.remove(SESSION_KEY) {
                tracing::warn!("Failed to remove rejected credential: {}", e);
            }
        }

        tracing::warn!("Session rejected by server, routing to login");
        self.navigator.navigate(Route::Login);
        true
    }

    /// Apply the session consequences of a failed request made with `token`.
    pub fn handle_failure(&self, token: &str, error: &AppError) {
        if error.is_session_terminal() {
            self.invalidate(token);
        }
    }

    /// Sign out: drop the credential and route to login.
    pub fn logout(&self) -> Result<(), AuthError> {
        {
            let mut state = self.state.lock();
            self.store.remove(SESSION_KEY)?;
            state.token = None;
            state.preferences = None;
        }

        tracing::info!("Logged out");
        self.navigator.navigate(Route::Login);
        Ok(())
    }

    pub fn preferences(&self) -> Option<UserPreferences> {
        self.state.lock().preferences.clone()
    }

    /// Cache preferences loaded with `token`.
    ///
    /// Ignored when the session changed while the request was in flight.
    pub fn cache_preferences(&self, token: &str, preferences: UserPreferences) -> bool {
        let mut state = self.state.lock();
        if state.token.as_deref() != Some(token) {
            return false;
        }
        state.preferences = Some(preferences);
        true
    }

    pub fn navigate(&self, route: Route) {
        self.navigator.navigate(route);
    }
}

impl std::fmt::Debug for SessionContext {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionContext")
            .field("active", &self.is_active())
            .finish()
    }
}
