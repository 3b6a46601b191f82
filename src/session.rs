//! Auth session manager: the single authority for who is signed in.
//!
//! SYSTEM CONTEXT
//! ==============
//! Route guards and user-aware views read [`AuthState`]; login, signup and
//! logout forms call the operations here. The manager owns the
//! [`ApiClient`] that every feature view uses, and listens for its
//! unrecoverable-`401` signal to evict stale sessions.
//!
//! STATE MACHINE
//! =============
//! `Bootstrapping` (initial, `loading = true`) ends exactly once, in either
//! `Authenticated` or `Unauthenticated`. From there, login and logout move
//! between the two, and a failed silent refresh forces `Unauthenticated`.
//! `loading` never becomes true again.

#[cfg(test)]
#[path = "session_test.rs"]
mod session_test;

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use crate::client::{ApiClient, LOGIN_ENDPOINT, PROFILE_ENDPOINT, RequestOptions, SIGNUP_ENDPOINT};
use crate::error::ClientError;
use crate::token_store::TokenKind;
use crate::transport::Transport;
use crate::types::{LoginRequest, LoginResponse, ProfileResponse, SignupRequest, User};

/// Snapshot of the session as seen by views.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct AuthState {
    pub user: Option<User>,
    /// True only while the startup bootstrap is running.
    pub loading: bool,
    /// Set when a signed-in session was evicted because its tokens could no
    /// longer be refreshed; cleared by the next login or logout.
    pub expired: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Bootstrapping,
    Unauthenticated,
    Authenticated,
}

impl AuthState {
    /// Initial state at application start.
    pub fn bootstrapping() -> Self {
        Self { user: None, loading: true, expired: false }
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    pub fn phase(&self) -> Phase {
        if self.loading {
            Phase::Bootstrapping
        } else if self.is_authenticated() {
            Phase::Authenticated
        } else {
            Phase::Unauthenticated
        }
    }
}

type Listener = Rc<dyn Fn(&AuthState)>;

struct SessionShared {
    state: RefCell<AuthState>,
    listeners: RefCell<Vec<Listener>>,
    bootstrap_started: Cell<bool>,
    /// Bumped by login and logout so a slow bootstrap cannot overwrite them.
    generation: Cell<u64>,
}

impl SessionShared {
    fn update(&self, mutate: impl FnOnce(&mut AuthState)) {
        let snapshot = {
            let mut state = self.state.borrow_mut();
            let before = state.clone();
            mutate(&mut state);
            if *state == before {
                return;
            }
            state.clone()
        };
        let listeners: Vec<_> = self.listeners.borrow().clone();
        for listener in listeners {
            listener(&snapshot);
        }
    }

    fn bump_generation(&self) {
        self.generation.set(self.generation.get() + 1);
    }

    fn evict(&self) {
        self.update(|state| {
            if state.user.take().is_some() {
                state.expired = true;
            }
        });
    }
}

/// Owns session state and the operations that mutate it.
pub struct SessionManager<T> {
    client: ApiClient<T>,
    shared: Rc<SessionShared>,
}

impl<T> Clone for SessionManager<T> {
    fn clone(&self) -> Self {
        Self { client: self.client.clone(), shared: Rc::clone(&self.shared) }
    }
}

impl<T: Transport + 'static> SessionManager<T> {
    pub fn new(client: ApiClient<T>) -> Self {
        let shared = Rc::new(SessionShared {
            state: RefCell::new(AuthState::bootstrapping()),
            listeners: RefCell::new(Vec::new()),
            bootstrap_started: Cell::new(false),
            generation: Cell::new(0),
        });

        let weak: Weak<SessionShared> = Rc::downgrade(&shared);
        client.on_session_expired(move |client| {
            client.end_session();
            if let Some(shared) = weak.upgrade() {
                if shared.state.borrow().is_authenticated() {
                    tracing::warn!("session expired; signing out");
                }
                shared.evict();
            }
        });

        Self { client, shared }
    }

    /// Client for feature views; shares tokens with this session.
    pub fn client(&self) -> &ApiClient<T> {
        &self.client
    }

    pub fn state(&self) -> AuthState {
        self.shared.state.borrow().clone()
    }

    pub fn user(&self) -> Option<User> {
        self.shared.state.borrow().user.clone()
    }

    pub fn is_authenticated(&self) -> bool {
        self.shared.state.borrow().is_authenticated()
    }

    pub fn is_loading(&self) -> bool {
        self.shared.state.borrow().loading
    }

    /// Call `listener` with the new state after every change.
    pub fn subscribe(&self, listener: impl Fn(&AuthState) + 'static) {
        self.shared.listeners.borrow_mut().push(Rc::new(listener));
    }

    /// Restore a session from stored tokens. Runs once; later calls return
    /// immediately.
    ///
    /// Failures are silent: a returning user with a dead token simply lands
    /// unauthenticated with both tokens cleared.
    pub async fn bootstrap(&self) {
        if self.shared.bootstrap_started.replace(true) {
            return;
        }
        let generation = self.shared.generation.get();

        if self.client.tokens().get(TokenKind::Access).is_none() {
            tracing::debug!("no stored access token; starting signed out");
            self.client.end_session();
            self.shared.update(|state| state.loading = false);
            return;
        }

        tracing::debug!("restoring session from stored access token");
        let result = self.client.get_json::<ProfileResponse>(PROFILE_ENDPOINT).await;

        if self.shared.generation.get() != generation {
            tracing::debug!("bootstrap superseded by login or logout");
            self.shared.update(|state| state.loading = false);
            return;
        }

        match result {
            Ok(profile) => {
                let user = profile.into_user();
                tracing::info!(user_id = %user.id, "session restored");
                self.shared.update(|state| {
                    state.user = Some(user);
                    state.loading = false;
                });
            }
            Err(e) => {
                tracing::debug!(error = %e, "stored session rejected; clearing tokens");
                self.client.end_session();
                self.shared.update(|state| {
                    state.user = None;
                    state.loading = false;
                });
            }
        }
    }

    /// Exchange credentials for a token pair and sign in.
    ///
    /// # Errors
    ///
    /// Returns the backend or transport error unchanged; session state and
    /// stored tokens are untouched on failure.
    pub async fn login(&self, email: &str, password: &str) -> Result<User, ClientError> {
        let body = LoginRequest { email, password };
        let response: LoginResponse = self
            .client
            .post_json(LOGIN_ENDPOINT, &body, RequestOptions::CREDENTIALS)
            .await
            .inspect_err(|e| tracing::info!(error = %e, "login rejected"))?;

        let access = response
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or(ClientError::MissingField("accessToken"))?;
        let refresh = response
            .refresh_token
            .filter(|t| !t.is_empty())
            .ok_or(ClientError::MissingField("refreshToken"))?;
        let user = response.user.ok_or(ClientError::MissingField("user"))?;

        self.shared.bump_generation();
        self.client.start_session(&access, &refresh);
        tracing::info!(user_id = %user.id, "signed in");
        let signed_in = user.clone();
        self.shared.update(move |state| {
            state.user = Some(signed_in);
            state.expired = false;
        });
        Ok(user)
    }

    /// Register a new account. Does not sign the caller in.
    ///
    /// # Errors
    ///
    /// Returns the backend or transport error unchanged.
    pub async fn signup(&self, name: &str, email: &str, password: &str) -> Result<(), ClientError> {
        let body = SignupRequest { full_name: name, email, password };
        self.client
            .post(SIGNUP_ENDPOINT, &body, RequestOptions::CREDENTIALS)
            .await
            .inspect_err(|e| tracing::info!(error = %e, "signup rejected"))?;
        tracing::info!("account registered");
        Ok(())
    }

    /// Sign out locally: clears user and both tokens in the same tick.
    /// Idempotent.
    pub fn logout(&self) {
        self.shared.bump_generation();
        self.client.end_session();
        if self.is_authenticated() {
            tracing::info!("signed out");
        }
        self.shared.update(|state| {
            state.user = None;
            state.expired = false;
        });
    }

    /// Apply a local edit to the signed-in user (e.g. after onboarding).
    pub(crate) fn update_user(&self, edit: impl FnOnce(&mut User)) {
        self.shared.update(|state| {
            if let Some(user) = state.user.as_mut() {
                edit(user);
            }
        });
    }
}
