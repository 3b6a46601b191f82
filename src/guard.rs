//! Protected-route decisions and redirect-after-login bookkeeping.
//!
//! SYSTEM CONTEXT
//! ==============
//! View layers call [`decide`] on every auth-state change and render exactly
//! what it says: a neutral loading indicator during bootstrap, the protected
//! content once authenticated, or nothing while navigating to the login URL.
//! The attempted location travels in the login URL's `next` parameter and is
//! consumed once by [`login_destination`] after a successful sign-in.

#[cfg(test)]
#[path = "guard_test.rs"]
mod guard_test;

use url::form_urlencoded;

use crate::session::AuthState;

pub const LOGIN_ROUTE: &str = "/login";
pub const DEFAULT_LANDING: &str = "/";
pub const NEXT_PARAM: &str = "next";

/// What a protected route should show for the current auth state.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum GuardDecision {
    /// Bootstrap still running; show only a loading indicator.
    Loading,
    /// Navigate (replacing history) to this login URL.
    Redirect(String),
    /// Render the protected content.
    Render,
}

/// A same-origin location (path, query, fragment) to return to after login.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RedirectTarget(String);

impl RedirectTarget {
    /// Build from router location parts. `search` and `hash` may carry or
    /// omit their leading `?` / `#`.
    pub fn from_parts(pathname: &str, search: &str, hash: &str) -> Self {
        let mut target = if pathname.starts_with('/') { pathname.to_owned() } else { format!("/{pathname}") };
        let search = search.trim_start_matches('?');
        if !search.is_empty() {
            target.push('?');
            target.push_str(search);
        }
        let hash = hash.trim_start_matches('#');
        if !hash.is_empty() {
            target.push('#');
            target.push_str(hash);
        }
        Self(target)
    }

    /// Accept `raw` only if it is a safe in-app location.
    pub fn parse(raw: &str) -> Option<Self> {
        is_safe_target(raw).then(|| Self(raw.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Login URL that will send the user back here after sign-in.
    pub fn login_url(&self) -> String {
        if !is_safe_target(&self.0) {
            return LOGIN_ROUTE.to_owned();
        }
        let encoded: String = form_urlencoded::byte_serialize(self.0.as_bytes()).collect();
        format!("{LOGIN_ROUTE}?{NEXT_PARAM}={encoded}")
    }
}

/// Route-guard decision for `state` at `location`.
pub fn decide(state: &AuthState, location: &RedirectTarget) -> GuardDecision {
    if state.loading {
        GuardDecision::Loading
    } else if state.is_authenticated() {
        GuardDecision::Render
    } else {
        GuardDecision::Redirect(location.login_url())
    }
}

/// Extract the raw `next` value from a query string (with or without `?`).
pub fn next_from_query(search: &str) -> Option<String> {
    form_urlencoded::parse(search.trim_start_matches('?').as_bytes())
        .find(|(key, _)| key == NEXT_PARAM)
        .map(|(_, value)| value.into_owned())
}

/// Where the login view should go after a successful sign-in.
pub fn login_destination(next: Option<&str>) -> String {
    next.and_then(RedirectTarget::parse)
        .map_or_else(|| DEFAULT_LANDING.to_owned(), |target| target.0)
}

/// Where the login view should send an already-authenticated visitor, if
/// anywhere. `None` while bootstrap runs or when signed out.
pub fn login_page_forward(state: &AuthState, next: Option<&str>) -> Option<String> {
    (!state.loading && state.is_authenticated()).then(|| login_destination(next))
}

fn is_safe_target(raw: &str) -> bool {
    if !raw.starts_with('/') || raw.starts_with("//") || raw.contains('\\') {
        return false;
    }
    if raw.chars().any(char::is_control) {
        return false;
    }
    let path = raw.split(['?', '#']).next().unwrap_or_default();
    path.trim_end_matches('/') != LOGIN_ROUTE
}
