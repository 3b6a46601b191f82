//! Shared auth UI helpers.
//!
//! SYSTEM CONTEXT
//! ==============
//! Protected routes and the login page must apply identical redirect rules,
//! so both go through the core's guard functions here. Every auth-driven
//! navigation replaces the current history entry: the back button never
//! returns to a page that would just redirect again.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

use leptos::prelude::*;
use leptos_router::NavigateOptions;
use vibecoders::guard::{self, GuardDecision, RedirectTarget};

use crate::state::auth::AuthState;

/// Login URL to send the visitor to, if the guard denies `target`.
pub fn unauth_redirect(state: &AuthState, target: &RedirectTarget) -> Option<String> {
    match guard::decide(state, target) {
        GuardDecision::Redirect(url) => Some(url),
        GuardDecision::Loading | GuardDecision::Render => None,
    }
}

pub fn replace_history() -> NavigateOptions {
    NavigateOptions { replace: true, ..Default::default() }
}

/// Redirect to the login URL whenever auth has settled with no user present.
pub fn install_unauth_redirect<L, F>(auth: RwSignal<AuthState>, location: L, navigate: F)
where
    L: Fn() -> RedirectTarget + 'static,
    F: Fn(&str, NavigateOptions) + Clone + 'static,
{
    Effect::new(move || {
        let state = auth.get();
        if let Some(url) = unauth_redirect(&state, &location()) {
            navigate(&url, replace_history());
        }
    });
}

/// Send an already signed-in visitor from the login page to `next`.
pub fn install_authenticated_forward<N, F>(auth: RwSignal<AuthState>, next: N, navigate: F)
where
    N: Fn() -> Option<String> + 'static,
    F: Fn(&str, NavigateOptions) + Clone + 'static,
{
    Effect::new(move || {
        let state = auth.get();
        if let Some(dest) = guard::login_page_forward(&state, next().as_deref()) {
            navigate(&dest, replace_history());
        }
    });
}
