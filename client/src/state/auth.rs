//! Auth-session state for the current browser user.
//!
//! SYSTEM CONTEXT
//! ==============
//! Used by route guards and user-aware components to coordinate login redirects
//! and identity-dependent rendering. The session core owns the state; the app
//! mirrors every change into an `RwSignal<AuthState>` context value.

#[cfg(test)]
#[path = "auth_test.rs"]
mod auth_test;

pub use vibecoders::AuthState;

/// Name to greet the signed-in user with, falling back to their email.
pub fn display_name(state: &AuthState) -> Option<String> {
    let user = state.user.as_ref()?;
    let name = user.name.trim();
    Some(if name.is_empty() { user.email.clone() } else { name.to_owned() })
}

/// Signed in but has not completed the onboarding questionnaire.
pub fn needs_onboarding(state: &AuthState) -> bool {
    state.user.as_ref().is_some_and(|user| !user.onboarding)
}
