//! Email + password sign-in.
//!
//! SYSTEM CONTEXT
//! ==============
//! Protected routes send visitors here with the attempted location in the
//! `next` query parameter. Once the session reports a user, the page
//! forwards to that location (or `/`) with a history replace.

#[cfg(test)]
#[path = "login_test.rs"]
mod login_test;

use leptos::prelude::*;
use leptos_router::components::A;
use leptos_router::hooks::{use_navigate, use_query_map};
use vibecoders::guard::NEXT_PARAM;

use crate::app::{Session, use_auth};
use crate::util::auth::install_authenticated_forward;

const MISSING_FIELDS: &str = "Please enter your email and password.";
const SESSION_EXPIRED: &str = "Your session has expired. Please sign in again.";

/// Trim the email and require both fields.
fn validate_login_input(email: &str, password: &str) -> Result<(String, String), &'static str> {
    let email = email.trim();
    if email.is_empty() || password.is_empty() {
        return Err(MISSING_FIELDS);
    }
    Ok((email.to_owned(), password.to_owned()))
}

#[component]
pub fn LoginPage() -> impl IntoView {
    let auth = use_auth();
    let session = expect_context::<Session>();
    let query = use_query_map();
    let next = move || query.with(|q| q.get(NEXT_PARAM));

    // Also covers the post-login hop: signing in updates `auth`.
    install_authenticated_forward(auth, next, use_navigate());

    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let info = RwSignal::new(String::new());
    let busy = RwSignal::new(false);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get() {
            return;
        }
        let (email_value, password_value) = match validate_login_input(&email.get(), &password.get()) {
            Ok(input) => input,
            Err(msg) => {
                info.set(msg.to_owned());
                return;
            }
        };
        busy.set(true);
        info.set(String::new());

        leptos::task::spawn_local(async move {
            if let Err(e) = session.get().login(&email_value, &password_value).await {
                info.set(e.user_message());
            }
            busy.set(false);
        });
    };

    view! {
        <div class="login-page">
            <div class="login-card">
                <h1>"Vibecoders"</h1>
                <p class="login-card__subtitle">"Sign in to continue"</p>
                <Show when=move || auth.get().expired>
                    <p class="login-message login-message--warning">{SESSION_EXPIRED}</p>
                </Show>
                <form class="login-form" on:submit=on_submit>
                    <input
                        class="login-input"
                        type="email"
                        placeholder="you@example.com"
                        prop:value=move || email.get()
                        on:input=move |ev| email.set(event_target_value(&ev))
                    />
                    <input
                        class="login-input"
                        type="password"
                        placeholder="Password"
                        prop:value=move || password.get()
                        on:input=move |ev| password.set(event_target_value(&ev))
                    />
                    <button class="login-button" type="submit" disabled=move || busy.get()>
                        {move || if busy.get() { "Signing in..." } else { "Sign In" }}
                    </button>
                </form>
                <Show when=move || !info.get().is_empty()>
                    <p class="login-message">{move || info.get()}</p>
                </Show>
                <p class="login-card__footer">
                    "No account yet? " <A href="/register">"Create one"</A>
                </p>
            </div>
        </div>
    }
}
