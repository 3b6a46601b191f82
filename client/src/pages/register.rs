//! Account registration. Success sends the user to `/login`; signing up
//! never signs in.

#[cfg(test)]
#[path = "register_test.rs"]
mod register_test;

use leptos::prelude::*;
use leptos_router::components::A;
use leptos_router::hooks::use_navigate;
use vibecoders::guard::{DEFAULT_LANDING, LOGIN_ROUTE};

use crate::app::{Session, use_auth};
use crate::util::auth::replace_history;

pub const MIN_PASSWORD_LEN: usize = 6;

const MISSING_FIELDS: &str = "Please fill in every field.";
const PASSWORD_MISMATCH: &str = "Passwords do not match.";
const PASSWORD_TOO_SHORT: &str = "Password must be at least 6 characters.";

#[derive(Clone, Debug, PartialEq, Eq)]
struct RegisterInput {
    name: String,
    email: String,
    password: String,
}

fn validate_register_input(
    name: &str,
    email: &str,
    password: &str,
    confirm: &str,
) -> Result<RegisterInput, &'static str> {
    let (name, email) = (name.trim(), email.trim());
    if name.is_empty() || email.is_empty() || password.is_empty() || confirm.is_empty() {
        return Err(MISSING_FIELDS);
    }
    if password != confirm {
        return Err(PASSWORD_MISMATCH);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(PASSWORD_TOO_SHORT);
    }
    Ok(RegisterInput { name: name.to_owned(), email: email.to_owned(), password: password.to_owned() })
}

#[component]
pub fn RegisterPage() -> impl IntoView {
    let auth = use_auth();
    let session = expect_context::<Session>();
    let navigate = use_navigate();

    let navigate_home = navigate.clone();
    Effect::new(move || {
        let state = auth.get();
        if !state.loading && state.is_authenticated() {
            navigate_home(DEFAULT_LANDING, replace_history());
        }
    });

    let name = RwSignal::new(String::new());
    let email = RwSignal::new(String::new());
    let password = RwSignal::new(String::new());
    let confirm = RwSignal::new(String::new());
    let info = RwSignal::new(String::new());
    let busy = RwSignal::new(false);

    let on_submit = move |ev: leptos::ev::SubmitEvent| {
        ev.prevent_default();
        if busy.get() {
            return;
        }
        let input = match validate_register_input(&name.get(), &email.get(), &password.get(), &confirm.get()) {
            Ok(input) => input,
            Err(msg) => {
                info.set(msg.to_owned());
                return;
            }
        };
        busy.set(true);
        info.set(String::new());

        let navigate = navigate.clone();
        leptos::task::spawn_local(async move {
            match session.get().signup(&input.name, &input.email, &input.password).await {
                Ok(()) => navigate(LOGIN_ROUTE, Default::default()),
                Err(e) => info.set(e.user_message()),
            }
            busy.set(false);
        });
    };

    let field = move |label: &'static str, kind: &'static str, value: RwSignal<String>| {
        view! {
            <input
                class="login-input"
                type=kind
                placeholder=label
                prop:value=move || value.get()
                on:input=move |ev| value.set(event_target_value(&ev))
            />
        }
    };

    view! {
        <div class="login-page">
            <div class="login-card">
                <h1>"Create your account"</h1>
                <form class="login-form" on:submit=on_submit>
                    {field("Full name", "text", name)}
                    {field("you@example.com", "email", email)}
                    {field("Password", "password", password)}
                    {field("Confirm password", "password", confirm)}
                    <button class="login-button" type="submit" disabled=move || busy.get()>
                        {move || if busy.get() { "Creating account..." } else { "Sign Up" }}
                    </button>
                </form>
                <Show when=move || !info.get().is_empty()>
                    <p class="login-message">{move || info.get()}</p>
                </Show>
                <p class="login-card__footer">
                    "Already registered? " <A href=LOGIN_ROUTE>"Sign in"</A>
                </p>
            </div>
        </div>
    }
}
