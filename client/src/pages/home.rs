//! Authenticated landing page.

use leptos::prelude::*;
use leptos_router::components::A;

use crate::app::{Session, use_auth};
use crate::state::auth::{display_name, needs_onboarding};

#[component]
pub fn HomePage() -> impl IntoView {
    let auth = use_auth();
    let session = expect_context::<Session>();

    view! {
        <div class="home-page">
            <header class="home-page__header">
                <h1>{move || format!("Welcome, {}", display_name(&auth.get()).unwrap_or_default())}</h1>
                // Route guard takes over once the user is cleared.
                <button class="home-page__logout" on:click=move |_| session.get().logout()>
                    "Sign Out"
                </button>
            </header>
            <Show when=move || needs_onboarding(&auth.get())>
                <section class="home-page__onboarding">
                    <p>"Tell us about your studies to personalize your notes and quizzes."</p>
                    <A href="/onboarding">"Start onboarding"</A>
                </section>
            </Show>
            <p class="home-page__email">{move || auth.get().user.map(|u| u.email).unwrap_or_default()}</p>
        </div>
    }
}
