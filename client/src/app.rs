//! Root component: session wiring, context providers, and routes.
//!
//! SYSTEM CONTEXT
//! ==============
//! One [`SessionManager`] exists per page lifetime. Its state is mirrored
//! into `RwSignal<AuthState>` so views react to login, logout, bootstrap
//! completion and eviction alike; the manager itself is shared through a
//! [`Session`] handle for views that call login/logout or the API.

use leptos::prelude::*;
use leptos_meta::{Title, provide_meta_context};
use leptos_router::StaticSegment;
use leptos_router::components::{Route, Router, Routes};
use vibecoders::storage::BrowserStorage;
use vibecoders::transport::GlooTransport;
use vibecoders::{ApiClient, ClientConfig, SessionManager, TokenStore};

use crate::components::protected_route::ProtectedRoute;
use crate::pages::home::HomePage;
use crate::pages::login::LoginPage;
use crate::pages::not_found::NotFoundPage;
use crate::pages::onboarding::OnboardingPage;
use crate::pages::register::RegisterPage;
use crate::state::auth::AuthState;

/// Backend base URL baked in at build time.
const BACKEND_URL: Option<&str> = option_env!("VIBE_BACKEND_URL");

pub type AppSession = SessionManager<GlooTransport>;

/// Copyable context handle to the page's session manager.
#[derive(Clone, Copy)]
pub struct Session(StoredValue<AppSession, LocalStorage>);

impl Session {
    pub fn get(self) -> AppSession {
        self.0.get_value()
    }
}

fn build_session() -> AppSession {
    let config = BACKEND_URL
        .map_or_else(|| Ok(ClientConfig::default()), ClientConfig::new)
        .unwrap_or_else(|e| {
            log::warn!("ignoring VIBE_BACKEND_URL: {e}");
            ClientConfig::default()
        });
    let tokens = TokenStore::new(BrowserStorage::new());
    SessionManager::new(ApiClient::new(config, tokens, GlooTransport::new()))
}

/// Root application component.
#[component]
pub fn App() -> impl IntoView {
    provide_meta_context();

    let session = build_session();
    let auth = RwSignal::new(session.state());
    session.subscribe(move |state| auth.set(state.clone()));

    provide_context(auth);
    provide_context(Session(StoredValue::new_local(session.clone())));

    leptos::task::spawn_local(async move {
        session.bootstrap().await;
    });

    view! {
        <Title text="Vibecoders" />
        <Router>
            <main class="app">
                <Routes fallback=|| view! { <NotFoundPage /> }>
                    <Route path=StaticSegment("login") view=LoginPage />
                    <Route path=StaticSegment("register") view=RegisterPage />
                    <Route
                        path=StaticSegment("")
                        view=|| view! { <ProtectedRoute><HomePage /></ProtectedRoute> }
                    />
                    <Route
                        path=StaticSegment("onboarding")
                        view=|| view! { <ProtectedRoute><OnboardingPage /></ProtectedRoute> }
                    />
                </Routes>
            </main>
        </Router>
    }
}

/// Session handle from context.
pub fn use_session() -> AppSession {
    expect_context::<Session>().get()
}

/// Shared auth state signal from context.
pub fn use_auth() -> RwSignal<AuthState> {
    expect_context::<RwSignal<AuthState>>()
}
