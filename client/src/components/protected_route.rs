//! Route gate for pages that require a signed-in user.
//!
//! While the startup bootstrap runs only a neutral loading indicator is
//! shown, so neither protected content nor the login page flashes before
//! the stored session is verified.

use leptos::prelude::*;
use leptos_router::hooks::{use_location, use_navigate};
use vibecoders::guard::{self, GuardDecision, RedirectTarget};

use crate::app::use_auth;
use crate::util::auth::install_unauth_redirect;

#[component]
pub fn ProtectedRoute(children: ChildrenFn) -> impl IntoView {
    let auth = use_auth();
    let location = use_location();
    let (pathname, search, hash) = (location.pathname, location.search, location.hash);
    let target = move || RedirectTarget::from_parts(&pathname.get(), &search.get(), &hash.get());

    install_unauth_redirect(auth, target, use_navigate());

    move || match guard::decide(&auth.get(), &target()) {
        GuardDecision::Loading => view! {
            <div class="route-loading" role="status" aria-live="polite">
                <span class="route-loading__spinner"></span>
            </div>
        }
        .into_any(),
        // Navigation is already under way; render nothing meanwhile.
        GuardDecision::Redirect(_) => ().into_any(),
        GuardDecision::Render => children().into_any(),
    }
}
