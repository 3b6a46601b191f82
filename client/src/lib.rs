//! Browser front end for the vibecoders learning assistant.
//!
//! ARCHITECTURE
//! ============
//! Client-side rendered Leptos app. Session lifecycle, token handling and
//! route-guard decisions live in the `vibecoders` core; this crate mirrors
//! the core's session state into a signal and renders pages around it.

pub mod app;
pub mod components;
pub mod pages;
pub mod state;
pub mod util;

/// WASM entry point: install logging and mount the app.
#[cfg(feature = "csr")]
#[wasm_bindgen::prelude::wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    let _ = console_log::init_with_level(log::Level::Debug);
    leptos::mount::mount_to_body(app::App);
}
