//! # vibecoders
//!
//! Session core shared by the fitness-coaching and learning-assistant front
//! ends: token persistence, an authenticated HTTP client with coalesced
//! refresh-and-retry, the auth session state machine, and protected-route
//! decisions.
//!
//! The core is host-agnostic. The `native` feature (default) adds a
//! `reqwest` transport and file-backed token storage for the CLI; the `web`
//! feature adds a `gloo-net` transport and `localStorage` backend for the
//! Leptos client in `client/`.

pub mod client;
pub mod config;
pub mod error;
pub mod guard;
pub mod onboarding;
pub mod session;
pub mod storage;
pub mod token_store;
pub mod transport;
pub mod types;

#[cfg(test)]
mod test_support;

pub use client::{ApiClient, RequestOptions};
pub use config::ClientConfig;
pub use error::ClientError;
pub use guard::{GuardDecision, RedirectTarget};
pub use session::{AuthState, Phase, SessionManager};
pub use token_store::{TokenKind, TokenStore};
pub use transport::{HttpRequest, HttpResponse, Method, Transport};
pub use types::User;
