//! Page modules for route-level screens.
//!
//! ARCHITECTURE
//! ============
//! Each page owns route-scoped orchestration; session operations go through
//! the shared [`crate::app::Session`] handle.

pub mod home;
pub mod login;
pub mod not_found;
pub mod onboarding;
pub mod register;
