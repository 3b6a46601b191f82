//! Wire DTOs for the auth endpoints.
//!
//! DESIGN
//! ======
//! The backend has shipped more than one spelling for the same fields
//! (`userDto` vs `user`, `userName` vs `name`, numeric vs string ids), so
//! deserialization is lenient and normalizes everything into [`User`].
//! Replies are usually wrapped in a [`Envelope`]; the client unwraps it
//! before any of the payload types here are decoded.

#[cfg(test)]
#[path = "types_test.rs"]
mod types_test;

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize};

/// `{status, message, data}` wrapper around backend replies.
///
/// `status` mirrors an HTTP code but travels in the body, so a rejected
/// signup can arrive as HTTP 200 with `status: 400`.
#[derive(Debug, Deserialize)]
pub(crate) struct Envelope {
    pub status: u16,
    pub message: String,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

impl Envelope {
    /// `Some` only if `body` has the envelope's shape.
    pub fn parse(body: &str) -> Option<Self> {
        serde_json::from_str(body).ok()
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn into_data(self) -> serde_json::Value {
        self.data.unwrap_or(serde_json::Value::Null)
    }
}

/// Identity record for the signed-in user.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Backend user identifier; numeric ids are normalized to strings.
    #[serde(alias = "userId", deserialize_with = "deserialize_id")]
    pub id: String,
    /// Display name.
    #[serde(alias = "userName", alias = "fullName")]
    pub name: String,
    pub email: String,
    /// Whether the learning-assistant onboarding questionnaire is complete.
    #[serde(default)]
    pub onboarding: bool,
}

#[derive(Debug, Serialize)]
pub(crate) struct LoginRequest<'a> {
    pub email: &'a str,
    pub password: &'a str,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct SignupRequest<'a> {
    pub full_name: &'a str,
    pub email: &'a str,
    pub password: &'a str,
}

/// `POST /auth/login` response body.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    pub access_token: Option<String>,
    pub refresh_token: Option<String>,
    #[serde(alias = "userDto")]
    pub user: Option<User>,
}

/// `GET /auth/profile` response body: either the user itself or wrapped.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ProfileResponse {
    Wrapped {
        #[serde(alias = "userDto", alias = "data")]
        user: User,
    },
    Bare(User),
}

impl ProfileResponse {
    pub fn into_user(self) -> User {
        match self {
            Self::Wrapped { user } | Self::Bare(user) => user,
        }
    }
}

/// `POST /auth/refresh` response body.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum RefreshResponse {
    /// Bare access token string (the envelope's `data`).
    Token(String),
    #[serde(rename_all = "camelCase")]
    Object {
        access_token: String,
        #[serde(default)]
        refresh_token: Option<String>,
    },
}

impl RefreshResponse {
    /// Split into the new access token and an optional rotated refresh token.
    pub fn into_tokens(self) -> (String, Option<String>) {
        match self {
            Self::Token(access) => (access, None),
            Self::Object { access_token, refresh_token } => (access_token, refresh_token),
        }
    }
}

fn deserialize_id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    match value {
        serde_json::Value::String(s) => Ok(s),
        serde_json::Value::Number(n) => Ok(n.to_string()),
        other => Err(D::Error::custom(format!("expected string or number id, got {other}"))),
    }
}
