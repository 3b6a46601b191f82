//! Error taxonomy for the session core.
//!
//! DESIGN
//! ======
//! Variants carry owned strings rather than source errors so the enum is
//! `Clone`: a single refresh outcome is shared by every request that was
//! waiting on it.

#[cfg(test)]
#[path = "error_test.rs"]
mod error_test;

/// Errors surfaced by the HTTP client and session manager.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ClientError {
    /// A configuration value could not be parsed.
    #[error("config parse failed: {0}")]
    Config(String),

    /// The request never produced an HTTP response (DNS, connect, timeout).
    #[error("request failed: {0}")]
    Transport(String),

    /// The backend answered with a non-success status.
    #[error("request failed with status {status}")]
    Status { status: u16, body: String },

    /// The response body could not be decoded.
    #[error("response decode failed: {0}")]
    Decode(String),

    /// The response decoded but lacked a field the session depends on.
    #[error("missing expected field `{0}`")]
    MissingField(&'static str),

    /// The session was ended (logout or re-login) while the request was in flight.
    #[error("session ended while request was in flight")]
    SessionEnded,
}

impl ClientError {
    /// HTTP status carried by this error, if the backend produced one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// True when the backend rejected the request's credentials.
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// Short human-readable text for inline form errors.
    pub fn user_message(&self) -> String {
        match self {
            Self::Status { status: 400 | 401 | 403, body } => {
                server_message(body).unwrap_or_else(|| "Invalid email or password.".to_owned())
            }
            Self::Status { status, body } => {
                server_message(body).unwrap_or_else(|| format!("Server error ({status}). Please try again."))
            }
            Self::Transport(_) => "Could not reach the server. Check your connection.".to_owned(),
            Self::SessionEnded => "Your session ended. Please sign in again.".to_owned(),
            Self::Config(msg) => format!("Client misconfigured: {msg}"),
            Self::Decode(_) | Self::MissingField(_) => {
                "Unexpected response from the server.".to_owned()
            }
        }
    }
}

/// Pull a `message` field out of a JSON error body, if the backend sent one.
fn server_message(body: &str) -> Option<String> {
    let value: serde_json::Value = serde_json::from_str(body).ok()?;
    let message = value.get("message")?.as_str()?.trim();
    if message.is_empty() { None } else { Some(message.to_owned()) }
}
