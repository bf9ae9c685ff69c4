/// Reasons a login attempt did not produce a session.
///
/// The [`Display`](std::fmt::Display) output is the message shown to the user
#[derive(thiserror::Error, Debug, PartialEq, Eq, Clone)]
pub enum LoginError {
    /// The backend answered but reported the login as unsuccessful. Any reason
    /// it gave is intentionally not passed on
    #[error("Invalid credentials")]
    InvalidCredentials,
    /// The backend refused the request and explained why
    #[error("{0}")]
    Rejected(String),
    /// The request did not complete, message is from the transport
    #[error("{0}")]
    Transport(String),
    #[error("Login failed")]
    Failed,
    /// A logout or another login was issued before this one completed
    #[error("Login was superseded by a newer session change")]
    Superseded,
}

impl LoginError {
    /// Uses the transport message if there is one otherwise falls back to the
    /// generic failure
    pub fn from_transport_msg<S: Into<String>>(msg: S) -> Self {
        let msg = msg.into();
        if msg.trim().is_empty() {
            Self::Failed
        } else {
            Self::Transport(msg)
        }
    }
}
