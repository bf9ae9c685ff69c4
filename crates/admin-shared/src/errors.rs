use thiserror::Error;

#[derive(Debug, Error)]
#[error("The user has not logged in")]
pub struct NotLoggedInError;

#[derive(Debug, Error, PartialEq, Eq, Clone)]
#[error("Unknown role: {0:?}")]
pub struct RoleParseError(pub String);
