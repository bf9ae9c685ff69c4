//! Shapes of the bodies returned by the backend

use anyhow::{anyhow, bail};

use crate::uac::Identity;

/// Every backend response is wrapped in this envelope
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(default = "Option::default")]
    pub data: Option<T>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            message: None,
            error: None,
        }
    }

    pub fn failed<S: Into<String>>(message: S) -> Self {
        Self {
            success: false,
            data: None,
            message: Some(message.into()),
            error: None,
        }
    }

    /// The reason given by the backend if any
    pub fn reason(&self) -> Option<&str> {
        self.message
            .as_deref()
            .or(self.error.as_deref())
            .filter(|x| !x.trim().is_empty())
    }

    /// Returns the payload if the backend reported success and sent one
    pub fn into_data(self) -> anyhow::Result<T> {
        if !self.success {
            bail!(
                "backend reported failure: {}",
                self.reason().unwrap_or("no reason given")
            );
        }
        self.data
            .ok_or_else(|| anyhow!("backend reported success but sent no data"))
    }
}

/// Payload of a successful login
#[derive(Debug, serde::Serialize, serde::Deserialize)]
pub struct LoginData {
    pub token: String,
    pub admin: Identity,
}

/// Body of an error response that may or may not follow the envelope
#[derive(Debug, Default, serde::Deserialize)]
pub struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

impl ErrorBody {
    pub fn reason(&self) -> Option<&str> {
        self.message
            .as_deref()
            .or(self.error.as_deref())
            .filter(|x| !x.trim().is_empty())
    }
}
