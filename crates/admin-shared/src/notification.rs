use std::fmt::Display;

use chrono::{DateTime, Utc};
use serde_aux::field_attributes::{
    deserialize_number_from_string, deserialize_string_from_number,
};

use crate::const_config::client::CLIENT_BADGE_MAX_COUNT;

/// The backend may send ids as numbers or strings, both are kept as a string
#[derive(Debug, serde::Serialize, Clone, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct NotificationId(String);

impl NotificationId {
    pub fn new<S: Into<String>>(value: S) -> Self {
        Self(value.into())
    }
}

impl<'de> serde::Deserialize<'de> for NotificationId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        deserialize_string_from_number(deserializer).map(Self)
    }
}

impl AsRef<str> for NotificationId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl Display for NotificationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    #[serde(alias = "_id")]
    pub id: NotificationId,
    pub title: String,
    #[serde(default)]
    pub message: String,
    #[serde(rename = "type", default = "default_kind")]
    pub kind: String,
    #[serde(alias = "read", default)]
    pub is_read: bool,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

fn default_kind() -> String {
    "info".to_string()
}

/// One page of notifications along with the total unread count (which covers
/// all pages not only this one)
#[derive(Debug, serde::Serialize, serde::Deserialize, Clone, PartialEq, Eq, Default)]
#[serde(rename_all = "camelCase")]
pub struct NotificationPage {
    pub notifications: Vec<Notification>,
    #[serde(default, deserialize_with = "deserialize_number_from_string")]
    pub unread_count: u64,
}

impl NotificationPage {
    /// Text for the header badge, `None` when there is nothing unread
    pub fn badge(&self) -> Option<String> {
        match self.unread_count {
            0 => None,
            n if n > CLIENT_BADGE_MAX_COUNT => Some(format!("{CLIENT_BADGE_MAX_COUNT}+")),
            n => Some(n.to_string()),
        }
    }
}
