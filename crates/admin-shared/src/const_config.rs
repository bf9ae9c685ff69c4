//! Stores settings that are not expected to need to change but grouped together
//! for discoverability and reuse. Each constant should be prefixed by the module
//! name to allow importing the constant only and still be readable

use crate::time::Seconds;

pub mod client {
    use super::*;

    /// Used when the configuration does not provide a timeout
    pub const CLIENT_DEFAULT_REQUEST_TIMEOUT: Seconds = Seconds::new(30);
    pub const CLIENT_NOTIFICATION_PAGE_LIMIT: u32 = 10;
    /// Unread counts above this are shown as "{max}+" on the header badge
    pub const CLIENT_BADGE_MAX_COUNT: u64 = 9;
}

/// Keys used in the client local credential storage.
///
/// WARNING: These names are read by session migration tooling, do not rename
pub mod storage {
    /// Holds the token and the identity together as a single record
    pub const STORAGE_SESSION_KEY: &str = "admin_session";
    /// Token as written by older clients that stored the pair separately
    pub const STORAGE_LEGACY_TOKEN_KEY: &str = "admin_token";
    /// Identity as written by older clients that stored the pair separately
    pub const STORAGE_LEGACY_USER_KEY: &str = "admin_user";
}

pub mod path {
    mod path_spec;
    pub use path_spec::PathSpec;
    pub const PATH_API_AUTH_LOGIN: PathSpec = PathSpec::post("/api/auth/login");
    pub const PATH_API_AUTH_LOGOUT: PathSpec = PathSpec::post("/api/auth/logout");
    pub const PATH_API_AUTH_ME: PathSpec = PathSpec::get("/api/auth/me");
    pub const PATH_API_NOTIFICATIONS: PathSpec = PathSpec::get("/api/notifications");
    pub const PATH_API_NOTIFICATIONS_READ_ALL: PathSpec =
        PathSpec::patch("/api/notifications/read-all");
    pub const PATH_API_NOTIFICATION_DELETE: PathSpec =
        PathSpec::delete("/api/notifications/{id}");
    pub const PATH_API_NOTIFICATION_READ: PathSpec =
        PathSpec::patch("/api/notifications/{id}/read");
}
