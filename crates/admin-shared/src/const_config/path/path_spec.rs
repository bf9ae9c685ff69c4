use reqwest_cross::reqwest::{self, Method};

/// Describes an endpoint on the backend.
///
/// Paths may contain a single `{id}` placeholder, using the same syntax as the
/// route patterns on the server side
#[derive(Debug, Clone)]
pub struct PathSpec {
    pub path: &'static str,
    pub method: reqwest::Method,
}

impl PathSpec {
    const ID_PLACEHOLDER: &'static str = "{id}";

    pub const fn get(path: &'static str) -> Self {
        Self {
            path,
            method: Method::GET,
        }
    }

    pub const fn post(path: &'static str) -> Self {
        Self {
            path,
            method: Method::POST,
        }
    }

    pub const fn patch(path: &'static str) -> Self {
        Self {
            path,
            method: Method::PATCH,
        }
    }

    pub const fn delete(path: &'static str) -> Self {
        Self {
            path,
            method: Method::DELETE,
        }
    }

    pub fn has_id_placeholder(&self) -> bool {
        self.path.contains(Self::ID_PLACEHOLDER)
    }

    /// Substitutes the `{id}` placeholder (if present) with `id`
    pub fn with_id(&self, id: &str) -> String {
        self.path.replace(Self::ID_PLACEHOLDER, id)
    }
}
