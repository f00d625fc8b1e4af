//! Domain DTOs for the library API.
//!
//! # Design
//! These types mirror the mock-server's schema but are defined independently;
//! the end-to-end tests catch schema drift between the two crates.

use serde::{Deserialize, Serialize};

/// Username and password, sent as the body of register and login.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: &str, password: &str) -> Self {
        Self {
            username: username.to_string(),
            password: password.to_string(),
        }
    }
}

/// A book in the user's library.
///
/// `id` is assigned by the server and left out of the add-book payload. The
/// listing endpoint of some deployments returns only `id` and `title`, so the
/// remaining fields fall back to their defaults when absent.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
pub struct Book {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    pub title: String,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub genre: String,
    #[serde(default)]
    pub publisher: String,
    #[serde(default)]
    pub page_count: u32,
}

/// Body of a successful enter-library response.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct AccessGrant {
    pub token: String,
}
