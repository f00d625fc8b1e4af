use crate::error::ApiError;

/// Credentials collected over a sequence of commands.
///
/// The transport never stores these; the caller keeps a `Session`, feeds the
/// values into `LibraryClient::build_*` and updates it from `parse_*` results.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Session {
    auth_cookie: Option<String>,
    access_token: Option<String>,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_logged_in(&self) -> bool {
        self.auth_cookie.is_some()
    }

    pub fn has_library_access(&self) -> bool {
        self.access_token.is_some()
    }

    pub fn cookie(&self) -> Option<&str> {
        self.auth_cookie.as_deref()
    }

    pub fn token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    pub fn set_cookie(&mut self, cookie: String) {
        self.auth_cookie = Some(cookie);
    }

    pub fn set_token(&mut self, token: String) {
        self.access_token = Some(token);
    }

    pub fn require_cookie(&self) -> Result<&str, ApiError> {
        self.cookie().ok_or(ApiError::NotLoggedIn)
    }

    pub fn require_token(&self) -> Result<&str, ApiError> {
        self.token().ok_or(ApiError::NoLibraryAccess)
    }

    /// Forget both credentials, as after a logout.
    pub fn clear(&mut self) {
        self.auth_cookie = None;
        self.access_token = None;
    }
}
