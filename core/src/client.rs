//! Stateless request builder and response interpreter for the library API.
//!
//! # Design
//! `LibraryClient` holds only the `Host` header value and carries no mutable
//! state between calls. Each endpoint is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. Cookies and tokens come in as arguments, usually from a
//! [`crate::Session`]; the round-trip in between is `Transport`'s job.

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use crate::error::ApiError;
use crate::http::{HttpRequest, HttpResponse, RequestBuilder, CONTENT_TYPE_JSON};
use crate::types::{AccessGrant, Book, Credentials};

const REGISTER_PATH: &str = "/api/v1/tema/auth/register";
const LOGIN_PATH: &str = "/api/v1/tema/auth/login";
const LOGOUT_PATH: &str = "/api/v1/tema/auth/logout";
const ACCESS_PATH: &str = "/api/v1/tema/library/access";
const BOOKS_PATH: &str = "/api/v1/tema/library/books";

/// Synchronous, stateless client for the library API.
#[derive(Debug, Clone)]
pub struct LibraryClient {
    host: String,
}

impl LibraryClient {
    pub fn new(host: &str) -> Self {
        Self {
            host: host.to_string(),
        }
    }

    pub fn build_register(&self, credentials: &Credentials) -> Result<HttpRequest, ApiError> {
        self.json_post(REGISTER_PATH, credentials, None)
    }

    pub fn build_login(&self, credentials: &Credentials) -> Result<HttpRequest, ApiError> {
        self.json_post(LOGIN_PATH, credentials, None)
    }

    pub fn build_enter_library(&self, cookie: &str) -> HttpRequest {
        RequestBuilder::get(&self.host, ACCESS_PATH).cookie(cookie).build()
    }

    pub fn build_get_books(&self, token: &str) -> HttpRequest {
        RequestBuilder::get(&self.host, BOOKS_PATH).bearer(token).build()
    }

    pub fn build_get_book(&self, token: &str, id: u64) -> HttpRequest {
        RequestBuilder::get(&self.host, &book_path(id)).bearer(token).build()
    }

    pub fn build_add_book(&self, token: &str, book: &Book) -> Result<HttpRequest, ApiError> {
        self.json_post(BOOKS_PATH, book, Some(token))
    }

    pub fn build_delete_book(&self, token: &str, id: u64) -> HttpRequest {
        RequestBuilder::delete(&self.host, &book_path(id)).bearer(token).build()
    }

    /// The token, when the session holds one, is sent along with the cookie.
    pub fn build_logout(&self, cookie: &str, token: Option<&str>) -> HttpRequest {
        let mut builder = RequestBuilder::get(&self.host, LOGOUT_PATH).cookie(cookie);
        if let Some(token) = token {
            builder = builder.bearer(token);
        }
        builder.build()
    }

    pub fn parse_register(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, 201)
    }

    /// Returns the session cookie (`name=value`) set by a successful login.
    pub fn parse_login(&self, response: HttpResponse) -> Result<String, ApiError> {
        check_status(&response, 200)?;
        response
            .session_cookie()
            .map(str::to_string)
            .ok_or(ApiError::MissingCookie)
    }

    /// Returns the library access token.
    pub fn parse_enter_library(&self, response: HttpResponse) -> Result<String, ApiError> {
        check_status(&response, 200)?;
        let grant: AccessGrant = decode(&response)?;
        Ok(grant.token)
    }

    pub fn parse_get_books(&self, response: HttpResponse) -> Result<Vec<Book>, ApiError> {
        check_status(&response, 200)?;
        decode(&response)
    }

    pub fn parse_get_book(&self, response: HttpResponse) -> Result<Book, ApiError> {
        check_status(&response, 200)?;
        decode(&response)
    }

    /// The listing exactly as the server sent it, without filling in fields
    /// the server left out.
    pub fn parse_get_books_json(&self, response: HttpResponse) -> Result<Value, ApiError> {
        check_status(&response, 200)?;
        decode(&response)
    }

    pub fn parse_get_book_json(&self, response: HttpResponse) -> Result<Value, ApiError> {
        check_status(&response, 200)?;
        decode(&response)
    }

    pub fn parse_add_book(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, 200)
    }

    pub fn parse_delete_book(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, 200)
    }

    pub fn parse_logout(&self, response: HttpResponse) -> Result<(), ApiError> {
        check_status(&response, 200)
    }

    fn json_post<T: Serialize>(&self, path: &str, payload: &T, token: Option<&str>) -> Result<HttpRequest, ApiError> {
        let body = serde_json::to_vec(payload).map_err(|e| ApiError::SerializationError(e.to_string()))?;
        let mut builder = RequestBuilder::post(&self.host, path).body(CONTENT_TYPE_JSON, body);
        if let Some(token) = token {
            builder = builder.bearer(token);
        }
        Ok(builder.build())
    }
}

fn book_path(id: u64) -> String {
    format!("{BOOKS_PATH}/{id}")
}

fn decode<T: DeserializeOwned>(response: &HttpResponse) -> Result<T, ApiError> {
    serde_json::from_str(&response.body).map_err(|e| ApiError::DeserializationError(e.to_string()))
}

/// Map non-success status codes to the appropriate `ApiError` variant.
fn check_status(response: &HttpResponse, expected: u16) -> Result<(), ApiError> {
    if response.status == expected {
        return Ok(());
    }
    if response.status == 404 {
        return Err(ApiError::NotFound);
    }
    Err(ApiError::HttpError {
        status: response.status,
        body: response.body.clone(),
    })
}
