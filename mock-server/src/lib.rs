use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::get,
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::{net::TcpListener, sync::RwLock};
use uuid::Uuid;

pub const SESSION_COOKIE: &str = "connect.sid";

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Book {
    pub id: u64,
    pub title: String,
    pub author: String,
    pub genre: String,
    pub publisher: String,
    pub page_count: u32,
}

/// Entry of the book listing. Details are only served per book.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct BookSummary {
    pub id: u64,
    pub title: String,
}

impl From<&Book> for BookSummary {
    fn from(book: &Book) -> Self {
        Self {
            id: book.id,
            title: book.title.clone(),
        }
    }
}

#[derive(Deserialize)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

#[derive(Deserialize)]
pub struct NewBook {
    pub title: String,
    pub author: String,
    pub genre: String,
    pub publisher: String,
    pub page_count: u32,
}

#[derive(Default)]
pub struct Library {
    /// username -> password
    users: HashMap<String, String>,
    /// session cookie value -> username
    sessions: HashMap<String, String>,
    /// access token -> username
    tokens: HashMap<String, String>,
    /// username -> books by id
    books: HashMap<String, BTreeMap<u64, Book>>,
    next_id: u64,
}

pub type Db = Arc<RwLock<Library>>;

pub fn app() -> Router {
    let db: Db = Arc::new(RwLock::new(Library::default()));
    Router::new()
        .route("/api/v1/tema/auth/register", post(register))
        .route("/api/v1/tema/auth/login", post(login))
        .route("/api/v1/tema/auth/logout", get(logout))
        .route("/api/v1/tema/library/access", get(enter_library))
        .route("/api/v1/tema/library/books", get(list_books).post(add_book))
        .route("/api/v1/tema/library/books/{id}", get(get_book).delete(delete_book))
        .with_state(db)
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn error(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

/// Value of the session cookie in the request's `Cookie` header.
fn session_id(headers: &HeaderMap) -> Option<String> {
    let cookies = headers.get(header::COOKIE)?.to_str().ok()?;
    cookies.split(';').find_map(|pair| {
        let (name, value) = pair.trim().split_once('=')?;
        (name == SESSION_COOKIE).then(|| value.to_string())
    })
}

fn bearer(headers: &HeaderMap) -> Option<String> {
    let value = headers.get(header::AUTHORIZATION)?.to_str().ok()?;
    value.strip_prefix("Bearer ").map(str::to_string)
}

async fn session_user(db: &Db, headers: &HeaderMap) -> Option<String> {
    let id = session_id(headers)?;
    db.read().await.sessions.get(&id).cloned()
}

async fn token_user(db: &Db, headers: &HeaderMap) -> Option<String> {
    let token = bearer(headers)?;
    db.read().await.tokens.get(&token).cloned()
}

async fn register(State(db): State<Db>, Json(input): Json<Credentials>) -> Response {
    let mut library = db.write().await;
    if library.users.contains_key(&input.username) {
        return error(
            StatusCode::BAD_REQUEST,
            &format!("The username {} is taken!", input.username),
        );
    }
    library.users.insert(input.username, input.password);
    (StatusCode::CREATED, Json(json!({ "message": "User registered" }))).into_response()
}

async fn login(State(db): State<Db>, Json(input): Json<Credentials>) -> Response {
    let mut library = db.write().await;
    match library.users.get(&input.username) {
        Some(password) if *password == input.password => {}
        _ => return error(StatusCode::BAD_REQUEST, "Credentials are not good!"),
    }
    let sid = format!("s%3A{}.{}", Uuid::new_v4().simple(), Uuid::new_v4().simple());
    library.sessions.insert(sid.clone(), input.username);
    let cookie = format!("{SESSION_COOKIE}={sid}; Path=/; HttpOnly");
    (StatusCode::OK, [(header::SET_COOKIE, cookie)], "OK. Everything works!").into_response()
}

async fn logout(State(db): State<Db>, headers: HeaderMap) -> Response {
    let Some(id) = session_id(&headers) else {
        return error(StatusCode::BAD_REQUEST, "You are not logged in!");
    };
    let mut library = db.write().await;
    let Some(user) = library.sessions.remove(&id) else {
        return error(StatusCode::BAD_REQUEST, "You are not logged in!");
    };
    library.tokens.retain(|_, owner| *owner != user);
    (StatusCode::OK, "User logged out successfully").into_response()
}

async fn enter_library(State(db): State<Db>, headers: HeaderMap) -> Response {
    let Some(user) = session_user(&db, &headers).await else {
        return error(StatusCode::UNAUTHORIZED, "You are not logged in!");
    };
    let token = Uuid::new_v4().simple().to_string();
    db.write().await.tokens.insert(token.clone(), user);
    Json(json!({ "token": token })).into_response()
}

async fn list_books(State(db): State<Db>, headers: HeaderMap) -> Response {
    let Some(user) = token_user(&db, &headers).await else {
        return error(StatusCode::FORBIDDEN, "Authorization header is missing!");
    };
    let library = db.read().await;
    let books: Vec<BookSummary> = library
        .books
        .get(&user)
        .map(|shelf| shelf.values().map(BookSummary::from).collect())
        .unwrap_or_default();
    Json(books).into_response()
}

async fn add_book(State(db): State<Db>, headers: HeaderMap, Json(input): Json<NewBook>) -> Response {
    let Some(user) = token_user(&db, &headers).await else {
        return error(StatusCode::FORBIDDEN, "Authorization header is missing!");
    };
    let mut library = db.write().await;
    library.next_id += 1;
    let book = Book {
        id: library.next_id,
        title: input.title,
        author: input.author,
        genre: input.genre,
        publisher: input.publisher,
        page_count: input.page_count,
    };
    library.books.entry(user).or_default().insert(book.id, book);
    (StatusCode::OK, Json(json!({ "message": "Book added" }))).into_response()
}

async fn get_book(State(db): State<Db>, headers: HeaderMap, Path(id): Path<u64>) -> Response {
    let Some(user) = token_user(&db, &headers).await else {
        return error(StatusCode::FORBIDDEN, "Authorization header is missing!");
    };
    let library = db.read().await;
    match library.books.get(&user).and_then(|shelf| shelf.get(&id)) {
        Some(book) => Json(book.clone()).into_response(),
        None => error(StatusCode::NOT_FOUND, "No book was found!"),
    }
}

async fn delete_book(State(db): State<Db>, headers: HeaderMap, Path(id): Path<u64>) -> Response {
    let Some(user) = token_user(&db, &headers).await else {
        return error(StatusCode::FORBIDDEN, "Authorization header is missing!");
    };
    let mut library = db.write().await;
    match library.books.get_mut(&user).and_then(|shelf| shelf.remove(&id)) {
        Some(_) => (StatusCode::OK, Json(json!({ "message": "Book deleted" }))).into_response(),
        None => error(StatusCode::NOT_FOUND, "No book was found!"),
    }
}
