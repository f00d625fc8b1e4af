//! Line-oriented command loop.
//!
//! Reads a command per line, prompts for its fields as `name=`, performs the
//! exchange through `library_core` and prints one `SUCCESS - ...` or
//! `ERROR - ...` line. The cookie and token live in an explicit `Session`
//! owned by the shell.

use std::io::{self, BufRead, Write};

use library_core::{ApiError, Book, ClientConfig, Credentials, HttpRequest, HttpResponse, LibraryClient, Session, Transport};
use serde::Serialize;

use crate::validate;

pub struct Shell<R, W> {
    client: LibraryClient,
    transport: Transport,
    session: Session,
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Shell<R, W> {
    pub fn new(config: ClientConfig, input: R, output: W) -> Self {
        Self {
            client: LibraryClient::new(&config.host),
            transport: Transport::new(config),
            session: Session::new(),
            input,
            output,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn into_output(self) -> W {
        self.output
    }

    /// Process commands until `exit` or end of input.
    pub fn run(&mut self) -> io::Result<()> {
        while let Some(line) = self.read_line()? {
            let command = line.trim();
            match command {
                "" => continue,
                "exit" => break,
                "register" => self.register()?,
                "login" => self.login()?,
                "enter_library" => self.enter_library()?,
                "get_books" => self.get_books()?,
                "get_book" => self.get_book()?,
                "add_book" => self.add_book()?,
                "delete_book" => self.delete_book()?,
                "logout" => self.logout()?,
                other => {
                    tracing::debug!(command = other, "unknown command");
                    self.say("ERROR - Invalid command")?;
                }
            }
        }
        Ok(())
    }

    fn register(&mut self) -> io::Result<()> {
        let credentials = self.prompt_credentials()?;
        if !validate::is_username(&credentials.username) {
            return self.say("ERROR - invalid username");
        }
        let result = self
            .client
            .build_register(&credentials)
            .and_then(|req| self.exchange(&req))
            .and_then(|resp| self.client.parse_register(resp));
        match result {
            Ok(()) => self.say("SUCCESS - user registered"),
            Err(ApiError::HttpError { status: 400, .. }) => self.say("ERROR - username taken"),
            Err(e) => self.fail(e),
        }
    }

    fn login(&mut self) -> io::Result<()> {
        if self.session.is_logged_in() {
            return self.say("ERROR - already logged in");
        }
        let credentials = self.prompt_credentials()?;
        if !validate::is_username(&credentials.username) {
            return self.say("ERROR - invalid username");
        }
        let result = self
            .client
            .build_login(&credentials)
            .and_then(|req| self.exchange(&req))
            .and_then(|resp| self.client.parse_login(resp));
        match result {
            Ok(cookie) => {
                self.session.set_cookie(cookie);
                self.say("SUCCESS - user logged in")
            }
            Err(ApiError::HttpError { status: 400, .. }) => self.say("ERROR - wrong credentials"),
            Err(e) => self.fail(e),
        }
    }

    fn enter_library(&mut self) -> io::Result<()> {
        let cookie = match self.session.require_cookie() {
            Ok(cookie) => cookie.to_string(),
            Err(_) => return self.say("ERROR - user not logged in"),
        };
        if self.session.has_library_access() {
            return self.say("ERROR - user already has access");
        }
        let req = self.client.build_enter_library(&cookie);
        let result = self
            .exchange(&req)
            .and_then(|resp| self.client.parse_enter_library(resp));
        match result {
            Ok(token) => {
                self.session.set_token(token);
                self.say("SUCCESS - library access granted")
            }
            Err(ApiError::HttpError { status: 400, .. }) => self.say("ERROR - wrong credentials"),
            Err(e) => self.fail(e),
        }
    }

    fn get_books(&mut self) -> io::Result<()> {
        let Some(token) = self.token() else {
            return self.say("ERROR - user does not have access");
        };
        let req = self.client.build_get_books(&token);
        let result = self.exchange(&req).and_then(|resp| self.client.parse_get_books_json(resp));
        match result {
            Ok(books) => self.print_json(&books),
            Err(e) => self.fail(e),
        }
    }

    fn get_book(&mut self) -> io::Result<()> {
        let Some(token) = self.token() else {
            return self.say("ERROR - user does not have access");
        };
        let Some(id) = self.prompt_id()? else {
            return self.say("ERROR - wrong input");
        };
        let req = self.client.build_get_book(&token, id);
        let result = self.exchange(&req).and_then(|resp| self.client.parse_get_book_json(resp));
        match result {
            Ok(book) => self.print_json(&book),
            Err(ApiError::NotFound) => self.say("ERROR - non-existent id"),
            Err(e) => self.fail(e),
        }
    }

    fn add_book(&mut self) -> io::Result<()> {
        let Some(token) = self.token() else {
            return self.say("ERROR - user does not have access");
        };
        let title = self.prompt("title")?;
        let author = self.prompt("author")?;
        let genre = self.prompt("genre")?;
        let publisher = self.prompt("publisher")?;
        let page_count = self.prompt("page_count")?;

        let valid = validate::is_number(&page_count) && validate::is_name(&author) && validate::is_name(&genre);
        let Some(page_count) = valid.then(|| page_count.parse::<u32>().ok()).flatten() else {
            return self.say("ERROR - wrong input");
        };
        let book = Book {
            id: None,
            title,
            author,
            genre,
            publisher,
            page_count,
        };

        let result = self
            .client
            .build_add_book(&token, &book)
            .and_then(|req| self.exchange(&req))
            .and_then(|resp| self.client.parse_add_book(resp));
        match result {
            Ok(()) => self.say("SUCCESS - book added"),
            Err(e) => self.fail(e),
        }
    }

    fn delete_book(&mut self) -> io::Result<()> {
        let Some(token) = self.token() else {
            return self.say("ERROR - user does not have access");
        };
        let Some(id) = self.prompt_id()? else {
            return self.say("ERROR - wrong input");
        };
        let req = self.client.build_delete_book(&token, id);
        let result = self.exchange(&req).and_then(|resp| self.client.parse_delete_book(resp));
        match result {
            Ok(()) => self.say("SUCCESS - book deleted"),
            Err(ApiError::NotFound) => self.say("ERROR - non-existent id"),
            Err(e) => self.fail(e),
        }
    }

    fn logout(&mut self) -> io::Result<()> {
        let cookie = match self.session.require_cookie() {
            Ok(cookie) => cookie.to_string(),
            Err(_) => return self.say("ERROR - user not logged in"),
        };
        let req = self.client.build_logout(&cookie, self.session.token());
        let result = self.exchange(&req).and_then(|resp| self.client.parse_logout(resp));
        match result {
            Ok(()) => {
                self.session.clear();
                self.say("SUCCESS - logged out")
            }
            Err(e) => self.fail(e),
        }
    }

    fn exchange(&self, request: &HttpRequest) -> Result<HttpResponse, ApiError> {
        Ok(self.transport.round_trip(request)?)
    }

    fn token(&self) -> Option<String> {
        self.session.token().map(str::to_string)
    }

    fn prompt_credentials(&mut self) -> io::Result<Credentials> {
        let username = self.prompt("username")?;
        let password = self.prompt("password")?;
        Ok(Credentials { username, password })
    }

    fn prompt_id(&mut self) -> io::Result<Option<u64>> {
        let id = self.prompt("id")?;
        if !validate::is_number(&id) {
            return Ok(None);
        }
        Ok(id.parse().ok())
    }

    /// Print `field=` and read the answer. End of input reads as empty.
    fn prompt(&mut self, field: &str) -> io::Result<String> {
        write!(self.output, "{field}=")?;
        self.output.flush()?;
        Ok(self.read_line()?.unwrap_or_default())
    }

    fn read_line(&mut self) -> io::Result<Option<String>> {
        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            return Ok(None);
        }
        Ok(Some(line.trim_end_matches(|c| c == '\r' || c == '\n').to_string()))
    }

    fn say(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.output, "{message}")?;
        self.output.flush()
    }

    fn fail(&mut self, err: ApiError) -> io::Result<()> {
        tracing::error!(error = %err, "command failed");
        match err {
            ApiError::Transport(e) => self.say(&format!("ERROR - could not reach the server: {e}")),
            e => self.say(&format!("ERROR - operation failed ({e})")),
        }
    }

    /// Pretty-print with four-space indentation.
    fn print_json<T: Serialize>(&mut self, value: &T) -> io::Result<()> {
        let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
        let mut buf = Vec::new();
        let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
        value.serialize(&mut serializer).map_err(io::Error::other)?;
        self.output.write_all(&buf)?;
        self.say("")
    }
}
