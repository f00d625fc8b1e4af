//! Drive the command loop with scripted input against the live mock server.

use std::io::{Cursor, Read, Write};
use std::net::TcpListener;
use std::thread;
use std::time::Duration;

use library_cli::Shell;
use library_core::ClientConfig;

fn start_server() -> u16 {
    let std_listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = std_listener.local_addr().unwrap();
    std_listener.set_nonblocking(true).unwrap();

    std::thread::spawn(move || {
        let rt = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()
            .unwrap();
        rt.block_on(async {
            let listener = tokio::net::TcpListener::from_std(std_listener).unwrap();
            mock_server::run(listener).await
        })
        .unwrap();
    });

    addr.port()
}

/// Run `script` through a shell and return everything it printed.
fn run_script(port: u16, script: &str) -> String {
    let config = ClientConfig::new("127.0.0.1", port).with_timeout(Duration::from_secs(5));
    let mut shell = Shell::new(config, Cursor::new(script.to_string()), Vec::new());
    shell.run().unwrap();
    String::from_utf8(shell.into_output()).unwrap()
}

/// Answer one connection per entry of `replies`, in order, and return the
/// requests that were received.
fn scripted_server(replies: Vec<&'static str>) -> (u16, thread::JoinHandle<Vec<String>>) {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let port = listener.local_addr().unwrap().port();
    let handle = thread::spawn(move || {
        let mut requests = Vec::new();
        for reply in replies {
            let (mut stream, _) = listener.accept().unwrap();
            let mut request = Vec::new();
            let mut buf = [0u8; 1024];
            let head_end = loop {
                if let Some(pos) = request.windows(4).position(|w| w == b"\r\n\r\n") {
                    break pos + 4;
                }
                let n = stream.read(&mut buf).unwrap();
                assert!(n > 0, "client closed before sending a full request");
                request.extend_from_slice(&buf[..n]);
            };
            let head = String::from_utf8_lossy(&request[..head_end]).into_owned();
            let body_len = head
                .lines()
                .find_map(|line| line.strip_prefix("Content-Length: "))
                .map_or(0, |len| len.trim().parse::<usize>().unwrap());
            while request.len() < head_end + body_len {
                let n = stream.read(&mut buf).unwrap();
                assert!(n > 0, "client closed before sending the body");
                request.extend_from_slice(&buf[..n]);
            }
            stream.write_all(reply.as_bytes()).unwrap();
            requests.push(String::from_utf8_lossy(&request).into_owned());
        }
        requests
    });
    (port, handle)
}

const LOGIN_OK: &str = "HTTP/1.1 200 OK\r\n\
Set-Cookie: connect.sid=s%3Aabc.def; Path=/; HttpOnly\r\n\
Content-Length: 21\r\n\r\nOK. Everything works!";

fn result_lines(output: &str) -> Vec<String> {
    output
        .lines()
        .filter_map(|line| {
            let start = line.find("SUCCESS - ").or_else(|| line.find("ERROR - "))?;
            Some(line[start..].to_string())
        })
        .collect()
}

#[test]
fn full_session() {
    let port = start_server();
    let script = "\
register\nbob\npw\n\
register\nbob\npw\n\
login\nbob\npw\n\
login\n\
enter_library\n\
enter_library\n\
add_book\nDune\nFrank Herbert\nScience Fiction\nChilton\n412\n\
get_books\n\
get_book\n1\n\
get_book\n99\n\
delete_book\n1\n\
delete_book\n1\n\
logout\n\
get_books\n\
exit\n\
get_books\n";

    let output = run_script(port, script);
    assert_eq!(
        result_lines(&output),
        vec![
            "SUCCESS - user registered",
            "ERROR - username taken",
            "SUCCESS - user logged in",
            "ERROR - already logged in",
            "SUCCESS - library access granted",
            "ERROR - user already has access",
            "SUCCESS - book added",
            "ERROR - non-existent id",
            "SUCCESS - book deleted",
            "ERROR - non-existent id",
            "SUCCESS - logged out",
            "ERROR - user does not have access",
        ]
    );
    assert!(output.contains("username=password="));
    assert!(output.contains("[\n    {\n        \"id\": 1,\n        \"title\": \"Dune\"\n    }\n]"));
    assert!(output.contains("    \"title\": \"Dune\""));
    assert!(output.contains("\"page_count\": 412"));
}

#[test]
fn guards_and_validation() {
    let port = start_server();
    let script = "\
enter_library\n\
logout\n\
get_book\n\
register\nbad name\npw\n\
login\nnobody\npw\n\
frobnicate\n";

    let output = run_script(port, script);
    assert_eq!(
        result_lines(&output),
        vec![
            "ERROR - user not logged in",
            "ERROR - user not logged in",
            "ERROR - user does not have access",
            "ERROR - invalid username",
            "ERROR - wrong credentials",
            "ERROR - Invalid command",
        ]
    );
}

#[test]
fn add_book_rejects_bad_fields() {
    let port = start_server();
    let script = "\
register\nann\npw\n\
login\nann\npw\n\
enter_library\n\
add_book\nT\nAuthor 2\nDrama\nP\n100\n\
add_book\nT\nAuthor\nDrama\nP\nlots\n\
get_book\nabc\n\
get_books\n";

    let output = run_script(port, script);
    assert_eq!(
        result_lines(&output),
        vec![
            "SUCCESS - user registered",
            "SUCCESS - user logged in",
            "SUCCESS - library access granted",
            "ERROR - wrong input",
            "ERROR - wrong input",
            "ERROR - wrong input",
        ]
    );
    assert!(output.trim_end().ends_with("[]"));
}

#[test]
fn unreachable_server_is_reported_and_loop_continues() {
    let port = {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let output = run_script(port, "register\nbob\npw\nfrobnicate\n");
    let lines = result_lines(&output);
    assert_eq!(lines.len(), 2);
    assert!(lines[0].starts_with("ERROR - could not reach the server"));
    assert_eq!(lines[1], "ERROR - Invalid command");
}

#[test]
fn listing_prints_only_what_the_server_sent() {
    let port = start_server();
    let script = "\
register\nann\npw\n\
login\nann\npw\n\
enter_library\n\
add_book\nEmma\nJane Austen\nNovel\nJohn Murray\n474\n\
get_books\n";

    let output = run_script(port, script);
    assert!(output.contains("\"title\": \"Emma\""));
    assert!(!output.contains("\"author\""));
    assert!(!output.contains("\"page_count\""));
}

#[test]
fn book_is_printed_with_unknown_fields_intact() {
    let (port, server) = scripted_server(vec![
        LOGIN_OK,
        "HTTP/1.1 200 OK\r\nContent-Length: 15\r\n\r\n{\"token\":\"jwt\"}",
        "HTTP/1.1 200 OK\r\nContent-Length: 37\r\n\r\n{\"id\":7,\"title\":\"Dune\",\"isbn\":\"0441\"}",
    ]);
    let output = run_script(port, "login\nbob\npw\nenter_library\nget_book\n7\n");
    assert_eq!(
        output.split("id=").nth(1).unwrap(),
        "{\n    \"id\": 7,\n    \"isbn\": \"0441\",\n    \"title\": \"Dune\"\n}\n"
    );

    let requests = server.join().unwrap();
    assert!(requests[2].starts_with("GET /api/v1/tema/library/books/7 HTTP/1.1\r\n"));
    assert!(requests[2].contains("\r\nAuthorization: Bearer jwt\r\n"));
}

#[test]
fn rejected_library_access_reports_wrong_credentials() {
    let (port, server) = scripted_server(vec![
        LOGIN_OK,
        "HTTP/1.1 400 Bad Request\r\nContent-Length: 0\r\n\r\n",
    ]);
    let config = ClientConfig::new("127.0.0.1", port).with_timeout(Duration::from_secs(5));
    let script = "login\nbob\npw\nenter_library\n";
    let mut shell = Shell::new(config, Cursor::new(script.to_string()), Vec::new());
    shell.run().unwrap();

    assert!(shell.session().is_logged_in());
    assert!(!shell.session().has_library_access());
    let output = String::from_utf8(shell.into_output()).unwrap();
    assert_eq!(
        result_lines(&output),
        vec!["SUCCESS - user logged in", "ERROR - wrong credentials"]
    );

    let requests = server.join().unwrap();
    assert!(requests[1].contains("\r\nCookie: connect.sid=s%3Aabc.def\r\n"));
}

#[test]
fn logout_clears_the_session() {
    let port = start_server();
    let config = ClientConfig::new("127.0.0.1", port).with_timeout(Duration::from_secs(5));
    let script = "register\ncat\npw\nlogin\ncat\npw\nenter_library\n";
    let mut shell = Shell::new(config.clone(), Cursor::new(script.to_string()), Vec::new());
    shell.run().unwrap();
    assert!(shell.session().is_logged_in());
    assert!(shell.session().has_library_access());

    let script = "register\ndog\npw\nlogin\ndog\npw\nenter_library\nlogout\n";
    let mut shell = Shell::new(config, Cursor::new(script.to_string()), Vec::new());
    shell.run().unwrap();
    assert!(!shell.session().is_logged_in());
    assert!(!shell.session().has_library_access());
    assert!(shell.session().token().is_none());
}
