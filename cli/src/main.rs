use std::time::Duration;

use clap::Parser;

use library_cli::Shell;
use library_core::config::{DEFAULT_HOST, DEFAULT_PORT};
use library_core::ClientConfig;

/// Command-line client for the library-management API. Reads commands
/// (register, login, enter_library, get_books, get_book, add_book,
/// delete_book, logout, exit) from standard input, one per line.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// API server host, also sent as the Host header
    #[arg(long, env = "LIBRARY_HOST", default_value_t = String::from(DEFAULT_HOST))]
    pub host: String,

    /// API server port
    #[arg(short, long, env = "LIBRARY_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Connect, read and write timeout in milliseconds. Unset waits forever
    #[arg(short, long, env = "LIBRARY_TIMEOUT_MS")]
    pub timeout_ms: Option<u64>,

    /// Log level
    #[arg(short, long, default_value_t = tracing::Level::WARN, env = "LOG_LEVEL")]
    pub log_level: tracing::Level,
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    tracing_subscriber::fmt()
        .with_max_level(args.log_level)
        .with_writer(std::io::stderr)
        .init();

    let mut config = ClientConfig::new(&args.host, args.port);
    if let Some(ms) = args.timeout_ms {
        config = config.with_timeout(Duration::from_millis(ms));
    }
    tracing::info!(host = %config.host, port = config.port, timeout = ?config.timeout, "starting");

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    Shell::new(config, stdin.lock(), stdout.lock()).run()?;
    Ok(())
}
