//! Interactive front end for the library API.
//!
//! `shell` runs the command loop over any `BufRead`/`Write` pair so it can be
//! driven from a terminal or from a script; `validate` holds the input checks
//! applied before a request is built.

pub mod shell;
pub mod validate;

pub use shell::Shell;
