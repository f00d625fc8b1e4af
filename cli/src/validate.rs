//! Input checks applied before anything is sent to the server.

/// Non-empty and made of ASCII digits only (book ids, page counts).
pub fn is_number(input: &str) -> bool {
    !input.is_empty() && input.bytes().all(|b| b.is_ascii_digit())
}

/// Non-empty and ASCII alphanumeric.
pub fn is_username(input: &str) -> bool {
    !input.is_empty() && input.chars().all(|c| c.is_ascii_alphanumeric())
}

/// Non-empty and free of digits (authors, genres).
pub fn is_name(input: &str) -> bool {
    !input.is_empty() && !input.chars().any(|c| c.is_ascii_digit())
}
