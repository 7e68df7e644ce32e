//! Readable descriptions of libgit2 failures

use git2::{Error, ErrorClass, ErrorCode};

/// Summarize a git2 error for an operator.
///
/// libgit2 messages are matched on lowercase text because the error codes
/// for HTTP failures are mostly `GenericError`.
pub fn interpret_git_error(err: &Error) -> String {
    let message = err.message().to_lowercase();
    let has = |needle: &str| message.contains(needle);

    if err.code() == ErrorCode::NotFound
        || has("not found")
        || has("404")
        || has("too many redirects")
        || has("authentication replays")
    {
        "Repository not found".to_string()
    } else if err.code() == ErrorCode::Auth || has("authentication") || has("credentials") {
        "Authentication failed".to_string()
    } else if has("permission denied") || has("access denied") {
        "Permission denied".to_string()
    } else if has("connection") || has("network") || has("timed out") || has("timeout") {
        format!("Network error: {}", err.message())
    } else {
        match err.class() {
            ErrorClass::Http if has("certificate") => "Certificate error".to_string(),
            ErrorClass::Http if has("ssl") => "SSL error".to_string(),
            ErrorClass::Http => format!("HTTP error: {}", err.message()),
            ErrorClass::Ssh => format!("SSH error: {}", err.message()),
            _ => err.message().to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found() {
        let err = Error::from_str("remote returned 404");
        assert_eq!(interpret_git_error(&err), "Repository not found");
    }

    #[test]
    fn test_auth() {
        let err = Error::new(ErrorCode::Auth, ErrorClass::Http, "bad creds");
        assert_eq!(interpret_git_error(&err), "Authentication failed");
    }

    #[test]
    fn test_ssh_class_keeps_message() {
        let err = Error::new(ErrorCode::GenericError, ErrorClass::Ssh, "kex failed");
        assert_eq!(interpret_git_error(&err), "SSH error: kex failed");
    }

    #[test]
    fn test_fallback_message() {
        let err = Error::from_str("something odd");
        assert_eq!(interpret_git_error(&err), "something odd");
    }
}
