//! Error types for Pokémon lookups.
//!
//! [`FetchError`] is what the HTTP client reports. The controller never lets
//! it escape: it is reduced to an [`ErrorKind`] and a display message and
//! stored as a `Failure` state.

use reqwest::StatusCode;
use thiserror::Error;

/// Failure of a single lookup against the remote API.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The API answered 404 for this name.
    #[error("no pokemon named {name:?}")]
    NotFound { name: String },

    /// Connection, DNS or timeout failure while talking to the API.
    #[error("request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// Any non-2xx status other than 404.
    #[error("server responded with status {0}")]
    UnexpectedStatus(StatusCode),

    /// The configured base URL cannot take a `/pokemon/{name}` path.
    #[error("invalid API url: {0}")]
    InvalidUrl(String),

    /// The body was not JSON or did not have the expected shape.
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl FetchError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            FetchError::NotFound { .. } => ErrorKind::NotFound,
            FetchError::Transport(_)
            | FetchError::UnexpectedStatus(_)
            | FetchError::InvalidUrl(_) => ErrorKind::Transport,
            FetchError::Decode(_) => ErrorKind::Decode,
        }
    }
}

/// The four user-facing failure categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    EmptyInput,
    NotFound,
    Transport,
    Decode,
}

impl ErrorKind {
    /// Display message shown in the red error view.
    pub fn message(self) -> &'static str {
        match self {
            ErrorKind::EmptyInput => "Enter Pokemon Name",
            ErrorKind::NotFound => "Pokemon not found",
            ErrorKind::Transport => "Network error",
            ErrorKind::Decode => "Unexpected response",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unexpected_status_counts_as_transport() {
        let err = FetchError::UnexpectedStatus(StatusCode::BAD_GATEWAY);
        assert_eq!(err.kind(), ErrorKind::Transport);
        assert_eq!(err.kind().message(), "Network error");
    }

    #[test]
    fn messages_are_distinct_per_kind() {
        let kinds = [
            ErrorKind::EmptyInput,
            ErrorKind::NotFound,
            ErrorKind::Transport,
            ErrorKind::Decode,
        ];
        let mut messages: Vec<&str> = kinds.iter().map(|k| k.message()).collect();
        messages.sort_unstable();
        messages.dedup();
        assert_eq!(messages.len(), kinds.len());
    }

    #[test]
    fn not_found_display_names_the_pokemon() {
        let err = FetchError::NotFound {
            name: "zzz".to_string(),
        };
        assert_eq!(err.to_string(), "no pokemon named \"zzz\"");
        assert_eq!(err.kind().message(), "Pokemon not found");
    }
}
