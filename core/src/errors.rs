use std::fmt;

use thiserror::Error;

/// Chat client errors
#[derive(Error, Debug)]
pub enum ChatError {
    #[error("Configuration Error: {0}")]
    ConfigError(String),

    #[error("Transport Error: {0}")]
    TransportError(String),

    #[error("HTTP Error: {status_code} - {message}")]
    HttpError { status_code: u16, message: String },

    #[error("Decode Error: {0}")]
    DecodeError(String),

    #[error("Shape Error: {0}")]
    ShapeError(ShapeIssue),

    #[error("Unexpected Error: {0}")]
    UnexpectedError(String),

    #[error(transparent)]
    IoError(#[from] std::io::Error),
}

impl ChatError {
    /// The user-facing category this error is reported under.
    pub fn kind(&self) -> ErrorKind {
        match self {
            ChatError::TransportError(_) | ChatError::HttpError { .. } => ErrorKind::Transport,
            ChatError::DecodeError(_) => ErrorKind::Decode,
            ChatError::ShapeError(_) => ErrorKind::Shape,
            ChatError::ConfigError(_) | ChatError::UnexpectedError(_) | ChatError::IoError(_) => {
                ErrorKind::Unexpected
            }
        }
    }
}

/// Classifies a reqwest failure. Requests that could not even be built are
/// not a connectivity problem, so they are reported as unexpected.
///
/// The request URL carries the API key as a query parameter, so it is
/// stripped before the error text goes anywhere.
pub fn classify_reqwest_error(err: reqwest::Error) -> ChatError {
    let err = err.without_url();
    if err.is_builder() {
        ChatError::UnexpectedError(err.to_string())
    } else {
        ChatError::TransportError(err.to_string())
    }
}

/// What was missing from an otherwise well-formed response body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShapeIssue {
    /// No candidates at all, or the body was not an object. Carries the raw JSON.
    UnexpectedStructure(String),
    /// `candidates[0].content` or its `parts` was absent or empty.
    MissingContent,
    /// `parts[0].text` was absent.
    MissingText,
}

impl fmt::Display for ShapeIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ShapeIssue::UnexpectedStructure(raw) => {
                write!(f, "Unexpected Gemini API response structure: {}", raw)
            }
            ShapeIssue::MissingContent => write!(f, "Gemini API response content or parts missing."),
            ShapeIssue::MissingText => write!(f, "Gemini API response part missing 'text'."),
        }
    }
}

/// The four error categories surfaced to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Transport,
    Decode,
    Shape,
    Unexpected,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorKind::Transport => "transport",
            ErrorKind::Decode => "decode",
            ErrorKind::Shape => "shape",
            ErrorKind::Unexpected => "unexpected",
        };
        f.write_str(name)
    }
}

/// Result type for chat operations
pub type ChatResult<T> = Result<T, ChatError>;
