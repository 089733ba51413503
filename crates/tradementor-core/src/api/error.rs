use thiserror::Error;

/// Message used when a failed response carries no usable `message` field.
pub const FALLBACK_MESSAGE: &str = "Server error";

/// Maximum length for error response bodies in log output
const MAX_ERROR_BODY_LENGTH: usize = 500;

/// Broad classification of a failed gateway call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// DNS failure, refused connection, timeout. No status code.
    Transport,
    /// Non-2xx response.
    Server,
    /// A 2xx response whose body was not the JSON we expected.
    MalformedResponse,
    /// The request could not be built; nothing was sent.
    InvalidRequest,
}

/// The single error shape every gateway call fails with.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ApiError {
    #[error("{message}")]
    Transport { message: String },

    #[error("{message}")]
    Server { status: u16, message: String },

    #[error("{message}")]
    MalformedResponse { status: u16, message: String },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },
}

impl ApiError {
    pub fn message(&self) -> &str {
        match self {
            ApiError::Transport { message }
            | ApiError::Server { message, .. }
            | ApiError::MalformedResponse { message, .. }
            | ApiError::InvalidRequest { message } => message,
        }
    }

    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Transport { .. } | ApiError::InvalidRequest { .. } => None,
            ApiError::Server { status, .. } | ApiError::MalformedResponse { status, .. } => {
                Some(*status)
            }
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            ApiError::Transport { .. } => ErrorKind::Transport,
            ApiError::Server { .. } => ErrorKind::Server,
            ApiError::MalformedResponse { .. } => ErrorKind::MalformedResponse,
            ApiError::InvalidRequest { .. } => ErrorKind::InvalidRequest,
        }
    }

    /// True for a 401, which is how the backend rejects a stale token.
    pub fn is_unauthorized(&self) -> bool {
        self.status() == Some(401)
    }

    /// Transport failure; the message includes the full cause chain
    /// (e.g. "connection refused") rather than only reqwest's summary.
    pub fn transport(err: &reqwest::Error) -> Self {
        let mut message = err.to_string();
        let mut source = std::error::Error::source(err);
        while let Some(cause) = source {
            message.push_str(": ");
            message.push_str(&cause.to_string());
            source = cause.source();
        }
        ApiError::Transport { message }
    }

    pub fn malformed(status: reqwest::StatusCode) -> Self {
        ApiError::MalformedResponse {
            status: status.as_u16(),
            message: FALLBACK_MESSAGE.to_string(),
        }
    }

    /// Build a server error from a non-2xx status and its raw body.
    ///
    /// The body is first parsed as JSON, then searched for a string
    /// `message` field. Either step failing yields the fallback message.
    pub fn from_status(status: reqwest::StatusCode, body: &str) -> Self {
        let message = Self::parse_message(body).unwrap_or_else(|| FALLBACK_MESSAGE.to_string());
        ApiError::Server {
            status: status.as_u16(),
            message,
        }
    }

    fn parse_message(body: &str) -> Option<String> {
        let parsed: serde_json::Value = serde_json::from_str(body).ok()?;
        parsed
            .get("message")
            .and_then(|m| m.as_str())
            .filter(|m| !m.is_empty())
            .map(str::to_string)
    }

    /// Truncate a response body to avoid logging excessive data
    pub(crate) fn truncate_body(body: &str) -> String {
        if body.len() <= MAX_ERROR_BODY_LENGTH {
            body.to_string()
        } else {
            let mut end = MAX_ERROR_BODY_LENGTH;
            while !body.is_char_boundary(end) {
                end -= 1;
            }
            format!("{}... (truncated, {} total bytes)", &body[..end], body.len())
        }
    }
}
