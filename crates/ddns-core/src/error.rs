//! Error types for the DDNS system
//!
//! Every failure raised by the core is one of these variants. Callers that
//! wrap an error with [`Error::context`] keep the original cause reachable
//! through [`Error::innermost`].

use thiserror::Error;

/// Result type alias for DDNS operations
pub type Result<T> = std::result::Result<T, Error>;

/// Core error type for the DDNS system
#[derive(Error, Debug)]
pub enum Error {
    /// Invalid or missing settings
    #[error("Configuration error: {0}")]
    Config(String),

    /// Connection-level failure (refused, reset, timed out)
    #[error("Transport error: {0}")]
    Transport(String),

    /// HTTP status >= 500
    #[error("Server error: status {status}")]
    Server {
        /// HTTP status code
        status: u16,
    },

    /// All attempts of a resilient executor failed
    #[error("could not get a response after {attempts} attempts: {source}")]
    RetriesExhausted {
        /// Number of attempts made
        attempts: u32,
        /// Last observed cause
        #[source]
        source: Box<Error>,
    },

    /// HTTP 4xx with a body that is not a provider envelope
    #[error("Request rejected with status {status}: {body}")]
    Client {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },

    /// Provider reported `success: false` with errors
    #[error("error in the response: {0}")]
    Api(String),

    /// Zero matching zone or record
    #[error("Not found: {0}")]
    NotFound(String),

    /// Two or more matching records
    #[error("Duplicate record: {0}")]
    Duplicate(String),

    /// Malformed response body
    #[error("could not decode response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Caller-initiated cancellation
    #[error("operation cancelled")]
    Cancelled,

    /// IP source errors
    #[error("IP source error: {0}")]
    IpSource(String),

    /// Record cache errors
    #[error("Cache error: {0}")]
    Cache(String),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// An error wrapped with a description of the failed step
    #[error("{context}: {source}")]
    Context {
        /// What was being attempted
        context: String,
        /// Underlying cause
        #[source]
        source: Box<Error>,
    },
}

impl Error {
    /// Create a configuration error
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a transport error
    pub fn transport(msg: impl Into<String>) -> Self {
        Self::Transport(msg.into())
    }

    /// Create a provider API error
    pub fn api(msg: impl Into<String>) -> Self {
        Self::Api(msg.into())
    }

    /// Create a "not found" error
    pub fn not_found(msg: impl Into<String>) -> Self {
        Self::NotFound(msg.into())
    }

    /// Create a duplicate record error
    pub fn duplicate(msg: impl Into<String>) -> Self {
        Self::Duplicate(msg.into())
    }

    /// Create an IP source error
    pub fn ip_source(msg: impl Into<String>) -> Self {
        Self::IpSource(msg.into())
    }

    /// Create a cache error
    pub fn cache(msg: impl Into<String>) -> Self {
        Self::Cache(msg.into())
    }

    /// Create an invalid input error
    pub fn invalid_input(msg: impl Into<String>) -> Self {
        Self::InvalidInput(msg.into())
    }

    /// Wrap this error with a description of the step that failed
    pub fn context(self, context: impl Into<String>) -> Self {
        Self::Context {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// The error underneath any [`Error::Context`] layers
    pub fn innermost(&self) -> &Error {
        match self {
            Self::Context { source, .. } => source.innermost(),
            other => other,
        }
    }

    /// Whether the root cause is a missing zone or record
    pub fn is_not_found(&self) -> bool {
        matches!(self.innermost(), Self::NotFound(_))
    }

    /// Whether the root cause is an ambiguous record lookup
    pub fn is_duplicate(&self) -> bool {
        matches!(self.innermost(), Self::Duplicate(_))
    }

    /// Whether the root cause is caller cancellation
    pub fn is_cancelled(&self) -> bool {
        matches!(self.innermost(), Self::Cancelled)
    }
}
