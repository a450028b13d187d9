//! Error types for the managed cluster metrics collector

use thiserror::Error;

/// Main error type for collector operations
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum Error {
    /// Kubernetes API error
    #[error("kubernetes error: {0}")]
    Kube(#[from] kube::Error),

    /// A fetched record could not be decoded into its typed view
    #[error("decode error for {kind} {name}: {message}")]
    Decode {
        /// Kind of the record being decoded (e.g., "ManagedCluster")
        kind: String,
        /// Name of the record being decoded
        name: String,
        /// Description of what failed
        message: String,
    },

    /// Invalid or incomplete configuration
    #[error("configuration error: {0}")]
    Config(String),

    /// Scrape server error
    #[error("server error: {0}")]
    Server(String),

    /// Samples could not be encoded for exposition
    #[error("encode error: {0}")]
    Encode(String),
}

impl From<prometheus::Error> for Error {
    fn from(e: prometheus::Error) -> Self {
        Self::Encode(e.to_string())
    }
}

impl Error {
    /// Create a decode error for a named record of the given kind
    pub fn decode(
        kind: impl Into<String>,
        name: impl Into<String>,
        msg: impl Into<String>,
    ) -> Self {
        Self::Decode {
            kind: kind.into(),
            name: name.into(),
            message: msg.into(),
        }
    }

    /// Create a configuration error with the given message
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a server error with the given message
    pub fn server(msg: impl Into<String>) -> Self {
        Self::Server(msg.into())
    }

    /// Create an encode error with the given message
    pub fn encode(msg: impl Into<String>) -> Self {
        Self::Encode(msg.into())
    }

    /// Returns true if this error is a Kubernetes 404
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Kube(kube::Error::Api(e)) if e.code == 404)
    }
}
