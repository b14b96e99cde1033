//! Serving error types
//!
//! Client-facing conditional/range failures, source failures, and contract
//! violations raised while building response policies.

use std::io;
use std::path::PathBuf;

/// Errors produced while resolving a source or building a response
#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error("Bad Request: ill-formed timestamp in If-Modified-Since: {0:?}")]
    MalformedTimestamp(String),

    #[error("Bad Request: If-Modified-Since is in the future, please check your system clock")]
    ClockSkew,

    #[error("Conflicting content disposition: inline and attachment are mutually exclusive")]
    ConflictingDisposition,

    #[error("Conflicting cache control: {0}")]
    ConflictingCacheControl(&'static str),

    #[error("Not found: {}", .0.display())]
    NotFound(PathBuf),

    #[error("Source unavailable: {}: {source}", .path.display())]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Range not satisfiable for {length} bytes")]
    UnsatisfiableRange { length: u64 },
}

impl ServeError {
    /// HTTP status code the server boundary maps this error to
    pub const fn status(&self) -> u16 {
        match self {
            Self::MalformedTimestamp(_) | Self::ClockSkew => 400,
            Self::NotFound(_) => 404,
            Self::UnsatisfiableRange { .. } => 416,
            Self::ConflictingDisposition
            | Self::ConflictingCacheControl(_)
            | Self::SourceUnavailable { .. } => 500,
        }
    }

    /// Whether the error comes from a misconfigured policy rather than the client
    pub const fn is_contract_violation(&self) -> bool {
        matches!(
            self,
            Self::ConflictingDisposition | Self::ConflictingCacheControl(_)
        )
    }

    /// Classify an I/O error raised while opening or reading `path`
    pub fn from_io(path: impl Into<PathBuf>, err: io::Error) -> Self {
        let path = path.into();
        if err.kind() == io::ErrorKind::NotFound {
            Self::NotFound(path)
        } else {
            Self::SourceUnavailable { path, source: err }
        }
    }
}
