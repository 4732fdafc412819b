use std::path::PathBuf;

/*-------------------------------------------------------------------------------------------------
  Errors and Results
-------------------------------------------------------------------------------------------------*/

/// Errors raised while fetching, parsing, caching, or publishing IP prefix lists.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Connection, DNS, TLS, or timeout failure talking to a source, including a
    /// failure while reading the response body.
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// A source answered with a status outside 200-299.
    #[error("{url} returned HTTP status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
    },

    /// A non-blank, non-comment line is not a valid CIDR expression.
    #[error("invalid CIDR expression: {line:?}")]
    Parse { line: String },

    /// The prefix list stream failed before it was fully read.
    #[error("failed to read prefix list: {0}")]
    Read(#[source] std::io::Error),

    /// Every attempt allowed by the retry budget failed with a retryable error.
    #[error("failed to fetch {url} after {attempts} attempt(s): {source}")]
    RetriesExhausted {
        url: String,
        attempts: u32,
        #[source]
        source: Box<Error>,
    },

    /// Cache file I/O failure.
    #[error("cache file {path:?}: {source}")]
    Cache {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Cache file content is not a valid cache record.
    #[error("cache file {path:?} is not a valid cache record: {source}")]
    CacheFormat {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    /// Cache file holds a prefix that does not parse.
    #[error("cache file {path:?} contains an invalid prefix: {line:?}")]
    CachePrefix { path: PathBuf, line: String },

    #[error("invalid configuration: {0}")]
    Config(String),

    /// The HTTP client could not be initialized (TLS backend, headers).
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] reqwest::Error),

    /// A refresh or request thread could not be started.
    #[error("failed to start thread: {0}")]
    Thread(#[source] std::io::Error),

    /// The owning lifecycle was shut down while work was in progress.
    #[error("operation cancelled by shutdown")]
    Cancelled,

    /// Neither the initial fetch nor the cache could supply a prefix set.
    #[error("failed to perform initial fetch of IP ranges ({fetch}) and no usable cache ({cache})")]
    Provision {
        fetch: Box<Error>,
        cache: Box<Error>,
    },
}

impl Error {
    /// Transport, read, and HTTP status failures may be retried; everything else is
    /// final.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::Transport { .. } | Error::Read(_) | Error::HttpStatus { .. }
        )
    }
}

// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, Error>;

/*--------------------------------------------------------------------------------------
  Log Error Function
--------------------------------------------------------------------------------------*/

#[cfg(test)]
pub(crate) fn log_error(error: &Error) {
    log::error!("{}", error);
}

/*-------------------------------------------------------------------------------------------------
  Unit Tests
-------------------------------------------------------------------------------------------------*/
