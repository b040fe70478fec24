use std::fmt;

/// Custom error type for llmbatch operations
/// Implements Clone so it can be carried inside results
#[derive(Debug, Clone, PartialEq)]
pub enum Error
{   /// Endpoint answered 429; optional server-provided delay in seconds
    RateLimited
    {   retry_after: Option<f64>
    }
  , /// Connection failure, timeout or body read failure
    Transport(String)
  , /// Response body was not valid JSON
    Decode(String)
  , /// Well-formed response missing the expected fields
    Data(String)
  , /// Non-429 HTTP error status
    Http
    {   status: u16
      , body: String
    }
  , /// Required configuration value is absent
    MissingConfig(String)
  , /// Invalid configuration
    InvalidConfiguration(String)
  , /// Failed to read a file
    Io(String)
  , /// Generic error
    Other(String)
}

/// How the executor treats an error
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind
{   /// Retried after a backoff sleep
    Throttling
  , /// Retried immediately
    Transient
  , /// Not retried
    Data
  , /// Not retried
    Fatal
}

impl Error
{   /// Classify this error for retry decisions
    pub fn kind(&self) -> ErrorKind
    {   match self
        {   Error::RateLimited { .. } => ErrorKind::Throttling
          , Error::Transport(_)
          | Error::Decode(_) => ErrorKind::Transient
          , Error::Data(_) => ErrorKind::Data
          , _ => ErrorKind::Fatal
        }
    }

    pub fn is_retryable(&self) -> bool
    {   matches!(
          self.kind(),
          ErrorKind::Throttling | ErrorKind::Transient
        )
    }
}

impl fmt::Display for Error
{   fn fmt(&self, f: &mut fmt::Formatter<'_>)
      -> fmt::Result
    {   match self
        {   Error::RateLimited { retry_after } => {
              match retry_after
              {   Some(secs) => write!(f,
                    "Rate limit exceeded (retry after {}s)",
                    secs
                  )
                , None => write!(f, "Rate limit exceeded")
              }
            }
          , Error::Transport(msg) => {
              write!(f, "Request error: {}", msg)
            }
          , Error::Decode(msg) => {
              write!(f, "JSON decode error: {}", msg)
            }
          , Error::Data(msg) => {
              write!(f, "Data error: {}", msg)
            }
          , Error::Http { status, body } => {
              write!(f, "HTTP error {}: {}", status, body)
            }
          , Error::MissingConfig(what) => {
              write!(f, "Missing configuration: {}", what)
            }
          , Error::InvalidConfiguration(msg) => {
              write!(f, "Invalid configuration: {}", msg)
            }
          , Error::Io(msg) => {
              write!(f, "I/O error: {}", msg)
            }
          , Error::Other(msg) => {
              write!(f, "Error: {}", msg)
            }
        }
    }
}

impl std::error::Error for Error {}

impl From<serde_json::Error> for Error
{   fn from(e: serde_json::Error) -> Self
    {   Error::Decode(e.to_string())
    }
}

impl From<std::io::Error> for Error
{   fn from(e: std::io::Error) -> Self
    {   Error::Io(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, Error>;
