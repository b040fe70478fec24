pub mod error;
pub mod config;
pub mod request;
pub mod retry;
pub mod client;
pub mod dispatcher;
pub mod scholar;

pub use client::ModelClient;
pub use config::{ApiConfig, Config, RetryConfig, ScholarConfig};
pub use dispatcher::{BatchDispatcher, ChatExecutor};
pub use error::{Error, ErrorKind};
pub use request::ChatRequest;
pub use scholar::ScholarClient;

/*

llmbatch: a resilient chat-completion client with bounded
concurrent batch dispatch, plus a small literature search client.

llmbatch/
├── Cargo.toml
├── src/
│   ├── lib.rs          # Re-exports and result types
│   ├── error.rs        # Error type and retry classification
│   ├── config.rs       # Endpoint, retry and search configuration
│   ├── request.rs      # Chat payload and response extraction
│   ├── retry.rs        # Retry decisions and throttling backoff
│   ├── client.rs       # Request executor (ModelClient)
│   ├── dispatcher.rs   # Semaphore-bounded batch dispatcher
│   ├── scholar.rs      # Semantic Scholar paper search
│   └── main.rs         # `llmbatch` CLI
└── tests/

*/

/// Value a batch slot holds when its prompt got no successful answer
pub const PLACEHOLDER: &str = "No response";

/// Outcome of one chat request, produced once per request
#[derive(Debug, Clone, PartialEq)]
pub enum ChatResult
{   Success(String)
  , Failure(FailureReason)
}

/// Why a chat request produced no content
#[derive(Debug, Clone, PartialEq)]
pub enum FailureReason
{   /// Response arrived without usable `choices[0].message.content`
    Data(String)
  , /// Endpoint answered with a non-retryable HTTP status
    Http
    {   status: u16
    }
  , /// Any other non-retryable error handed to [`Self::from_error`],
    /// e.g. by a [`crate::ChatExecutor`] whose setup failed
    Fatal(error::Error)
  , /// Every attempt was throttled or hit a transient error
    RetriesExhausted
    {   attempts: usize
      , last: error::Error
    }
  , /// The task never ran to completion (panicked or aborted)
    NotCompleted(String)
}

impl FailureReason
{   /// Reason for an attempt sequence cut short by `err`
    pub fn from_error(err: error::Error) -> Self
    {   match err
        {   error::Error::Data(msg) => FailureReason::Data(msg)
          , error::Error::Http { status, .. } => FailureReason::Http { status }
          , other => FailureReason::Fatal(other)
        }
    }
}

impl ChatResult
{   pub fn is_success(&self) -> bool
    {   matches!(self, ChatResult::Success(_))
    }

    pub fn content(&self) -> Option<&str>
    {   match self
        {   ChatResult::Success(content) => Some(content)
          , ChatResult::Failure(_) => None
        }
    }

    pub fn into_content(self) -> Option<String>
    {   match self
        {   ChatResult::Success(content) => Some(content)
          , ChatResult::Failure(_) => None
        }
    }

    /// Content, or [`PLACEHOLDER`] for any failure
    pub fn into_content_or_placeholder(self) -> String
    {   self.into_content()
          .unwrap_or_else(|| PLACEHOLDER.to_string())
    }

    pub fn failure(&self) -> Option<&FailureReason>
    {   match self
        {   ChatResult::Failure(reason) => Some(reason)
          , ChatResult::Success(_) => None
        }
    }
}
