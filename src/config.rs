//! Configuration for the chat endpoint, retries and literature search

use std::path::Path;
use serde::{Deserialize, Serialize};
use log::debug;

use crate::error::{Error, Result};

/// User-Agent sent with every chat request
pub const DEFAULT_USER_AGENT: &str
  = "Apifox/1.0.0 (https://apifox.com)";

pub const DEFAULT_SCHOLAR_BASE: &str
  = "https://api.semanticscholar.org";

/// Chat endpoint configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig
{   /// Model identifier sent in the payload
    pub model: String
  , /// Bearer token
    pub api_key: String
  , /// Full URL the payload is POSTed to
    pub api_url: String
  , #[serde(default = "default_user_agent")]
    pub user_agent: String
  , /// Per-request timeout in seconds (none by default)
    #[serde(default)]
    pub timeout_secs: Option<u64>
}

fn default_user_agent() -> String
{   DEFAULT_USER_AGENT.to_string()
}

impl ApiConfig
{   pub fn new(
      model: impl Into<String>
    , api_key: impl Into<String>
    , api_url: impl Into<String>
    ) -> Self
    {   ApiConfig
        {   model: model.into()
          , api_key: api_key.into()
          , api_url: api_url.into()
          , user_agent: default_user_agent()
          , timeout_secs: None
        }
    }

    /// Read `LLM_MODEL`, `LLM_API_KEY` and `LLM_API_URL`
    pub fn from_env() -> Result<Self>
    {   debug!("Loading ApiConfig from environment");
        let var = |name: &str| {
          std::env::var(name)
            .map_err(|_| Error::MissingConfig(name.to_string()))
        };
        Ok(ApiConfig::new(
          var("LLM_MODEL")?,
          var("LLM_API_KEY")?,
          var("LLM_API_URL")?
        ))
    }
}

/// Attempt limits and batch concurrency
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryConfig
{   /// Max attempts for a single `chat` call
    pub chat_max_attempts: usize
  , /// Max attempts per prompt inside a batch
    pub batch_max_attempts: usize
  , /// Max concurrently running batch tasks
    pub concurrency_cap: usize
}

impl Default for RetryConfig
{   fn default() -> Self
    {   RetryConfig
        {   chat_max_attempts: 5
          , batch_max_attempts: 10
          , concurrency_cap: 3
        }
    }
}

impl RetryConfig
{   pub fn validate(&self) -> Result<()>
    {   if self.chat_max_attempts == 0
          || self.batch_max_attempts == 0
        {   return Err(Error::InvalidConfiguration(
              "max attempts must be at least 1".to_string()
            ));
        }
        if self.concurrency_cap == 0
        {   return Err(Error::InvalidConfiguration(
              "concurrency cap must be at least 1".to_string()
            ));
        }
        Ok(())
    }
}

/// Semantic Scholar client configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ScholarConfig
{   pub base_url: String
  , /// Partner key sent as `x-api-key`
    pub api_key: Option<String>
  , pub timeout_secs: u64
}

impl Default for ScholarConfig
{   fn default() -> Self
    {   ScholarConfig
        {   base_url: DEFAULT_SCHOLAR_BASE.to_string()
          , api_key: None
          , timeout_secs: 10
        }
    }
}

/// Top-level configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config
{   pub api: ApiConfig
  , #[serde(default)]
    pub retry: RetryConfig
  , #[serde(default)]
    pub scholar: ScholarConfig
}

impl Config
{   pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self>
    {   let path = path.as_ref();
        debug!("Loading config from {}", path.display());
        let raw = std::fs::read_to_string(path)?;
        let config: Config = serde_json::from_str(&raw)
          .map_err(|e| Error::InvalidConfiguration(e.to_string()))?;
        config.retry.validate()?;
        Ok(config)
    }
}
