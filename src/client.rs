use std::sync::Arc;
use std::time::Duration;
use async_trait::async_trait;
use log::{debug, trace, warn, error, info};
use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, RETRY_AFTER};
use reqwest::StatusCode;
use serde_json::Value;

use crate::config::{ApiConfig, Config, RetryConfig};
use crate::dispatcher::{BatchDispatcher, ChatExecutor};
use crate::error::{Error, Result};
use crate::request::{extract_content, ChatPayload, ChatRequest};
use crate::retry::{parse_retry_after, Decision, RetryPolicy};
use crate::{ChatResult, FailureReason};

/// Chat-completion client with retrying requests and batch dispatch
#[derive(Clone)]
pub struct ModelClient
{   inner: Arc<ModelClientInner>
}

struct ModelClientInner
{   api: ApiConfig
  , retry: RetryConfig
  , http_client: reqwest::Client
}

impl std::fmt::Debug for ModelClient
{   fn fmt(&self, f: &mut std::fmt::Formatter<'_>)
      -> std::fmt::Result
    {   f.debug_struct("ModelClient")
          .field("model", &self.inner.api.model)
          .field("api_url", &self.inner.api.api_url)
          .field("retry", &self.inner.retry)
          .finish()
    }
}

impl ModelClient
{   /// Create a client; the API key and URL are not validated
    pub fn new(
      api: ApiConfig
    , retry: RetryConfig
    ) -> Result<Self>
    {   debug!("Creating ModelClient for model: {}", api.model);
        retry.validate()?;

        let mut builder = reqwest::Client::builder()
          .user_agent(api.user_agent.clone());
        if let Some(secs) = api.timeout_secs
        {   builder = builder.timeout(Duration::from_secs(secs));
        }
        let http_client = builder.build().map_err(|e| {
          error!("Failed to build HTTP client: {}", e);
          Error::InvalidConfiguration(e.to_string())
        })?;

        Ok(ModelClient
        {   inner: Arc::new(ModelClientInner
            {   api
              , retry
              , http_client
            })
        })
    }

    pub fn from_config(config: &Config) -> Result<Self>
    {   ModelClient::new(config.api.clone(), config.retry.clone())
    }

    pub fn model(&self) -> &str
    {   &self.inner.api.model
    }

    pub fn retry_config(&self) -> &RetryConfig
    {   &self.inner.retry
    }

    /// Single chat call; `None` when every path failed
    pub async fn chat(
      &self
    , prompt: &str
    , temperature: f32
    ) -> Option<String>
    {   self.execute(
          prompt,
          temperature,
          self.inner.retry.chat_max_attempts
        ).await.into_content()
    }

    /// Run one request through the retry loop
    pub async fn execute_request(
      &self
    , request: &ChatRequest
    ) -> ChatResult
    {   let policy = RetryPolicy::new(request.max_attempts);
        let max = policy.max_attempts;
        let payload = request.payload();
        let mut last_error = None;

        for attempt in 1..=max
        {   match self.attempt(&payload).await
            {   Ok(content) => {
                  debug!(
                    "Chat succeeded on attempt {}/{}",
                    attempt, max
                  );
                  return ChatResult::Success(content);
                }
              , Err(err) => {
                  match policy.decide(attempt, &err)
                  {   Decision::Abort => {
                        error!(
                          "{}. Attempt {}/{}, not retrying",
                          err, attempt, max
                        );
                        return ChatResult::Failure(
                          FailureReason::from_error(err)
                        );
                      }
                    , Decision::RetryNow => {
                        warn!(
                          "{}. Retry attempt {} of {}",
                          err, attempt, max
                        );
                      }
                    , Decision::RetryAfter(delay) => {
                        warn!(
                          "Rate limit exceeded (attempt {}/{})",
                          attempt, max
                        );
                        if policy.has_more(attempt)
                        {   info!(
                              "Retrying after {:.3} seconds...",
                              delay.as_secs_f64()
                            );
                            tokio::time::sleep(delay).await;
                        }
                      }
                  }
                  last_error = Some(err);
                }
            }
        }

        error!("All API request retries failed");
        ChatResult::Failure(FailureReason::RetriesExhausted
        {   attempts: max
          , last: last_error.unwrap_or_else(|| {
              Error::Other("no attempt made".to_string())
            })
        })
    }

    /// One HTTP round trip, classified into content or an error
    async fn attempt(
      &self
    , payload: &ChatPayload
    ) -> Result<String>
    {   let api = &self.inner.api;
        trace!("Chat payload: {:?}", payload);

        let response = self.inner.http_client
          .post(&api.api_url)
          .header(ACCEPT, "application/json")
          .header(AUTHORIZATION, format!("Bearer {}", api.api_key))
          .header(CONTENT_TYPE, "application/json")
          .json(payload)
          .send()
          .await
          .map_err(|e| Error::Transport(e.to_string()))?;

        let status = response.status();
        trace!("Chat response status: {}", status);

        if status == StatusCode::TOO_MANY_REQUESTS
        {   let retry_after = response.headers()
              .get(RETRY_AFTER)
              .and_then(|v| v.to_str().ok())
              .and_then(parse_retry_after);
            return Err(Error::RateLimited { retry_after });
        }

        if status.is_client_error() || status.is_server_error()
        {   let body = response.text().await
              .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Error::Http
            {   status: status.as_u16()
              , body
            });
        }

        let text = response.text().await
          .map_err(|e| Error::Transport(e.to_string()))?;
        let body: Value = serde_json::from_str(&text)?;
        extract_content(&body)
    }

    /// Dispatcher over this client using the configured cap
    pub fn dispatcher(&self) -> BatchDispatcher<ModelClient>
    {   BatchDispatcher::new(
          Arc::new(self.clone()),
          self.inner.retry.concurrency_cap,
          self.inner.retry.batch_max_attempts
        )
    }

    /// Concurrent batch; one result per prompt, in input order
    pub async fn batch_execute(
      &self
    , prompts: &[String]
    , temperature: f32
    ) -> Vec<ChatResult>
    {   self.dispatcher()
          .batch_execute(prompts, temperature)
          .await
    }

    /// Like [`Self::batch_execute`], with failures as the placeholder
    pub async fn batch_chat(
      &self
    , prompts: &[String]
    , temperature: f32
    ) -> Vec<String>
    {   self.dispatcher()
          .batch_chat(prompts, temperature)
          .await
    }
}

#[async_trait]
impl ChatExecutor for ModelClient
{   async fn execute(
      &self
    , prompt: &str
    , temperature: f32
    , max_attempts: usize
    ) -> ChatResult
    {   let request = ChatRequest::new(
          self.inner.api.model.clone(),
          prompt,
          temperature,
          max_attempts
        );
        self.execute_request(&request).await
    }
}
