//! Bounded-concurrency batch dispatch
//!
//! Admission goes through a counting semaphore sized to the cap: a
//! prompt is only spawned once a slot is free, and the slot is handed
//! back when its task finishes. Every task owns exactly one result
//! index, written when its handle is joined.

use std::sync::Arc;
use async_trait::async_trait;
use log::{debug, error, info};
use tokio::sync::Semaphore;

use crate::{ChatResult, FailureReason};

/// Anything that can run one request-with-retries cycle
#[async_trait]
pub trait ChatExecutor: Send + Sync
{   async fn execute(
      &self
    , prompt: &str
    , temperature: f32
    , max_attempts: usize
    ) -> ChatResult;
}

/// Fans prompts out to an executor, at most `concurrency_cap` at a time
pub struct BatchDispatcher<E: ?Sized>
{   executor: Arc<E>
  , concurrency_cap: usize
  , max_attempts: usize
}

impl<E> BatchDispatcher<E>
where
  E: ChatExecutor + ?Sized + 'static
{   pub fn new(
      executor: Arc<E>
    , concurrency_cap: usize
    , max_attempts: usize
    ) -> Self
    {   BatchDispatcher
        {   executor
          , concurrency_cap: concurrency_cap.max(1)
          , max_attempts
        }
    }

    pub fn concurrency_cap(&self) -> usize
    {   self.concurrency_cap
    }

    /// Run every prompt; the result at index `i` belongs to `prompts[i]`
    pub async fn batch_execute(
      &self
    , prompts: &[String]
    , temperature: f32
    ) -> Vec<ChatResult>
    {   let total = prompts.len();
        debug!(
          "Dispatching {} prompts (cap {}, {} attempts each)",
          total, self.concurrency_cap, self.max_attempts
        );

        let mut results: Vec<ChatResult> = (0..total)
          .map(|_| ChatResult::Failure(
            FailureReason::NotCompleted("not scheduled".to_string())
          ))
          .collect();

        let slots = Arc::new(Semaphore::new(self.concurrency_cap));
        let mut handles = Vec::with_capacity(total);

        for (idx, prompt) in prompts.iter().enumerate()
        {   // Blocks while the batch is saturated
            let permit = match slots.clone().acquire_owned().await
            {   Ok(permit) => permit
              , Err(e) => {
                  error!("Concurrency slots closed: {}", e);
                  break;
                }
            };

            let executor = Arc::clone(&self.executor);
            let prompt = prompt.clone();
            let max_attempts = self.max_attempts;
            let handle = tokio::spawn(async move {
              let result = executor
                .execute(&prompt, temperature, max_attempts)
                .await;
              drop(permit);
              result
            });
            handles.push((idx, handle));
        }

        let mut done = 0;
        for (idx, handle) in handles
        {   results[idx] = match handle.await
            {   Ok(result) => result
              , Err(e) => {
                  error!("Batch task {} did not complete: {}", idx, e);
                  ChatResult::Failure(
                    FailureReason::NotCompleted(e.to_string())
                  )
                }
            };
            done += 1;
            info!("Batch progress: {}/{}", done, total);
        }

        results
    }

    /// Content per prompt, with [`crate::PLACEHOLDER`] for failures
    pub async fn batch_chat(
      &self
    , prompts: &[String]
    , temperature: f32
    ) -> Vec<String>
    {   self.batch_execute(prompts, temperature)
          .await
          .into_iter()
          .map(ChatResult::into_content_or_placeholder)
          .collect()
    }
}
