//! Retry decisions and throttling backoff

use std::time::Duration;
use log::{debug, warn};
use rand::Rng;

use crate::error::{Error, ErrorKind};

/// What the executor does after a failed attempt
#[derive(Debug, Clone, PartialEq)]
pub enum Decision
{   /// Sleep, then try again
    RetryAfter(Duration)
  , /// Try again right away
    RetryNow
  , /// Stop; the error is not recoverable
    Abort
}

/// Retry policy for one attempt sequence
#[derive(Debug, Clone)]
pub struct RetryPolicy
{   pub max_attempts: usize
}

impl RetryPolicy
{   pub fn new(max_attempts: usize) -> Self
    {   RetryPolicy
        {   max_attempts: max_attempts.max(1)
        }
    }

    /// Delay before the next attempt after a 429.
    ///
    /// `attempt` is 1-based. A server-provided `retry_after` wins when
    /// it fits in a `Duration`; otherwise `attempt + uniform(0,
    /// max_attempts)` seconds.
    pub fn throttle_delay(
      &self
    , attempt: usize
    , retry_after: Option<f64>
    ) -> Duration
    {   if let Some(secs) = retry_after
        {   match Duration::try_from_secs_f64(secs)
            {   Ok(delay) => {
                  debug!(
                    "Throttle delay for attempt {}: {:.3}s (server)",
                    attempt, secs
                  );
                  return delay;
                }
              , Err(_) => {
                  warn!("Ignoring unusable Retry-After: {}", secs);
                }
            }
        }

        let jitter = rand::thread_rng()
          .gen_range(0.0..self.max_attempts as f64);
        let secs = attempt as f64 + jitter;
        debug!(
          "Throttle delay for attempt {}: {:.3}s",
          attempt, secs
        );
        Duration::from_secs_f64(secs)
    }

    /// Decide how to proceed after `attempt` (1-based) failed
    pub fn decide(
      &self
    , attempt: usize
    , error: &Error
    ) -> Decision
    {   match error.kind()
        {   ErrorKind::Throttling => {
              let retry_after = match error
              {   Error::RateLimited { retry_after } => *retry_after
                , _ => None
              };
              Decision::RetryAfter(
                self.throttle_delay(attempt, retry_after)
              )
            }
          , ErrorKind::Transient => Decision::RetryNow
          , ErrorKind::Data
          | ErrorKind::Fatal => Decision::Abort
        }
    }

    pub fn has_more(&self, attempt: usize) -> bool
    {   attempt < self.max_attempts
    }
}

impl Default for RetryPolicy
{   fn default() -> Self
    {   RetryPolicy::new(5)
    }
}

/// Parse a `Retry-After` header given in (possibly fractional) seconds.
///
/// HTTP-date values, negative numbers and values too large for a
/// `Duration` are ignored.
pub fn parse_retry_after(raw: &str) -> Option<f64>
{   raw.trim()
      .parse::<f64>()
      .ok()
      .filter(|secs| Duration::try_from_secs_f64(*secs).is_ok())
}
