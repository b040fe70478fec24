use std::time::Duration;

use llmbatch::request::{extract_content, ChatRequest};
use llmbatch::retry::{parse_retry_after, Decision, RetryPolicy};
use llmbatch::{Error, ErrorKind};
use serde_json::json;

#[test]
fn test_throttle_delay_without_header_is_bounded()
{   let policy = RetryPolicy::new(10);
    for attempt in 1..=10
    {   for _ in 0..50
        {   let delay = policy.throttle_delay(attempt, None);
            let lower = Duration::from_secs(attempt as u64);
            let upper = Duration::from_secs(attempt as u64 + 10);
            assert!(delay >= lower, "{:?} < {:?}", delay, lower);
            assert!(delay < upper, "{:?} >= {:?}", delay, upper);
        }
    }
}

#[test]
fn test_throttle_delay_prefers_retry_after()
{   let policy = RetryPolicy::new(5);
    assert_eq!(
      policy.throttle_delay(3, Some(2.5)),
      Duration::from_millis(2500)
    );
    assert_eq!(policy.throttle_delay(1, Some(0.0)), Duration::ZERO);
}

#[test]
fn test_parse_retry_after()
{   assert_eq!(parse_retry_after("3"), Some(3.0));
    assert_eq!(parse_retry_after(" 1.5 "), Some(1.5));
    assert_eq!(parse_retry_after("-1"), None);
    assert_eq!(parse_retry_after("NaN"), None);
    assert_eq!(
      parse_retry_after("Wed, 21 Oct 2015 07:28:00 GMT"),
      None
    );
}

#[test]
fn test_decisions_follow_error_kind()
{   let policy = RetryPolicy::new(4);

    assert_eq!(
      policy.decide(1, &Error::Transport("reset".into())),
      Decision::RetryNow
    );
    assert_eq!(
      policy.decide(1, &Error::Decode("eof".into())),
      Decision::RetryNow
    );
    assert_eq!(
      policy.decide(1, &Error::Data("no choices".into())),
      Decision::Abort
    );
    assert_eq!(
      policy.decide(2, &Error::Http
      {   status: 401
        , body: "unauthorized".into()
      }),
      Decision::Abort
    );
    assert_eq!(
      policy.decide(2, &Error::RateLimited { retry_after: Some(1.0) }),
      Decision::RetryAfter(Duration::from_secs(1))
    );
}

#[test]
fn test_error_kinds()
{   assert_eq!(
      Error::RateLimited { retry_after: None }.kind(),
      ErrorKind::Throttling
    );
    assert!(Error::Transport("x".into()).is_retryable());
    assert!(!Error::Data("x".into()).is_retryable());
    assert!(!Error::Http { status: 500, body: String::new() }
      .is_retryable());
}

#[test]
fn test_attempt_budget()
{   let policy = RetryPolicy::new(0);
    assert_eq!(policy.max_attempts, 1);
    assert!(!policy.has_more(1));

    let policy = RetryPolicy::default();
    assert_eq!(policy.max_attempts, 5);
    assert!(policy.has_more(4));
    assert!(!policy.has_more(5));
}

#[test]
fn test_payload_shape()
{   let request = ChatRequest::new("gpt-x", "Hello", 0.0, 5);
    let value = serde_json::to_value(request.payload()).unwrap();
    assert_eq!(value, json!({
      "model": "gpt-x",
      "messages": [{ "role": "user", "content": "Hello" }],
      "temperature": 0.0
    }));
}

#[test]
fn test_extract_content()
{   let ok = json!({
      "choices": [
        { "message": { "content": "first" } },
        { "message": { "content": "second" } }
      ]
    });
    assert_eq!(extract_content(&ok), Ok("first".to_string()));

    for bad in [
      json!({}),
      json!({ "choices": [] }),
      json!({ "choices": "nope" }),
      json!({ "choices": [{ "message": {} }] }),
      json!({ "choices": [{ "message": { "content": null } }] }),
    ]
    {   assert!(matches!(extract_content(&bad), Err(Error::Data(_))));
    }
}

#[test]
fn test_oversized_retry_after_is_ignored()
{   assert_eq!(parse_retry_after("1e300"), None);
    assert_eq!(parse_retry_after("1e20"), None);
    assert_eq!(parse_retry_after("inf"), None);

    let policy = RetryPolicy::new(5);
    let delay = policy.throttle_delay(1, Some(1e300));
    assert!(delay >= Duration::from_secs(1), "{:?}", delay);
    assert!(delay < Duration::from_secs(6), "{:?}", delay);

    let delay = policy.throttle_delay(2, Some(f64::NAN));
    assert!(delay >= Duration::from_secs(2), "{:?}", delay);
    assert!(delay < Duration::from_secs(7), "{:?}", delay);
}
