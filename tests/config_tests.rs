use std::io::Write;

use llmbatch::config::DEFAULT_USER_AGENT;
use llmbatch::{ApiConfig, Config, Error, ModelClient};

fn write_config(body: &str) -> tempfile::NamedTempFile
{   let mut file = tempfile::NamedTempFile::new().expect("temp file");
    file.write_all(body.as_bytes()).expect("write config");
    file
}

#[test]
fn test_minimal_config_uses_defaults()
{   let file = write_config(r#"{
      "api": {
        "model": "gpt-4o-mini",
        "api_key": "sk-test",
        "api_url": "https://example.com/v1/chat/completions"
      }
    }"#);

    let config = Config::from_json_file(file.path()).expect("config");

    assert_eq!(config.api.model, "gpt-4o-mini");
    assert_eq!(config.api.user_agent, DEFAULT_USER_AGENT);
    assert_eq!(config.api.timeout_secs, None);
    assert_eq!(config.retry.chat_max_attempts, 5);
    assert_eq!(config.retry.batch_max_attempts, 10);
    assert_eq!(config.retry.concurrency_cap, 3);
    assert_eq!(config.scholar.timeout_secs, 10);
    assert!(config.scholar.api_key.is_none());

    let client = ModelClient::from_config(&config).expect("client");
    assert_eq!(client.model(), "gpt-4o-mini");
}

#[test]
fn test_partial_retry_section_keeps_other_defaults()
{   let file = write_config(r#"{
      "api": { "model": "m", "api_key": "k", "api_url": "http://x" },
      "retry": { "concurrency_cap": 8 }
    }"#);

    let config = Config::from_json_file(file.path()).expect("config");
    assert_eq!(config.retry.concurrency_cap, 8);
    assert_eq!(config.retry.batch_max_attempts, 10);
}

#[test]
fn test_zero_attempts_rejected()
{   let file = write_config(r#"{
      "api": { "model": "m", "api_key": "k", "api_url": "http://x" },
      "retry": { "chat_max_attempts": 0 }
    }"#);

    let err = Config::from_json_file(file.path()).unwrap_err();
    assert!(matches!(err, Error::InvalidConfiguration(_)));
}

#[test]
fn test_missing_api_section_is_invalid()
{   let file = write_config(r#"{ "retry": {} }"#);
    let err = Config::from_json_file(file.path()).unwrap_err();
    assert!(matches!(err, Error::InvalidConfiguration(_)));
}

#[test]
fn test_missing_file_is_io_error()
{   let err = Config::from_json_file("/nonexistent/llmbatch.json")
      .unwrap_err();
    assert!(matches!(err, Error::Io(_)));
}

#[test]
fn test_api_config_from_env()
{   std::env::set_var("LLM_MODEL", "env-model");
    std::env::set_var("LLM_API_KEY", "env-key");
    std::env::set_var("LLM_API_URL", "http://env.example/chat");

    let api = ApiConfig::from_env().expect("env config");
    assert_eq!(api.model, "env-model");
    assert_eq!(api.api_key, "env-key");
    assert_eq!(api.api_url, "http://env.example/chat");
}
