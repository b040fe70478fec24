//! Chat request and response shapes

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, Result};

/// One logical chat request
#[derive(Debug, Clone, PartialEq)]
pub struct ChatRequest
{   pub model: String
  , pub prompt: String
  , pub temperature: f32
  , pub max_attempts: usize
}

impl ChatRequest
{   pub fn new(
      model: impl Into<String>
    , prompt: impl Into<String>
    , temperature: f32
    , max_attempts: usize
    ) -> Self
    {   ChatRequest
        {   model: model.into()
          , prompt: prompt.into()
          , temperature
          , max_attempts
        }
    }

    /// JSON body POSTed to the endpoint
    pub fn payload(&self) -> ChatPayload
    {   ChatPayload
        {   model: self.model.clone()
          , messages: vec![
              ChatMessage
              {   role: "user".to_string()
                , content: self.prompt.clone()
              }
            ]
          , temperature: self.temperature
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatMessage
{   pub role: String
  , pub content: String
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ChatPayload
{   pub model: String
  , pub messages: Vec<ChatMessage>
  , pub temperature: f32
}

/// Pull `choices[0].message.content` out of a decoded body.
///
/// Missing or empty `choices` and non-string content are data errors.
pub fn extract_content(body: &Value) -> Result<String>
{   let choices = body.get("choices")
      .and_then(Value::as_array)
      .filter(|c| !c.is_empty())
      .ok_or_else(|| Error::Data(format!(
        "Response missing 'choices' or empty: {}",
        body
      )))?;

    match choices[0].pointer("/message/content")
    {   Some(Value::String(content)) => Ok(content.clone())
      , other => Err(Error::Data(format!(
          "Unexpected content type. Content: {}",
          other.unwrap_or(&Value::Null)
        )))
    }
}
