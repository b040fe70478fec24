//! Semantic Scholar paper search

use std::collections::HashMap;
use std::time::Duration;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use log::{debug, trace, error};

use crate::config::ScholarConfig;
use crate::error::{Error, Result};

const SEARCH_PATH: &str = "/graph/v1/paper/search";

/// Fields requested for every paper
pub const DEFAULT_FIELDS: &[&str] = &[
  "externalIds",
  "title",
  "year",
  "abstract",
  "authors",
  "citationCount",
];

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Author
{   pub author_id: Option<String>
  , pub name: String
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Paper
{   pub paper_id: String
  , pub title: Option<String>
  , #[serde(default)]
    pub year: Option<u32>
  , #[serde(default, rename = "abstract")]
    pub abstract_text: Option<String>
  , #[serde(default)]
    pub authors: Vec<Author>
  , #[serde(default)]
    pub citation_count: Option<u64>
  , #[serde(default)]
    pub external_ids: Option<HashMap<String, Value>>
}

impl Paper
{   pub fn doi(&self) -> Option<&str>
    {   self.external_ids.as_ref()?
          .get("DOI")?
          .as_str()
    }
}

/// One page of search results
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SearchPage
{   pub total: u64
  , #[serde(default)]
    pub offset: u64
  , #[serde(default)]
    pub next: Option<u64>
  , #[serde(default)]
    pub data: Vec<Paper>
}

/// Client for the paper search endpoint
pub struct ScholarClient
{   config: ScholarConfig
  , http_client: reqwest::Client
}

impl ScholarClient
{   pub fn new(config: ScholarConfig) -> Result<Self>
    {   debug!("Creating ScholarClient for {}", config.base_url);
        let http_client = reqwest::Client::builder()
          .timeout(Duration::from_secs(config.timeout_secs))
          .build()
          .map_err(|e| Error::InvalidConfiguration(e.to_string()))?;
        Ok(ScholarClient
        {   config
          , http_client
        })
    }

    /// Keyword search; `limit` caps the page size
    pub async fn search_paper(
      &self
    , query: &str
    , limit: Option<u32>
    ) -> Result<SearchPage>
    {   debug!("Searching papers for: {}", query);
        let url = format!(
          "{}{}",
          self.config.base_url.trim_end_matches('/'),
          SEARCH_PATH
        );

        let mut params = vec![
          ("query", query.to_string()),
          ("fields", DEFAULT_FIELDS.join(",")),
        ];
        if let Some(limit) = limit
        {   params.push(("limit", limit.to_string()));
        }

        let mut request = self.http_client
          .get(&url)
          .query(&params);
        if let Some(key) = &self.config.api_key
        {   request = request.header("x-api-key", key);
        }

        let response = request.send().await.map_err(|e| {
          error!("Paper search failed: {}", e);
          Error::Transport(e.to_string())
        })?;

        let status = response.status();
        trace!("Paper search status: {}", status);

        if status.as_u16() == 429
        {   return Err(Error::RateLimited { retry_after: None });
        }
        if !status.is_success()
        {   let body = response.text().await
              .unwrap_or_else(|_| "Unknown error".to_string());
            error!("Paper search error {}: {}", status, body);
            return Err(Error::Http
            {   status: status.as_u16()
              , body
            });
        }

        let text = response.text().await
          .map_err(|e| Error::Transport(e.to_string()))?;
        let page: SearchPage = serde_json::from_str(&text)?;
        debug!(
          "Paper search returned {} of {} results",
          page.data.len(), page.total
        );
        Ok(page)
    }
}
