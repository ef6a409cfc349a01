//! URL fetching and content-type classification.

use reqwest::header::CONTENT_TYPE;
use reqwest::Client;
use tracing::debug;
use url::Url;

use webvec_core::{ContentType, FetchConfig, Result, WebvecError};

/// Raw response body plus the content classification the extractors
/// dispatch on.
#[derive(Debug, Clone)]
pub struct Fetched {
    pub content_type: ContentType,
    pub bytes: Vec<u8>,
}

/// Retrieves raw bytes for a URL with a fixed per-request timeout. Failed
/// fetches are never retried here; the pipeline skips the URL instead.
#[derive(Debug, Clone)]
pub struct Fetcher {
    http: Client,
}

impl Fetcher {
    pub fn new(config: &FetchConfig) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| WebvecError::Config(format!("http client: {e}")))?;
        Ok(Self { http })
    }

    pub async fn fetch(&self, url: &str) -> Result<Fetched> {
        Url::parse(url).map_err(|e| WebvecError::Fetch {
            url: url.to_string(),
            reason: format!("invalid url: {e}"),
        })?;

        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| WebvecError::Fetch {
                url: url.to_string(),
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            return Err(WebvecError::Fetch {
                url: url.to_string(),
                reason: format!("http status {status}"),
            });
        }

        let declared = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("")
            .to_ascii_lowercase();
        let content_type = classify(url, &declared);

        let bytes = response.bytes().await.map_err(|e| WebvecError::Fetch {
            url: url.to_string(),
            reason: format!("reading body: {e}"),
        })?;

        debug!(url = %url, content_type = %content_type, size = bytes.len(), "fetched");

        Ok(Fetched {
            content_type,
            bytes: bytes.to_vec(),
        })
    }
}

/// Classifies a response. PDF wins if either the URL path or the declared
/// type says so; HTML next; everything else is treated as plain text.
pub fn classify(url: &str, declared_type: &str) -> ContentType {
    let url = url.to_ascii_lowercase();
    if url.ends_with(".pdf") || declared_type.contains("pdf") {
        ContentType::Pdf
    } else if declared_type.contains("html") || url.ends_with(".html") || url.ends_with(".htm") {
        ContentType::Html
    } else {
        ContentType::Text
    }
}
