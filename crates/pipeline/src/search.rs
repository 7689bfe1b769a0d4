//! Image search clients.

use deckgen_core::{Error, ImageSearchConfig, Result};
use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, USER_AGENT};
use serde::Deserialize;
use url::Url;

const CLIENT_USER_AGENT: &str = concat!("deckgen/", env!("CARGO_PKG_VERSION"));

/// Looks up a photo URL for a query. Any failure is reported as `None`.
pub trait ImageSearch: Send + Sync {
    fn search(&self, query: &str) -> Option<String>;
}

/// Client for the Pexels photo search API.
pub struct PexelsClient {
    client: Client,
    api_url: Url,
    api_key: String,
    per_page: u32,
    size: String,
}

impl std::fmt::Debug for PexelsClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PexelsClient")
            .field("api_url", &self.api_url)
            .field("api_key", &redact(&self.api_key))
            .finish()
    }
}

impl PexelsClient {
    /// Build a client when a key is configured; `Ok(None)` means search is
    /// disabled.
    pub fn from_config(config: &ImageSearchConfig) -> Result<Option<Self>> {
        let Some(api_key) = config.api_key.clone() else {
            log::warn!("Image search key not configured; using fallback images");
            return Ok(None);
        };

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Http(format!("Failed to create HTTP client: {}", e)))?;

        log::info!("Image search client initialized with key {}", redact(&api_key));
        Ok(Some(Self {
            client,
            api_url: config.api_url.clone(),
            api_key,
            per_page: config.per_page,
            size: config.size.clone(),
        }))
    }

    fn try_search(&self, query: &str) -> Result<Option<String>> {
        let per_page = self.per_page.to_string();
        let response = self
            .client
            .get(self.api_url.clone())
            .header(AUTHORIZATION, &self.api_key)
            .header(USER_AGENT, CLIENT_USER_AGENT)
            .query(&[
                ("query", query),
                ("per_page", per_page.as_str()),
                ("size", self.size.as_str()),
            ])
            .send()
            .map_err(|e| Error::Http(format!("Image search request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Http(format!("Image search returned {}", status)));
        }

        let body: SearchResponse = response
            .json()
            .map_err(|e| Error::Http(format!("Malformed image search response: {}", e)))?;

        Ok(body.photos.into_iter().find_map(|p| p.src.best()))
    }
}

impl ImageSearch for PexelsClient {
    fn search(&self, query: &str) -> Option<String> {
        let query = query.trim();
        if query.is_empty() {
            return None;
        }

        log::debug!("Searching images for '{}'", query);
        match self.try_search(query) {
            Ok(Some(url)) => {
                log::debug!("Found image for '{}': {}", query, url);
                Some(url)
            }
            Ok(None) => {
                log::warn!("No images found for '{}'", query);
                None
            }
            Err(e) => {
                log::warn!("{}", e);
                None
            }
        }
    }
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    photos: Vec<Photo>,
}

#[derive(Debug, Deserialize)]
struct Photo {
    src: PhotoSources,
}

#[derive(Debug, Deserialize)]
struct PhotoSources {
    large2x: Option<String>,
    large: Option<String>,
    original: Option<String>,
}

impl PhotoSources {
    /// Largest suitable variant.
    fn best(self) -> Option<String> {
        self.large2x
            .or(self.large)
            .or(self.original)
            .filter(|u| !u.trim().is_empty())
    }
}

fn redact(key: &str) -> String {
    let chars: Vec<char> = key.chars().collect();
    if chars.len() > 8 {
        let head: String = chars[..4].iter().collect();
        let tail: String = chars[chars.len() - 4..].iter().collect();
        format!("{head}...{tail}")
    } else {
        "***".to_string()
    }
}
