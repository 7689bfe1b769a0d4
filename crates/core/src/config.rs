//! Explicit configuration, read once and handed to component constructors.

use crate::{Error, Result};
use std::path::PathBuf;
use std::time::Duration;
use url::Url;

pub const ENV_CHAT_API_KEY: &str = "DEEPSEEK_API_KEY";
pub const ENV_CHAT_API_URL: &str = "DEEPSEEK_API_URL";
pub const ENV_CHAT_MODEL: &str = "DEEPSEEK_MODEL";
pub const ENV_IMAGE_API_KEY: &str = "PEXELS_API_KEY";
pub const ENV_IMAGE_API_URL: &str = "PEXELS_API_URL";
pub const ENV_STATIC_DIR: &str = "DECKGEN_STATIC_DIR";
pub const ENV_PLACEHOLDER_URL: &str = "DECKGEN_PLACEHOLDER_URL";

const DEFAULT_MODEL: &str = "deepseek-chat";
const DEFAULT_IMAGE_API_URL: &str = "https://api.pexels.com/v1/search";
const DEFAULT_PLACEHOLDER_URL: &str =
    "https://via.placeholder.com/1600x900/e0e0e0/808080?text=No+Image+Available";
const DEFAULT_STATIC_DIR: &str = "static";

/// Top-level configuration for the whole pipeline.
#[derive(Debug, Clone)]
pub struct Config {
    pub chat: ChatConfig,
    pub images: ImageSearchConfig,
    pub output: OutputConfig,
}

impl Config {
    /// Build configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Fails if the chat-completion credentials are absent. A missing or
    /// placeholder image-search key only disables search.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let api_key = get(ENV_CHAT_API_KEY).ok_or(Error::MissingConfig(ENV_CHAT_API_KEY))?;
        let api_url = get(ENV_CHAT_API_URL).ok_or(Error::MissingConfig(ENV_CHAT_API_URL))?;
        let api_url = Url::parse(&api_url)
            .map_err(|e| Error::InvalidConfig(format!("{ENV_CHAT_API_URL}: {e}")))?;

        let mut chat = ChatConfig::new(api_key, api_url);
        if let Some(model) = get(ENV_CHAT_MODEL) {
            chat.model = model;
        }

        let mut images = ImageSearchConfig::default();
        images.api_key = get(ENV_IMAGE_API_KEY).and_then(usable_image_key);
        if let Some(url) = get(ENV_IMAGE_API_URL) {
            images.api_url = Url::parse(&url)
                .map_err(|e| Error::InvalidConfig(format!("{ENV_IMAGE_API_URL}: {e}")))?;
        }

        let mut output = match get(ENV_STATIC_DIR) {
            Some(dir) => OutputConfig::with_static_root(dir),
            None => OutputConfig::default(),
        };
        if let Some(url) = get(ENV_PLACEHOLDER_URL) {
            output.placeholder_url = url;
        }

        Ok(Self {
            chat,
            images,
            output,
        })
    }
}

/// Reject keys that were obviously never filled in.
fn usable_image_key(key: String) -> Option<String> {
    if key.to_lowercase().contains("your_api_key") {
        log::warn!("{ENV_IMAGE_API_KEY} looks like a placeholder; image search disabled");
        None
    } else {
        Some(key)
    }
}

/// Chat-completion endpoint settings.
#[derive(Clone)]
pub struct ChatConfig {
    pub api_key: String,
    pub api_url: Url,
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    pub timeout: Duration,
}

impl ChatConfig {
    pub fn new(api_key: impl Into<String>, api_url: Url) -> Self {
        Self {
            api_key: api_key.into(),
            api_url,
            model: DEFAULT_MODEL.to_string(),
            temperature: 0.7,
            max_tokens: 2000,
            timeout: Duration::from_secs(120),
        }
    }
}

impl std::fmt::Debug for ChatConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatConfig")
            .field("api_key", &"[REDACTED]")
            .field("api_url", &self.api_url)
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("max_tokens", &self.max_tokens)
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// Image-search endpoint settings. `api_key == None` disables search.
#[derive(Clone)]
pub struct ImageSearchConfig {
    pub api_key: Option<String>,
    pub api_url: Url,
    pub per_page: u32,
    pub size: String,
    pub timeout: Duration,
    pub download_timeout: Duration,
}

impl Default for ImageSearchConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            api_url: Url::parse(DEFAULT_IMAGE_API_URL).expect("default image search URL is valid"),
            per_page: 1,
            size: "large".to_string(),
            timeout: Duration::from_secs(15),
            download_timeout: Duration::from_secs(30),
        }
    }
}

impl std::fmt::Debug for ImageSearchConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageSearchConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("api_url", &self.api_url)
            .field("per_page", &self.per_page)
            .field("size", &self.size)
            .field("timeout", &self.timeout)
            .field("download_timeout", &self.download_timeout)
            .finish()
    }
}

/// Filesystem layout for produced decks and fallback assets.
#[derive(Debug, Clone)]
pub struct OutputConfig {
    /// Static-serving root; returned paths are relative to it.
    pub static_root: PathBuf,
    /// Subdirectory of `static_root` that receives decks.
    pub presentations_subdir: String,
    /// Bundled fallback image, used when present on disk.
    pub fallback_image: PathBuf,
    /// Remote placeholder used when the bundled asset is missing.
    pub placeholder_url: String,
    /// Extra hosts whose images are never reused as-is.
    pub placeholder_hosts: Vec<String>,
}

impl OutputConfig {
    pub fn with_static_root(root: impl Into<PathBuf>) -> Self {
        let static_root = root.into();
        Self {
            fallback_image: static_root.join("images").join("fallback.jpg"),
            static_root,
            presentations_subdir: "presentations".to_string(),
            placeholder_url: DEFAULT_PLACEHOLDER_URL.to_string(),
            placeholder_hosts: Vec::new(),
        }
    }

    /// Absolute-or-cwd-relative directory decks are written to.
    pub fn presentations_dir(&self) -> PathBuf {
        self.static_root.join(&self.presentations_subdir)
    }

    /// Path of a produced deck relative to the static root.
    pub fn relative_path(&self, filename: &str) -> String {
        format!("{}/{}", self.presentations_subdir, filename)
    }

    /// Whether a URL points at a known low-quality placeholder provider.
    pub fn is_placeholder_url(&self, raw: &str) -> bool {
        let Some(host) = host_of(raw) else {
            return false;
        };
        host_of(&self.placeholder_url).as_deref() == Some(host.as_str())
            || self
                .placeholder_hosts
                .iter()
                .any(|h| h.eq_ignore_ascii_case(&host))
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self::with_static_root(DEFAULT_STATIC_DIR)
    }
}

fn host_of(raw: &str) -> Option<String> {
    Url::parse(raw)
        .ok()
        .and_then(|u| u.host_str().map(|h| h.to_ascii_lowercase()))
}
