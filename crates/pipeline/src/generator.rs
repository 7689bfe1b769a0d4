//! Content generation through a chat-completion endpoint.

use deckgen_core::{prompt, ChatConfig, Deck, Error, ImageRef, Result, Slide};
use reqwest::blocking::Client;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use url::Url;

/// Turns a prompt into a deck. Implementations never fail loudly: any
/// problem yields `None`.
pub trait ContentGenerator: Send + Sync {
    fn generate(&self, prompt: &str, include_images: bool) -> Option<Deck>;
}

/// Generator backed by an OpenAI-compatible chat-completion API.
pub struct ChatContentGenerator {
    client: Client,
    api_url: Url,
    api_key: String,
    model: String,
    temperature: f32,
    max_tokens: u32,
}

impl std::fmt::Debug for ChatContentGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChatContentGenerator")
            .field("api_url", &self.api_url)
            .field("api_key", &"[REDACTED]")
            .field("model", &self.model)
            .finish()
    }
}

impl ChatContentGenerator {
    pub fn new(config: &ChatConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| Error::Http(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            client,
            api_url: config.api_url.clone(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
            temperature: config.temperature,
            max_tokens: config.max_tokens,
        })
    }

    /// Call the model and parse its reply, reporting the cause on failure.
    pub fn try_generate(&self, user_prompt: &str, include_images: bool) -> Result<Deck> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: prompt::system_instructions(include_images),
                },
                ChatMessage {
                    role: "user",
                    content: user_prompt.to_string(),
                },
            ],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
        };

        let response = self
            .client
            .post(self.api_url.clone())
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(CONTENT_TYPE, "application/json")
            .json(&request)
            .send()
            .map_err(|e| Error::Http(format!("Chat request failed: {}", e)))?;

        let status = response.status();
        let body = response.text().unwrap_or_default();
        if !status.is_success() {
            return Err(Error::Http(format!(
                "Chat endpoint returned {}: {}",
                status,
                preview(&body)
            )));
        }

        let reply: ChatResponse = serde_json::from_str(&body)
            .map_err(|e| Error::Generation(format!("Malformed chat response: {}", e)))?;
        let content = reply
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .ok_or_else(|| Error::Generation("Chat response has no message content".into()))?;

        parse_reply(&content, include_images)
    }
}

impl ContentGenerator for ChatContentGenerator {
    fn generate(&self, user_prompt: &str, include_images: bool) -> Option<Deck> {
        match self.try_generate(user_prompt, include_images) {
            Ok(deck) => {
                log::info!("Generated {} slides", deck.len());
                Some(deck)
            }
            Err(e) => {
                log::warn!("Error generating presentation: {}", e);
                None
            }
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReplyMessage,
}

#[derive(Debug, Deserialize)]
struct ChatReplyMessage {
    #[serde(default)]
    content: Option<String>,
}

/// One element of the JSON array the model is asked for.
#[derive(Debug, Deserialize)]
struct RawSlide {
    title: String,
    description: String,
    #[serde(default)]
    keywords: Option<Value>,
    #[serde(default)]
    image: Option<Value>,
}

/// Parse the model's reply into a deck.
///
/// The reply must be a JSON array of objects with string `title` and
/// `description`; a surrounding Markdown code fence is tolerated. Anything
/// else, including an empty array, is a generation failure.
pub fn parse_reply(content: &str, include_images: bool) -> Result<Deck> {
    let json = strip_code_fence(content);
    let raw: Vec<RawSlide> = serde_json::from_str(json)
        .map_err(|e| Error::Generation(format!("Reply is not a JSON array of slides: {}", e)))?;

    if raw.is_empty() {
        return Err(Error::Generation("Reply contains no slides".into()));
    }

    let mut deck = Deck::new();
    for (idx, item) in raw.into_iter().enumerate() {
        let title = item.title.trim();
        if title.is_empty() {
            return Err(Error::Generation(format!("Slide {} has an empty title", idx + 1)));
        }

        let mut slide = Slide::new(title, item.description.trim());
        if include_images {
            slide = slide.with_keywords(keyword_list(item.keywords));
            slide.image = item.image.as_ref().and_then(Value::as_str).and_then(ImageRef::parse);
        }
        deck.add_slide(slide);
    }

    Ok(deck)
}

/// Accept keywords as an array of strings or a comma-separated string.
fn keyword_list(value: Option<Value>) -> Vec<String> {
    match value {
        Some(Value::Array(items)) => items
            .into_iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        Some(Value::String(s)) => s.split(',').map(str::to_string).collect(),
        _ => Vec::new(),
    }
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the info string ("json") on the opening fence line.
    let body = rest.split_once('\n').map(|(_, body)| body).unwrap_or("");
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

fn preview(body: &str) -> String {
    let mut text: String = body.chars().take(200).collect();
    if body.chars().count() > 200 {
        text.push_str("...");
    }
    text
}
