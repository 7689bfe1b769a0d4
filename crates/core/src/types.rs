//! Domain types for representing generated deck content.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// An ordered collection of slides. Insertion order is display order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Deck {
    /// Slides in presentation order.
    pub slides: Vec<Slide>,
}

impl Deck {
    /// Create an empty deck.
    pub fn new() -> Self {
        Self { slides: Vec::new() }
    }

    /// Append a slide to the end of the deck.
    pub fn add_slide(&mut self, slide: Slide) {
        self.slides.push(slide);
    }

    pub fn len(&self) -> usize {
        self.slides.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    /// Clear the image reference and keywords of every slide.
    pub fn strip_images(&mut self) {
        for slide in &mut self.slides {
            slide.strip_image();
        }
    }
}

/// A single slide: title, body text, optional image and search keywords.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slide {
    pub title: String,
    pub description: String,

    /// Image reference, filled by the model or by image resolution.
    pub image: Option<ImageRef>,

    /// Image search terms, in the order the model produced them.
    pub keywords: Vec<String>,
}

impl Slide {
    /// Create a text-only slide.
    pub fn new(title: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            description: description.into(),
            image: None,
            keywords: Vec::new(),
        }
    }

    /// Builder-style setter for keywords. Blank entries are dropped.
    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords
            .into_iter()
            .map(Into::into)
            .map(|k: String| k.trim().to_string())
            .filter(|k| !k.is_empty())
            .collect();
        self
    }

    /// Builder-style setter for the image reference.
    pub fn with_image(mut self, image: ImageRef) -> Self {
        self.image = Some(image);
        self
    }

    pub fn strip_image(&mut self) {
        self.image = None;
        self.keywords.clear();
    }

    /// Whether an image step should run for this slide.
    pub fn wants_image(&self) -> bool {
        !self.keywords.is_empty()
    }
}

/// Where an image lives: a local file or an absolute remote URL.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageRef {
    Local(PathBuf),
    Remote(String),
}

impl ImageRef {
    /// Interpret a raw reference string. Blank input yields `None`.
    pub fn parse(raw: &str) -> Option<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return None;
        }

        let lower = raw.to_ascii_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            Some(Self::Remote(raw.to_string()))
        } else {
            Some(Self::Local(PathBuf::from(raw)))
        }
    }
}

impl fmt::Display for ImageRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Local(path) => write!(f, "{}", path.display()),
            Self::Remote(url) => f.write_str(url),
        }
    }
}

/// Raster formats that can be embedded in a deck.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ImageFormat {
    Jpeg,
    Png,
    Gif,
}

impl ImageFormat {
    /// Detect format from a declared MIME type such as `image/png; charset=binary`.
    pub fn from_content_type(content_type: &str) -> Option<Self> {
        let essence = content_type
            .split(';')
            .next()
            .unwrap_or_default()
            .trim()
            .to_ascii_lowercase();
        match essence.as_str() {
            "image/jpeg" | "image/jpg" | "image/pjpeg" => Some(Self::Jpeg),
            "image/png" => Some(Self::Png),
            "image/gif" => Some(Self::Gif),
            _ => None,
        }
    }

    /// Detect format from file extension.
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "jpg" | "jpeg" | "jpe" => Some(Self::Jpeg),
            "png" => Some(Self::Png),
            "gif" => Some(Self::Gif),
            _ => None,
        }
    }

    /// Detect format from file magic bytes.
    pub fn from_magic(bytes: &[u8]) -> Option<Self> {
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some(Self::Jpeg);
        }
        if bytes.starts_with(&[0x89, b'P', b'N', b'G', 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some(Self::Png);
        }
        if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
            return Some(Self::Gif);
        }
        None
    }

    pub fn extension(self) -> &'static str {
        match self {
            Self::Jpeg => "jpeg",
            Self::Png => "png",
            Self::Gif => "gif",
        }
    }

    pub fn mime_type(self) -> &'static str {
        match self {
            Self::Jpeg => "image/jpeg",
            Self::Png => "image/png",
            Self::Gif => "image/gif",
        }
    }
}

/// Raw image bytes ready to embed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageData {
    pub bytes: Vec<u8>,
    pub format: ImageFormat,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_image_ref_parse() {
        assert_eq!(ImageRef::parse(""), None);
        assert_eq!(ImageRef::parse("   "), None);
        assert_eq!(
            ImageRef::parse("https://images.example.com/a.jpg"),
            Some(ImageRef::Remote("https://images.example.com/a.jpg".into()))
        );
        assert_eq!(
            ImageRef::parse("HTTP://example.com/a.png"),
            Some(ImageRef::Remote("HTTP://example.com/a.png".into()))
        );
        assert_eq!(
            ImageRef::parse("static/images/fallback.jpg"),
            Some(ImageRef::Local(PathBuf::from("static/images/fallback.jpg")))
        );
    }

    #[test]
    fn test_strip_images_clears_every_slide() {
        let mut deck = Deck::new();
        deck.add_slide(
            Slide::new("Rain", "Water falls")
                .with_keywords(["rain", "clouds"])
                .with_image(ImageRef::Remote("https://example.com/rain.jpg".into())),
        );
        deck.add_slide(Slide::new("Sun", "Water rises").with_keywords(["sun"]));

        deck.strip_images();

        assert_eq!(deck.len(), 2);
        for slide in &deck.slides {
            assert!(slide.image.is_none());
            assert!(slide.keywords.is_empty());
            assert!(!slide.wants_image());
        }
    }

    #[test]
    fn test_with_keywords_drops_blanks() {
        let slide = Slide::new("T", "D").with_keywords([" ocean ", "", "  ", "wave"]);
        assert_eq!(slide.keywords, vec!["ocean", "wave"]);
    }

    #[test]
    fn test_image_format_detection() {
        assert_eq!(
            ImageFormat::from_content_type("image/png; charset=binary"),
            Some(ImageFormat::Png)
        );
        assert_eq!(ImageFormat::from_content_type("IMAGE/JPEG"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_content_type("text/html"), None);
        assert_eq!(ImageFormat::from_extension("JPG"), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_extension("webp"), None);
        assert_eq!(ImageFormat::from_magic(b"GIF89a...."), Some(ImageFormat::Gif));
        assert_eq!(ImageFormat::from_magic(&[0xFF, 0xD8, 0xFF, 0xE0]), Some(ImageFormat::Jpeg));
        assert_eq!(ImageFormat::from_magic(b"PK\x03\x04"), None);
    }
}
