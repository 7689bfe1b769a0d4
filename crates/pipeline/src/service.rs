//! Request orchestration: prompt in, deck file out.

use crate::assembler::{DeckAssembler, DeckRepository};
use crate::fetch::HttpImageFetcher;
use crate::generator::{ChatContentGenerator, ContentGenerator};
use crate::resolver::ImageResolver;
use crate::search::{ImageSearch, PexelsClient};
use deckgen_core::{prompt, Config, Error, OutputConfig, Result};
use serde::{Deserialize, Serialize};
use std::path::Component;
use std::path::Path;
use std::sync::Arc;

const SUCCESS_MESSAGE: &str = "Presentation generated successfully";

/// A deck that was produced and written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedDeck {
    /// Path relative to the static-serving root.
    pub path: String,
    pub slide_count: usize,
}

/// Outward-facing success payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PresentationResponse {
    pub file_url: String,
    pub slide_count: usize,
    pub message: String,
}

/// Outward-facing failure payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, details: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            details: Some(details.into()),
        }
    }
}

/// Runs the pipeline: shape prompt, generate, clean up, assemble.
pub struct PresentationService {
    generator: Box<dyn ContentGenerator>,
    repository: Box<dyn DeckRepository>,
    output: OutputConfig,
}

impl PresentationService {
    pub fn new(
        generator: Box<dyn ContentGenerator>,
        repository: Box<dyn DeckRepository>,
        output: OutputConfig,
    ) -> Self {
        Self {
            generator,
            repository,
            output,
        }
    }

    /// Wire up the HTTP-backed components from configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let generator = ChatContentGenerator::new(&config.chat)?;
        let search = PexelsClient::from_config(&config.images)?
            .map(|client| Arc::new(client) as Arc<dyn ImageSearch>);
        let resolver = ImageResolver::new(&config.output, search);
        let fetcher = HttpImageFetcher::new(config.images.download_timeout)?;
        let assembler = DeckAssembler::new(config.output.clone(), resolver, Box::new(fetcher));

        Ok(Self::new(
            Box::new(generator),
            Box::new(assembler),
            config.output.clone(),
        ))
    }

    /// Generate and save a deck.
    ///
    /// `Ok(None)` means the generator produced no deck. Errors are an
    /// invalid prompt or a failure to write the file.
    pub fn generate_presentation(
        &self,
        user_prompt: &str,
        include_images: bool,
    ) -> Result<Option<GeneratedDeck>> {
        if !prompt::is_acceptable_prompt(user_prompt) {
            return Err(Error::InvalidPrompt(format!(
                "prompt must be at least {} characters",
                prompt::MIN_PROMPT_CHARS
            )));
        }

        let shaped = prompt::shape_prompt(user_prompt, include_images);
        let Some(mut deck) = self.generator.generate(&shaped, include_images) else {
            return Ok(None);
        };
        if deck.is_empty() {
            return Ok(None);
        }

        if !include_images {
            deck.strip_images();
        }

        let path = self.repository.save(&deck)?;
        Ok(Some(GeneratedDeck {
            path,
            slide_count: deck.len(),
        }))
    }

    /// Generate a deck and describe the outcome for a client.
    pub fn generate_response(
        &self,
        user_prompt: &str,
        include_images: bool,
    ) -> std::result::Result<PresentationResponse, ErrorResponse> {
        match self.generate_presentation(user_prompt, include_images) {
            Ok(Some(generated)) => {
                if !self.output.static_root.join(&generated.path).is_file() {
                    return Err(ErrorResponse::new(
                        "Failed to save presentation",
                        "Generated file not found",
                    ));
                }
                Ok(PresentationResponse {
                    file_url: format!("/static/{}", generated.path),
                    slide_count: generated.slide_count,
                    message: SUCCESS_MESSAGE.to_string(),
                })
            }
            Ok(None) => Err(ErrorResponse::new(
                "Failed to generate presentation",
                Error::EmptyDeck.to_string(),
            )),
            Err(e @ Error::InvalidPrompt(_)) => Err(ErrorResponse::new("Invalid request", e.to_string())),
            Err(e) => Err(ErrorResponse::new("An error occurred", e.to_string())),
        }
    }

    /// Read a produced deck by file name.
    pub fn download(&self, filename: &str) -> Result<Vec<u8>> {
        download(&self.output, filename)
    }
}

/// Read a produced deck from the output directory. Anything that is not a
/// plain file name inside it is reported as not found.
pub fn download(output: &OutputConfig, filename: &str) -> Result<Vec<u8>> {
    let mut components = Path::new(filename).components();
    let plain = matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    );
    if !plain {
        return Err(Error::NotFound(filename.to_string()));
    }

    let path = output.presentations_dir().join(filename);
    if !path.is_file() {
        return Err(Error::NotFound(filename.to_string()));
    }

    Ok(std::fs::read(path)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use deckgen_core::{Deck, Slide};
    use std::sync::Mutex;

    struct FixedGenerator {
        deck: Option<Deck>,
        prompts: Arc<Mutex<Vec<String>>>,
    }

    impl ContentGenerator for FixedGenerator {
        fn generate(&self, prompt: &str, _include_images: bool) -> Option<Deck> {
            self.prompts.lock().unwrap().push(prompt.to_string());
            self.deck.clone()
        }
    }

    struct RecordingRepository {
        saved: Arc<Mutex<Vec<Deck>>>,
        fail: bool,
    }

    impl DeckRepository for RecordingRepository {
        fn save(&self, deck: &Deck) -> Result<String> {
            if self.fail {
                return Err(Error::Serialization("disk full".into()));
            }
            self.saved.lock().unwrap().push(deck.clone());
            Ok("presentations/presentation_test.pptx".to_string())
        }
    }

    struct Harness {
        service: PresentationService,
        prompts: Arc<Mutex<Vec<String>>>,
        saved: Arc<Mutex<Vec<Deck>>>,
    }

    fn harness(deck: Option<Deck>, fail: bool) -> Harness {
        let prompts = Arc::new(Mutex::new(Vec::new()));
        let saved = Arc::new(Mutex::new(Vec::new()));
        let service = PresentationService::new(
            Box::new(FixedGenerator {
                deck,
                prompts: prompts.clone(),
            }),
            Box::new(RecordingRepository {
                saved: saved.clone(),
                fail,
            }),
            OutputConfig::with_static_root("/nonexistent/deckgen-static"),
        );
        Harness {
            service,
            prompts,
            saved,
        }
    }

    fn deck_with_images() -> Deck {
        let mut deck = Deck::new();
        deck.add_slide(
            Slide::new("Rain", "Drops")
                .with_keywords(["rain"])
                .with_image(deckgen_core::ImageRef::Remote("https://img.test/a.jpg".into())),
        );
        deck.add_slide(Slide::new("Sun", "Heat").with_keywords(["sun"]));
        deck
    }

    #[test]
    fn test_images_off_strips_image_data() {
        let h = harness(Some(deck_with_images()), false);
        let generated = h
            .service
            .generate_presentation("Explain the water cycle", false)
            .unwrap()
            .unwrap();

        assert_eq!(generated.slide_count, 2);
        let saved = h.saved.lock().unwrap();
        assert!(saved[0]
            .slides
            .iter()
            .all(|s| s.image.is_none() && s.keywords.is_empty()));
        assert!(h.prompts.lock().unwrap()[0].contains("focus only on textual content"));
    }

    #[test]
    fn test_images_on_keeps_keywords() {
        let h = harness(Some(deck_with_images()), false);
        h.service
            .generate_presentation("Explain the water cycle", true)
            .unwrap()
            .unwrap();

        let saved = h.saved.lock().unwrap();
        assert_eq!(saved[0].slides[1].keywords, vec!["sun"]);
        assert!(h.prompts.lock().unwrap()[0].contains("keywords for each slide"));
    }

    #[test]
    fn test_no_deck_is_none() {
        let h = harness(None, false);
        assert_eq!(h.service.generate_presentation("Explain the water cycle", true).unwrap(), None);

        let h = harness(Some(Deck::new()), false);
        assert_eq!(h.service.generate_presentation("Explain the water cycle", true).unwrap(), None);
        assert!(h.saved.lock().unwrap().is_empty());
    }

    #[test]
    fn test_short_prompt_rejected_before_generation() {
        let h = harness(Some(deck_with_images()), false);
        assert!(matches!(
            h.service.generate_presentation("too short", true),
            Err(Error::InvalidPrompt(_))
        ));
        assert!(h.prompts.lock().unwrap().is_empty());
    }

    #[test]
    fn test_serialization_failure_propagates() {
        let h = harness(Some(deck_with_images()), true);
        assert!(matches!(
            h.service.generate_presentation("Explain the water cycle", true),
            Err(Error::Serialization(_))
        ));

        let err = h
            .service
            .generate_response("Explain the water cycle", true)
            .unwrap_err();
        assert_eq!(err.error, "An error occurred");
        assert!(err.details.unwrap().contains("disk full"));
    }

    #[test]
    fn test_response_for_missing_deck() {
        let h = harness(None, false);
        let err = h
            .service
            .generate_response("Explain the water cycle", true)
            .unwrap_err();
        assert_eq!(err.error, "Failed to generate presentation");
        assert_eq!(err.details.as_deref(), Some("Could not generate content from prompt"));
    }

    #[test]
    fn test_download_rejects_paths() {
        let dir = tempfile::TempDir::new().unwrap();
        let output = OutputConfig::with_static_root(dir.path());
        std::fs::create_dir_all(output.presentations_dir()).unwrap();
        std::fs::write(output.presentations_dir().join("deck.pptx"), b"PK").unwrap();
        std::fs::write(dir.path().join("secret.txt"), b"nope").unwrap();

        assert_eq!(download(&output, "deck.pptx").unwrap(), b"PK");
        for name in ["missing.pptx", "../secret.txt", "/etc/passwd", "", "a/deck.pptx"] {
            assert!(matches!(download(&output, name), Err(Error::NotFound(_))), "{name}");
        }
    }
}
