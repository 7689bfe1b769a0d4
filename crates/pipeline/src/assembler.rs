//! Deck assembly: slide content plus resolved images, serialized to disk.

use crate::fetch::ImageMaterializer;
use crate::resolver::ImageResolver;
use deckgen_core::{Deck, Error, OutputConfig, Result, Slide};
use deckgen_pptx::{Picture, PptxWriter, SlideContent};
use std::path::PathBuf;
use uuid::Uuid;

const FILENAME_PREFIX: &str = "presentation_";
const FILENAME_EXTENSION: &str = "pptx";

/// Persists a deck and returns its path relative to the static root.
pub trait DeckRepository: Send + Sync {
    fn save(&self, deck: &Deck) -> Result<String>;
}

/// Writes decks as PPTX files under the configured output directory.
pub struct DeckAssembler {
    output: OutputConfig,
    resolver: ImageResolver,
    materializer: Box<dyn ImageMaterializer>,
}

impl DeckAssembler {
    pub fn new(
        output: OutputConfig,
        resolver: ImageResolver,
        materializer: Box<dyn ImageMaterializer>,
    ) -> Self {
        Self {
            output,
            resolver,
            materializer,
        }
    }

    /// Serialize a deck to a freshly named file and return the path
    /// relative to the static root.
    pub fn assemble(&self, deck: &Deck) -> Result<String> {
        let dir = self.output.presentations_dir();
        std::fs::create_dir_all(&dir).map_err(|e| {
            Error::Serialization(format!("Cannot create output directory {}: {}", dir.display(), e))
        })?;

        let title = deck.slides.first().map(|s| s.title.as_str()).unwrap_or_default();
        let mut writer = PptxWriter::new().with_title(title);
        for slide in &deck.slides {
            writer.add_slide(self.slide_content(slide));
        }

        let filename = unique_filename();
        let path: PathBuf = dir.join(&filename);
        writer.save(&path).map_err(|e| {
            // Don't leave a truncated file behind.
            let _ = std::fs::remove_file(&path);
            Error::Serialization(format!("Cannot write {}: {}", path.display(), e))
        })?;

        log::info!("Saved {} slides to {}", writer.slide_count(), path.display());
        Ok(self.output.relative_path(&filename))
    }

    fn slide_content(&self, slide: &Slide) -> SlideContent {
        let content = SlideContent::text(&slide.title, &slide.description);
        if !slide.wants_image() {
            return content;
        }

        match self.picture_for(slide) {
            Some(picture) => content.with_picture(picture),
            None => content,
        }
    }

    /// Resolve and load an image, retrying once with the bundled asset.
    fn picture_for(&self, slide: &Slide) -> Option<Picture> {
        let reference = self.resolver.resolve(slide);
        let err = match self.materializer.materialize(&reference) {
            Ok(picture) => return Some(picture),
            Err(e) => e,
        };
        log::warn!("Image for '{}' unavailable ({}): {}", slide.title, reference, err);

        let fallback = self
            .resolver
            .fallback()
            .local_asset()
            .filter(|local| *local != reference)?;
        match self.materializer.materialize(&fallback) {
            Ok(picture) => Some(picture),
            Err(e) => {
                log::warn!("Fallback image for '{}' unavailable: {}", slide.title, e);
                None
            }
        }
    }
}

impl DeckRepository for DeckAssembler {
    fn save(&self, deck: &Deck) -> Result<String> {
        self.assemble(deck)
    }
}

/// `presentation_<token>.pptx` with a random, globally unique token.
pub fn unique_filename() -> String {
    format!(
        "{}{}.{}",
        FILENAME_PREFIX,
        Uuid::new_v4().simple(),
        FILENAME_EXTENSION
    )
}
