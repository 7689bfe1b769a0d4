//! Prompt-to-deck pipeline.
//!
//! A [`ContentGenerator`] turns a prompt into a [`deckgen_core::Deck`], the
//! [`ImageResolver`] finds a picture for each slide that asks for one, and the
//! [`DeckAssembler`] writes the result as a PPTX file. [`PresentationService`]
//! runs the steps in order for one request.

pub mod assembler;
pub mod fetch;
pub mod generator;
pub mod resolver;
pub mod search;
pub mod service;

pub use assembler::{unique_filename, DeckAssembler, DeckRepository};
pub use fetch::{HttpImageFetcher, ImageMaterializer};
pub use generator::{parse_reply, ChatContentGenerator, ContentGenerator};
pub use resolver::{
    DerivedKeywordSearch, FallbackReference, ImageResolver, KeepExisting, KeywordSearch,
    ResolutionStrategy,
};
pub use search::{ImageSearch, PexelsClient};
pub use service::{download, ErrorResponse, GeneratedDeck, PresentationResponse, PresentationService};
