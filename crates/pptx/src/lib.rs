//! PPTX (Office Open XML) backend for generated decks.
//!
//! Writes .pptx packages (ZIP archives of XML parts) from slide content and
//! reads them back for inspection.

pub mod layout;
pub mod package;
pub mod parser;
pub mod writer;

pub use parser::{InspectedDeck, InspectedSlide, PptxParser};
pub use writer::{Picture, PptxWriter, SlideContent, DEFAULT_BODY_FONT_PT};
