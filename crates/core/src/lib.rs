//! Core domain types, configuration, prompt shaping and keyword derivation
//! for prompt-to-deck generation.

pub mod config;
pub mod error;
pub mod keywords;
pub mod prompt;
pub mod types;

pub use config::{ChatConfig, Config, ImageSearchConfig, OutputConfig};
pub use error::{Error, Result};
pub use types::{Deck, ImageData, ImageFormat, ImageRef, Slide};
