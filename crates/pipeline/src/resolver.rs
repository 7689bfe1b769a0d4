//! Image resolution: an ordered chain of strategies ending in a fallback
//! that always succeeds.

use crate::search::ImageSearch;
use deckgen_core::keywords::{derive_keywords, search_query};
use deckgen_core::{ImageRef, OutputConfig, Slide};
use std::path::PathBuf;
use std::sync::Arc;

/// One step of the resolution chain. Returning `None` passes the slide on
/// to the next step.
pub trait ResolutionStrategy: Send + Sync {
    fn name(&self) -> &'static str;
    fn resolve(&self, slide: &Slide) -> Option<ImageRef>;
}

/// Keep an absolute URL the slide already carries, unless it points at a
/// placeholder provider.
pub struct KeepExisting {
    output: OutputConfig,
}

impl KeepExisting {
    pub fn new(output: OutputConfig) -> Self {
        Self { output }
    }
}

impl ResolutionStrategy for KeepExisting {
    fn name(&self) -> &'static str {
        "existing"
    }

    fn resolve(&self, slide: &Slide) -> Option<ImageRef> {
        match &slide.image {
            Some(ImageRef::Remote(url)) if !self.output.is_placeholder_url(url) => {
                Some(ImageRef::Remote(url.clone()))
            }
            _ => None,
        }
    }
}

/// Search with the model-supplied keywords.
pub struct KeywordSearch {
    search: Option<Arc<dyn ImageSearch>>,
}

impl KeywordSearch {
    pub fn new(search: Option<Arc<dyn ImageSearch>>) -> Self {
        Self { search }
    }
}

impl ResolutionStrategy for KeywordSearch {
    fn name(&self) -> &'static str {
        "keywords"
    }

    fn resolve(&self, slide: &Slide) -> Option<ImageRef> {
        let search = self.search.as_ref()?;
        let query = search_query(&slide.keywords);
        if query.is_empty() {
            return None;
        }
        search.search(&query).map(ImageRef::Remote)
    }
}

/// Search once more with terms taken from the slide's title and first
/// sentence.
pub struct DerivedKeywordSearch {
    search: Option<Arc<dyn ImageSearch>>,
}

impl DerivedKeywordSearch {
    pub fn new(search: Option<Arc<dyn ImageSearch>>) -> Self {
        Self { search }
    }
}

impl ResolutionStrategy for DerivedKeywordSearch {
    fn name(&self) -> &'static str {
        "derived-keywords"
    }

    fn resolve(&self, slide: &Slide) -> Option<ImageRef> {
        let search = self.search.as_ref()?;
        let query = search_query(&derive_keywords(slide));
        if query.is_empty() || query == search_query(&slide.keywords) {
            return None;
        }
        search.search(&query).map(ImageRef::Remote)
    }
}

/// The last resort: the bundled asset if it exists, else a placeholder URL.
#[derive(Debug, Clone)]
pub struct FallbackReference {
    pub local: PathBuf,
    pub placeholder_url: String,
}

impl FallbackReference {
    pub fn from_output(output: &OutputConfig) -> Self {
        Self {
            local: output.fallback_image.clone(),
            placeholder_url: output.placeholder_url.clone(),
        }
    }

    pub fn local_asset(&self) -> Option<ImageRef> {
        self.local
            .is_file()
            .then(|| ImageRef::Local(self.local.clone()))
    }

    pub fn reference(&self) -> ImageRef {
        self.local_asset()
            .unwrap_or_else(|| ImageRef::Remote(self.placeholder_url.clone()))
    }
}

/// Resolves an image reference for a slide. Total: always returns one.
pub struct ImageResolver {
    strategies: Vec<Box<dyn ResolutionStrategy>>,
    fallback: FallbackReference,
}

impl ImageResolver {
    /// The standard chain: existing URL, keyword search, derived-keyword
    /// search, fallback.
    pub fn new(output: &OutputConfig, search: Option<Arc<dyn ImageSearch>>) -> Self {
        Self::with_strategies(
            vec![
                Box::new(KeepExisting::new(output.clone())),
                Box::new(KeywordSearch::new(search.clone())),
                Box::new(DerivedKeywordSearch::new(search)),
            ],
            FallbackReference::from_output(output),
        )
    }

    pub fn with_strategies(
        strategies: Vec<Box<dyn ResolutionStrategy>>,
        fallback: FallbackReference,
    ) -> Self {
        Self {
            strategies,
            fallback,
        }
    }

    pub fn resolve(&self, slide: &Slide) -> ImageRef {
        for strategy in &self.strategies {
            if let Some(found) = strategy.resolve(slide) {
                log::debug!("Image for '{}' resolved by {}: {}", slide.title, strategy.name(), found);
                return found;
            }
        }

        let fallback = self.fallback.reference();
        log::info!("Using fallback image for '{}': {}", slide.title, fallback);
        fallback
    }

    pub fn fallback(&self) -> &FallbackReference {
        &self.fallback
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;

    /// Answers from a fixed table and records every query.
    struct TableSearch {
        answers: HashMap<String, String>,
        queries: Mutex<Vec<String>>,
    }

    impl TableSearch {
        fn new(pairs: &[(&str, &str)]) -> Arc<Self> {
            Arc::new(Self {
                answers: pairs
                    .iter()
                    .map(|(q, u)| (q.to_string(), u.to_string()))
                    .collect(),
                queries: Mutex::new(Vec::new()),
            })
        }

        fn queries(&self) -> Vec<String> {
            self.queries.lock().unwrap().clone()
        }
    }

    impl ImageSearch for TableSearch {
        fn search(&self, query: &str) -> Option<String> {
            self.queries.lock().unwrap().push(query.to_string());
            self.answers.get(query).cloned()
        }
    }

    fn output_without_asset() -> OutputConfig {
        let mut output = OutputConfig::with_static_root("/nonexistent/deckgen-static");
        output.placeholder_url = "https://placeholder.test/1600x900".to_string();
        output
    }

    fn slide() -> Slide {
        Slide::new("The Water Cycle", "Evaporation lifts water. More text.")
            .with_keywords(["rain", "clouds"])
    }

    #[test]
    fn test_existing_url_is_kept() {
        let search = TableSearch::new(&[("rain clouds", "https://img.test/search.jpg")]);
        let resolver = ImageResolver::new(&output_without_asset(), Some(search.clone()));
        let slide = slide().with_image(ImageRef::Remote("https://cdn.test/own.jpg".into()));

        assert_eq!(resolver.resolve(&slide), ImageRef::Remote("https://cdn.test/own.jpg".into()));
        assert!(search.queries().is_empty());
    }

    #[test]
    fn test_placeholder_url_is_not_kept() {
        let search = TableSearch::new(&[("rain clouds", "https://img.test/search.jpg")]);
        let resolver = ImageResolver::new(&output_without_asset(), Some(search));
        let slide = slide().with_image(ImageRef::Remote("https://placeholder.test/other".into()));

        assert_eq!(resolver.resolve(&slide), ImageRef::Remote("https://img.test/search.jpg".into()));
    }

    #[test]
    fn test_local_existing_image_goes_through_search() {
        let search = TableSearch::new(&[("rain clouds", "https://img.test/search.jpg")]);
        let resolver = ImageResolver::new(&output_without_asset(), Some(search));
        let slide = slide().with_image(ImageRef::Local("static/images/x.jpg".into()));

        assert_eq!(resolver.resolve(&slide), ImageRef::Remote("https://img.test/search.jpg".into()));
    }

    #[test]
    fn test_derived_keywords_retry() {
        let search = TableSearch::new(&[("water cycle evaporation lifts", "https://img.test/derived.jpg")]);
        let resolver = ImageResolver::new(&output_without_asset(), Some(search.clone()));

        assert_eq!(resolver.resolve(&slide()), ImageRef::Remote("https://img.test/derived.jpg".into()));
        assert_eq!(search.queries(), vec!["rain clouds", "water cycle evaporation lifts"]);
    }

    #[test]
    fn test_no_search_uses_placeholder() {
        let resolver = ImageResolver::new(&output_without_asset(), None);
        assert_eq!(
            resolver.resolve(&slide()),
            ImageRef::Remote("https://placeholder.test/1600x900".into())
        );
    }

    #[test]
    fn test_total_miss_uses_local_asset_when_present() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut output = OutputConfig::with_static_root(dir.path());
        std::fs::create_dir_all(dir.path().join("images")).unwrap();
        std::fs::write(&output.fallback_image, b"\xFF\xD8\xFF").unwrap();
        output.placeholder_url = "https://placeholder.test/x".to_string();

        let search = TableSearch::new(&[]);
        let resolver = ImageResolver::new(&output, Some(search.clone()));

        assert_eq!(resolver.resolve(&slide()), ImageRef::Local(output.fallback_image.clone()));
        assert_eq!(search.queries().len(), 2);
    }

    #[test]
    fn test_empty_everything_still_resolves() {
        let resolver = ImageResolver::new(&output_without_asset(), Some(TableSearch::new(&[])));
        let resolved = resolver.resolve(&Slide::new("", ""));
        assert!(!resolved.to_string().is_empty());
    }
}
