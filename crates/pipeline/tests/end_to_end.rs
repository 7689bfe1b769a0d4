//! Full pipeline runs against local mock endpoints.

use deckgen_core::Config;
use deckgen_pipeline::{download, PresentationService};
use deckgen_pptx::PptxParser;
use mockito::{Matcher, Server};
use std::collections::HashMap;
use std::io::Cursor;
use std::path::Path;

fn chat_reply(slides: serde_json::Value) -> String {
    serde_json::json!({
        "choices": [{"message": {"role": "assistant", "content": slides.to_string()}}]
    })
    .to_string()
}

fn png_bytes() -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    image::RgbImage::new(16, 9)
        .write_to(&mut buf, image::ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}

fn config(server: &Server, static_root: &Path, extra: &[(&str, String)]) -> Config {
    let mut vars: HashMap<String, String> = HashMap::new();
    vars.insert("DEEPSEEK_API_KEY".into(), "sk-test".into());
    vars.insert(
        "DEEPSEEK_API_URL".into(),
        format!("{}/chat/completions", server.url()),
    );
    vars.insert(
        "DECKGEN_STATIC_DIR".into(),
        static_root.display().to_string(),
    );
    for (key, value) in extra {
        vars.insert(key.to_string(), value.clone());
    }
    Config::from_lookup(|key| vars.get(key).cloned()).unwrap()
}

#[test]
fn test_water_cycle_text_only() {
    let mut server = Server::new();
    let chat = server
        .mock("POST", "/chat/completions")
        .match_body(Matcher::Regex("focus only on textual content".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(chat_reply(serde_json::json!([
            {"title": "Evaporation", "description": "The sun heats surface water.", "keywords": ["sun"], "image": ""},
            {"title": "Condensation", "description": "Vapor cools into clouds."},
            {"title": "Precipitation", "description": "Water falls as rain or snow."}
        ])))
        .expect(1)
        .create();

    let static_dir = tempfile::TempDir::new().unwrap();
    let config = config(&server, static_dir.path(), &[]);
    let service = PresentationService::from_config(&config).unwrap();

    let response = service
        .generate_response("Explain the water cycle in 3 slides", false)
        .unwrap();
    chat.assert();

    assert_eq!(response.slide_count, 3);
    assert_eq!(response.message, "Presentation generated successfully");
    let relative = response.file_url.strip_prefix("/static/").unwrap();
    assert!(relative.starts_with("presentations/presentation_"));

    let inspected = PptxParser::new()
        .parse(std::fs::File::open(static_dir.path().join(relative)).unwrap())
        .unwrap();
    assert_eq!(inspected.slide_count(), 3);
    assert_eq!(
        inspected.titles(),
        vec!["Evaporation", "Condensation", "Precipitation"]
    );
    assert!(inspected.slides.iter().all(|s| s.texts.len() == 2));
    assert_eq!(inspected.picture_count(), 0);

    let filename = relative.rsplit('/').next().unwrap();
    let bytes = download(&config.output, filename).unwrap();
    assert!(bytes.starts_with(b"PK"));
}

#[test]
fn test_images_without_search_key_use_fallback() {
    let mut server = Server::new();
    let _chat = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_body(chat_reply(serde_json::json!([
            {"title": "Forests", "description": "Trees cover a third of land.", "keywords": ["forest", "trees"], "image": ""},
            {"title": "Oceans", "description": "Oceans hold most water.", "keywords": ["ocean", "waves"], "image": ""}
        ])))
        .create();
    let placeholder = server
        .mock("GET", "/placeholder.png")
        .with_status(200)
        .with_header("content-type", "image/png")
        .with_body(png_bytes())
        .expect(2)
        .create();
    let search = server
        .mock("GET", Matcher::Regex("^/v1/search".into()))
        .expect(0)
        .create();

    let static_dir = tempfile::TempDir::new().unwrap();
    let config = config(
        &server,
        static_dir.path(),
        &[
            ("DECKGEN_PLACEHOLDER_URL", format!("{}/placeholder.png", server.url())),
            ("PEXELS_API_URL", format!("{}/v1/search", server.url())),
        ],
    );
    assert!(config.images.api_key.is_none());

    let service = PresentationService::from_config(&config).unwrap();
    let generated = service
        .generate_presentation("Describe our planet's ecosystems", true)
        .unwrap()
        .unwrap();

    placeholder.assert();
    search.assert();
    assert_eq!(generated.slide_count, 2);

    let inspected = PptxParser::new()
        .parse(std::fs::File::open(static_dir.path().join(&generated.path)).unwrap())
        .unwrap();
    assert_eq!(inspected.slide_count(), 2);
    assert_eq!(inspected.titles(), vec!["Forests", "Oceans"]);
    assert_eq!(inspected.slides[1].texts[1], "Oceans hold most water.");
    assert_eq!(inspected.picture_count(), 2);
}

#[test]
fn test_search_result_is_embedded() {
    let mut server = Server::new();
    let _chat = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_body(chat_reply(serde_json::json!([
            {"title": "Volcanoes", "description": "Magma rises.", "keywords": ["volcano", "lava"], "image": ""}
        ])))
        .create();
    let photo_url = format!("{}/photos/volcano.png", server.url());
    let search = server
        .mock("GET", "/v1/search")
        .match_query(Matcher::UrlEncoded("query".into(), "volcano lava".into()))
        .match_header("authorization", "pexels-key-1234")
        .with_status(200)
        .with_body(serde_json::json!({"photos": [{"src": {"large2x": photo_url}}]}).to_string())
        .expect(1)
        .create();
    let photo = server
        .mock("GET", "/photos/volcano.png")
        .with_status(200)
        .with_header("content-type", "image/png")
        .with_body(png_bytes())
        .expect(1)
        .create();

    let static_dir = tempfile::TempDir::new().unwrap();
    let config = config(
        &server,
        static_dir.path(),
        &[
            ("PEXELS_API_KEY", "pexels-key-1234".to_string()),
            ("PEXELS_API_URL", format!("{}/v1/search", server.url())),
        ],
    );
    let service = PresentationService::from_config(&config).unwrap();
    let response = service
        .generate_response("Explain how volcanoes work", true)
        .unwrap();

    search.assert();
    photo.assert();
    assert_eq!(response.slide_count, 1);
}

#[test]
fn test_unusable_reply_is_reported() {
    let mut server = Server::new();
    let _chat = server
        .mock("POST", "/chat/completions")
        .with_status(200)
        .with_body(chat_reply(serde_json::json!("Sure! Here are some slides...")))
        .create();

    let static_dir = tempfile::TempDir::new().unwrap();
    let service = PresentationService::from_config(&config(&server, static_dir.path(), &[])).unwrap();

    let err = service
        .generate_response("Explain the water cycle in 3 slides", false)
        .unwrap_err();
    assert_eq!(err.error, "Failed to generate presentation");
    assert!(!static_dir.path().join("presentations").exists());
}
