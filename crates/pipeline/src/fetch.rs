//! Turning image references into embeddable bytes.

use deckgen_core::{Error, ImageData, ImageFormat, ImageRef, Result};
use deckgen_pptx::Picture;
use reqwest::blocking::Client;
use reqwest::header::CONTENT_TYPE;
use std::io::{Cursor, Read, Seek, SeekFrom};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Loads the bytes behind an image reference.
pub trait ImageMaterializer: Send + Sync {
    fn materialize(&self, reference: &ImageRef) -> Result<Picture>;
}

/// Reads local files directly and downloads remote URLs over HTTP.
pub struct HttpImageFetcher {
    client: Client,
    staging_dir: PathBuf,
}

impl HttpImageFetcher {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::Http(format!("Failed to create HTTP client: {}", e)))?;
        Ok(Self {
            client,
            staging_dir: std::env::temp_dir(),
        })
    }

    /// Directory that receives download staging files.
    pub fn with_staging_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.staging_dir = dir.into();
        self
    }

    fn read_local(&self, path: &Path) -> Result<Picture> {
        let bytes = std::fs::read(path).map_err(|e| {
            Error::Materialization(format!("Cannot read '{}': {}", path.display(), e))
        })?;

        let format = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(ImageFormat::from_extension)
            .or_else(|| ImageFormat::from_magic(&bytes))
            .unwrap_or(ImageFormat::Jpeg);

        Ok(picture(bytes, format))
    }

    /// Download into a staging file that is removed when it goes out of
    /// scope, on success and error alike.
    fn download(&self, url: &str) -> Result<Picture> {
        let mut response = self
            .client
            .get(url)
            .send()
            .map_err(|e| Error::Materialization(format!("Download of {} failed: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::Materialization(format!("Download of {} returned {}", url, status)));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string();
        if content_type.trim_start().to_ascii_lowercase().starts_with("text/") {
            return Err(Error::Materialization(format!(
                "{} served {} instead of an image",
                url, content_type
            )));
        }

        let mut staged = tempfile::Builder::new()
            .prefix("deckgen-image-")
            .tempfile_in(&self.staging_dir)?;
        response
            .copy_to(staged.as_file_mut())
            .map_err(|e| Error::Materialization(format!("Download of {} failed: {}", url, e)))?;

        let file = staged.as_file_mut();
        file.seek(SeekFrom::Start(0))?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes)?;

        if bytes.is_empty() {
            return Err(Error::Materialization(format!("{} returned an empty body", url)));
        }

        let format = ImageFormat::from_content_type(&content_type)
            .or_else(|| ImageFormat::from_magic(&bytes))
            .unwrap_or(ImageFormat::Jpeg);

        log::debug!("Downloaded {} bytes of {} from {}", bytes.len(), format.mime_type(), url);
        Ok(picture(bytes, format))
    }
}

impl ImageMaterializer for HttpImageFetcher {
    fn materialize(&self, reference: &ImageRef) -> Result<Picture> {
        match reference {
            ImageRef::Local(path) => self.read_local(path),
            ImageRef::Remote(url) => self.download(url),
        }
    }
}

fn picture(bytes: Vec<u8>, format: ImageFormat) -> Picture {
    let pixels = pixel_size(&bytes);
    Picture {
        data: ImageData { bytes, format },
        pixels,
    }
}

/// Width and height in pixels, if the header can be decoded.
pub fn pixel_size(bytes: &[u8]) -> Option<(u32, u32)> {
    image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .ok()?
        .into_dimensions()
        .ok()
}
